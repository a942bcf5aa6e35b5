//! LR(1) items and item sets.

use crate::{
    grammar::{Grammar, ProductionID, SymbolID, TerminalID},
    types::Set,
    util::display_fn,
};
use std::{
    fmt,
    hash::{Hash, Hasher},
};

// LR(1) item
// X: Y1 Y2 ... Yn という構文規則に、マーカ位置と先読み記号を付与したもの
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Item {
    production: ProductionID,
    dot: usize,
    lookahead: TerminalID,
}

impl Item {
    /// Create an item whose marker is placed before the first symbol.
    pub const fn new(production: ProductionID, lookahead: TerminalID) -> Self {
        Self::with_dot(production, 0, lookahead)
    }

    pub const fn with_dot(production: ProductionID, dot: usize, lookahead: TerminalID) -> Self {
        Self {
            production,
            dot,
            lookahead,
        }
    }

    pub fn production(&self) -> ProductionID {
        self.production
    }

    pub fn dot(&self) -> usize {
        self.dot
    }

    pub fn lookahead(&self) -> TerminalID {
        self.lookahead
    }

    /// Return the symbol just after the marker, or `None` if the item is complete.
    pub fn next_symbol(&self, g: &Grammar) -> Option<SymbolID> {
        g.production(self.production).right().get(self.dot).copied()
    }

    pub fn is_complete(&self, g: &Grammar) -> bool {
        self.dot >= g.production(self.production).right().len()
    }

    /// Return the item whose marker is moved over the next symbol.
    pub fn advance(&self, g: &Grammar) -> Option<Self> {
        if self.is_complete(g) {
            return None;
        }
        Some(Self {
            dot: self.dot + 1,
            ..*self
        })
    }

    // `"[X -> Y1 . Y2, a]"`
    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(|f| {
            let production = g.production(self.production);
            write!(f, "[{} ->", g.nonterminals[&production.left()])?;
            for (i, symbol) in production.right().iter().enumerate() {
                if i == self.dot {
                    f.write_str(" .")?;
                }
                write!(f, " {}", g.symbol_name(*symbol))?;
            }
            if self.dot == production.right().len() {
                f.write_str(" .")?;
            }
            write!(f, ", {}]", g.terminals[&self.lookahead])
        })
    }
}

/// A duplicate-free collection of LR(1) items.
///
/// The items are kept in insertion order, which determines the order in
/// which they are processed and displayed, but two item sets are equal
/// (and hash identically) whenever they contain the same items.
#[derive(Debug, Clone, Default)]
pub struct ItemSet {
    items: Set<Item>,
}

impl ItemSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item, returning `true` if it was not present yet.
    pub fn insert(&mut self, item: Item) -> bool {
        self.items.insert(item)
    }

    pub fn contains(&self, item: &Item) -> bool {
        self.items.contains(item)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> + '_ {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl PartialEq for ItemSet {
    fn eq(&self, other: &Self) -> bool {
        // IndexSet compares its elements regardless of their order.
        self.items == other.items
    }
}

impl Eq for ItemSet {}

impl Hash for ItemSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut items: Vec<&Item> = self.items.iter().collect();
        items.sort_unstable();
        items.hash(state);
    }
}

impl FromIterator<Item> for ItemSet {
    fn from_iter<I: IntoIterator<Item = Item>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl Extend<Item> for ItemSet {
    fn extend<I: IntoIterator<Item = Item>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

impl<'a> IntoIterator for &'a ItemSet {
    type Item = &'a Item;
    type IntoIter = indexmap::set::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
