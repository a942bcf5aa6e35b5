//! Grammar types.

use crate::{
    syntax::{self, ast::GrammarDesc, SyntaxError},
    types::{Map, Set},
    util::display_fn,
};
use std::{fmt, io, iter, path::Path, str::FromStr};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TerminalID {
    raw: u16,
}
impl TerminalID {
    /// Reserved symbol used as a terminal symbol that means the end of input.
    pub const EOI: Self = Self::new(0);

    const OFFSET: u16 = 1;

    #[inline]
    const fn new(raw: u16) -> Self {
        Self { raw }
    }
}

#[derive(Debug)]
pub struct Terminal {
    id: TerminalID,
    name: String,
}
impl Terminal {
    pub fn id(&self) -> TerminalID {
        self.id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
}
impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NonterminalID {
    raw: u16,
}
impl NonterminalID {
    /// Reserved symbol used as the left-hand side of the augmented production.
    pub const START: Self = Self::new(0);

    const OFFSET: u16 = 1;

    #[inline]
    const fn new(raw: u16) -> Self {
        Self { raw }
    }
}

#[derive(Debug)]
pub struct Nonterminal {
    id: NonterminalID,
    name: String,
}
impl Nonterminal {
    pub fn id(&self) -> NonterminalID {
        self.id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
}
impl fmt::Display for Nonterminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A grammar symbol.
///
/// The derived ordering puts every terminal before every nonterminal,
/// which is the order in which the transitions of a state are explored.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SymbolID {
    T(TerminalID),
    N(NonterminalID),
}

/// The position of a production in the grammar.
///
/// This index is also the identifier of reduce actions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ProductionID {
    raw: u16,
}

impl ProductionID {
    /// The implicit production `S' -> S`, which is not stored in the grammar.
    pub const ACCEPT: Self = Self::new(u16::MAX);

    #[inline]
    const fn new(raw: u16) -> Self {
        Self { raw }
    }

    /// Return the position of this production in the production sequence.
    #[inline]
    pub const fn index(self) -> usize {
        self.raw as usize
    }
}

impl fmt::Display for ProductionID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.raw, f)
    }
}

/// The type that represents a production rule in grammar.
#[derive(Debug)]
pub struct Production {
    id: ProductionID,
    left: NonterminalID,
    right: Vec<SymbolID>,
}
impl Production {
    pub fn id(&self) -> ProductionID {
        self.id
    }

    /// Return the left-hand side of this production.
    pub fn left(&self) -> NonterminalID {
        self.left
    }

    /// Return the right-hand side of this production.
    pub fn right(&self) -> &[SymbolID] {
        &self.right[..]
    }

    // `"LHS -> R1 R2 R3"`
    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(|f| {
            write!(f, "{} ->", g.nonterminals[&self.left])?;
            for symbol in &self.right {
                write!(f, " {}", g.symbol_name(*symbol))?;
            }
            Ok(())
        })
    }
}

/// The grammar definition used to derive the parser tables.
#[derive(Debug)]
#[non_exhaustive]
pub struct Grammar {
    pub terminals: Map<TerminalID, Terminal>,
    pub nonterminals: Map<NonterminalID, Nonterminal>,
    pub start_symbol: NonterminalID,
    productions: Vec<Production>,
    // The first structurally equal production for each position.
    canonical: Vec<ProductionID>,
    // Canonical productions grouped by their left-hand side.
    by_left: Map<NonterminalID, Vec<ProductionID>>,
    accept: Production,
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## terminals:")?;
        for terminal in self.terminals.values() {
            writeln!(f, "{}", terminal)?;
        }

        writeln!(f, "\n## nonterminals:")?;
        for nonterminal in self.nonterminals.values() {
            write!(f, "{}", nonterminal)?;
            if nonterminal.id() == self.start_symbol {
                write!(f, " (start)")?;
            } else if nonterminal.id() == NonterminalID::START {
                write!(f, " (augmented)")?;
            }
            writeln!(f)?;
        }

        writeln!(f, "\n## productions:")?;
        for production in &self.productions {
            write!(f, "{}: {}", production.id(), production.display(self))?;
            let canonical = self.canonical(production.id());
            if canonical != production.id() {
                write!(f, " (same as {})", canonical)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

impl FromStr for Grammar {
    type Err = GrammarDefError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        let desc = syntax::parse(source).map_err(GrammarDefError::Syntax)?;
        Self::from_desc(&desc)
    }
}

impl Grammar {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Grammar, GrammarDefError> {
        let desc = syntax::parse_file(path)?;
        Self::from_desc(&desc)
    }

    /// Build a grammar from the description read by the grammar file loader.
    pub fn from_desc(desc: &GrammarDesc) -> Result<Grammar, GrammarDefError> {
        Grammar::define(|g| {
            if let Some(start) = &desc.start {
                g.start_symbol(start)?;
            }
            for production in &desc.productions {
                g.add_production(&production.left, &production.right)?;
            }
            Ok(())
        })
    }

    /// Define a grammar using the specified function.
    pub fn define<F>(f: F) -> Result<Self, GrammarDefError>
    where
        F: FnOnce(&mut GrammarDef) -> Result<(), GrammarDefError>,
    {
        let mut def = GrammarDef {
            productions: vec![],
            start: None,
        };
        f(&mut def)?;
        def.end()
    }

    /// Return the production associated with the specified ID.
    ///
    /// `ProductionID::ACCEPT` designates the augmented production.
    pub fn production(&self, id: ProductionID) -> &Production {
        if id == ProductionID::ACCEPT {
            &self.accept
        } else {
            &self.productions[id.index()]
        }
    }

    /// Iterate over the stored productions, in insertion order.
    pub fn productions(&self) -> impl Iterator<Item = &Production> + '_ {
        self.productions.iter()
    }

    /// Return the augmented production `S' -> S`.
    pub fn accept_production(&self) -> &Production {
        &self.accept
    }

    /// Return the first production structurally equal to the specified one.
    pub fn canonical(&self, id: ProductionID) -> ProductionID {
        if id == ProductionID::ACCEPT {
            id
        } else {
            self.canonical[id.index()]
        }
    }

    /// Return the canonical productions whose left-hand side is `n`.
    pub fn productions_of(&self, n: NonterminalID) -> &[ProductionID] {
        self.by_left.get(&n).map_or(&[], Vec::as_slice)
    }

    pub fn terminal_by_name(&self, name: &str) -> Option<TerminalID> {
        self.terminals
            .values()
            .find(|t| t.name() == name)
            .map(|t| t.id())
    }

    pub fn nonterminal_by_name(&self, name: &str) -> Option<NonterminalID> {
        self.nonterminals
            .values()
            .skip(1) // the augmented start symbol has no user-facing name
            .find(|n| n.name() == name)
            .map(|n| n.id())
    }

    pub fn symbol_by_name(&self, name: &str) -> Option<SymbolID> {
        self.terminal_by_name(name)
            .map(SymbolID::T)
            .or_else(|| self.nonterminal_by_name(name).map(SymbolID::N))
    }

    pub fn symbol_name(&self, symbol: SymbolID) -> &str {
        match symbol {
            SymbolID::T(t) => self.terminals[&t].name(),
            SymbolID::N(n) => self.nonterminals[&n].name(),
        }
    }
}

/// The contextural values for building a `Grammar`.
#[derive(Debug)]
pub struct GrammarDef {
    productions: Vec<(String, Vec<String>)>,
    start: Option<String>,
}

impl GrammarDef {
    /// Append a production rule to this grammar.
    ///
    /// The symbols are classified when the grammar is finalized: a symbol is
    /// a nonterminal iff it appears as a left-hand side somewhere or is a
    /// single uppercase ASCII letter.
    pub fn add_production<I>(
        &mut self,
        left: &str,
        right: I,
    ) -> Result<ProductionID, GrammarDefError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        verify_symbol(left)?;
        let right = right
            .into_iter()
            .map(|symbol| {
                let symbol = symbol.as_ref();
                verify_symbol(symbol).map(|()| symbol.to_owned())
            })
            .collect::<Result<Vec<_>, _>>()?;

        let raw = u16::try_from(self.productions.len())
            .ok()
            .filter(|raw| *raw < ProductionID::ACCEPT.raw)
            .ok_or(GrammarDefError::TooLarge {
                what: "production rules",
            })?;
        self.productions.push((left.to_owned(), right));

        Ok(ProductionID::new(raw))
    }

    /// Specify the start symbol for this grammar.
    pub fn start_symbol(&mut self, name: &str) -> Result<(), GrammarDefError> {
        verify_symbol(name)?;
        self.start.replace(name.to_owned());
        Ok(())
    }

    fn end(self) -> Result<Grammar, GrammarDefError> {
        let lefts: Set<&str> = self
            .productions
            .iter()
            .map(|(left, _)| left.as_str())
            .collect();

        // 指定されていない場合は最初の production の左辺を用いる
        let start_name = match &self.start {
            Some(start) => start.as_str(),
            None => match self.productions.first() {
                Some((left, _)) => left.as_str(),
                None => return Err(GrammarDefError::EmptyGrammar),
            },
        };
        if !lefts.contains(start_name) {
            return Err(GrammarDefError::UnknownStartSymbol {
                name: start_name.to_owned(),
            });
        }

        let mut terminals = Map::default();
        terminals.insert(
            TerminalID::EOI,
            Terminal {
                id: TerminalID::EOI,
                name: "$".into(),
            },
        );
        let mut nonterminals = Map::default();
        nonterminals.insert(
            NonterminalID::START,
            Nonterminal {
                id: NonterminalID::START,
                name: format!("{}'", start_name),
            },
        );

        // Assign IDs in the order of first appearance.
        let mut symbols: Map<&str, SymbolID> = Map::default();
        let mut next_terminal_id = TerminalID::OFFSET;
        let mut next_nonterminal_id = NonterminalID::OFFSET;
        for (left, right) in &self.productions {
            for name in iter::once(left).chain(right).map(String::as_str) {
                if symbols.contains_key(name) {
                    continue;
                }
                let symbol = if lefts.contains(name) || is_conventional_nonterminal(name) {
                    let id = NonterminalID::new(next_nonterminal_id);
                    next_nonterminal_id = next_id(next_nonterminal_id, "nonterminal symbols")?;
                    nonterminals.insert(
                        id,
                        Nonterminal {
                            id,
                            name: name.to_owned(),
                        },
                    );
                    SymbolID::N(id)
                } else {
                    let id = TerminalID::new(next_terminal_id);
                    next_terminal_id = next_id(next_terminal_id, "terminal symbols")?;
                    terminals.insert(
                        id,
                        Terminal {
                            id,
                            name: name.to_owned(),
                        },
                    );
                    SymbolID::T(id)
                };
                symbols.insert(name, symbol);
            }
        }

        let mut productions: Vec<Production> = Vec::with_capacity(self.productions.len());
        let mut canonical = Vec::with_capacity(self.productions.len());
        let mut by_left: Map<NonterminalID, Vec<ProductionID>> = Map::default();
        for (i, (left, right)) in self.productions.iter().enumerate() {
            // add_production() has already checked the bound.
            let id = ProductionID::new(i as u16);
            let SymbolID::N(left) = symbols[left.as_str()] else {
                unreachable!("the left-hand side is always classified as a nonterminal")
            };
            let right: Vec<SymbolID> = right.iter().map(|s| symbols[s.as_str()]).collect();

            let first = productions
                .iter()
                .find(|p| p.left == left && p.right == right)
                .map_or(id, |p| p.id);
            if first == id {
                by_left.entry(left).or_default().push(id);
            } else {
                tracing::debug!("production {} duplicates production {}", id, first);
            }
            canonical.push(first);
            productions.push(Production { id, left, right });
        }

        let SymbolID::N(start_symbol) = symbols[start_name] else {
            unreachable!("the start symbol is a left-hand side")
        };

        Ok(Grammar {
            terminals,
            nonterminals,
            start_symbol,
            productions,
            canonical,
            by_left,
            accept: Production {
                id: ProductionID::ACCEPT,
                left: NonterminalID::START,
                right: vec![SymbolID::N(start_symbol)],
            },
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GrammarDefError {
    #[error("IO error: {}", _0)]
    IO(io::Error),

    #[error("Syntax error: {}", _0)]
    Syntax(SyntaxError),

    #[error("the grammar has no production rules")]
    EmptyGrammar,

    #[error("unknown start symbol: `{}'", name)]
    UnknownStartSymbol { name: String },

    #[error("incorrect symbol name: {:?}", name)]
    InvalidSymbol { name: String },

    #[error("the symbol `{}' is reserved", name)]
    ReservedSymbol { name: String },

    #[error("too many {}", what)]
    TooLarge { what: &'static str },
}

fn verify_symbol(name: &str) -> Result<(), GrammarDefError> {
    if name == "$" {
        return Err(GrammarDefError::ReservedSymbol { name: name.into() });
    }
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return Err(GrammarDefError::InvalidSymbol { name: name.into() });
    }
    Ok(())
}

fn is_conventional_nonterminal(name: &str) -> bool {
    let mut chars = name.chars();
    matches!((chars.next(), chars.next()), (Some(ch), None) if ch.is_ascii_uppercase())
}

fn next_id(raw: u16, what: &'static str) -> Result<u16, GrammarDefError> {
    raw.checked_add(1).ok_or(GrammarDefError::TooLarge { what })
}
