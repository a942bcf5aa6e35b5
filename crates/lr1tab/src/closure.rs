//! Closure of LR(1) item sets.

use crate::{
    grammar::{Grammar, SymbolID},
    item::{Item, ItemSet},
};

/// Expand the specified items into a closed item set.
///
/// For every item `[X -> ... . Y beta, a]` whose marker is followed by a
/// nonterminal `Y`, the items `[Y -> . gamma, a]` are added for every
/// production of `Y`, until no more items can be added.
///
/// The lookahead of an added item is copied from the item being expanded
/// rather than computed from `First(beta a)`. The resulting sets are hence
/// narrower than Knuth's canonical LR(1) item sets whenever `Y` is not at
/// the tail of its production.
pub fn closure<I>(g: &Grammar, seed: I) -> ItemSet
where
    I: IntoIterator<Item = Item>,
{
    let mut items: ItemSet = seed.into_iter().collect();

    let mut changed = true;
    while changed {
        changed = false;

        // 候補の抽出
        let mut added = vec![];
        for item in &items {
            // [X -> ... @ Y beta]
            //  Y: one nonterminal symbol
            let Some(SymbolID::N(y_symbol)) = item.next_symbol(g) else {
                continue;
            };
            for &production in g.productions_of(y_symbol) {
                added.push(Item::new(production, item.lookahead()));
            }
        }

        for item in added {
            changed |= items.insert(item);
        }
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{ProductionID, TerminalID};

    fn expr_grammar() -> Grammar {
        Grammar::define(|g| {
            g.add_production("E", ["E", "+", "T"])?;
            g.add_production("E", ["T"])?;
            g.add_production("T", ["T", "*", "F"])?;
            g.add_production("T", ["F"])?;
            g.add_production("F", ["(", "E", ")"])?;
            g.add_production("F", ["id"])?;
            Ok(())
        })
        .unwrap()
    }

    fn render(g: &Grammar, items: &ItemSet) -> Vec<String> {
        items.iter().map(|item| item.display(g).to_string()).collect()
    }

    #[test]
    fn start_state_of_expression_grammar() {
        let g = expr_grammar();
        let items = closure(&g, [Item::new(ProductionID::ACCEPT, TerminalID::EOI)]);
        assert_eq!(
            render(&g, &items),
            [
                "[E' -> . E, $]",
                "[E -> . E + T, $]",
                "[E -> . T, $]",
                "[T -> . T * F, $]",
                "[T -> . F, $]",
                "[F -> . ( E ), $]",
                "[F -> . id, $]",
            ]
        );
    }

    #[test]
    fn closure_is_idempotent() {
        let g = expr_grammar();
        let once = closure(&g, [Item::new(ProductionID::ACCEPT, TerminalID::EOI)]);
        let twice = closure(&g, once.iter().copied());
        assert_eq!(once, twice);
        assert_eq!(render(&g, &once), render(&g, &twice));
    }

    #[test]
    fn lookahead_is_copied_from_expanded_item() {
        let g = Grammar::define(|g| {
            g.add_production("S", ["A", "b"])?;
            g.add_production("A", ["a"])?;
            Ok(())
        })
        .unwrap();
        let items = closure(&g, [Item::new(ProductionID::ACCEPT, TerminalID::EOI)]);
        assert_eq!(
            render(&g, &items),
            ["[S' -> . S, $]", "[S -> . A b, $]", "[A -> . a, $]"]
        );
    }

    #[test]
    fn complete_and_terminal_items_are_not_expanded() {
        let g = expr_grammar();
        let id = g.terminal_by_name("id").unwrap();
        let p5 = g.productions().nth(5).unwrap().id();
        let seed = [Item::new(p5, id), Item::with_dot(p5, 1, id)];
        let items = closure(&g, seed);
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn undefined_nonterminal_adds_nothing() {
        let g = Grammar::define(|g| {
            g.add_production("S", ["X", "x"])?;
            Ok(())
        })
        .unwrap();
        let items = closure(&g, [Item::new(ProductionID::ACCEPT, TerminalID::EOI)]);
        assert_eq!(render(&g, &items), ["[S' -> . S, $]", "[S -> . X x, $]"]);
    }
}
