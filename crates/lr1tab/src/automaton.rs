//! The canonical collection of LR(1) item sets.

use crate::{
    closure::closure,
    grammar::{Grammar, ProductionID, SymbolID, TerminalID},
    item::{Item, ItemSet},
    types::Set,
    util::display_fn,
};
use std::{
    collections::{BTreeMap, VecDeque},
    fmt,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct StateID {
    raw: usize,
}

impl StateID {
    /// The state containing the augmented start item.
    pub const START: Self = Self::from_raw(0);

    pub const fn from_raw(raw: usize) -> Self {
        Self { raw }
    }

    /// Return the position of this state in discovery order.
    pub const fn index(self) -> usize {
        self.raw
    }
}

impl fmt::Display for StateID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.raw, f)
    }
}

/// A state of the LR(1) automaton.
#[derive(Debug)]
pub struct State {
    id: StateID,
    items: ItemSet,
    transitions: BTreeMap<SymbolID, StateID>,
}

impl State {
    pub fn id(&self) -> StateID {
        self.id
    }

    /// Return the closed item set of this state.
    pub fn items(&self) -> &ItemSet {
        &self.items
    }

    /// Iterate over the outgoing edges, terminals first.
    pub fn transitions(&self) -> impl Iterator<Item = (SymbolID, StateID)> + '_ {
        self.transitions
            .iter()
            .map(|(symbol, target)| (*symbol, *target))
    }

    pub fn transition(&self, symbol: SymbolID) -> Option<StateID> {
        self.transitions.get(&symbol).copied()
    }
}

/// The canonical collection of LR(1) states and the transitions between them.
#[derive(Debug)]
pub struct Automaton {
    states: Vec<State>,
}

impl Automaton {
    /// Discover every state reachable from the augmented start item.
    pub fn generate(g: &Grammar) -> Self {
        let span = tracing::trace_span!("generate_automaton");
        let _entered = span.enter();

        let mut gen = AutomatonGenerator::new(g);
        gen.populate_states();
        let automaton = gen.finalize();

        tracing::debug!(
            "generated {} states from {} productions",
            automaton.num_states(),
            g.productions().count()
        );
        automaton
    }

    pub fn states(&self) -> impl Iterator<Item = &State> + '_ {
        self.states.iter()
    }

    pub fn state(&self, id: StateID) -> &State {
        &self.states[id.index()]
    }

    /// Look up the transition graph.
    pub fn transition(&self, from: StateID, symbol: SymbolID) -> Option<StateID> {
        self.states.get(from.index())?.transition(symbol)
    }

    /// Iterate over all the edges of the transition graph.
    pub fn transitions(&self) -> impl Iterator<Item = (StateID, SymbolID, StateID)> + '_ {
        self.states.iter().flat_map(|state| {
            state
                .transitions()
                .map(move |(symbol, target)| (state.id, symbol, target))
        })
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(|f| {
            for (i, state) in self.states.iter().enumerate() {
                if i > 0 {
                    writeln!(f)?;
                }

                writeln!(f, "#### State {:02}", state.id)?;
                writeln!(f, "## items")?;
                for item in &state.items {
                    writeln!(f, "- {}", item.display(g))?;
                }

                writeln!(f, "## transitions")?;
                for (symbol, target) in state.transitions() {
                    writeln!(f, "- {} => {:02}", g.symbol_name(symbol), target)?;
                }
            }
            Ok(())
        })
    }
}

// === AutomatonGenerator ===

#[derive(Debug)]
struct AutomatonGenerator<'g> {
    grammar: &'g Grammar,
    // Discovered item sets. The position in this set is the state ID.
    item_sets: Set<ItemSet>,
    transitions: Vec<BTreeMap<SymbolID, StateID>>,
    pending: VecDeque<StateID>,
}

impl<'g> AutomatonGenerator<'g> {
    fn new(grammar: &'g Grammar) -> Self {
        let mut gen = Self {
            grammar,
            item_sets: Set::default(),
            transitions: vec![],
            pending: VecDeque::new(),
        };

        // [S' -> @ S] {$}
        let start = closure(grammar, [Item::new(ProductionID::ACCEPT, TerminalID::EOI)]);
        let (id, _) = gen.intern(start);
        debug_assert_eq!(id, StateID::START);

        gen
    }

    /// Register an item set, reusing the state of an equal item set if any.
    fn intern(&mut self, item_set: ItemSet) -> (StateID, bool) {
        let (index, inserted) = self.item_sets.insert_full(item_set);
        let id = StateID::from_raw(index);
        if inserted {
            tracing::trace!("discovered state {} ({} items)", id, self.item_sets[index].len());
            self.transitions.push(BTreeMap::new());
            self.pending.push_back(id);
        }
        (id, inserted)
    }

    fn populate_states(&mut self) {
        // 新規に状態が生成されなくなるまで繰り返す
        while let Some(id) = self.pending.pop_front() {
            for (symbol, kernel) in self.extract_transitions(id) {
                let item_set = closure(self.grammar, kernel);
                let (target, _) = self.intern(item_set);
                self.transitions[id.index()].insert(symbol, target);
            }
        }
    }

    /// 指定した状態から遷移先のLRアイテム集合（未展開）とラベルを抽出する
    fn extract_transitions(&self, id: StateID) -> BTreeMap<SymbolID, Vec<Item>> {
        let mut kernels: BTreeMap<SymbolID, Vec<Item>> = BTreeMap::new();
        for item in &self.item_sets[id.index()] {
            // markerが終わりまで到達していれば無視する
            if let (Some(label), Some(next)) =
                (item.next_symbol(self.grammar), item.advance(self.grammar))
            {
                kernels.entry(label).or_default().push(next);
            }
        }
        kernels
    }

    fn finalize(self) -> Automaton {
        let states = self
            .item_sets
            .into_iter()
            .zip(self.transitions)
            .enumerate()
            .map(|(index, (items, transitions))| State {
                id: StateID::from_raw(index),
                items,
                transitions,
            })
            .collect();
        Automaton { states }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    fn render(g: &Grammar, state: &State) -> Vec<String> {
        state
            .items()
            .iter()
            .map(|item| item.display(g).to_string())
            .collect()
    }

    #[test]
    fn single_production() {
        let g = Grammar::define(|g| {
            g.add_production("S", ["id"])?;
            Ok(())
        })
        .unwrap();
        let automaton = Automaton::generate(&g);
        eprintln!("{}", automaton.display(&g));

        assert_eq!(automaton.num_states(), 3);

        let id = g.symbol_by_name("id").unwrap();
        let s = g.symbol_by_name("S").unwrap();
        assert_eq!(
            render(&g, automaton.state(StateID::START)),
            ["[S' -> . S, $]", "[S -> . id, $]"]
        );
        assert_eq!(automaton.transition(StateID::START, id), Some(StateID::from_raw(1)));
        assert_eq!(automaton.transition(StateID::START, s), Some(StateID::from_raw(2)));
        assert_eq!(
            render(&g, automaton.state(StateID::from_raw(1))),
            ["[S -> id ., $]"]
        );
        assert_eq!(
            render(&g, automaton.state(StateID::from_raw(2))),
            ["[S' -> S ., $]"]
        );
        assert_eq!(automaton.transitions().count(), 2);
    }

    #[test]
    fn expression_grammar() {
        let g = expr_grammar();
        let automaton = Automaton::generate(&g);
        eprintln!("{}", automaton.display(&g));

        // The copied lookaheads are always `$`, so the collection has the
        // same shape as the LR(0) automaton.
        assert_eq!(automaton.num_states(), 12);
        for state in automaton.states() {
            for item in state.items() {
                assert_eq!(item.lookahead(), TerminalID::EOI);
            }
        }

        // terminals are explored before nonterminals.
        let start = automaton.state(StateID::START);
        let labels: Vec<_> = start
            .transitions()
            .map(|(symbol, _)| g.symbol_name(symbol))
            .collect();
        assert_eq!(labels, ["(", "id", "E", "T", "F"]);

        let e = g.symbol_by_name("E").unwrap();
        let accepting = automaton.transition(StateID::START, e).unwrap();
        assert_eq!(
            render(&g, automaton.state(accepting)),
            ["[E' -> E ., $]", "[E -> E . + T, $]"]
        );
    }

    #[test]
    fn one_transition_per_symbol_after_marker() {
        let g = expr_grammar();
        let automaton = Automaton::generate(&g);
        for state in automaton.states() {
            let mut symbols: Vec<SymbolID> = state
                .items()
                .iter()
                .filter_map(|item| item.next_symbol(&g))
                .collect();
            symbols.sort();
            symbols.dedup();

            let labels: Vec<SymbolID> = state.transitions().map(|(symbol, _)| symbol).collect();
            assert_eq!(labels, symbols);
        }
    }

    #[test]
    fn states_are_unique_and_closed() {
        let g = expr_grammar();
        let automaton = Automaton::generate(&g);
        for (i, s1) in automaton.states().enumerate() {
            assert_eq!(s1.id().index(), i);
            assert_eq!(closure(&g, s1.items().iter().copied()), *s1.items());
            for s2 in automaton.states().skip(i + 1) {
                assert_ne!(s1.items(), s2.items());
            }
        }
    }

    #[test]
    fn generation_is_deterministic() {
        let g = expr_grammar();
        let a1 = Automaton::generate(&g);
        let a2 = Automaton::generate(&g);
        assert_eq!(a1.num_states(), a2.num_states());
        assert_eq!(
            a1.transitions().collect::<Vec<_>>(),
            a2.transitions().collect::<Vec<_>>()
        );
        assert_eq!(a1.display(&g).to_string(), a2.display(&g).to_string());
    }

    #[test]
    fn equal_item_sets_share_one_state() {
        // `a` is reachable from the start state and from the state after `b`,
        // with the same item set.
        let g = Grammar::define(|g| {
            g.add_production("S", ["A"])?;
            g.add_production("S", ["b", "A"])?;
            g.add_production("A", ["a"])?;
            Ok(())
        })
        .unwrap();
        let automaton = Automaton::generate(&g);

        let a = g.symbol_by_name("a").unwrap();
        let b = g.symbol_by_name("b").unwrap();
        let after_b = automaton.transition(StateID::START, b).unwrap();
        assert_eq!(
            automaton.transition(StateID::START, a),
            automaton.transition(after_b, a)
        );
    }
}
