//! Derivation of the action/goto tables from the LR(1) automaton.

use crate::{
    automaton::{Automaton, StateID},
    grammar::{Grammar, NonterminalID, ProductionID, SymbolID, TerminalID},
    types::Map,
    util::display_fn,
};
use std::fmt;

/// The action that the LR automaton in a state performs on a particular
/// lookahead symbol.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    /// Read a lookahead symbol and transition to the specified state.
    Shift(StateID),

    /// Reduce to the specified production rule.
    Reduce(ProductionID),

    Accept,
}

impl Action {
    // `"shift(03)"`, `"reduce(E -> T)"`
    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(|f| match self {
            Action::Shift(n) => write!(f, "shift({:02})", n),
            Action::Reduce(p) => write!(f, "reduce({})", g.production(*p).display(g)),
            Action::Accept => f.write_str("accept"),
        })
    }
}

/// The short form used in the table cells.
impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Shift(n) => write!(f, "s{}", n),
            Action::Reduce(p) => write!(f, "r{}", p),
            Action::Accept => f.write_str("acc"),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConflictKind {
    ShiftReduce,
    ReduceReduce,
    /// The accept action competes with a reduction on the end of input.
    AcceptReduce,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShiftReduce => f.write_str("shift/reduce"),
            Self::ReduceReduce => f.write_str("reduce/reduce"),
            Self::AcceptReduce => f.write_str("accept/reduce"),
        }
    }
}

/// A table cell written more than once with different actions.
///
/// The later action is kept in the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub state: StateID,
    pub terminal: TerminalID,
    pub discarded: Action,
    pub kept: Action,
}

impl Conflict {
    pub fn kind(&self) -> ConflictKind {
        match (self.discarded, self.kept) {
            (Action::Accept, _) | (_, Action::Accept) => ConflictKind::AcceptReduce,
            (Action::Reduce(..), Action::Reduce(..)) => ConflictKind::ReduceReduce,
            _ => ConflictKind::ShiftReduce,
        }
    }

    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(|f| {
            write!(
                f,
                "{} conflict in state {:02} on `{}': {} discarded in favor of {}",
                self.kind(),
                self.state,
                g.terminals[&self.terminal],
                self.discarded.display(g),
                self.kept.display(g),
            )
        })
    }
}

/// The action table and the goto table of an LR(1) automaton.
#[derive(Debug)]
pub struct ParseTable {
    actions: Vec<Map<TerminalID, Action>>,
    gotos: Vec<Map<NonterminalID, StateID>>,
    conflicts: Vec<Conflict>,
}

impl ParseTable {
    pub fn generate(g: &Grammar, automaton: &Automaton) -> Self {
        let span = tracing::trace_span!("generate_table");
        let _entered = span.enter();

        let mut table = Self {
            actions: Vec::with_capacity(automaton.num_states()),
            gotos: Vec::with_capacity(automaton.num_states()),
            conflicts: vec![],
        };

        for state in automaton.states() {
            let mut actions: Map<TerminalID, Action> = Map::default();

            for item in state.items() {
                let (terminal, action) = match item.next_symbol(g) {
                    // accept
                    None if item.production() == ProductionID::ACCEPT => {
                        (TerminalID::EOI, Action::Accept)
                    }
                    // reduce
                    None => (
                        item.lookahead(),
                        Action::Reduce(g.canonical(item.production())),
                    ),
                    // shift
                    Some(SymbolID::T(t)) => match state.transition(SymbolID::T(t)) {
                        Some(target) => (t, Action::Shift(target)),
                        None => continue,
                    },
                    Some(SymbolID::N(..)) => continue,
                };

                match actions.insert(terminal, action) {
                    Some(discarded) if discarded != action => {
                        let conflict = Conflict {
                            state: state.id(),
                            terminal,
                            discarded,
                            kept: action,
                        };
                        tracing::warn!("{}", conflict.display(g));
                        table.conflicts.push(conflict);
                    }
                    _ => (),
                }
            }

            let gotos = g
                .nonterminals
                .keys()
                .filter_map(|&n| state.transition(SymbolID::N(n)).map(|target| (n, target)))
                .collect();

            table.actions.push(actions);
            table.gotos.push(gotos);
        }

        tracing::debug!(
            "generated tables for {} states ({} conflicts)",
            table.num_states(),
            table.conflicts.len()
        );

        table
    }

    pub fn num_states(&self) -> usize {
        self.actions.len()
    }

    /// Look up the action table. `None` means that no action is defined.
    pub fn action(&self, state: StateID, terminal: TerminalID) -> Option<Action> {
        self.actions.get(state.index())?.get(&terminal).copied()
    }

    /// Look up the goto table.
    pub fn goto(&self, state: StateID, nonterminal: NonterminalID) -> Option<StateID> {
        self.gotos.get(state.index())?.get(&nonterminal).copied()
    }

    pub fn actions(&self, state: StateID) -> impl Iterator<Item = (TerminalID, Action)> + '_ {
        self.actions
            .get(state.index())
            .into_iter()
            .flat_map(|actions| actions.iter().map(|(t, a)| (*t, *a)))
    }

    pub fn gotos(&self, state: StateID) -> impl Iterator<Item = (NonterminalID, StateID)> + '_ {
        self.gotos
            .get(state.index())
            .into_iter()
            .flat_map(|gotos| gotos.iter().map(|(n, s)| (*n, *s)))
    }

    /// Return the overwritten cells, in the order they were detected.
    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    /// Render the tables as two grids, with `-` in the empty cells.
    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            // `$` is placed at the last column.
            let terminals: Vec<TerminalID> = g
                .terminals
                .keys()
                .copied()
                .filter(|t| *t != TerminalID::EOI)
                .chain(Some(TerminalID::EOI))
                .collect();
            let nonterminals: Vec<NonterminalID> = g
                .nonterminals
                .keys()
                .copied()
                .filter(|n| *n != NonterminalID::START)
                .collect();

            writeln!(f, "## action")?;
            let header: Vec<String> = terminals
                .iter()
                .map(|t| g.terminals[t].to_string())
                .collect();
            let rows: Vec<Vec<String>> = self
                .actions
                .iter()
                .map(|actions| {
                    terminals
                        .iter()
                        .map(|t| actions.get(t).map_or_else(|| "-".into(), |a| a.to_string()))
                        .collect()
                })
                .collect();
            write_grid(f, &header, &rows)?;

            writeln!(f, "\n## goto")?;
            let header: Vec<String> = nonterminals
                .iter()
                .map(|n| g.nonterminals[n].to_string())
                .collect();
            let rows: Vec<Vec<String>> = self
                .gotos
                .iter()
                .map(|gotos| {
                    nonterminals
                        .iter()
                        .map(|n| gotos.get(n).map_or_else(|| "-".into(), |s| s.to_string()))
                        .collect()
                })
                .collect();
            write_grid(f, &header, &rows)
        })
    }
}

fn write_grid(f: &mut fmt::Formatter<'_>, header: &[String], rows: &[Vec<String>]) -> fmt::Result {
    const STATE: &str = "state";

    let state_width = rows
        .len()
        .saturating_sub(1)
        .to_string()
        .len()
        .max(STATE.len());
    let widths: Vec<usize> = header
        .iter()
        .enumerate()
        .map(|(j, label)| {
            rows.iter()
                .map(|row| row[j].chars().count())
                .fold(label.chars().count(), usize::max)
        })
        .collect();

    write_row(f, state_width, &widths, STATE, header)?;
    for (i, row) in rows.iter().enumerate() {
        write_row(f, state_width, &widths, &i.to_string(), row)?;
    }
    Ok(())
}

fn write_row(
    f: &mut fmt::Formatter<'_>,
    state_width: usize,
    widths: &[usize],
    first: &str,
    cells: &[String],
) -> fmt::Result {
    let mut line = format!("{:<w$}", first, w = state_width);
    for (cell, width) in cells.iter().zip(widths) {
        line.push_str(&format!("  {:<w$}", cell, w = *width));
    }
    writeln!(f, "{}", line.trim_end())
}
