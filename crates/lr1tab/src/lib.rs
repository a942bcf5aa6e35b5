//! Construction of canonical LR(1) automata and action/goto tables.
//!
//! ```
//! use lr1tab::{automaton::Automaton, grammar::Grammar, table::ParseTable};
//!
//! let g: Grammar = "S -> id".parse()?;
//! let automaton = Automaton::generate(&g);
//! let table = ParseTable::generate(&g, &automaton);
//! assert_eq!(table.num_states(), 3);
//! assert!(table.conflicts().is_empty());
//! # Ok::<(), lr1tab::grammar::GrammarDefError>(())
//! ```

pub mod automaton;
pub mod closure;
pub mod grammar;
pub mod item;
pub mod syntax;
pub mod table;
pub mod types;
pub mod util;
