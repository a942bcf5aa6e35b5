//! The grammar file loader.
//!
//! A grammar file lists one production per line:
//!
//! ```text
//! // comments run until the end of line
//! @start E
//! E -> E + T
//! E -> T
//! ```
//!
//! Symbols are separated by whitespace. The `@start` line is optional; by
//! default the left-hand side of the first production is the start symbol.

pub mod ast;
pub mod lexer;

use self::{
    ast::{GrammarDesc, ProductionDesc},
    lexer::{Lexer, Token},
};
use crate::grammar::GrammarDefError;
use std::{fs, path::Path};

#[derive(Debug, thiserror::Error)]
pub enum SyntaxError {
    #[error("line {}: unrecognized input at column {}", line, column)]
    Lex { line: usize, column: usize },

    #[error("line {}: the left-hand side is missing", line)]
    MissingLeft { line: usize },

    #[error("line {}: expected `->' after the left-hand side", line)]
    MissingArrow { line: usize },

    #[error("line {}: the right-hand side is empty", line)]
    EmptyRight { line: usize },

    #[error("line {}: unexpected `->' in the right-hand side", line)]
    UnexpectedArrow { line: usize },

    #[error("line {}: `@start' must be at the beginning of a line", line)]
    UnexpectedStart { line: usize },

    #[error("line {}: `@start' takes exactly one symbol", line)]
    MalformedStart { line: usize },

    #[error("line {}: the start symbol has already been specified", line)]
    DuplicatedStart { line: usize },
}

pub fn parse_file(path: impl AsRef<Path>) -> Result<GrammarDesc, GrammarDefError> {
    let source = fs::read_to_string(path).map_err(GrammarDefError::IO)?;
    parse(&source).map_err(GrammarDefError::Syntax)
}

pub fn parse(source: &str) -> Result<GrammarDesc, SyntaxError> {
    let span = tracing::trace_span!("parse");
    let _entered = span.enter();

    let mut desc = GrammarDesc::default();
    let mut tokens: Vec<Token<'_>> = vec![];
    let mut line = 1;

    for res in Lexer::new(source) {
        let (start, token, _end) = res.map_err(|err| SyntaxError::Lex {
            line: err.location.line as usize + 1,
            column: err.location.col as usize + 1,
        })?;
        line = start.line as usize + 1;

        if token == Token::Newline {
            parse_line(&mut desc, &tokens, line)?;
            tokens.clear();
        } else {
            tokens.push(token);
        }
    }
    // the last line may not be terminated.
    parse_line(&mut desc, &tokens, line)?;

    tracing::trace!("parsed {} productions", desc.productions.len());

    Ok(desc)
}

fn parse_line(desc: &mut GrammarDesc, tokens: &[Token<'_>], line: usize) -> Result<(), SyntaxError> {
    use Token::*;

    match tokens {
        [] => (),

        [KwStart, Symbol(name)] => {
            if desc.start.is_some() {
                return Err(SyntaxError::DuplicatedStart { line });
            }
            desc.start = Some(name.to_string());
        }
        [KwStart, ..] => return Err(SyntaxError::MalformedStart { line }),

        [Symbol(left), Arrow, right @ ..] => {
            if right.is_empty() {
                return Err(SyntaxError::EmptyRight { line });
            }
            let right = right
                .iter()
                .map(|token| match token {
                    Symbol(symbol) => Ok(symbol.to_string()),
                    KwStart => Err(SyntaxError::UnexpectedStart { line }),
                    _ => Err(SyntaxError::UnexpectedArrow { line }),
                })
                .collect::<Result<Vec<_>, _>>()?;
            desc.productions.push(ProductionDesc {
                line,
                left: left.to_string(),
                right,
            });
        }

        [Arrow, ..] => return Err(SyntaxError::MissingLeft { line }),
        _ => return Err(SyntaxError::MissingArrow { line }),
    }

    Ok(())
}
