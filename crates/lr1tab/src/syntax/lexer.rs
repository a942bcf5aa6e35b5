//! Lexer implementation.

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Token<'input> {
    Arrow,
    Newline,
    KwStart,
    Symbol(&'input str),
}

lexgen::lexer! {
    pub Lexer -> Token<'input>;

    let whitespace = [' ' '\t'];
    let newline = '\r'* '\n' | '\r';
    let symbol_char = _ # [' ' '\t' '\r' '\n'];

    rule Init {
        $whitespace+,
        $newline = Token::Newline,
        "//" (_ # ['\r' '\n'])*,
        "->" = Token::Arrow,
        "@start" = Token::KwStart,
        $symbol_char+ => |lexer| {
            let token = Token::Symbol(lexer.match_());
            lexer.return_(token)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Token::*;

    fn tokens(input: &str) -> Vec<Token<'_>> {
        Lexer::new(input)
            .map(|res| res.map(|(_, t, _)| t))
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn smoketest() {
        let input = "\
@start E // comments run until the end of line
E -> E + T
F -> ( E ) | id\r
";
        assert_eq!(
            tokens(input),
            [
                KwStart,
                Symbol("E"),
                Newline,
                Symbol("E"),
                Arrow,
                Symbol("E"),
                Symbol("+"),
                Symbol("T"),
                Newline,
                Symbol("F"),
                Arrow,
                Symbol("("),
                Symbol("E"),
                Symbol(")"),
                Symbol("|"),
                Symbol("id"),
                Newline,
            ]
        );
    }

    #[test]
    fn symbols_are_maximal_runs() {
        assert_eq!(
            tokens("a->b -> ->> x//y"),
            [Symbol("a->b"), Arrow, Symbol("->>"), Symbol("x//y")]
        );
    }

    #[test]
    fn locations_are_reported() {
        let spans: Vec<_> = Lexer::new("S -> a\n  b")
            .map(|res| res.map(|(start, _, _)| (start.line, start.col)))
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(spans, [(0, 0), (0, 2), (0, 5), (0, 6), (1, 2)]);
    }
}
