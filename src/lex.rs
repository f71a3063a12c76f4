use std::fmt::Display;
use std::ops::Range;

use log::trace;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::grammar::Grammar;
use crate::idea::Idea;
use crate::seal::Seal;

/// Order matters: quoted text, parentheses, numbers, seal runs, barewords,
/// whitespace.
static TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r#"^(?:"(?P<quoted>[^"]*)""#,
        r"|(?P<open>\()",
        r"|(?P<close>\))",
        r"|(?P<number>-?\d+(?:\.\d+)?)",
        r#"|(?P<seal>[^\w\s"()]+)"#,
        r"|(?P<word>[^:\s()]+)",
        r"|(?P<space>\s+))",
    ))
    .expect("token pattern is valid")
});

/// One classified piece of input.
#[derive(Debug, Clone, PartialEq)]
pub enum Lexeme {
    Space,
    Open,
    Close,
    Idea(Idea),
    /// Input the parser stopped before, after an unmatched `)` or a limit.
    Unparsed,
}

/// Entry of the parser's token log. The span starts where the previous
/// entry ends.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub end: usize,
    pub lexeme: Lexeme,
}

/// A lexeme next to the text it was read from.
pub struct Spelled<'a, 'de> {
    pub literal: &'de str,
    pub lexeme: &'a Lexeme,
}

impl Display for Spelled<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lit = self.literal;
        match self.lexeme {
            Lexeme::Space => write!(f, "SPACE {lit:?} null"),
            Lexeme::Open => write!(f, "GROUP_OPEN {lit} null"),
            Lexeme::Close => write!(f, "GROUP_CLOSE {lit} null"),
            Lexeme::Unparsed => write!(f, "UNPARSED {lit} null"),
            Lexeme::Idea(idea @ (Idea::Number(_) | Idea::Text(_) | Idea::Word(_))) => {
                write!(f, "{} {lit} {idea}", idea.kind().to_string().to_uppercase())
            }
            Lexeme::Idea(idea) => {
                write!(f, "{} {lit} null", idea.kind().to_string().to_uppercase())
            }
        }
    }
}

/// Regex driven scanner. It keeps no buffer: every lexeme is read on demand
/// at a byte offset, so callers can rewind by simply reusing an old offset.
pub struct Lexer<'de, 'g> {
    whole: &'de str,
    grammar: &'g Grammar,
    byte: usize,
}

impl<'de, 'g> Lexer<'de, 'g> {
    pub fn new(input: &'de str, grammar: &'g Grammar) -> Self {
        Lexer {
            whole: input,
            grammar,
            byte: 0,
        }
    }

    pub fn whole(&self) -> &'de str {
        self.whole
    }

    /// Classifies the lexeme starting at byte `at` and returns where it ends.
    /// `None` at the end of input.
    pub fn lexeme_at(&self, at: usize) -> Option<(usize, Lexeme)> {
        let rest = self.whole.get(at..).filter(|rest| !rest.is_empty())?;
        let captures = TOKEN.captures(rest)?;
        let end = at + captures.get(0)?.end();

        let found = if let Some(quoted) = captures.name("quoted") {
            (end, Lexeme::Idea(Idea::Text(quoted.as_str().to_string())))
        } else if captures.name("open").is_some() {
            (end, Lexeme::Open)
        } else if captures.name("close").is_some() {
            (end, Lexeme::Close)
        } else if let Some(number) = captures.name("number") {
            let literal = number.as_str();
            let idea = match literal.parse() {
                Ok(n) => Idea::Number(n),
                Err(_) => Idea::Word(literal.to_string()),
            };
            (end, Lexeme::Idea(idea))
        } else if let Some(run) = captures.name("seal") {
            let run = run.as_str();
            let seal = self.grammar.seals().resolve(run);
            let idea = match seal {
                Seal::Known { make, .. } => make(),
                Seal::Unknown { len } => Idea::Word(run[..len].to_string()),
            };
            (at + seal.consumed(), Lexeme::Idea(idea))
        } else if let Some(word) = captures.name("word") {
            let word = word.as_str();
            let idea = match self.grammar.name(word) {
                Some(make) => make(),
                None => Idea::Word(word.to_string()),
            };
            (end, Lexeme::Idea(idea))
        } else {
            (end, Lexeme::Space)
        };

        trace!("lexeme {:?} at {at}..{}", found.1, found.0);
        Some(found)
    }
}

impl Iterator for Lexer<'_, '_> {
    type Item = (Range<usize>, Lexeme);

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.byte;
        let (end, lexeme) = self.lexeme_at(start)?;
        self.byte = end;
        Some((start..end, lexeme))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(input: &str) -> Vec<(Range<usize>, Lexeme)> {
        let grammar = Grammar::default();
        Lexer::new(input, &grammar).collect()
    }

    fn idea(idea: Idea) -> Lexeme {
        Lexeme::Idea(idea)
    }

    #[test]
    fn empty() {
        assert_eq!(lex(""), vec![]);
    }

    #[test]
    fn classes() {
        assert_eq!(
            lex("  42.5 \"hi there\"(x)"),
            vec![
                (0..2, Lexeme::Space),
                (2..6, idea(Idea::Number(42.5))),
                (6..7, Lexeme::Space),
                (7..17, idea(Idea::Text("hi there".into()))),
                (17..18, Lexeme::Open),
                (18..19, idea(Idea::Word("x".into()))),
                (19..20, Lexeme::Close),
            ]
        );
    }

    #[test]
    fn sign_belongs_to_number() {
        assert_eq!(lex("-7"), vec![(0..2, idea(Idea::Number(-7.0)))]);
        assert_eq!(
            lex("1-2"),
            vec![(0..1, idea(Idea::Number(1.0))), (1..3, idea(Idea::Number(-2.0)))]
        );
    }

    #[test]
    fn trailing_dot_is_not_part_of_number() {
        assert_eq!(
            lex("12."),
            vec![(0..2, idea(Idea::Number(12.0))), (2..3, idea(Idea::Word(".".into())))]
        );
    }

    #[test]
    fn seal_runs_split_on_registered_symbols() {
        assert_eq!(
            lex("1+*2"),
            vec![
                (0..1, idea(Idea::Number(1.0))),
                (1..2, idea(Idea::add())),
                (2..3, idea(Idea::multiply())),
                (3..4, idea(Idea::Number(2.0))),
            ]
        );
        assert_eq!(
            lex("#$+"),
            vec![(0..2, idea(Idea::Word("#$".into()))), (2..3, idea(Idea::add()))]
        );
    }

    #[test]
    fn colon_ends_a_bareword() {
        assert_eq!(
            lex("name:"),
            vec![(0..4, idea(Idea::Word("name".into()))), (4..5, idea(Idea::label()))]
        );
    }

    #[test]
    fn bareword_stops_at_parentheses() {
        assert_eq!(
            lex("ab)"),
            vec![(0..2, idea(Idea::Word("ab".into()))), (2..3, Lexeme::Close)]
        );
    }

    #[test]
    fn unterminated_quote_is_a_word() {
        assert_eq!(lex("\"abc"), vec![(0..4, idea(Idea::Word("\"abc".into())))]);
    }

    #[test]
    fn names_build_their_idea() {
        let grammar = Grammar::default()
            .with_name("plus", Idea::add)
            .unwrap();
        let lexemes: Vec<_> = Lexer::new("plus", &grammar).collect();
        assert_eq!(lexemes, vec![(0..4, idea(Idea::add()))]);
    }

    #[test]
    fn spelled() {
        let number = idea(Idea::Number(1.5));
        let shown = Spelled {
            literal: "1.5",
            lexeme: &number,
        };
        assert_eq!(shown.to_string(), "NUMBER 1.5 1.5");

        let add = idea(Idea::add());
        let shown = Spelled {
            literal: "+",
            lexeme: &add,
        };
        assert_eq!(shown.to_string(), "ADD + null");
    }
}
