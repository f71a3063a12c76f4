//! Barry: a backtracking binding-power parser that reads a line of text into
//! a tree of [`Idea`]s, and a small evaluator that reduces such trees.
//!
//! ```
//! let tree = barry::parse("(1+2)*3");
//! assert_eq!(tree.to_string(), "(1+2)*3");
//! assert_eq!(tree.eval(), barry::Idea::Number(9.0));
//! ```

pub mod error;
pub mod eval;
pub mod grammar;
pub mod idea;
pub mod lex;
pub mod parse;
pub mod seal;
pub mod view;

pub use error::{GrammarError, Jam, JamReport, Located};
pub use eval::eval;
pub use grammar::{Grammar, Limits, Operator};
pub use idea::{Bind, Idea, Kind, Label, Layout, List, Operands};
pub use lex::{Lexeme, Lexer, Spelled, Token};
pub use parse::{Parse, Parser};
pub use seal::{Constructor, Seal, SealTable};
pub use view::{Info, LayoutView, LineView};

/// Parses `input` with the default grammar and returns the tree.
pub fn parse(input: &str) -> Idea {
    Parser::default().parse(input).tree
}
