use std::ops::Range;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// A non-fatal problem noticed while parsing.
///
/// Jams never stop a parse. They ride along on the node that caused them
/// (see [`crate::Idea::jam`]) and are collected, with their byte span, on
/// [`crate::Parse::jams`].
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum Jam {
    #[error("duplicate label `{name}`, renamed to `{renamed}`")]
    #[diagnostic(
        code(barry::duplicate_label),
        help("labels in one list must be unique, rename one of them")
    )]
    DuplicateLabel { name: String, renamed: String },

    #[error("unmatched `)`")]
    #[diagnostic(
        code(barry::unmatched_close),
        help("everything from here to the end of the line was left unparsed")
    )]
    UnmatchedClose,

    #[error("expression nested deeper than {limit} levels")]
    #[diagnostic(code(barry::depth_limit), help("raise `--max-depth` or flatten the input"))]
    DepthLimit { limit: usize },

    #[error("gave up after {limit} parse steps")]
    #[diagnostic(code(barry::step_limit), help("raise `--max-steps` or shorten the input"))]
    StepLimit { limit: usize },
}

/// A [`Jam`] together with the bytes of the input it is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located {
    pub jam: Jam,
    pub span: Range<usize>,
}

impl Located {
    pub fn report(&self, name: &str, source: &str) -> JamReport {
        JamReport {
            src: NamedSource::new(name, source.to_string()),
            span: SourceSpan::from(self.span.clone()),
            help: self.jam.help().map(|help| help.to_string()),
            jam: self.jam.clone(),
        }
    }
}

#[derive(Error, Debug, Diagnostic)]
#[error("{jam}")]
#[diagnostic(severity(Warning))]
pub struct JamReport {
    #[source_code]
    src: NamedSource<String>,

    #[label("here")]
    span: SourceSpan,

    #[help]
    help: Option<String>,

    pub jam: Jam,
}

/// Rejected grammar configuration.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum GrammarError {
    #[error("empty operator symbol")]
    EmptySymbol,

    #[error("`{0}` can never be scanned as an operator symbol")]
    #[diagnostic(help(
        "symbols may not contain letters, digits, `_`, whitespace, quotes or parentheses"
    ))]
    UnsealableSymbol(String),

    #[error("empty name")]
    EmptyName,

    #[error("`{0}` can never be scanned as a bareword")]
    #[diagnostic(help(
        "names start with a letter or `_` and contain no whitespace, `:` or parentheses"
    ))]
    UnreachableName(String),

    #[error("unknown operator `{0}`")]
    #[diagnostic(help("expected one of `add`, `mul` or `label`"))]
    UnknownOperator(String),

    #[error("expected `{0}` to look like `SYMBOL=OP`")]
    MalformedAlias(String),
}
