use std::collections::HashMap;
use std::str::FromStr;

use log::debug;

use crate::error::GrammarError;
use crate::idea::Idea;
use crate::seal::{Constructor, SealTable};

/// Bounds on the work a single parse may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Nested `next`/look-ahead calls. Every operator in a chain such as
    /// `1+1+1` nests two levels deeper (its look-ahead and its right
    /// operand), so the default of 256 holds chains of up to about 128
    /// terms.
    pub max_depth: usize,
    /// Total `next`/look-ahead calls, backtracked ones included.
    pub max_steps: usize,
}

impl Limits {
    pub const DEFAULT: Limits = Limits {
        max_depth: 256,
        max_steps: 1_000_000,
    };
}

impl Default for Limits {
    fn default() -> Self {
        Limits::DEFAULT
    }
}

/// The operators a symbol or name can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Multiply,
    Label,
}

impl Operator {
    pub fn constructor(self) -> Constructor {
        match self {
            Operator::Add => Idea::add,
            Operator::Multiply => Idea::multiply,
            Operator::Label => Idea::label,
        }
    }
}

impl FromStr for Operator {
    type Err = GrammarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" | "+" => Ok(Operator::Add),
            "mul" | "multiply" | "*" => Ok(Operator::Multiply),
            "label" | ":" => Ok(Operator::Label),
            other => Err(GrammarError::UnknownOperator(other.to_string())),
        }
    }
}

/// Immutable parser configuration: which symbols and barewords build which
/// ideas, and how much work a parse may do.
///
/// ```
/// use barry::{Grammar, Operator};
///
/// let grammar = Grammar::default()
///     .with_seal("×", Operator::Multiply.constructor())?
///     .with_name("plus", Operator::Add.constructor())?;
/// # Ok::<(), barry::GrammarError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Grammar {
    seals: SealTable,
    names: HashMap<String, Constructor>,
    limits: Limits,
}

impl Default for Grammar {
    fn default() -> Self {
        let mut seals = SealTable::default();
        seals.insert("+", Operator::Add.constructor());
        seals.insert("*", Operator::Multiply.constructor());
        seals.insert(":", Operator::Label.constructor());
        Grammar {
            seals,
            names: HashMap::new(),
            limits: Limits::default(),
        }
    }
}

impl Grammar {
    /// No symbols, no names, default limits.
    pub fn empty() -> Self {
        Grammar {
            seals: SealTable::default(),
            names: HashMap::new(),
            limits: Limits::default(),
        }
    }

    pub fn with_seal(mut self, symbol: &str, make: Constructor) -> Result<Self, GrammarError> {
        if symbol.is_empty() {
            return Err(GrammarError::EmptySymbol);
        }
        if symbol.chars().any(|c| is_word_char(c) || is_reserved(c)) {
            return Err(GrammarError::UnsealableSymbol(symbol.to_string()));
        }
        if self.seals.contains(symbol) {
            debug!("seal `{symbol}` redefined");
        }
        self.seals.insert(symbol, make);
        Ok(self)
    }

    pub fn with_name(mut self, name: &str, make: Constructor) -> Result<Self, GrammarError> {
        let Some(first) = name.chars().next() else {
            return Err(GrammarError::EmptyName);
        };
        let unreachable = !is_word_char(first)
            || first.is_numeric()
            || name.chars().any(|c| c == ':' || is_reserved(c));
        if unreachable {
            return Err(GrammarError::UnreachableName(name.to_string()));
        }
        self.names.insert(name.to_string(), make);
        Ok(self)
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn seals(&self) -> &SealTable {
        &self.seals
    }

    pub fn name(&self, word: &str) -> Option<Constructor> {
        self.names.get(word).copied()
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_reserved(c: char) -> bool {
    c.is_whitespace() || matches!(c, '"' | '(' | ')')
}
