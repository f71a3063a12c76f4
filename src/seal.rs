use std::collections::HashMap;

use crate::idea::Idea;

/// Builds the empty node a registered symbol or name stands for.
pub type Constructor = fn() -> Idea;

/// Outcome of resolving a run of symbol characters.
#[derive(Debug, Clone, Copy)]
pub enum Seal {
    /// The first `len` bytes are a registered symbol.
    Known { len: usize, make: Constructor },
    /// The first `len` bytes match nothing and are literal text.
    Unknown { len: usize },
}

impl Seal {
    pub fn consumed(&self) -> usize {
        match self {
            Seal::Known { len, .. } | Seal::Unknown { len } => *len,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SealTable {
    symbols: HashMap<String, Constructor>,
}

impl SealTable {
    pub fn insert(&mut self, symbol: impl Into<String>, make: Constructor) {
        self.symbols.insert(symbol.into(), make);
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.contains_key(symbol)
    }

    fn longest_prefix(&self, run: &str) -> Option<(usize, Constructor)> {
        run.char_indices()
            .map(|(at, c)| at + c.len_utf8())
            .rev()
            .find_map(|end| self.symbols.get(&run[..end]).map(|&make| (end, make)))
    }

    /// Splits the leading seal off `run`.
    ///
    /// The longest registered prefix wins. Without one, characters are taken
    /// as literal text up to the first position where a registered symbol
    /// starts, always at least one character.
    pub fn resolve(&self, run: &str) -> Seal {
        if let Some((len, make)) = self.longest_prefix(run) {
            return Seal::Known { len, make };
        }
        let len = run
            .char_indices()
            .skip(1)
            .map(|(at, _)| at)
            .find(|&at| self.longest_prefix(&run[at..]).is_some())
            .unwrap_or(run.len());
        Seal::Unknown { len }
    }
}
