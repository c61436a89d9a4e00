use serde::{Deserialize, Serialize};
use std::fmt;

/// Index into the active level's board of buttons.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Symbol(u8);

impl Symbol {
    #[must_use]
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    #[must_use]
    pub fn value(&self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn index(&self) -> usize {
        usize::from(self.0)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.0)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The target sequence for a session.
///
/// Append-only: symbols are never removed or rewritten, so every round's
/// sequence is a prefix of the next one. Its length is the current round number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence(Vec<Symbol>);

impl Sequence {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, symbol: Symbol) {
        self.0.push(symbol);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<Symbol> {
        self.0.get(index).copied()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Symbol] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.0.iter().copied()
    }
}

impl From<Vec<Symbol>> for Sequence {
    fn from(symbols: Vec<Symbol>) -> Self {
        Self(symbols)
    }
}

/// Presses accepted so far in the open round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerProgress(Vec<Symbol>);

impl PlayerProgress {
    pub(crate) fn push(&mut self, symbol: Symbol) {
        self.0.push(symbol);
    }

    pub(crate) fn clear(&mut self) {
        self.0.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<Symbol> {
        self.0.last().copied()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Symbol] {
        &self.0
    }
}
