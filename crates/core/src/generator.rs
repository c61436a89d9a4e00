use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::model::{Sequence, Symbol};

//
// ─── SYMBOL SOURCES ────────────────────────────────────────────────────────────
//

/// Random source the generator draws from.
///
/// Each session owns its own source so sessions never share RNG state.
pub trait SymbolSource: Send {
    /// Draw an index in `0..bound`. `bound` is always > 0.
    fn next_index(&mut self, bound: u8) -> u8;
}

/// Uniform draws from a `StdRng`.
#[derive(Debug, Clone)]
pub struct SeededSource {
    rng: StdRng,
}

impl SeededSource {
    /// Deterministic source: equal seeds produce equal draws.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Source seeded from the operating system.
    #[must_use]
    pub fn from_os() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }
}

impl SymbolSource for SeededSource {
    fn next_index(&mut self, bound: u8) -> u8 {
        self.rng.random_range(0..bound.max(1))
    }
}

/// Replays a fixed script of indices, cycling when exhausted.
///
/// Values are reduced modulo the bound so a script written for a large board
/// still yields legal symbols on a small one.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    script: Vec<u8>,
    cursor: usize,
}

impl ScriptedSource {
    #[must_use]
    pub fn new(script: impl Into<Vec<u8>>) -> Self {
        Self {
            script: script.into(),
            cursor: 0,
        }
    }
}

impl SymbolSource for ScriptedSource {
    fn next_index(&mut self, bound: u8) -> u8 {
        if self.script.is_empty() {
            return 0;
        }
        let value = self.script[self.cursor % self.script.len()];
        self.cursor = self.cursor.wrapping_add(1);
        value % bound.max(1)
    }
}

//
// ─── GENERATOR ─────────────────────────────────────────────────────────────────
//

/// Grows a sequence by one symbol per round.
pub struct SequenceGenerator;

impl SequenceGenerator {
    /// Return `sequence` with one more symbol drawn uniformly from
    /// `0..symbol_count`. Repeats are allowed; earlier symbols are untouched.
    #[must_use]
    pub fn next(sequence: &Sequence, symbol_count: u8, source: &mut dyn SymbolSource) -> Sequence {
        let mut next = sequence.clone();
        next.push(Symbol::new(source.next_index(symbol_count)));
        next
    }
}
