//! Identifiers and their allocation.
//!
//! Both poset handles and element ids are plain `u64` values wrapped in
//! newtypes. Allocation draws a candidate, probes the owning container and
//! steps forward until it finds a free value, so an id is never handed out
//! twice while its owner is still alive.

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Opaque handle naming one poset in a [`Registry`](crate::Registry).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PosetHandle(pub u64);

impl fmt::Debug for PosetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Poset({})", self.0)
    }
}

impl fmt::Display for PosetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PosetHandle {
    fn from(raw: u64) -> Self {
        PosetHandle(raw)
    }
}

/// Internal id of an element, distinct from its public name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

/// How fresh candidates are drawn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IdStrategy {
    /// 0, 1, 2, ... skipping values still in use.
    Sequential,
    /// Uniform random draws. `None` seeds from a fixed constant so runs are
    /// reproducible.
    Random { seed: Option<u64> },
}

impl Default for IdStrategy {
    fn default() -> Self {
        IdStrategy::Random { seed: None }
    }
}

const DEFAULT_SEED: u64 = 5489;

enum Source {
    Counter(u64),
    Rng(StdRng),
}

/// Collision-avoiding id allocator handing out values in `0..=max`.
pub struct IdAllocator {
    source: Source,
    max: u64,
}

impl IdAllocator {
    pub fn new(strategy: &IdStrategy) -> Self {
        Self::bounded(strategy, u64::MAX)
    }

    /// Like [`IdAllocator::new`], but never returns a value above `max`.
    pub fn bounded(strategy: &IdStrategy, max: u64) -> Self {
        let source = match strategy {
            IdStrategy::Sequential => Source::Counter(0),
            IdStrategy::Random { seed } => {
                Source::Rng(StdRng::seed_from_u64(seed.unwrap_or(DEFAULT_SEED)))
            }
        };
        Self { source, max }
    }

    pub fn sequential() -> Self {
        Self::new(&IdStrategy::Sequential)
    }

    /// Returns the first value at or after a fresh candidate for which
    /// `taken` is false, wrapping from `max` back to 0.
    pub fn allocate(&mut self, taken: impl Fn(u64) -> bool) -> u64 {
        let mut candidate = match &mut self.source {
            Source::Counter(next) => *next,
            Source::Rng(rng) => rng.gen_range(0..=self.max),
        };
        while taken(candidate) {
            candidate = self.step(candidate);
        }
        let after = self.step(candidate);
        if let Source::Counter(next) = &mut self.source {
            *next = after;
        }
        candidate
    }

    fn step(&self, value: u64) -> u64 {
        if value >= self.max {
            0
        } else {
            value + 1
        }
    }
}

impl fmt::Debug for IdAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("IdAllocator");
        match &self.source {
            Source::Counter(next) => s.field("next", next),
            Source::Rng(_) => s.field("source", &"rng"),
        };
        s.field("max", &self.max).finish()
    }
}
