//! Outcome selectors.
//!
//! [`SeededSelector`] picks uniformly among the five outcome variants
//! (success, network, invalid response, rate limit, unknown) from a
//! deterministic RNG. A network pick then flips a fair coin for the
//! temporary flag. [`ScriptedSelector`] replays a fixed list.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::OutcomeKind;

/// Number of outcome variants drawn from, counting both network flavours as one.
const VARIANT_COUNT: u8 = 5;

/// Chooses the outcome of the next fetch attempt.
pub trait OutcomeSelector: Send {
    /// Returns the kind of the next attempt. Called once per attempt.
    fn select(&mut self) -> OutcomeKind;
}

impl<S: OutcomeSelector + ?Sized> OutcomeSelector for Box<S> {
    fn select(&mut self) -> OutcomeKind {
        (**self).select()
    }
}

/// Uniform random selection from a seedable RNG.
///
/// The same seed always yields the same sequence of kinds.
#[derive(Debug, Clone)]
pub struct SeededSelector {
    rng: ChaCha8Rng,
}

impl SeededSelector {
    /// Creates a selector seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Creates a selector seeded from the thread-local RNG.
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_rng(&mut rand::rng()),
        }
    }
}

impl OutcomeSelector for SeededSelector {
    fn select(&mut self) -> OutcomeKind {
        match self.rng.random_range(0..VARIANT_COUNT) {
            0 => OutcomeKind::Success,
            1 => {
                if self.rng.random_bool(0.5) {
                    OutcomeKind::TemporaryNetwork
                } else {
                    OutcomeKind::PermanentNetwork
                }
            }
            2 => OutcomeKind::InvalidResponse,
            3 => OutcomeKind::RateLimit,
            _ => OutcomeKind::Unknown,
        }
    }
}

/// Replays a fixed sequence of kinds, repeating the last one once the
/// script runs out. An empty script always yields success.
#[derive(Debug, Clone)]
pub struct ScriptedSelector {
    script: VecDeque<OutcomeKind>,
    last: OutcomeKind,
}

impl ScriptedSelector {
    pub fn new(script: impl IntoIterator<Item = OutcomeKind>) -> Self {
        Self {
            script: script.into_iter().collect(),
            last: OutcomeKind::Success,
        }
    }

    /// Number of scripted kinds not yet replayed.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl OutcomeSelector for ScriptedSelector {
    fn select(&mut self) -> OutcomeKind {
        if let Some(next) = self.script.pop_front() {
            self.last = next;
        }
        self.last
    }
}
