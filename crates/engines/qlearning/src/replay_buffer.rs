use std::collections::VecDeque;

use rand::seq::index;
use rand::Rng;

use crate::encoder::Fingerprint;

/// One observed move: the fingerprints on either side of it, the move in UCI
/// notation and the reward it earned.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: Fingerprint,
    pub action: String,
    pub reward: f64,
    pub next_state: Fingerprint,
}

impl Transition {
    pub fn new(
        state: Fingerprint,
        action: impl Into<String>,
        reward: f64,
        next_state: Fingerprint,
    ) -> Self {
        Self {
            state,
            action: action.into(),
            reward,
            next_state,
        }
    }
}

/// Bounded FIFO of transitions. Pushing into a full buffer evicts the oldest.
#[derive(Debug, Clone)]
pub struct ReplayBuffer {
    buffer: VecDeque<Transition>,
    capacity: usize,
}

impl ReplayBuffer {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "replay buffer capacity must be > 0");
        ReplayBuffer {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Add a transition, returning the evicted one when the buffer was full.
    pub fn push(&mut self, transition: Transition) -> Option<Transition> {
        let evicted = if self.buffer.len() == self.capacity {
            self.buffer.pop_front()
        } else {
            None
        };
        self.buffer.push_back(transition);
        evicted
    }

    /// Uniform sample of up to `batch_size` distinct entries.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R, batch_size: usize) -> Vec<&Transition> {
        let amount = batch_size.min(self.buffer.len());
        if amount == 0 {
            return Vec::new();
        }
        index::sample(rng, self.buffer.len(), amount)
            .iter()
            .map(|i| &self.buffer[i])
            .collect()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.buffer.iter()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
#[path = "replay_buffer_tests.rs"]
mod replay_buffer_tests;
