//! Learning engine: owns the value table, the replay buffer and the
//! exploration schedule, and applies tabular Q-learning updates.

use chess_core::{Color, Position, PositionError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::config::{HyperparameterUpdate, Hyperparameters};
use crate::encoder::{self, Fingerprint};
use crate::error::ConfigError;
use crate::replay_buffer::{ReplayBuffer, Transition};
use crate::value_store::ValueStore;

/// Value of a checkmated position for the side that delivered mate.
pub const MATE_VALUE: f64 = 100.0;

/// Bias added to the fallback value of an unseen position.
const WHITE_ADVANTAGE: f64 = 0.25;
const JITTER: f64 = 0.15;

/// Replay passes learn at this fraction of `alpha`.
const REPLAY_ALPHA_SCALE: f64 = 0.5;

pub struct QLearner {
    values: ValueStore,
    replay: ReplayBuffer,
    params: Hyperparameters,
    epsilon: f64,
    /// Upper bound for epsilon; reset whenever epsilon is set explicitly.
    initial_epsilon: f64,
    positions_evaluated: u64,
    rng: StdRng,
}

impl QLearner {
    /// `seed` fixes exploration, evaluation jitter and replay sampling.
    pub fn new(params: Hyperparameters, seed: Option<u64>) -> Result<Self, ConfigError> {
        params.validate()?;
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(QLearner {
            values: ValueStore::new(),
            replay: ReplayBuffer::new(params.replay_capacity),
            epsilon: params.epsilon,
            initial_epsilon: params.epsilon,
            params,
            positions_evaluated: 0,
            rng,
        })
    }

    /// Value of a position from White's side.
    ///
    /// Terminal positions get fixed values that are never cached. Any other
    /// position seen for the first time is seeded with its unit-scale
    /// material balance plus a small White bias and random jitter.
    pub fn evaluate(&mut self, pos: &Position) -> f64 {
        self.positions_evaluated += 1;

        if pos.is_checkmate() {
            return match pos.side_to_move() {
                Color::White => -MATE_VALUE,
                Color::Black => MATE_VALUE,
            };
        }
        if pos.is_stalemate() || pos.is_insufficient_material() {
            return 0.0;
        }

        let key = encoder::fingerprint(pos);
        if let Some(value) = self.values.get(&key) {
            return value;
        }

        let value = encoder::unit_material(pos) as f64
            + WHITE_ADVANTAGE
            + self.rng.gen_range(-JITTER..=JITTER);
        self.values.insert(key, value);
        value
    }

    pub fn evaluate_fen(&mut self, fen: &str) -> Result<f64, PositionError> {
        let pos = Position::from_fen(fen)?;
        Ok(self.evaluate(&pos))
    }

    /// Single-transition update.
    ///
    /// Applies the Q-step at full `alpha`, decays epsilon, stores the
    /// transition and runs a replay pass once the buffer is warm. Returns
    /// the number of replayed transitions.
    pub fn update(&mut self, transition: Transition) -> usize {
        self.values.ensure(&transition.state);
        self.values.ensure(&transition.next_state);
        q_step(
            &mut self.values,
            &transition,
            self.params.alpha,
            self.params.gamma,
        );

        self.epsilon = (self.epsilon * self.params.epsilon_decay).max(self.params.epsilon_min);

        self.replay.push(transition);
        if self.replay.len() >= self.params.min_replay_size {
            self.replay_pass()
        } else {
            0
        }
    }

    /// Stores a transition without learning from it.
    pub fn remember(&mut self, transition: Transition) {
        self.replay.push(transition);
    }

    /// Samples a mini-batch and applies the Q-step at half `alpha` to each
    /// sampled transition. Epsilon is left alone. Returns the batch size.
    pub fn replay_pass(&mut self) -> usize {
        let alpha = self.params.alpha * REPLAY_ALPHA_SCALE;
        let gamma = self.params.gamma;
        let batch: Vec<Transition> = self
            .replay
            .sample(&mut self.rng, self.params.batch_size)
            .into_iter()
            .cloned()
            .collect();

        for transition in &batch {
            q_step(&mut self.values, transition, alpha, gamma);
        }
        debug!(
            batch = batch.len(),
            buffer = self.replay.len(),
            "replay pass"
        );
        batch.len()
    }

    /// Adds `delta` to a position's value, creating the entry at zero.
    pub fn nudge(&mut self, key: &Fingerprint, delta: f64) {
        *self.values.entry(key.clone()) += delta;
    }

    /// Applies an update atomically: nothing changes unless every value is
    /// valid.
    pub fn set_hyperparameters(&mut self, update: HyperparameterUpdate) -> Result<(), ConfigError> {
        update.validate(&self.params)?;
        if let Some(epsilon) = update.epsilon {
            self.params.epsilon = epsilon;
            self.epsilon = epsilon;
            self.initial_epsilon = epsilon;
        }
        if let Some(alpha) = update.alpha {
            self.params.alpha = alpha;
        }
        if let Some(gamma) = update.gamma {
            self.params.gamma = gamma;
        }
        Ok(())
    }

    /// Uniform draw in `[0, 1)` used for the exploration roll.
    pub(crate) fn roll(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    pub(crate) fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn initial_epsilon(&self) -> f64 {
        self.initial_epsilon
    }

    pub fn params(&self) -> &Hyperparameters {
        &self.params
    }

    pub fn positions_evaluated(&self) -> u64 {
        self.positions_evaluated
    }

    pub fn values(&self) -> &ValueStore {
        &self.values
    }

    pub fn replay(&self) -> &ReplayBuffer {
        &self.replay
    }
}

/// `V(s) += alpha * (r + gamma * V(s') - V(s))`.
///
/// A missing or non-finite `V(s')` counts as zero.
fn q_step(values: &mut ValueStore, t: &Transition, alpha: f64, gamma: f64) {
    let next = values
        .get(&t.next_state)
        .filter(|v| v.is_finite())
        .unwrap_or(0.0);
    let current = values.entry(t.state.clone());
    *current += alpha * (t.reward + gamma * next - *current);
}

#[cfg(test)]
#[path = "learner_tests.rs"]
mod learner_tests;
