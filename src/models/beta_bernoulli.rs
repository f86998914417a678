/*
 * This source code is licensed under the Business Source License 1.1.
 */

//! Beta-Bernoulli component model.
//!
//! Each group holds head/tail counts; the Beta(α, β) prior is integrated
//! out, so scores are exact posterior predictives and marginals.

use rand::Rng;

use crate::math::ln;
use crate::model::{Component, Group};

/// Shared Beta(α, β) prior over each group's success probability.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BetaBernoulli {
    /// Prior pseudo-count of heads.  Must be positive.
    pub alpha: f32,
    /// Prior pseudo-count of tails.  Must be positive.
    pub beta: f32,
}

impl BetaBernoulli {
    /// Create a prior.
    ///
    /// # Panics
    /// If either hyperparameter is not positive.
    pub fn new(alpha: f32, beta: f32) -> Self {
        assert!(alpha > 0.0, "alpha must be positive: {}", alpha);
        assert!(beta > 0.0, "beta must be positive: {}", beta);
        Self { alpha, beta }
    }
}

impl Default for BetaBernoulli {
    /// The uniform prior Beta(1, 1).
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

/// Sufficient statistics of one Beta-Bernoulli group.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BetaBernoulliGroup {
    /// Number of `true` observations.
    pub heads: u32,
    /// Number of `false` observations.
    pub tails: u32,
}

impl BetaBernoulliGroup {
    /// Total observations in the group.
    #[inline]
    pub fn count(&self) -> u32 {
        self.heads + self.tails
    }
}

impl Group<BetaBernoulli> for BetaBernoulliGroup {
    fn init<R: Rng + ?Sized>(_model: &BetaBernoulli, _rng: &mut R) -> Self {
        Self::default()
    }

    fn add_value<R: Rng + ?Sized>(&mut self, _model: &BetaBernoulli, value: &bool, _rng: &mut R) {
        if *value {
            self.heads += 1;
        } else {
            self.tails += 1;
        }
    }

    /// # Panics
    /// If the group holds no observation equal to `value`.
    fn remove_value<R: Rng + ?Sized>(
        &mut self,
        _model: &BetaBernoulli,
        value: &bool,
        _rng: &mut R,
    ) {
        if *value {
            assert!(self.heads > 0, "cannot remove a head from a group with none");
            self.heads -= 1;
        } else {
            assert!(self.tails > 0, "cannot remove a tail from a group with none");
            self.tails -= 1;
        }
    }

    fn score<R: Rng + ?Sized>(&self, model: &BetaBernoulli, value: &bool, _rng: &mut R) -> f32 {
        let total = model.alpha + model.beta + self.count() as f32;
        let numer = if *value {
            model.alpha + self.heads as f32
        } else {
            model.beta + self.tails as f32
        };
        ln(numer / total)
    }
}

impl Component for BetaBernoulli {
    type Value = bool;
    type Group = BetaBernoulliGroup;

    /// `ln B(α + heads, β + tails) − ln B(α, β)`, as a sum of predictive terms.
    fn score_group<R: Rng + ?Sized>(&self, group: &BetaBernoulliGroup, _rng: &mut R) -> f32 {
        let mut score = 0.0f32;
        for i in 0..group.heads {
            score += ln(self.alpha + i as f32);
        }
        for i in 0..group.tails {
            score += ln(self.beta + i as f32);
        }
        for i in 0..group.count() {
            score -= ln(self.alpha + self.beta + i as f32);
        }
        score
    }
}
