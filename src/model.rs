/*
 * This source code is licensed under the Business Source License 1.1.
 */

//! The model capability the caches are generic over.
//!
//! A mixture model splits into two independent halves:
//!
//! - a **clustering** prior that only sees group sizes ([`Clustering`]), used
//!   by [`crate::driver::GroupCountCache`];
//! - a **component** likelihood with per-group sufficient statistics
//!   ([`Component`] + [`Group`]), used by [`crate::slave::GroupStateCache`].
//!
//! The caches never look inside a group.  Everything they know about a
//! model goes through these traits, so a new distribution is added by
//! implementing them, never by touching the caches.
//!
//! # Implementing a component model
//!
//! ```rust
//! use mixture_cache::model::{Component, Group};
//! use rand::Rng;
//!
//! struct CountOnly;
//!
//! #[derive(Default)]
//! struct Tally { n: u32 }
//!
//! impl Group<CountOnly> for Tally {
//!     fn init<R: Rng + ?Sized>(_model: &CountOnly, _rng: &mut R) -> Self {
//!         Tally::default()
//!     }
//!     fn add_value<R: Rng + ?Sized>(&mut self, _m: &CountOnly, _v: &(), _rng: &mut R) {
//!         self.n += 1;
//!     }
//!     fn remove_value<R: Rng + ?Sized>(&mut self, _m: &CountOnly, _v: &(), _rng: &mut R) {
//!         self.n -= 1;
//!     }
//!     fn score<R: Rng + ?Sized>(&self, _m: &CountOnly, _v: &(), _rng: &mut R) -> f32 {
//!         0.0
//!     }
//! }
//!
//! impl Component for CountOnly {
//!     type Value = ();
//!     type Group = Tally;
//!     fn score_group<R: Rng + ?Sized>(&self, _group: &Tally, _rng: &mut R) -> f32 {
//!         0.0
//!     }
//! }
//! ```

use rand::Rng;

use crate::count::Count;

// ─── Clustering ──────────────────────────────────────────────────────────────

/// Count-level scoring: the prior over partitions.
///
/// All scores are natural-log probabilities in single precision.
pub trait Clustering<C: Count> {
    /// Log-score of adding one value to a group currently holding
    /// `group_size` items.
    ///
    /// `nonempty_group_count` and `empty_group_count` describe the whole
    /// packed array; `sample_size` is the total number of assigned items.
    fn score_add_value(
        &self,
        group_size: C,
        nonempty_group_count: usize,
        sample_size: C,
        empty_group_count: usize,
    ) -> f32;

    /// Log-score of the whole count vector (the clustering structure).
    fn score_counts(&self, counts: &[C]) -> f32;
}

// ─── Component ───────────────────────────────────────────────────────────────

/// Value-level scoring: the per-group likelihood.
pub trait Component {
    /// A single observation.
    type Value;

    /// Sufficient statistics for one group.
    type Group: Group<Self>;

    /// Log marginal likelihood of everything held by `group`.
    fn score_group<R: Rng + ?Sized>(&self, group: &Self::Group, rng: &mut R) -> f32;
}

/// Per-group sufficient statistics.
///
/// Mutation happens in place; `add_value` followed by `remove_value` of the
/// same value must restore the statistics exactly.
pub trait Group<M: Component + ?Sized>: Sized {
    /// Construct an empty group.  May consume randomness.
    fn init<R: Rng + ?Sized>(model: &M, rng: &mut R) -> Self;

    /// Fold `value` into the statistics.
    fn add_value<R: Rng + ?Sized>(&mut self, model: &M, value: &M::Value, rng: &mut R);

    /// Remove a previously added `value` from the statistics.
    fn remove_value<R: Rng + ?Sized>(&mut self, model: &M, value: &M::Value, rng: &mut R);

    /// Log predictive score of adding `value` to this group.
    fn score<R: Rng + ?Sized>(&self, model: &M, value: &M::Value, rng: &mut R) -> f32;
}
