/*
 * This source code is licensed under the Business Source License 1.1.
 */

//! Counts, group states and stable ids driven in lock-step.
//!
//! The three caches are independent; a Gibbs sampler that wants all of them
//! must forward every structural event from the count cache to the other
//! two before touching anything else.  [`Mixture`] does that forwarding.
//!
//! ```rust
//! use mixture_cache::config::CacheConfig;
//! use mixture_cache::mixture::Mixture;
//! use mixture_cache::models::{BetaBernoulli, PitmanYor};
//! use rand::rngs::mock::StepRng;
//!
//! let prior = PitmanYor::dirichlet_process(1.0);
//! let model = BetaBernoulli::default();
//! let mut rng = StepRng::new(0, 1);
//!
//! let mut mix: Mixture<u32, BetaBernoulli> =
//!     Mixture::new(&model, CacheConfig::exhaustive(), &mut rng);
//! let global = mix.ids().packed_to_global(0);
//! assert!(mix.add_value(&model, 0, &true, &mut rng)); // opened a cluster
//!
//! let mut scores = Vec::new();
//! mix.score_value(&prior, &model, &false, &mut scores, &mut rng);
//! assert_eq!(scores.len(), 2);
//!
//! assert!(mix.remove_value(&model, 0, &true, &mut rng)); // closed it
//! assert!(!mix.ids().is_live(global));
//! ```

use alloc::vec::Vec;

use rand::Rng;

use crate::config::{CacheConfig, CheckLevel};
use crate::count::Count;
use crate::driver::GroupCountCache;
use crate::model::{Clustering, Component};
use crate::slave::GroupStateCache;
use crate::tracker::{Id, StableIdTracker};

// ─── Mixture ─────────────────────────────────────────────────────────────────

/// A [`GroupCountCache`], [`GroupStateCache`] and [`StableIdTracker`] kept
/// index-aligned.
///
/// Every update moves a single item, so group counts change by one.
pub struct Mixture<C: Count, M: Component> {
    counts: GroupCountCache<C>,
    groups: GroupStateCache<M>,
    ids: StableIdTracker,
}

impl<C: Count, M: Component> Mixture<C, M> {
    /// Create a mixture with a single empty group.
    pub fn new<R: Rng + ?Sized>(model: &M, config: CacheConfig, rng: &mut R) -> Self {
        let mut counts = GroupCountCache::new(config.clone());
        counts.init(alloc::vec![C::ZERO]);
        let mut groups = GroupStateCache::new(config.clone());
        groups.init(model, 1, rng);
        let mut ids = StableIdTracker::new(config);
        ids.init(1);
        Self {
            counts,
            groups,
            ids,
        }
    }

    /// The count cache.
    #[inline]
    pub fn counts(&self) -> &GroupCountCache<C> {
        &self.counts
    }

    /// The group state cache.
    #[inline]
    pub fn groups(&self) -> &GroupStateCache<M> {
        &self.groups
    }

    /// The stable id tracker.
    #[inline]
    pub fn ids(&self) -> &StableIdTracker {
        &self.ids
    }

    /// Number of groups, empty ones included.
    #[inline]
    pub fn group_count(&self) -> usize {
        self.counts.group_count()
    }

    /// Set the check level of all three components.
    pub fn set_check_level(&mut self, level: CheckLevel) {
        self.counts.set_check_level(level);
        self.groups.set_check_level(level);
        self.ids.set_check_level(level);
    }

    /// Assign `value` to group `groupid`.
    ///
    /// Returns `true` if the group was empty; a new empty group has then
    /// been appended to every component.
    ///
    /// # Panics
    /// If `groupid` is out of range.
    pub fn add_value<R: Rng + ?Sized>(
        &mut self,
        model: &M,
        groupid: usize,
        value: &M::Value,
        rng: &mut R,
    ) -> bool {
        let created = self.counts.add_value(groupid, C::ONE);
        self.groups.add_value(model, groupid, value, rng);
        if created {
            self.groups.add_group(model, rng);
            self.ids.add_group();
        }
        self.check_alignment();
        created
    }

    /// Unassign `value` from group `groupid`.
    ///
    /// Returns `true` if the group was drained; it has then been removed
    /// from every component and the last group moved into `groupid`.
    ///
    /// # Panics
    /// If `groupid` is out of range or the group is empty.
    pub fn remove_value<R: Rng + ?Sized>(
        &mut self,
        model: &M,
        groupid: usize,
        value: &M::Value,
        rng: &mut R,
    ) -> bool {
        let removed = self.counts.remove_value(groupid, C::ONE);
        self.groups.remove_value(model, groupid, value, rng);
        if removed {
            self.groups.remove_group(groupid);
            self.ids.remove_group(groupid as Id);
        }
        self.check_alignment();
        removed
    }

    /// Score `value` against every group, resizing `scores` to the group
    /// count.
    ///
    /// `scores[i]` is the clustering score of joining group `i` plus group
    /// `i`'s predictive score for `value`.
    pub fn score_value<K: Clustering<C>, R: Rng + ?Sized>(
        &self,
        clustering: &K,
        model: &M,
        value: &M::Value,
        scores: &mut Vec<f32>,
        rng: &mut R,
    ) {
        scores.clear();
        scores.resize(self.counts.group_count(), 0.0);
        self.counts.score_value(clustering, scores);
        self.groups.score_value(model, value, scores, rng);
    }

    /// Joint score of the clustering and every group.
    pub fn score_mixture<K: Clustering<C>, R: Rng + ?Sized>(
        &self,
        clustering: &K,
        model: &M,
        rng: &mut R,
    ) -> f32 {
        self.counts.score_mixture(clustering) + self.groups.score_mixture(model, rng)
    }

    /// Assert that all three components describe the same groups.
    ///
    /// # Panics
    /// On any length mismatch or broken cache invariant.
    pub fn validate(&self) {
        assert_eq!(
            self.counts.group_count(),
            self.groups.len(),
            "count and group state caches are misaligned"
        );
        assert_eq!(
            self.counts.group_count(),
            self.ids.packed_size(),
            "count cache and id tracker are misaligned"
        );
        self.counts.validate();
        self.ids.validate();
    }

    fn check_alignment(&self) {
        if self.counts.check_level().is_exhaustive() {
            self.validate();
        }
    }
}

impl<C: Count, M: Component> Clone for Mixture<C, M>
where
    M::Group: Clone,
{
    fn clone(&self) -> Self {
        Self {
            counts: self.counts.clone(),
            groups: self.groups.clone(),
            ids: self.ids.clone(),
        }
    }
}

impl<C: Count, M: Component> core::fmt::Debug for Mixture<C, M>
where
    M::Group: core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Mixture")
            .field("counts", &self.counts)
            .field("groups", &self.groups)
            .field("ids", &self.ids)
            .finish()
    }
}
