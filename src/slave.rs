/*
 * This source code is licensed under the Business Source License 1.1.
 */

//! Packed per-group sufficient statistics.
//!
//! [`GroupStateCache`] owns one [`Group`] per packed id and follows the
//! structural events of a [`crate::driver::GroupCountCache`]:
//!
//! - `add_group` once for every `true` returned by the driver's `add_value`;
//! - `remove_group(groupid)` once for every `true` returned by the driver's
//!   `remove_value(groupid, ..)`.
//!
//! Removal uses the same swap-with-last compaction as the driver, so packed
//! id `i` names the same cluster in both caches at all times.

use alloc::vec::Vec;

use rand::Rng;

use crate::config::{CacheConfig, CheckLevel};
use crate::model::{Component, Group};

// ─── GroupStateCache ─────────────────────────────────────────────────────────

/// Sufficient statistics for every group, by packed id.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(bound(
        serialize = "M::Group: serde::Serialize",
        deserialize = "M::Group: serde::Deserialize<'de>"
    ))
)]
pub struct GroupStateCache<M: Component> {
    groups: Vec<M::Group>,
    config: CacheConfig,
}

impl<M: Component> GroupStateCache<M> {
    /// Create a cache holding no groups.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            groups: Vec::new(),
            config,
        }
    }

    /// Drop every group and create `group_count` freshly initialised ones.
    ///
    /// Mirrors [`crate::driver::GroupCountCache::init`]; the caller then
    /// replays the values of every nonempty group through [`Self::add_value`].
    pub fn init<R: Rng + ?Sized>(&mut self, model: &M, group_count: usize, rng: &mut R) {
        self.groups.clear();
        self.groups.reserve(group_count);
        for _ in 0..group_count {
            self.groups.push(<M::Group as Group<M>>::init(model, rng));
        }
        log::debug!("group states initialised: {} groups", group_count);
    }

    /// All groups, by packed id.
    #[inline]
    pub fn groups(&self) -> &[M::Group] {
        &self.groups
    }

    /// All groups, mutably.  The slice length cannot change.
    #[inline]
    pub fn groups_mut(&mut self) -> &mut [M::Group] {
        &mut self.groups
    }

    /// The group at `groupid`.
    ///
    /// # Panics
    /// If `groupid` is out of range.
    pub fn group(&self, groupid: usize) -> &M::Group {
        assert!(
            groupid < self.groups.len(),
            "bad groupid: {} (group count {})",
            groupid,
            self.groups.len()
        );
        &self.groups[groupid]
    }

    /// The group at `groupid`, mutably.
    ///
    /// # Panics
    /// If `groupid` is out of range.
    pub fn group_mut(&mut self, groupid: usize) -> &mut M::Group {
        assert!(
            groupid < self.groups.len(),
            "bad groupid: {} (group count {})",
            groupid,
            self.groups.len()
        );
        &mut self.groups[groupid]
    }

    /// The group at `groupid`, or `None` if out of range.
    #[inline]
    pub fn get(&self, groupid: usize) -> Option<&M::Group> {
        self.groups.get(groupid)
    }

    /// Number of groups.
    #[inline]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns `true` if no groups are held.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Drop every group.
    pub fn clear(&mut self) {
        self.groups.clear();
    }

    /// Current check level.
    #[inline]
    pub fn check_level(&self) -> CheckLevel {
        self.config.check_level
    }

    /// Change the check level.
    pub fn set_check_level(&mut self, level: CheckLevel) {
        self.config.check_level = level;
    }

    /// Append a freshly initialised group.
    ///
    /// Call exactly once per `true` from the driver's `add_value`.
    pub fn add_group<R: Rng + ?Sized>(&mut self, model: &M, rng: &mut R) {
        self.groups.push(<M::Group as Group<M>>::init(model, rng));
        log::trace!("group state appended at {}", self.groups.len() - 1);
    }

    /// Remove the group at `groupid`; the last group takes its place.
    ///
    /// Call exactly once per `true` from the driver's `remove_value`.
    ///
    /// # Panics
    /// If `groupid` is out of range.
    pub fn remove_group(&mut self, groupid: usize) {
        assert!(
            groupid < self.groups.len(),
            "bad groupid: {} (group count {})",
            groupid,
            self.groups.len()
        );
        self.groups.swap_remove(groupid);
        log::trace!("group state {} removed; {} remain", groupid, self.groups.len());
    }

    /// Fold `value` into group `groupid`.
    ///
    /// # Panics
    /// If `groupid` is out of range.
    pub fn add_value<R: Rng + ?Sized>(
        &mut self,
        model: &M,
        groupid: usize,
        value: &M::Value,
        rng: &mut R,
    ) {
        self.group_mut(groupid).add_value(model, value, rng);
    }

    /// Remove `value` from group `groupid`.
    ///
    /// # Panics
    /// If `groupid` is out of range.
    pub fn remove_value<R: Rng + ?Sized>(
        &mut self,
        model: &M,
        groupid: usize,
        value: &M::Value,
        rng: &mut R,
    ) {
        self.group_mut(groupid).remove_value(model, value, rng);
    }

    /// Uncached reference scorer: adds each group's score for `value` to
    /// `scores_accum[i]`.
    ///
    /// Accumulates rather than overwrites so it can run after the driver's
    /// [`crate::driver::GroupCountCache::score_value`] on the same buffer.
    ///
    /// # Panics
    /// If `scores_accum` is shorter than the group count.  At
    /// [`CheckLevel::Exhaustive`], also if it is longer.
    pub fn score_value<R: Rng + ?Sized>(
        &self,
        model: &M,
        value: &M::Value,
        scores_accum: &mut [f32],
        rng: &mut R,
    ) {
        if self.config.check_level.is_exhaustive() {
            assert_eq!(
                scores_accum.len(),
                self.groups.len(),
                "score buffer length does not match group count"
            );
        }

        let accum = &mut scores_accum[..self.groups.len()];
        for (score, group) in accum.iter_mut().zip(self.groups.iter()) {
            *score += group.score(model, value, rng);
        }
    }

    /// Sum of every group's marginal score.
    pub fn score_mixture<R: Rng + ?Sized>(&self, model: &M, rng: &mut R) -> f32 {
        let mut score = 0.0f32;
        for group in self.groups.iter() {
            score += model.score_group(group, rng);
        }
        score
    }
}

impl<M: Component> Default for GroupStateCache<M> {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl<M: Component> Clone for GroupStateCache<M>
where
    M::Group: Clone,
{
    fn clone(&self) -> Self {
        Self {
            groups: self.groups.clone(),
            config: self.config.clone(),
        }
    }
}

impl<M: Component> core::fmt::Debug for GroupStateCache<M>
where
    M::Group: core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GroupStateCache")
            .field("groups", &self.groups)
            .field("config", &self.config)
            .finish()
    }
}
