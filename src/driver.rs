/*
 * This source code is licensed under the Business Source License 1.1.
 */

//! Packed per-group item counts with a guaranteed supply of empty groups.
//!
//! [`GroupCountCache`] keeps group ids contiguous so scores can be written
//! into a dense `[f32]` buffer, and keeps at least one zero-count group
//! around so a sampler can always score "start a new cluster".
//!
//! # Structural events
//!
//! - [`GroupCountCache::add_value`] into an empty group appends a fresh empty
//!   group at the end and returns `true`.
//! - [`GroupCountCache::remove_value`] that drains a group moves the last
//!   group into the drained slot, pops the array, and returns `true`.
//!
//! A caller pairing this cache with a [`crate::slave::GroupStateCache`] or a
//! [`crate::tracker::StableIdTracker`] must forward every `true` to their
//! `add_group` / `remove_group` before issuing the next update.
//!
//! # Invariants
//!
//! - `sample_size() == counts().iter().sum()` after every call.
//! - `empty_groupids() == { i : counts()[i] == 0 }`, and is never empty.
//!
//! With the `serde` feature, a deserialised cache is checked against both
//! invariants and rejected if either fails.

use alloc::vec::Vec;

use hashbrown::HashSet;

use crate::config::{CacheConfig, CheckLevel};
use crate::count::Count;
use crate::error::InvariantError;
use crate::model::Clustering;

/// Set of packed group ids whose count is zero.
pub type IdSet = HashSet<usize>;

// ─── GroupCountCache ─────────────────────────────────────────────────────────

/// Per-group item counts, indexed by packed group id.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GroupCountCache<C: Count> {
    counts: Vec<C>,
    empty_groupids: IdSet,
    sample_size: C,
    config: CacheConfig,
}

impl<C: Count> GroupCountCache<C> {
    /// Create an uninitialised cache.
    ///
    /// Holds no groups; call [`Self::init`] before any update.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            counts: Vec::new(),
            empty_groupids: IdSet::new(),
            sample_size: C::ZERO,
            config,
        }
    }

    /// Count of every group, by packed id.
    #[inline]
    pub fn counts(&self) -> &[C] {
        &self.counts
    }

    /// Count of a single group.
    ///
    /// # Panics
    /// If `groupid` is out of range.
    #[inline]
    pub fn count(&self, groupid: usize) -> C {
        self.counts[groupid]
    }

    /// Packed ids of all groups with zero items.
    #[inline]
    pub fn empty_groupids(&self) -> &IdSet {
        &self.empty_groupids
    }

    /// Total number of assigned items.
    #[inline]
    pub fn sample_size(&self) -> C {
        self.sample_size
    }

    /// Number of groups, empty ones included.
    #[inline]
    pub fn group_count(&self) -> usize {
        self.counts.len()
    }

    /// Number of groups with zero items.
    #[inline]
    pub fn empty_group_count(&self) -> usize {
        self.empty_groupids.len()
    }

    /// Number of groups holding at least one item.
    #[inline]
    pub fn nonempty_group_count(&self) -> usize {
        self.counts.len() - self.empty_groupids.len()
    }

    /// Current check level.
    #[inline]
    pub fn check_level(&self) -> CheckLevel {
        self.config.check_level
    }

    /// Change the check level.  Takes effect on the next update.
    pub fn set_check_level(&mut self, level: CheckLevel) {
        self.config.check_level = level;
    }

    /// Replace all counts and rebuild the empty set and sample size.
    ///
    /// # Panics
    /// If no entry of `counts` is zero.  The caller must always leave at
    /// least one empty group to grow into.
    pub fn init(&mut self, counts: Vec<C>) {
        self.counts = counts;
        self.empty_groupids.clear();
        self.sample_size = C::ZERO;

        for (i, &count) in self.counts.iter().enumerate() {
            self.sample_size += count;
            if count.is_zero() {
                self.empty_groupids.insert(i);
            }
        }
        log::debug!(
            "group counts initialised: {} groups, {} empty",
            self.counts.len(),
            self.empty_groupids.len()
        );
        self.validate();
    }

    /// Add `count` items to group `groupid`.
    ///
    /// Returns `true` if the group was empty, in which case a new empty group
    /// was appended at packed id `group_count() - 1`.
    ///
    /// # Panics
    /// If `count` is zero or `groupid` is out of range.
    pub fn add_value(&mut self, groupid: usize, count: C) -> bool {
        assert!(!count.is_zero(), "cannot add zero values");
        assert!(
            groupid < self.counts.len(),
            "bad groupid: {} (group count {})",
            groupid,
            self.counts.len()
        );

        let add_group = self.counts[groupid].is_zero();
        self.counts[groupid] += count;
        self.sample_size += count;

        if add_group {
            self.empty_groupids.remove(&groupid);
            self.empty_groupids.insert(self.counts.len());
            self.counts.push(C::ZERO);
            log::trace!(
                "group {} became nonempty; appended empty group {}",
                groupid,
                self.counts.len() - 1
            );
            self.validate();
        }

        add_group
    }

    /// Remove `count` items from group `groupid`.
    ///
    /// Returns `true` if the group was drained and removed.  The last group
    /// then occupies packed id `groupid` (unless `groupid` was the last).
    ///
    /// # Panics
    /// If `count` is zero, `groupid` is out of range, the group is already
    /// empty, or `count` exceeds the group's size.
    pub fn remove_value(&mut self, groupid: usize, count: C) -> bool {
        assert!(!count.is_zero(), "cannot remove zero values");
        assert!(
            groupid < self.counts.len(),
            "bad groupid: {} (group count {})",
            groupid,
            self.counts.len()
        );
        assert!(
            !self.counts[groupid].is_zero(),
            "cannot remove value from empty group {}",
            groupid
        );
        assert!(
            count <= self.counts[groupid],
            "cannot remove more values than are in group {}: {:?} > {:?}",
            groupid,
            count,
            self.counts[groupid]
        );

        self.counts[groupid] -= count;
        self.sample_size -= count;
        let remove_group = self.counts[groupid].is_zero();

        if remove_group {
            let last = self.counts.len() - 1;
            if groupid != last {
                let moved = self.counts[last];
                self.counts[groupid] = moved;
                if moved.is_zero() {
                    self.empty_groupids.remove(&last);
                    self.empty_groupids.insert(groupid);
                }
                log::trace!("group {} drained; moved group {} into its slot", groupid, last);
            } else {
                log::trace!("group {} drained; it was the last group", groupid);
            }
            self.counts.pop();
            self.validate();
        }

        remove_group
    }

    /// Uncached reference scorer: `scores[i]` receives the clustering score
    /// of adding one value to group `i`.
    ///
    /// Model-specific samplers may replace this with a cached variant; the
    /// output values must match this one.
    ///
    /// # Panics
    /// If `scores` is shorter than the group count.  At
    /// [`CheckLevel::Exhaustive`], also if it is longer.
    pub fn score_value<M: Clustering<C>>(&self, model: &M, scores: &mut [f32]) {
        if self.config.check_level.is_exhaustive() {
            assert_eq!(
                scores.len(),
                self.counts.len(),
                "score buffer length does not match group count"
            );
        }

        let empty_group_count = self.empty_groupids.len();
        let nonempty_group_count = self.counts.len() - empty_group_count;
        for (score, &count) in scores[..self.counts.len()].iter_mut().zip(self.counts.iter()) {
            *score = model.score_add_value(
                count,
                nonempty_group_count,
                self.sample_size,
                empty_group_count,
            );
        }
    }

    /// Clustering score of the whole count vector.
    pub fn score_mixture<M: Clustering<C>>(&self, model: &M) -> f32 {
        model.score_counts(&self.counts)
    }

    /// Assert the cache invariants.
    ///
    /// Always checks that an empty group exists; at
    /// [`CheckLevel::Exhaustive`] also walks every count.
    ///
    /// # Panics
    /// On any violated invariant.  A violation is a bug in this cache.
    pub fn validate(&self) {
        assert!(!self.empty_groupids.is_empty(), "missing empty groups");
        if self.config.check_level.is_exhaustive() {
            if let Err(e) = self.check_consistency() {
                panic!("{}", e);
            }
        }
    }

    /// Walk every count and report the first broken invariant.
    fn check_consistency(&self) -> Result<(), InvariantError> {
        if self.empty_groupids.is_empty() {
            return Err(InvariantError::MissingEmptyGroups);
        }
        let mut total = C::ZERO;
        let mut zeros = 0usize;
        for (i, &count) in self.counts.iter().enumerate() {
            total = total
                .checked_add(count)
                .ok_or(InvariantError::SampleSizeMismatch)?;
            if count.is_zero() != self.empty_groupids.contains(&i) {
                return Err(InvariantError::EmptySetMismatch { groupid: i });
            }
            if count.is_zero() {
                zeros += 1;
            }
        }
        if self.empty_groupids.len() != zeros {
            return Err(InvariantError::EmptySetOutOfRange);
        }
        if total != self.sample_size {
            return Err(InvariantError::SampleSizeMismatch);
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl<'de, C> serde::Deserialize<'de> for GroupCountCache<C>
where
    C: Count + serde::Deserialize<'de>,
{
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        struct Snapshot<T> {
            counts: Vec<T>,
            empty_groupids: IdSet,
            sample_size: T,
            config: CacheConfig,
        }

        let snapshot = <Snapshot<C> as serde::Deserialize>::deserialize(deserializer)?;
        let cache = Self {
            counts: snapshot.counts,
            empty_groupids: snapshot.empty_groupids,
            sample_size: snapshot.sample_size,
            config: snapshot.config,
        };
        cache
            .check_consistency()
            .map_err(<D::Error as serde::de::Error>::custom)?;
        log::debug!("group counts restored: {} groups", cache.counts.len());
        Ok(cache)
    }
}

impl<C: Count> Default for GroupCountCache<C> {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    /// Scores each group by its raw size; empty groups by `-(empty count)`.
    struct SizeScore;

    impl Clustering<u32> for SizeScore {
        fn score_add_value(
            &self,
            group_size: u32,
            _nonempty_group_count: usize,
            sample_size: u32,
            empty_group_count: usize,
        ) -> f32 {
            assert!(group_size <= sample_size);
            if group_size == 0 {
                -(empty_group_count as f32)
            } else {
                group_size as f32
            }
        }

        fn score_counts(&self, counts: &[u32]) -> f32 {
            counts.iter().map(|&c| c as f32).sum()
        }
    }

    fn cache(counts: Vec<u32>) -> GroupCountCache<u32> {
        let mut c = GroupCountCache::new(CacheConfig::exhaustive());
        c.init(counts);
        c
    }

    fn sorted_empty(c: &GroupCountCache<u32>) -> Vec<usize> {
        let mut ids: Vec<usize> = c.empty_groupids().iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    #[test]
    fn init_computes_empty_set_and_sample_size() {
        let c = cache(vec![3, 0]);
        assert_eq!(sorted_empty(&c), vec![1]);
        assert_eq!(c.sample_size(), 3);
        assert_eq!(c.nonempty_group_count(), 1);
        assert_eq!(c.empty_group_count(), 1);
    }

    #[test]
    fn add_to_nonempty_group_creates_nothing() {
        let mut c = cache(vec![3, 0]);
        assert!(!c.add_value(0, 2));
        assert_eq!(c.counts(), &[5, 0]);
        assert_eq!(c.sample_size(), 5);
    }

    #[test]
    fn add_to_empty_group_appends_new_empty_group() {
        let mut c = cache(vec![5, 0]);
        assert!(c.add_value(1, 1));
        assert_eq!(c.counts(), &[5, 1, 0]);
        assert_eq!(sorted_empty(&c), vec![2]);
        assert_eq!(c.sample_size(), 6);
    }

    #[test]
    fn drain_middle_group_swaps_last_into_slot() {
        let mut c = cache(vec![2, 1, 0]);
        assert!(c.remove_value(1, 1));
        assert_eq!(c.counts(), &[2, 0]);
        assert_eq!(sorted_empty(&c), vec![1]);
        assert_eq!(c.sample_size(), 2);
    }

    #[test]
    fn drain_moves_nonempty_last_group() {
        let mut c = cache(vec![1, 0, 4]);
        assert!(c.remove_value(0, 1));
        assert_eq!(c.counts(), &[4, 0]);
        assert_eq!(sorted_empty(&c), vec![1]);
    }

    #[test]
    fn drain_last_group_pops_it() {
        let mut c = cache(vec![0, 2]);
        assert!(c.remove_value(1, 2));
        assert_eq!(c.counts(), &[0]);
        assert_eq!(sorted_empty(&c), vec![0]);
        assert_eq!(c.sample_size(), 0);
    }

    #[test]
    fn partial_remove_keeps_group() {
        let mut c = cache(vec![4, 0]);
        assert!(!c.remove_value(0, 3));
        assert_eq!(c.counts(), &[1, 0]);
        assert_eq!(c.sample_size(), 1);
    }

    #[test]
    fn add_then_remove_restores_state() {
        let mut c = cache(vec![2, 0]);
        assert!(c.add_value(1, 3));
        assert!(c.remove_value(1, 3));
        assert_eq!(c.counts(), &[2, 0]);
        assert_eq!(sorted_empty(&c), vec![1]);
        assert_eq!(c.sample_size(), 2);
    }

    #[test]
    fn score_value_fills_every_slot() {
        let c = cache(vec![3, 0, 7, 0]);
        let mut scores = vec![0.0f32; 4];
        c.score_value(&SizeScore, &mut scores);
        assert_eq!(scores, vec![3.0, -2.0, 7.0, -2.0]);
        assert_eq!(c.score_mixture(&SizeScore), 10.0);
    }

    #[test]
    fn standard_level_tolerates_long_score_buffer() {
        let mut c = cache(vec![1, 0]);
        c.set_check_level(CheckLevel::Standard);
        let mut scores = vec![9.0f32; 3];
        c.score_value(&SizeScore, &mut scores);
        assert_eq!(scores, vec![1.0, -1.0, 9.0]);
    }

    #[test]
    #[should_panic(expected = "score buffer length")]
    fn exhaustive_level_rejects_long_score_buffer() {
        let c = cache(vec![1, 0]);
        let mut scores = vec![0.0f32; 3];
        c.score_value(&SizeScore, &mut scores);
    }

    #[test]
    #[should_panic(expected = "missing empty groups")]
    fn init_without_empty_group_panics() {
        cache(vec![1, 2]);
    }

    #[test]
    #[should_panic(expected = "cannot add zero values")]
    fn add_zero_panics() {
        cache(vec![1, 0]).add_value(0, 0);
    }

    #[test]
    #[should_panic(expected = "bad groupid")]
    fn add_out_of_range_panics() {
        cache(vec![1, 0]).add_value(2, 1);
    }

    #[test]
    #[should_panic(expected = "cannot remove zero values")]
    fn remove_zero_panics() {
        cache(vec![1, 0]).remove_value(0, 0);
    }

    #[test]
    #[should_panic(expected = "cannot remove value from empty group")]
    fn remove_from_empty_group_panics() {
        cache(vec![1, 0]).remove_value(1, 1);
    }

    #[test]
    #[should_panic(expected = "cannot remove more values")]
    fn remove_too_many_panics() {
        cache(vec![2, 0]).remove_value(0, 3);
    }

    #[test]
    #[should_panic(expected = "empty group set disagrees with count of group 0")]
    fn exhaustive_validate_catches_nonempty_group_in_empty_set() {
        let mut c = cache(vec![2, 0]);
        c.empty_groupids.insert(0);
        c.validate();
    }

    #[test]
    #[should_panic(expected = "sample size out of sync")]
    fn exhaustive_validate_catches_sample_size_drift() {
        let mut c = cache(vec![2, 0]);
        c.sample_size = 5;
        c.validate();
    }

    #[test]
    fn standard_validate_skips_the_walk() {
        let mut c = cache(vec![2, 0]);
        c.set_check_level(CheckLevel::Standard);
        c.sample_size = 5;
        c.validate();
        assert_eq!(
            c.check_consistency(),
            Err(InvariantError::SampleSizeMismatch)
        );
    }

    #[test]
    fn overflowing_counts_are_inconsistent() {
        let mut c: GroupCountCache<u8> = GroupCountCache::new(CacheConfig::default());
        c.init(vec![200, 0]);
        c.counts[1] = 100;
        c.empty_groupids.clear();
        c.empty_groupids.insert(2);
        assert_eq!(
            c.check_consistency(),
            Err(InvariantError::SampleSizeMismatch)
        );
    }

    #[test]
    fn several_empty_groups_are_tracked() {
        let mut c = cache(vec![0, 3, 0]);
        assert_eq!(sorted_empty(&c), vec![0, 2]);
        // Draining group 1 moves empty group 2 into slot 1.
        assert!(c.remove_value(1, 3));
        assert_eq!(c.counts(), &[0, 0]);
        assert_eq!(sorted_empty(&c), vec![0, 1]);
        assert_eq!(c.nonempty_group_count(), 0);
    }
}
