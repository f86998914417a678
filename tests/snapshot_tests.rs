//! Serialisation round-trip tests.
//!
//! Run with: `cargo test --features serde`
//!
//! A sampler checkpoints the caches between sweeps; a restored cache must
//! accept further updates exactly like the cache it was saved from.

#[cfg(feature = "serde")]
mod tests {
    use mixture_cache::models::{BetaBernoulli, PitmanYor};
    use mixture_cache::{
        CacheConfig, CheckLevel, GroupCountCache, GroupStateCache, StableIdTracker,
    };
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg;

    // ── Helpers ──────────────────────────────────────────────────────────────

    fn sorted(ids: impl Iterator<Item = usize>) -> Vec<usize> {
        let mut v: Vec<usize> = ids.collect();
        v.sort_unstable();
        v
    }

    fn rejection<T: serde::de::DeserializeOwned + std::fmt::Debug>(json: &str) -> String {
        serde_json::from_str::<T>(json)
            .expect_err("corrupt snapshot must be rejected")
            .to_string()
    }

    // ── Tests ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_count_cache_round_trip_preserves_state() {
        let mut counts: GroupCountCache<u32> = GroupCountCache::new(CacheConfig::exhaustive());
        counts.init(vec![4, 0, 2, 0]);
        counts.add_value(1, 3);

        let json = serde_json::to_string(&counts).expect("serialise");
        let restored: GroupCountCache<u32> = serde_json::from_str(&json).expect("deserialise");

        assert_eq!(restored.counts(), counts.counts());
        assert_eq!(restored.sample_size(), counts.sample_size());
        assert_eq!(
            sorted(restored.empty_groupids().iter().copied()),
            sorted(counts.empty_groupids().iter().copied())
        );
        assert_eq!(restored.check_level(), CheckLevel::Exhaustive);
        restored.validate();
    }

    #[test]
    fn test_restored_count_cache_accepts_updates() {
        let mut counts: GroupCountCache<u32> = GroupCountCache::new(CacheConfig::exhaustive());
        counts.init(vec![2, 1, 0]);
        let json = serde_json::to_string(&counts).expect("serialise");
        let mut restored: GroupCountCache<u32> = serde_json::from_str(&json).expect("deserialise");

        assert!(restored.remove_value(1, 1));
        assert_eq!(restored.counts(), &[2, 0]);
        assert_eq!(sorted(restored.empty_groupids().iter().copied()), vec![1]);
    }

    #[test]
    fn test_tracker_round_trip_keeps_retired_ids_retired() {
        let mut ids = StableIdTracker::new(CacheConfig::exhaustive());
        ids.init(3);
        ids.remove_group(1);

        let json = serde_json::to_string(&ids).expect("serialise");
        let mut restored: StableIdTracker = serde_json::from_str(&json).expect("deserialise");

        assert_eq!(restored.packed_to_global(1), 2);
        assert!(!restored.is_live(1));
        assert_eq!(restored.add_group(), 3);
    }

    #[test]
    fn test_group_states_round_trip() {
        let model = BetaBernoulli::new(1.0, 2.0);
        let mut rng = Pcg64Mcg::seed_from_u64(3);
        let mut groups: GroupStateCache<BetaBernoulli> = GroupStateCache::default();
        groups.init(&model, 2, &mut rng);
        groups.add_value(&model, 0, &true, &mut rng);
        groups.add_value(&model, 0, &false, &mut rng);

        let json = serde_json::to_string(&groups).expect("serialise");
        let restored: GroupStateCache<BetaBernoulli> =
            serde_json::from_str(&json).expect("deserialise");

        assert_eq!(restored.groups(), groups.groups());
        assert_eq!(
            restored.score_mixture(&model, &mut rng),
            groups.score_mixture(&model, &mut rng)
        );
    }

    #[test]
    fn test_models_round_trip() {
        let prior = PitmanYor::new(1.5, 0.1);
        let json = serde_json::to_string(&prior).expect("serialise");
        let restored: PitmanYor = serde_json::from_str(&json).expect("deserialise");
        assert_eq!(restored, prior);
    }

    #[test]
    fn test_count_snapshot_without_empty_group_is_rejected() {
        let err = rejection::<GroupCountCache<u32>>(
            r#"{"counts":[1,2],"empty_groupids":[],"sample_size":0,"config":{"check_level":"Exhaustive"}}"#,
        );
        assert!(err.contains("missing empty groups"), "{}", err);
    }

    #[test]
    fn test_count_snapshot_with_wrong_empty_set_is_rejected() {
        let err = rejection::<GroupCountCache<u32>>(
            r#"{"counts":[2,0],"empty_groupids":[0,1],"sample_size":2,"config":{"check_level":"Standard"}}"#,
        );
        assert!(err.contains("empty group set disagrees with count of group 0"), "{}", err);

        let err = rejection::<GroupCountCache<u32>>(
            r#"{"counts":[2,0],"empty_groupids":[1,5],"sample_size":2,"config":{"check_level":"Standard"}}"#,
        );
        assert!(err.contains("out-of-range"), "{}", err);
    }

    #[test]
    fn test_count_snapshot_with_wrong_sample_size_is_rejected() {
        let err = rejection::<GroupCountCache<u16>>(
            r#"{"counts":[2,0,3],"empty_groupids":[1],"sample_size":4,"config":{"check_level":"Standard"}}"#,
        );
        assert!(err.contains("sample size out of sync"), "{}", err);
    }

    #[test]
    fn test_tracker_snapshot_with_crossed_maps_is_rejected() {
        let err = rejection::<StableIdTracker>(
            r#"{"packed_to_global":[0,1],"global_to_packed":[1,0],"config":{"check_level":"Standard"}}"#,
        );
        assert!(err.contains("id maps are not inverse at packed 0"), "{}", err);

        let err = rejection::<StableIdTracker>(
            r#"{"packed_to_global":[0,7],"global_to_packed":[0,1],"config":{"check_level":"Standard"}}"#,
        );
        assert!(err.contains("bad global id: 7 at packed 1"), "{}", err);
    }

    #[test]
    fn test_tracker_snapshot_resolving_removed_id_is_rejected() {
        // Valid shape after init(3) + remove_group(1) is [0,2] / [0,MAX,1];
        // here global 1 still points at a live slot.
        let err = rejection::<StableIdTracker>(
            r#"{"packed_to_global":[0,2],"global_to_packed":[0,0,1],"config":{"check_level":"Standard"}}"#,
        );
        assert!(err.contains("stale global id 1"), "{}", err);

        let ok: StableIdTracker = serde_json::from_str(
            r#"{"packed_to_global":[0,2],"global_to_packed":[0,4294967295,1],"config":{"check_level":"Standard"}}"#,
        )
        .expect("deserialise");
        assert!(!ok.is_live(1));
        assert_eq!(ok.global_to_packed(2), 1);
    }
}
