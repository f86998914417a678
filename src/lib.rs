//! # mixture-cache
//!
//! Packed group bookkeeping for collapsed Gibbs sampling in nonparametric
//! mixture models.
//!
//! ---
//!
//! ## The problem
//!
//! A collapsed Gibbs sweep removes one data point from its cluster, scores
//! every cluster plus "open a new cluster", and reassigns the point.  Clusters
//! are born and die constantly.  Scoring wants a dense, contiguous array of
//! cluster state; callers want cluster names that survive the churn.
//!
//! This crate keeps both:
//!
//! **Packed ids**: clusters live in `0..group_count`.  A drained cluster is
//! replaced by the last one (swap-with-last), so removal is O(1) and the
//! arrays never have holes.  There is always at least one empty cluster at
//! the end of a growth step, ready to be scored as "new".
//!
//! **Global ids**: a permanent number per cluster, issued once and never
//! reused.  The tracker maps between the two.
//!
//! The crate never decides *where* a point goes.  It only keeps the books
//! that make that decision cheap and correct.
//!
//! ---
//!
//! ## Data flow
//!
//! ```text
//!   caller ──add_value/remove_value──▶ GroupCountCache ──true?──┐
//!                                                               ├──▶ GroupStateCache::add_group / remove_group
//!                                                               └──▶ StableIdTracker::add_group / remove_group
//!
//!   GroupCountCache::score_value ─┐
//!                                 ├──▶ [f32; group_count] ──▶ sampler picks a group
//!   GroupStateCache::score_value ─┘
//! ```
//!
//! ## Module overview
//!
//! | Module | Key types | What it does |
//! |--------|-----------|--------------|
//! | [`driver`] | [`GroupCountCache`] | Item counts, empty-group set, sample size, prior scores |
//! | [`slave`] | [`GroupStateCache`] | Per-group sufficient statistics, likelihood scores |
//! | [`tracker`] | [`StableIdTracker`] | Packed ↔ global id maps |
//! | [`mixture`] | [`Mixture`] | All three driven in lock-step |
//! | [`model`] | [`Clustering`], [`Component`], [`Group`] | The model capability the caches are generic over |
//! | [`config`] | [`CacheConfig`], [`CheckLevel`] | Runtime invariant-checking level |
//! | [`error`] | [`InvariantError`] | Why a restored snapshot was rejected |
//! | [`count`] | [`Count`] | Caller-chosen unsigned count type |
//! | [`models`] | [`models::PitmanYor`], [`models::BetaBernoulli`] | Reference model implementations |
//!
//! ## Errors
//!
//! Misuse (zero-count updates, bad ids, removing more items than a group
//! holds) is a bug in the calling sampler and panics.  See each function's
//! `# Panics` section.  [`CheckLevel::Exhaustive`] adds whole-structure
//! consistency walks after every structural change.  Deserialising a cache
//! or tracker runs the same walks and fails with an [`InvariantError`]
//! rather than panicking.
//!
//! ## Concurrency
//!
//! Nothing here locks.  Scoring takes `&self` and can be fanned out across
//! threads between updates; updates take `&mut self` on every component.
//!
//! ## `no_std`
//!
//! This crate is `#![no_std]` by default and needs only `alloc`.  Enable the
//! `std` feature to link `std`, and the `serde` feature for serialisation of
//! the caches and reference models.

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

pub mod config;
pub mod count;
pub mod driver;
pub mod error;
pub mod math;
pub mod mixture;
pub mod model;
pub mod models;
pub mod slave;
pub mod tracker;

pub use config::{CacheConfig, CheckLevel};
pub use count::Count;
pub use driver::GroupCountCache;
pub use error::InvariantError;
pub use mixture::Mixture;
pub use model::{Clustering, Component, Group};
pub use slave::GroupStateCache;
pub use tracker::{Id, StableIdTracker, UNRESOLVED};
