/*
 * This source code is licensed under the Business Source License 1.1.
 */

//! Reference models.
//!
//! Small, exact implementations of the [`crate::model`] traits.  They make
//! the caches usable out of the box and show what a production model looks
//! like; real samplers usually bring their own vectorised versions.
//!
//! | Type | Trait | What it scores |
//! |------|-------|----------------|
//! | [`PitmanYor`] | [`crate::model::Clustering`] | Pitman-Yor / Dirichlet-process partition prior |
//! | [`BetaBernoulli`] | [`crate::model::Component`] | Binary observations with a conjugate Beta prior |

pub mod beta_bernoulli;
pub mod pitman_yor;

pub use beta_bernoulli::{BetaBernoulli, BetaBernoulliGroup};
pub use pitman_yor::PitmanYor;
