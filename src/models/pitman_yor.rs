/*
 * This source code is licensed under the Business Source License 1.1.
 */

//! Pitman-Yor partition prior.
//!
//! With discount `d = 0` this is the Chinese restaurant process of a
//! Dirichlet process with concentration `alpha`.
//!
//! ```text
//! P(join group of size n) = (n − d) / (N + α)
//! P(open a new group)     = (α + d·K) / (N + α)      split evenly over empty groups
//! ```
//! where `N` is the sample size and `K` the number of nonempty groups.

use crate::count::Count;
use crate::math::ln;
use crate::model::Clustering;

/// Pitman-Yor clustering prior.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PitmanYor {
    /// Concentration.  Must satisfy `alpha > -d`.
    pub alpha: f32,
    /// Discount in `[0, 1)`.
    pub d: f32,
}

impl PitmanYor {
    /// Create a prior with concentration `alpha` and discount `d`.
    ///
    /// # Panics
    /// If `d` is outside `[0, 1)` or `alpha <= -d`.
    pub fn new(alpha: f32, d: f32) -> Self {
        assert!((0.0..1.0).contains(&d), "discount must be in [0, 1): {}", d);
        assert!(alpha > -d, "concentration must exceed -discount: {}", alpha);
        Self { alpha, d }
    }

    /// Dirichlet-process prior (`d = 0`).
    ///
    /// # Panics
    /// If `alpha <= 0`.
    pub fn dirichlet_process(alpha: f32) -> Self {
        assert!(alpha > 0.0, "concentration must be positive: {}", alpha);
        Self::new(alpha, 0.0)
    }
}

impl<C: Count> Clustering<C> for PitmanYor {
    fn score_add_value(
        &self,
        group_size: C,
        nonempty_group_count: usize,
        sample_size: C,
        empty_group_count: usize,
    ) -> f32 {
        let numer = if group_size.is_zero() {
            (self.alpha + self.d * nonempty_group_count as f32) / empty_group_count as f32
        } else {
            group_size.to_f32() - self.d
        };
        let denom = sample_size.to_f32() + self.alpha;
        ln(numer / denom)
    }

    /// Log probability of the partition, seating one item at a time.
    fn score_counts(&self, counts: &[C]) -> f32 {
        let mut score = 0.0f32;
        let mut nonempty = 0.0f32;
        let mut seated = 0.0f32;
        for &count in counts.iter().filter(|c| !c.is_zero()) {
            score += ln((self.alpha + self.d * nonempty) / (seated + self.alpha));
            nonempty += 1.0;
            seated += 1.0;

            let size = count.to_f32();
            let mut i = 1.0f32;
            while i < size {
                score += ln((i - self.d) / (seated + self.alpha));
                seated += 1.0;
                i += 1.0;
            }
        }
        score
    }
}
