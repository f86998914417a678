/*
 * This source code is licensed under the Business Source License 1.1.
 */

//! Item count type used by [`crate::driver::GroupCountCache`].
//!
//! Counts are a caller-chosen unsigned integer.  Small samplers can use `u16`
//! or `u32` to keep the count vector cache-friendly; the driver only needs
//! a zero test, increment/decrement, ordering, and a conversion to `f32` for
//! the reference models.

use core::fmt::Debug;
use core::ops::{AddAssign, SubAssign};

/// Unsigned integer type holding the number of items assigned to a group.
///
/// Implemented for every unsigned primitive integer.  Arithmetic is plain
/// `+=` / `-=`; the driver checks removal bounds before subtracting, so
/// underflow is never reached through the public API.
pub trait Count: Copy + Ord + Default + Debug + AddAssign + SubAssign {
    /// The empty count.
    const ZERO: Self;
    /// A single item.
    const ONE: Self;

    /// Returns `true` if no items are assigned.
    #[inline]
    fn is_zero(self) -> bool {
        self == Self::ZERO
    }

    /// Addition that returns `None` on overflow.
    fn checked_add(self, rhs: Self) -> Option<Self>;

    /// Lossy conversion used by scoring functions.
    fn to_f32(self) -> f32;
}

macro_rules! impl_count {
    ($($t:ty),*) => {
        $(
            impl Count for $t {
                const ZERO: Self = 0;
                const ONE: Self = 1;

                #[inline]
                fn checked_add(self, rhs: Self) -> Option<Self> {
                    <$t>::checked_add(self, rhs)
                }

                #[inline]
                fn to_f32(self) -> f32 {
                    self as f32
                }
            }
        )*
    };
}

impl_count!(u8, u16, u32, u64, u128, usize);
