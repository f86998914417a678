/*
 * This source code is licensed under the Business Source License 1.1.
 */

//! Broken-invariant descriptions.
//!
//! Live caches panic on a broken invariant (see `validate` on each cache).
//! Restoring a snapshot reports the same breakage as an [`InvariantError`]
//! instead, so a corrupt checkpoint is rejected at load time.

use core::fmt;

use crate::tracker::Id;

/// An invariant a cache or tracker failed to hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvariantError {
    /// No group has a zero count.
    MissingEmptyGroups,
    /// A group's zero-ness and its membership in the empty set disagree.
    EmptySetMismatch {
        /// Packed id of the group.
        groupid: usize,
    },
    /// The empty set names groups past the end of the counts.
    EmptySetOutOfRange,
    /// The stored sample size is not the sum of the counts.
    SampleSizeMismatch,
    /// A packed slot names a global id that was never issued.
    BadGlobalId {
        /// Offending global id.
        global: Id,
        /// Packed slot holding it.
        packed: usize,
    },
    /// The packed → global and global → packed maps disagree.
    MapsNotInverse {
        /// Packed slot where they disagree.
        packed: usize,
    },
    /// A global id resolves although no live packed slot names it.
    StaleGlobalId {
        /// Offending global id.
        global: usize,
    },
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::MissingEmptyGroups => write!(f, "missing empty groups"),
            Self::EmptySetMismatch { groupid } => write!(
                f,
                "empty group set disagrees with count of group {}",
                groupid
            ),
            Self::EmptySetOutOfRange => write!(f, "empty group set holds out-of-range ids"),
            Self::SampleSizeMismatch => write!(f, "sample size out of sync with counts"),
            Self::BadGlobalId { global, packed } => {
                write!(f, "bad global id: {} at packed {}", global, packed)
            }
            Self::MapsNotInverse { packed } => {
                write!(f, "id maps are not inverse at packed {}", packed)
            }
            Self::StaleGlobalId { global } => {
                write!(f, "stale global id {} still resolves", global)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for InvariantError {}
