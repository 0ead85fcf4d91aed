//! Short identifier allocation.
//!
//! Identifiers are dense and human readable: one prefix letter followed by a
//! two-digit number. Each prefix therefore has exactly 90 values, which is a
//! deliberate scale limit of the tracker.

use std::collections::BTreeSet;
use std::fmt;

use rand::Rng;

use crate::error::AllocationExhausted;

/// Smallest numeric suffix handed out by the allocator.
pub const ID_NUMBER_MIN: u8 = 10;

/// Largest numeric suffix handed out by the allocator.
pub const ID_NUMBER_MAX: u8 = 99;

/// Distinct identifiers available under one prefix.
pub const IDS_PER_PREFIX: usize = 90;

/// Upper bound on random draws per allocation.
pub const MAX_ALLOCATION_ATTEMPTS: usize = 1000;

/// A prefix letter plus a two-digit number, rendered as `"P42"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShortId {
    prefix: char,
    number: u8,
}

impl ShortId {
    /// Prefix letter of the identifier.
    #[must_use]
    pub const fn prefix(self) -> char {
        self.prefix
    }

    /// Numeric suffix of the identifier.
    #[must_use]
    pub const fn number(self) -> u8 {
        self.number
    }
}

impl fmt::Display for ShortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:02}", self.prefix, self.number)
    }
}

/// Draw a random identifier for `prefix` that is not in `taken`.
///
/// Each draw picks a number uniformly from
/// [`ID_NUMBER_MIN`]`..=`[`ID_NUMBER_MAX`]. Draws that collide with `taken`
/// are discarded. After [`MAX_ALLOCATION_ATTEMPTS`] collisions the allocator
/// stops and reports [`AllocationExhausted`].
///
/// # Errors
///
/// Returns [`AllocationExhausted`] when no free value was found within the
/// retry cap.
///
/// # Example
///
/// ```
/// use std::collections::BTreeSet;
///
/// use lab_roster::{allocate_id, seeded_rng};
///
/// let mut rng = seeded_rng(7);
/// let id = allocate_id(&mut rng, 'T', &BTreeSet::new()).expect("space is empty");
/// assert_eq!(id.prefix(), 'T');
/// assert!((10..=99).contains(&id.number()));
/// ```
pub fn allocate_id<R>(
    rng: &mut R,
    prefix: char,
    taken: &BTreeSet<String>,
) -> Result<ShortId, AllocationExhausted>
where
    R: Rng + ?Sized,
{
    for _ in 0..MAX_ALLOCATION_ATTEMPTS {
        let candidate = ShortId {
            prefix,
            number: rng.random_range(ID_NUMBER_MIN..=ID_NUMBER_MAX),
        };
        if !taken.contains(&candidate.to_string()) {
            return Ok(candidate);
        }
    }

    Err(AllocationExhausted {
        prefix,
        attempts: MAX_ALLOCATION_ATTEMPTS,
    })
}
