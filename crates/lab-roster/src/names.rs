//! Fixed name pools for synthetic patients.

use rand::Rng;
use rand::seq::IndexedRandom;

/// First names drawn for generated patients.
pub const FIRST_NAMES: [&str; 8] = [
    "James", "Mary", "John", "Patricia", "David", "Linda", "Michael", "Jennifer",
];

/// Last names drawn for generated patients.
pub const LAST_NAMES: [&str; 8] = [
    "Smith", "Johnson", "Brown", "Williams", "Jones", "Garcia", "Miller", "Davis",
];

/// Build a `"First Last"` display name.
///
/// Both halves are drawn uniformly and independently.
///
/// # Example
///
/// ```
/// use lab_roster::{FIRST_NAMES, LAST_NAMES, random_display_name, seeded_rng};
///
/// let name = random_display_name(&mut seeded_rng(1));
/// let (first, last) = name.split_once(' ').expect("two parts");
/// assert!(FIRST_NAMES.contains(&first));
/// assert!(LAST_NAMES.contains(&last));
/// ```
#[must_use]
pub fn random_display_name<R>(rng: &mut R) -> String
where
    R: Rng + ?Sized,
{
    let first = FIRST_NAMES.choose(rng).copied().unwrap_or_default();
    let last = LAST_NAMES.choose(rng).copied().unwrap_or_default();
    format!("{first} {last}")
}
