//! Patient batch generation.

use std::collections::BTreeSet;

use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::allocator::{IDS_PER_PREFIX, ShortId, allocate_id};
use crate::error::RosterError;
use crate::names::random_display_name;

/// Prefix used for every patient identifier.
pub const PATIENT_ID_PREFIX: char = 'P';

/// One generated patient, generic over the caller's test-name type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientSeed<T> {
    /// Freshly allocated identifier with the [`PATIENT_ID_PREFIX`].
    pub id: ShortId,
    /// `"First Last"` display name.
    pub name: String,
    /// Test assigned to the patient.
    pub test: T,
}

/// Create the deterministic generator used for roster batches.
#[must_use]
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Generate `count` patients whose identifiers avoid `existing`.
///
/// Identifiers chosen earlier in the batch are added to the taken set, so the
/// batch is internally distinct as well. Names and tests are drawn uniformly.
///
/// # Errors
///
/// - [`RosterError::EmptyTestCatalogue`] when `tests` is empty.
/// - [`RosterError::Allocation`] when the patient identifier space runs out
///   part way through the batch. No partial batch is returned. A `count`
///   larger than [`IDS_PER_PREFIX`] always ends this way.
pub fn generate_patients<R, T>(
    rng: &mut R,
    count: usize,
    existing: &BTreeSet<String>,
    tests: &[T],
) -> Result<Vec<PatientSeed<T>>, RosterError>
where
    R: Rng + ?Sized,
    T: Copy,
{
    if tests.is_empty() {
        return Err(RosterError::EmptyTestCatalogue);
    }

    let mut taken = existing.clone();
    let mut batch = Vec::with_capacity(count.min(IDS_PER_PREFIX));

    for _ in 0..count {
        let id = allocate_id(rng, PATIENT_ID_PREFIX, &taken)?;
        taken.insert(id.to_string());
        let name = random_display_name(rng);
        let test = tests
            .choose(rng)
            .copied()
            .ok_or(RosterError::EmptyTestCatalogue)?;
        batch.push(PatientSeed { id, name, test });
    }

    Ok(batch)
}
