//! Roster planning: turns a seed into a batch of fresh patients.
//!
//! The planner is handed to the patient repository, which calls it inside the
//! regeneration transaction once unreferenced patients have been swept. The
//! surviving identifiers are passed in so the batch never collides with them.

use std::collections::BTreeSet;

use lab_roster::{RosterError, generate_patients, seeded_rng};
use rand::Rng;
use thiserror::Error;

use super::patient::{Patient, PatientId, PatientValidationError, TestName};

/// Batch size used when the caller does not ask for one.
pub const DEFAULT_ROSTER_SIZE: usize = 10;

/// Largest batch that can ever fit in the patient identifier space.
pub const MAX_ROSTER_SIZE: usize = lab_roster::IDS_PER_PREFIX;

/// Errors raised while planning a roster batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterPlanError {
    /// Generation failed, usually because the identifier space is full.
    #[error(transparent)]
    Roster(#[from] RosterError),
    /// A generated seed did not form a valid patient.
    #[error("generated patient is invalid: {0}")]
    InvalidPatient(#[from] PatientValidationError),
}

impl RosterPlanError {
    /// Whether the failure came from running out of patient identifiers.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        matches!(self, Self::Roster(RosterError::Allocation(_)))
    }
}

/// Size and seed of one roster batch.
///
/// # Examples
/// ```
/// use std::collections::BTreeSet;
///
/// use labflow::domain::RosterPlanner;
///
/// let planner = RosterPlanner::with_seed(3, 42);
/// let batch = planner.plan(&BTreeSet::new()).unwrap();
/// assert_eq!(batch.len(), 3);
/// assert_eq!(batch, planner.plan(&BTreeSet::new()).unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RosterPlanner {
    size: usize,
    seed: u64,
}

impl RosterPlanner {
    /// Planner for `size` patients drawn from a fresh random seed.
    pub fn new(size: usize) -> Self {
        Self::with_seed(size, rand::rng().random())
    }

    /// Planner with a fixed seed. The same seed and surviving set always
    /// yield the same batch.
    #[must_use]
    pub const fn with_seed(size: usize, seed: u64) -> Self {
        Self { size, seed }
    }

    /// Number of patients to generate.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Generate the batch, avoiding every identifier in `surviving`.
    pub fn plan(&self, surviving: &BTreeSet<PatientId>) -> Result<Vec<Patient>, RosterPlanError> {
        let existing: BTreeSet<String> = surviving.iter().map(ToString::to_string).collect();
        let mut rng = seeded_rng(self.seed);
        let seeds = generate_patients(&mut rng, self.size, &existing, &TestName::ALL)?;
        let patients = seeds
            .into_iter()
            .map(|seed| {
                let id = PatientId::new(seed.id.to_string())?;
                Patient::new(id, seed.name, seed.test)
            })
            .collect::<Result<Vec<_>, PatientValidationError>>()?;
        Ok(patients)
    }
}
