//! Port for patient roster persistence.

use async_trait::async_trait;

use crate::domain::{Patient, RosterPlanError, RosterPlanner};

use super::define_port_error;

define_port_error! {
    /// Errors raised by patient repository adapters.
    pub enum PatientRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "patient repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "patient repository query failed: {message}",
        /// No free patient identifier was left for the batch.
        Exhausted { message: String } => "patient roster exhausted: {message}",
        /// The planner produced an unusable batch.
        Planning { message: String } => "patient roster planning failed: {message}",
    }
}

impl From<RosterPlanError> for PatientRepositoryError {
    fn from(value: RosterPlanError) -> Self {
        if value.is_exhausted() {
            Self::exhausted(value.to_string())
        } else {
            Self::planning(value.to_string())
        }
    }
}

/// Outcome of a roster regeneration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterRegeneration {
    /// Unreferenced patients swept before generating.
    pub removed: usize,
    /// Newly created patients.
    pub created: Vec<Patient>,
}

/// Storage for synthetic patients.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PatientRepository: Send + Sync {
    /// Every patient, ordered by identifier.
    async fn list(&self) -> Result<Vec<Patient>, PatientRepositoryError>;

    /// Delete every patient no entry references, then insert the batch
    /// `planner` produces for the surviving identifiers. Runs as one atomic
    /// step: a planning failure leaves the roster untouched.
    async fn regenerate(
        &self,
        planner: &RosterPlanner,
    ) -> Result<RosterRegeneration, PatientRepositoryError>;
}
