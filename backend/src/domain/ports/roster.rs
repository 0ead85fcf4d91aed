//! Driving ports for the patient roster.

use async_trait::async_trait;

use crate::domain::{Error, Patient, UserId};

/// Regenerates the synthetic patient roster.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RosterCommand: Send + Sync {
    /// Sweep unreferenced patients and create `count` new ones, or the
    /// configured default when `count` is `None`. Returns the new batch.
    async fn regenerate(
        &self,
        actor: &UserId,
        count: Option<usize>,
    ) -> Result<Vec<Patient>, Error>;
}

/// Reads the patient roster.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PatientsQuery: Send + Sync {
    /// Every patient, ordered by identifier.
    async fn list_patients(&self) -> Result<Vec<Patient>, Error>;
}
