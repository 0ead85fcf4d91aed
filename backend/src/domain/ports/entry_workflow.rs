//! Driving ports for the entry workflow.

use async_trait::async_trait;

use crate::domain::{Entry, EntryId, Error, PatientId, TestName, UserId, Verdict};

/// Orders entries and moves them through the workflow.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntryWorkflowCommand: Send + Sync {
    /// Order `test_name` for `patient_id` on behalf of `actor`.
    async fn order_entry(
        &self,
        actor: &UserId,
        patient_id: &PatientId,
        test_name: TestName,
    ) -> Result<Entry, Error>;

    /// Move a pending entry to processed.
    async fn process_entry(&self, actor: &UserId, entry_id: EntryId) -> Result<Entry, Error>;

    /// Record `verdict` on a processed entry. Supervisors and admins only.
    async fn verify_entry(
        &self,
        actor: &UserId,
        entry_id: EntryId,
        verdict: Verdict,
    ) -> Result<Entry, Error>;
}

/// Reads workflow entries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntriesQuery: Send + Sync {
    /// Every entry, ordered by identifier.
    async fn list_entries(&self) -> Result<Vec<Entry>, Error>;
}
