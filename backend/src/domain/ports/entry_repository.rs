//! Port for diagnostic entry persistence.
//!
//! Adapters own the atomicity of the workflow: ordering checks the patient
//! and inserts in one step, and transitions are compare-and-set on the
//! previous status.

use async_trait::async_trait;

use crate::domain::{Entry, EntryId, EntryOrder, EntryStatus};

use super::define_port_error;

define_port_error! {
    /// Errors raised by entry repository adapters.
    pub enum EntryRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "entry repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "entry repository query failed: {message}",
        /// No patient holds the requested test.
        InvalidOrder { patient_id: String, test_name: String } =>
            "no patient {patient_id} booked for {test_name}",
        /// An entry already exists for the patient and test.
        DuplicateOrder { patient_id: String, test_name: String } =>
            "an entry for patient {patient_id} and {test_name} already exists",
    }
}

/// Storage for workflow entries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntryRepository: Send + Sync {
    /// Create a pending entry for `order`.
    ///
    /// Fails with [`EntryRepositoryError::InvalidOrder`] when the patient does
    /// not exist holding the test, and with
    /// [`EntryRepositoryError::DuplicateOrder`] when the pair already has an
    /// entry.
    async fn order(&self, order: &EntryOrder) -> Result<Entry, EntryRepositoryError>;

    /// Fetch an entry by identifier.
    async fn find_by_id(&self, id: EntryId) -> Result<Option<Entry>, EntryRepositoryError>;

    /// Every entry, ordered by identifier.
    async fn list(&self) -> Result<Vec<Entry>, EntryRepositoryError>;

    /// Store `updated` only if the entry still holds `expected`. Returns
    /// whether the write happened.
    async fn transition(
        &self,
        expected: EntryStatus,
        updated: &Entry,
    ) -> Result<bool, EntryRepositoryError>;
}
