//! Entry workflow service.
//!
//! Orders entries and applies the process and verify transitions. The state
//! machine itself lives on [`Entry`]; this service adds the actor and role
//! checks and persists each transition as a compare-and-set so a concurrent
//! transition on the same entry makes exactly one caller win.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use super::account_support::require_actor;
use super::ports::{
    EntriesQuery, EntryRepository, EntryRepositoryError, EntryWorkflowCommand, UserRepository,
};
use super::{
    Entry, EntryId, EntryOrder, EntryTransition, Error, FailureReason, PatientId, TestName,
    TransitionError, UserId, Verdict, can_verify_entry,
};

fn map_repository_error(error: EntryRepositoryError) -> Error {
    match error {
        EntryRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("entry repository unavailable: {message}"))
        }
        EntryRepositoryError::Query { message } => {
            Error::internal(format!("entry repository error: {message}"))
        }
        EntryRepositoryError::InvalidOrder {
            patient_id,
            test_name,
        } => Error::from_reason(
            FailureReason::InvalidOrder,
            format!("no patient {patient_id} booked for {test_name}"),
        ),
        EntryRepositoryError::DuplicateOrder {
            patient_id,
            test_name,
        } => Error::from_reason(
            FailureReason::DuplicateOrder,
            format!("{test_name} has already been ordered for patient {patient_id}"),
        ),
    }
}

fn invalid_transition(err: &TransitionError) -> Error {
    Error::from_reason(FailureReason::InvalidTransition, err.to_string())
}

fn entry_not_found(id: EntryId) -> Error {
    Error::from_reason(FailureReason::EntryNotFound, format!("entry {id} not found"))
}

/// Entry workflow service implementing [`EntryWorkflowCommand`] and
/// [`EntriesQuery`].
#[derive(Clone)]
pub struct EntryWorkflowService<E, U> {
    entries: Arc<E>,
    users: Arc<U>,
}

impl<E, U> EntryWorkflowService<E, U> {
    /// Create the service.
    pub fn new(entries: Arc<E>, users: Arc<U>) -> Self {
        Self { entries, users }
    }
}

impl<E, U> EntryWorkflowService<E, U>
where
    E: EntryRepository,
    U: UserRepository,
{
    async fn load(&self, id: EntryId) -> Result<Entry, Error> {
        self.entries
            .find_by_id(id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| entry_not_found(id))
    }

    /// Apply `transition` to `current` and persist it, conditional on the
    /// status `current` was read with.
    async fn commit(&self, current: &Entry, transition: &EntryTransition) -> Result<Entry, Error> {
        let updated = current
            .apply(transition)
            .map_err(|err| invalid_transition(&err))?;

        let written = self
            .entries
            .transition(current.status(), &updated)
            .await
            .map_err(map_repository_error)?;
        if written {
            return Ok(updated);
        }

        // Lost a race: report against whatever the entry holds now.
        let latest = self.load(current.id()).await?;
        warn!(
            entry_id = %current.id(),
            action = transition.action(),
            status = %latest.status(),
            "concurrent transition rejected"
        );
        Err(invalid_transition(&TransitionError {
            entry_id: current.id(),
            action: transition.action(),
            current: latest.status(),
            required: transition.required_status(),
        }))
    }
}

#[async_trait]
impl<E, U> EntryWorkflowCommand for EntryWorkflowService<E, U>
where
    E: EntryRepository,
    U: UserRepository,
{
    async fn order_entry(
        &self,
        actor: &UserId,
        patient_id: &PatientId,
        test_name: TestName,
    ) -> Result<Entry, Error> {
        let technician = require_actor(self.users.as_ref(), actor).await?;
        let order = EntryOrder {
            patient_id: patient_id.clone(),
            test_name,
            technician_id: technician.id().clone(),
        };

        let entry = self
            .entries
            .order(&order)
            .await
            .map_err(map_repository_error)?;

        info!(
            entry_id = %entry.id(),
            patient_id = %patient_id,
            test_name = %test_name,
            actor = %technician.id(),
            "entry ordered"
        );
        Ok(entry)
    }

    async fn process_entry(&self, actor: &UserId, entry_id: EntryId) -> Result<Entry, Error> {
        let current = self.load(entry_id).await?;
        let technician = require_actor(self.users.as_ref(), actor).await?;

        let processed = self.commit(&current, &EntryTransition::Process).await?;
        info!(%entry_id, actor = %technician.id(), "entry processed");
        Ok(processed)
    }

    async fn verify_entry(
        &self,
        actor: &UserId,
        entry_id: EntryId,
        verdict: Verdict,
    ) -> Result<Entry, Error> {
        let supervisor = require_actor(self.users.as_ref(), actor).await?;
        if !can_verify_entry(supervisor.role()) {
            return Err(Error::from_reason(
                FailureReason::PermissionDenied,
                format!(
                    "user {} ({}) may not verify entries",
                    supervisor.id(),
                    supervisor.role()
                ),
            ));
        }

        let current = self.load(entry_id).await?;
        let transition = EntryTransition::Verify {
            supervisor: supervisor.id().clone(),
            verdict,
        };
        let verified = self.commit(&current, &transition).await?;
        info!(
            %entry_id,
            actor = %supervisor.id(),
            result = %verified.result(),
            "entry verified"
        );
        Ok(verified)
    }
}

#[async_trait]
impl<E, U> EntriesQuery for EntryWorkflowService<E, U>
where
    E: EntryRepository,
    U: UserRepository,
{
    async fn list_entries(&self) -> Result<Vec<Entry>, Error> {
        self.entries.list().await.map_err(map_repository_error)
    }
}

#[cfg(test)]
#[path = "entry_workflow_service_tests.rs"]
mod tests;
