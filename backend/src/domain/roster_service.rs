//! Patient roster service.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use super::account_support::require_actor;
use super::ports::{
    PatientRepository, PatientRepositoryError, PatientsQuery, RosterCommand, UserRepository,
};
use super::{Error, FailureReason, MAX_ROSTER_SIZE, Patient, RosterPlanner, UserId};

fn map_repository_error(error: PatientRepositoryError) -> Error {
    match error {
        PatientRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("patient repository unavailable: {message}"))
        }
        PatientRepositoryError::Query { message } => {
            Error::internal(format!("patient repository error: {message}"))
        }
        PatientRepositoryError::Exhausted { message } => {
            warn!(%message, "patient id space exhausted");
            Error::from_reason(FailureReason::AllocationExhausted, message)
        }
        PatientRepositoryError::Planning { message } => {
            Error::internal(format!("roster planning failed: {message}"))
        }
    }
}

/// Creates the planner for one regeneration.
pub type PlannerFactory = Arc<dyn Fn(usize) -> RosterPlanner + Send + Sync>;

/// Roster service implementing [`RosterCommand`] and [`PatientsQuery`].
#[derive(Clone)]
pub struct RosterService<P, U> {
    patients: Arc<P>,
    users: Arc<U>,
    default_size: usize,
    planner: PlannerFactory,
}

impl<P, U> RosterService<P, U> {
    /// Create the service. Batches default to `default_size` patients and
    /// draw a fresh seed each time.
    pub fn new(patients: Arc<P>, users: Arc<U>, default_size: usize) -> Self {
        Self {
            patients,
            users,
            default_size,
            planner: Arc::new(RosterPlanner::new),
        }
    }

    /// Replace the planner factory, for example with a fixed seed.
    #[must_use]
    pub fn with_planner(mut self, planner: PlannerFactory) -> Self {
        self.planner = planner;
        self
    }
}

#[async_trait]
impl<P, U> RosterCommand for RosterService<P, U>
where
    P: PatientRepository,
    U: UserRepository,
{
    async fn regenerate(
        &self,
        actor: &UserId,
        count: Option<usize>,
    ) -> Result<Vec<Patient>, Error> {
        let size = count.unwrap_or(self.default_size);
        if size > MAX_ROSTER_SIZE {
            return Err(Error::invalid_request(format!(
                "roster size must not exceed {MAX_ROSTER_SIZE}"
            ))
            .with_details(json!({ "field": "count", "max": MAX_ROSTER_SIZE })));
        }
        let actor = require_actor(self.users.as_ref(), actor).await?;
        let planner = (self.planner)(size);

        let outcome = self
            .patients
            .regenerate(&planner)
            .await
            .map_err(map_repository_error)?;

        info!(
            actor = %actor.id(),
            removed = outcome.removed,
            created = outcome.created.len(),
            "patient roster regenerated"
        );
        Ok(outcome.created)
    }
}

#[async_trait]
impl<P, U> PatientsQuery for RosterService<P, U>
where
    P: PatientRepository,
    U: UserRepository,
{
    async fn list_patients(&self) -> Result<Vec<Patient>, Error> {
        self.patients.list().await.map_err(map_repository_error)
    }
}

#[cfg(test)]
mod tests {
    //! Regeneration wiring and error mapping.
    use std::collections::BTreeSet;

    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::ports::{MockPatientRepository, MockUserRepository, RosterRegeneration};
    use crate::domain::{ErrorCode, Role, User, UserName};

    fn tech() -> User {
        User::new(
            UserId::new("T01").expect("valid id"),
            UserName::new("tech").expect("valid name"),
            Role::Technician,
        )
    }

    #[fixture]
    fn users() -> MockUserRepository {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|_| Ok(Some(tech())));
        users
    }

    fn service(
        patients: MockPatientRepository,
        users: MockUserRepository,
    ) -> RosterService<MockPatientRepository, MockUserRepository> {
        RosterService::new(Arc::new(patients), Arc::new(users), 10)
            .with_planner(Arc::new(|size| RosterPlanner::with_seed(size, 7)))
    }

    #[rstest]
    #[case(None, 10)]
    #[case(Some(3), 3)]
    #[tokio::test]
    async fn regeneration_uses_requested_or_default_size(
        users: MockUserRepository,
        #[case] count: Option<usize>,
        #[case] expected: usize,
    ) {
        let mut patients = MockPatientRepository::new();
        patients
            .expect_regenerate()
            .withf(move |planner| planner.size() == expected)
            .return_once(|planner| {
                Ok(RosterRegeneration {
                    removed: 2,
                    created: planner.plan(&BTreeSet::new()).expect("empty space"),
                })
            });

        let batch = service(patients, users)
            .regenerate(tech().id(), count)
            .await
            .expect("regeneration succeeds");

        assert_eq!(batch.len(), expected);
    }

    #[rstest]
    #[tokio::test]
    async fn exhaustion_is_service_unavailable(users: MockUserRepository) {
        let mut patients = MockPatientRepository::new();
        patients
            .expect_regenerate()
            .return_once(|_| Err(PatientRepositoryError::exhausted("prefix 'P' full")));

        let err = service(patients, users)
            .regenerate(tech().id(), None)
            .await
            .expect_err("no ids left");

        assert_eq!(err.reason(), Some(FailureReason::AllocationExhausted));
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }

    #[rstest]
    #[case(MAX_ROSTER_SIZE + 1)]
    #[case(usize::MAX)]
    #[tokio::test]
    async fn oversized_batches_are_rejected_before_storage(#[case] count: usize) {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().times(0);
        let mut patients = MockPatientRepository::new();
        patients.expect_regenerate().times(0);

        let err = service(patients, users)
            .regenerate(tech().id(), Some(count))
            .await
            .expect_err("batch cannot fit");

        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(
            err.details().and_then(|details| details.get("field")),
            Some(&json!("count"))
        );
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_actors_cannot_regenerate() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().return_once(|_| Ok(None));
        let mut patients = MockPatientRepository::new();
        patients.expect_regenerate().times(0);

        let err = service(patients, users)
            .regenerate(tech().id(), None)
            .await
            .expect_err("actor missing");

        assert_eq!(err.reason(), Some(FailureReason::UserNotFound));
    }

    #[rstest]
    #[tokio::test]
    async fn listing_maps_connection_failures(users: MockUserRepository) {
        let mut patients = MockPatientRepository::new();
        patients
            .expect_list()
            .return_once(|| Err(PatientRepositoryError::connection("pool closed")));

        let err = service(patients, users)
            .list_patients()
            .await
            .expect_err("store down");

        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }
}
