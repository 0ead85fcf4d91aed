//! PostgreSQL-backed `PatientRepository` implementation.
//!
//! Regeneration runs in one transaction: the sweep of unreferenced patients,
//! the read of surviving identifiers, planning and the batch insert commit or
//! roll back together.

use std::collections::BTreeSet;

use async_trait::async_trait;
use diesel::dsl::not;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::ports::{PatientRepository, PatientRepositoryError, RosterRegeneration};
use crate::domain::{Patient, PatientId, RosterPlanError, RosterPlanner};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::PatientRow;
use super::pool::{DbPool, PoolError};
use super::schema::{entries, patients};

/// Diesel-backed implementation of the patient repository port.
#[derive(Clone)]
pub struct DieselPatientRepository {
    pool: DbPool,
}

impl DieselPatientRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PatientRepositoryError {
    map_basic_pool_error(error, PatientRepositoryError::connection)
}

fn map_diesel_error(error: DieselError) -> PatientRepositoryError {
    map_basic_diesel_error(
        error,
        PatientRepositoryError::query,
        PatientRepositoryError::connection,
    )
}

/// Failure inside the regeneration transaction.
enum RegenerateError {
    Diesel(DieselError),
    InvalidRow(String),
    Plan(RosterPlanError),
}

impl From<DieselError> for RegenerateError {
    fn from(value: DieselError) -> Self {
        Self::Diesel(value)
    }
}

impl From<RegenerateError> for PatientRepositoryError {
    fn from(value: RegenerateError) -> Self {
        match value {
            RegenerateError::Diesel(err) => map_diesel_error(err),
            RegenerateError::InvalidRow(message) => {
                Self::query(format!("invalid patient row: {message}"))
            }
            RegenerateError::Plan(err) => err.into(),
        }
    }
}

#[async_trait]
impl PatientRepository for DieselPatientRepository {
    async fn list(&self) -> Result<Vec<Patient>, PatientRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = patients::table
            .order(patients::id.asc())
            .select(PatientRow::as_select())
            .load::<PatientRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter()
            .map(|row| {
                row.into_patient()
                    .map_err(|message| RegenerateError::InvalidRow(message).into())
            })
            .collect()
    }

    async fn regenerate(
        &self,
        planner: &RosterPlanner,
    ) -> Result<RosterRegeneration, PatientRepositoryError> {
        let planner = *planner;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let outcome = conn
            .transaction::<_, RegenerateError, _>(|conn| {
                async move {
                    let referenced = entries::table.select(entries::patient_id);
                    let removed = diesel::delete(
                        patients::table.filter(not(patients::id.eq_any(referenced))),
                    )
                    .execute(conn)
                    .await?;

                    let surviving = patients::table
                        .select(patients::id)
                        .load::<String>(conn)
                        .await?
                        .into_iter()
                        .map(PatientId::new)
                        .collect::<Result<BTreeSet<_>, _>>()
                        .map_err(|err| RegenerateError::InvalidRow(err.to_string()))?;

                    let created = planner.plan(&surviving).map_err(RegenerateError::Plan)?;
                    let rows: Vec<PatientRow> = created.iter().map(PatientRow::from).collect();
                    diesel::insert_into(patients::table)
                        .values(&rows)
                        .execute(conn)
                        .await?;

                    Ok(RosterRegeneration { removed, created })
                }
                .scope_boxed()
            })
            .await?;

        debug!(
            removed = outcome.removed,
            created = outcome.created.len(),
            "patient roster replaced"
        );
        Ok(outcome)
    }
}
