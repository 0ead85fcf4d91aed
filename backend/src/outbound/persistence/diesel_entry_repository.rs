//! PostgreSQL-backed `EntryRepository` implementation.
//!
//! Ordering checks and inserts inside one transaction, with the unique index
//! on `(patient_id, test_name)` and the composite foreign key to `patients`
//! as backstops for concurrent writers. Transitions are a single conditional
//! `UPDATE` keyed on the expected status.

use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::{debug, warn};

use crate::domain::ports::{EntryRepository, EntryRepositoryError};
use crate::domain::{Entry, EntryId, EntryOrder, EntryStatus};

use super::diesel_basic_error_mapping::{
    ConstraintViolation, constraint_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{EntryRow, EntryTransitionUpdate, NewEntryRow};
use super::pool::{DbPool, PoolError};
use super::schema::{entries, patients};

/// Diesel-backed implementation of the entry repository port.
#[derive(Clone)]
pub struct DieselEntryRepository {
    pool: DbPool,
}

impl DieselEntryRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> EntryRepositoryError {
    map_basic_pool_error(error, EntryRepositoryError::connection)
}

fn map_diesel_error(error: DieselError) -> EntryRepositoryError {
    map_basic_diesel_error(
        error,
        EntryRepositoryError::query,
        EntryRepositoryError::connection,
    )
}

fn row_to_entry(row: EntryRow) -> Result<Entry, EntryRepositoryError> {
    row.into_entry().map_err(|message| {
        warn!(%message, "stored entry row is invalid");
        EntryRepositoryError::query(format!("invalid entry row: {message}"))
    })
}

/// Failure inside the order transaction.
enum OrderError {
    Diesel(DieselError),
    Rejected(EntryRepositoryError),
}

impl From<DieselError> for OrderError {
    fn from(value: DieselError) -> Self {
        Self::Diesel(value)
    }
}

fn map_order_error(error: OrderError, order: &EntryOrder) -> EntryRepositoryError {
    let patient_id = order.patient_id.as_ref();
    let test_name = order.test_name.as_str();
    match error {
        OrderError::Rejected(err) => err,
        OrderError::Diesel(err) => match constraint_violation(&err) {
            Some(ConstraintViolation::Unique(_)) => {
                EntryRepositoryError::duplicate_order(patient_id, test_name)
            }
            Some(ConstraintViolation::ForeignKey(Some(name))) if name.contains("patient") => {
                EntryRepositoryError::invalid_order(patient_id, test_name)
            }
            _ => map_diesel_error(err),
        },
    }
}

#[async_trait]
impl EntryRepository for DieselEntryRepository {
    async fn order(&self, order: &EntryOrder) -> Result<Entry, EntryRepositoryError> {
        let patient_id = order.patient_id.as_ref();
        let test_name = order.test_name.as_str();
        let new_row = NewEntryRow {
            patient_id,
            technician_id: order.technician_id.as_ref(),
            test_name,
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = conn
            .transaction::<_, OrderError, _>(|conn| {
                async move {
                    let booked = diesel::select(exists(
                        patients::table
                            .filter(patients::id.eq(patient_id))
                            .filter(patients::test_name.eq(test_name)),
                    ))
                    .get_result::<bool>(conn)
                    .await?;
                    if !booked {
                        return Err(OrderError::Rejected(EntryRepositoryError::invalid_order(
                            patient_id, test_name,
                        )));
                    }

                    let duplicate = diesel::select(exists(
                        entries::table
                            .filter(entries::patient_id.eq(patient_id))
                            .filter(entries::test_name.eq(test_name)),
                    ))
                    .get_result::<bool>(conn)
                    .await?;
                    if duplicate {
                        return Err(OrderError::Rejected(
                            EntryRepositoryError::duplicate_order(patient_id, test_name),
                        ));
                    }

                    let row = diesel::insert_into(entries::table)
                        .values(&new_row)
                        .returning(EntryRow::as_returning())
                        .get_result::<EntryRow>(conn)
                        .await?;
                    Ok(row)
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| map_order_error(err, order))?;

        row_to_entry(row)
    }

    async fn find_by_id(&self, id: EntryId) -> Result<Option<Entry>, EntryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = entries::table
            .find(id.get())
            .select(EntryRow::as_select())
            .first::<EntryRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_entry).transpose()
    }

    async fn list(&self) -> Result<Vec<Entry>, EntryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = entries::table
            .order(entries::id.asc())
            .select(EntryRow::as_select())
            .load::<EntryRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_entry).collect()
    }

    async fn transition(
        &self,
        expected: EntryStatus,
        updated: &Entry,
    ) -> Result<bool, EntryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let written = diesel::update(
            entries::table
                .find(updated.id().get())
                .filter(entries::status.eq(expected.as_str())),
        )
        .set(EntryTransitionUpdate::from(updated))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        debug!(
            entry_id = %updated.id(),
            from = %expected,
            to = %updated.status(),
            written,
            "entry transition attempted"
        );
        Ok(written == 1)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for order error mapping.
    use super::*;
    use crate::domain::{PatientId, TestName, UserId};
    use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind};
    use rstest::rstest;

    /// Violation report naming only the constraint.
    struct Violated(&'static str);

    impl DatabaseErrorInformation for Violated {
        fn message(&self) -> &str {
            "constraint violated"
        }

        fn details(&self) -> Option<&str> {
            None
        }

        fn hint(&self) -> Option<&str> {
            None
        }

        fn table_name(&self) -> Option<&str> {
            Some("entries")
        }

        fn column_name(&self) -> Option<&str> {
            None
        }

        fn constraint_name(&self) -> Option<&str> {
            Some(self.0)
        }

        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn violation(kind: DatabaseErrorKind, constraint: &'static str) -> OrderError {
        OrderError::Diesel(DieselError::DatabaseError(kind, Box::new(Violated(constraint))))
    }

    fn order() -> EntryOrder {
        EntryOrder {
            patient_id: PatientId::new("P10").expect("valid patient id"),
            test_name: TestName::BloodTest,
            technician_id: UserId::new("T01").expect("valid user id"),
        }
    }

    #[rstest]
    fn rejections_pass_through() {
        let rejected = EntryRepositoryError::invalid_order("P10", "Blood Test");
        let err = map_order_error(OrderError::Rejected(rejected.clone()), &order());

        assert_eq!(err, rejected);
    }

    #[rstest]
    fn other_diesel_errors_are_query_errors() {
        let err = map_order_error(OrderError::Diesel(DieselError::NotFound), &order());

        assert!(matches!(err, EntryRepositoryError::Query { .. }));
    }

    #[rstest]
    #[case(
        DatabaseErrorKind::UniqueViolation,
        "entries_patient_test_idx",
        EntryRepositoryError::duplicate_order("P10", "Blood Test")
    )]
    #[case(
        DatabaseErrorKind::ForeignKeyViolation,
        "entries_patient_test_fkey",
        EntryRepositoryError::invalid_order("P10", "Blood Test")
    )]
    fn constraint_backstops_map_to_order_rejections(
        #[case] kind: DatabaseErrorKind,
        #[case] constraint: &'static str,
        #[case] expected: EntryRepositoryError,
    ) {
        assert_eq!(map_order_error(violation(kind, constraint), &order()), expected);
    }

    #[rstest]
    #[case("entries_technician_id_fkey")]
    #[case("entries_supervisor_id_fkey")]
    fn user_reference_violations_stay_query_errors(#[case] constraint: &'static str) {
        let err = map_order_error(
            violation(DatabaseErrorKind::ForeignKeyViolation, constraint),
            &order(),
        );

        assert!(matches!(err, EntryRepositoryError::Query { .. }));
    }
}
