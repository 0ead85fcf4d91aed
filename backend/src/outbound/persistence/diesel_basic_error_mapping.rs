//! Shared Diesel error mapping for the lab repositories.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error constructor.
pub(crate) fn map_basic_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Map common Diesel error variants into query/connection constructors.
///
/// Constraint violations the caller cares about must be classified with
/// [`constraint_violation`] first; anything reaching this function is
/// reported as a generic query failure.
pub(crate) fn map_basic_diesel_error<E, Q, C>(error: DieselError, query: Q, connection: C) -> E
where
    Q: Fn(&'static str) -> E,
    C: Fn(&'static str) -> E,
{
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        _ => query("database error"),
    }
}

/// Integrity constraint a write tripped over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConstraintViolation<'a> {
    /// A unique index or key, with its name when Postgres reported one.
    Unique(Option<&'a str>),
    /// A foreign key, with its name when Postgres reported one.
    ForeignKey(Option<&'a str>),
}

/// Classify a unique or foreign key violation; other errors yield `None`.
pub(crate) fn constraint_violation(error: &DieselError) -> Option<ConstraintViolation<'_>> {
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            Some(ConstraintViolation::Unique(info.constraint_name()))
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            Some(ConstraintViolation::ForeignKey(info.constraint_name()))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the shared mapping helpers.
    use rstest::rstest;

    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    enum Mapped {
        Query(&'static str),
        Connection(String),
    }

    #[rstest]
    fn pool_errors_become_connection_errors() {
        let mapped = map_basic_pool_error(PoolError::checkout("timed out"), Mapped::Connection);
        assert_eq!(mapped, Mapped::Connection("timed out".to_owned()));
    }

    #[rstest]
    fn not_found_becomes_a_query_error() {
        let mapped = map_basic_diesel_error(DieselError::NotFound, Mapped::Query, |message| {
            Mapped::Connection(message.to_owned())
        });
        assert_eq!(mapped, Mapped::Query("record not found"));
    }

    #[rstest]
    fn non_database_errors_are_not_constraint_violations() {
        assert_eq!(constraint_violation(&DieselError::NotFound), None);
        assert_eq!(constraint_violation(&DieselError::RollbackTransaction), None);
    }
}
