//! Helpers shared by the services that touch user accounts.

use std::collections::BTreeSet;
use std::sync::Arc;

use lab_roster::allocate_id;
use tracing::warn;
use zeroize::Zeroizing;

use super::ports::{PasswordHasher, PasswordHasherError, UserRepository, UserRepositoryError};
use super::{Error, FailureReason, PasswordHash, Role, User, UserId};

pub(crate) fn map_user_repository_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserRepositoryError::DuplicateName { name } => Error::from_reason(
            FailureReason::DuplicateUserName,
            format!("user name '{name}' is already taken"),
        ),
        UserRepositoryError::DuplicateId { id } => {
            Error::conflict(format!("user id '{id}' is already taken"))
        }
    }
}

fn map_hasher_error(error: PasswordHasherError) -> Error {
    warn!(error = %error, "password hasher failed");
    Error::internal(error.to_string())
}

/// Look up the acting user, failing with `UserNotFound` when it is gone.
pub(crate) async fn require_actor<U>(users: &U, actor: &UserId) -> Result<User, Error>
where
    U: UserRepository + ?Sized,
{
    users
        .find_by_id(actor)
        .await
        .map_err(map_user_repository_error)?
        .ok_or_else(|| {
            Error::from_reason(
                FailureReason::UserNotFound,
                format!("user {actor} not found"),
            )
        })
}

/// Pick an unused identifier carrying `role`'s prefix.
pub(crate) async fn allocate_user_id<U>(users: &U, role: Role) -> Result<UserId, Error>
where
    U: UserRepository + ?Sized,
{
    let taken: BTreeSet<String> = users
        .list()
        .await
        .map_err(map_user_repository_error)?
        .iter()
        .map(|user| user.id().to_string())
        .collect();
    let short = allocate_id(&mut rand::rng(), role.id_prefix(), &taken).map_err(|err| {
        warn!(prefix = %err.prefix, attempts = err.attempts, "user id space exhausted");
        Error::from_reason(FailureReason::AllocationExhausted, err.to_string())
    })?;
    UserId::new(short.to_string())
        .map_err(|err| Error::internal(format!("allocated user id is invalid: {err}")))
}

/// Hash `password` on the blocking pool.
pub(crate) async fn hash_password<H>(hasher: &Arc<H>, password: &str) -> Result<PasswordHash, Error>
where
    H: PasswordHasher + ?Sized + 'static,
{
    let hasher = Arc::clone(hasher);
    let password = Zeroizing::new(password.to_owned());
    tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|err| Error::internal(format!("password hashing aborted: {err}")))?
        .map_err(map_hasher_error)
}

/// Check `password` against `hash` on the blocking pool.
pub(crate) async fn verify_password<H>(
    hasher: &Arc<H>,
    password: &str,
    hash: PasswordHash,
) -> Result<bool, Error>
where
    H: PasswordHasher + ?Sized + 'static,
{
    let hasher = Arc::clone(hasher);
    let password = Zeroizing::new(password.to_owned());
    tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
        .await
        .map_err(|err| Error::internal(format!("password check aborted: {err}")))?
        .map_err(map_hasher_error)
}
