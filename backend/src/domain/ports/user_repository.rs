//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{Role, User, UserAccount, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already uses the name.
        DuplicateName { name: String } => "user name '{name}' is already taken",
        /// Another account already uses the identifier.
        DuplicateId { id: String } => "user id '{id}' is already taken",
    }
}

/// Storage for lab accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch an account, credential included, by its unique name.
    async fn find_by_name(&self, name: &str) -> Result<Option<UserAccount>, UserRepositoryError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Every user, ordered by identifier.
    async fn list(&self) -> Result<Vec<User>, UserRepositoryError>;

    /// Store a new account.
    async fn insert(&self, account: &UserAccount) -> Result<(), UserRepositoryError>;

    /// Remove a user. Entries that referenced it keep a null reference.
    /// Returns whether a row was deleted.
    async fn delete(&self, id: &UserId) -> Result<bool, UserRepositoryError>;

    /// Change a user's role and return the updated user, or `None` when the
    /// user does not exist.
    async fn update_role(
        &self,
        id: &UserId,
        role: Role,
    ) -> Result<Option<User>, UserRepositoryError>;
}
