//! Driving port for account administration.

use async_trait::async_trait;

use crate::domain::{Error, NewAccount, Role, User, UserId};

/// Admin-only account management. Every call names the acting user, whose
/// role is checked before anything changes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserAdministration: Send + Sync {
    /// All users, ordered by identifier.
    async fn list_users(&self, actor: &UserId) -> Result<Vec<User>, Error>;

    /// Create an account with a freshly allocated identifier.
    async fn create_user(&self, actor: &UserId, account: NewAccount) -> Result<User, Error>;

    /// Delete an account.
    async fn delete_user(&self, actor: &UserId, target: &UserId) -> Result<(), Error>;

    /// Change an account's role. The identifier is kept.
    async fn promote_user(
        &self,
        actor: &UserId,
        target: &UserId,
        role: Role,
    ) -> Result<User, Error>;
}
