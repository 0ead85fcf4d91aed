//! Account administration service.
//!
//! Every operation first resolves the acting user and checks
//! [`can_manage_users`]; nothing is read or written for a non-admin.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::account_support::{
    allocate_user_id, hash_password, map_user_repository_error, require_actor,
};
use super::ports::{PasswordHasher, UserAdministration, UserRepository};
use super::{Error, FailureReason, NewAccount, Role, User, UserAccount, UserId, can_manage_users};

fn user_not_found(id: &UserId) -> Error {
    Error::from_reason(FailureReason::UserNotFound, format!("user {id} not found"))
}

/// [`UserAdministration`] over a user repository.
#[derive(Clone)]
pub struct UserAdminService<U, H> {
    users: Arc<U>,
    hasher: Arc<H>,
}

impl<U, H> UserAdminService<U, H> {
    /// Create the service.
    pub fn new(users: Arc<U>, hasher: Arc<H>) -> Self {
        Self { users, hasher }
    }
}

impl<U, H> UserAdminService<U, H>
where
    U: UserRepository,
{
    async fn require_admin(&self, actor: &UserId) -> Result<User, Error> {
        let actor = require_actor(self.users.as_ref(), actor).await?;
        if !can_manage_users(actor.role()) {
            return Err(Error::from_reason(
                FailureReason::PermissionDenied,
                format!("user {} may not manage accounts", actor.id()),
            ));
        }
        Ok(actor)
    }
}

#[async_trait]
impl<U, H> UserAdministration for UserAdminService<U, H>
where
    U: UserRepository,
    H: PasswordHasher + 'static,
{
    async fn list_users(&self, actor: &UserId) -> Result<Vec<User>, Error> {
        self.require_admin(actor).await?;
        self.users.list().await.map_err(map_user_repository_error)
    }

    async fn create_user(&self, actor: &UserId, account: NewAccount) -> Result<User, Error> {
        let admin = self.require_admin(actor).await?;
        let id = allocate_user_id(self.users.as_ref(), account.role()).await?;
        let password_hash = hash_password(&self.hasher, account.password()).await?;
        let user = User::new(id, account.name().clone(), account.role());

        self.users
            .insert(&UserAccount::new(user.clone(), password_hash))
            .await
            .map_err(map_user_repository_error)?;

        info!(
            actor = %admin.id(),
            user_id = %user.id(),
            role = %user.role(),
            "user created"
        );
        Ok(user)
    }

    async fn delete_user(&self, actor: &UserId, target: &UserId) -> Result<(), Error> {
        let admin = self.require_admin(actor).await?;
        let deleted = self
            .users
            .delete(target)
            .await
            .map_err(map_user_repository_error)?;
        if !deleted {
            return Err(user_not_found(target));
        }
        info!(actor = %admin.id(), user_id = %target, "user deleted");
        Ok(())
    }

    async fn promote_user(
        &self,
        actor: &UserId,
        target: &UserId,
        role: Role,
    ) -> Result<User, Error> {
        let admin = self.require_admin(actor).await?;
        let user = self
            .users
            .update_role(target, role)
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(|| user_not_found(target))?;
        info!(actor = %admin.id(), user_id = %target, %role, "user role changed");
        Ok(user)
    }
}
