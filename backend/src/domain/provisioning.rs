//! Startup account provisioning.
//!
//! Ensures an operator-configured admin exists and, for demos only, the three
//! well-known default accounts. Accounts whose name is already taken are left
//! untouched, so provisioning is safe to run on every start.

use std::sync::Arc;

use tracing::{debug, info};
use zeroize::Zeroizing;

use super::account_support::{allocate_user_id, hash_password, map_user_repository_error};
use super::ports::{PasswordHasher, UserRepository, UserRepositoryError};
use super::{Error, Role, User, UserAccount, UserId, UserName};

/// Demo accounts created when default accounts are enabled:
/// `(id, name, password, role)`.
pub const DEFAULT_ACCOUNTS: [(&str, &str, &str, Role); 3] = [
    ("A01", "admin", "admin123", Role::Admin),
    ("T01", "tech", "tech123", Role::Technician),
    ("S01", "super", "super123", Role::Supervisor),
];

/// Operator supplied admin credentials.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    /// Admin login name.
    pub name: String,
    /// Admin password.
    pub password: Zeroizing<String>,
}

/// What provisioning should ensure.
#[derive(Debug, Clone, Default)]
pub struct ProvisioningPlan {
    /// Configured admin, if any.
    pub admin: Option<AdminSeed>,
    /// Whether to create the demo accounts.
    pub default_accounts: bool,
}

/// Creates the accounts described by a [`ProvisioningPlan`].
pub struct AccountProvisioner<U, H> {
    users: Arc<U>,
    hasher: Arc<H>,
}

impl<U, H> AccountProvisioner<U, H>
where
    U: UserRepository,
    H: PasswordHasher + 'static,
{
    /// Create a provisioner.
    pub fn new(users: Arc<U>, hasher: Arc<H>) -> Self {
        Self { users, hasher }
    }

    /// Apply `plan`. Returns the accounts that were created.
    pub async fn provision(&self, plan: &ProvisioningPlan) -> Result<Vec<User>, Error> {
        let mut created = Vec::new();

        if let Some(seed) = &plan.admin {
            let name = UserName::new(&seed.name)
                .map_err(|err| Error::invalid_request(format!("invalid admin name: {err}")))?;
            if !self.exists(&name).await? {
                let id = allocate_user_id(self.users.as_ref(), Role::Admin).await?;
                created.extend(self.ensure(id, name, &seed.password, Role::Admin).await?);
            }
        }

        if plan.default_accounts {
            for (id, name, password, role) in DEFAULT_ACCOUNTS {
                let id = UserId::new(id)
                    .map_err(|err| Error::internal(format!("invalid default id: {err}")))?;
                let name = UserName::new(name)
                    .map_err(|err| Error::internal(format!("invalid default name: {err}")))?;
                if !self.exists(&name).await? {
                    created.extend(self.ensure(id, name, password, role).await?);
                }
            }
        }

        Ok(created)
    }

    async fn exists(&self, name: &UserName) -> Result<bool, Error> {
        let found = self
            .users
            .find_by_name(name.as_ref())
            .await
            .map_err(map_user_repository_error)?;
        if found.is_some() {
            debug!(%name, "account already present");
        }
        Ok(found.is_some())
    }

    /// Insert one account. A concurrent start that created the same name or
    /// id first is not an error.
    async fn ensure(
        &self,
        id: UserId,
        name: UserName,
        password: &str,
        role: Role,
    ) -> Result<Option<User>, Error> {
        let password_hash = hash_password(&self.hasher, password).await?;
        let user = User::new(id, name, role);
        match self
            .users
            .insert(&UserAccount::new(user.clone(), password_hash))
            .await
        {
            Ok(()) => {
                info!(user_id = %user.id(), name = %user.name(), %role, "account provisioned");
                Ok(Some(user))
            }
            Err(
                UserRepositoryError::DuplicateName { .. } | UserRepositoryError::DuplicateId { .. },
            ) => Ok(None),
            Err(err) => Err(map_user_repository_error(err)),
        }
    }
}
