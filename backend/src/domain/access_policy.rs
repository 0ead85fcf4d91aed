//! Role checks guarding mutating operations.

use super::user::Role;

/// Whether `role` may verify processed entries.
///
/// # Examples
/// ```
/// use labflow::domain::{Role, can_verify_entry};
///
/// assert!(can_verify_entry(Role::Supervisor));
/// assert!(!can_verify_entry(Role::Technician));
/// ```
#[must_use]
pub const fn can_verify_entry(role: Role) -> bool {
    matches!(role, Role::Supervisor | Role::Admin)
}

/// Whether `role` may create, delete, promote and list users.
#[must_use]
pub const fn can_manage_users(role: Role) -> bool {
    matches!(role, Role::Admin)
}
