//! Lab staff accounts.
//!
//! Users carry a short identifier whose prefix letter records the role they
//! were created with (`A12`, `T34`, `S56`). Promotion changes the role but
//! keeps the identifier.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Maximum length of a user name in characters.
pub const USER_NAME_MAX: usize = 64;

/// Validation errors returned by the user constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// The identifier is not a capital letter followed by two digits.
    InvalidId,
    /// The name was blank once trimmed.
    EmptyName,
    /// The name exceeds [`USER_NAME_MAX`] characters.
    NameTooLong { max: usize },
    /// The name contains control characters.
    NameInvalidCharacters,
    /// The role string is not one of the known roles.
    UnknownRole(String),
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "user id must be a capital letter followed by two digits"),
            Self::EmptyName => write!(f, "user name must not be empty"),
            Self::NameTooLong { max } => write!(f, "user name must be at most {max} characters"),
            Self::NameInvalidCharacters => {
                write!(f, "user name must not contain control characters")
            }
            Self::UnknownRole(raw) => write!(f, "unknown role '{raw}'"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Staff role gating what a user may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Role {
    /// Orders and processes entries.
    Technician,
    /// Verifies processed entries.
    Supervisor,
    /// Manages accounts and may verify entries.
    Admin,
}

impl Role {
    /// Every role, in privilege order.
    pub const ALL: [Self; 3] = [Self::Technician, Self::Supervisor, Self::Admin];

    /// Prefix letter used when allocating identifiers for this role.
    #[must_use]
    pub const fn id_prefix(self) -> char {
        match self {
            Self::Technician => 'T',
            Self::Supervisor => 'S',
            Self::Admin => 'A',
        }
    }

    /// Stored and displayed name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Technician => "Technician",
            Self::Supervisor => "Supervisor",
            Self::Admin => "Admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UserValidationError::UnknownRole(s.to_owned()))
    }
}

/// Short user identifier such as `T42`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and construct a [`UserId`].
    ///
    /// # Examples
    /// ```
    /// use labflow::domain::UserId;
    ///
    /// assert!(UserId::new("T42").is_ok());
    /// assert!(UserId::new("t42").is_err());
    /// ```
    pub fn new(id: impl Into<String>) -> Result<Self, UserValidationError> {
        let id = id.into();
        let mut chars = id.chars();
        let well_formed = chars.next().is_some_and(|c| c.is_ascii_uppercase())
            && chars.clone().count() == 2
            && chars.all(|c| c.is_ascii_digit());
        if well_formed {
            Ok(Self(id))
        } else {
            Err(UserValidationError::InvalidId)
        }
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Unique login and display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName(String);

impl UserName {
    /// Trim and validate a user name.
    pub fn new(name: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if trimmed.chars().count() > USER_NAME_MAX {
            return Err(UserValidationError::NameTooLong {
                max: USER_NAME_MAX,
            });
        }
        if trimmed.chars().any(char::is_control) {
            return Err(UserValidationError::NameInvalidCharacters);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<UserName> for String {
    fn from(value: UserName) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Opaque stored credential in PHC string format.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded hash produced by a password hasher.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Encoded PHC string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

/// Public view of a lab user.
///
/// # Examples
/// ```
/// use labflow::domain::{Role, User, UserId, UserName};
///
/// let user = User::new(
///     UserId::new("S21").unwrap(),
///     UserName::new("dana").unwrap(),
///     Role::Supervisor,
/// );
/// assert_eq!(user.role(), Role::Supervisor);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    id: UserId,
    name: UserName,
    role: Role,
}

impl User {
    /// Build a user from validated parts.
    pub fn new(id: UserId, name: UserName, role: Role) -> Self {
        Self { id, name, role }
    }

    /// Stable identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Unique name.
    pub fn name(&self) -> &UserName {
        &self.name
    }

    /// Current role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Copy of this user holding `role`.
    #[must_use]
    pub fn with_role(&self, role: Role) -> Self {
        Self {
            role,
            ..self.clone()
        }
    }
}

/// A user together with their stored credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    user: User,
    password_hash: PasswordHash,
}

impl UserAccount {
    /// Pair a user with a credential.
    pub fn new(user: User, password_hash: PasswordHash) -> Self {
        Self {
            user,
            password_hash,
        }
    }

    /// Public part of the account.
    pub fn user(&self) -> &User {
        &self.user
    }

    /// Stored credential.
    pub fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }

    /// Drop the credential and keep the public view.
    pub fn into_user(self) -> User {
        self.user
    }
}
