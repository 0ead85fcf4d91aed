//! Authentication inputs: login credentials and new-account passwords.
//!
//! Inbound adapters build these from raw strings so services only ever see
//! validated values. Passwords live in zeroizing buffers.

use std::fmt;

use zeroize::Zeroizing;

use super::user::{Role, User, UserName, UserValidationError};

/// Shortest password accepted for new accounts.
pub const PASSWORD_MIN: usize = 6;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Name was missing or blank once trimmed.
    EmptyName,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials used by the login service.
///
/// ## Invariants
/// - `name` is trimmed and non-empty.
/// - `password` is non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use labflow::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" tech ", "tech123").unwrap();
/// assert_eq!(creds.name(), "tech");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    name: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw name/password inputs.
    pub fn try_from_parts(name: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = name.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyName);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            name: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Name used for the account lookup.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Password supplied by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Errors raised while validating a new account request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewAccountValidationError {
    /// The name failed validation.
    Name(UserValidationError),
    /// The password is shorter than [`PASSWORD_MIN`].
    PasswordTooShort { min: usize },
}

impl fmt::Display for NewAccountValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(err) => err.fmt(f),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
        }
    }
}

impl std::error::Error for NewAccountValidationError {}

/// Validated request to create an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    name: UserName,
    password: Zeroizing<String>,
    role: Role,
}

impl NewAccount {
    /// Validate the raw parts of a new account.
    pub fn try_from_parts(
        name: &str,
        password: &str,
        role: Role,
    ) -> Result<Self, NewAccountValidationError> {
        let name = UserName::new(name).map_err(NewAccountValidationError::Name)?;
        if password.chars().count() < PASSWORD_MIN {
            return Err(NewAccountValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        Ok(Self {
            name,
            password: Zeroizing::new(password.to_owned()),
            role,
        })
    }

    /// Requested name.
    pub fn name(&self) -> &UserName {
        &self.name
    }

    /// Requested password.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Requested role.
    pub fn role(&self) -> Role {
        self.role
    }
}

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    /// Bearer token for subsequent calls.
    pub token: super::session::SessionToken,
    /// The authenticated user.
    pub user: User,
}
