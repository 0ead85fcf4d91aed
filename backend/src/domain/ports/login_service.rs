//! Driving port for login, logout and session authentication.
//!
//! In hexagonal terms this is a *driving* port: inbound adapters call it to
//! authenticate credentials and bearer tokens without knowing the backing
//! storage or session registry.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, LoginOutcome, SessionToken, User};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Check credentials and open a session.
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginOutcome, Error>;

    /// Close the session behind `token`. Unknown tokens are ignored.
    async fn logout(&self, token: &SessionToken) -> Result<(), Error>;

    /// Resolve a bearer token to the user that owns it.
    async fn authenticate(&self, token: &SessionToken) -> Result<User, Error>;
}
