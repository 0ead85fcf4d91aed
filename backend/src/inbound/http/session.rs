//! Bearer-token session extractor.
//!
//! Handlers that need an authenticated caller take a [`SessionUser`]
//! argument. The extractor reads `Authorization: Bearer <token>` and asks the
//! login port to resolve it, so handlers never touch the registry directly.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::debug;

use crate::domain::{Error, SessionToken, User, UserId};
use crate::inbound::http::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";

/// The authenticated caller and the token they presented.
#[derive(Debug, Clone)]
pub struct SessionUser {
    user: User,
    token: SessionToken,
}

impl SessionUser {
    /// The resolved user.
    pub fn user(&self) -> &User {
        &self.user
    }

    /// Shorthand for the caller's identifier.
    pub fn id(&self) -> &UserId {
        self.user.id()
    }

    /// Token the caller authenticated with.
    pub fn token(&self) -> &SessionToken {
        &self.token
    }
}

/// Pull the bearer token out of the request headers.
pub(crate) fn bearer_token(req: &HttpRequest) -> Result<SessionToken, Error> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("login required"))?;
    let value = header
        .to_str()
        .map_err(|_| Error::unauthorized("malformed authorization header"))?;
    let token = value
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::unauthorized("authorization must use the Bearer scheme"))?;
    Ok(SessionToken::new(token))
}

impl FromRequest for SessionUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_token(req);
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        Box::pin(async move {
            let token = token?;
            let state =
                state.ok_or_else(|| Error::internal("HTTP state is not registered on the app"))?;
            let user = state.login.authenticate(&token).await?;
            debug!(user_id = %user.id(), token = %token.fingerprint(), "session resolved");
            Ok(SessionUser { user, token })
        })
    }
}
