//! In-memory session registry.
//!
//! Maps opaque bearer tokens to the user that logged in and an absolute
//! expiry. The registry is built once at startup and shared with the HTTP
//! layer; it is lost on restart. Expired tokens are evicted when they are
//! next looked up. There is no sliding expiry and no size cap.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use rand::Rng;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;

use super::user::UserId;

/// Random bytes drawn for each token before encoding.
const TOKEN_BYTES: usize = 32;

/// Bytes of the SHA-256 digest kept for log fingerprints.
const FINGERPRINT_BYTES: usize = 8;

/// Default session lifetime.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60);

/// Opaque bearer token.
///
/// `Debug` prints only a fingerprint so tokens never reach the logs.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap a token presented by a client.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    fn generate() -> Self {
        let mut bytes = [0_u8; TOKEN_BYTES];
        rand::rng().fill(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Token text to hand back to the client.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Truncated SHA-256 of the token, safe to log.
    ///
    /// # Examples
    /// ```
    /// use labflow::domain::SessionToken;
    ///
    /// let fp = SessionToken::new("abc").fingerprint();
    /// assert_eq!(fp.len(), 16);
    /// ```
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0.as_bytes());
        hex::encode(digest.iter().take(FINGERPRINT_BYTES).copied().collect::<Vec<u8>>())
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionToken({})", self.fingerprint())
    }
}

/// Why a token did not resolve to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionLookupError {
    /// The token was issued but its lifetime has passed. It has been evicted.
    #[error("session expired")]
    Expired,
    /// The token is unknown, revoked or already evicted.
    #[error("session not found")]
    NotFound,
}

#[derive(Debug, Clone)]
struct SessionRecord {
    user_id: UserId,
    expires_at: DateTime<Utc>,
}

/// Token → identity map guarded by a mutex.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// use labflow::domain::{SessionRegistry, UserId};
/// use mockable::DefaultClock;
///
/// let sessions = SessionRegistry::new(Arc::new(DefaultClock), Duration::from_secs(60));
/// let user = UserId::new("T12").unwrap();
/// let token = sessions.issue(user.clone());
/// assert_eq!(sessions.resolve(&token), Ok(user));
/// ```
pub struct SessionRegistry {
    sessions: Mutex<HashMap<SessionToken, SessionRecord>>,
    clock: Arc<dyn Clock>,
    ttl: TimeDelta,
}

impl SessionRegistry {
    /// Create an empty registry issuing sessions that live for `ttl`.
    ///
    /// Lifetimes beyond chrono's range are clamped to the largest supported
    /// span.
    pub fn new(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            clock,
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SessionToken, SessionRecord>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Issue a fresh token for `user_id`.
    pub fn issue(&self, user_id: UserId) -> SessionToken {
        let token = SessionToken::generate();
        let expires_at = self
            .clock
            .utc()
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        debug!(
            token = %token.fingerprint(),
            user_id = %user_id,
            %expires_at,
            "session issued"
        );
        self.lock().insert(
            token.clone(),
            SessionRecord {
                user_id,
                expires_at,
            },
        );
        token
    }

    /// Look up the user behind `token`.
    ///
    /// A token whose expiry has passed is removed and reported as
    /// [`SessionLookupError::Expired`]; later lookups see
    /// [`SessionLookupError::NotFound`].
    pub fn resolve(&self, token: &SessionToken) -> Result<UserId, SessionLookupError> {
        let now = self.clock.utc();
        let mut sessions = self.lock();
        let record = sessions.get(token).ok_or(SessionLookupError::NotFound)?;
        if now >= record.expires_at {
            sessions.remove(token);
            debug!(token = %token.fingerprint(), "expired session evicted");
            return Err(SessionLookupError::Expired);
        }
        Ok(record.user_id.clone())
    }

    /// Forget `token`. Returns whether it was known.
    pub fn revoke(&self, token: &SessionToken) -> bool {
        let removed = self.lock().remove(token).is_some();
        debug!(token = %token.fingerprint(), removed, "session revoked");
        removed
    }

    /// Number of tracked sessions, expired ones included.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no sessions are tracked.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
