//! Login service backed by the user repository and the session registry.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use super::account_support::{hash_password, map_user_repository_error, verify_password};
use super::ports::{LoginService, PasswordHasher, UserRepository};
use super::{
    Error, FailureReason, LoginCredentials, LoginOutcome, SessionLookupError, SessionRegistry,
    PasswordHash, SessionToken, User,
};

/// Password behind the stand-in hash checked for unknown names.
const DECOY_PASSWORD: &str = "labflow-decoy-password";

fn invalid_credentials() -> Error {
    Error::from_reason(FailureReason::InvalidCredentials, "invalid credentials")
}

/// [`LoginService`] that checks stored password hashes and issues sessions.
///
/// Unknown names are checked against a stand-in hash made by the same hasher,
/// so a miss costs as much as a wrong password.
#[derive(Clone)]
pub struct AccountLoginService<U, H> {
    users: Arc<U>,
    hasher: Arc<H>,
    sessions: Arc<SessionRegistry>,
    decoy: Arc<OnceCell<PasswordHash>>,
}

impl<U, H> AccountLoginService<U, H> {
    /// Create a login service over `users`, sharing `sessions` with the
    /// caller.
    pub fn new(users: Arc<U>, hasher: Arc<H>, sessions: Arc<SessionRegistry>) -> Self {
        Self {
            users,
            hasher,
            sessions,
            decoy: Arc::new(OnceCell::new()),
        }
    }
}

impl<U, H> AccountLoginService<U, H>
where
    H: PasswordHasher + 'static,
{
    async fn verify_against_decoy(&self, password: &str) -> Result<(), Error> {
        let decoy = self
            .decoy
            .get_or_try_init(|| hash_password(&self.hasher, DECOY_PASSWORD))
            .await?
            .clone();
        verify_password(&self.hasher, password, decoy).await?;
        Ok(())
    }
}

#[async_trait]
impl<U, H> LoginService for AccountLoginService<U, H>
where
    U: UserRepository,
    H: PasswordHasher + 'static,
{
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginOutcome, Error> {
        let account = self
            .users
            .find_by_name(credentials.name())
            .await
            .map_err(map_user_repository_error)?;
        let Some(account) = account else {
            self.verify_against_decoy(credentials.password()).await?;
            warn!(name = credentials.name(), "login rejected: unknown user");
            return Err(invalid_credentials());
        };

        let matches = verify_password(
            &self.hasher,
            credentials.password(),
            account.password_hash().clone(),
        )
        .await?;
        if !matches {
            warn!(user_id = %account.user().id(), "login rejected: wrong password");
            return Err(invalid_credentials());
        }

        let user = account.into_user();
        let token = self.sessions.issue(user.id().clone());
        info!(user_id = %user.id(), role = %user.role(), "user logged in");
        Ok(LoginOutcome { token, user })
    }

    async fn logout(&self, token: &SessionToken) -> Result<(), Error> {
        if self.sessions.revoke(token) {
            info!(token = %token.fingerprint(), "user logged out");
        }
        Ok(())
    }

    async fn authenticate(&self, token: &SessionToken) -> Result<User, Error> {
        let user_id = self.sessions.resolve(token).map_err(|err| match err {
            SessionLookupError::Expired => Error::unauthorized("session expired"),
            SessionLookupError::NotFound => Error::unauthorized("invalid or expired token"),
        })?;

        let user = self
            .users
            .find_by_id(&user_id)
            .await
            .map_err(map_user_repository_error)?;
        match user {
            Some(user) => Ok(user),
            None => {
                self.sessions.revoke(token);
                warn!(%user_id, "session revoked: user no longer exists");
                Err(Error::unauthorized("session user no longer exists"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    //! Login, logout and token resolution.
    use std::time::Duration;

    use chrono::{DateTime, Utc};
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::ports::{MockPasswordHasher, MockUserRepository, UserRepositoryError};
    use crate::domain::{ErrorCode, PasswordHash, Role, UserAccount, UserId, UserName};
    use crate::test_support::MutableClock;

    const TTL: Duration = Duration::from_secs(3600);

    fn tech() -> User {
        User::new(
            UserId::new("T01").expect("valid id"),
            UserName::new("tech").expect("valid name"),
            Role::Technician,
        )
    }

    fn tech_account() -> UserAccount {
        UserAccount::new(tech(), PasswordHash::new("stored"))
    }

    #[fixture]
    fn clock() -> Arc<MutableClock> {
        Arc::new(MutableClock::new(DateTime::<Utc>::UNIX_EPOCH))
    }

    fn hasher_accepting(expected: &'static str) -> MockPasswordHasher {
        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_verify()
            .returning(move |password, _| Ok(password == expected));
        hasher
    }

    fn service(
        users: MockUserRepository,
        hasher: MockPasswordHasher,
        clock: &Arc<MutableClock>,
    ) -> (
        AccountLoginService<MockUserRepository, MockPasswordHasher>,
        Arc<SessionRegistry>,
    ) {
        let sessions = Arc::new(SessionRegistry::new(clock.clone(), TTL));
        (
            AccountLoginService::new(Arc::new(users), Arc::new(hasher), sessions.clone()),
            sessions,
        )
    }

    fn credentials(name: &str, password: &str) -> LoginCredentials {
        LoginCredentials::try_from_parts(name, password).expect("credentials shape")
    }

    #[rstest]
    #[tokio::test]
    async fn valid_credentials_open_a_session(clock: Arc<MutableClock>) {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_name()
            .withf(|name| name == "tech")
            .return_once(|_| Ok(Some(tech_account())));
        let (service, sessions) = service(users, hasher_accepting("tech123"), &clock);

        let outcome = service
            .login(&credentials("tech", "tech123"))
            .await
            .expect("login succeeds");

        assert_eq!(outcome.user, tech());
        assert_eq!(sessions.resolve(&outcome.token), Ok(tech().id().clone()));
    }

    #[rstest]
    #[tokio::test]
    async fn wrong_passwords_are_rejected(clock: Arc<MutableClock>) {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_name()
            .return_once(|_| Ok(Some(tech_account())));
        let (service, sessions) = service(users, hasher_accepting("tech123"), &clock);

        let err = service
            .login(&credentials("tech", "nope"))
            .await
            .expect_err("wrong password");

        assert_eq!(err.reason(), Some(FailureReason::InvalidCredentials));
        assert_eq!(err.code(), ErrorCode::Unauthorized);
        assert!(sessions.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_users_are_checked_against_a_stand_in_hash(clock: Arc<MutableClock>) {
        let mut users = MockUserRepository::new();
        users.expect_find_by_name().returning(|_| Ok(None));
        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_hash()
            .withf(|password| password == DECOY_PASSWORD)
            .times(1)
            .returning(|_| Ok(PasswordHash::new("stand-in")));
        hasher
            .expect_verify()
            .withf(|password, hash| password == "whatever" && hash.as_str() == "stand-in")
            .times(2)
            .returning(|_, _| Ok(false));
        let (service, sessions) = service(users, hasher, &clock);

        for _ in 0..2 {
            let err = service
                .login(&credentials("ghost", "whatever"))
                .await
                .expect_err("unknown user");
            assert_eq!(err.reason(), Some(FailureReason::InvalidCredentials));
        }
        assert!(sessions.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn repository_outages_surface_as_unavailable(clock: Arc<MutableClock>) {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_name()
            .return_once(|_| Err(UserRepositoryError::connection("refused")));
        let (service, _) = service(users, MockPasswordHasher::new(), &clock);

        let err = service
            .login(&credentials("tech", "tech123"))
            .await
            .expect_err("store down");

        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }

    #[rstest]
    #[tokio::test]
    async fn tokens_authenticate_until_expiry(clock: Arc<MutableClock>) {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|_| Ok(Some(tech())));
        let (service, sessions) = service(users, MockPasswordHasher::new(), &clock);
        let token = sessions.issue(tech().id().clone());

        assert_eq!(service.authenticate(&token).await.expect("fresh"), tech());

        clock.advance(TTL);
        let err = service.authenticate(&token).await.expect_err("expired");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
        assert_eq!(err.message(), "session expired");
    }

    #[rstest]
    #[tokio::test]
    async fn sessions_of_deleted_users_are_revoked(clock: Arc<MutableClock>) {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().return_once(|_| Ok(None));
        let (service, sessions) = service(users, MockPasswordHasher::new(), &clock);
        let token = sessions.issue(tech().id().clone());

        let err = service.authenticate(&token).await.expect_err("user gone");

        assert_eq!(err.code(), ErrorCode::Unauthorized);
        assert!(sessions.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn logout_revokes_the_token(clock: Arc<MutableClock>) {
        let (service, sessions) = service(
            MockUserRepository::new(),
            MockPasswordHasher::new(),
            &clock,
        );
        let token = sessions.issue(tech().id().clone());

        service.logout(&token).await.expect("logout succeeds");
        service.logout(&token).await.expect("second logout is a no-op");

        assert!(sessions.is_empty());
    }
}
