//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::web;

use crate::domain::ports::{
    MockEntriesQuery, MockEntryWorkflowCommand, MockLoginService, MockPatientsQuery,
    MockRosterCommand, MockUserAdministration,
};
use crate::domain::{Role, User, UserId, UserName};

use super::state::HttpState;

/// Token accepted by [`HttpStateBuilder::authenticated_as`].
pub const TEST_TOKEN: &str = "test-token";

/// Assemble an [`HttpState`] from mocks.
///
/// Unset ports get a mock with no expectations, so any call to them fails
/// the test.
#[derive(Default)]
pub struct HttpStateBuilder {
    login: Option<MockLoginService>,
    users: Option<MockUserAdministration>,
    roster: Option<MockRosterCommand>,
    patients: Option<MockPatientsQuery>,
    entries: Option<MockEntryWorkflowCommand>,
    entries_query: Option<MockEntriesQuery>,
}

impl HttpStateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn login(mut self, login: MockLoginService) -> Self {
        self.login = Some(login);
        self
    }

    /// Accept [`TEST_TOKEN`] as a session for `user`.
    pub fn authenticated_as(self, user: User) -> Self {
        let mut login = MockLoginService::new();
        login
            .expect_authenticate()
            .withf(|token| token.as_str() == TEST_TOKEN)
            .returning(move |_| Ok(user.clone()));
        self.login(login)
    }

    pub fn users(mut self, users: MockUserAdministration) -> Self {
        self.users = Some(users);
        self
    }

    pub fn roster(mut self, roster: MockRosterCommand) -> Self {
        self.roster = Some(roster);
        self
    }

    pub fn patients(mut self, patients: MockPatientsQuery) -> Self {
        self.patients = Some(patients);
        self
    }

    pub fn entries(mut self, entries: MockEntryWorkflowCommand) -> Self {
        self.entries = Some(entries);
        self
    }

    pub fn entries_query(mut self, entries_query: MockEntriesQuery) -> Self {
        self.entries_query = Some(entries_query);
        self
    }

    pub fn build(self) -> web::Data<HttpState> {
        web::Data::new(HttpState {
            login: Arc::new(self.login.unwrap_or_default()),
            users: Arc::new(self.users.unwrap_or_default()),
            roster: Arc::new(self.roster.unwrap_or_default()),
            patients: Arc::new(self.patients.unwrap_or_default()),
            entries: Arc::new(self.entries.unwrap_or_default()),
            entries_query: Arc::new(self.entries_query.unwrap_or_default()),
        })
    }
}

/// Build a user fixture.
pub fn user(id: &str, name: &str, role: Role) -> User {
    User::new(
        UserId::new(id).expect("valid user id"),
        UserName::new(name).expect("valid user name"),
        role,
    )
}

/// `Authorization` header carrying [`TEST_TOKEN`].
pub fn bearer() -> (actix_web::http::header::HeaderName, String) {
    (
        actix_web::http::header::AUTHORIZATION,
        format!("Bearer {TEST_TOKEN}"),
    )
}
