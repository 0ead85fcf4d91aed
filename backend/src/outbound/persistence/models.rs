//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions into domain values validate
//! every column, so a row that violates a domain invariant surfaces as a
//! query error rather than a panic.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::{
    Entry, EntryDraft, EntryId, EntryStatus, Patient, PatientId, PasswordHash, Role, TestName,
    TestResult, User, UserAccount, UserId, UserName,
};

use super::schema::{entries, patients, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: String,
    pub name: String,
    pub password_hash: String,
    pub role: String,
}

impl UserRow {
    pub(crate) fn into_user(self) -> Result<User, String> {
        self.into_account().map(UserAccount::into_user)
    }

    pub(crate) fn into_account(self) -> Result<UserAccount, String> {
        let id = UserId::new(self.id).map_err(|err| err.to_string())?;
        let name = UserName::new(self.name).map_err(|err| err.to_string())?;
        let role = self.role.parse::<Role>().map_err(|err| err.to_string())?;
        Ok(UserAccount::new(
            User::new(id, name, role),
            PasswordHash::new(self.password_hash),
        ))
    }
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
}

impl<'a> From<&'a UserAccount> for NewUserRow<'a> {
    fn from(account: &'a UserAccount) -> Self {
        Self {
            id: account.user().id().as_ref(),
            name: account.user().name().as_ref(),
            password_hash: account.password_hash().as_str(),
            role: account.user().role().as_str(),
        }
    }
}

/// Row struct for reading and inserting patients.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = patients)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PatientRow {
    pub id: String,
    pub name: String,
    pub test_name: String,
}

impl PatientRow {
    pub(crate) fn into_patient(self) -> Result<Patient, String> {
        let id = PatientId::new(self.id).map_err(|err| err.to_string())?;
        let test = self
            .test_name
            .parse::<TestName>()
            .map_err(|err| err.to_string())?;
        Patient::new(id, self.name, test).map_err(|err| err.to_string())
    }
}

impl From<&Patient> for PatientRow {
    fn from(patient: &Patient) -> Self {
        Self {
            id: patient.id().to_string(),
            name: patient.name().to_owned(),
            test_name: patient.test_name().as_str().to_owned(),
        }
    }
}

/// Row struct for reading from the entries table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = entries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct EntryRow {
    pub id: i64,
    pub patient_id: String,
    pub technician_id: Option<String>,
    pub supervisor_id: Option<String>,
    pub test_name: String,
    pub status: String,
    pub result: String,
    pub created_at: DateTime<Utc>,
}

fn optional_user_id(raw: Option<String>) -> Result<Option<UserId>, String> {
    raw.map(UserId::new)
        .transpose()
        .map_err(|err| err.to_string())
}

impl EntryRow {
    pub(crate) fn into_entry(self) -> Result<Entry, String> {
        Ok(Entry::from(EntryDraft {
            id: EntryId::new(self.id),
            patient_id: PatientId::new(self.patient_id).map_err(|err| err.to_string())?,
            technician_id: optional_user_id(self.technician_id)?,
            supervisor_id: optional_user_id(self.supervisor_id)?,
            test_name: self
                .test_name
                .parse::<TestName>()
                .map_err(|err| err.to_string())?,
            status: self
                .status
                .parse::<EntryStatus>()
                .map_err(|err| err.to_string())?,
            result: self
                .result
                .parse::<TestResult>()
                .map_err(|err| err.to_string())?,
            created_at: self.created_at,
        }))
    }
}

/// Insertable struct for new pending entries. Status and result take their
/// column defaults.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = entries)]
pub(crate) struct NewEntryRow<'a> {
    pub patient_id: &'a str,
    pub technician_id: &'a str,
    pub test_name: &'a str,
}

/// Changeset written by a workflow transition.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = entries)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct EntryTransitionUpdate<'a> {
    pub status: &'a str,
    pub result: &'a str,
    pub supervisor_id: Option<&'a str>,
}

impl<'a> From<&'a Entry> for EntryTransitionUpdate<'a> {
    fn from(entry: &'a Entry) -> Self {
        Self {
            status: entry.status().as_str(),
            result: entry.result().as_str(),
            supervisor_id: entry.supervisor_id().map(AsRef::as_ref),
        }
    }
}
