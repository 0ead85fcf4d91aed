//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every rejected input becomes an `invalid_request` error whose details
//! name the offending field and a stable code.

use actix_web::{HttpRequest, error::JsonPayloadError, error::PathError, error::QueryPayloadError, web};
use serde_json::json;

use crate::domain::{
    Error, LoginValidationError, MAX_ROSTER_SIZE, NewAccountValidationError, PatientId, UserId,
    UserValidationError,
};

/// Validation error codes reported in `details.code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldCode {
    EmptyName,
    EmptyPassword,
    NameTooLong,
    InvalidCharacters,
    PasswordTooShort,
    InvalidUserId,
    InvalidPatientId,
    CountTooLarge,
    MalformedBody,
    MalformedQuery,
    MalformedPath,
}

impl FieldCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::EmptyName => "empty_name",
            Self::EmptyPassword => "empty_password",
            Self::NameTooLong => "name_too_long",
            Self::InvalidCharacters => "invalid_characters",
            Self::PasswordTooShort => "password_too_short",
            Self::InvalidUserId => "invalid_user_id",
            Self::InvalidPatientId => "invalid_patient_id",
            Self::CountTooLarge => "count_too_large",
            Self::MalformedBody => "malformed_body",
            Self::MalformedQuery => "malformed_query",
            Self::MalformedPath => "malformed_path",
        }
    }
}

pub(crate) fn field_error(field: &str, code: FieldCode, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code.as_str(),
    }))
}

pub(crate) fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::EmptyName => {
            field_error("name", FieldCode::EmptyName, err.to_string())
        }
        LoginValidationError::EmptyPassword => {
            field_error("password", FieldCode::EmptyPassword, err.to_string())
        }
    }
}

pub(crate) fn map_new_account_error(err: NewAccountValidationError) -> Error {
    let message = err.to_string();
    match err {
        NewAccountValidationError::Name(UserValidationError::NameTooLong { .. }) => {
            field_error("name", FieldCode::NameTooLong, message)
        }
        NewAccountValidationError::Name(UserValidationError::NameInvalidCharacters) => {
            field_error("name", FieldCode::InvalidCharacters, message)
        }
        NewAccountValidationError::Name(_) => field_error("name", FieldCode::EmptyName, message),
        NewAccountValidationError::PasswordTooShort { .. } => {
            field_error("password", FieldCode::PasswordTooShort, message)
        }
    }
}

/// Parse a user identifier taken from the path.
pub(crate) fn parse_user_id(raw: &str) -> Result<UserId, Error> {
    UserId::new(raw).map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(json!({
            "field": "id",
            "value": raw,
            "code": FieldCode::InvalidUserId.as_str(),
        }))
    })
}

/// Parse a patient identifier taken from a request body.
pub(crate) fn parse_patient_id(raw: &str) -> Result<PatientId, Error> {
    PatientId::new(raw).map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(json!({
            "field": "patientId",
            "value": raw,
            "code": FieldCode::InvalidPatientId.as_str(),
        }))
    })
}

/// Reject roster sizes that can never fit in the patient identifier space.
pub(crate) fn validate_roster_count(count: Option<usize>) -> Result<Option<usize>, Error> {
    match count {
        Some(requested) if requested > MAX_ROSTER_SIZE => {
            Err(Error::invalid_request(format!(
                "count must not exceed {MAX_ROSTER_SIZE}"
            ))
            .with_details(json!({
                "field": "count",
                "value": requested,
                "code": FieldCode::CountTooLarge.as_str(),
            })))
        }
        _ => Ok(count),
    }
}

/// JSON extractor configuration returning domain errors.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
        field_error("body", FieldCode::MalformedBody, err.to_string()).into()
    })
}

/// Query extractor configuration returning domain errors.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err: QueryPayloadError, _req: &HttpRequest| {
        field_error("query", FieldCode::MalformedQuery, err.to_string()).into()
    })
}

/// Path extractor configuration returning domain errors.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err: PathError, _req: &HttpRequest| {
        field_error("path", FieldCode::MalformedPath, err.to_string()).into()
    })
}
