//! Entry workflow handlers.
//!
//! ```text
//! GET  /api/v1/entries
//! POST /api/v1/entries                {"patientId":"P10","testName":"Blood Test"}
//! POST /api/v1/entries/{id}/process
//! POST /api/v1/entries/{id}/verify    {"result":"Positive"}
//! ```

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Entry, EntryId, EntryStatus, Error, TestName, TestResult, Verdict};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_patient_id;

/// Public view of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntryResponse {
    pub id: i64,
    #[schema(example = "P10")]
    pub patient_id: String,
    /// Ordering technician, absent once their account is deleted.
    pub technician_id: Option<String>,
    /// Verifier, set once the entry is verified.
    pub supervisor_id: Option<String>,
    pub test_name: TestName,
    pub status: EntryStatus,
    pub result: TestResult,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
}

impl From<&Entry> for EntryResponse {
    fn from(entry: &Entry) -> Self {
        Self {
            id: entry.id().get(),
            patient_id: entry.patient_id().to_string(),
            technician_id: entry.technician_id().map(ToString::to_string),
            supervisor_id: entry.supervisor_id().map(ToString::to_string),
            test_name: entry.test_name(),
            status: entry.status(),
            result: entry.result(),
            created_at: entry.created_at(),
        }
    }
}

/// Body for `POST /entries`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderEntryRequest {
    #[schema(example = "P10")]
    pub patient_id: String,
    pub test_name: TestName,
}

/// Body for `POST /entries/{id}/verify`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyEntryRequest {
    pub result: Verdict,
}

/// List every entry in id order.
#[utoipa::path(
    get,
    path = "/api/v1/entries",
    responses((status = 200, description = "Entries ordered by id", body = [EntryResponse])),
    tags = ["entries"],
    operation_id = "listEntries",
    security([])
)]
#[get("/entries")]
pub async fn list_entries(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<EntryResponse>>> {
    let entries = state.entries_query.list_entries().await?;
    Ok(web::Json(entries.iter().map(EntryResponse::from).collect()))
}

/// Order a test for a patient holding it.
#[utoipa::path(
    post,
    path = "/api/v1/entries",
    request_body = OrderEntryRequest,
    responses(
        (status = 201, description = "Pending entry created", body = EntryResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "No patient holds the test", body = Error),
        (status = 409, description = "Already ordered", body = Error)
    ),
    tags = ["entries"],
    operation_id = "orderEntry"
)]
#[post("/entries")]
pub async fn order_entry(
    state: web::Data<HttpState>,
    session: SessionUser,
    payload: web::Json<OrderEntryRequest>,
) -> ApiResult<HttpResponse> {
    let OrderEntryRequest {
        patient_id,
        test_name,
    } = payload.into_inner();
    let patient_id = parse_patient_id(&patient_id)?;
    let entry = state
        .entries
        .order_entry(session.id(), &patient_id, test_name)
        .await?;
    Ok(HttpResponse::Created().json(EntryResponse::from(&entry)))
}

/// Move a pending entry to processed.
#[utoipa::path(
    post,
    path = "/api/v1/entries/{id}/process",
    params(("id" = i64, Path, description = "Entry identifier")),
    responses(
        (status = 200, description = "Processed entry", body = EntryResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "No such entry", body = Error),
        (status = 409, description = "Entry is not pending", body = Error)
    ),
    tags = ["entries"],
    operation_id = "processEntry"
)]
#[post("/entries/{id}/process")]
pub async fn process_entry(
    state: web::Data<HttpState>,
    session: SessionUser,
    path: web::Path<i64>,
) -> ApiResult<web::Json<EntryResponse>> {
    let entry = state
        .entries
        .process_entry(session.id(), EntryId::new(path.into_inner()))
        .await?;
    Ok(web::Json(EntryResponse::from(&entry)))
}

/// Record a verdict on a processed entry.
#[utoipa::path(
    post,
    path = "/api/v1/entries/{id}/verify",
    params(("id" = i64, Path, description = "Entry identifier")),
    request_body = VerifyEntryRequest,
    responses(
        (status = 200, description = "Verified entry", body = EntryResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Technicians cannot verify", body = Error),
        (status = 404, description = "No such entry", body = Error),
        (status = 409, description = "Entry is not processed", body = Error)
    ),
    tags = ["entries"],
    operation_id = "verifyEntry"
)]
#[post("/entries/{id}/verify")]
pub async fn verify_entry(
    state: web::Data<HttpState>,
    session: SessionUser,
    path: web::Path<i64>,
    payload: web::Json<VerifyEntryRequest>,
) -> ApiResult<web::Json<EntryResponse>> {
    let entry = state
        .entries
        .verify_entry(session.id(), EntryId::new(path.into_inner()), payload.result)
        .await?;
    Ok(web::Json(EntryResponse::from(&entry)))
}

#[cfg(test)]
#[path = "entries_tests.rs"]
mod tests;
