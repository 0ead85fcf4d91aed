//! Patient roster handlers.
//!
//! ```text
//! GET  /api/v1/patients
//! POST /api/v1/patients/roster?count=10
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Error, Patient, TestName};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::validate_roster_count;

/// Public view of a patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientResponse {
    #[schema(example = "P10")]
    pub id: String,
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    pub test_name: TestName,
}

impl From<&Patient> for PatientResponse {
    fn from(patient: &Patient) -> Self {
        Self {
            id: patient.id().to_string(),
            name: patient.name().to_owned(),
            test_name: patient.test_name(),
        }
    }
}

/// Query string for roster regeneration.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RosterQuery {
    /// Patients to generate, at most 90. Defaults to the configured roster
    /// size.
    #[param(maximum = 90)]
    pub count: Option<usize>,
}

fn to_responses(patients: &[Patient]) -> Vec<PatientResponse> {
    patients.iter().map(PatientResponse::from).collect()
}

/// List the current roster.
#[utoipa::path(
    get,
    path = "/api/v1/patients",
    responses((status = 200, description = "Patients ordered by id", body = [PatientResponse])),
    tags = ["patients"],
    operation_id = "listPatients",
    security([])
)]
#[get("/patients")]
pub async fn list_patients(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<PatientResponse>>> {
    let patients = state.patients.list_patients().await?;
    Ok(web::Json(to_responses(&patients)))
}

/// Replace unreferenced patients with a fresh batch.
///
/// Patients that already have entries survive; the response lists only the
/// newly generated ones.
#[utoipa::path(
    post,
    path = "/api/v1/patients/roster",
    params(RosterQuery),
    responses(
        (status = 200, description = "Generated patients", body = [PatientResponse]),
        (status = 400, description = "Invalid count", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 503, description = "Identifier space exhausted", body = Error)
    ),
    tags = ["patients"],
    operation_id = "regenerateRoster"
)]
#[post("/patients/roster")]
pub async fn regenerate_roster(
    state: web::Data<HttpState>,
    session: SessionUser,
    query: web::Query<RosterQuery>,
) -> ApiResult<web::Json<Vec<PatientResponse>>> {
    let count = validate_roster_count(query.count)?;
    let patients = state.roster.regenerate(session.id(), count).await?;
    Ok(web::Json(to_responses(&patients)))
}
