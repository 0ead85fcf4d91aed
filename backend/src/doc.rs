//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint of the inbound layer together with
//! the request, response and error schemas they reference, plus the bearer
//! token security scheme issued by `POST /api/v1/login`.
//!
//! The generated document is served by Swagger UI in debug builds and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::domain::{
    EntryStatus, Error, ErrorCode, FailureReason, Role, TestName, TestResult, Verdict,
};
use crate::inbound::http::auth::{LoginRequest, LoginResponse};
use crate::inbound::http::entries::{EntryResponse, OrderEntryRequest, VerifyEntryRequest};
use crate::inbound::http::patients::PatientResponse;
use crate::inbound::http::users::{CreateUserRequest, PromoteUserRequest, UserResponse};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Name of the bearer token security scheme.
pub const BEARER_SCHEME: &str = "BearerToken";

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .description(Some("Token issued by POST /api/v1/login."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Labflow API",
        description = "Staff accounts, patient roster and diagnostic entry workflow."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::users::promote_user,
        crate::inbound::http::patients::list_patients,
        crate::inbound::http::patients::regenerate_roster,
        crate::inbound::http::entries::list_entries,
        crate::inbound::http::entries::order_entry,
        crate::inbound::http::entries::process_entry,
        crate::inbound::http::entries::verify_entry,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        FailureReason,
        Role,
        TestName,
        EntryStatus,
        TestResult,
        Verdict,
        LoginRequest,
        LoginResponse,
        UserResponse,
        CreateUserRequest,
        PromoteUserRequest,
        PatientResponse,
        EntryResponse,
        OrderEntryRequest,
        VerifyEntryRequest,
    )),
    tags(
        (name = "auth", description = "Login and logout"),
        (name = "users", description = "Account administration"),
        (name = "patients", description = "Synthetic patient roster"),
        (name = "entries", description = "Diagnostic entry workflow"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
