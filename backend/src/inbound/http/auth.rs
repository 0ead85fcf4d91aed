//! Login and logout handlers.
//!
//! ```text
//! POST /api/v1/login  {"name":"tech","password":"tech123"}
//! POST /api/v1/logout Authorization: Bearer <token>
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, LoginCredentials, Role};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::map_login_validation_error;

/// Login request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[schema(example = "tech")]
    pub name: String,
    #[schema(example = "tech123")]
    pub password: String,
}

/// Successful login payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Bearer token for subsequent requests.
    pub token: String,
    pub role: Role,
    #[schema(example = "T01")]
    pub user_id: String,
}

/// Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = LoginResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<LoginResponse>> {
    let LoginRequest { name, password } = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(&name, &password)
        .map_err(map_login_validation_error)?;
    let outcome = state.login.login(&credentials).await?;
    Ok(web::Json(LoginResponse {
        token: outcome.token.as_str().to_owned(),
        role: outcome.user.role(),
        user_id: outcome.user.id().to_string(),
    }))
}

/// Revoke the presented token.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses(
        (status = 204, description = "Session ended"),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(
    state: web::Data<HttpState>,
    session: SessionUser,
) -> ApiResult<HttpResponse> {
    state.login.logout(session.token()).await?;
    Ok(HttpResponse::NoContent().finish())
}
