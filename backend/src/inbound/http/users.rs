//! User administration handlers.
//!
//! ```text
//! GET    /api/v1/users
//! POST   /api/v1/users            {"name":"dana","password":"secret1","role":"Supervisor"}
//! DELETE /api/v1/users/{id}
//! POST   /api/v1/users/{id}/role  {"role":"Admin"}
//! ```
//!
//! All routes require an admin session; the service enforces the role.

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, NewAccount, Role, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{map_new_account_error, parse_user_id};

/// Public view of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[schema(example = "S21")]
    pub id: String,
    #[schema(example = "dana")]
    pub name: String,
    pub role: Role,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            name: user.name().to_string(),
            role: user.role(),
        }
    }
}

/// Body for `POST /users`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub name: String,
    pub password: String,
    pub role: Role,
}

/// Body for `POST /users/{id}/role`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PromoteUserRequest {
    pub role: Role,
}

/// List every account.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "Users ordered by id", body = [UserResponse]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    session: SessionUser,
) -> ApiResult<web::Json<Vec<UserResponse>>> {
    let users = state.users.list_users(session.id()).await?;
    Ok(web::Json(users.iter().map(UserResponse::from).collect()))
}

/// Create an account with an allocated identifier.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 409, description = "Name taken", body = Error),
        (status = 503, description = "Identifier space exhausted", body = Error)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    session: SessionUser,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<HttpResponse> {
    let CreateUserRequest {
        name,
        password,
        role,
    } = payload.into_inner();
    let account =
        NewAccount::try_from_parts(&name, &password, role).map_err(map_new_account_error)?;
    let user = state.users.create_user(session.id(), account).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(&user)))
}

/// Delete an account. Entries keep their history with the reference cleared.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User identifier")),
    responses(
        (status = 204, description = "Account deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "No such user", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    session: SessionUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let target = parse_user_id(&path)?;
    state.users.delete_user(session.id(), &target).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Change an account's role. The identifier is kept.
#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/role",
    params(("id" = String, Path, description = "User identifier")),
    request_body = PromoteUserRequest,
    responses(
        (status = 200, description = "Updated account", body = UserResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "No such user", body = Error)
    ),
    tags = ["users"],
    operation_id = "promoteUser"
)]
#[post("/users/{id}/role")]
pub async fn promote_user(
    state: web::Data<HttpState>,
    session: SessionUser,
    path: web::Path<String>,
    payload: web::Json<PromoteUserRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let target = parse_user_id(&path)?;
    let user = state
        .users
        .promote_user(session.id(), &target, payload.role)
        .await?;
    Ok(web::Json(UserResponse::from(&user)))
}

#[cfg(test)]
mod tests;
