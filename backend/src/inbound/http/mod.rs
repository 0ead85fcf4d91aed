//! HTTP inbound adapter exposing the lab workflow as JSON endpoints.

pub mod auth;
pub mod entries;
pub mod error;
pub mod health;
pub mod patients;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;

use actix_web::web;

/// Register every `/api/v1` route on `cfg`.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use labflow::inbound::http::api_routes;
///
/// let app = App::new().service(web::scope("/api/v1").configure(api_routes));
/// ```
pub fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(validation::json_config())
        .app_data(validation::query_config())
        .app_data(validation::path_config())
        .service(auth::login)
        .service(auth::logout)
        .service(users::list_users)
        .service(users::create_user)
        .service(users::delete_user)
        .service(users::promote_user)
        .service(patients::list_patients)
        .service(patients::regenerate_roster)
        .service(entries::list_entries)
        .service(entries::order_entry)
        .service(entries::process_entry)
        .service(entries::verify_entry);
}
