//! Handler coverage for user administration.

use super::*;
use actix_web::http::StatusCode;
use actix_web::{App, test};
use rstest::rstest;
use serde_json::{Value, json};

use crate::domain::ports::MockUserAdministration;
use crate::domain::{FailureReason, UserId};
use crate::inbound::http::test_utils::{HttpStateBuilder, bearer, user};
use crate::inbound::http::validation::json_config;

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new().app_data($state).app_data(json_config()).service(
                web::scope("/api/v1")
                    .service(list_users)
                    .service(create_user)
                    .service(delete_user)
                    .service(promote_user),
            ),
        )
        .await
    };
}

fn admin() -> User {
    user("A01", "admin", Role::Admin)
}

#[actix_web::test]
async fn list_returns_user_views() {
    let mut users = MockUserAdministration::new();
    users
        .expect_list_users()
        .withf(|actor| actor.as_ref() == "A01")
        .times(1)
        .returning(|_| Ok(vec![admin(), user("T01", "tech", Role::Technician)]));
    let app = app!(
        HttpStateBuilder::new()
            .authenticated_as(admin())
            .users(users)
            .build()
    );

    let req = test::TestRequest::get()
        .uri("/api/v1/users")
        .insert_header(bearer())
        .to_request();
    let body: Vec<UserResponse> = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body.len(), 2);
    assert_eq!(body[1].id, "T01");
    assert_eq!(body[1].role, Role::Technician);
}

#[actix_web::test]
async fn non_admins_get_forbidden() {
    let mut users = MockUserAdministration::new();
    users.expect_list_users().returning(|_| {
        Err(Error::from_reason(
            FailureReason::PermissionDenied,
            "only admins may manage users",
        ))
    });
    let app = app!(
        HttpStateBuilder::new()
            .authenticated_as(user("T01", "tech", Role::Technician))
            .users(users)
            .build()
    );

    let req = test::TestRequest::get()
        .uri("/api/v1/users")
        .insert_header(bearer())
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn create_returns_201_with_the_new_account() {
    let mut users = MockUserAdministration::new();
    users
        .expect_create_user()
        .withf(|_, account| {
            account.name().as_ref() == "dana"
                && account.password() == "secret1"
                && account.role() == Role::Supervisor
        })
        .times(1)
        .returning(|_, _| Ok(user("S21", "dana", Role::Supervisor)));
    let app = app!(
        HttpStateBuilder::new()
            .authenticated_as(admin())
            .users(users)
            .build()
    );

    let req = test::TestRequest::post()
        .uri("/api/v1/users")
        .insert_header(bearer())
        .set_json(json!({"name": "dana", "password": "secret1", "role": "Supervisor"}))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::CREATED);
    let body: UserResponse = test::read_body_json(res).await;
    assert_eq!(body.id, "S21");
}

#[rstest]
#[case(json!({"name": "dana", "password": "123", "role": "Admin"}), "password_too_short")]
#[case(json!({"name": "  ", "password": "secret1", "role": "Admin"}), "empty_name")]
#[case(json!({"name": "dana", "password": "secret1", "role": "Janitor"}), "malformed_body")]
#[actix_web::test]
async fn invalid_accounts_are_rejected(#[case] payload: Value, #[case] code: &'static str) {
    let app = app!(HttpStateBuilder::new().authenticated_as(admin()).build());

    let req = test::TestRequest::post()
        .uri("/api/v1/users")
        .insert_header(bearer())
        .set_json(payload)
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["code"], code);
}

#[actix_web::test]
async fn delete_returns_204() {
    let mut users = MockUserAdministration::new();
    users
        .expect_delete_user()
        .withf(|_, target| target.as_ref() == "T05")
        .times(1)
        .returning(|_, _| Ok(()));
    let app = app!(
        HttpStateBuilder::new()
            .authenticated_as(admin())
            .users(users)
            .build()
    );

    let req = test::TestRequest::delete()
        .uri("/api/v1/users/T05")
        .insert_header(bearer())
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn delete_rejects_malformed_ids() {
    let app = app!(HttpStateBuilder::new().authenticated_as(admin()).build());

    let req = test::TestRequest::delete()
        .uri("/api/v1/users/nobody")
        .insert_header(bearer())
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn promote_keeps_the_identifier() {
    let mut users = MockUserAdministration::new();
    users
        .expect_promote_user()
        .withf(|_, target, role| *target == UserId::new("T05").expect("id") && *role == Role::Admin)
        .times(1)
        .returning(|_, _, _| Ok(user("T05", "sam", Role::Admin)));
    let app = app!(
        HttpStateBuilder::new()
            .authenticated_as(admin())
            .users(users)
            .build()
    );

    let req = test::TestRequest::post()
        .uri("/api/v1/users/T05/role")
        .insert_header(bearer())
        .set_json(json!({"role": "Admin"}))
        .to_request();
    let body: UserResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body.id, "T05");
    assert_eq!(body.role, Role::Admin);
}
