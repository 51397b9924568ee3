//! Shared helpers for the integration suites.
//!
//! Every suite drives the real routing table from `server::configure_api`
//! over in-memory stores, so requests exercise the same access layer,
//! handlers, and services production traffic does.

use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{App, test, web};
use chrono::Duration;
use serde_json::{Value, json};

use sweetshop_backend::Trace;
use sweetshop_backend::inbound::http::health::HealthState;
use sweetshop_backend::inbound::http::state::HttpState;
use sweetshop_backend::server::configure_api;

/// Fresh in-memory application state.
pub fn test_state() -> web::Data<HttpState> {
    web::Data::new(HttpState::in_memory(Duration::hours(2)))
}

/// Initialise the full application over the given state.
pub async fn init_app(
    state: web::Data<HttpState>,
) -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error> {
    let health = web::Data::new(HealthState::new());
    health.mark_ready();
    test::init_service(
        App::new()
            .app_data(health)
            .app_data(state)
            .wrap(Trace)
            .configure(configure_api),
    )
    .await
}

/// Register a user and return their bearer token.
pub async fn register_token<S>(app: &S, email: &str, role: Option<&str>) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let mut payload = json!({ "email": email, "password": "Password123" });
    if let Some(role) = role {
        payload["role"] = json!(role);
    }
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/auth/register")
            .set_json(payload)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED, "registration failed");
    let body: Value = test::read_body_json(res).await;
    body["token"].as_str().expect("token present").to_owned()
}

/// Create a sweet and return its id.
pub async fn create_sweet<S>(app: &S, token: &str, body: Value) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/sweets")
            .insert_header(bearer(token))
            .set_json(body)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED, "sweet creation failed");
    let body: Value = test::read_body_json(res).await;
    body["sweet"]["id"].as_str().expect("id present").to_owned()
}

/// `Authorization: Bearer <token>` header pair.
pub fn bearer(token: &str) -> (actix_web::http::header::HeaderName, String) {
    (AUTHORIZATION, format!("Bearer {token}"))
}
