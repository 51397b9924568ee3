//! Auth API handlers.
//!
//! ```text
//! POST /auth/register {"email":"user@example.com","password":"Password123","role":"admin"}
//! POST /auth/login {"email":"user@example.com","password":"Password123"}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{
    AuthError, Error, LoginCredentials, RegistrationDetails, SessionToken, UserProfile,
    ports::{SessionPersistenceError, UserPersistenceError},
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::map_auth_validation_error;

/// Registration request body for `POST /auth/register`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    /// Login email; must be unique.
    pub email: Option<String>,
    /// Plaintext password, at least six characters.
    pub password: Option<String>,
    /// Requested role, `user` (default) or `admin`.
    pub role: Option<String>,
}

/// Login request body for `POST /auth/login`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct LoginRequest {
    /// Registered login email.
    pub email: Option<String>,
    /// Plaintext password.
    pub password: Option<String>,
}

/// Successful registration or login payload.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AuthResponse {
    /// Bearer token for subsequent `Authorization` headers.
    pub token: String,
    /// Profile of the authenticated user.
    pub user: UserProfile,
}

impl AuthResponse {
    fn new(token: SessionToken, user: UserProfile) -> Self {
        Self {
            token: token.into(),
            user,
        }
    }
}

fn map_auth_error(error: AuthError) -> Error {
    match error {
        AuthError::EmailTaken => Error::conflict("User already exists"),
        AuthError::InvalidCredentials => Error::unauthorized("Invalid credentials"),
        AuthError::Users(UserPersistenceError::Connection { message })
        | AuthError::Sessions(SessionPersistenceError::Connection { message }) => {
            tracing::warn!(%message, "identity storage unavailable");
            Error::service_unavailable("Service temporarily unavailable")
        }
        AuthError::Users(other) => Error::internal(other.to_string()),
        AuthError::Sessions(other) => Error::internal(other.to_string()),
    }
}

/// Register a new user and return their first session token.
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = AuthResponse),
        (status = 400, description = "Invalid payload", body = Error),
        (status = 409, description = "Email already registered", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let details = RegistrationDetails::try_from_parts(
        body.email.as_deref().unwrap_or_default(),
        body.password.as_deref().unwrap_or_default(),
        body.role.as_deref(),
    )
    .map_err(|err| map_auth_validation_error(&err))?;

    let registered = state
        .auth
        .register(&details)
        .await
        .map_err(map_auth_error)?;
    Ok(HttpResponse::Created().json(AuthResponse::new(registered.token, registered.user)))
}

/// Authenticate an existing user and return a fresh session token.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = AuthResponse),
        (status = 400, description = "Missing fields", body = Error),
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
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(
        body.email.as_deref().unwrap_or_default(),
        body.password.as_deref().unwrap_or_default(),
    )
    .map_err(|err| map_auth_validation_error(&err))?;

    let logged_in = state.auth.login(&credentials).await.map_err(map_auth_error)?;
    Ok(HttpResponse::Ok().json(AuthResponse::new(logged_in.token, logged_in.user)))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{App, test, web};
    use chrono::Duration;
    use rstest::rstest;
    use serde_json::{Value, json};

    use super::*;

    fn test_app(
        state: web::Data<HttpState>,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(state)
            .service(web::scope("/auth").service(register).service(login))
    }

    fn in_memory_state() -> web::Data<HttpState> {
        web::Data::new(HttpState::in_memory(Duration::hours(2)))
    }

    #[actix_web::test]
    async fn register_returns_token_and_profile() {
        let app = test::init_service(test_app(in_memory_state())).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/auth/register")
                .set_json(json!({ "email": "user@example.com", "password": "Password123" }))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(res).await;
        assert!(body["token"].as_str().expect("token present").len() > 32);
        assert_eq!(body["user"]["email"], "user@example.com");
        assert_eq!(body["user"]["role"], "user");
        assert!(body["user"].get("passwordHash").is_none());
    }

    #[rstest]
    #[case(json!({ "password": "Password123" }), "email")]
    #[case(json!({ "email": "user@example.com" }), "password")]
    #[case(json!({ "email": "bad-email", "password": "Password123" }), "email")]
    #[case(json!({ "email": "user@example.com", "password": "short" }), "password")]
    #[case(
        json!({ "email": "user@example.com", "password": "Password123", "role": "root" }),
        "role"
    )]
    #[actix_web::test]
    async fn register_rejects_invalid_payloads(#[case] payload: Value, #[case] field: &str) {
        let app = test::init_service(test_app(in_memory_state())).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/auth/register")
                .set_json(payload)
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["details"]["field"], field);
    }

    #[actix_web::test]
    async fn duplicate_registration_conflicts() {
        let app = test::init_service(test_app(in_memory_state())).await;
        let payload = json!({ "email": "user@example.com", "password": "Password123" });

        let first = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/auth/register")
                .set_json(payload.clone())
                .to_request(),
        )
        .await;
        assert_eq!(first.status(), StatusCode::CREATED);

        let second = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/auth/register")
                .set_json(payload)
                .to_request(),
        )
        .await;
        assert_eq!(second.status(), StatusCode::CONFLICT);
        let body: Value = test::read_body_json(second).await;
        assert_eq!(body["message"], "User already exists");
    }

    #[actix_web::test]
    async fn login_round_trips_registered_credentials() {
        let app = test::init_service(test_app(in_memory_state())).await;
        let register_res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/auth/register")
                .set_json(json!({ "email": "user@example.com", "password": "Password123" }))
                .to_request(),
        )
        .await;
        assert!(register_res.status().is_success());

        let login_res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/auth/login")
                .set_json(json!({ "email": "user@example.com", "password": "Password123" }))
                .to_request(),
        )
        .await;
        assert_eq!(login_res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(login_res).await;
        assert_eq!(body["user"]["email"], "user@example.com");
    }

    #[rstest]
    #[case("user@example.com", "WrongPassword")]
    #[case("stranger@example.com", "Password123")]
    #[actix_web::test]
    async fn login_failures_are_unauthorized_with_one_message(
        #[case] email: &str,
        #[case] password: &str,
    ) {
        let app = test::init_service(test_app(in_memory_state())).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/auth/register")
                .set_json(json!({ "email": "user@example.com", "password": "Password123" }))
                .to_request(),
        )
        .await;
        assert!(res.status().is_success());

        let login_res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/auth/login")
                .set_json(json!({ "email": email, "password": password }))
                .to_request(),
        )
        .await;
        assert_eq!(login_res.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(login_res).await;
        assert_eq!(body["message"], "Invalid credentials");
    }

    #[actix_web::test]
    async fn login_with_missing_fields_is_bad_request() {
        let app = test::init_service(test_app(in_memory_state())).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/auth/login")
                .set_json(json!({}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
