//! Bearer-token access layer.
//!
//! Two extractors gate every handler: [`AuthContext`] moves a request from
//! unauthenticated to authenticated (401 on failure), and [`AdminContext`]
//! moves it from authenticated to authorized (403 on failure). Handlers
//! declare the strongest context they need and the domain services stay
//! free of authorization concerns.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use chrono::Utc;
use futures_util::future::LocalBoxFuture;

use crate::domain::ports::SessionPersistenceError;
use crate::domain::{Error, Role, TokenDigest, UserId};

use super::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";

/// Identity and role claims of an authenticated request.
#[derive(Debug, Clone, Copy)]
pub struct AuthContext {
    user_id: UserId,
    role: Role,
}

impl AuthContext {
    /// Authenticated user id.
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Role claim embedded in the session at issue time.
    pub const fn role(&self) -> Role {
        self.role
    }
}

fn bearer_token(header: Option<&str>) -> Result<&str, Error> {
    let raw = header.ok_or_else(|| Error::unauthorized("Authentication required"))?;
    raw.strip_prefix(BEARER_PREFIX)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::unauthorized("Invalid authorization header"))
}

fn map_session_error(error: SessionPersistenceError) -> Error {
    match error {
        SessionPersistenceError::Connection { message } => {
            tracing::warn!(%message, "session store unavailable");
            Error::service_unavailable("Service temporarily unavailable")
        }
        SessionPersistenceError::Query { message } => {
            tracing::error!(%message, "session lookup failed");
            Error::internal(message)
        }
    }
}

async fn authenticate(state: web::Data<HttpState>, header: Option<String>) -> Result<AuthContext, Error> {
    let token = bearer_token(header.as_deref())?;
    let digest = TokenDigest::of(token);
    let session = state
        .sessions
        .find(&digest)
        .await
        .map_err(map_session_error)?
        .ok_or_else(|| Error::unauthorized("Invalid or expired token"))?;
    if session.is_expired(Utc::now()) {
        return Err(Error::unauthorized("Invalid or expired token"));
    }
    Ok(AuthContext {
        user_id: *session.user_id(),
        role: session.role(),
    })
}

impl FromRequest for AuthContext {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let header = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(ToOwned::to_owned);
        Box::pin(async move {
            let state =
                state.ok_or_else(|| Error::internal("http state not configured"))?;
            authenticate(state, header).await
        })
    }
}

/// An authenticated request whose role carries admin capabilities.
///
/// The single reusable capability gate: restock and delete take this
/// context instead of re-checking the role inside each handler.
#[derive(Debug, Clone, Copy)]
pub struct AdminContext(AuthContext);

impl AdminContext {
    /// The underlying authenticated context.
    pub const fn auth(&self) -> &AuthContext {
        &self.0
    }
}

impl FromRequest for AdminContext {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let auth_future = AuthContext::from_request(req, payload);
        Box::pin(async move {
            let auth = auth_future.await?;
            if !auth.role().is_admin() {
                return Err(Error::forbidden("Admin access required"));
            }
            Ok(Self(auth))
        })
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};
    use chrono::Duration;
    use rstest::rstest;

    use super::*;
    use crate::domain::{RegistrationDetails, Session};
    use crate::inbound::http::ApiResult;

    async fn state_with_user(role: &str) -> (web::Data<HttpState>, String) {
        let state = web::Data::new(HttpState::in_memory(Duration::hours(2)));
        let details =
            RegistrationDetails::try_from_parts("gate@example.com", "Password123", Some(role))
                .expect("valid registration");
        let registered = state
            .auth
            .register(&details)
            .await
            .expect("registration succeeds");
        (state, registered.token.as_str().to_owned())
    }

    fn gate_app(
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
            .route(
                "/authed",
                web::get().to(|auth: AuthContext| async move {
                    Ok::<_, Error>(HttpResponse::Ok().body(auth.user_id().to_string()))
                }),
            )
            .route(
                "/admin",
                web::get().to(|_admin: AdminContext| async move {
                    ApiResult::Ok(HttpResponse::Ok().finish())
                }),
            )
    }

    #[actix_web::test]
    async fn missing_header_is_unauthorized() {
        let (state, _) = state_with_user("user").await;
        let app = test::init_service(gate_app(state)).await;
        let res =
            test::call_service(&app, test::TestRequest::get().uri("/authed").to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[case("token-without-scheme")]
    #[case("Basic dXNlcjpwdw==")]
    #[case("Bearer ")]
    #[actix_web::test]
    async fn malformed_header_is_unauthorized(#[case] header: &str) {
        let (state, _) = state_with_user("user").await;
        let app = test::init_service(gate_app(state)).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/authed")
                .insert_header((AUTHORIZATION, header))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn unknown_token_is_unauthorized() {
        let (state, _) = state_with_user("user").await;
        let app = test::init_service(gate_app(state)).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/authed")
                .insert_header((AUTHORIZATION, "Bearer 0123456789abcdef"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn valid_token_authenticates() {
        let (state, token) = state_with_user("user").await;
        let app = test::init_service(gate_app(state)).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/authed")
                .insert_header((AUTHORIZATION, format!("Bearer {token}")))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn expired_session_is_unauthorized() {
        let (state, _) = state_with_user("user").await;
        let expired_at = Utc::now() - Duration::hours(3);
        let session = Session::issue(
            TokenDigest::of("expired-token"),
            UserId::random(),
            Role::User,
            expired_at,
            Duration::hours(2),
        );
        state
            .sessions
            .insert(&session)
            .await
            .expect("session stored");

        let app = test::init_service(gate_app(state)).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/authed")
                .insert_header((AUTHORIZATION, "Bearer expired-token"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn non_admin_is_forbidden_at_the_admin_gate() {
        let (state, token) = state_with_user("user").await;
        let app = test::init_service(gate_app(state)).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/admin")
                .insert_header((AUTHORIZATION, format!("Bearer {token}")))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn admin_passes_the_admin_gate() {
        let (state, token) = state_with_user("admin").await;
        let app = test::init_service(gate_app(state)).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/admin")
                .insert_header((AUTHORIZATION, format!("Bearer {token}")))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
    }
}
