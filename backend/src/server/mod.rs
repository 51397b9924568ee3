//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetricsBuilder;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::sweets::{
    create_sweet, delete_sweet, list_stock_movements, list_sweets, purchase_sweet, restock_sweet,
    search_sweets, update_sweet,
};
use crate::inbound::http::users::{login, register};
use crate::middleware::Trace;

use state_builders::build_http_state;

/// Register the API routes on a service config.
///
/// Shared between [`create_server`] and test harnesses so both exercise the
/// identical routing table. `/search` is registered ahead of the `/{id}`
/// routes so it is never captured as an identifier.
pub fn configure_api(config: &mut web::ServiceConfig) {
    config
        .service(web::scope("/auth").service(register).service(login))
        .service(
            web::scope("/sweets")
                .service(search_sweets)
                .service(create_sweet)
                .service(list_sweets)
                .service(update_sweet)
                .service(delete_sweet)
                .service(purchase_sweet)
                .service(restock_sweet)
                .service(list_stock_movements),
        )
        .service(ready)
        .service(live);
}

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .configure(configure_api);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server using the provided health state and
/// configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails, or when
/// metrics registration fails with the `metrics` feature enabled.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let http_state = build_http_state(&config);
    let bind_addr = config.bind_addr();

    #[cfg(feature = "metrics")]
    let prometheus = PrometheusMetricsBuilder::new("sweetshop")
        .endpoint("/metrics")
        .build()
        .map_err(|err| std::io::Error::other(format!("metrics registration failed: {err}")))?;

    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        let app = build_app(server_health_state.clone(), http_state.clone());

        #[cfg(feature = "metrics")]
        let app = app.wrap(prometheus.clone());

        app
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
