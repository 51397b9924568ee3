//! OpenAPI document assembled from the handler annotations.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Public OpenAPI surface used by Swagger UI and tooling.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::sweets::create_sweet,
        crate::inbound::http::sweets::list_sweets,
        crate::inbound::http::sweets::search_sweets,
        crate::inbound::http::sweets::update_sweet,
        crate::inbound::http::sweets::delete_sweet,
        crate::inbound::http::sweets::purchase_sweet,
        crate::inbound::http::sweets::restock_sweet,
        crate::inbound::http::sweets::list_stock_movements,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        crate::domain::Error,
        crate::domain::ErrorCode,
        crate::domain::Sweet,
        crate::domain::UserProfile,
        crate::domain::Role,
        crate::domain::StockMovement,
        crate::domain::MovementKind,
        crate::inbound::http::users::RegisterRequest,
        crate::inbound::http::users::LoginRequest,
        crate::inbound::http::users::AuthResponse,
        crate::inbound::http::sweets::CreateSweetRequest,
        crate::inbound::http::sweets::UpdateSweetRequest,
        crate::inbound::http::sweets::StockRequest,
        crate::inbound::http::sweets::SweetResponse,
        crate::inbound::http::sweets::ListSweetsResponse,
        crate::inbound::http::sweets::SearchSweetsResponse,
        crate::inbound::http::sweets::MessageResponse,
        crate::inbound::http::sweets::PurchaseResponse,
        crate::inbound::http::sweets::MovementsResponse,
    )),
    modifiers(&SecurityAddon),
    security(("bearer_token" = [])),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "sweets", description = "Catalog CRUD"),
        (name = "inventory", description = "Stock purchase, restock, and audit"),
        (name = "health", description = "Probes"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_token",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use utoipa::OpenApi;

    use super::ApiDoc;

    #[test]
    fn document_serializes_and_covers_the_surface() {
        let doc = ApiDoc::openapi();
        let json = doc.to_json().expect("document serializes");
        for path in [
            "/auth/register",
            "/auth/login",
            "/sweets",
            "/sweets/search",
            "/sweets/{id}",
            "/sweets/{id}/purchase",
            "/sweets/{id}/restock",
            "/sweets/{id}/movements",
            "/health/ready",
            "/health/live",
        ] {
            assert!(json.contains(path), "missing path: {path}");
        }
    }
}
