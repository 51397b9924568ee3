//! Sweets API handlers: catalog CRUD plus the inventory operations.
//!
//! ```text
//! POST   /sweets                  create (auth)
//! GET    /sweets?page&limit       paginated list (auth)
//! GET    /sweets/search           filtered search (auth)
//! PUT    /sweets/{id}             partial update (auth)
//! DELETE /sweets/{id}             delete (admin)
//! POST   /sweets/{id}/purchase    decrement stock (auth)
//! POST   /sweets/{id}/restock     increment stock (admin)
//! GET    /sweets/{id}/movements   audit ledger (admin)
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;
use utoipa::{IntoParams, ToSchema};

use pagination::PageRequest;

use crate::domain::ports::SweetPersistenceError;
use crate::domain::{
    CatalogError, Error, InventoryError, StockMovement, Sweet, SweetDraft, SweetFilter,
    SweetUpdate,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{AdminContext, AuthContext};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{map_sweet_validation_error, parse_sweet_id};

/// Creation request body for `POST /sweets`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateSweetRequest {
    /// Display name; required.
    pub name: Option<String>,
    /// Category label; required.
    pub category: Option<String>,
    /// Unit price; required, non-negative.
    pub price: Option<f64>,
    /// Initial stock; defaults to zero.
    pub quantity: Option<i64>,
}

/// Partial-update request body for `PUT /sweets/{id}`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateSweetRequest {
    /// Replacement name.
    pub name: Option<String>,
    /// Replacement category.
    pub category: Option<String>,
    /// Replacement price, non-negative.
    pub price: Option<f64>,
    /// Replacement stock level, non-negative.
    pub quantity: Option<i64>,
}

/// Stock mutation request body for purchase and restock.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct StockRequest {
    /// Units to move; must be a positive integer.
    pub quantity: Option<i64>,
}

/// Pagination query for `GET /sweets`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// 1-based page number, default 1.
    pub page: Option<i64>,
    /// Page size, default 10, maximum 100.
    pub limit: Option<i64>,
}

/// Filter query for `GET /sweets/search`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Case-insensitive substring match on the name.
    pub name: Option<String>,
    /// Case-insensitive substring match on the category.
    pub category: Option<String>,
    /// Inclusive lower price bound.
    #[serde(rename = "minPrice")]
    pub min_price: Option<f64>,
    /// Inclusive upper price bound.
    #[serde(rename = "maxPrice")]
    pub max_price: Option<f64>,
}

/// Single-sweet response envelope.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SweetResponse {
    /// The affected sweet.
    pub sweet: Sweet,
}

/// Paginated listing envelope for `GET /sweets`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListSweetsResponse {
    /// Sweets on this page, newest first.
    pub sweets: Vec<Sweet>,
    /// Number of pages covering all records.
    pub total_pages: u64,
    /// The requested page.
    pub current_page: u32,
    /// Total number of records.
    pub total: u64,
}

/// Search result envelope for `GET /sweets/search`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SearchSweetsResponse {
    /// Sweets matching every set filter, newest first.
    pub sweets: Vec<Sweet>,
}

/// Confirmation envelope for `DELETE /sweets/{id}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    /// Human-readable confirmation.
    pub message: String,
}

/// Purchase confirmation envelope.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PurchaseResponse {
    /// Human-readable confirmation.
    pub message: String,
    /// The sweet after the decrement.
    pub sweet: Sweet,
}

/// Audit ledger envelope for `GET /sweets/{id}/movements`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MovementsResponse {
    /// Recorded movements, newest first.
    pub movements: Vec<StockMovement>,
}

fn map_catalog_error(error: CatalogError) -> Error {
    match error {
        CatalogError::NotFound => Error::not_found("Sweet not found"),
        CatalogError::Storage(SweetPersistenceError::Connection { message }) => {
            warn!(%message, "catalog store unavailable");
            Error::service_unavailable("Service temporarily unavailable")
        }
        CatalogError::Storage(other) => Error::internal(other.to_string()),
    }
}

fn map_inventory_error(error: InventoryError) -> Error {
    match error {
        InventoryError::InvalidQuantity => Error::invalid_request(error.to_string())
            .with_details(json!({ "field": "quantity", "code": "quantity_not_positive" })),
        InventoryError::NotFound => Error::not_found("Sweet not found"),
        InventoryError::OutOfStock => Error::invalid_request(error.to_string())
            .with_details(json!({ "code": "out_of_stock" })),
        InventoryError::InsufficientStock {
            available,
            requested,
        } => Error::invalid_request(error.to_string()).with_details(json!({
            "code": "insufficient_stock",
            "available": available,
            "requested": requested,
        })),
        InventoryError::Storage(SweetPersistenceError::Connection { message }) => {
            warn!(%message, "catalog store unavailable");
            Error::service_unavailable("Service temporarily unavailable")
        }
        InventoryError::Storage(other) => Error::internal(other.to_string()),
    }
}

/// Create a sweet.
#[utoipa::path(
    post,
    path = "/sweets",
    request_body = CreateSweetRequest,
    responses(
        (status = 201, description = "Sweet created", body = SweetResponse),
        (status = 400, description = "Invalid payload", body = Error),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["sweets"],
    operation_id = "createSweet"
)]
#[post("")]
pub async fn create_sweet(
    _auth: AuthContext,
    state: web::Data<HttpState>,
    payload: web::Json<CreateSweetRequest>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let draft = SweetDraft::try_from_parts(
        body.name.as_deref().unwrap_or_default(),
        body.category.as_deref().unwrap_or_default(),
        body.price,
        body.quantity,
    )
    .map_err(|err| map_sweet_validation_error(&err))?;

    let sweet = state
        .catalog
        .create(draft)
        .await
        .map_err(map_catalog_error)?;
    Ok(HttpResponse::Created().json(SweetResponse { sweet }))
}

/// List sweets, newest first, one page at a time.
#[utoipa::path(
    get,
    path = "/sweets",
    params(ListQuery),
    responses(
        (status = 200, description = "One page of sweets", body = ListSweetsResponse),
        (status = 400, description = "Invalid pagination", body = Error),
        (status = 401, description = "Unauthenticated", body = Error)
    ),
    tags = ["sweets"],
    operation_id = "listSweets"
)]
#[get("")]
pub async fn list_sweets(
    _auth: AuthContext,
    state: web::Data<HttpState>,
    query: web::Query<ListQuery>,
) -> ApiResult<web::Json<ListSweetsResponse>> {
    let request = PageRequest::from_query(query.page, query.limit).map_err(|err| {
        Error::invalid_request(err.to_string())
            .with_details(json!({ "code": "invalid_pagination" }))
    })?;

    let page = state
        .catalog
        .list(request)
        .await
        .map_err(map_catalog_error)?;
    Ok(web::Json(ListSweetsResponse {
        sweets: page.items,
        total_pages: page.total_pages,
        current_page: page.current_page,
        total: page.total,
    }))
}

/// Search sweets by name, category, and price range.
#[utoipa::path(
    get,
    path = "/sweets/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching sweets", body = SearchSweetsResponse),
        (status = 400, description = "Invalid filter", body = Error),
        (status = 401, description = "Unauthenticated", body = Error)
    ),
    tags = ["sweets"],
    operation_id = "searchSweets"
)]
#[get("/search")]
pub async fn search_sweets(
    _auth: AuthContext,
    state: web::Data<HttpState>,
    query: web::Query<SearchQuery>,
) -> ApiResult<web::Json<SearchSweetsResponse>> {
    let inner = query.into_inner();
    let filter = SweetFilter::try_from_parts(
        inner.name,
        inner.category,
        inner.min_price,
        inner.max_price,
    )
    .map_err(|err| map_sweet_validation_error(&err))?;

    let sweets = state
        .catalog
        .search(&filter)
        .await
        .map_err(map_catalog_error)?;
    Ok(web::Json(SearchSweetsResponse { sweets }))
}

/// Partially update a sweet.
#[utoipa::path(
    put,
    path = "/sweets/{id}",
    params(("id" = String, Path, description = "Sweet identifier")),
    request_body = UpdateSweetRequest,
    responses(
        (status = 200, description = "Updated sweet", body = SweetResponse),
        (status = 400, description = "Invalid id or fields", body = Error),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 404, description = "Unknown sweet", body = Error)
    ),
    tags = ["sweets"],
    operation_id = "updateSweet"
)]
#[put("/{id}")]
pub async fn update_sweet(
    _auth: AuthContext,
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UpdateSweetRequest>,
) -> ApiResult<web::Json<SweetResponse>> {
    let id = parse_sweet_id(&path.into_inner())?;
    let body = payload.into_inner();
    let update = SweetUpdate::try_from_parts(
        body.name.as_deref(),
        body.category.as_deref(),
        body.price,
        body.quantity,
    )
    .map_err(|err| map_sweet_validation_error(&err))?;

    let sweet = state
        .catalog
        .update(&id, &update)
        .await
        .map_err(map_catalog_error)?;
    Ok(web::Json(SweetResponse { sweet }))
}

/// Delete a sweet (admin only).
#[utoipa::path(
    delete,
    path = "/sweets/{id}",
    params(("id" = String, Path, description = "Sweet identifier")),
    responses(
        (status = 200, description = "Sweet deleted", body = MessageResponse),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Not an administrator", body = Error),
        (status = 404, description = "Unknown sweet", body = Error)
    ),
    tags = ["sweets"],
    operation_id = "deleteSweet"
)]
#[delete("/{id}")]
pub async fn delete_sweet(
    _admin: AdminContext,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<MessageResponse>> {
    let id = parse_sweet_id(&path.into_inner())?;
    state
        .catalog
        .delete(&id)
        .await
        .map_err(map_catalog_error)?;
    Ok(web::Json(MessageResponse {
        message: "Sweet deleted successfully".to_owned(),
    }))
}

/// Purchase stock: decrement quantity by a positive amount.
#[utoipa::path(
    post,
    path = "/sweets/{id}/purchase",
    params(("id" = String, Path, description = "Sweet identifier")),
    request_body = StockRequest,
    responses(
        (status = 200, description = "Purchase applied", body = PurchaseResponse),
        (status = 400, description = "Invalid quantity or insufficient stock", body = Error),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 404, description = "Unknown sweet", body = Error)
    ),
    tags = ["inventory"],
    operation_id = "purchaseSweet"
)]
#[post("/{id}/purchase")]
pub async fn purchase_sweet(
    _auth: AuthContext,
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<StockRequest>,
) -> ApiResult<web::Json<PurchaseResponse>> {
    let id = parse_sweet_id(&path.into_inner())?;
    let requested = payload.into_inner().quantity.unwrap_or_default();

    let sweet = state
        .inventory
        .purchase(&id, requested)
        .await
        .map_err(map_inventory_error)?;
    Ok(web::Json(PurchaseResponse {
        message: "Purchase successful".to_owned(),
        sweet,
    }))
}

/// Restock: increment quantity by a positive amount (admin only).
#[utoipa::path(
    post,
    path = "/sweets/{id}/restock",
    params(("id" = String, Path, description = "Sweet identifier")),
    request_body = StockRequest,
    responses(
        (status = 200, description = "Restock applied", body = SweetResponse),
        (status = 400, description = "Invalid quantity", body = Error),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Not an administrator", body = Error),
        (status = 404, description = "Unknown sweet", body = Error)
    ),
    tags = ["inventory"],
    operation_id = "restockSweet"
)]
#[post("/{id}/restock")]
pub async fn restock_sweet(
    _admin: AdminContext,
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<StockRequest>,
) -> ApiResult<web::Json<SweetResponse>> {
    let id = parse_sweet_id(&path.into_inner())?;
    let requested = payload.into_inner().quantity.unwrap_or_default();

    let sweet = state
        .inventory
        .restock(&id, requested)
        .await
        .map_err(map_inventory_error)?;
    Ok(web::Json(SweetResponse { sweet }))
}

/// Audit trail of stock movements for a sweet (admin only).
#[utoipa::path(
    get,
    path = "/sweets/{id}/movements",
    params(("id" = String, Path, description = "Sweet identifier")),
    responses(
        (status = 200, description = "Recorded movements", body = MovementsResponse),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Not an administrator", body = Error),
        (status = 404, description = "Unknown sweet", body = Error)
    ),
    tags = ["inventory"],
    operation_id = "listStockMovements"
)]
#[get("/{id}/movements")]
pub async fn list_stock_movements(
    _admin: AdminContext,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<MovementsResponse>> {
    let id = parse_sweet_id(&path.into_inner())?;
    let movements = state
        .inventory
        .movements(&id)
        .await
        .map_err(map_inventory_error)?;
    Ok(web::Json(MovementsResponse { movements }))
}
