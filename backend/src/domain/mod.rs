//! Domain primitives, services, and ports.
//!
//! Purpose: define strongly typed domain entities used by the API and
//! persistence layers, the services orchestrating them, and the ports the
//! adapters implement. Keep types immutable where possible and document
//! invariants and serialisation contracts (serde) in each type's Rustdoc.

pub mod auth;
pub mod auth_service;
pub mod catalog;
pub mod credentials;
pub mod error;
pub mod inventory;
pub mod ledger;
pub mod ports;
pub mod session;
pub mod sweet;
pub mod user;

pub use self::auth::{AuthValidationError, LoginCredentials, RegistrationDetails, PASSWORD_MIN};
pub use self::auth_service::{AuthError, AuthService, AuthenticatedUser};
pub use self::catalog::{CatalogError, CatalogService};
pub use self::error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use self::inventory::{InventoryError, InventoryService};
pub use self::ledger::{MovementKind, StockMovement};
pub use self::session::{Session, SessionToken, TokenDigest};
pub use self::sweet::{
    CategoryName, Price, StockAmount, Sweet, SweetDraft, SweetFilter, SweetId, SweetName,
    SweetUpdate, SweetValidationError,
};
pub use self::user::{
    EmailAddress, PasswordHash, Role, User, UserId, UserProfile, UserValidationError,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use sweetshop_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
