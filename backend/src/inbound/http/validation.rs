//! Shared validation helpers for inbound HTTP adapters.

use serde_json::json;

use crate::domain::{
    AuthValidationError, Error, SweetId, SweetValidationError, auth::PASSWORD_MIN,
};

/// Parse a path segment into a [`SweetId`], rejecting non-UUID input with
/// the 400 the surface documents.
pub(crate) fn parse_sweet_id(raw: &str) -> Result<SweetId, Error> {
    SweetId::new(raw).map_err(|_| {
        Error::invalid_request("Invalid sweet ID").with_details(json!({
            "field": "id",
            "value": raw,
            "code": "invalid_id",
        }))
    })
}

/// Map auth payload validation failures onto the error envelope.
pub(crate) fn map_auth_validation_error(err: &AuthValidationError) -> Error {
    let (field, code) = match err {
        AuthValidationError::EmptyEmail => ("email", "missing_email"),
        AuthValidationError::InvalidEmail => ("email", "invalid_email"),
        AuthValidationError::EmptyPassword => ("password", "missing_password"),
        AuthValidationError::PasswordTooShort => ("password", "password_too_short"),
        AuthValidationError::InvalidRole => ("role", "invalid_role"),
    };
    let mut details = json!({ "field": field, "code": code });
    if matches!(err, AuthValidationError::PasswordTooShort) {
        details["min"] = json!(PASSWORD_MIN);
    }
    Error::invalid_request(err.to_string()).with_details(details)
}

/// Map sweet payload validation failures onto the error envelope.
pub(crate) fn map_sweet_validation_error(err: &SweetValidationError) -> Error {
    let (field, code) = match err {
        SweetValidationError::InvalidId => ("id", "invalid_id"),
        SweetValidationError::EmptyName => ("name", "missing_name"),
        SweetValidationError::EmptyCategory => ("category", "missing_category"),
        SweetValidationError::InvalidPrice => ("price", "invalid_price"),
        SweetValidationError::NegativeQuantity => ("quantity", "negative_quantity"),
        SweetValidationError::QuantityNotPositive => ("quantity", "quantity_not_positive"),
    };
    Error::invalid_request(err.to_string())
        .with_details(json!({ "field": field, "code": code }))
}
