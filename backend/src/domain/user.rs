//! User identity model.
//!
//! Users are created at registration and immutable afterwards; there is no
//! update or delete surface. The password digest never crosses the API
//! boundary: handlers serialize [`UserProfile`] instead of [`User`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Validation errors returned by the user constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// Identifier was empty or not a UUID.
    InvalidId,
    /// Email was blank once trimmed.
    EmptyEmail,
    /// Email did not look like an address (no `@`).
    InvalidEmail,
    /// Role string was neither `user` nor `admin`.
    InvalidRole,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail => write!(f, "Invalid email format"),
            Self::InvalidRole => write!(f, "role must be either 'user' or 'admin'"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from string input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an already-parsed UUID.
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Email address used for login and uniqueness.
///
/// ## Invariants
/// - Trimmed of surrounding whitespace.
/// - Non-empty and contains an `@`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`].
    pub fn new(email: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = email.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if !trimmed.contains('@') {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Capability level attached to a user at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular shopper: browse, create, update, purchase.
    User,
    /// Administrator: additionally restock and delete.
    Admin,
}

impl Role {
    /// Stable string form stored in the database and token claims.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    /// Parse a stored or client-provided role string.
    pub fn parse(value: &str) -> Result<Self, UserValidationError> {
        match value {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            _ => Err(UserValidationError::InvalidRole),
        }
    }

    /// Whether this role carries administrator capabilities.
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque password digest produced by the credential service.
///
/// Deliberately has no `Serialize` implementation so it cannot leak into a
/// response body by accident.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded digest string.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Registered user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    email: EmailAddress,
    password_hash: PasswordHash,
    role: Role,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// Assemble a user from validated components.
    pub const fn new(
        id: UserId,
        email: EmailAddress,
        password_hash: PasswordHash,
        role: Role,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            password_hash,
            role,
            created_at,
            updated_at,
        }
    }

    /// Register a new user; both timestamps start at `now`.
    pub fn register(
        email: EmailAddress,
        password_hash: PasswordHash,
        role: Role,
        now: DateTime<Utc>,
    ) -> Self {
        Self::new(UserId::random(), email, password_hash, role, now, now)
    }

    /// Stable user identifier.
    pub const fn id(&self) -> &UserId {
        &self.id
    }

    /// Login email, unique across users.
    pub const fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Stored password digest.
    pub const fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }

    /// Capability level.
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Registration timestamp.
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last-modified timestamp.
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Client-safe projection without the password digest.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email.clone(),
            role: self.role,
        }
    }
}

/// User projection safe for client responses (no password digest).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Stable user identifier.
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: UserId,
    /// Login email.
    #[schema(value_type = String, example = "user@example.com")]
    pub email: EmailAddress,
    /// Capability level.
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", UserValidationError::EmptyEmail)]
    #[case("   ", UserValidationError::EmptyEmail)]
    #[case("not-an-email", UserValidationError::InvalidEmail)]
    fn email_rejects_invalid_input(#[case] raw: &str, #[case] expected: UserValidationError) {
        let err = EmailAddress::new(raw).expect_err("invalid email must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn email_trims_surrounding_whitespace() {
        let email = EmailAddress::new("  user@example.com  ").expect("valid email");
        assert_eq!(email.as_ref(), "user@example.com");
    }

    #[rstest]
    #[case("user", Role::User)]
    #[case("admin", Role::Admin)]
    fn role_parses_known_values(#[case] raw: &str, #[case] expected: Role) {
        assert_eq!(Role::parse(raw).expect("known role"), expected);
    }

    #[rstest]
    fn role_rejects_unknown_values() {
        let err = Role::parse("superuser").expect_err("unknown role must fail");
        assert_eq!(err, UserValidationError::InvalidRole);
    }

    #[rstest]
    fn user_id_round_trips_through_serde() {
        let id = UserId::random();
        let json = serde_json::to_string(&id).expect("serializable");
        let back: UserId = serde_json::from_str(&json).expect("deserializable");
        assert_eq!(id, back);
    }

    #[rstest]
    fn profile_omits_password_hash() {
        let user = User::register(
            EmailAddress::new("user@example.com").expect("valid email"),
            PasswordHash::new("aa$bb"),
            Role::User,
            Utc::now(),
        );
        let value = serde_json::to_value(user.profile()).expect("serializable profile");
        assert!(value.get("passwordHash").is_none());
        assert_eq!(value["email"], "user@example.com");
        assert_eq!(value["role"], "user");
    }
}
