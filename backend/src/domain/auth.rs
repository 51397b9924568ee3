//! Authentication payload validation.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to the auth service.
//! Passwords are held in [`Zeroizing`] buffers so they are wiped when the
//! request finishes.

use std::fmt;

use zeroize::Zeroizing;

use super::user::{EmailAddress, Role, UserValidationError};

/// Minimum accepted password length at registration.
pub const PASSWORD_MIN: usize = 6;

/// Domain error returned when an auth payload is invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthValidationError {
    /// Email was missing or blank once trimmed.
    EmptyEmail,
    /// Email did not look like an address.
    InvalidEmail,
    /// Password was blank.
    EmptyPassword,
    /// Password was shorter than [`PASSWORD_MIN`].
    PasswordTooShort,
    /// Role string was neither `user` nor `admin`.
    InvalidRole,
}

impl fmt::Display for AuthValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail => write!(f, "Invalid email format"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordTooShort => {
                write!(f, "Password must be at least {PASSWORD_MIN} characters")
            }
            Self::InvalidRole => write!(f, "role must be either 'user' or 'admin'"),
        }
    }
}

impl std::error::Error for AuthValidationError {}

impl From<UserValidationError> for AuthValidationError {
    fn from(value: UserValidationError) -> Self {
        match value {
            UserValidationError::EmptyEmail => Self::EmptyEmail,
            UserValidationError::InvalidRole => Self::InvalidRole,
            _ => Self::InvalidEmail,
        }
    }
}

/// Validated login credentials.
///
/// ## Invariants
/// - `email` satisfies [`EmailAddress`] rules.
/// - `password` is non-empty but otherwise untouched, to avoid surprising
///   credential comparisons.
///
/// # Examples
/// ```
/// use sweetshop_backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("user@example.com", "Password123").unwrap();
/// assert_eq!(creds.email().as_ref(), "user@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, AuthValidationError> {
        if email.trim().is_empty() {
            return Err(AuthValidationError::EmptyEmail);
        }
        let email = EmailAddress::new(email)?;
        if password.is_empty() {
            return Err(AuthValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email used for the user lookup.
    pub const fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password exactly as the caller provided it.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated registration payload.
///
/// Applies the password policy on top of the login rules; the role defaults
/// to [`Role::User`] when absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationDetails {
    email: EmailAddress,
    password: Zeroizing<String>,
    role: Role,
}

impl RegistrationDetails {
    /// Construct registration details from raw inputs.
    pub fn try_from_parts(
        email: &str,
        password: &str,
        role: Option<&str>,
    ) -> Result<Self, AuthValidationError> {
        if email.trim().is_empty() {
            return Err(AuthValidationError::EmptyEmail);
        }
        let email = EmailAddress::new(email)?;
        if password.is_empty() {
            return Err(AuthValidationError::EmptyPassword);
        }
        if password.chars().count() < PASSWORD_MIN {
            return Err(AuthValidationError::PasswordTooShort);
        }
        let role = match role {
            None => Role::User,
            Some(raw) => Role::parse(raw)?,
        };
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
            role,
        })
    }

    /// Email to register, unique across users.
    pub const fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Plaintext password to be digested; never stored.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Requested capability level.
    pub const fn role(&self) -> Role {
        self.role
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", AuthValidationError::EmptyEmail)]
    #[case("   ", "pw", AuthValidationError::EmptyEmail)]
    #[case("no-at-sign", "pw", AuthValidationError::InvalidEmail)]
    #[case("user@example.com", "", AuthValidationError::EmptyPassword)]
    fn invalid_login_payloads(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: AuthValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(email, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn login_preserves_password_whitespace() {
        let creds = LoginCredentials::try_from_parts("user@example.com", " spaced pw ")
            .expect("valid credentials");
        assert_eq!(creds.password(), " spaced pw ");
    }

    #[rstest]
    #[case("user@example.com", "12345", AuthValidationError::PasswordTooShort)]
    #[case("user@example.com", "", AuthValidationError::EmptyPassword)]
    #[case("nope", "Password123", AuthValidationError::InvalidEmail)]
    fn invalid_registration_payloads(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: AuthValidationError,
    ) {
        let err = RegistrationDetails::try_from_parts(email, password, None)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    #[case(None, Role::User)]
    #[case(Some("user"), Role::User)]
    #[case(Some("admin"), Role::Admin)]
    fn registration_role_defaults_to_user(#[case] role: Option<&str>, #[case] expected: Role) {
        let details = RegistrationDetails::try_from_parts("user@example.com", "Password123", role)
            .expect("valid registration");
        assert_eq!(details.role(), expected);
    }

    #[rstest]
    fn registration_rejects_unknown_role() {
        let err =
            RegistrationDetails::try_from_parts("user@example.com", "Password123", Some("root"))
                .expect_err("unknown role must fail");
        assert_eq!(err, AuthValidationError::InvalidRole);
    }
}
