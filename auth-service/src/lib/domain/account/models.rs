use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::account::errors::ValidationError;

/// Account aggregate entity.
///
/// The password hash never leaves the service; `Debug` redacts it.
#[derive(Clone)]
pub struct Account {
    pub id: AccountId,
    pub email: EmailAddress,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Account unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountId(pub Uuid);

impl AccountId {
    /// Generate a new random account ID.
    ///
    /// # Returns
    /// AccountId with random UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidEmail` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, ValidationError> {
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| ValidationError::InvalidEmail(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Plaintext password that satisfies the length policy.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    pub const MIN_LENGTH: usize = 6;

    /// # Errors
    /// * `PasswordTooShort` - Fewer than 6 characters
    pub fn new(password: String) -> Result<Self, ValidationError> {
        let length = password.chars().count();
        if length < Self::MIN_LENGTH {
            return Err(ValidationError::PasswordTooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            });
        }
        Ok(Self(password))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Raw registration request.
#[derive(Clone)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
}

/// Raw login request.
#[derive(Clone)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

impl RegisterInput {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl LoginInput {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for RegisterInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterInput")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl fmt::Debug for LoginInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginInput")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Validated email/password pair.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: EmailAddress,
    pub password: Password,
}

impl Credentials {
    /// Validate raw email and password.
    ///
    /// # Errors
    /// * `InvalidEmail` - Email is malformed
    /// * `PasswordTooShort` - Password shorter than the minimum length
    pub fn parse(email: String, password: String) -> Result<Self, ValidationError> {
        let email = EmailAddress::new(email)?;
        let password = Password::new(password)?;
        Ok(Self { email, password })
    }
}

impl TryFrom<RegisterInput> for Credentials {
    type Error = ValidationError;

    fn try_from(input: RegisterInput) -> Result<Self, Self::Error> {
        Self::parse(input.email, input.password)
    }
}

/// Login request checked for shape only.
///
/// The registration policy (email syntax, password length) is not applied:
/// anything that does not match a stored account fails as invalid credentials.
#[derive(Clone)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

impl TryFrom<LoginInput> for LoginCredentials {
    type Error = ValidationError;

    fn try_from(input: LoginInput) -> Result<Self, Self::Error> {
        if input.email.trim().is_empty() {
            return Err(ValidationError::MissingField("email"));
        }
        if input.password.is_empty() {
            return Err(ValidationError::MissingField("password"));
        }

        Ok(Self {
            email: input.email,
            password: input.password,
        })
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Access and refresh tokens handed to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub refresh_expires_at: DateTime<Utc>,
}

/// Persisted trace of an issued refresh token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenRecord {
    pub token: String,
    pub account_id: AccountId,
    pub expires_at: DateTime<Utc>,
}

/// Identity carried by a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSubject {
    pub account_id: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(EmailAddress::new("a@x.com".to_string()).is_ok());
        assert!(matches!(
            EmailAddress::new("not-an-email".to_string()),
            Err(ValidationError::InvalidEmail(_))
        ));
        assert!(EmailAddress::new(String::new()).is_err());
    }

    #[test]
    fn test_password_minimum_length() {
        assert!(Password::new("secret".to_string()).is_ok());
        assert_eq!(
            Password::new("abc".to_string()).unwrap_err(),
            ValidationError::PasswordTooShort { min: 6, actual: 3 }
        );
        // Counted in characters, not bytes.
        assert!(Password::new("ééé".to_string()).is_err());
    }

    #[test]
    fn test_debug_output_redacts_secrets() {
        let input = RegisterInput::new("a@x.com", "secret1");
        let account = Account {
            id: AccountId::new(),
            email: EmailAddress::new("a@x.com".to_string()).unwrap(),
            password_hash: "$argon2id$v=19$hash".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let credentials = Credentials::try_from(input.clone()).unwrap();

        assert!(!format!("{:?}", input).contains("secret1"));
        assert!(!format!("{:?}", credentials).contains("secret1"));
        assert!(!format!("{:?}", account).contains("$argon2id"));
    }

    #[test]
    fn test_login_credentials_skip_registration_policy() {
        let credentials = LoginCredentials::try_from(LoginInput::new("nobody", "wrong")).unwrap();
        assert_eq!(credentials.email, "nobody");
        assert_eq!(credentials.password, "wrong");

        assert_eq!(
            LoginCredentials::try_from(LoginInput::new("", "secret1")).unwrap_err(),
            ValidationError::MissingField("email")
        );
        assert_eq!(
            LoginCredentials::try_from(LoginInput::new("a@x.com", "")).unwrap_err(),
            ValidationError::MissingField("password")
        );
    }

    #[test]
    fn test_login_credentials_debug_redacts_password() {
        let credentials = LoginCredentials::try_from(LoginInput::new("a@x.com", "secret1")).unwrap();
        assert!(!format!("{:?}", credentials).contains("secret1"));
    }
}
