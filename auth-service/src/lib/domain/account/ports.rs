use async_trait::async_trait;

use crate::domain::account::errors::CredentialError;
use crate::domain::account::errors::CryptoError;
use crate::domain::account::errors::EventPublisherError;
use crate::domain::account::errors::RepositoryError;
use crate::domain::account::events::AccountCreatedEvent;
use crate::domain::account::models::Account;
use crate::domain::account::models::LoginInput;
use crate::domain::account::models::RefreshTokenRecord;
use crate::domain::account::models::RegisterInput;
use crate::domain::account::models::TokenPair;
use crate::domain::account::models::TokenSubject;

/// Port for credential issuance and verification.
#[async_trait]
pub trait CredentialServicePort: Send + Sync + 'static {
    /// Register a new account and issue its first token pair.
    ///
    /// # Arguments
    /// * `input` - Raw email and password
    ///
    /// # Returns
    /// Freshly issued access/refresh tokens
    ///
    /// # Errors
    /// * `Validation` - Malformed email or password too short
    /// * `EmailExists` - Email is already registered
    /// * `Internal` - Hashing or signing failed
    /// * `Storage` - Account or refresh token could not be persisted
    async fn register(&self, input: RegisterInput) -> Result<TokenPair, CredentialError>;

    /// Authenticate an existing account and issue a token pair.
    ///
    /// # Arguments
    /// * `input` - Raw email and password
    ///
    /// # Returns
    /// Freshly issued access/refresh tokens
    ///
    /// # Errors
    /// * `Validation` - Email or password missing
    /// * `InvalidCredentials` - Unknown email or wrong password (indistinguishable)
    /// * `Internal` - Signing failed
    /// * `Storage` - Lookup or refresh token persistence failed
    async fn login(&self, input: LoginInput) -> Result<TokenPair, CredentialError>;

    /// Verify a bearer access token statelessly.
    ///
    /// # Errors
    /// * `InvalidToken` - Bad signature, malformed, expired, or a refresh token
    async fn authenticate(&self, token: &str) -> Result<TokenSubject, CredentialError>;
}

/// Persistence operations for accounts and refresh tokens.
///
/// Email uniqueness must be enforced by the storage engine itself.
#[async_trait]
pub trait AccountRepository: Send + Sync + 'static {
    /// Check whether an account with this email exists.
    ///
    /// # Errors
    /// * `Storage` - Database operation failed
    async fn email_exists(&self, email: &str) -> Result<bool, RepositoryError>;

    /// Persist a new account.
    ///
    /// # Errors
    /// * `Conflict` - Another account already holds this email
    /// * `Storage` - Database operation failed
    async fn insert_account(&self, account: &Account) -> Result<(), RepositoryError>;

    /// Retrieve an account by email address.
    ///
    /// # Errors
    /// * `NotFound` - No account with this email
    /// * `Storage` - Database operation failed
    async fn find_by_email(&self, email: &str) -> Result<Account, RepositoryError>;

    /// Persist an issued refresh token.
    ///
    /// # Errors
    /// * `Storage` - Database operation failed
    async fn save_refresh_token(&self, record: &RefreshTokenRecord)
        -> Result<(), RepositoryError>;
}

/// Event publishing for domain events.
#[async_trait]
pub trait EventPublisher: Send + Sync + 'static {
    /// Publish account creation event. Attempted once.
    ///
    /// # Errors
    /// * `SerializationFailed` - Event serialization failed
    /// * `PublishFailed` - Broker rejected or failed to acknowledge the record
    /// * `Timeout` - Publishing timed out
    /// * `Closed` - Publisher has been shut down
    async fn publish_account_created(
        &self,
        event: &AccountCreatedEvent,
    ) -> Result<(), EventPublisherError>;
}

/// One-way password hashing. CPU bound; callers run it off the async executor.
pub trait CredentialHasher: Send + Sync + 'static {
    /// # Errors
    /// * `HashingFailed` - The hashing primitive failed
    fn hash(&self, password: &str) -> Result<String, CryptoError>;

    /// Never fails; a mismatch or unreadable hash yields `false`.
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Signing and verification of bearer tokens.
pub trait TokenIssuer: Send + Sync + 'static {
    /// # Errors
    /// * `SigningFailed` - Either token could not be signed
    fn issue_tokens(&self, subject_id: &str, email: &str) -> Result<TokenPair, CryptoError>;

    /// Accepts either token class.
    ///
    /// # Errors
    /// * `InvalidToken` - Bad signature, malformed, or expired
    fn verify_token(&self, token: &str) -> Result<TokenSubject, CryptoError>;

    /// Accepts access tokens only; a refresh token never authorizes a request.
    ///
    /// # Errors
    /// * `InvalidToken` - As `verify_token`, or the token is a refresh token
    fn verify_access_token(&self, token: &str) -> Result<TokenSubject, CryptoError>;
}
