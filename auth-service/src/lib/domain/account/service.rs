use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::OnceCell;

use crate::domain::account::errors::CredentialError;
use crate::domain::account::errors::RepositoryError;
use crate::domain::account::events::AccountCreatedEvent;
use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::Credentials;
use crate::domain::account::models::LoginCredentials;
use crate::domain::account::models::LoginInput;
use crate::domain::account::models::Password;
use crate::domain::account::models::RefreshTokenRecord;
use crate::domain::account::models::RegisterInput;
use crate::domain::account::models::TokenPair;
use crate::domain::account::models::TokenSubject;
use crate::domain::account::ports::AccountRepository;
use crate::domain::account::ports::CredentialHasher;
use crate::domain::account::ports::CredentialServicePort;
use crate::domain::account::ports::EventPublisher;
use crate::domain::account::ports::TokenIssuer;

/// Default bound on a single AccountCreated publish attempt.
pub const DEFAULT_PUBLISH_TIMEOUT: Duration = Duration::from_secs(5);

// Verified against on unknown-email logins so both failure paths cost one hash check.
const UNKNOWN_ACCOUNT_PASSWORD: &str = "unknown-account-placeholder";

/// Domain service implementation for registration and login.
///
/// Concrete implementation of CredentialServicePort with dependency injection.
/// Holds no mutable state of its own; duplicate emails are rejected by the
/// repository's uniqueness guarantee.
pub struct CredentialService<AR, EP, H, T>
where
    AR: AccountRepository,
    EP: EventPublisher,
    H: CredentialHasher,
    T: TokenIssuer,
{
    repository: Arc<AR>,
    event_publisher: Arc<EP>,
    hasher: Arc<H>,
    token_issuer: Arc<T>,
    publish_timeout: Duration,
    unknown_account_hash: OnceCell<String>,
}

impl<AR, EP, H, T> CredentialService<AR, EP, H, T>
where
    AR: AccountRepository,
    EP: EventPublisher,
    H: CredentialHasher,
    T: TokenIssuer,
{
    /// Create a new credential service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Account persistence implementation
    /// * `event_publisher` - Domain event publishing implementation
    /// * `hasher` - Password hashing implementation
    /// * `token_issuer` - Token signing implementation
    pub fn new(
        repository: Arc<AR>,
        event_publisher: Arc<EP>,
        hasher: Arc<H>,
        token_issuer: Arc<T>,
    ) -> Self {
        Self {
            repository,
            event_publisher,
            hasher,
            token_issuer,
            publish_timeout: DEFAULT_PUBLISH_TIMEOUT,
            unknown_account_hash: OnceCell::new(),
        }
    }

    /// Override the bound on each AccountCreated publish attempt.
    pub fn with_publish_timeout(mut self, publish_timeout: Duration) -> Self {
        self.publish_timeout = publish_timeout;
        self
    }

    async fn hash_password(&self, password: Password) -> Result<String, CredentialError> {
        let hasher = Arc::clone(&self.hasher);

        tokio::task::spawn_blocking(move || hasher.hash(password.as_str()))
            .await
            .map_err(|e| CredentialError::Internal(format!("Hashing task failed: {}", e)))?
            .map_err(|e| {
                tracing::error!(error = %e, "Password hashing failed");
                CredentialError::Internal(e.to_string())
            })
    }

    async fn verify_password(
        &self,
        password: String,
        password_hash: String,
    ) -> Result<bool, CredentialError> {
        let hasher = Arc::clone(&self.hasher);

        tokio::task::spawn_blocking(move || hasher.verify(&password, &password_hash))
            .await
            .map_err(|e| CredentialError::Internal(format!("Verification task failed: {}", e)))
    }

    /// Spend one password verification on a login for an unknown email.
    async fn verify_unknown_account(&self, password: String) {
        let placeholder = self
            .unknown_account_hash
            .get_or_try_init(|| async {
                let hasher = Arc::clone(&self.hasher);
                tokio::task::spawn_blocking(move || hasher.hash(UNKNOWN_ACCOUNT_PASSWORD))
                    .await
                    .map_err(|e| e.to_string())
                    .and_then(|hashed| hashed.map_err(|e| e.to_string()))
            })
            .await;

        match placeholder {
            Ok(hash) => {
                let _ = self.verify_password(password, hash.clone()).await;
            }
            Err(e) => tracing::warn!(error = %e, "Failed to prepare placeholder hash"),
        }
    }

    /// Issue a token pair and persist the refresh token before handing it out.
    async fn issue_tokens(
        &self,
        account_id: AccountId,
        email: &str,
    ) -> Result<TokenPair, CredentialError> {
        let tokens = self
            .token_issuer
            .issue_tokens(&account_id.to_string(), email)
            .map_err(|e| {
                tracing::error!(account_id = %account_id, error = %e, "Token generation failed");
                CredentialError::Internal(e.to_string())
            })?;

        let record = RefreshTokenRecord {
            token: tokens.refresh_token.clone(),
            account_id,
            expires_at: tokens.refresh_expires_at,
        };

        self.repository
            .save_refresh_token(&record)
            .await
            .map_err(|e| {
                tracing::error!(
                    account_id = %account_id,
                    error = %e,
                    "Failed to save refresh token"
                );
                CredentialError::Storage(e.to_string())
            })?;

        Ok(tokens)
    }

    /// Hand the event to a detached task; the outcome is only logged.
    fn publish_account_created(&self, event: AccountCreatedEvent) {
        let event_publisher = Arc::clone(&self.event_publisher);
        let publish_timeout = self.publish_timeout;

        tokio::spawn(async move {
            let publish = event_publisher.publish_account_created(&event);
            let outcome = tokio::time::timeout(publish_timeout, publish).await;

            match outcome {
                Ok(Ok(())) => {
                    tracing::debug!(
                        account_id = %event.account_id,
                        "AccountCreated event published"
                    );
                }
                Ok(Err(e)) => {
                    tracing::error!(
                        account_id = %event.account_id,
                        error = %e,
                        "Failed to publish AccountCreated event"
                    );
                }
                Err(_) => {
                    tracing::error!(
                        account_id = %event.account_id,
                        timeout_ms = publish_timeout.as_millis() as u64,
                        "Timed out publishing AccountCreated event"
                    );
                }
            }
        });
    }
}

fn storage_error(error: RepositoryError) -> CredentialError {
    tracing::error!(error = %error, "Account storage failure");
    CredentialError::Storage(error.to_string())
}

#[async_trait]
impl<AR, EP, H, T> CredentialServicePort for CredentialService<AR, EP, H, T>
where
    AR: AccountRepository,
    EP: EventPublisher,
    H: CredentialHasher,
    T: TokenIssuer,
{
    async fn register(&self, input: RegisterInput) -> Result<TokenPair, CredentialError> {
        let credentials = Credentials::try_from(input).map_err(|e| {
            tracing::warn!(error = %e, "Registration rejected");
            CredentialError::from(e)
        })?;

        if self
            .repository
            .email_exists(credentials.email.as_str())
            .await
            .map_err(storage_error)?
        {
            tracing::info!(email = %credentials.email, "Registration for existing email");
            return Err(CredentialError::EmailExists);
        }

        let password_hash = self.hash_password(credentials.password).await?;

        let now = Utc::now();
        let account = Account {
            id: AccountId::new(),
            email: credentials.email,
            password_hash,
            created_at: now,
            updated_at: now,
        };

        // The existence check above races with concurrent registrations;
        // the unique constraint decides the winner here.
        self.repository
            .insert_account(&account)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => {
                    tracing::info!(email = %account.email, "Registration lost insert race");
                    CredentialError::EmailExists
                }
                other => storage_error(other),
            })?;

        let tokens = self
            .issue_tokens(account.id, account.email.as_str())
            .await?;

        self.publish_account_created(AccountCreatedEvent::new(&account));

        tracing::info!(account_id = %account.id, "Account registered");
        Ok(tokens)
    }

    async fn login(&self, input: LoginInput) -> Result<TokenPair, CredentialError> {
        let credentials = LoginCredentials::try_from(input).map_err(|e| {
            tracing::warn!(error = %e, "Login rejected");
            CredentialError::from(e)
        })?;

        let account = match self.repository.find_by_email(&credentials.email).await {
            Ok(account) => account,
            Err(RepositoryError::NotFound) => {
                self.verify_unknown_account(credentials.password).await;
                tracing::info!(email = %credentials.email, "Login failed");
                return Err(CredentialError::InvalidCredentials);
            }
            Err(e) => return Err(storage_error(e)),
        };

        if !self
            .verify_password(credentials.password, account.password_hash.clone())
            .await?
        {
            tracing::info!(email = %credentials.email, "Login failed");
            return Err(CredentialError::InvalidCredentials);
        }

        let tokens = self
            .issue_tokens(account.id, account.email.as_str())
            .await?;

        tracing::info!(account_id = %account.id, "Account logged in");
        Ok(tokens)
    }

    async fn authenticate(&self, token: &str) -> Result<TokenSubject, CredentialError> {
        self.token_issuer.verify_access_token(token).map_err(|e| {
            tracing::debug!(error = %e, "Token rejected");
            CredentialError::InvalidToken
        })
    }
}
