#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use auth::PasswordHasher;
use auth::TokenMaker;
use auth_service::domain::account::errors::EventPublisherError;
use auth_service::domain::account::errors::RepositoryError;
use auth_service::domain::account::events::AccountCreatedEvent;
use auth_service::domain::account::models::Account;
use auth_service::domain::account::models::RefreshTokenRecord;
use auth_service::domain::account::ports::AccountRepository;
use auth_service::domain::account::ports::EventPublisher;
use auth_service::domain::account::service::CredentialService;
use auth_service::inbound::http::router::create_router;
use tokio::sync::Notify;

pub const TEST_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

pub type TestCredentialService =
    CredentialService<InMemoryAccountRepository, RecordingEventPublisher, PasswordHasher, TokenMaker>;

/// Account store kept in memory. Uniqueness is checked and enforced under
/// one lock, the same guarantee the database constraint gives.
#[derive(Default)]
pub struct InMemoryAccountRepository {
    accounts: Mutex<HashMap<String, Account>>,
    refresh_tokens: Mutex<Vec<RefreshTokenRecord>>,
    // Forces every registration past the pre-check to the insert.
    skip_existence_check: bool,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository whose `email_exists` always answers false.
    pub fn racing() -> Self {
        Self {
            skip_existence_check: true,
            ..Self::default()
        }
    }

    pub fn account_count(&self) -> usize {
        self.accounts.lock().unwrap().len()
    }

    pub fn stored_account(&self, email: &str) -> Option<Account> {
        self.accounts.lock().unwrap().get(email).cloned()
    }

    pub fn refresh_tokens(&self) -> Vec<RefreshTokenRecord> {
        self.refresh_tokens.lock().unwrap().clone()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn email_exists(&self, email: &str) -> Result<bool, RepositoryError> {
        if self.skip_existence_check {
            return Ok(false);
        }
        Ok(self.accounts.lock().unwrap().contains_key(email))
    }

    async fn insert_account(&self, account: &Account) -> Result<(), RepositoryError> {
        let mut accounts = self.accounts.lock().unwrap();
        let email = account.email.as_str().to_string();

        if accounts.contains_key(&email) {
            return Err(RepositoryError::Conflict(email));
        }
        accounts.insert(email, account.clone());
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Account, RepositoryError> {
        self.accounts
            .lock()
            .unwrap()
            .get(email)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn save_refresh_token(
        &self,
        record: &RefreshTokenRecord,
    ) -> Result<(), RepositoryError> {
        self.refresh_tokens.lock().unwrap().push(record.clone());
        Ok(())
    }
}

/// Publisher that records every event it is handed.
#[derive(Default)]
pub struct RecordingEventPublisher {
    events: Mutex<Vec<AccountCreatedEvent>>,
    published: Notify,
}

impl RecordingEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AccountCreatedEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Wait until at least `count` events were recorded.
    pub async fn wait_for(&self, count: usize) -> Vec<AccountCreatedEvent> {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let notified = self.published.notified();
                if self.events.lock().unwrap().len() >= count {
                    return;
                }
                notified.await;
            }
        })
        .await
        .expect("Timed out waiting for published events");

        self.events()
    }
}

#[async_trait]
impl EventPublisher for RecordingEventPublisher {
    async fn publish_account_created(
        &self,
        event: &AccountCreatedEvent,
    ) -> Result<(), EventPublisherError> {
        self.events.lock().unwrap().push(event.clone());
        self.published.notify_waiters();
        Ok(())
    }
}

/// Argon2id with a small work factor so tests stay fast.
pub fn fast_hasher() -> PasswordHasher {
    PasswordHasher::with_params(1024, 1, 1).expect("Failed to build test hasher")
}

pub fn token_maker() -> TokenMaker {
    TokenMaker::new(TEST_SECRET)
}

pub struct TestServices {
    pub service: Arc<TestCredentialService>,
    pub repository: Arc<InMemoryAccountRepository>,
    pub publisher: Arc<RecordingEventPublisher>,
}

impl TestServices {
    pub fn new() -> Self {
        Self::with_repository(InMemoryAccountRepository::new())
    }

    pub fn with_repository(repository: InMemoryAccountRepository) -> Self {
        let repository = Arc::new(repository);
        let publisher = Arc::new(RecordingEventPublisher::new());

        let service = Arc::new(CredentialService::new(
            Arc::clone(&repository),
            Arc::clone(&publisher),
            Arc::new(fast_hasher()),
            Arc::new(token_maker()),
        ));

        Self {
            service,
            repository,
            publisher,
        }
    }
}

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub services: TestServices,
    pub api_client: reqwest::Client,
    pub token_maker: TokenMaker,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        let services = TestServices::new();

        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let router = create_router(Arc::clone(&services.service), Duration::from_secs(10));

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            services,
            api_client: reqwest::Client::builder()
                .build()
                .expect("Failed to create reqwest client"),
            token_maker: token_maker(),
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }
}
