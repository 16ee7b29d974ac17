use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use auth::PasswordHasher;
use auth::TokenMaker;
use auth_service::config::Config;
use auth_service::domain::account::service::CredentialService;
use auth_service::inbound::http::router::create_router;
use auth_service::outbound::events::KafkaEventPublisher;
use auth_service::outbound::repositories::PostgresAccountRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auth_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "auth-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        kafka_brokers = %config.kafka.brokers,
        kafka_topic = %config.kafka.topic,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    // Exhausting the connect retries is fatal.
    let event_publisher = Arc::new(KafkaEventPublisher::connect(&config.kafka).await?);

    let account_repository = Arc::new(PostgresAccountRepository::new(pg_pool));
    let password_hasher = Arc::new(PasswordHasher::new());
    let token_maker = Arc::new(TokenMaker::new(config.jwt.secret.as_bytes()));

    let credential_service = Arc::new(
        CredentialService::new(
            account_repository,
            Arc::clone(&event_publisher),
            password_hasher,
            token_maker,
        )
        .with_publish_timeout(config.kafka.publish_timeout()),
    );

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(
        credential_service,
        Duration::from_secs(config.server.request_timeout_secs),
    );

    let served = axum::serve(http_listener, http_application)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    event_publisher.close().await;

    match served {
        Ok(()) => tracing::info!("Server exited successfully"),
        Err(e) => {
            tracing::error!(error = %e, "Server error");
            return Err(e.into());
        }
    }

    Ok(())
}

/// Resolve once `signal` fires. A listener that fails to install never
/// resolves, so it cannot stand in for a shutdown request.
async fn interrupt<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        tracing::error!(error = %e, "Failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

async fn shutdown_signal() {
    let ctrl_c = interrupt(tokio::signal::ctrl_c());

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
