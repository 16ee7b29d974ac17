use std::env;
use std::time::Duration;

use config::builder::DefaultState;
use config::Config as ConfigSource;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub kafka: KafkaConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
    pub request_timeout_secs: u64,
}

#[derive(Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct KafkaConfig {
    pub brokers: String,
    pub topic: String,
    pub routing_key: String,
    pub partitions: i32,
    pub replication_factor: i32,
    pub connect_max_attempts: u32,
    pub connect_retry_delay_secs: u64,
    pub publish_timeout_ms: u64,
}

impl KafkaConfig {
    pub fn connect_retry_delay(&self) -> Duration {
        Duration::from_secs(self.connect_retry_delay_secs)
    }

    pub fn publish_timeout(&self) -> Duration {
        Duration::from_millis(self.publish_timeout_ms)
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__SECRET, KAFKA__BROKERS, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    /// 4. Built-in defaults for everything except the three connection secrets
    ///
    /// # Errors
    /// Fails if `database.url`, `jwt.secret` or `kafka.brokers` is missing or empty.
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let builder = ConfigSource::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: DATABASE__URL=postgres://... overrides database.url
            .add_source(Environment::default().separator("__"));

        Self::from_builder(builder)
    }

    /// Apply built-in defaults to `builder`, deserialize and validate.
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let configuration = builder
            .set_default("database.max_connections", 5)?
            .set_default("server.http_port", 8080)?
            .set_default("server.request_timeout_secs", 10)?
            .set_default("kafka.topic", "user.events")?
            .set_default("kafka.routing_key", "user.signup")?
            .set_default("kafka.partitions", 3)?
            .set_default("kafka.replication_factor", 1)?
            .set_default("kafka.connect_max_attempts", 5)?
            .set_default("kafka.connect_retry_delay_secs", 5)?
            .set_default("kafka.publish_timeout_ms", 5000)?
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("database.url", &self.database.url),
            ("jwt.secret", &self.jwt.secret),
            ("kafka.brokers", &self.kafka.brokers),
        ];

        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Message(format!(
                    "missing required configuration value: {}",
                    key
                )));
            }
        }

        if self.kafka.connect_max_attempts == 0 {
            return Err(ConfigError::Message(
                "kafka.connect_max_attempts must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_required() -> ConfigBuilder<DefaultState> {
        ConfigSource::builder()
            .set_override("database.url", "postgres://localhost/auth")
            .unwrap()
            .set_override("jwt.secret", "test-secret-key-for-jwt-signing-at-least-32-bytes")
            .unwrap()
            .set_override("kafka.brokers", "localhost:9092")
            .unwrap()
    }

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_builder(with_required()).expect("Failed to load config");

        assert_eq!(config.server.http_port, 8080);
        assert_eq!(config.kafka.topic, "user.events");
        assert_eq!(config.kafka.routing_key, "user.signup");
        assert_eq!(config.kafka.connect_max_attempts, 5);
        assert_eq!(config.kafka.connect_retry_delay(), Duration::from_secs(5));
    }

    #[test]
    fn test_missing_secret_is_rejected() {
        let builder = ConfigSource::builder()
            .set_override("database.url", "postgres://localhost/auth")
            .unwrap()
            .set_override("kafka.brokers", "localhost:9092")
            .unwrap();

        assert!(Config::from_builder(builder).is_err());
    }

    #[test]
    fn test_empty_broker_is_rejected() {
        let builder = with_required().set_override("kafka.brokers", "").unwrap();

        let error = Config::from_builder(builder).unwrap_err();
        assert!(error.to_string().contains("kafka.brokers"));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = Config::from_builder(with_required()).unwrap();

        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("test-secret-key"));
    }
}
