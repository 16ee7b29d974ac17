use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use rdkafka::admin::AdminClient;
use rdkafka::admin::AdminOptions;
use rdkafka::admin::NewTopic;
use rdkafka::admin::TopicReplication;
use rdkafka::client::DefaultClientContext;
use rdkafka::config::ClientConfig;
use rdkafka::error::KafkaError;
use rdkafka::message::Header;
use rdkafka::message::OwnedHeaders;
use rdkafka::producer::FutureProducer;
use rdkafka::producer::FutureRecord;
use rdkafka::producer::Producer;
use rdkafka::types::RDKafkaErrorCode;
use rdkafka::util::Timeout;

use crate::config::KafkaConfig;
use crate::domain::account::errors::EventPublisherError;
use crate::domain::account::events::AccountCreatedEvent;
use crate::domain::account::ports::EventPublisher;
use crate::outbound::events::messages::AccountCreatedMessage;
use crate::outbound::events::retry::RetryPolicy;

const METADATA_TIMEOUT: Duration = Duration::from_secs(5);
const FLUSH_TIMEOUT: Duration = Duration::from_secs(10);

/// Publishes account lifecycle events to the `user.events` topic.
///
/// The broker connection is established once, at construction, under a
/// bounded retry policy. Individual publishes are attempted exactly once.
pub struct KafkaEventPublisher {
    producer: FutureProducer,
    topic: String,
    routing_key: String,
    publish_timeout: Duration,
    closed: AtomicBool,
}

impl KafkaEventPublisher {
    /// Connect to the broker and declare the event topic.
    ///
    /// # Arguments
    /// * `config` - Kafka section of the application configuration
    ///
    /// # Notes:
    /// - `acks=all`: Wait for all in-sync replicas to acknowledge
    /// - `message.send.max.retries=0`: A failed publish is reported, not retried
    /// - `message.timeout.ms`: Bounded by the configured publish timeout
    ///
    /// # Errors
    /// * `ConnectionFailed` - Broker unreachable after every retry, or the
    ///   topic could not be declared
    pub async fn connect(config: &KafkaConfig) -> Result<Self, EventPublisherError> {
        tracing::info!(
            brokers = %config.brokers,
            topic = %config.topic,
            "Initializing Kafka publisher for account events"
        );

        let publish_timeout = config.publish_timeout();

        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("message.timeout.ms", publish_timeout.as_millis().to_string())
            .set("acks", "all")
            .set("message.send.max.retries", "0")
            .set("compression.type", "gzip")
            .create()
            .map_err(|e: KafkaError| EventPublisherError::ConnectionFailed(e.to_string()))?;

        let policy = RetryPolicy::fixed(config.connect_max_attempts, config.connect_retry_delay());
        policy
            .run("kafka_connect", |attempt| {
                tracing::info!(brokers = %config.brokers, attempt, "Connecting to Kafka");
                fetch_broker_metadata(producer.clone())
            })
            .await?;

        declare_topic(config).await?;

        tracing::info!(topic = %config.topic, "Kafka publisher connected successfully");

        Ok(Self {
            producer,
            topic: config.topic.clone(),
            routing_key: config.routing_key.clone(),
            publish_timeout,
            closed: AtomicBool::new(false),
        })
    }

    /// Flush in-flight records and stop accepting new ones. Idempotent.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        let producer = self.producer.clone();
        let flushed =
            tokio::task::spawn_blocking(move || producer.flush(Timeout::After(FLUSH_TIMEOUT)))
                .await;

        match flushed {
            Ok(Ok(())) => tracing::info!("Kafka publisher closed successfully"),
            Ok(Err(e)) => tracing::error!(error = %e, "Failed to flush Kafka publisher"),
            Err(e) => tracing::error!(error = %e, "Kafka flush task failed"),
        }
    }

    async fn publish(&self, key: &str, payload: &str) -> Result<(), EventPublisherError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(EventPublisherError::Closed);
        }

        let headers = OwnedHeaders::new()
            .insert(Header {
                key: "routing_key",
                value: Some(self.routing_key.as_str()),
            })
            .insert(Header {
                key: "content-type",
                value: Some("application/json"),
            });

        let record = FutureRecord::to(&self.topic)
            .key(key)
            .payload(payload)
            .headers(headers);

        tracing::debug!(
            topic = %self.topic,
            routing_key = %self.routing_key,
            key,
            "Publishing event"
        );

        self.producer
            .send(record, Timeout::After(self.publish_timeout))
            .await
            .map(|_| ())
            .map_err(|(err, _)| match err {
                KafkaError::MessageProduction(RDKafkaErrorCode::MessageTimedOut) => {
                    EventPublisherError::Timeout(err.to_string())
                }
                other => EventPublisherError::PublishFailed(other.to_string()),
            })
    }
}

async fn fetch_broker_metadata(producer: FutureProducer) -> Result<(), EventPublisherError> {
    tokio::task::spawn_blocking(move || {
        producer
            .client()
            .fetch_metadata(None, Timeout::After(METADATA_TIMEOUT))
    })
    .await
    .map_err(|e| EventPublisherError::ConnectionFailed(e.to_string()))?
    .map(|_| ())
    .map_err(|e| EventPublisherError::ConnectionFailed(e.to_string()))
}

/// Create the topic if it does not exist yet.
async fn declare_topic(config: &KafkaConfig) -> Result<(), EventPublisherError> {
    let admin: AdminClient<DefaultClientContext> = ClientConfig::new()
        .set("bootstrap.servers", &config.brokers)
        .create()
        .map_err(|e: KafkaError| EventPublisherError::ConnectionFailed(e.to_string()))?;

    let topic = NewTopic::new(
        &config.topic,
        config.partitions,
        TopicReplication::Fixed(config.replication_factor),
    );
    let options = AdminOptions::new().operation_timeout(Some(METADATA_TIMEOUT));

    let results = admin
        .create_topics([&topic], &options)
        .await
        .map_err(|e| EventPublisherError::ConnectionFailed(e.to_string()))?;

    for result in results {
        match result {
            Ok(name) => tracing::info!(topic = %name, "Declared event topic"),
            Err((name, RDKafkaErrorCode::TopicAlreadyExists)) => {
                tracing::debug!(topic = %name, "Event topic already exists")
            }
            Err((name, code)) => {
                return Err(EventPublisherError::ConnectionFailed(format!(
                    "Failed to declare topic {}: {}",
                    name, code
                )));
            }
        }
    }

    Ok(())
}

#[async_trait]
impl EventPublisher for KafkaEventPublisher {
    async fn publish_account_created(
        &self,
        event: &AccountCreatedEvent,
    ) -> Result<(), EventPublisherError> {
        let message = AccountCreatedMessage::from(event);
        let payload = serde_json::to_string(&message)
            .map_err(|e| EventPublisherError::SerializationFailed(e.to_string()))?;

        self.publish(&event.account_id, &payload)
            .await
            .map_err(|e| {
                tracing::error!(
                    account_id = %event.account_id,
                    error = %e,
                    "Failed to publish AccountCreated event"
                );
                e
            })
    }
}
