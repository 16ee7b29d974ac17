pub mod messages;
pub mod publisher;
pub mod retry;

pub use publisher::KafkaEventPublisher;
pub use retry::RetryPolicy;
