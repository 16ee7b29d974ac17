use serde::Deserialize;
use serde::Serialize;

use crate::domain::account::events::AccountCreatedEvent;

/// Wire body of the account-created notification.
///
/// Consumers expect exactly `{"id": "<uuid>", "email": "<email>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountCreatedMessage {
    pub id: String,
    pub email: String,
}

impl From<&AccountCreatedEvent> for AccountCreatedMessage {
    fn from(event: &AccountCreatedEvent) -> Self {
        Self {
            id: event.account_id.clone(),
            email: event.email.clone(),
        }
    }
}
