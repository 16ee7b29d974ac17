use crate::domain::account::models::Account;

/// Domain event published once an account has been persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountCreatedEvent {
    pub account_id: String,
    pub email: String,
}

impl AccountCreatedEvent {
    pub fn new(account: &Account) -> Self {
        Self {
            account_id: account.id.to_string(),
            email: account.email.as_str().to_string(),
        }
    }
}
