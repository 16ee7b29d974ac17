//! Binds the `auth` library primitives to the domain's hashing and token ports.

use auth::JwtError;
use auth::PasswordError;
use auth::PasswordHasher;
use auth::TokenMaker;
use auth::VerifiedToken;

use crate::domain::account::errors::CryptoError;
use crate::domain::account::models::TokenPair;
use crate::domain::account::models::TokenSubject;
use crate::domain::account::ports::CredentialHasher;
use crate::domain::account::ports::TokenIssuer;

impl From<PasswordError> for CryptoError {
    fn from(err: PasswordError) -> Self {
        CryptoError::HashingFailed(err.to_string())
    }
}

impl From<JwtError> for CryptoError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::SigningFailed(msg) => CryptoError::SigningFailed(msg),
            JwtError::InvalidToken(msg) => CryptoError::InvalidToken(msg),
        }
    }
}

impl CredentialHasher for PasswordHasher {
    fn hash(&self, password: &str) -> Result<String, CryptoError> {
        PasswordHasher::hash(self, password).map_err(CryptoError::from)
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        PasswordHasher::verify(self, password, hash)
    }
}

impl TokenIssuer for TokenMaker {
    fn issue_tokens(&self, subject_id: &str, email: &str) -> Result<TokenPair, CryptoError> {
        let pair = TokenMaker::issue_tokens(self, subject_id, email)?;

        Ok(TokenPair {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            refresh_expires_at: pair.refresh_expires_at,
        })
    }

    fn verify_token(&self, token: &str) -> Result<TokenSubject, CryptoError> {
        TokenMaker::verify_token(self, token)
            .map(subject)
            .map_err(CryptoError::from)
    }

    fn verify_access_token(&self, token: &str) -> Result<TokenSubject, CryptoError> {
        TokenMaker::verify_access_token(self, token)
            .map(subject)
            .map_err(CryptoError::from)
    }
}

fn subject(verified: VerifiedToken) -> TokenSubject {
    TokenSubject {
        account_id: verified.subject_id,
        email: verified.email,
    }
}
