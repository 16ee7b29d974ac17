use std::sync::Arc;

use chrono::DateTime;
use chrono::Duration;
use chrono::SubsecRound;
use chrono::Utc;

use crate::jwt::Claims;
use crate::jwt::Clock;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::jwt::SystemClock;

/// Lifetime of an access token.
pub const ACCESS_TOKEN_LIFETIME_HOURS: i64 = 24;

/// Lifetime of a refresh token.
pub const REFRESH_TOKEN_LIFETIME_HOURS: i64 = 7 * 24;

/// Access and refresh tokens issued together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub refresh_expires_at: DateTime<Utc>,
}

/// Class of a token, carried in the signed `typ` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn header_type(self) -> &'static str {
        match self {
            TokenKind::Access => "at+jwt",
            TokenKind::Refresh => "rt+jwt",
        }
    }

    fn from_header_type(typ: &str) -> Option<Self> {
        match typ {
            "at+jwt" => Some(TokenKind::Access),
            "rt+jwt" => Some(TokenKind::Refresh),
            _ => None,
        }
    }
}

/// Identity recovered from a token whose signature and expiry checked out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    pub subject_id: String,
    pub email: String,
    pub kind: TokenKind,
}

/// Issues and verifies paired access/refresh tokens.
///
/// Both token classes share one secret and one claims shape; they differ in
/// their expiration and in the `typ` header.
pub struct TokenMaker {
    jwt_handler: JwtHandler,
    clock: Arc<dyn Clock>,
    access_lifetime: Duration,
    refresh_lifetime: Duration,
}

impl TokenMaker {
    /// Create a token maker backed by the system clock.
    ///
    /// # Arguments
    /// * `secret` - Symmetric signing secret
    pub fn new(secret: &[u8]) -> Self {
        Self::with_clock(secret, Arc::new(SystemClock))
    }

    /// Create a token maker reading time from `clock`.
    pub fn with_clock(secret: &[u8], clock: Arc<dyn Clock>) -> Self {
        Self {
            jwt_handler: JwtHandler::new(secret),
            clock,
            access_lifetime: Duration::hours(ACCESS_TOKEN_LIFETIME_HOURS),
            refresh_lifetime: Duration::hours(REFRESH_TOKEN_LIFETIME_HOURS),
        }
    }

    /// Issue an access token and a refresh token for a subject.
    ///
    /// # Arguments
    /// * `subject_id` - Account identifier
    /// * `email` - Account email address
    ///
    /// # Returns
    /// TokenPair whose `refresh_expires_at` equals the refresh token's `exp`
    ///
    /// # Errors
    /// * `SigningFailed` - Either token could not be signed
    pub fn issue_tokens(&self, subject_id: &str, email: &str) -> Result<TokenPair, JwtError> {
        // Whole seconds, so refresh_expires_at matches the encoded exp.
        let now = self.clock.now().trunc_subsecs(0);

        let access_claims = Claims::new(subject_id, email, now, self.access_lifetime);
        let access_token = self
            .jwt_handler
            .encode_with_type(&access_claims, TokenKind::Access.header_type())?;

        let refresh_expires_at = now + self.refresh_lifetime;
        let refresh_claims = Claims::new(subject_id, email, now, self.refresh_lifetime);
        let refresh_token = self
            .jwt_handler
            .encode_with_type(&refresh_claims, TokenKind::Refresh.header_type())?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            refresh_expires_at,
        })
    }

    /// Verify a token's signature and expiry.
    ///
    /// # Arguments
    /// * `token` - Access or refresh token
    ///
    /// # Returns
    /// Subject id and email carried by the token
    ///
    /// # Errors
    /// * `InvalidToken` - Bad signature, malformed token, or expired
    pub fn verify_token(&self, token: &str) -> Result<VerifiedToken, JwtError> {
        let (typ, claims): (Option<String>, Claims) = self.jwt_handler.decode_with_type(token)?;

        let kind = typ
            .as_deref()
            .and_then(TokenKind::from_header_type)
            .ok_or_else(|| JwtError::InvalidToken("unknown token type".to_string()))?;

        if claims.is_expired(self.clock.now().timestamp()) {
            return Err(JwtError::InvalidToken("token expired".to_string()));
        }

        Ok(VerifiedToken {
            subject_id: claims.sub,
            email: claims.email,
            kind,
        })
    }

    /// Verify a token usable for request authorization.
    ///
    /// # Errors
    /// * `InvalidToken` - As `verify_token`, or the token is a refresh token
    pub fn verify_access_token(&self, token: &str) -> Result<VerifiedToken, JwtError> {
        let verified = self.verify_token(token)?;

        if verified.kind != TokenKind::Access {
            return Err(JwtError::InvalidToken("not an access token".to_string()));
        }

        Ok(verified)
    }
}
