use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::Deserialize;
use serde::Serialize;

use super::errors::JwtError;

/// JWT token handler for encoding and decoding tokens.
///
/// Generic over the claims type. Uses HS256 (HMAC with SHA-256).
/// Only the signature and structure are checked here; expiry is the caller's
/// concern so that it can be evaluated against an injected clock.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl JwtHandler {
    /// Create a new JWT handler with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
        }
    }

    /// Encode claims into a signed JWT token.
    ///
    /// # Errors
    /// * `SigningFailed` - Token encoding failed
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        self.encode_with_type(claims, "JWT")
    }

    /// Encode claims with an explicit `typ` header.
    ///
    /// The header is covered by the signature, so the type cannot be swapped
    /// without invalidating the token.
    ///
    /// # Errors
    /// * `SigningFailed` - Token encoding failed
    pub fn encode_with_type<T: Serialize>(
        &self,
        claims: &T,
        token_type: &str,
    ) -> Result<String, JwtError> {
        let mut header = Header::new(self.algorithm);
        header.typ = Some(token_type.to_string());

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::SigningFailed(e.to_string()))
    }

    /// Decode a JWT token and verify its signature.
    ///
    /// # Errors
    /// * `InvalidToken` - Signature mismatch, wrong algorithm, or undecodable claims
    pub fn decode<T: for<'de> Deserialize<'de>>(&self, token: &str) -> Result<T, JwtError> {
        self.decode_with_type(token).map(|(_, claims)| claims)
    }

    /// Decode a token, returning its `typ` header alongside the claims.
    ///
    /// # Errors
    /// * `InvalidToken` - Signature mismatch, wrong algorithm, or undecodable claims
    pub fn decode_with_type<T: for<'de> Deserialize<'de>>(
        &self,
        token: &str,
    ) -> Result<(Option<String>, T), JwtError> {
        let mut validation = Validation::new(self.algorithm);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.leeway = 0;

        decode::<T>(token, &self.decoding_key, &validation)
            .map(|token_data| (token_data.header.typ, token_data.claims))
            .map_err(|e| JwtError::InvalidToken(e.to_string()))
    }
}
