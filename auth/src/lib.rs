//! Authentication utilities library
//!
//! Provides reusable credential primitives for microservices:
//! - Password hashing (Argon2id)
//! - JWT signing and verification
//! - Paired access/refresh token issuance
//!
//! Each service defines its own authentication traits and adapts these implementations.
//! This avoids coupling services through shared domain logic while reducing code duplication.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! ```
//!
//! ## Token Pairs
//! ```
//! use auth::TokenMaker;
//!
//! let maker = TokenMaker::new(b"secret_key_at_least_32_bytes_long!");
//! let pair = maker.issue_tokens("user123", "alice@example.com").unwrap();
//!
//! let verified = maker.verify_token(&pair.access_token).unwrap();
//! assert_eq!(verified.subject_id, "user123");
//! assert_eq!(verified.email, "alice@example.com");
//! ```

pub mod jwt;
pub mod password;
pub mod tokens;

// Re-export commonly used items
pub use jwt::Claims;
pub use jwt::Clock;
pub use jwt::FixedClock;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::SystemClock;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use tokens::TokenKind;
pub use tokens::TokenMaker;
pub use tokens::TokenPair;
pub use tokens::VerifiedToken;
pub use tokens::ACCESS_TOKEN_LIFETIME_HOURS;
pub use tokens::REFRESH_TOKEN_LIFETIME_HOURS;
