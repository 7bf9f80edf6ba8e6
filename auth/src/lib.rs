//! Authentication utilities library
//!
//! Provides the credential and token core used by the account service:
//! - Password hashing (Argon2id)
//! - Signed bearer tokens (HS256) carrying a subject and an expiry
//! - Authentication coordination over two independently keyed token classes
//!
//! Nothing here performs I/O or holds mutable state; account lookup belongs
//! to the caller.
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
//! ## Tokens
//! ```
//! use auth::{SigningSecret, TokenCodec};
//! use chrono::Duration;
//!
//! let codec = TokenCodec::new();
//! let secret = SigningSecret::from("secret_key_at_least_32_bytes_long!");
//! let token = codec.sign("user123", Duration::minutes(2), &secret).unwrap();
//! assert_eq!(codec.verify(&token, &secret).unwrap(), "user123");
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::{Authenticator, PasswordHasher, SigningSecret, TokenSettings};
//! use chrono::Duration;
//!
//! let settings = TokenSettings::new(
//!     SigningSecret::from("access_secret_at_least_32_bytes_long!"),
//!     Duration::minutes(2),
//!     SigningSecret::from("refresh_secret_at_least_32_bytes_long"),
//!     Duration::days(7),
//! )
//! .unwrap();
//! let auth = Authenticator::new(settings, PasswordHasher::new());
//!
//! // Register: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify and issue a token pair
//! let pair = auth.authenticate("user123", "password123", &hash).unwrap();
//!
//! // Refresh: redeem the refresh token for a new access token
//! let subject = auth.verify_refresh_token(&pair.refresh_token).unwrap();
//! let access_token = auth.issue_access_token(&subject).unwrap();
//! assert_eq!(auth.verify_access_token(&access_token).unwrap(), "user123");
//! ```

pub mod authenticator;
pub mod password;
pub mod token;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use authenticator::TokenPair;
pub use authenticator::TokenSettings;
pub use password::HashingCost;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use token::Claims;
pub use token::SigningSecret;
pub use token::TokenCodec;
pub use token::TokenError;
