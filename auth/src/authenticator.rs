use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::password::PasswordError;
use crate::password::PasswordHasher;
use crate::token::SigningSecret;
use crate::token::TokenCodec;
use crate::token::TokenError;

/// Upper bound for either token lifetime.
const MAX_TTL_DAYS: i64 = 3650;

/// Secrets and lifetimes for the two token classes.
///
/// Built once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct TokenSettings {
    access_secret: SigningSecret,
    access_ttl: Duration,
    refresh_secret: SigningSecret,
    refresh_ttl: Duration,
}

impl TokenSettings {
    /// Create token settings.
    ///
    /// # Errors
    /// * `EmptySecret` - Either secret is empty
    /// * `SharedSecret` - Access and refresh secrets are identical
    /// * `InvalidTtl` - Either lifetime is not positive or exceeds ten years
    pub fn new(
        access_secret: SigningSecret,
        access_ttl: Duration,
        refresh_secret: SigningSecret,
        refresh_ttl: Duration,
    ) -> Result<Self, AuthenticationError> {
        if access_secret.is_empty() || refresh_secret.is_empty() {
            return Err(AuthenticationError::EmptySecret);
        }
        if access_secret == refresh_secret {
            return Err(AuthenticationError::SharedSecret);
        }
        let max_ttl = Duration::days(MAX_TTL_DAYS);
        for ttl in [access_ttl, refresh_ttl] {
            if ttl <= Duration::zero() || ttl > max_ttl {
                return Err(AuthenticationError::InvalidTtl);
            }
        }

        Ok(Self {
            access_secret,
            access_ttl,
            refresh_secret,
            refresh_ttl,
        })
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }
}

/// Authentication coordinator combining password verification and token issuance.
///
/// Holds only immutable state, so a single instance can be shared behind an
/// `Arc` by any number of concurrent requests.
#[derive(Debug, Clone)]
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_codec: TokenCodec,
    settings: TokenSettings,
}

/// Access and refresh token issued together at login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Instant the refresh token stops verifying
    pub refresh_expires_at: DateTime<Utc>,
}

/// Authentication operation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("Token error: {0}")]
    TokenError(#[from] TokenError),

    #[error("Token signing secrets must not be empty")]
    EmptySecret,

    #[error("Access and refresh tokens must be signed with distinct secrets")]
    SharedSecret,

    #[error("Token lifetimes must be positive and at most ten years")]
    InvalidTtl,
}

impl Authenticator {
    /// Create a new authenticator.
    pub fn new(settings: TokenSettings, password_hasher: PasswordHasher) -> Self {
        Self {
            password_hasher,
            token_codec: TokenCodec::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &TokenSettings {
        &self.settings
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Check a password against a stored hash.
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> bool {
        self.password_hasher.verify(password, stored_hash)
    }

    /// Verify credentials and issue a token pair for `subject`.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `TokenError` - Token signing failed
    pub fn authenticate(
        &self,
        subject: &str,
        password: &str,
        stored_hash: &str,
    ) -> Result<TokenPair, AuthenticationError> {
        if !self.verify_password(password, stored_hash) {
            return Err(AuthenticationError::InvalidCredentials);
        }

        Ok(self.issue_token_pair(subject)?)
    }

    /// Issue an access token and a refresh token for `subject`.
    ///
    /// Both tokens share one issuance instant.
    pub fn issue_token_pair(&self, subject: &str) -> Result<TokenPair, TokenError> {
        let now = Utc::now();
        let refresh_expires_at = now
            .checked_add_signed(self.settings.refresh_ttl)
            .ok_or_else(|| TokenError::SigningFailed("Refresh expiry out of range".to_string()))?;

        let access_token = self.token_codec.sign_at(
            subject,
            now,
            self.settings.access_ttl,
            &self.settings.access_secret,
        )?;
        let refresh_token = self.token_codec.sign_at(
            subject,
            now,
            self.settings.refresh_ttl,
            &self.settings.refresh_secret,
        )?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            refresh_expires_at,
        })
    }

    /// Issue a fresh access token for `subject`.
    pub fn issue_access_token(&self, subject: &str) -> Result<String, TokenError> {
        self.token_codec
            .sign(subject, self.settings.access_ttl, &self.settings.access_secret)
    }

    /// Verify an access token and return its subject.
    pub fn verify_access_token(&self, token: &str) -> Result<String, TokenError> {
        self.token_codec.verify(token, &self.settings.access_secret)
    }

    /// Verify a refresh token and return its subject.
    pub fn verify_refresh_token(&self, token: &str) -> Result<String, TokenError> {
        self.token_codec.verify(token, &self.settings.refresh_secret)
    }
}
