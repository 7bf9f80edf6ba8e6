use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::errors::TokenError;
use super::secret::SigningSecret;

/// Signs and verifies compact bearer tokens.
///
/// The codec owns the algorithm (HS256) but no key: the secret is supplied on
/// every call, so one codec serves both access and refresh tokens.
///
/// Only tokens signed with the codec's own algorithm are accepted; a header
/// naming any other algorithm is rejected.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    algorithm: Algorithm,
}

impl TokenCodec {
    /// Create a codec using HMAC with SHA-256.
    pub fn new() -> Self {
        Self {
            algorithm: Algorithm::HS256,
        }
    }

    /// Sign a token for `subject` valid for `ttl` from now.
    ///
    /// # Errors
    /// * `SigningFailed` - Claims could not be serialized or signed
    pub fn sign(
        &self,
        subject: &str,
        ttl: Duration,
        secret: &SigningSecret,
    ) -> Result<String, TokenError> {
        self.sign_at(subject, Utc::now(), ttl, secret)
    }

    /// Sign a token for `subject` expiring at `issued_at + ttl`.
    ///
    /// # Errors
    /// * `SigningFailed` - Expiry is out of range, or signing failed
    pub fn sign_at(
        &self,
        subject: &str,
        issued_at: DateTime<Utc>,
        ttl: Duration,
        secret: &SigningSecret,
    ) -> Result<String, TokenError> {
        let expires_at = issued_at
            .checked_add_signed(ttl)
            .ok_or_else(|| TokenError::SigningFailed("Token expiry out of range".to_string()))?;
        let claims = Claims::new(subject, expires_at);
        let header = Header::new(self.algorithm);

        encode(&header, &claims, &EncodingKey::from_secret(secret.as_bytes()))
            .map_err(|e| TokenError::SigningFailed(e.to_string()))
    }

    /// Verify a token and return its subject.
    ///
    /// The signature is only ever checked as HS256. A header naming any other
    /// algorithm is refused: a known one (HS512, RS256, ...) as
    /// `InvalidSignature`, an unknown one such as `none` as `MalformedToken`.
    ///
    /// # Errors
    /// * `InvalidSignature` - Signature mismatch or foreign known algorithm
    /// * `MalformedToken` - Bad structure, encoding, claim shape, or unknown algorithm
    /// * `Expired` - Current time is at or past `exp`
    /// * `MissingSubject` - Claim has no usable subject
    pub fn verify(&self, token: &str, secret: &SigningSecret) -> Result<String, TokenError> {
        self.verify_at(token, secret, Utc::now())
    }

    /// Verify a token against an explicit current time.
    pub fn verify_at(
        &self,
        token: &str,
        secret: &SigningSecret,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &self.validation(),
        )?
        .claims;

        if claims.is_expired(now.timestamp()) {
            return Err(TokenError::Expired);
        }

        claims.into_subject()
    }

    // Signature and algorithm only; expiry is checked against `now` without leeway.
    fn validation(&self) -> Validation {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();
        validation
    }
}

impl Default for TokenCodec {
    fn default() -> Self {
        Self::new()
    }
}
