use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::errors::TokenError;

/// Payload carried by every access and refresh token.
///
/// Fixed shape: a token whose payload lacks `exp`, or carries it with the
/// wrong type, does not decode. Unknown fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (account identifier)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Claims for `subject` expiring at `expires_at`.
    pub fn new(subject: impl ToString, expires_at: DateTime<Utc>) -> Self {
        Self {
            sub: Some(subject.to_string()),
            exp: expires_at.timestamp(),
        }
    }

    /// Expired once the current time reaches `exp`.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        current_timestamp >= self.exp
    }

    /// Take the subject, rejecting absent or blank values.
    pub fn into_subject(self) -> Result<String, TokenError> {
        match self.sub {
            Some(sub) if !sub.trim().is_empty() => Ok(sub),
            _ => Err(TokenError::MissingSubject),
        }
    }
}
