use auth::TokenPair;
use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::cookie::CookieJar;
use axum_extra::extract::cookie::SameSite;
use chrono::Utc;

use crate::config::CookieConfig;
use crate::config::SameSitePolicy;

/// Carrier for the refresh token between login and refresh.
///
/// The cookie's Max-Age is derived from the refresh token's own expiry, so
/// the two lifetimes cannot drift apart.
#[derive(Debug, Clone)]
pub struct RefreshCookie {
    name: String,
    secure: bool,
    same_site: SameSite,
}

impl RefreshCookie {
    pub fn new(name: impl Into<String>, secure: bool, same_site: SameSite) -> Self {
        Self {
            name: name.into(),
            secure,
            same_site,
        }
    }

    /// HttpOnly cookie holding the refresh token of `pair`.
    pub fn issue(&self, pair: &TokenPair) -> Cookie<'static> {
        let remaining = (pair.refresh_expires_at - Utc::now()).num_seconds().max(0);

        Cookie::build((self.name.clone(), pair.refresh_token.clone()))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(self.same_site)
            .max_age(time::Duration::seconds(remaining))
            .build()
    }

    /// Refresh token presented by the client, if any.
    pub fn read(&self, jar: &CookieJar) -> Option<String> {
        jar.get(&self.name)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
    }
}

impl From<&CookieConfig> for RefreshCookie {
    fn from(config: &CookieConfig) -> Self {
        let same_site = match config.same_site {
            SameSitePolicy::Strict => SameSite::Strict,
            SameSitePolicy::Lax => SameSite::Lax,
            SameSitePolicy::None => SameSite::None,
        };

        Self::new(config.name.clone(), config.secure, same_site)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn pair() -> TokenPair {
        TokenPair {
            access_token: "access".to_string(),
            refresh_token: "refresh-token-value".to_string(),
            refresh_expires_at: Utc::now() + Duration::days(7),
        }
    }

    #[test]
    fn test_issue_sets_cookie_attributes() {
        let cookie = RefreshCookie::new("refreshToken", true, SameSite::Strict).issue(&pair());

        assert_eq!(cookie.name(), "refreshToken");
        assert_eq!(cookie.value(), "refresh-token-value");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));

        let max_age = cookie.max_age().expect("Max-Age missing").whole_seconds();
        assert!((Duration::days(7).num_seconds() - max_age).abs() <= 1);
    }

    #[test]
    fn test_read_returns_token() {
        let carrier = RefreshCookie::new("refreshToken", true, SameSite::Strict);
        let jar = CookieJar::new().add(carrier.issue(&pair()));

        assert_eq!(carrier.read(&jar), Some("refresh-token-value".to_string()));
    }

    #[test]
    fn test_read_ignores_missing_or_empty_cookie() {
        let carrier = RefreshCookie::new("refreshToken", true, SameSite::Strict);

        assert_eq!(carrier.read(&CookieJar::new()), None);

        let jar = CookieJar::new().add(Cookie::new("refreshToken", ""));
        assert_eq!(carrier.read(&jar), None);
    }

    #[test]
    fn test_from_config() {
        let config = CookieConfig {
            name: "rt".to_string(),
            secure: false,
            same_site: SameSitePolicy::None,
        };

        let cookie = RefreshCookie::from(&config).issue(&pair());
        assert_eq!(cookie.name(), "rt");
        assert_eq!(cookie.secure(), Some(false));
        assert_eq!(cookie.same_site(), Some(SameSite::None));
    }
}
