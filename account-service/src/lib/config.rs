use std::env;

use auth::HashingCost;
use auth::SigningSecret;
use auth::TokenSettings;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

const MIN_SECRET_LENGTH: usize = 32;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub password: PasswordConfig,
    pub cookie: CookieConfig,
    #[serde(default)]
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub access_secret: SigningSecret,
    pub refresh_secret: SigningSecret,
    pub access_ttl_seconds: i64,
    pub refresh_ttl_seconds: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PasswordConfig {
    pub memory_cost_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
    pub max_concurrent_hashes: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CookieConfig {
    pub name: String,
    pub secure: bool,
    pub same_site: SameSitePolicy,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SameSitePolicy {
    Strict,
    Lax,
    None,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CorsConfig {
    pub allowed_origin: Option<String>,
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (JWT__ACCESS_SECRET, SERVER__HTTP_PORT, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    /// 4. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());
        let default_cost = HashingCost::default();

        let configuration = ConfigBuilder::builder()
            .set_default("server.http_port", 8080_i64)?
            .set_default("jwt.access_ttl_seconds", 120_i64)?
            // 7 days
            .set_default("jwt.refresh_ttl_seconds", 7_i64 * 24 * 60 * 60)?
            .set_default("password.memory_cost_kib", i64::from(default_cost.memory_kib))?
            .set_default("password.iterations", i64::from(default_cost.iterations))?
            .set_default("password.parallelism", i64::from(default_cost.parallelism))?
            .set_default("password.max_concurrent_hashes", 4_i64)?
            .set_default("cookie.name", "refreshToken")?
            .set_default("cookie.secure", true)?
            .set_default("cookie.same_site", "strict")?
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: JWT__ACCESS_SECRET=... overrides jwt.access_secret
            .add_source(Environment::default().separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Reject configurations the service must not start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.token_settings()
            .map_err(|e| ConfigError::Message(format!("jwt: {}", e)))?;

        for (name, secret) in [
            ("access_secret", &self.jwt.access_secret),
            ("refresh_secret", &self.jwt.refresh_secret),
        ] {
            if secret.len() < MIN_SECRET_LENGTH {
                tracing::warn!(
                    secret = name,
                    min_length = MIN_SECRET_LENGTH,
                    "Token signing secret is shorter than recommended"
                );
            }
        }

        if self.password.max_concurrent_hashes == 0 {
            return Err(ConfigError::Message(
                "password.max_concurrent_hashes must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Token secrets and lifetimes for the authenticator.
    pub fn token_settings(&self) -> Result<TokenSettings, auth::AuthenticationError> {
        let ttl = |seconds: i64| {
            chrono::Duration::try_seconds(seconds).ok_or(auth::AuthenticationError::InvalidTtl)
        };

        TokenSettings::new(
            self.jwt.access_secret.clone(),
            ttl(self.jwt.access_ttl_seconds)?,
            self.jwt.refresh_secret.clone(),
            ttl(self.jwt.refresh_ttl_seconds)?,
        )
    }

    pub fn hashing_cost(&self) -> HashingCost {
        HashingCost {
            memory_kib: self.password.memory_cost_kib,
            iterations: self.password.iterations,
            parallelism: self.password.parallelism,
        }
    }
}
