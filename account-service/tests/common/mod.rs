use std::sync::Arc;

use account_service::config::CorsConfig;
use account_service::domain::account::service::CredentialService;
use account_service::inbound::http::cookie::RefreshCookie;
use account_service::inbound::http::router::create_router;
use account_service::outbound::directory::InMemoryAccountDirectory;
use auth::Authenticator;
use auth::HashingCost;
use auth::PasswordHasher;
use auth::SigningSecret;
use auth::TokenSettings;
use axum_extra::extract::cookie::SameSite;
use chrono::Duration;

pub const ACCESS_SECRET: &str = "test-access-secret-for-signing-at-least-32-bytes";
pub const REFRESH_SECRET: &str = "test-refresh-secret-for-signing-at-least-32-bytes";

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub directory: InMemoryAccountDirectory,
    pub api_client: reqwest::Client,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let address = format!("http://{}", listener.local_addr().unwrap());

        let settings = TokenSettings::new(
            SigningSecret::from(ACCESS_SECRET),
            Duration::minutes(2),
            SigningSecret::from(REFRESH_SECRET),
            Duration::days(7),
        )
        .expect("Failed to build token settings");

        // Cheap hashing keeps the suite fast
        let hasher = PasswordHasher::with_cost(HashingCost {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .expect("Failed to build password hasher");

        let authenticator = Arc::new(Authenticator::new(settings, hasher));
        let directory = InMemoryAccountDirectory::new();

        let credential_service = Arc::new(CredentialService::new(
            Arc::new(directory.clone()),
            authenticator,
            4,
        ));

        let router = create_router(
            credential_service,
            RefreshCookie::new("refreshToken", true, SameSite::Strict),
            &CorsConfig::default(),
        );

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            directory,
            api_client: reqwest::Client::new(),
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make authenticated GET request
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Register an account through the API
    pub async fn register(&self, name: &str, email: &str, password: &str) -> reqwest::Response {
        self.post("/api/auth/register")
            .json(&serde_json::json!({
                "name": name,
                "email": email,
                "password": password,
                "confPassword": password
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Log in and return (access token, raw Set-Cookie header)
    pub async fn login(&self, email: &str, password: &str) -> (String, String) {
        let response = self
            .post("/api/auth/login")
            .json(&serde_json::json!({
                "email": email,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let set_cookie = response
            .headers()
            .get(reqwest::header::SET_COOKIE)
            .expect("Missing Set-Cookie header")
            .to_str()
            .expect("Set-Cookie is not ASCII")
            .to_string();

        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        let access_token = body["data"]["accessToken"]
            .as_str()
            .expect("Missing access token")
            .to_string();

        (access_token, set_cookie)
    }
}

/// Value of the refresh token cookie in a Set-Cookie header
pub fn refresh_token_from(set_cookie: &str) -> String {
    set_cookie
        .split(';')
        .next()
        .and_then(|pair| pair.trim().strip_prefix("refreshToken="))
        .expect("Set-Cookie does not carry refreshToken")
        .to_string()
}
