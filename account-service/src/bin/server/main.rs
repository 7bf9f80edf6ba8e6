use std::sync::Arc;

use account_service::config::Config;
use account_service::domain::account::service::CredentialService;
use account_service::inbound::http::cookie::RefreshCookie;
use account_service::inbound::http::router::create_router;
use account_service::outbound::directory::InMemoryAccountDirectory;
use auth::Authenticator;
use auth::PasswordHasher;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // A missing .env file is normal outside development
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "account_service=debug,auth=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "account-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    if let Ok(path) = dotenv {
        tracing::info!(path = %path.display(), "Environment file loaded");
    }

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        access_ttl_seconds = config.jwt.access_ttl_seconds,
        refresh_ttl_seconds = config.jwt.refresh_ttl_seconds,
        max_concurrent_hashes = config.password.max_concurrent_hashes,
        cors_origin = ?config.cors.allowed_origin,
        "Configuration loaded"
    );

    let authenticator = Arc::new(Authenticator::new(
        config.token_settings()?,
        PasswordHasher::with_cost(config.hashing_cost())?,
    ));
    let directory = Arc::new(InMemoryAccountDirectory::new());
    tracing::warn!(
        directory = "in-memory",
        "Accounts are not persisted across restarts"
    );

    let credential_service = Arc::new(CredentialService::new(
        directory,
        authenticator,
        config.password.max_concurrent_hashes,
    ));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(
        credential_service,
        RefreshCookie::from(&config.cookie),
        &config.cors,
    );

    axum::serve(http_listener, http_application).await?;

    tracing::info!("Server exited successfully");

    Ok(())
}
