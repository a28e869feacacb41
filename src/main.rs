use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use sigil_api::auth::{generate_jwt, Claims};
use sigil_api::config::{config, AppConfig};
use sigil_api::database::{Backend, Stores};
use sigil_api::storage::MediaStorage;
use sigil_api::{app, AppState};

/// Username seeded into the in-memory store so the API is usable out of the box
const DEV_USERNAME: &str = "dev";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("sigil_api=info,tower_http=info")),
        )
        .init();

    let config = config().clone();
    config.validate().context("invalid configuration")?;
    tracing::info!("Starting Sigil API in {:?} mode", config.environment);

    let stores = Stores::open(&config.database, config.is_development())
        .await
        .context("failed to open the sigil store")?;

    if stores.backend == Backend::Memory {
        seed_dev_user(&stores, &config).await?;
    }

    let media = MediaStorage::from_config(&config.storage).context("invalid media storage settings")?;
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(Arc::new(config), stores, media);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Sigil API listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn seed_dev_user(stores: &Stores, config: &AppConfig) -> anyhow::Result<()> {
    let user = match stores.users.find_by_username(DEV_USERNAME).await? {
        Some(user) => user,
        None => stores.users.create(DEV_USERNAME).await?,
    };

    let claims = Claims::for_user(&user, config.security.jwt_expiry_hours);
    let token = generate_jwt(&claims, &config.security.jwt_secret)?;
    tracing::info!("Development user '{}' token: {}", user.username, token);

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
