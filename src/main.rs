use alma_checkout::api::{self, AppState};
use alma_checkout::config::Config;
use alma_checkout::database::{
    self, PgConfigurationRepository, PgGeoZoneRepository, PgOrderHistoryRepository, PoolConfig,
};
use alma_checkout::payments::providers::AlmaProvider;
use alma_checkout::payments::{AlmaPaymentModule, ModuleOptions};
use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if std::env::var("LOG_FORMAT").is_ok_and(|format| format == "json") {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let config = Config::from_env()?;

    tracing::info!("Starting Alma checkout service");
    tracing::info!("Environment: {}", config.server.environment);
    tracing::info!("Alma mode: {}", config.alma.mode);

    let pool = database::init_pool(
        &config.database.url,
        Some(PoolConfig {
            max_connections: config.database.max_connections,
            ..Default::default()
        }),
    )
    .await
    .context("failed to connect to the storefront database")?;

    let provider_mode = config.alma.mode.to_string();
    let config_store = Arc::new(PgConfigurationRepository::new(pool.clone()));
    let provider = AlmaProvider::new(config.alma.clone())?.with_key_store(config_store.clone());

    let options = ModuleOptions {
        order_status_id: config.checkout.order_status_id,
        redirect_urls: config.checkout.redirect_urls(),
        ..Default::default()
    };

    let module = AlmaPaymentModule::new(
        options,
        Arc::new(provider),
        config_store,
        Arc::new(PgGeoZoneRepository::new(pool.clone())),
        Arc::new(PgOrderHistoryRepository::new(pool.clone())),
    );

    let state = AppState {
        module: Arc::new(module),
        environment: config.server.environment.clone(),
        provider_mode,
        database: Some(pool),
    };

    let app = api::router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("HOST and PORT must form a valid socket address")?;
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
