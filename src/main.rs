use anyhow::{Error, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;
use wxpush_service::{api::run_api_server, config::Config};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::load()?;

    info!(
        role = ?config.service_role,
        store_bound = config.redis_url.is_some(),
        "Configuration loaded"
    );

    run_api_server(config).await
}
