// src/main.rs
use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use print_estimator::api;
use print_estimator::catalog::Catalog;
use print_estimator::config::AppConfig;
use print_estimator::estimator::Estimator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_result = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("{}=info", env!("CARGO_CRATE_NAME")))),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(err) = env_result {
        if !matches!(err, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            warn!("Could not load .env: {}", err);
        }
    }

    let app_config = AppConfig::from_env();
    let estimator_config = app_config.engine.estimator_config();
    let catalog = Catalog::load(app_config.catalog.path(), &estimator_config)
        .context("catalog could not be loaded")?;
    if catalog.is_empty() {
        warn!(
            "Catalog {} contains no priceable entries",
            app_config.catalog.path().display()
        );
    }

    info!(
        "🚀 Print estimator v{} starts with {} catalog entries",
        env!("CARGO_PKG_VERSION"),
        catalog.len()
    );
    let estimator = Estimator::new(estimator_config);
    api::start_api_server(app_config.api, estimator, catalog).await?;
    Ok(())
}
