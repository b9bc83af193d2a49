use std::sync::Arc;

use anyhow::Context;
use larder_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    larder_observability::init(config.log_format);

    let services = Arc::new(larder_api::app::services::build_services(&config));
    let app = larder_api::app::build_app(services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        data_dir = %config.data_dir.display(),
        negative_stock = ?config.negative_stock,
        "listening"
    );

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
