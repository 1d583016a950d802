use std::sync::Arc;

use anyhow::Context;

use tillpoint_api::app::{build_app, services::AppServices};
use tillpoint_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ApiConfig::from_env().context("invalid configuration")?;
    tillpoint_observability::init(config.log_format);
    if config.uses_dev_jwt_secret() {
        tracing::warn!("JWT_SECRET not set; using insecure dev default");
    }

    let services = Arc::new(AppServices::from_config(&config));

    if let Some(bootstrap) = &config.bootstrap_superuser {
        services
            .bootstrap_superuser(&bootstrap.email, &bootstrap.password)
            .context("failed to seed bootstrap superuser")?;
    }

    let app = build_app(services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}
