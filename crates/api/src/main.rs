use anyhow::Context;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stocklens_observability::init();

    let config = stocklens_infra::AppConfig::from_env().context("failed to load configuration")?;

    let app = stocklens_api::app::build_app(&config)
        .await
        .context("failed to build application")?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
