use anyhow::Context;

use taskflow_infra::Settings;
use taskflow_observability::LogFormat;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading configuration")?;

    taskflow_observability::init(
        &settings.log.filter,
        LogFormat::from_json_flag(settings.log.json),
    );

    let app = taskflow_api::app::build_app(&settings).await?;

    let listener = tokio::net::TcpListener::bind(settings.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.server.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
