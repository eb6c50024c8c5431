use anyhow::Context;
use notify_config::load_config;
use notify_gateway::config::GatewayConfig;
use notify_gateway::startup::Application;
use notify_telemetry::tracing::init_tracing;
use tracing::info;

/// Entry point for the notification gateway service.
fn main() -> anyhow::Result<()> {
    let _log_flusher = init_tracing(env!("CARGO_BIN_NAME"))?;

    actix_web::rt::System::new().block_on(async_main())
}

async fn async_main() -> anyhow::Result<()> {
    let config = load_config::<GatewayConfig>().context("loading gateway configuration")?;
    config.validate().context("validating gateway configuration")?;

    info!(
        host = %config.application.host,
        port = config.application.port,
        upstream = %config.upstream.base_url,
        "starting notification gateway"
    );

    let application = Application::build(config).await?;
    application.run_until_stopped().await?;

    Ok(())
}
