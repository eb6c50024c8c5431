use anyhow::Context;
use notify_config::load_config;
use notify_producer::config::ProducerConfig;
use notify_producer::startup::Application;
use notify_telemetry::tracing::init_tracing;
use tracing::info;

/// Entry point for the notification producer service.
fn main() -> anyhow::Result<()> {
    let _log_flusher = init_tracing(env!("CARGO_BIN_NAME"))?;

    actix_web::rt::System::new().block_on(async_main())
}

async fn async_main() -> anyhow::Result<()> {
    let config =
        load_config::<ProducerConfig>().context("loading producer configuration")?;
    config.validate().context("validating producer configuration")?;

    info!(
        host = %config.application.host,
        port = config.application.port,
        "starting notification producer"
    );

    let application = Application::build(config).await?;
    application.run_until_stopped().await?;

    Ok(())
}
