use std::sync::Arc;

use anyhow::Result;
use pmoconfig::Config;
use pmomediarenderer::{MediaRenderer, RendererConfigExt, output::NullOutput};
use pmoupnp::events::TracingEventSink;
use tracing::info;
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

/// Installe le subscriber : `RUST_LOG` s'il est défini, sinon le niveau de
/// la configuration.
fn init_logging(config: &Config) {
    let level = config
        .get_log_min_level()
        .unwrap_or_else(|_| "info".to_string());
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_lowercase()));

    let subscriber = Registry::default().with(filter);
    if config.get_log_enable_console().unwrap_or(true) {
        subscriber
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_ansi(true),
            )
            .init();
    } else {
        subscriber.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Répertoire de configuration optionnel en premier argument
    let config_dir = std::env::args().nth(1).unwrap_or_default();
    let config = Config::load_config(&config_dir)?;
    init_logging(&config);

    let options = config.get_renderer_options();
    let udn = config.get_device_udn("mediarenderer", &options.friendly_name)?;
    info!("📡 Renderer '{}' (uuid:{})", options.friendly_name, udn);
    info!("📂 Configuration: {}", config.config_file_path().display());

    let renderer = MediaRenderer::start(
        Arc::new(NullOutput::new()),
        Arc::new(TracingEventSink),
        options,
    )?;

    info!("✅ PMORenderer is ready!");
    info!("Press Ctrl+C to stop...");
    tokio::signal::ctrl_c().await?;

    renderer.shutdown().await;
    Ok(())
}
