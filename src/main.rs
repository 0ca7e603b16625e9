use anyhow::Result;
use shutdown_manager::config::{LogFormat, LoggingSettings, Settings};
use shutdown_manager::App;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::new()?;
    init_tracing(&settings.logging);

    info!(
        environment = %settings.application.environment,
        "Starting shutdown manager"
    );

    let app = App::new(settings).await?;
    app.run().await?;

    Ok(())
}

/// `RUST_LOG` wins over the configured level when it is set
fn init_tracing(logging: &LoggingSettings) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}
