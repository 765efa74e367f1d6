use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing for a Shelfie process.
///
/// Honors `RUST_LOG`; defaults to debug for our crates and warn elsewhere.
pub fn init_telemetry() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "shelfie=debug,warn".into()))
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;
    Ok(())
}

pub async fn shutdown_telemetry() {
    tracing::debug!("telemetry shutdown");
}
