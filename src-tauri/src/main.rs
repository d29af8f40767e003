use tracing_subscriber::EnvFilter;

use video_amplifier::core::AppConfig;
use video_amplifier::desktop_app;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("{:#}, falling back to defaults", e);
            AppConfig::default()
        }
    };

    if let Err(e) = desktop_app::run_desktop_app(config) {
        eprintln!("Failed to start application: {}", e);
    }
}
