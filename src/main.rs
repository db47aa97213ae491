use std::process;

use restaurant_api::{serve, state::AppState};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let state = AppState::new();

    if state.config.lazy_init {
        info!("Lazy init enabled, store connects on first request");
    } else if let Err(err) = state.store.initialize().await {
        // Standalone deployment: a store we cannot reach at startup is fatal.
        error!(%err, "Failed to initialize the record store");
        process::exit(1);
    }

    if let Err(err) = serve(state).await {
        error!(%err, "Server error");
        process::exit(1);
    }
}
