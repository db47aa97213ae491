use std::sync::Arc;

use super::{config::Config, store::Store};

pub struct AppState {
    pub config: Config,
    pub store: Store,
}

impl AppState {
    pub fn new() -> Arc<Self> {
        Self::with_config(Config::load())
    }

    pub fn with_config(config: Config) -> Arc<Self> {
        let store = Store::new(&config.store_uri);
        Arc::new(Self { config, store })
    }
}
