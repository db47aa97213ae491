use std::{env, fmt::Display, str::FromStr};

use rand::{distributions::Alphanumeric, Rng};
use tracing::{info, warn};

pub struct Config {
    pub port: u16,
    /// `mongodb://`/`mongodb+srv://` for the real backend, `memory://` for
    /// the in-process one.
    pub store_uri: String,
    pub secret_key: String,
    /// When set, the store connects on first request instead of at startup
    /// (on-demand deployments that cannot exit the host process).
    pub lazy_init: bool,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("PORT", "8000"),
            store_uri: var("MONGODB_URI").unwrap_or_else(|_| {
                warn!("MONGODB_URI not set, using the in-process store; data will not persist");
                "memory://".to_string()
            }),
            secret_key: var("SECRETKEY").unwrap_or_else(|_| {
                warn!("SECRETKEY not set, generated a per-process secret; tokens will not outlive this process");
                rand::thread_rng()
                    .sample_iter(&Alphanumeric)
                    .take(48)
                    .map(char::from)
                    .collect()
            }),
            lazy_init: try_load("LAZY_INIT", "false"),
        }
    }
}

fn var(key: &str) -> Result<String, env::VarError> {
    env::var(key)
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}
