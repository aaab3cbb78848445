use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment};
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "http://www.atlantaallergy.com/pollen_counts/index/";
/// The site turns away the default reqwest agent; any fixed string will do.
pub const DEFAULT_USER_AGENT: &str = "Custom";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub base_url: String,
    pub user_agent: String,
    pub delay_ms: u64,
    pub timeout_secs: u64,
    pub output_dir: PathBuf,
}

impl Settings {
    /// Defaults, overridden by `POLLEN_*` environment variables.
    pub fn load() -> Result<Self> {
        Self::from_env(Environment::with_prefix("POLLEN"))
    }

    fn from_env(env: Environment) -> Result<Self> {
        Config::builder()
            .set_default("base_url", DEFAULT_BASE_URL)?
            .set_default("user_agent", DEFAULT_USER_AGENT)?
            .set_default("delay_ms", 500)?
            .set_default("timeout_secs", 30)?
            .set_default("output_dir", "data")?
            .add_source(env.try_parsing(true))
            .build()
            .context("building settings")?
            .try_deserialize()
            .context("reading POLLEN_* settings")
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
