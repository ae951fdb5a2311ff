pub mod schema;
pub mod watcher;

pub use schema::{DashConfig, GlobalConfig, GraphConfig, MeasureConfig, NetworkConfig};
pub use watcher::ConfigWatcher;

use dash_core::{DashError, Result};
use std::path::{Path, PathBuf};

/// Load configuration from a TOML file.  Returns `DashConfig::default()` if
/// the file doesn't exist so the dashboard always has sensible defaults.
pub fn load(path: impl AsRef<Path>) -> Result<DashConfig> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::warn!(
            "Config file not found at '{}'; using defaults.",
            path.display()
        );
        return Ok(DashConfig::default());
    }

    let raw = std::fs::read_to_string(path)
        .map_err(|e| DashError::Config(format!("cannot read '{}': {e}", path.display())))?;

    let config: DashConfig =
        toml::from_str(&raw).map_err(|e| DashError::Config(format!("TOML parse error: {e}")))?;
    validate(&config)?;
    Ok(config)
}

pub const MAX_FRAME_RATE: u32 = 1_000;
pub const MAX_SAMPLES: usize = 10_000;
pub const MAX_PRECISION: usize = 64;

/// Reject values the frame loop and graphs cannot work with.
pub fn validate(config: &DashConfig) -> Result<()> {
    if !(1..=MAX_FRAME_RATE).contains(&config.global.frame_rate) {
        return Err(DashError::Config(format!(
            "global.frame_rate must be between 1 and {MAX_FRAME_RATE}"
        )));
    }
    if config.graph.samples > MAX_SAMPLES {
        return Err(DashError::Config(format!(
            "graph.samples must be at most {MAX_SAMPLES}"
        )));
    }
    if !(1..=MAX_PRECISION).contains(&config.graph.precision) {
        return Err(DashError::Config(format!(
            "graph.precision must be between 1 and {MAX_PRECISION}"
        )));
    }
    Ok(())
}

/// Return the default config path, honouring `$XDG_CONFIG_HOME`.
pub fn default_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("hwdash").join("dash.toml")
}
