//! Daemon configuration.
//!
//! Read from `<config_dir>/hopfield/config.json` when present. Every field is
//! optional; missing ones take the defaults below.
//!
//! ```json
//! {
//!   "addr": "127.0.0.1:9877",
//!   "network": { "rows": 5, "cols": 5, "mode": "symmetric", "seed": null },
//!   "run": { "max_steps": 100, "interval_ms": 20 }
//! }
//! ```

use std::path::Path;

use hopfield::driver::RunConfig;
use hopfield::network::NetworkConfig;
use hopfield::protocol::DEFAULT_ADDR;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{DaemonError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    pub addr: String,
    pub network: NetworkConfig,
    pub run: RunConfig,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            network: NetworkConfig::default(),
            run: RunConfig::default(),
        }
    }
}

impl DaemonConfig {
    /// Load `path`, or fall back to defaults when it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No config at {:?}; using defaults", path);
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| DaemonError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|source| DaemonError::ConfigFormat {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(text: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hopfield::weights::LearningMode;

    #[test]
    fn partial_config_keeps_defaults() {
        let cfg = DaemonConfig::parse(r#"{"run":{"max_steps":500,"interval_ms":5}}"#).unwrap();
        assert_eq!(cfg.addr, DEFAULT_ADDR);
        assert_eq!(cfg.run.max_steps, 500);
        assert_eq!(cfg.network.rows, 5);
    }

    #[test]
    fn network_section_parses_mode() {
        let cfg = DaemonConfig::parse(
            r#"{"network":{"rows":3,"cols":4,"mode":"asymmetric","seed":7}}"#,
        )
        .unwrap();
        assert_eq!(cfg.network.mode, LearningMode::Asymmetric);
        assert_eq!(cfg.network.seed, Some(7));
        assert_eq!(cfg.network.unit_count(), 12);
    }

    #[test]
    fn oversized_network_section_fails_validation() {
        let cfg = DaemonConfig::parse(r#"{"network":{"rows":300,"cols":300}}"#).unwrap();
        assert!(cfg.network.validate().is_err());
        assert!(DaemonConfig::default().network.validate().is_ok());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = DaemonConfig::load_or_default(Path::new("/nonexistent/hopfield/config.json"))
            .unwrap();
        assert_eq!(cfg.run, RunConfig::default());
    }
}
