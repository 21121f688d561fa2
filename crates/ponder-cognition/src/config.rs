//! Engine configuration.
//!
//! All tunable parameters in one place. Loaded from TOML at startup,
//! falls back to defaults if no config file exists.

use crate::background::BackgroundConfig;
use ponder_core::{Error, Result};
use ponder_llm::{BudgetConfig, EndpointConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Working-memory turn window handed to the memory tier (consumed API).
    pub max_working_turns: usize,
    /// Hourly budget and per-tier cost/throttle parameters.
    pub budget: BudgetConfig,
    /// Background loop cadence and thought retention.
    pub background: BackgroundConfig,
    /// Model endpoints, one per tier.
    pub endpoints: EndpointsConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointsConfig {
    pub small: EndpointConfig,
    pub medium: EndpointConfig,
    pub large: EndpointConfig,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        let [small, medium, large] = EndpointConfig::defaults();
        Self {
            small,
            medium,
            large,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            budget: BudgetConfig::default(),
            background: BackgroundConfig::default(),
            endpoints: EndpointsConfig::default(),
            max_working_turns: 20,
        }
    }
}

impl EngineConfig {
    /// Load from a TOML file, or return defaults if the file is absent.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("read {}: {e}", path.display())))?;
        toml::from_str(&raw).map_err(|e| Error::Config(format!("parse {}: {e}", path.display())))
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }
}
