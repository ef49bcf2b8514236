//! Bot configuration, loaded once at startup from a TOML file.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// User id allowed to run the owner-only commands. Console input is
    /// always owner-privileged.
    pub owner:  Option<u64>,
    pub relay:  RelayConfig,
    pub krdict: KrdictConfig,
    pub papago: PapagoConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Idle-loop cadence; every tick handles console input and drains the
    /// request queue once.
    pub tick_ms:              u64,
    pub max_response_bytes:   usize,
    pub request_timeout_secs: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            tick_ms:              20,
            max_response_bytes:   4 * 1024 * 1024,
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct KrdictConfig {
    pub enable:           bool,
    pub api_key:          String,
    /// Separate key for the Urimalsaem open dictionary endpoint.
    pub opendict_api_key: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PapagoConfig {
    pub enable:        bool,
    pub client_id:     String,
    pub client_secret: String,
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;

        toml::from_str(&text)
            .with_context(|| format!("unable to parse config file {}", path.display()))
    }
}
