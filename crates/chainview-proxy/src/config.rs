//! Configuration

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

/// Proxy configuration, loaded from `chainview_proxy.json`. A missing or
/// malformed file falls back to the defaults; command-line flags override
/// file values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Address the proxy listens on
    pub listen: SocketAddr,
    /// Timeout for the upstream leg of each forwarded request, in seconds
    pub upstream_timeout_secs: u64,
    /// Extra endpoints to allow beyond the built-in registry
    #[serde(default)]
    pub extra_allowed: Vec<String>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], 3001)),
            upstream_timeout_secs: 30,
            extra_allowed: Vec::new(),
        }
    }
}

impl ProxyConfig {
    /// Default config file name, looked up in the working directory.
    pub const DEFAULT_PATH: &'static str = "chainview_proxy.json";

    /// Loads the config from [`Self::DEFAULT_PATH`].
    pub fn load() -> Self {
        Self::load_from(Self::DEFAULT_PATH)
    }

    /// Loads the config from `path`, falling back to defaults when the file
    /// is missing or unparseable.
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }

    /// Writes the config to `path` as pretty JSON.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), std::io::Error> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }
}
