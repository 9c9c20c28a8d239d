//! Serde data structures for the Portward configuration file.
//!
//! The root [`Config`] holds a list of [`ProxyEntry`] values, one per
//! proxied application. Field names follow the YAML config format:
//!
//! ```yaml
//! proxies:
//!   - hostname: app.example.com
//!     localPort: 8080
//!     destinationPort: 443
//!     skipTLS: false
//! ```

use serde::{Deserialize, Serialize};

pub const DEFAULT_LOCAL_PORT: u16 = 8888;
pub const DEFAULT_DESTINATION_PORT: u16 = 443;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub proxies: Vec<ProxyEntry>,
}

impl Config {
    /// Back-fill zero ports with the defaults. A config file may omit
    /// `localPort`/`destinationPort` entirely, which deserializes to 0.
    pub fn apply_defaults(&mut self) {
        for entry in &mut self.proxies {
            if entry.local_port == 0 {
                entry.local_port = DEFAULT_LOCAL_PORT;
            }
            if entry.destination_port == 0 {
                entry.destination_port = DEFAULT_DESTINATION_PORT;
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ProxyEntry {
    pub hostname: String,

    #[serde(default)]
    pub local_port: u16,

    #[serde(default)]
    pub destination_port: u16,

    #[serde(default, rename = "skipTLS")]
    pub skip_tls: bool,
}

impl ProxyEntry {
    /// Full `host:port` address of the target application.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.hostname, self.destination_port)
    }
}
