//! Configuration loading.
//!
//! Proxies can be declared either on the command line (endpoint
//! strings parsed by [`endpoint`]) or in a YAML config file (the
//! [`model`] types). An explicitly passed path must exist; otherwise
//! `~/.config/portward/config.yaml` is picked up when present.

pub mod endpoint;
pub mod model;

use std::path::{Path, PathBuf};

use crate::error::PortwardError;
use model::Config;

/// Default config file location, `~/.config/portward/config.yaml`.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("portward").join("config.yaml"))
}

/// Load the config file if one is available.
///
/// Returns `Ok(None)` when no path was given and the default location
/// does not exist. A missing *explicit* path is an error.
pub async fn load(explicit: Option<&Path>) -> Result<Option<Config>, PortwardError> {
    if let Some(path) = explicit {
        return load_file(path).await.map(Some);
    }

    if let Some(path) = default_config_path() {
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::debug!(path = %path.display(), "auto-detected config file");
            return load_file(&path).await.map(Some);
        }
    }

    Ok(None)
}

async fn load_file(path: &Path) -> Result<Config, PortwardError> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            PortwardError::ConfigFileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            PortwardError::Io(e)
        }
    })?;

    let mut config: Config =
        serde_yml::from_str(&content).map_err(|source| PortwardError::ConfigParse {
            path: path.display().to_string(),
            source,
        })?;

    config.apply_defaults();
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::{DEFAULT_DESTINATION_PORT, DEFAULT_LOCAL_PORT};

    #[tokio::test]
    async fn missing_explicit_path_is_an_error() {
        let result = load(Some(Path::new("/nonexistent/portward.yaml"))).await;
        assert!(matches!(
            result,
            Err(PortwardError::ConfigFileNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn loads_and_back_fills_defaults() {
        let dir = std::env::temp_dir().join("portward-config-test");
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join("config.yaml");
        tokio::fs::write(&path, "proxies:\n  - hostname: app.example.com\n")
            .await
            .unwrap();

        let config = load(Some(&path)).await.unwrap().unwrap();
        assert_eq!(config.proxies.len(), 1);
        assert_eq!(config.proxies[0].local_port, DEFAULT_LOCAL_PORT);
        assert_eq!(config.proxies[0].destination_port, DEFAULT_DESTINATION_PORT);

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn rejects_unknown_fields() {
        let dir = std::env::temp_dir().join("portward-config-test");
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join("bad.yaml");
        tokio::fs::write(&path, "proxies: []\nunknown: true\n")
            .await
            .unwrap();

        let result = load(Some(&path)).await;
        assert!(matches!(result, Err(PortwardError::ConfigParse { .. })));

        tokio::fs::remove_file(&path).await.unwrap();
    }
}
