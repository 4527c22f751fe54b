use review_common::DEFAULT_PAGE_SIZE;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::{error, info};

use crate::error::ClientError;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub page_size: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3001/api".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Deserialize, Default, Debug)]
struct PartialClientConfig {
    api_base_url: Option<String>,
    page_size: Option<u64>,
}

impl PartialClientConfig {
    fn from_file(config_path: &Path) -> Result<Self, ClientError> {
        let config_str = fs::read_to_string(config_path).map_err(|e| {
            error!(path = ?config_path, error = %e, "Failed to read client config file.");
            ClientError::Config(format!("Failed to read {config_path:?}: {e}"))
        })?;

        toml::from_str(&config_str).map_err(|e| {
            error!(path = ?config_path, error = %e, "Failed to parse client config file.");
            ClientError::Config(format!("Failed to parse {config_path:?}: {e}"))
        })
    }
}

/// Loads the client config: defaults, then the optional TOML file, then
/// `REVIEW_`-prefixed environment variables.
pub fn load_client_config(config_path: Option<&str>) -> Result<ClientConfig, ClientError> {
    let file_config = match config_path {
        Some(path) => PartialClientConfig::from_file(Path::new(path))?,
        None => PartialClientConfig::default(),
    };

    let env_config: PartialClientConfig = envy::prefixed("REVIEW_")
        .from_env()
        .map_err(|e| ClientError::Config(format!("Failed to load config from environment: {e}")))?;

    let config = merge(env_config, file_config)?;
    info!(config = ?config, "Loaded client config.");
    Ok(config)
}

fn merge(
    env_config: PartialClientConfig,
    file_config: PartialClientConfig,
) -> Result<ClientConfig, ClientError> {
    let defaults = ClientConfig::default();
    let page_size = env_config
        .page_size
        .or(file_config.page_size)
        .unwrap_or(defaults.page_size);
    if page_size == 0 {
        return Err(ClientError::Config("page_size must be greater than zero".to_string()));
    }

    let api_base_url = env_config
        .api_base_url
        .or(file_config.api_base_url)
        .unwrap_or(defaults.api_base_url);

    Ok(ClientConfig {
        api_base_url: api_base_url.trim_end_matches('/').to_string(),
        page_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_file_values_apply_over_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_base_url = \"http://review.internal/api/\"").unwrap();

        let file_config = PartialClientConfig::from_file(file.path()).unwrap();
        let config = merge(PartialClientConfig::default(), file_config).unwrap();

        assert_eq!(config.api_base_url, "http://review.internal/api");
        assert_eq!(config.page_size, 50);
    }

    #[test]
    fn test_environment_wins_over_file() {
        let env = PartialClientConfig {
            api_base_url: None,
            page_size: Some(20),
        };
        let file = PartialClientConfig {
            api_base_url: Some("http://file/api".to_string()),
            page_size: Some(100),
        };
        let config = merge(env, file).unwrap();
        assert_eq!(config.page_size, 20);
        assert_eq!(config.api_base_url, "http://file/api");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = PartialClientConfig::from_file(Path::new("/nonexistent/review.toml"));
        assert!(matches!(result, Err(ClientError::Config(_))));
    }

    #[test]
    fn test_zero_page_size_is_rejected() {
        let env = PartialClientConfig {
            api_base_url: None,
            page_size: Some(0),
        };
        assert!(merge(env, PartialClientConfig::default()).is_err());
    }
}
