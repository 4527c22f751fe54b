use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Deserialize, Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,

    #[serde(default = "default_listen_address")]
    pub listen_address: String,

    /// Prefix for thumbnail object keys, without a trailing slash.
    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,
}

// Partial config for layering
#[derive(Deserialize, Default, Debug)]
struct PartialServerConfig {
    database_url: Option<String>,
    listen_address: Option<String>,
    #[serde(alias = "minio_base_url")]
    image_base_url: Option<String>,
    max_connections: Option<u32>,
    log_dir: Option<String>,
}

fn default_listen_address() -> String {
    "0.0.0.0:3001".to_string()
}

fn default_image_base_url() -> String {
    "http://127.0.0.1:9000".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl ServerConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self, String> {
        dotenv::dotenv().ok();

        // 1. Load from file (optional)
        let file_config: PartialServerConfig = if let Some(path_str) = config_path {
            let path = Path::new(path_str);
            if path.exists() {
                let contents = fs::read_to_string(path)
                    .map_err(|e| format!("Failed to read config file at {path:?}: {e}"))?;
                toml::from_str(&contents)
                    .map_err(|e| format!("Failed to parse TOML from config file at {path:?}: {e}"))?
            } else {
                PartialServerConfig::default()
            }
        } else {
            PartialServerConfig::default()
        };

        // 2. Load from environment variables
        let env_config: PartialServerConfig = envy::from_env::<PartialServerConfig>()
            .map_err(|e| format!("Failed to load config from environment: {e}"))?;

        // 3. Merge: environment overrides file
        Self::merge(env_config, file_config)
    }

    fn merge(
        env_config: PartialServerConfig,
        file_config: PartialServerConfig,
    ) -> Result<Self, String> {
        let image_base_url = env_config
            .image_base_url
            .or(file_config.image_base_url)
            .unwrap_or_else(default_image_base_url);

        let max_connections = env_config
            .max_connections
            .or(file_config.max_connections)
            .unwrap_or_else(default_max_connections);
        if max_connections == 0 {
            return Err("MAX_CONNECTIONS must be greater than zero".to_string());
        }

        Ok(ServerConfig {
            database_url: env_config
                .database_url
                .or(file_config.database_url)
                .ok_or("DATABASE_URL is required")?,
            listen_address: env_config
                .listen_address
                .or(file_config.listen_address)
                .unwrap_or_else(default_listen_address),
            image_base_url: image_base_url.trim_end_matches('/').to_string(),
            max_connections,
            log_dir: env_config
                .log_dir
                .or(file_config.log_dir)
                .unwrap_or_else(default_log_dir),
        })
    }
}
