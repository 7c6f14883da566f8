use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};

const DB_PATH_ENV: &str = "ARXIV_STORE_DB_PATH";
const PORT_ENV: &str = "ARXIV_STORE_PORT";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_arxiv_api_url")]
    pub arxiv_api_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_db_path() -> String {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("arxiv-store");
    std::fs::create_dir_all(&data_dir).ok();
    data_dir.join("arxiv.db").to_string_lossy().to_string()
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_arxiv_api_url() -> String {
    "https://export.arxiv.org/api/query".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_user_agent() -> String {
    concat!("arxiv-store/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            bind_address: default_bind_address(),
            port: default_port(),
            arxiv_api_url: default_arxiv_api_url(),
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Config {
    /// Loads the config at `config_path`, writing a default file on first run.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            toml::from_str::<Config>(&content)?
        } else {
            let config = Config::default();
            config.save_to(config_path)?;
            config
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("arxiv-store")
            .join("config.toml")
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(db_path) = std::env::var(DB_PATH_ENV) {
            if !db_path.is_empty() {
                self.db_path = db_path;
            }
        }
        if let Ok(port) = std::env::var(PORT_ENV) {
            self.port = port
                .parse()
                .map_err(|_| AppError::Config(format!("{PORT_ENV} must be a port number, got '{port}'")))?;
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}
