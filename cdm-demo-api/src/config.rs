use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File looked up in the working directory when no path is given.
const DEFAULT_CONFIG_FILE: &str = "cdm-demo";

/// Bundled page, independent of the working directory.
const DEFAULT_STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/public");

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub server_port: u16,
    pub bind_address: String,
    /// Directory served at `/` (holds `index.html`).
    pub static_dir: PathBuf,
    pub cdm_version: String,
    pub log_level: String,
    /// Load the two demo trades at startup.
    pub seed_demo_trades: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server_port: 3000,
            bind_address: "0.0.0.0".to_string(),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            cdm_version: cdm::CDM_VERSION.to_string(),
            log_level: "info".to_string(),
            seed_demo_trades: true,
        }
    }
}

impl ServerConfig {
    /// Defaults, then `cdm-demo.{toml,json,...}` (or `path`), then
    /// `CDM_DEMO_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix("CDM_DEMO"))
            .build()?
            .try_deserialize()
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.server_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.listen_addr(), "0.0.0.0:3000");
        assert_eq!(config.cdm_version, "6.0.0");
    }

    #[test]
    fn test_default_static_dir_holds_index() {
        let config = ServerConfig::default();
        assert!(config.static_dir.is_absolute());
        assert!(config.static_dir.join("index.html").is_file());
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let path = std::env::temp_dir().join(format!("cdm-demo-test-{}.toml", std::process::id()));
        {
            let mut file = std::fs::File::create(&path).unwrap();
            writeln!(file, "server_port = 8088").unwrap();
            writeln!(file, "seed_demo_trades = false").unwrap();
        }

        let config = ServerConfig::load(Some(&path)).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.server_port, 8088);
        assert!(!config.seed_demo_trades);
        assert_eq!(config.bind_address, "0.0.0.0");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let path = Path::new("/nonexistent/cdm-demo.toml");
        assert!(ServerConfig::load(Some(path)).is_err());
    }
}
