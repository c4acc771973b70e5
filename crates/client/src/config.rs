use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use stagehand_common::{DEFAULT_PAGE_SIZE, SEARCH_DEBOUNCE_MS};

use crate::api::SortOrder;
use crate::controller::ListConfig;
use crate::error::ConfigError;

pub const ENV_PREFIX: &str = "STAGEHAND_";

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub page_size: u32,
    pub search_debounce_ms: u64,
    pub sort: SortOrder,
    pub log_dir: String,
}

// Partial config for layering
#[derive(Deserialize, Default, Debug)]
struct PartialClientConfig {
    base_url: Option<String>,
    page_size: Option<u32>,
    search_debounce_ms: Option<u64>,
    sort: Option<String>,
    log_dir: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:8000/api/".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl ClientConfig {
    /// `.env`, then the optional TOML file, then `STAGEHAND_*` variables on top.
    pub fn load(config_path: Option<&str>) -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::load_from(config_path, std::env::vars())
    }

    pub fn load_from<I>(config_path: Option<&str>, env: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let file_config = match config_path {
            Some(path_str) if Path::new(path_str).exists() => {
                let contents = fs::read_to_string(path_str).map_err(|source| ConfigError::Read {
                    path: path_str.to_string(),
                    source,
                })?;
                toml::from_str(&contents).map_err(|source| ConfigError::Parse {
                    path: path_str.to_string(),
                    source,
                })?
            }
            _ => PartialClientConfig::default(),
        };

        let env_config: PartialClientConfig = envy::prefixed(ENV_PREFIX).from_iter(env)?;

        let sort = match env_config.sort.or(file_config.sort) {
            Some(raw) => raw.parse::<SortOrder>().map_err(ConfigError::Invalid)?,
            None => SortOrder::default(),
        };
        let page_size = env_config
            .page_size
            .or(file_config.page_size)
            .unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size == 0 {
            return Err(ConfigError::Invalid("page_size must be at least 1".to_string()));
        }

        Ok(ClientConfig {
            base_url: env_config
                .base_url
                .or(file_config.base_url)
                .unwrap_or_else(default_base_url),
            page_size,
            search_debounce_ms: env_config
                .search_debounce_ms
                .or(file_config.search_debounce_ms)
                .unwrap_or(SEARCH_DEBOUNCE_MS),
            sort,
            log_dir: env_config
                .log_dir
                .or(file_config.log_dir)
                .unwrap_or_else(default_log_dir),
        })
    }

    pub fn list_config(&self) -> ListConfig {
        ListConfig {
            page_size: self.page_size,
            search_debounce: Duration::from_millis(self.search_debounce_ms),
            sort: self.sort,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_without_file_or_env() {
        let config = ClientConfig::load_from(None, env(&[("PATH", "/usr/bin")])).unwrap();
        assert_eq!(config.base_url, "http://localhost:8000/api/");
        assert_eq!(config.page_size, 50);
        assert_eq!(config.search_debounce_ms, 500);
        assert_eq!(config.sort, SortOrder::Desc);
        assert_eq!(config.log_dir, "logs");
    }

    #[test]
    fn test_env_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "base_url = \"https://file.example/api/\"\npage_size = 20\nsort = \"asc\""
        )
        .unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let config = ClientConfig::load_from(
            Some(&path),
            env(&[("STAGEHAND_BASE_URL", "https://env.example/api/")]),
        )
        .unwrap();
        assert_eq!(config.base_url, "https://env.example/api/");
        assert_eq!(config.page_size, 20);
        assert_eq!(config.sort, SortOrder::Asc);
        assert_eq!(config.list_config().page_size, 20);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config =
            ClientConfig::load_from(Some("/nonexistent/stagehand.toml"), Vec::new()).unwrap();
        assert_eq!(config.page_size, 50);
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "page_size = \"many\"").unwrap();
        let path = file.path().to_str().unwrap().to_string();
        assert!(matches!(
            ClientConfig::load_from(Some(&path), Vec::new()),
            Err(ConfigError::Parse { .. })
        ));

        assert!(matches!(
            ClientConfig::load_from(None, env(&[("STAGEHAND_SORT", "sideways")])),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ClientConfig::load_from(None, env(&[("STAGEHAND_PAGE_SIZE", "0")])),
            Err(ConfigError::Invalid(_))
        ));
    }
}
