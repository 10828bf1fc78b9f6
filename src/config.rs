use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that overrides `api.base_url`
pub const API_URL_ENV: &str = "ITEMS_DASH_API_URL";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub api: ApiConfig,
  /// Revalidate the item list in the background once it is this old
  pub refresh_interval_secs: Option<u64>,
  /// File this config was read from; `None` means built-in defaults
  #[serde(skip)]
  pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
  pub base_url: String,
  /// Per-request timeout
  pub timeout_secs: u64,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: "http://localhost:8000".to_string(),
      timeout_secs: 30,
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./items-dash.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/items-dash/config.yaml
  ///
  /// Falls back to defaults when no file is found. `ITEMS_DASH_API_URL`
  /// overrides whatever base URL the file sets.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Self::default(),
    };

    Ok(config.with_api_url(std::env::var(API_URL_ENV).ok()))
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("items-dash.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("items-dash").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config = Self::from_yaml(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;
    Ok(Config {
      source: Some(path.to_path_buf()),
      ..config
    })
  }

  /// Record where the config came from; call once logging is up
  pub fn log_source(&self) {
    match &self.source {
      Some(path) => tracing::debug!(path = %path.display(), base_url = %self.api.base_url, "Loaded config file"),
      None => tracing::debug!(base_url = %self.api.base_url, "No config file found, using defaults"),
    }
  }

  fn from_yaml(contents: &str) -> Result<Self> {
    Ok(serde_yaml::from_str(contents)?)
  }

  /// Replace the API base URL if one is given
  pub fn with_api_url(self, url: Option<String>) -> Self {
    match url {
      Some(base_url) => Config {
        api: ApiConfig {
          base_url,
          ..self.api
        },
        ..self
      },
      None => self,
    }
  }

  pub fn refresh_interval(&self) -> Option<Duration> {
    self
      .refresh_interval_secs
      .filter(|secs| *secs > 0)
      .map(Duration::from_secs)
  }

  pub fn request_timeout(&self) -> Duration {
    Duration::from_secs(self.api.timeout_secs)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults_have_no_source() {
    assert_eq!(Config::default().source, None);
    assert_eq!(Config::from_yaml("{}").unwrap().source, None);
  }

  #[test]
  fn test_defaults_when_empty() {
    let config = Config::from_yaml("{}").unwrap();
    assert_eq!(config.api.base_url, "http://localhost:8000");
    assert_eq!(config.api.timeout_secs, 30);
    assert_eq!(config.refresh_interval(), None);
  }

  #[test]
  fn test_partial_api_section() {
    let config = Config::from_yaml(
      "api:\n  base_url: https://items.example.com/api\nrefresh_interval_secs: 15\n",
    )
    .unwrap();
    assert_eq!(config.api.base_url, "https://items.example.com/api");
    assert_eq!(config.api.timeout_secs, 30);
    assert_eq!(config.refresh_interval(), Some(Duration::from_secs(15)));
  }

  #[test]
  fn test_zero_refresh_interval_disables_revalidation() {
    let config = Config::from_yaml("refresh_interval_secs: 0\n").unwrap();
    assert_eq!(config.refresh_interval(), None);
  }

  #[test]
  fn test_with_api_url_overrides() {
    let config = Config::default().with_api_url(Some("http://10.0.0.1:9000".to_string()));
    assert_eq!(config.api.base_url, "http://10.0.0.1:9000");
    assert_eq!(config.api.timeout_secs, 30);

    let unchanged = Config::default().with_api_url(None);
    assert_eq!(unchanged.api.base_url, "http://localhost:8000");
  }

  #[test]
  fn test_missing_explicit_path_is_an_error() {
    let missing = std::env::temp_dir().join("items-dash-does-not-exist.yaml");
    let err = Config::load(Some(&missing)).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
  }

  #[test]
  fn test_load_from_explicit_path() {
    let path = std::env::temp_dir().join(format!("items-dash-test-{}.yaml", std::process::id()));
    std::fs::write(&path, "api:\n  timeout_secs: 5\n").unwrap();

    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(config.request_timeout(), Duration::from_secs(5));
    assert_eq!(config.source.as_deref(), Some(path.as_path()));

    std::fs::remove_file(&path).unwrap();
  }
}
