use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_URL: &str = "https://swapi.dev/api";

/// Environment variable overriding `api.base_url`
pub const BASE_URL_ENV: &str = "HOLOCRON_API_URL";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub api: ApiConfig,
  #[serde(default)]
  pub cache: CacheConfig,
  #[serde(default)]
  pub log: LogConfig,
  /// Custom title for header (defaults to the API host if not set)
  pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  #[serde(default = "default_base_url")]
  pub base_url: String,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: default_base_url(),
    }
  }
}

fn default_base_url() -> String {
  DEFAULT_BASE_URL.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  /// How long a fetched homeworld is served without refetching
  #[serde(default = "default_homeworld_stale_minutes")]
  pub homeworld_stale_minutes: u32,
  /// How long the people listing counts as fresh when the list is reloaded
  #[serde(default = "default_people_stale_seconds")]
  pub people_stale_seconds: u64,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      homeworld_stale_minutes: default_homeworld_stale_minutes(),
      people_stale_seconds: default_people_stale_seconds(),
    }
  }
}

fn default_homeworld_stale_minutes() -> u32 {
  10
}

fn default_people_stale_seconds() -> u64 {
  5
}

impl CacheConfig {
  pub fn homeworld_stale_time(&self) -> chrono::Duration {
    chrono::Duration::minutes(self.homeworld_stale_minutes.into())
  }

  pub fn people_stale_time(&self) -> std::time::Duration {
    std::time::Duration::from_secs(self.people_stale_seconds)
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogConfig {
  /// tracing filter directive, e.g. "holocron=debug"
  pub filter: Option<String>,
  /// Directory for holocron.log (defaults to the platform data directory)
  pub directory: Option<PathBuf>,
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./holocron.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/holocron/config.yaml
  ///
  /// Every setting has a default, so a missing file is not an error unless
  /// it was asked for explicitly.
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

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("holocron.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("holocron").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }

  /// Apply the base URL override from the command line or the environment.
  ///
  /// Command line wins over `HOLOCRON_API_URL`, which wins over the file.
  pub fn with_base_url_override(mut self, cli: Option<String>) -> Self {
    let env = std::env::var(BASE_URL_ENV).ok();
    if let Some(url) = pick_base_url(cli, env) {
      self.api.base_url = url;
    }
    self
  }

  /// Directory the log file is written to.
  pub fn log_directory(&self) -> Result<PathBuf> {
    if let Some(dir) = &self.log.directory {
      return Ok(dir.clone());
    }
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("holocron"))
  }
}

fn pick_base_url(cli: Option<String>, env: Option<String>) -> Option<String> {
  cli
    .or(env)
    .map(|url| url.trim().to_string())
    .filter(|url| !url.is_empty())
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;

  fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
  }

  #[test]
  fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.api.base_url, "https://swapi.dev/api");
    assert_eq!(config.cache.homeworld_stale_time(), chrono::Duration::minutes(10));
    assert_eq!(
      config.cache.people_stale_time(),
      std::time::Duration::from_secs(5)
    );
    assert!(config.title.is_none());
  }

  #[test]
  fn test_load_partial_file_keeps_defaults() {
    let file = write_config("cache:\n  homeworld_stale_minutes: 1\n");
    let config = Config::load(Some(file.path())).unwrap();
    assert_eq!(config.cache.homeworld_stale_minutes, 1);
    assert_eq!(config.cache.people_stale_seconds, 5);
    assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
  }

  #[test]
  fn test_load_full_file() {
    let file = write_config(
      "title: Archives\napi:\n  base_url: http://localhost:8000/api\nlog:\n  filter: holocron=debug\n  directory: /tmp/holocron\n",
    );
    let config = Config::load(Some(file.path())).unwrap();
    assert_eq!(config.title.as_deref(), Some("Archives"));
    assert_eq!(config.api.base_url, "http://localhost:8000/api");
    assert_eq!(config.log.filter.as_deref(), Some("holocron=debug"));
    assert_eq!(
      config.log_directory().unwrap(),
      PathBuf::from("/tmp/holocron")
    );
  }

  #[test]
  fn test_explicit_missing_file_is_error() {
    let err = Config::load(Some(Path::new("/definitely/not/here.yaml"))).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
  }

  #[test]
  fn test_invalid_yaml_is_error() {
    let file = write_config("cache: [not, a, map]\n");
    let err = Config::load(Some(file.path())).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
  }

  #[test]
  fn test_base_url_precedence() {
    assert_eq!(
      pick_base_url(Some("http://cli".into()), Some("http://env".into())),
      Some("http://cli".to_string())
    );
    assert_eq!(
      pick_base_url(None, Some("http://env".into())),
      Some("http://env".to_string())
    );
    assert_eq!(pick_base_url(None, None), None);
    assert_eq!(pick_base_url(None, Some("  ".into())), None);
  }
}
