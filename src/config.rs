//! Configuration for triggerhub.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (TRIGGERHUB_HOME, TRIGGERHUB_STORE, TRIGGERHUB_JOURNAL)
//! 2. Config file (.triggerhub/config.yaml)
//! 3. Defaults (~/.triggerhub)
//!
//! Config file discovery:
//! - Searches current directory and parents for .triggerhub/config.yaml
//! - Paths in config file are relative to the .triggerhub/ directory

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub frontend: Option<FrontendConfig>,
    #[serde(default)]
    pub journal: Option<JournalConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// State directory
    pub home: Option<String>,
    /// SQLite store file
    pub store: Option<String>,
    /// Removal journal file
    pub journal: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FrontendConfig {
    pub request_timeout_seconds: Option<u64>,
    pub connect_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JournalConfig {
    pub enabled: Option<bool>,
}

/// Caller-side limits for frontend HTTP calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontendSettings {
    pub request_timeout_seconds: u64,
    pub connect_timeout_seconds: u64,
}

impl Default for FrontendSettings {
    fn default() -> Self {
        Self {
            request_timeout_seconds: 30,
            connect_timeout_seconds: 5,
        }
    }
}

impl FrontendSettings {
    fn from_file(config: Option<&FrontendConfig>) -> Self {
        let defaults = Self::default();
        Self {
            request_timeout_seconds: config
                .and_then(|f| f.request_timeout_seconds)
                .unwrap_or(defaults.request_timeout_seconds),
            connect_timeout_seconds: config
                .and_then(|f| f.connect_timeout_seconds)
                .unwrap_or(defaults.connect_timeout_seconds),
        }
    }
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// State directory
    pub home: PathBuf,
    /// SQLite store file
    pub store_path: PathBuf,
    /// Journal file, `None` when journaling is disabled
    pub journal_path: Option<PathBuf>,
    /// Frontend HTTP settings
    pub frontend: FrontendSettings,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".triggerhub").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to `base`
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var(name).ok().map(PathBuf::from)
}

/// Merge a parsed config file (if any) with environment overrides
fn resolve(
    config: Option<&ConfigFile>,
    config_dir: &Path,
    default_home: PathBuf,
) -> ResolvedConfig {
    let paths = config.map(|c| c.paths.clone()).unwrap_or_default();

    let home = env_path("TRIGGERHUB_HOME")
        .or_else(|| paths.home.as_deref().map(|h| resolve_path(config_dir, h)))
        .unwrap_or(default_home);

    let store_path = env_path("TRIGGERHUB_STORE")
        .or_else(|| paths.store.as_deref().map(|s| resolve_path(config_dir, s)))
        .unwrap_or_else(|| home.join("state.db"));

    let journal_enabled = config
        .and_then(|c| c.journal.as_ref())
        .and_then(|j| j.enabled)
        .unwrap_or(true);
    let journal_path = journal_enabled.then(|| {
        env_path("TRIGGERHUB_JOURNAL")
            .or_else(|| paths.journal.as_deref().map(|j| resolve_path(config_dir, j)))
            .unwrap_or_else(|| home.join("journal.jsonl"))
    });

    ResolvedConfig {
        home,
        store_path,
        journal_path,
        frontend: FrontendSettings::from_file(config.and_then(|c| c.frontend.as_ref())),
        config_file: None,
    }
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".triggerhub");

    let Some(config_path) = find_config_file() else {
        return Ok(resolve(None, Path::new("."), default_home));
    };

    let config = load_config_file(&config_path)?;
    let config_dir = config_path.parent().unwrap_or(Path::new("."));

    let mut resolved = resolve(Some(&config), config_dir, default_home);
    resolved.config_file = Some(config_path);
    Ok(resolved)
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".triggerhub");
        std::fs::create_dir_all(&dir).unwrap();

        let config_path = dir.join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
version: "1.0"
paths:
  home: ./state
  store: ./state/registry.db
frontend:
  request_timeout_seconds: 10
journal:
  enabled: false
"#
        )
        .unwrap();

        let config = load_config_file(&config_path).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.paths.store, Some("./state/registry.db".to_string()));
        assert_eq!(
            config.frontend.as_ref().unwrap().request_timeout_seconds,
            Some(10)
        );
        assert_eq!(config.journal.as_ref().unwrap().enabled, Some(false));
    }

    #[test]
    fn test_resolve_from_file() {
        let config: ConfigFile = serde_yaml::from_str(
            r#"
version: "1.0"
paths:
  store: db/registry.db
  journal: /var/log/triggerhub.jsonl
frontend:
  connect_timeout_seconds: 2
"#,
        )
        .unwrap();

        let resolved = resolve(
            Some(&config),
            Path::new("/project/.triggerhub"),
            PathBuf::from("/home/user/.triggerhub"),
        );

        if std::env::var("TRIGGERHUB_STORE").is_err() {
            assert_eq!(
                resolved.store_path,
                PathBuf::from("/project/.triggerhub/db/registry.db")
            );
        }
        if std::env::var("TRIGGERHUB_JOURNAL").is_err() {
            assert_eq!(
                resolved.journal_path,
                Some(PathBuf::from("/var/log/triggerhub.jsonl"))
            );
        }
        assert_eq!(resolved.frontend.connect_timeout_seconds, 2);
        assert_eq!(resolved.frontend.request_timeout_seconds, 30);
    }

    #[test]
    fn test_defaults_without_file() {
        if std::env::var("TRIGGERHUB_HOME").is_ok() || std::env::var("TRIGGERHUB_STORE").is_ok() {
            return;
        }

        let home = PathBuf::from("/home/user/.triggerhub");
        let resolved = resolve(None, Path::new("."), home.clone());
        assert_eq!(resolved.home, home);
        assert_eq!(resolved.store_path, home.join("state.db"));
        assert_eq!(resolved.frontend, FrontendSettings::default());
        assert!(resolved.journal_path.is_some());
    }

    #[test]
    fn test_resolve_relative_path() {
        let base = PathBuf::from("/home/user/project");

        assert_eq!(
            resolve_path(&base, "./subdir"),
            PathBuf::from("/home/user/project/./subdir")
        );
        assert_eq!(
            resolve_path(&base, "/absolute/path"),
            PathBuf::from("/absolute/path")
        );
    }
}
