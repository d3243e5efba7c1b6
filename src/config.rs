//! Configuration for the catalog.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (RICHARD_HOME, RICHARD_DATABASE, RICHARD_BASE_URL)
//! 2. Config file (.richard/config.yaml)
//! 3. Defaults (~/.richard/catalog.db)
//!
//! Config file discovery:
//! - Searches current directory and parents for .richard/config.yaml
//! - Relative paths in the config file resolve against its `.richard/` directory

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::domain::Permalink;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

const CONFIG_DIR: &str = ".richard";
const CONFIG_FILE: &str = "config.yaml";
const DEFAULT_DATABASE: &str = "catalog.db";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub home: Option<String>,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub site: SiteConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file (relative to the config directory)
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteConfig {
    /// Public base URL permalinks are joined to, e.g. https://videos.example.org
    pub base_url: Option<String>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// State directory
    pub home: PathBuf,
    /// SQLite catalog file
    pub database: PathBuf,
    /// Site base URL, without trailing slash
    pub base_url: Option<String>,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl ResolvedConfig {
    /// Absolute URL of an entity's permalink, when both a base URL and an id exist
    pub fn absolute_url<P: Permalink>(&self, entity: &P) -> Option<String> {
        let base = self.base_url.as_deref()?;
        entity.permalink().map(|path| format!("{}{}", base, path))
    }
}

/// Find config file by searching `start` and its parents
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_DIR).join(CONFIG_FILE);
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

fn normalize_base_url(url: String) -> Option<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Resolve configuration starting the file search at `start`, reading
/// overrides through `env`
fn resolve_config(
    start: Option<&Path>,
    default_home: PathBuf,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ResolvedConfig> {
    let config_file = start.and_then(find_config_file);

    let file = match config_file {
        Some(ref path) => Some(load_config_file(path)?),
        None => None,
    };

    // Relative paths in the file resolve against the .richard/ directory
    let config_dir = config_file
        .as_deref()
        .and_then(Path::parent)
        .map(Path::to_path_buf);

    let home = if let Some(env_home) = env("RICHARD_HOME") {
        PathBuf::from(env_home)
    } else if let (Some(home), Some(dir)) = (
        file.as_ref().and_then(|f| f.home.as_deref()),
        config_dir.as_deref(),
    ) {
        resolve_path(dir, home)
    } else {
        default_home
    };

    let database = if let Some(env_db) = env("RICHARD_DATABASE") {
        PathBuf::from(env_db)
    } else if let (Some(db), Some(dir)) = (
        file.as_ref().and_then(|f| f.database.path.as_deref()),
        config_dir.as_deref(),
    ) {
        resolve_path(dir, db)
    } else {
        home.join(DEFAULT_DATABASE)
    };

    let base_url = env("RICHARD_BASE_URL")
        .or_else(|| file.as_ref().and_then(|f| f.site.base_url.clone()))
        .and_then(normalize_base_url);

    Ok(ResolvedConfig {
        home,
        database,
        base_url,
        config_file,
    })
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(CONFIG_DIR);
    let cwd = std::env::current_dir().ok();

    resolve_config(cwd.as_deref(), default_home, |key| std::env::var(key).ok())
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Get the catalog database path
pub fn database_path() -> Result<PathBuf> {
    Ok(config()?.database.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Speaker, SpeakerId};
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn write_config(root: &Path, body: &str) -> PathBuf {
        let dir = root.join(CONFIG_DIR);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE);
        std::fs::write(&path, body).unwrap();
        path
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults_without_file() {
        let temp = TempDir::new().unwrap();
        let home = PathBuf::from("/home/test/.richard");

        let config = resolve_config(Some(temp.path()), home.clone(), no_env).unwrap();
        assert_eq!(config.home, home);
        assert_eq!(config.database, home.join("catalog.db"));
        assert!(config.base_url.is_none());
        assert!(config.config_file.is_none());
    }

    #[test]
    fn test_config_file_found_from_subdirectory() {
        let temp = TempDir::new().unwrap();
        let config_path = write_config(
            temp.path(),
            r#"
version: "1.0"
database:
  path: data/videos.db
site:
  base_url: https://videos.example.org/
"#,
        );
        let nested = temp.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let config = resolve_config(Some(nested.as_path()), PathBuf::from("/unused"), no_env).unwrap();
        assert_eq!(config.config_file, Some(config_path.clone()));
        assert_eq!(
            config.database,
            config_path.parent().unwrap().join("data/videos.db")
        );
        assert_eq!(config.base_url.as_deref(), Some("https://videos.example.org"));
    }

    #[test]
    fn test_env_overrides_file() {
        let temp = TempDir::new().unwrap();
        write_config(
            temp.path(),
            "version: \"1.0\"\ndatabase:\n  path: from-file.db\n",
        );
        let env: HashMap<&str, &str> = [
            ("RICHARD_DATABASE", "/tmp/from-env.db"),
            ("RICHARD_BASE_URL", "http://localhost:8000"),
        ]
        .into_iter()
        .collect();

        let config = resolve_config(Some(temp.path()), PathBuf::from("/unused"), |key| {
            env.get(key).map(|v| v.to_string())
        })
        .unwrap();
        assert_eq!(config.database, PathBuf::from("/tmp/from-env.db"));
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:8000"));
    }

    #[test]
    fn test_invalid_config_file_is_error() {
        let temp = TempDir::new().unwrap();
        write_config(temp.path(), "database: [not, a, map]\n");

        assert!(resolve_config(Some(temp.path()), PathBuf::from("/unused"), no_env).is_err());
    }

    #[test]
    fn test_absolute_url() {
        let config = ResolvedConfig {
            home: PathBuf::from("/h"),
            database: PathBuf::from("/h/catalog.db"),
            base_url: Some("https://videos.example.org".to_string()),
            config_file: None,
        };

        let mut speaker = Speaker::new("Ned Batchelder", "ned-batchelder");
        assert_eq!(config.absolute_url(&speaker), None);

        speaker.id = Some(SpeakerId(12));
        assert_eq!(
            config.absolute_url(&speaker).as_deref(),
            Some("https://videos.example.org/speaker/12/ned-batchelder/")
        );
    }

    #[test]
    fn test_resolve_relative_path() {
        let base = PathBuf::from("/home/user/project/.richard");

        assert_eq!(
            resolve_path(&base, "catalog.db"),
            PathBuf::from("/home/user/project/.richard/catalog.db")
        );
        assert_eq!(
            resolve_path(&base, "/absolute/catalog.db"),
            PathBuf::from("/absolute/catalog.db")
        );
    }
}
