use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Per-project config file, looked up in the project root.
pub const PROJECT_CONFIG_FILE: &str = "orgweave.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid glob pattern {pattern:?} in {config_path}: {source}")]
    InvalidPattern {
        config_path: PathBuf,
        pattern: String,
        source: glob::PatternError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Defaults to the directory the tool is run from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_root: Option<PathBuf>,
    /// Globs over root-relative paths selecting documents.
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    /// Selector for blocks without a `:selector` header argument.
    pub default_selector: String,
    /// Language tag to file extension overrides.
    pub extensions: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_root: None,
            include: vec!["**/*.org".to_string()],
            exclude: Vec::new(),
            default_selector: "default".to_string(),
            extensions: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        for pattern in config.include.iter().chain(&config.exclude) {
            glob::Pattern::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                config_path: config_path.to_path_buf(),
                pattern: pattern.clone(),
                source,
            })?;
        }

        // Expand shell variables and tilde in the configured root
        config.project_root = config
            .project_root
            .map(|root| Self::expand_path(&root).unwrap_or(root));

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    /// The project file in `root` if there is one, otherwise the user file.
    pub fn discover(root: &Path) -> Result<Option<Self>, ConfigError> {
        match Self::load_from_path(root.join(PROJECT_CONFIG_FILE))? {
            Some(config) => Ok(Some(config)),
            None => Self::load(),
        }
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/orgweave");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// The configured root, with relative roots taken from `base`; `base`
    /// itself when none is configured.
    pub fn resolve_project_root(&self, base: &Path) -> PathBuf {
        match &self.project_root {
            Some(root) if root.is_absolute() => root.clone(),
            Some(root) => base.join(root),
            None => base.to_path_buf(),
        }
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
