use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Exploration settings shared by `find` and the traverser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExploreConfig {
    /// Maximum recursion depth
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Regular expressions for member names that must never be accessed
    #[serde(default)]
    pub ignore_pattern: Vec<String>,

    /// Type names whose members are never accessed
    #[serde(default)]
    pub ignored_types: Vec<String>,

    /// Per-type member denylist (type name -> member names)
    #[serde(default)]
    pub ignored_members: BTreeMap<String, Vec<String>>,

    /// Match edge labels as well as node labels when stripping
    #[serde(default = "default_true")]
    pub match_edges: bool,

    /// Print matching paths
    #[serde(default = "default_true")]
    pub verbose: bool,

    /// Hand the stripped graph to the visualizer
    #[serde(default)]
    pub visualize: bool,

    /// Show a progress bar while inspecting the root object
    #[serde(default)]
    pub progress: bool,

    /// Namespace root to explore; derived from the root value when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Directory for visualizer artifacts
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for ExploreConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            ignore_pattern: vec![],
            ignored_types: vec![],
            ignored_members: BTreeMap::new(),
            match_edges: true,
            verbose: true,
            visualize: false,
            progress: false,
            namespace: None,
            output_dir: default_output_dir(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ExploreConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::ValidationError(
                "max_depth must be greater than 0".to_string(),
            ));
        }
        for pattern in &self.ignore_pattern {
            regex::Regex::new(pattern).map_err(|e| {
                ConfigError::ValidationError(format!("invalid ignore pattern '{}': {}", pattern, e))
            })?;
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for per-run log files
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_dir: default_log_dir(),
        }
    }
}

fn default_max_depth() -> usize {
    10
}
fn default_true() -> bool {
    true
}
fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_log_level() -> String {
    "debug".to_string()
}
fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

/// Loads [`ExploreConfig`] from disk and the environment.
pub struct ConfigManager {
    config: ExploreConfig,
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration with the following precedence:
    /// 1. Environment variables (`OBJGRAPH_*`)
    /// 2. Config file (`./.objgraph.toml`, then `~/.objgraph/config.toml`)
    /// 3. Defaults
    pub fn load() -> Result<Self, ConfigError> {
        let (config, config_path) = Self::load_config_file()?;
        Self::finish(config, config_path)
    }

    /// Load from an explicit file, still honoring environment overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::read_toml_file(path)?;
        Self::finish(config, Some(path.to_path_buf()))
    }

    fn finish(config: ExploreConfig, config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let config = Self::apply_env_overrides(config);
        config.validate()?;

        match config_path {
            Some(ref path) => info!("Config file: {}", path.display()),
            None => info!("Config file: NONE (using defaults)"),
        }
        info!("Max depth: {}", config.max_depth);

        Ok(Self {
            config,
            config_path,
        })
    }

    fn load_config_file() -> Result<(ExploreConfig, Option<PathBuf>), ConfigError> {
        let local_config = Path::new(".objgraph.toml");
        if local_config.exists() {
            let config = Self::read_toml_file(local_config)?;
            return Ok((config, Some(local_config.to_path_buf())));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".objgraph").join("config.toml");
            if user_config.exists() {
                let config = Self::read_toml_file(&user_config)?;
                return Ok((config, Some(user_config)));
            }
        }

        Ok((ExploreConfig::default(), None))
    }

    fn read_toml_file(path: &Path) -> Result<ExploreConfig, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    fn apply_env_overrides(mut config: ExploreConfig) -> ExploreConfig {
        if let Ok(depth) = std::env::var("OBJGRAPH_MAX_DEPTH") {
            match depth.parse() {
                Ok(depth) => config.max_depth = depth,
                Err(_) => warn!("Ignoring invalid OBJGRAPH_MAX_DEPTH={}", depth),
            }
        }
        if let Ok(ignore) = std::env::var("OBJGRAPH_IGNORE") {
            config.ignore_pattern.extend(
                ignore
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from),
            );
        }
        if let Ok(verbose) = std::env::var("OBJGRAPH_VERBOSE") {
            config.verbose = matches!(verbose.to_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Ok(level) = std::env::var("OBJGRAPH_LOG_LEVEL") {
            config.logging.level = level;
        }
        config
    }

    pub fn config(&self) -> &ExploreConfig {
        &self.config
    }

    pub fn into_config(self) -> ExploreConfig {
        self.config
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}
