//! Tinge configuration
//!
//! Settings are read from `tinge.toml` (or the file named by `TINGE_CONFIG`)
//! and then overridden by `TINGE_*` environment variables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File consulted when `TINGE_CONFIG` is unset.
pub const DEFAULT_CONFIG_FILE: &str = "tinge.toml";

/// Bundled asset used when neither a logo nor a favicon resolves.
pub const DEFAULT_ASSET_URL: &str = "https://assets.tinge.dev/widget/default-icon.svg";

pub const SYSTEM_FONT_STACK: &str = r#"-apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Oxygen, Ubuntu, Cantarell, "Helvetica Neue", sans-serif"#;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TingeConfig {
    /// Image probe settings
    pub probe: ProbeConfig,
    /// Fallback values used when the page yields nothing
    pub defaults: DefaultsConfig,
    /// Simulated user-agent media environment
    pub media: MediaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Per-probe deadline in milliseconds
    pub timeout_ms: u64,
    pub user_agent: String,
    /// Largest image body read before the probe gives up
    pub max_bytes: usize,
    /// Origins probes may contact, e.g. "https://example.com:443". Empty allows all.
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub asset_url: String,
    pub font_stack: String,
    pub light_background: String,
    pub light_text: String,
    pub dark_background: String,
    pub dark_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MediaConfig {
    /// Evaluate `prefers-color-scheme: dark` media blocks as matching
    pub prefers_dark: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 3000,
            user_agent: "Tinge/0.1".to_string(),
            max_bytes: 4 * 1024 * 1024,
            allowed_origins: Vec::new(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            asset_url: DEFAULT_ASSET_URL.to_string(),
            font_stack: SYSTEM_FONT_STACK.to_string(),
            light_background: "#ffffff".to_string(),
            light_text: "#1a1a1a".to_string(),
            dark_background: "#1a1a1a".to_string(),
            dark_text: "#f5f5f5".to_string(),
        }
    }
}

impl DefaultsConfig {
    /// Background and text colors for a mode.
    pub fn colors_for(&self, dark: bool) -> (&str, &str) {
        if dark {
            (&self.dark_background, &self.dark_text)
        } else {
            (&self.light_background, &self.light_text)
        }
    }
}

fn env_flag(val: &str) -> bool {
    val == "1" || val.eq_ignore_ascii_case("true")
}

impl TingeConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from `TINGE_CONFIG` or `tinge.toml` in the current directory,
    /// or return defaults if the file is missing or invalid
    pub fn load_or_default() -> Self {
        let path = std::env::var("TINGE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::load_from_file(path).unwrap_or_default()
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    pub fn merge_with_env(&mut self) {
        if let Ok(val) = std::env::var("TINGE_PROBE_TIMEOUT_MS") {
            if let Ok(ms) = val.trim().parse::<u64>() {
                self.probe.timeout_ms = ms;
            }
        }
        if let Ok(agent) = std::env::var("TINGE_USER_AGENT") {
            self.probe.user_agent = agent;
        }
        if let Ok(url) = std::env::var("TINGE_DEFAULT_ASSET_URL") {
            self.defaults.asset_url = url;
        }
        if let Ok(val) = std::env::var("TINGE_PREFERS_DARK") {
            self.media.prefers_dark = env_flag(&val);
        }
    }

    /// Load configuration with environment variable overrides
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }

    pub fn probe_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.probe.timeout_ms)
    }
}
