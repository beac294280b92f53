//! Pipeline configuration file (`~/.config/pokedex/config.toml`).
//!
//! Every field is optional; missing values fall back to the defaults below.
//! Command-line flags take priority over anything read here.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid setting: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetch: FetchSettings,
    pub thumbnail: ThumbnailSettings,
    pub paths: PathSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Cap on simultaneous outbound requests for the whole run.
    ///
    /// Setting this above what the upstream API tolerates only earns more
    /// 429 responses.
    pub concurrency: usize,
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub rate_limit_jitter_ms: u64,
    pub network_jitter_ms: u64,
    /// Page size used when walking the upstream list endpoint.
    pub list_page_size: u32,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            base_url: "https://pokeapi.co/api/v2".to_string(),
            user_agent: concat!("pokedex-ingest/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 20,
            concurrency: 4,
            max_retries: 6,
            base_delay_ms: 500,
            rate_limit_jitter_ms: 250,
            network_jitter_ms: 500,
            list_page_size: 151,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThumbFormat {
    Webp,
    Jpeg,
}

impl ThumbFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Webp => "webp",
            Self::Jpeg => "jpg",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Webp => "image/webp",
            Self::Jpeg => "image/jpeg",
        }
    }
}

impl FromStr for ThumbFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "webp" => Ok(Self::Webp),
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            other => Err(ConfigError::Invalid(format!(
                "unknown thumbnail format '{}' (expected webp or jpeg)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailSettings {
    pub max_width: u32,
    pub max_height: u32,
    pub format: ThumbFormat,
    /// JPEG quality, 1-100. The WebP encoder is lossless and ignores it.
    pub quality: u8,
}

impl Default for ThumbnailSettings {
    fn default() -> Self {
        Self {
            max_width: 200,
            max_height: 200,
            format: ThumbFormat::Webp,
            quality: 75,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    pub out_dir: PathBuf,
    pub db_path: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("./data/images"),
            db_path: PathBuf::from("./data/pokedex.sqlite"),
        }
    }
}

/// Canonical config file location: `~/.config/pokedex/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pokedex").join("config.toml"))
}

impl Config {
    /// Load from an explicit path, or from [`config_path`] when `None`.
    ///
    /// An explicit path must exist. The default location is optional and a
    /// missing file yields the built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match explicit {
            Some(p) => (p.to_path_buf(), true),
            None => match config_path() {
                Some(p) => (p, false),
                None => return Ok(Self::default()),
            },
        };

        if !required && !path.exists() {
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let config = Self::from_toml_str(&text).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse { path, source },
            other => other,
        })?;
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fetch.concurrency == 0 {
            return Err(ConfigError::Invalid("fetch.concurrency must be >= 1".into()));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(ConfigError::Invalid("fetch.timeout_secs must be >= 1".into()));
        }
        if self.fetch.list_page_size == 0 {
            return Err(ConfigError::Invalid("fetch.list_page_size must be >= 1".into()));
        }
        if self.thumbnail.max_width == 0 || self.thumbnail.max_height == 0 {
            return Err(ConfigError::Invalid(
                "thumbnail bounds must be non-zero".into(),
            ));
        }
        if !(1..=100).contains(&self.thumbnail.quality) {
            return Err(ConfigError::Invalid(
                "thumbnail.quality must be in 1..=100".into(),
            ));
        }
        Ok(())
    }

    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }
}
