//! Renderer configuration.
//!
//! Resolution order: built-in defaults, then a TOML file, then environment.
//!
//! ```toml
//! truncate_threshold = 300
//! ellipsis = "..."
//! truncation = "boundary"   # or "raw"
//!
//! [palette]
//! comment = "#6b7280"
//! string = "#b45309"
//! number = "#16a34a"
//! keyword = "#2563eb"
//! plain = "#111827"
//! ```
//!
//! The file defaults to `render.toml` in the platform config directory; a
//! missing file is not an error. Environment overrides:
//! `LEETMATE_TRUNCATE_THRESHOLD`, `LEETMATE_ELLIPSIS`, `LEETMATE_TRUNCATION`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::render::{
    DEFAULT_ELLIPSIS, DEFAULT_TRUNCATE_THRESHOLD, Palette, RenderOptions, TruncationMode,
};

pub const CONFIG_FILE_NAME: &str = "render.toml";

/// Errors that can occur when loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config TOML: {0}")]
    ParseToml(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// File and environment backed render settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub truncate_threshold: usize,
    pub ellipsis: String,
    pub truncation: TruncationMode,
    pub palette: Palette,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            truncate_threshold: DEFAULT_TRUNCATE_THRESHOLD,
            ellipsis: DEFAULT_ELLIPSIS.to_string(),
            truncation: TruncationMode::default(),
            palette: Palette::default(),
        }
    }
}

/// Platform config path, e.g. `~/.config/leetmate-render/render.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "leetmate", "leetmate-render")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

impl RenderConfig {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Defaults, then `path` (or the platform default if it exists), then env.
    ///
    /// An explicit `path` must exist; the platform default may be absent.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut cfg = match path {
            Some(p) => Self::from_file(p)?,
            None => match default_config_path() {
                Some(p) if p.exists() => Self::from_file(&p)?,
                _ => Self::default(),
            },
        };
        cfg.apply_env();
        cfg.validate()?;
        debug!(
            component = "config",
            operation = "load",
            truncate_threshold = cfg.truncate_threshold,
            truncation = ?cfg.truncation,
            "Render config resolved"
        );
        Ok(cfg)
    }

    /// Apply `LEETMATE_*` overrides. Unparseable values are ignored.
    pub fn apply_env(&mut self) {
        if let Ok(val) = dotenvy::var("LEETMATE_TRUNCATE_THRESHOLD") {
            match val.trim().parse() {
                Ok(n) => self.truncate_threshold = n,
                Err(e) => warn!(value = %val, error = %e, "Ignoring LEETMATE_TRUNCATE_THRESHOLD"),
            }
        }

        if let Ok(val) = dotenvy::var("LEETMATE_ELLIPSIS") {
            self.ellipsis = val;
        }

        if let Ok(val) = dotenvy::var("LEETMATE_TRUNCATION") {
            match val.parse() {
                Ok(mode) => self.truncation = mode,
                Err(e) => warn!(value = %val, error = %e, "Ignoring LEETMATE_TRUNCATION"),
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.truncate_threshold == 0 {
            return Err(ConfigError::Validation(
                "truncate_threshold must be greater than 0".to_string(),
            ));
        }
        for (name, value) in self.palette.entries() {
            if !is_hex_color(value) {
                return Err(ConfigError::Validation(format!(
                    "palette.{name} must be a #rrggbb colour, got {value:?}"
                )));
            }
        }
        Ok(())
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            truncate_threshold: self.truncate_threshold,
            ellipsis: self.ellipsis.clone(),
            truncation: self.truncation,
            palette: self.palette.clone(),
        }
    }
}

fn is_hex_color(s: &str) -> bool {
    s.len() == 7 && s.starts_with('#') && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}
