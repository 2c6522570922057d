//! Configuration management for rst2html.
//!
//! Parses `rst2html.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! ```toml
//! [render]
//! initial_header_level = 2
//! doctitle_xform = true
//! tab_width = 4
//! heading_backlinks = false
//! ```
//!
//! CLI settings can be applied during load via [`CliSettings`].

use std::path::{Path, PathBuf};

use rst_renderer::Settings;
use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the heading level of top-level sections.
    pub initial_header_level: Option<usize>,
    /// Override document title promotion.
    pub doctitle_xform: Option<bool>,
    /// Override heading backlinks.
    pub heading_backlinks: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "rst2html.toml";

/// Highest HTML heading level.
const MAX_HEADER_LEVEL: usize = 6;

/// Widest accepted tab stop.
const MAX_TAB_WIDTH: usize = 16;

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Rendering configuration.
    pub render: RenderConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Rendering configuration.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Heading level used for top-level sections (1-6).
    pub initial_header_level: usize,
    /// Promote a lone top-level section to the document title.
    pub doctitle_xform: bool,
    /// Tab stop width (1-16).
    pub tab_width: usize,
    /// Link section titles back to their table of contents entry.
    pub heading_backlinks: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        let settings = Settings::default();
        Self {
            initial_header_level: settings.initial_header_level,
            doctitle_xform: settings.doctitle_xform,
            tab_width: settings.tab_width,
            heading_backlinks: settings.heading_backlinks,
        }
    }
}

impl RenderConfig {
    /// Renderer settings for this configuration.
    #[must_use]
    pub fn settings(&self) -> Settings {
        Settings {
            initial_header_level: self.initial_header_level,
            doctitle_xform: self.doctitle_xform,
            tab_width: self.tab_width,
            heading_backlinks: self.heading_backlinks,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

/// Require `value` to lie within `min..=max`.
fn require_range(value: usize, min: usize, max: usize, field: &str) -> Result<(), ConfigError> {
    if !(min..=max).contains(&value) {
        return Err(ConfigError::Validation(format!(
            "{field} must be between {min} and {max}, got {value}"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `rst2html.toml` in the current directory and
    /// its parents, falling back to defaults.
    ///
    /// CLI settings are applied after loading and validated together with
    /// the file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails
    /// or a value is out of range.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let discovered = match config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                Some(path.to_path_buf())
            }
            None => std::env::current_dir()
                .ok()
                .and_then(|cwd| Self::discover_config(&cwd)),
        };

        let mut config = match discovered {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::default(),
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }
        config.validate()?;

        Ok(config)
    }

    /// Renderer settings for this configuration.
    #[must_use]
    pub fn settings(&self) -> Settings {
        self.render.settings()
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(level) = settings.initial_header_level {
            self.render.initial_header_level = level;
        }
        if let Some(doctitle_xform) = settings.doctitle_xform {
            self.render.doctitle_xform = doctitle_xform;
        }
        if let Some(heading_backlinks) = settings.heading_backlinks {
            self.render.heading_backlinks = heading_backlinks;
        }
    }

    /// Search for a config file in `start` and its parents.
    fn discover_config(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.config_path = Some(path.to_path_buf());
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any value is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_range(
            self.render.initial_header_level,
            1,
            MAX_HEADER_LEVEL,
            "render.initial_header_level",
        )?;
        require_range(self.render.tab_width, 1, MAX_TAB_WIDTH, "render.tab_width")?;
        Ok(())
    }
}
