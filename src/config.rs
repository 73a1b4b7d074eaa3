// Configuration loaded from config.toml, with defaults for every section
// so a missing or broken file never blocks startup.

use crate::error::{Error, Result};
use crate::logger::{Level, LoggerSettings};
use crate::renderer::RendererSettings;
use crate::window::{Position, SizeLimits, WindowSettings};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub graphics: GraphicsConfig,
    pub log: LogConfig,
    pub shaders: ShaderConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    pub visible: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "easel".to_owned(),
            width: 1280,
            height: 720,
            max_width: None,
            max_height: None,
            visible: true,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GraphicsConfig {
    pub vsync: bool,
    pub clear_color: [f32; 4],
    pub validation: bool,
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            vsync: true,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            validation: true,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub file: Option<String>,
    pub timestamp: bool,
    pub thread_id: bool,
    pub color: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "debug".to_owned(),
            file: None,
            timestamp: true,
            thread_id: false,
            color: true,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ShaderConfig {
    pub vertex: String,
    pub fragment: String,
}

impl Default for ShaderConfig {
    fn default() -> Self {
        Self {
            vertex: "shaders/triangle.vert.spv".to_owned(),
            fragment: "shaders/triangle.frag.spv".to_owned(),
        }
    }
}

impl Config {
    /// Loads `config.toml`, falling back to defaults when the file is
    /// missing or unparseable.
    pub fn load() -> Self {
        Self::load_from_path("config.toml").unwrap_or_else(|e| {
            eprintln!("easel: failed to load config.toml ({e}), using defaults");
            Config::default()
        })
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| Error::Resource {
            what: format!("config file {}", path.display()),
            source: e,
        })?;

        toml::from_str(&content)
            .map_err(|e| Error::logic(format!("failed to parse {}: {e}", path.display())))
    }

    pub fn logger_settings(&self) -> LoggerSettings {
        LoggerSettings {
            disabled: false,
            level_min: Level::parse(&self.log.level).unwrap_or(Level::Debug),
            timestamp: self.log.timestamp,
            thread_id: self.log.thread_id,
            color: self.log.color,
        }
    }

    pub fn window_settings(&self) -> WindowSettings {
        WindowSettings {
            limits: SizeLimits {
                width: self.window.max_width,
                height: self.window.max_height,
            },
            position: Position::Default,
        }
    }

    pub fn renderer_settings(&self) -> RendererSettings {
        RendererSettings {
            vsync: self.graphics.vsync,
            clear_color: self.graphics.clear_color,
            // Validation layers only in debug builds, and only if asked for.
            validation: cfg!(debug_assertions) && self.graphics.validation,
            ..RendererSettings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.window.height, 720);
        assert!(config.graphics.vsync);
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn sections_override_individually() {
        let config: Config = toml::from_str(
            r#"
            [window]
            title = "demo"
            width = 800
            height = 600
            max_width = 1024

            [log]
            level = "warn"
            "#,
        )
        .unwrap();

        assert_eq!(config.window.title, "demo");
        assert_eq!(config.window.max_width, Some(1024));
        assert_eq!(config.window.max_height, None);
        assert_eq!(config.logger_settings().level_min, Level::Warn);
        // Untouched sections keep their defaults.
        assert_eq!(config.shaders.vertex, "shaders/triangle.vert.spv");
    }

    #[test]
    fn unknown_level_falls_back_to_debug() {
        let config: Config = toml::from_str("[log]\nlevel = \"loud\"\n").unwrap();
        assert_eq!(config.logger_settings().level_min, Level::Debug);
    }
}
