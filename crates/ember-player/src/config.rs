//! Layered engine configuration
//!
//! Config is loaded with four layers of precedence (highest wins):
//! 1. Command line flags
//! 2. Environment variables: `EMBER_FIXED_HZ`, `EMBER_BUILD_MODE`, `EMBER_MAX_STEPS`
//! 3. Project file: `ember.toml`, or the file passed with `--config`
//! 4. Global: `<config dir>/ember/ember.toml`

use ember_core::{EmberError, Result};
use ember_runtime::{BuildMode, Clock, LoadingConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Project config file looked up in the working directory
pub const PROJECT_CONFIG: &str = "ember.toml";

/// Window settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
    pub graphics_quality: GraphicsQuality,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Ember".to_string(),
            width: 1600,
            height: 900,
            fullscreen: false,
            graphics_quality: GraphicsQuality::High,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphicsQuality {
    Low,
    Medium,
    #[default]
    High,
}

/// Simulation loop settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Scene loaded at startup when none is given on the command line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_scene: Option<PathBuf>,
    pub build_mode: BuildMode,
    /// Fixed simulation rate, in steps per second
    pub fixed_hz: f64,
    /// FPS averaging window, in seconds
    pub fps_interval: f64,
    /// Cap on fixed steps per frame; unset means no cap
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_steps_per_frame: Option<u32>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            start_scene: None,
            build_mode: BuildMode::Editor,
            fixed_hz: 60.0,
            fps_interval: 1.0,
            max_steps_per_frame: None,
        }
    }
}

/// Resolved engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub window: WindowConfig,
    pub run: RunConfig,
    pub loading: LoadingConfig,
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub editor: bool,
    pub fixed_hz: Option<f64>,
    pub fullscreen: bool,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut EngineConfig) {
        if self.editor {
            config.run.build_mode = BuildMode::Editor;
        }
        if let Some(hz) = self.fixed_hz {
            config.run.fixed_hz = hz;
        }
        if self.fullscreen {
            config.window.fullscreen = true;
        }
    }
}

impl EngineConfig {
    /// Load config with layered precedence: global < project < env vars.
    ///
    /// `explicit` replaces the project file and must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut merged = toml::Table::new();

        // Layer 1: Global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                merge_tables(&mut merged, Self::load_table(&global_path)?);
            }
        }

        // Layer 2: Project config
        match explicit {
            Some(path) => merge_tables(&mut merged, Self::load_table(path)?),
            None => {
                let local_path = PathBuf::from(PROJECT_CONFIG);
                if local_path.exists() {
                    merge_tables(&mut merged, Self::load_table(&local_path)?);
                }
            }
        }

        let mut config = Self::from_table(merged)?;

        // Layer 3: Environment variable overrides
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a single config document, without other layers
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)
            .map_err(|e| EmberError::ConfigError(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Apply `EMBER_*` overrides read through `var`
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(value) = var("EMBER_FIXED_HZ") {
            self.run.fixed_hz = value
                .trim()
                .parse()
                .map_err(|_| EmberError::ConfigError(format!("EMBER_FIXED_HZ: not a number: {}", value)))?;
        }
        if let Some(value) = var("EMBER_BUILD_MODE") {
            self.run.build_mode = match value.trim().to_ascii_lowercase().as_str() {
                "editor" => BuildMode::Editor,
                "shipped" => BuildMode::Shipped,
                other => {
                    return Err(EmberError::ConfigError(format!(
                        "EMBER_BUILD_MODE: expected editor or shipped, got {}",
                        other
                    )))
                }
            };
        }
        if let Some(value) = var("EMBER_MAX_STEPS") {
            let value = value.trim();
            self.run.max_steps_per_frame = if value.is_empty() || value == "none" {
                None
            } else {
                Some(value.parse().map_err(|_| {
                    EmberError::ConfigError(format!("EMBER_MAX_STEPS: not a step count: {}", value))
                })?)
            };
        }
        Ok(())
    }

    /// Reject settings the simulation cannot run with
    pub fn validate(&self) -> Result<()> {
        if !self.run.fixed_hz.is_finite() || self.run.fixed_hz <= 0.0 {
            return Err(EmberError::ConfigError(format!(
                "fixed_hz must be positive, got {}",
                self.run.fixed_hz
            )));
        }
        if self.run.max_steps_per_frame == Some(0) {
            return Err(EmberError::ConfigError(
                "max_steps_per_frame must be at least 1".into(),
            ));
        }
        if self.loading.phase_step < 0.0 || self.loading.phase_duration < 0.0 {
            return Err(EmberError::ConfigError(
                "loading transition timings must not be negative".into(),
            ));
        }
        Ok(())
    }

    /// Build the simulation clock these settings describe
    pub fn clock(&self) -> Clock {
        Clock::with_fixed_rate(self.run.fixed_hz)
            .with_fps_interval(self.run.fps_interval)
            .with_max_steps_per_frame(self.run.max_steps_per_frame)
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("ember").join(PROJECT_CONFIG))
    }

    fn load_table(path: &Path) -> Result<toml::Table> {
        let content = std::fs::read_to_string(path)?;
        let table: toml::Table = toml::from_str(&content).map_err(|e| {
            EmberError::ConfigError(format!("Failed to parse config {}: {}", path.display(), e))
        })?;
        log::debug!("config layer {}", path.display());
        Ok(table)
    }

    fn from_table(table: toml::Table) -> Result<Self> {
        toml::Value::Table(table)
            .try_into()
            .map_err(|e| EmberError::ConfigError(format!("Invalid config: {}", e)))
    }
}

/// Merge `overlay` into `base`: nested tables merge per key, anything else
/// in the overlay replaces the base value.
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match value {
            toml::Value::Table(incoming) => match base.get_mut(&key) {
                Some(toml::Value::Table(existing)) => merge_tables(existing, incoming),
                _ => {
                    base.insert(key, toml::Value::Table(incoming));
                }
            },
            value => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.run.fixed_hz, 60.0);
        assert_eq!(config.run.build_mode, BuildMode::Editor);
        assert_eq!(config.run.max_steps_per_frame, None);
        assert_eq!(config.loading.full_bar_width, 0.68);
        assert_eq!(config.window.graphics_quality, GraphicsQuality::High);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
[run]
build_mode = "shipped"
fixed_hz = 120.0

[loading]
menu_scene = "scenes/main_menu.scene.toml"
"#,
        )
        .unwrap();

        assert_eq!(config.run.build_mode, BuildMode::Shipped);
        assert_eq!(config.run.fixed_hz, 120.0);
        assert_eq!(config.run.fps_interval, 1.0);
        assert_eq!(config.window.title, "Ember");
        assert!(config.loading.enabled);
        assert_eq!(
            config.loading.menu_scene,
            Some(PathBuf::from("scenes/main_menu.scene.toml"))
        );
    }

    #[test]
    fn malformed_file_is_config_error() {
        let result = EngineConfig::from_toml_str("[run]\nfixed_hz = \"fast\"\n");
        assert!(matches!(result, Err(EmberError::ConfigError(_))));
    }

    #[test]
    fn layers_merge_per_key() {
        let mut merged: toml::Table = toml::from_str(
            r#"
[window]
title = "Global"
width = 1280

[run]
fixed_hz = 30.0
"#,
        )
        .unwrap();
        let project: toml::Table = toml::from_str(
            r#"
[window]
title = "Project"
"#,
        )
        .unwrap();

        merge_tables(&mut merged, project);
        let config = EngineConfig::from_table(merged).unwrap();

        assert_eq!(config.window.title, "Project");
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.run.fixed_hz, 30.0);
    }

    #[test]
    fn env_overrides_file() {
        let env: HashMap<&str, &str> = [
            ("EMBER_FIXED_HZ", "50"),
            ("EMBER_BUILD_MODE", "Shipped"),
            ("EMBER_MAX_STEPS", "8"),
        ]
        .into_iter()
        .collect();

        let mut config = EngineConfig::from_toml_str("[run]\nfixed_hz = 120.0\n").unwrap();
        config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.run.fixed_hz, 50.0);
        assert_eq!(config.run.build_mode, BuildMode::Shipped);
        assert_eq!(config.run.max_steps_per_frame, Some(8));
    }

    #[test]
    fn bad_env_value_is_rejected() {
        let mut config = EngineConfig::default();
        let result = config.apply_env(|key| (key == "EMBER_BUILD_MODE").then(|| "arcade".to_string()));
        assert!(matches!(result, Err(EmberError::ConfigError(_))));
    }

    #[test]
    fn cli_overrides_win() {
        let mut config = EngineConfig::from_toml_str("[run]\nbuild_mode = \"shipped\"\n").unwrap();
        ConfigOverrides {
            editor: true,
            fixed_hz: Some(144.0),
            fullscreen: true,
        }
        .apply(&mut config);

        assert_eq!(config.run.build_mode, BuildMode::Editor);
        assert_eq!(config.run.fixed_hz, 144.0);
        assert!(config.window.fullscreen);
    }

    #[test]
    fn validate_rejects_bad_rate() {
        let mut config = EngineConfig::default();
        config.run.fixed_hz = 0.0;
        assert!(config.validate().is_err());

        config.run.fixed_hz = 60.0;
        config.run.max_steps_per_frame = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn clock_uses_run_settings() {
        let mut config = EngineConfig::default();
        config.run.fixed_hz = 30.0;
        config.run.fps_interval = 20.0;
        config.run.max_steps_per_frame = Some(4);

        let clock = config.clock();
        assert!((clock.fixed_step_seconds() - 1.0 / 30.0).abs() < 1e-12);
        assert_eq!(clock.fps_interval(), 10.0);
        assert_eq!(clock.max_steps_per_frame(), Some(4));
    }

    #[test]
    fn load_explicit_file() {
        let dir = std::env::temp_dir().join(format!("ember_config_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("custom.toml");
        std::fs::write(&path, "[window]\ntitle = \"Custom\"\n").unwrap();

        let config = EngineConfig::load(Some(path.as_path())).unwrap();
        assert_eq!(config.window.title, "Custom");

        let missing = dir.join("missing.toml");
        assert!(EngineConfig::load(Some(missing.as_path())).is_err());
        std::fs::remove_dir_all(&dir).ok();
    }
}
