use std::{fs, path::Path, time::Duration};

use anyhow::{ensure, Context, Result};
use froggit_core::{DEFAULT_CELL_SIZE, DEFAULT_MOVE_COOLDOWN};
use froggit_level::LevelConfig;
use serde::Deserialize;

/// Player-tunable settings read from an optional TOML file.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    /// Side length of a grid cell in pixels.
    pub(crate) cell_size: f32,
    /// Minimum delay between two accepted moves in milliseconds.
    pub(crate) move_cooldown_ms: u64,
    /// Whether presentation waits for the display refresh.
    pub(crate) vsync: bool,
    /// Whether frame timings are logged once per second.
    pub(crate) show_fps: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            move_cooldown_ms: DEFAULT_MOVE_COOLDOWN.as_millis() as u64,
            vsync: true,
            show_fps: false,
        }
    }
}

impl Settings {
    /// Reads settings from the TOML file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("invalid settings file {}", path.display()))
    }

    /// Parses settings from TOML text, filling omitted keys with defaults.
    pub(crate) fn from_toml_str(contents: &str) -> Result<Self> {
        let settings: Self =
            toml::from_str(contents).context("failed to parse settings toml contents")?;
        ensure!(
            settings.cell_size.is_finite() && settings.cell_size >= 1.0,
            "cell_size must be at least one pixel (received {})",
            settings.cell_size
        );
        Ok(settings)
    }

    /// Level parameters derived from the settings.
    pub(crate) fn level_config(&self) -> LevelConfig {
        LevelConfig::new(
            self.cell_size,
            Duration::from_millis(self.move_cooldown_ms),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let settings = Settings::from_toml_str("").expect("empty settings parse");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.level_config(), LevelConfig::default());
    }

    #[test]
    fn partial_file_overrides_only_named_keys() {
        let settings = Settings::from_toml_str("cell_size = 32.0\nshow_fps = true\n")
            .expect("partial settings parse");
        assert_eq!(settings.cell_size, 32.0);
        assert!(settings.show_fps);
        assert_eq!(settings.move_cooldown_ms, 250);
        assert!(settings.vsync);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Settings::from_toml_str("lives = 9\n").is_err());
    }

    #[test]
    fn degenerate_cell_size_is_rejected() {
        assert!(Settings::from_toml_str("cell_size = 0.0\n").is_err());
    }
}
