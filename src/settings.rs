//! Game settings and preferences
//!
//! Persisted as JSON. Missing fields fall back to defaults so older files keep
//! loading after new options are added.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_FPS;
use crate::error::Result;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Mixer sample rate (Hz)
    pub sample_rate: u32,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,

    // === Simulation ===
    /// Frame rate for Breakout and Pong
    pub fps: u32,
    /// Snake moves per second
    pub snake_ticks_per_second: u32,
    /// RNG seed; `None` seeds from the clock
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sample_rate: 22050,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,

            fps: DEFAULT_FPS,
            snake_ticks_per_second: 15,
            seed: None,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file.
    ///
    /// A missing file yields defaults; an unreadable or malformed one is an
    /// error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let json = fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings.sanitized())
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }

    /// Clamp values into their valid ranges
    pub fn sanitized(mut self) -> Self {
        self.master_volume = clamp_volume(self.master_volume, "master_volume");
        self.sfx_volume = clamp_volume(self.sfx_volume, "sfx_volume");
        if self.sample_rate == 0 {
            log::warn!("sample_rate 0 is invalid, using 22050");
            self.sample_rate = 22050;
        }
        if self.fps == 0 {
            log::warn!("fps 0 is invalid, using {DEFAULT_FPS}");
            self.fps = DEFAULT_FPS;
        }
        self.snake_ticks_per_second = self.snake_ticks_per_second.max(1);
        self
    }

    /// Fixed simulation timestep (seconds)
    pub fn frame_dt(&self) -> f32 {
        1.0 / self.fps.max(1) as f32
    }

    /// Snake move interval (seconds)
    pub fn snake_dt(&self) -> f32 {
        1.0 / self.snake_ticks_per_second.max(1) as f32
    }
}

fn clamp_volume(vol: f32, name: &str) -> f32 {
    if vol.is_nan() {
        log::warn!("{name} is NaN, using 1.0");
        return 1.0;
    }
    vol.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("beep_arcade_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"fps": 30}"#).unwrap();
        assert_eq!(settings.fps, 30);
        assert_eq!(settings.sample_rate, 22050);
        assert_eq!(settings.seed, None);
    }

    #[test]
    fn test_sanitize_clamps() {
        let settings = Settings {
            master_volume: 3.0,
            sfx_volume: -1.0,
            fps: 0,
            sample_rate: 0,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(settings.master_volume, 1.0);
        assert_eq!(settings.sfx_volume, 0.0);
        assert_eq!(settings.fps, DEFAULT_FPS);
        assert_eq!(settings.sample_rate, 22050);
    }

    #[test]
    fn test_save_load_file() {
        let path = temp_path("settings.json");
        let settings = Settings {
            seed: Some(42),
            muted: true,
            ..Default::default()
        };
        settings.save(&path).unwrap();
        let loaded = Settings::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_file_is_default() {
        let path = temp_path("does_not_exist.json");
        assert_eq!(Settings::load(&path).unwrap(), Settings::default());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let path = temp_path("bad.json");
        fs::write(&path, "{ not json").unwrap();
        let result = Settings::load(&path);
        let _ = fs::remove_file(&path);
        assert!(result.is_err());
    }

    #[test]
    fn test_timesteps() {
        let settings = Settings::default();
        assert!((settings.frame_dt() - 1.0 / 60.0).abs() < 1e-6);
        assert!((settings.snake_dt() - 1.0 / 15.0).abs() < 1e-6);
    }
}
