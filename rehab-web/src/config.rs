//! Tracker configuration
//!
//! Session targets and the empirically tuned scoring constants. Everything
//! has a default so a session works without any config file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{RehabError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Repetitions per set
    pub target_reps: u32,
    /// Sets per program
    pub target_sets: u32,
    /// Landmarks at or below this visibility are unmeasurable
    pub min_visibility: f32,
    /// Minimum spacing between processed frames; faster frames are dropped
    pub frame_interval_ms: f64,
    /// Pending events kept before the oldest are dropped
    pub event_capacity: usize,
    /// Measurements kept for plateau detection
    pub history_len: usize,
    pub quality: QualityConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            target_reps: 10,
            target_sets: 2,
            min_visibility: 0.5,
            frame_interval_ms: 100.0,
            event_capacity: 64,
            history_len: 10,
            quality: QualityConfig::default(),
        }
    }
}

/// Side quality weights and the side-switch hysteresis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    pub visibility_weight: f32,
    /// Cap on a single landmark's visibility contribution
    pub visibility_cap: f32,
    pub movement_weight: f32,
    pub movement_cap: f32,
    pub position_bonus: f32,
    /// Angles strictly inside this band count as "actively moving"
    pub position_band: (f32, f32),
    pub variation_weight: f32,
    pub variation_cap: f32,
    /// Quality lead a challenger side needs before selection switches
    pub switch_margin: f32,
    /// Consecutive frames the lead must hold
    pub confirm_frames: u32,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            visibility_weight: 15.0,
            visibility_cap: 15.0,
            movement_weight: 1.5,
            movement_cap: 25.0,
            position_bonus: 20.0,
            position_band: (10.0, 170.0),
            variation_weight: 0.5,
            variation_cap: 10.0,
            switch_margin: 15.0,
            confirm_frames: 1,
        }
    }
}

impl TrackerConfig {
    pub fn with_targets(target_reps: u32, target_sets: u32) -> Self {
        Self {
            target_reps,
            target_sets,
            ..Self::default()
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse config handed over from JavaScript
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.target_reps == 0 || self.target_sets == 0 {
            return Err(RehabError::InvalidConfig(
                "target_reps and target_sets must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.min_visibility) {
            return Err(RehabError::InvalidConfig(format!(
                "min_visibility {} outside [0, 1]",
                self.min_visibility
            )));
        }
        if self.frame_interval_ms < 0.0 || !self.frame_interval_ms.is_finite() {
            return Err(RehabError::InvalidConfig(
                "frame_interval_ms must be a non-negative number".into(),
            ));
        }
        if self.event_capacity == 0 || self.history_len == 0 {
            return Err(RehabError::InvalidConfig(
                "event_capacity and history_len must be at least 1".into(),
            ));
        }

        let q = &self.quality;
        let weights = [
            q.visibility_weight,
            q.visibility_cap,
            q.movement_weight,
            q.movement_cap,
            q.position_bonus,
            q.variation_weight,
            q.variation_cap,
            q.switch_margin,
        ];
        if weights.iter().any(|w| *w < 0.0 || !w.is_finite()) {
            return Err(RehabError::InvalidConfig(
                "quality weights must be non-negative".into(),
            ));
        }
        if q.position_band.0 >= q.position_band.1 {
            return Err(RehabError::InvalidConfig(
                "position_band lower bound must be below upper bound".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = TrackerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.target_reps, 10);
        assert_eq!(config.target_sets, 2);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = TrackerConfig::from_toml_str(
            "target_reps = 6\n\n[quality]\nswitch_margin = 12.0\n",
        )
        .unwrap();
        assert_eq!(config.target_reps, 6);
        assert_eq!(config.target_sets, 2);
        assert_eq!(config.quality.switch_margin, 12.0);
        assert_eq!(config.quality.movement_cap, 25.0);
    }

    #[test]
    fn test_json_config() {
        let config = TrackerConfig::from_json_str(r#"{"target_sets": 3}"#).unwrap();
        assert_eq!(config.target_sets, 3);
    }

    #[test]
    fn test_rejects_zero_targets() {
        let err = TrackerConfig::from_toml_str("target_reps = 0").unwrap_err();
        assert!(matches!(err, RehabError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_bad_visibility() {
        let config = TrackerConfig {
            min_visibility: 1.5,
            ..TrackerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join("rehab_web_config_test.toml");
        let config = TrackerConfig::with_targets(8, 3);
        config.save(&path).unwrap();
        let loaded = TrackerConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
        let _ = std::fs::remove_file(&path);
    }
}
