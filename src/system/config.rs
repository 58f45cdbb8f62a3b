//! Session configuration, fixed for the lifetime of a tracking session.

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

/// Tunables for one tracking session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Physical half-size of the square marker, in meters. Required input:
    /// the target's size cannot be inferred from images.
    pub marker_half_size: f64,
    /// Run a detection+solve pass every Nth submitted frame.
    pub detection_interval: u32,
    /// Rolling window size N for the pose smoother.
    pub smoothing_window: usize,
    /// Consecutive missed passes K before a target is declared lost.
    pub miss_threshold: u32,
    /// Visual transition duration in seconds. Cosmetic; forwarded untouched
    /// to the rendering collaborator.
    pub transition_duration: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            marker_half_size: 0.0125,
            detection_interval: 10,
            smoothing_window: 5,
            miss_threshold: 30,
            transition_duration: 0.25,
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.marker_half_size > 0.0,
            "marker_half_size must be positive (got {})",
            self.marker_half_size
        );
        ensure!(self.detection_interval > 0, "detection_interval must be at least 1");
        ensure!(self.smoothing_window > 0, "smoothing_window must be at least 1");
        ensure!(self.miss_threshold > 0, "miss_threshold must be at least 1");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(TrackerConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_half_size() {
        let cfg = TrackerConfig {
            marker_half_size: 0.0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_zero_interval() {
        let cfg = TrackerConfig {
            detection_interval: 0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn deserializes_with_defaults_for_missing_fields() {
        let cfg: TrackerConfig = serde_json::from_str(r#"{"marker_half_size": 0.05}"#).unwrap();
        assert_eq!(cfg.marker_half_size, 0.05);
        assert_eq!(cfg.miss_threshold, 30);
    }
}
