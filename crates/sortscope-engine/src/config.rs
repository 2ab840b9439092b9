//! Visualizer configuration.

use std::ops::{Range, RangeInclusive};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Configuration for a [`Visualizer`](crate::Visualizer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizerConfig {
    /// Initial number of bars
    pub size: usize,
    /// Sizes accepted by `regenerate`
    pub size_bounds: RangeInclusive<usize>,
    /// Initial steps per second
    pub tempo: u32,
    /// Tempos accepted by `set_tempo`
    pub tempo_bounds: RangeInclusive<u32>,
    /// Range random values are drawn from
    pub value_range: Range<u32>,
    /// Seed for deterministic sequences (entropy when unset)
    pub seed: Option<u64>,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            size: 50,
            size_bounds: 5..=100,
            tempo: 5,
            tempo_bounds: 1..=1000,
            // 400px canvas minus 100px of headroom, offset by 10
            value_range: 10..310,
            seed: None,
        }
    }
}

impl VisualizerConfig {
    /// Configuration that suits tests and scripted runs: fixed seed and the
    /// fastest tempo.
    #[must_use]
    pub fn fast() -> Self {
        Self {
            tempo: 1000,
            seed: Some(42),
            ..Self::default()
        }
    }

    /// Check that a requested size is inside the configured bounds.
    pub fn check_size(&self, size: usize) -> Result<usize> {
        if self.size_bounds.contains(&size) {
            Ok(size)
        } else {
            Err(Error::InvalidSize {
                size,
                min: *self.size_bounds.start(),
                max: *self.size_bounds.end(),
            })
        }
    }

    /// Check that a requested tempo is inside the configured bounds.
    pub fn check_tempo(&self, rate: u32) -> Result<u32> {
        if rate > 0 && self.tempo_bounds.contains(&rate) {
            Ok(rate)
        } else {
            Err(Error::InvalidTempo {
                rate,
                min: *self.tempo_bounds.start(),
                max: *self.tempo_bounds.end(),
            })
        }
    }
}

/// Per-step delay for a tempo: `1000 / rate` milliseconds.
pub fn delay_for_tempo(rate: u32) -> Duration {
    Duration::from_millis(1000 / u64::from(rate.max(1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_widget() {
        let config = VisualizerConfig::default();
        assert_eq!(config.size, 50);
        assert_eq!(config.tempo, 5);
        assert_eq!(delay_for_tempo(config.tempo), Duration::from_millis(200));
    }

    #[test]
    fn size_bounds_enforced() {
        let config = VisualizerConfig::default();
        assert_eq!(config.check_size(5), Ok(5));
        assert_eq!(config.check_size(100), Ok(100));
        assert_eq!(
            config.check_size(4),
            Err(Error::InvalidSize { size: 4, min: 5, max: 100 })
        );
        assert!(config.check_size(101).is_err());
    }

    #[test]
    fn tempo_must_be_positive() {
        let config = VisualizerConfig {
            tempo_bounds: 0..=10,
            ..VisualizerConfig::default()
        };
        assert!(config.check_tempo(0).is_err());
        assert_eq!(config.check_tempo(10), Ok(10));
    }

    #[test]
    fn delay_is_inverse_of_rate() {
        assert_eq!(delay_for_tempo(1), Duration::from_millis(1000));
        assert_eq!(delay_for_tempo(3), Duration::from_millis(333));
        assert_eq!(delay_for_tempo(1000), Duration::from_millis(1));
    }

    #[test]
    fn partial_config_deserializes_with_defaults() {
        let config: VisualizerConfig = serde_json::from_str(r#"{"size": 20, "seed": 7}"#).unwrap();
        assert_eq!(config.size, 20);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.tempo, 5);
    }
}
