use serde::{Deserialize, Serialize};

use crate::error::HivemindError;

const DEFAULT_LENGTH_WEIGHT: f64 = 0.30;
const DEFAULT_CONFIDENCE_WEIGHT: f64 = 0.40;
const DEFAULT_SPEED_WEIGHT: f64 = 0.30;
const DEFAULT_LENGTH_SATURATION: usize = 500;
const DEFAULT_SPEED_CEILING_MS: u64 = 5_000;
const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Weights and limits of the composite score.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RankingConfig {
    pub length_weight: f64,
    pub confidence_weight: f64,
    pub speed_weight: f64,
    /// Output length (in chars) at which the length score reaches 1
    pub length_saturation: usize,
    /// Processing time at or above which the speed score is 0
    pub speed_ceiling_ms: u64,
    /// Confidence assumed when a worker reports none
    pub default_confidence: f64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            length_weight: DEFAULT_LENGTH_WEIGHT,
            confidence_weight: DEFAULT_CONFIDENCE_WEIGHT,
            speed_weight: DEFAULT_SPEED_WEIGHT,
            length_saturation: DEFAULT_LENGTH_SATURATION,
            speed_ceiling_ms: DEFAULT_SPEED_CEILING_MS,
            default_confidence: DEFAULT_CONFIDENCE,
        }
    }
}

impl RankingConfig {
    /// Rejects values that would make scores undefined.
    pub fn validate(&self) -> Result<(), HivemindError> {
        let weights = [self.length_weight, self.confidence_weight, self.speed_weight];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(HivemindError::Config(
                "ranking weights must be finite and non-negative".to_string(),
            ));
        }
        if self.weight_sum() <= 0.0 {
            return Err(HivemindError::Config(
                "at least one ranking weight must be positive".to_string(),
            ));
        }
        if self.length_saturation == 0 || self.speed_ceiling_ms == 0 {
            return Err(HivemindError::Config(
                "length_saturation and speed_ceiling_ms must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.default_confidence) {
            return Err(HivemindError::Config(
                "default_confidence must be within [0, 1]".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn weight_sum(&self) -> f64 {
        self.length_weight + self.confidence_weight + self.speed_weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = RankingConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.weight_sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_negative_weight() {
        let config = RankingConfig {
            speed_weight: -0.1,
            ..RankingConfig::default()
        };
        assert!(matches!(config.validate(), Err(HivemindError::Config(_))));
    }

    #[test]
    fn rejects_zero_saturation() {
        let config = RankingConfig {
            length_saturation: 0,
            ..RankingConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: RankingConfig = toml::from_str("speed_ceiling_ms = 10000").unwrap();
        assert_eq!(config.speed_ceiling_ms, 10_000);
        assert_eq!(config.length_saturation, 500);
    }
}
