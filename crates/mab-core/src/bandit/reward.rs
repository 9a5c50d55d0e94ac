//! Reward Sources
//!
//! A reward source binds one option to a parametric distribution and
//! produces one scalar reward per pull.

use mab_events::OptionId;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Parametric family and parameters of a reward source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum RewardDistribution {
    /// Gaussian rewards
    Normal { mean: f64, std: f64 },
    /// Always pays `value`
    Constant { value: f64 },
}

impl RewardDistribution {
    /// Family name used in the environment export.
    pub fn family_name(&self) -> &'static str {
        match self {
            RewardDistribution::Normal { .. } => "NORMAL_DISTRIBUTION",
            RewardDistribution::Constant { .. } => "CONSTANT",
        }
    }

    /// Expected reward.
    pub fn mean(&self) -> f64 {
        match *self {
            RewardDistribution::Normal { mean, .. } => mean,
            RewardDistribution::Constant { value } => value,
        }
    }
}

#[derive(Debug, Clone)]
enum Sampler {
    Normal(Normal<f64>),
    Constant(f64),
}

/// Sampler bound to a single option. Immutable after construction.
#[derive(Debug, Clone)]
pub struct RewardSource {
    option_id: OptionId,
    distribution: RewardDistribution,
    sampler: Sampler,
}

impl RewardSource {
    /// Validates the parameters and builds the sampler.
    pub fn new(
        option_id: OptionId,
        distribution: RewardDistribution,
    ) -> Result<Self, ConfigurationError> {
        let invalid = |reason: String| ConfigurationError::InvalidRewardParameters {
            option: option_id,
            family: distribution.family_name(),
            reason,
        };

        let sampler = match distribution {
            RewardDistribution::Normal { mean, std } => {
                if !mean.is_finite() {
                    return Err(invalid(format!("mean must be finite, got {}", mean)));
                }
                if !std.is_finite() || std < 0.0 {
                    return Err(invalid(format!(
                        "std must be finite and >= 0, got {}",
                        std
                    )));
                }
                Sampler::Normal(Normal::new(mean, std).map_err(|e| invalid(e.to_string()))?)
            }
            RewardDistribution::Constant { value } => {
                if !value.is_finite() {
                    return Err(invalid(format!("value must be finite, got {}", value)));
                }
                Sampler::Constant(value)
            }
        };

        Ok(Self {
            option_id,
            distribution,
            sampler,
        })
    }

    /// Shorthand for a Gaussian source.
    pub fn normal(option_id: OptionId, mean: f64, std: f64) -> Result<Self, ConfigurationError> {
        Self::new(option_id, RewardDistribution::Normal { mean, std })
    }

    /// Shorthand for a deterministic source.
    pub fn constant(option_id: OptionId, value: f64) -> Result<Self, ConfigurationError> {
        Self::new(option_id, RewardDistribution::Constant { value })
    }

    pub fn option_id(&self) -> OptionId {
        self.option_id
    }

    pub fn distribution(&self) -> &RewardDistribution {
        &self.distribution
    }

    /// Draw one reward.
    pub fn pull<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match &self.sampler {
            Sampler::Normal(normal) => normal.sample(rng),
            Sampler::Constant(value) => *value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_rejects_negative_std() {
        let err = RewardSource::normal(OptionId(1), 1.0, -0.5).unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::InvalidRewardParameters { option: OptionId(1), .. }
        ));
    }

    #[test]
    fn test_rejects_non_finite_parameters() {
        assert!(RewardSource::normal(OptionId(0), f64::NAN, 1.0).is_err());
        assert!(RewardSource::normal(OptionId(0), 0.0, f64::INFINITY).is_err());
        assert!(RewardSource::constant(OptionId(0), f64::INFINITY).is_err());
    }

    #[test]
    fn test_zero_std_is_degenerate() {
        let source = RewardSource::normal(OptionId(0), 2.5, 0.0).unwrap();
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..10 {
            assert_eq!(source.pull(&mut rng), 2.5);
        }
    }

    #[test]
    fn test_normal_sample_mean() {
        let source = RewardSource::normal(OptionId(0), 5.0, 1.0).unwrap();
        let mut rng = SmallRng::seed_from_u64(42);
        let n = 5000;
        let mean: f64 = (0..n).map(|_| source.pull(&mut rng)).sum::<f64>() / n as f64;
        assert!((mean - 5.0).abs() < 0.1, "sample mean {} too far from 5.0", mean);
    }

    #[test]
    fn test_distribution_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            source: RewardDistribution,
        }
        let parsed: Wrapper =
            toml::from_str("source = { family = \"normal\", mean = 1.2, std = 0.5 }").unwrap();
        assert_eq!(
            parsed.source,
            RewardDistribution::Normal { mean: 1.2, std: 0.5 }
        );
        assert_eq!(parsed.source.family_name(), "NORMAL_DISTRIBUTION");
    }
}
