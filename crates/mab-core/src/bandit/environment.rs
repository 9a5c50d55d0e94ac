//! Regime-Switching Environment
//!
//! An ordered list of regimes. The active regime at round `r` is the last
//! one whose start round is `<= r`, found by binary search over the start
//! rounds. Pulls and option queries are delegated to that regime.

use mab_events::{EnvironmentRow, OptionId};
use rand::Rng;

use super::regime::Regime;
use super::reward::RewardDistribution;
use crate::error::{ConfigurationError, EngineError, EngineResult};

/// Non-stationary multi-armed reward environment.
#[derive(Debug, Clone)]
pub struct Environment {
    regimes: Vec<Regime>,
}

impl Environment {
    /// Validates ordering: first regime at round 0, start rounds strictly
    /// ascending. The input order is kept as given.
    pub fn new(regimes: Vec<Regime>) -> Result<Self, ConfigurationError> {
        let first = regimes.first().ok_or(ConfigurationError::NoRegimes)?;
        if first.start_round() != 0 {
            return Err(ConfigurationError::FirstRegimeNotAtZero {
                found: first.start_round(),
            });
        }

        for pair in regimes.windows(2) {
            let (previous, next) = (pair[0].start_round(), pair[1].start_round());
            if next <= previous {
                return Err(ConfigurationError::UnsortedRegimes { previous, next });
            }
        }

        Ok(Self { regimes })
    }

    /// Single-regime environment.
    pub fn stationary(regime: Regime) -> Result<Self, ConfigurationError> {
        Self::new(vec![regime])
    }

    pub fn regimes(&self) -> &[Regime] {
        &self.regimes
    }

    /// Start rounds in ascending order.
    pub fn start_rounds(&self) -> Vec<u64> {
        self.regimes.iter().map(Regime::start_round).collect()
    }

    /// Index of the regime active at `round`.
    pub fn active_regime_index(&self, round: u64) -> EngineResult<usize> {
        let first_start = self.regimes[0].start_round();
        if round < first_start {
            return Err(EngineError::InvalidRound { round, first_start });
        }
        let after = self
            .regimes
            .partition_point(|regime| regime.start_round() <= round);
        Ok(after - 1)
    }

    pub fn active_regime(&self, round: u64) -> EngineResult<&Regime> {
        let index = self.active_regime_index(round)?;
        Ok(&self.regimes[index])
    }

    /// Samples one reward for `option` from the regime active at `round`.
    pub fn pull<R: Rng + ?Sized>(
        &self,
        option: OptionId,
        round: u64,
        rng: &mut R,
    ) -> EngineResult<f64> {
        let source = self
            .active_regime(round)?
            .source(option)
            .ok_or(EngineError::UnknownOption { option, round })?;
        Ok(source.pull(rng))
    }

    pub fn option_count(&self, round: u64) -> EngineResult<usize> {
        Ok(self.active_regime(round)?.option_count())
    }

    /// Options of the active regime, ascending.
    pub fn options(&self, round: u64) -> EngineResult<Vec<OptionId>> {
        Ok(self.active_regime(round)?.options().collect())
    }

    pub fn has_option(&self, option: OptionId, round: u64) -> EngineResult<bool> {
        Ok(self.active_regime(round)?.contains(option))
    }

    /// True if a regime begins exactly at `round` (other than round 0).
    pub fn is_switch_round(&self, round: u64) -> bool {
        round > 0
            && self
                .regimes
                .binary_search_by_key(&round, Regime::start_round)
                .is_ok()
    }

    /// One row per option per regime.
    pub fn describe(&self) -> Vec<EnvironmentRow> {
        let mut rows = Vec::new();
        for (regime_index, regime) in self.regimes.iter().enumerate() {
            for source in regime.sources() {
                let dist = source.distribution();
                let (mean, std, value) = match *dist {
                    RewardDistribution::Normal { mean, std } => (Some(mean), Some(std), None),
                    RewardDistribution::Constant { value } => (None, None, Some(value)),
                };
                rows.push(EnvironmentRow {
                    regime_index,
                    regime_start_round: regime.start_round(),
                    option_id: source.option_id(),
                    family: dist.family_name().to_string(),
                    mean,
                    std,
                    value,
                });
            }
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bandit::RewardSource;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn constant_regime(start_round: u64, values: &[f64]) -> Regime {
        let distributions: Vec<_> = values
            .iter()
            .map(|&value| RewardDistribution::Constant { value })
            .collect();
        Regime::from_distributions(start_round, &distributions).unwrap()
    }

    fn two_regimes() -> Environment {
        Environment::new(vec![
            constant_regime(0, &[1.0, 2.0]),
            constant_regime(20, &[3.0, 4.0, 5.0]),
        ])
        .unwrap()
    }

    #[test]
    fn test_regime_boundary() {
        let env = two_regimes();
        assert_eq!(env.active_regime_index(0).unwrap(), 0);
        assert_eq!(env.active_regime_index(19).unwrap(), 0);
        assert_eq!(env.active_regime_index(20).unwrap(), 1);
        assert_eq!(env.active_regime_index(10_000).unwrap(), 1);
    }

    #[test]
    fn test_many_regimes_lookup() {
        let regimes = (0..10).map(|i| constant_regime(i * 7, &[i as f64])).collect();
        let env = Environment::new(regimes).unwrap();
        for round in 0..80u64 {
            let expected = ((round / 7) as usize).min(9);
            assert_eq!(env.active_regime_index(round).unwrap(), expected, "round {}", round);
        }
    }

    #[test]
    fn test_pull_uses_active_regime() {
        let env = two_regimes();
        let mut rng = SmallRng::seed_from_u64(0);
        assert_eq!(env.pull(OptionId(1), 19, &mut rng).unwrap(), 2.0);
        assert_eq!(env.pull(OptionId(1), 20, &mut rng).unwrap(), 4.0);
    }

    #[test]
    fn test_unknown_option() {
        let env = two_regimes();
        let mut rng = SmallRng::seed_from_u64(0);
        let err = env.pull(OptionId(2), 5, &mut rng).unwrap_err();
        assert_eq!(
            err,
            EngineError::UnknownOption {
                option: OptionId(2),
                round: 5
            }
        );
        assert!(env.pull(OptionId(2), 25, &mut rng).is_ok());
    }

    #[test]
    fn test_option_count_follows_switch() {
        let env = two_regimes();
        assert_eq!(env.option_count(19).unwrap(), 2);
        assert_eq!(env.option_count(20).unwrap(), 3);
        assert!(env.has_option(OptionId(2), 20).unwrap());
        assert!(!env.has_option(OptionId(2), 19).unwrap());
    }

    #[test]
    fn test_is_switch_round() {
        let env = two_regimes();
        assert!(!env.is_switch_round(0));
        assert!(!env.is_switch_round(19));
        assert!(env.is_switch_round(20));
    }

    #[test]
    fn test_first_regime_must_start_at_zero() {
        let err = Environment::new(vec![constant_regime(1, &[1.0])]).unwrap_err();
        assert_eq!(err, ConfigurationError::FirstRegimeNotAtZero { found: 1 });
    }

    #[test]
    fn test_unsorted_and_duplicate_starts_rejected() {
        let err = Environment::new(vec![
            constant_regime(0, &[1.0]),
            constant_regime(30, &[1.0]),
            constant_regime(20, &[1.0]),
        ])
        .unwrap_err();
        assert_eq!(err, ConfigurationError::UnsortedRegimes { previous: 30, next: 20 });

        let err = Environment::new(vec![constant_regime(0, &[1.0]), constant_regime(0, &[2.0])])
            .unwrap_err();
        assert_eq!(err, ConfigurationError::UnsortedRegimes { previous: 0, next: 0 });
    }

    #[test]
    fn test_empty_environment_rejected() {
        assert_eq!(Environment::new(Vec::new()).unwrap_err(), ConfigurationError::NoRegimes);
    }

    #[test]
    fn test_describe_rows() {
        let normal = Regime::new(0, vec![RewardSource::normal(OptionId(0), 1.0, 0.5).unwrap()])
            .unwrap();
        let env = Environment::new(vec![normal, constant_regime(20, &[3.0, 4.0])]).unwrap();
        let rows = env.describe();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].family, "NORMAL_DISTRIBUTION");
        assert_eq!(rows[0].mean, Some(1.0));
        assert_eq!(rows[0].std, Some(0.5));
        assert_eq!(rows[2].regime_index, 1);
        assert_eq!(rows[2].regime_start_round, 20);
        assert_eq!(rows[2].option_id, OptionId(1));
        assert_eq!(rows[2].value, Some(4.0));
    }
}
