//! Regimes
//!
//! A regime is the set of reward sources in force from its start round until
//! the next regime begins.

use mab_events::OptionId;
use std::collections::BTreeMap;

use super::reward::{RewardDistribution, RewardSource};
use crate::error::ConfigurationError;

/// Immutable option → reward source mapping active from `start_round`.
#[derive(Debug, Clone)]
pub struct Regime {
    start_round: u64,
    sources: BTreeMap<OptionId, RewardSource>,
}

impl Regime {
    /// Builds a regime, rejecting empty option sets and duplicate ids.
    pub fn new(start_round: u64, sources: Vec<RewardSource>) -> Result<Self, ConfigurationError> {
        if sources.is_empty() {
            return Err(ConfigurationError::EmptyRegime { start_round });
        }

        let mut by_option = BTreeMap::new();
        for source in sources {
            let option = source.option_id();
            if by_option.insert(option, source).is_some() {
                return Err(ConfigurationError::DuplicateOption {
                    start_round,
                    option,
                });
            }
        }

        Ok(Self {
            start_round,
            sources: by_option,
        })
    }

    /// Builds a regime whose option ids are the positions in `distributions`.
    pub fn from_distributions(
        start_round: u64,
        distributions: &[RewardDistribution],
    ) -> Result<Self, ConfigurationError> {
        let sources = distributions
            .iter()
            .enumerate()
            .map(|(i, dist)| RewardSource::new(OptionId(i as u32), *dist))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(start_round, sources)
    }

    pub fn start_round(&self) -> u64 {
        self.start_round
    }

    pub fn option_count(&self) -> usize {
        self.sources.len()
    }

    pub fn source(&self, option: OptionId) -> Option<&RewardSource> {
        self.sources.get(&option)
    }

    pub fn contains(&self, option: OptionId) -> bool {
        self.sources.contains_key(&option)
    }

    /// Option ids in ascending order.
    pub fn options(&self) -> impl Iterator<Item = OptionId> + '_ {
        self.sources.keys().copied()
    }

    pub fn sources(&self) -> impl Iterator<Item = &RewardSource> {
        self.sources.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_ids() {
        let regime = Regime::from_distributions(
            5,
            &[
                RewardDistribution::Normal { mean: 1.0, std: 0.5 },
                RewardDistribution::Constant { value: 2.0 },
            ],
        )
        .unwrap();

        assert_eq!(regime.start_round(), 5);
        assert_eq!(regime.option_count(), 2);
        assert_eq!(regime.options().collect::<Vec<_>>(), vec![OptionId(0), OptionId(1)]);
        assert!(regime.contains(OptionId(1)));
        assert!(!regime.contains(OptionId(2)));
    }

    #[test]
    fn test_duplicate_option_rejected() {
        let sources = vec![
            RewardSource::constant(OptionId(0), 1.0).unwrap(),
            RewardSource::constant(OptionId(0), 2.0).unwrap(),
        ];
        let err = Regime::new(0, sources).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::DuplicateOption {
                start_round: 0,
                option: OptionId(0)
            }
        );
    }

    #[test]
    fn test_empty_regime_rejected() {
        assert_eq!(
            Regime::new(3, Vec::new()).unwrap_err(),
            ConfigurationError::EmptyRegime { start_round: 3 }
        );
    }

    #[test]
    fn test_sparse_option_ids() {
        let sources = vec![
            RewardSource::constant(OptionId(4), 1.0).unwrap(),
            RewardSource::constant(OptionId(1), 2.0).unwrap(),
        ];
        let regime = Regime::new(0, sources).unwrap();
        assert_eq!(regime.options().collect::<Vec<_>>(), vec![OptionId(1), OptionId(4)]);
    }
}
