//! Value Memory
//!
//! Per-option running value estimates. Two mutually exclusive update rules
//! are supported: an exponentially-weighted moving average (the default) and
//! the plain mean of a sliding window of recent rewards.

use mab_events::OptionId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

use crate::error::ConfigurationError;

/// How an agent folds a new reward into its estimate for an option.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum MemoryRule {
    /// `m = m * decay + r * (1 - decay)`; first observation sets `m = r`
    Ewma { decay: f64 },
    /// Mean of the last `len` rewards observed for the option
    Window { len: usize },
}

impl Default for MemoryRule {
    fn default() -> Self {
        MemoryRule::Ewma { decay: 0.8 }
    }
}

impl MemoryRule {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        match *self {
            MemoryRule::Ewma { decay } => {
                if !(0.0..=1.0).contains(&decay) {
                    return Err(ConfigurationError::InvalidAgentParameter {
                        name: "memory_decay",
                        value: decay,
                        reason: "must lie in [0, 1]",
                    });
                }
            }
            MemoryRule::Window { len } => {
                if len == 0 {
                    return Err(ConfigurationError::InvalidAgentParameter {
                        name: "memory_window",
                        value: 0.0,
                        reason: "must be at least 1",
                    });
                }
            }
        }
        Ok(())
    }

    /// Short name used in agent metadata.
    pub fn name(&self) -> &'static str {
        match self {
            MemoryRule::Ewma { .. } => "ewma",
            MemoryRule::Window { .. } => "window",
        }
    }

    pub fn decay(&self) -> Option<f64> {
        match *self {
            MemoryRule::Ewma { decay } => Some(decay),
            MemoryRule::Window { .. } => None,
        }
    }

    pub fn window_len(&self) -> Option<usize> {
        match *self {
            MemoryRule::Window { len } => Some(len),
            MemoryRule::Ewma { .. } => None,
        }
    }
}

/// Option → value estimate, owned by a single agent.
#[derive(Debug, Clone)]
pub struct ValueMemory {
    rule: MemoryRule,
    estimates: BTreeMap<OptionId, f64>,
    /// Only populated under [`MemoryRule::Window`]
    windows: BTreeMap<OptionId, VecDeque<f64>>,
}

impl ValueMemory {
    pub fn new(rule: MemoryRule) -> Self {
        Self {
            rule,
            estimates: BTreeMap::new(),
            windows: BTreeMap::new(),
        }
    }

    pub fn rule(&self) -> MemoryRule {
        self.rule
    }

    /// Forget everything and seed every option in `options` with `prior`.
    pub fn reset_with_prior(&mut self, options: impl IntoIterator<Item = OptionId>, prior: f64) {
        self.estimates = options.into_iter().map(|option| (option, prior)).collect();
        self.windows.clear();
    }

    pub fn get(&self, option: OptionId) -> Option<f64> {
        self.estimates.get(&option).copied()
    }

    pub fn contains(&self, option: OptionId) -> bool {
        self.estimates.contains_key(&option)
    }

    pub fn len(&self) -> usize {
        self.estimates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.estimates.is_empty()
    }

    /// Estimates in ascending option order.
    pub fn entries(&self) -> impl Iterator<Item = (OptionId, f64)> + '_ {
        self.estimates.iter().map(|(option, value)| (*option, *value))
    }

    /// Folds one observed reward into the estimate for `option`.
    pub fn record(&mut self, option: OptionId, reward: f64) {
        let updated = match self.rule {
            MemoryRule::Ewma { decay } => match self.estimates.get(&option) {
                Some(&previous) => previous * decay + reward * (1.0 - decay),
                None => reward,
            },
            MemoryRule::Window { len } => {
                let window = self.windows.entry(option).or_default();
                window.push_back(reward);
                while window.len() > len {
                    window.pop_front();
                }
                window.iter().sum::<f64>() / window.len() as f64
            }
        };
        self.estimates.insert(option, updated);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ewma_recurrence_is_exact() {
        let decay = 0.7;
        let (x1, x2) = (3.25, -1.5);
        let mut memory = ValueMemory::new(MemoryRule::Ewma { decay });

        memory.record(OptionId(0), x1);
        assert_eq!(memory.get(OptionId(0)), Some(x1));

        memory.record(OptionId(0), x2);
        assert_eq!(memory.get(OptionId(0)), Some(x1 * decay + x2 * (1.0 - decay)));
    }

    #[test]
    fn test_ewma_blends_with_prior() {
        let mut memory = ValueMemory::new(MemoryRule::Ewma { decay: 0.5 });
        memory.reset_with_prior([OptionId(0), OptionId(1)], 1.0);
        memory.record(OptionId(1), 3.0);
        assert_eq!(memory.get(OptionId(1)), Some(2.0));
        assert_eq!(memory.get(OptionId(0)), Some(1.0));
    }

    #[test]
    fn test_window_keeps_last_rewards() {
        let mut memory = ValueMemory::new(MemoryRule::Window { len: 2 });
        memory.reset_with_prior([OptionId(0)], 1.0);

        memory.record(OptionId(0), 4.0);
        assert_eq!(memory.get(OptionId(0)), Some(4.0));
        memory.record(OptionId(0), 2.0);
        assert_eq!(memory.get(OptionId(0)), Some(3.0));
        memory.record(OptionId(0), 10.0);
        assert_eq!(memory.get(OptionId(0)), Some(6.0));
    }

    #[test]
    fn test_reset_clears_windows() {
        let mut memory = ValueMemory::new(MemoryRule::Window { len: 3 });
        memory.record(OptionId(0), 9.0);
        memory.reset_with_prior([OptionId(0)], 1.0);
        memory.record(OptionId(0), 3.0);
        assert_eq!(memory.get(OptionId(0)), Some(3.0));
    }

    #[test]
    fn test_rule_validation() {
        assert!(MemoryRule::Ewma { decay: 0.0 }.validate().is_ok());
        assert!(MemoryRule::Ewma { decay: 1.0 }.validate().is_ok());
        assert!(MemoryRule::Ewma { decay: 1.2 }.validate().is_err());
        assert!(MemoryRule::Ewma { decay: f64::NAN }.validate().is_err());
        assert!(MemoryRule::Window { len: 0 }.validate().is_err());
    }

    #[test]
    fn test_rule_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            memory: MemoryRule,
        }
        let parsed: Wrapper = toml::from_str("memory = { rule = \"window\", len = 5 }").unwrap();
        assert_eq!(parsed.memory, MemoryRule::Window { len: 5 });
        assert_eq!(parsed.memory.name(), "window");
        assert_eq!(parsed.memory.window_len(), Some(5));
        assert_eq!(parsed.memory.decay(), None);
    }
}
