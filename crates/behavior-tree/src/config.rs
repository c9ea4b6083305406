use std::time::Duration;

/// Tree tuning parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TreeConfig {
    /// Period between Loop node cycles, in milliseconds.
    pub loop_period_ms: u64,
    /// Period between LoopConditionNode polls, in milliseconds.
    pub poll_period_ms: u64,
    /// Seed for weighted random selection. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl TreeConfig {
    pub const DEFAULT_LOOP_PERIOD_MS: u64 = 500;
    pub const DEFAULT_POLL_PERIOD_MS: u64 = 250;

    pub fn new() -> Self {
        Self {
            loop_period_ms: Self::DEFAULT_LOOP_PERIOD_MS,
            poll_period_ms: Self::DEFAULT_POLL_PERIOD_MS,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn loop_period(&self) -> Duration {
        Duration::from_millis(self.loop_period_ms)
    }

    pub fn poll_period(&self) -> Duration {
        Duration::from_millis(self.poll_period_ms)
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self::new()
    }
}
