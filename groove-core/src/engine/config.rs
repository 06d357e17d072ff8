//! Scheduler timing configuration.

use std::time::Duration;

/// How far ahead the scheduler works and how often it wakes up
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SchedulerConfig {
    /// Steps starting before `now + lookahead` are submitted
    pub lookahead: f64,
    /// How often the host runs a scheduling pass
    pub tick_interval: Duration,
}

impl SchedulerConfig {
    pub const DEFAULT_LOOKAHEAD: f64 = 0.1;
    pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(25);
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            lookahead: Self::DEFAULT_LOOKAHEAD,
            tick_interval: Self::DEFAULT_TICK_INTERVAL,
        }
    }
}
