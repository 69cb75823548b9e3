// Run configuration shared by the library and the terminal front-end

use crate::visual::observed::InterceptPolicy;
use std::time::Duration;

/// Default visualization pause in milliseconds
pub const DEFAULT_PAUSE_MS: u64 = 500;

/// Default interpreter step budget per run
pub const DEFAULT_MAX_STEPS: usize = 1_000_000;

/// Settings for a playground session
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Pause after every highlight and update, also the delay inserted by the instrumentor
    pub pause_ms: u64,
    /// Whether wrapper accesses wait for their visualization
    pub intercept: InterceptPolicy,
    /// Statements and loop iterations a run may execute before it is aborted
    pub max_steps: usize,
    /// Playback multiplier used by the terminal UI
    pub playback_speed: f64,
}

impl Config {
    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            pause_ms: DEFAULT_PAUSE_MS,
            intercept: InterceptPolicy::Serialized,
            max_steps: DEFAULT_MAX_STEPS,
            playback_speed: 1.0,
        }
    }
}
