use std::time::Duration;

use serde::{Deserialize, Serialize};

const DEFAULT_MAX_ATTEMPTS: usize = 5;
const DEFAULT_BASE_DELAY_MS: u64 = 100;

/// Polling schedule for the render-completion coordinator.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Maximum number of polls including the immediate first one
    pub max_attempts: usize,
    /// Delay step in milliseconds; poll `n` waits `n * base_delay_ms` first
    pub base_delay_ms: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
        }
    }
}

impl CompletionConfig {
    /// Wait before the poll with the given zero-based index.
    pub fn delay_for(&self, attempt_index: usize) -> Duration {
        Duration::from_millis(self.base_delay_ms.saturating_mul(attempt_index as u64))
    }

    /// Sum of all waits when every poll comes up empty.
    pub fn total_delay(&self) -> Duration {
        (0..self.max_attempts).map(|i| self.delay_for(i)).sum()
    }
}
