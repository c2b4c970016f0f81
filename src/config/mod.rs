//! Configuration module
//!
//! Runner settings and suite file handling.

mod suite;

pub use suite::{CheckKind, CheckSpec, SuiteDefaults, SuiteError, SuiteFile};

use std::time::Duration;

/// Runner-wide execution settings.
///
/// Per-case `timeout`/`retries` overrides on a test case take precedence
/// over the values here.
#[derive(Clone, Debug)]
pub struct RunnerConfig {
    /// Maximum test cases executing simultaneously
    pub max_concurrency: usize,

    /// Per-attempt wall-clock deadline
    pub timeout: Duration,

    /// Retry attempts after the first failure
    pub retries: u32,

    /// Stop admitting new cases once any failure is recorded
    pub stop_on_error: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 3,
            timeout: Duration::from_millis(30_000),
            retries: 0,
            stop_on_error: false,
        }
    }
}

impl RunnerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the concurrency bound (floored at 1)
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_timeout_ms(self, timeout_ms: u64) -> Self {
        self.with_timeout(Duration::from_millis(timeout_ms))
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_stop_on_error(mut self, stop_on_error: bool) -> Self {
        self.stop_on_error = stop_on_error;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RunnerConfig::default();
        assert_eq!(config.max_concurrency, 3);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.retries, 0);
        assert!(!config.stop_on_error);
    }

    #[test]
    fn test_builder_floors_concurrency() {
        let config = RunnerConfig::new().with_max_concurrency(0);
        assert_eq!(config.max_concurrency, 1);
    }

    #[test]
    fn test_builder_chain() {
        let config = RunnerConfig::new()
            .with_timeout_ms(5_000)
            .with_retries(2)
            .with_stop_on_error(true);

        assert_eq!(config.timeout, Duration::from_millis(5_000));
        assert_eq!(config.retries, 2);
        assert!(config.stop_on_error);
    }
}
