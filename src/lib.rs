//! soundcheck - a concurrent smoke-test harness.
//!
//! Schedules independent asynchronous checks over a bounded number of
//! concurrent executions, with per-check timeouts and retries, live
//! pause/resume/stop control, and per-check log capture.
//!
//! Checks can be supplied programmatically as [`TestCase`] values or
//! declared in a suite file (see [`config::SuiteFile`]) and run through
//! the CLI.
//!
//! ```no_run
//! use soundcheck::{RunnerConfig, TestCase, TestRunner};
//!
//! # async fn demo() {
//! let runner = TestRunner::new(RunnerConfig::default().with_max_concurrency(2));
//! let cases = vec![TestCase::new("ping", "ping the API", |logger| async move {
//!     logger.info("pretending to ping");
//!     Ok(())
//! })];
//! let results = runner.run_tests(cases, None).await;
//! assert_eq!(results.len(), 1);
//! # }
//! ```

pub mod checks;
pub mod cli;
pub mod config;
pub mod models;
pub mod output;
pub mod runner;
pub mod utils;

pub use config::RunnerConfig;
pub use models::{RunStatus, RunSummary, TestCase, TestResult, TestStatus, ThreadInfo};
pub use runner::{ProgressFn, TestLogger, TestRunner};
