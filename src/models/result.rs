//! Result models for test execution
//!
//! Defines run/test status types, per-case results, and run summaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::logger::LogLevel;

/// Lifecycle of a whole run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Idle,
    Running,
    Paused,
    Completed,
    Stopped,
}

impl RunStatus {
    /// Terminal states admit no further transitions within a run
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Stopped)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Idle => write!(f, "idle"),
            RunStatus::Running => write!(f, "running"),
            RunStatus::Paused => write!(f, "paused"),
            RunStatus::Completed => write!(f, "completed"),
            RunStatus::Stopped => write!(f, "stopped"),
        }
    }
}

/// Outcome of a single test case
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
}

impl TestStatus {
    pub fn symbol(&self) -> &'static str {
        match self {
            TestStatus::Passed => "✓",
            TestStatus::Failed => "✗",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TestStatus::Passed)
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestStatus::Passed => write!(f, "PASS"),
            TestStatus::Failed => write!(f, "FAIL"),
        }
    }
}

/// Message used when an attempt exceeds its deadline
pub const TIMEOUT_MESSAGE: &str = "Test timeout";

/// Failure captured from an attempt
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TestError {
    pub message: String,
    /// Full error chain, when one is available
    pub detail: Option<String>,
}

impl TestError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail: None,
        }
    }

    /// Synthesized when an attempt exceeds its deadline
    pub fn timeout() -> Self {
        Self::new(TIMEOUT_MESSAGE)
    }

    pub fn from_error(err: &anyhow::Error) -> Self {
        Self {
            message: err.to_string(),
            detail: Some(format!("{err:#}")),
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.message == TIMEOUT_MESSAGE
    }
}

impl fmt::Display for TestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// One captured log line from an attempt
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// State of a logical thread tracked by the scheduler
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreadStatus {
    Active,
    Completed,
}

/// One in-flight execution tracked by the scheduler.
///
/// "Thread" is a logical naming convention: each entry is a concurrently
/// in-flight asynchronous execution, not an OS thread.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ThreadInfo {
    pub thread_id: u64,
    pub test_id: String,
    pub test_name: String,
    pub status: ThreadStatus,
    pub started_at: DateTime<Utc>,
}

impl ThreadInfo {
    pub fn active(thread_id: u64, test_id: impl Into<String>, test_name: impl Into<String>) -> Self {
        Self {
            thread_id,
            test_id: test_id.into(),
            test_name: test_name.into(),
            status: ThreadStatus::Active,
            started_at: Utc::now(),
        }
    }
}

/// Result of a single test case, recorded once all retries are resolved
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TestResult {
    pub test_id: String,
    pub test_name: String,
    pub status: TestStatus,
    /// Elapsed milliseconds of the final attempt
    pub execution_time_ms: u64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub error: Option<TestError>,
    pub logs: Vec<LogEntry>,
    /// Retries consumed before the recorded outcome
    pub retry_count: u32,
}

impl TestResult {
    pub fn passed(
        test_id: impl Into<String>,
        test_name: impl Into<String>,
        execution_time_ms: u64,
        start_time: DateTime<Utc>,
        retry_count: u32,
        logs: Vec<LogEntry>,
    ) -> Self {
        Self {
            test_id: test_id.into(),
            test_name: test_name.into(),
            status: TestStatus::Passed,
            execution_time_ms,
            start_time,
            end_time: Utc::now(),
            error: None,
            logs,
            retry_count,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn failed(
        test_id: impl Into<String>,
        test_name: impl Into<String>,
        execution_time_ms: u64,
        start_time: DateTime<Utc>,
        error: TestError,
        retry_count: u32,
        logs: Vec<LogEntry>,
    ) -> Self {
        Self {
            test_id: test_id.into(),
            test_name: test_name.into(),
            status: TestStatus::Failed,
            execution_time_ms,
            start_time,
            end_time: Utc::now(),
            error: Some(error),
            logs,
            retry_count,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} [{}ms]",
            self.status.symbol(),
            self.test_name,
            self.execution_time_ms
        )?;
        if let Some(err) = &self.error {
            write!(f, " - {err}")?;
        }
        if self.retry_count > 0 {
            write!(f, " ({} retries)", self.retry_count)?;
        }
        Ok(())
    }
}

/// Summary of a completed run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunSummary {
    pub status: RunStatus,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// Wall-clock duration of the whole run
    pub wall_time_ms: u64,
    pub results: Vec<TestResult>,
}

impl RunSummary {
    pub fn new(status: RunStatus, results: Vec<TestResult>, wall_time_ms: u64) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.is_success()).count();

        Self {
            status,
            total,
            passed,
            failed: total - passed,
            wall_time_ms,
            results,
        }
    }

    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.passed as f64 / self.total as f64) * 100.0
        }
    }

    pub fn is_all_passed(&self) -> bool {
        self.passed == self.total
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Run {} ({} checks)", self.status, self.total)?;
        for result in &self.results {
            writeln!(f, "  {result}")?;
        }
        writeln!(
            f,
            "Total: {} | Pass: {} | Fail: {} | Rate: {:.1}% | Duration: {}ms",
            self.total,
            self.passed,
            self.failed,
            self.pass_rate(),
            self.wall_time_ms
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_symbols() {
        assert_eq!(TestStatus::Passed.symbol(), "✓");
        assert!(TestStatus::Passed.is_success());
        assert!(!TestStatus::Failed.is_success());
    }

    #[test]
    fn test_timeout_error() {
        let err = TestError::timeout();
        assert_eq!(err.message, "Test timeout");
        assert!(err.is_timeout());
        assert!(!TestError::new("boom").is_timeout());
    }

    #[test]
    fn test_error_from_anyhow_keeps_chain() {
        let err = anyhow::anyhow!("root cause").context("request failed");
        let captured = TestError::from_error(&err);
        assert_eq!(captured.message, "request failed");
        assert!(captured.detail.unwrap().contains("root cause"));
    }

    #[test]
    fn test_run_status_terminal() {
        assert!(RunStatus::Completed.is_terminal());
        assert!(RunStatus::Stopped.is_terminal());
        assert!(!RunStatus::Paused.is_terminal());
    }

    #[test]
    fn test_summary_counts() {
        let start = Utc::now();
        let results = vec![
            TestResult::passed("a", "a", 10, start, 0, Vec::new()),
            TestResult::failed("b", "b", 5, start, TestError::new("no"), 2, Vec::new()),
        ];

        let summary = RunSummary::new(RunStatus::Completed, results, 15);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 1);
        assert!((summary.pass_rate() - 50.0).abs() < f64::EPSILON);
        assert!(!summary.is_all_passed());
    }

    #[test]
    fn test_empty_summary_rate() {
        let summary = RunSummary::new(RunStatus::Completed, Vec::new(), 0);
        assert_eq!(summary.pass_rate(), 0.0);
    }
}
