//! Data models for the test harness
//!
//! This module contains the data structures shared across the crate.

mod case;
mod result;

pub use case::{AttemptFuture, TestCase};
pub use result::{
    LogEntry, RunStatus, RunSummary, TestError, TestResult, TestStatus, ThreadInfo, ThreadStatus,
    TIMEOUT_MESSAGE,
};
