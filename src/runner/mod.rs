//! Test execution engine
//!
//! Provides the bounded-concurrency scheduler and the per-case capture log.

pub mod capture;
mod scheduler;

pub use capture::TestLogger;
pub use scheduler::{ProgressFn, TestRunner};
