//! Test case model
//!
//! A test case pairs an identifier with an attempt factory: a closure the
//! runner invokes once per attempt, handing it the per-case capture log.

use anyhow::Result;
use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::runner::capture::TestLogger;

/// Future produced by one execution attempt
pub type AttemptFuture = BoxFuture<'static, Result<()>>;

type ExecuteFn = Arc<dyn Fn(TestLogger) -> AttemptFuture + Send + Sync>;

/// A unit of work for the runner.
///
/// `timeout` and `retries` override the runner-wide settings when present.
/// The execute closure must be safe to invoke multiple times; each retry
/// produces a fresh attempt future.
#[derive(Clone)]
pub struct TestCase {
    id: String,
    name: String,
    timeout: Option<Duration>,
    retries: Option<u32>,
    execute: ExecuteFn,
}

impl TestCase {
    /// Create a test case from an async attempt factory
    pub fn new<F, Fut>(id: impl Into<String>, name: impl Into<String>, execute: F) -> Self
    where
        F: Fn(TestLogger) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<()>> + Send + 'static,
    {
        Self {
            id: id.into(),
            name: name.into(),
            timeout: None,
            retries: None,
            execute: Arc::new(move |logger| Box::pin(execute(logger))),
        }
    }

    /// Override the per-attempt deadline for this case
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the retry budget for this case
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn retries(&self) -> Option<u32> {
        self.retries
    }

    /// Begin one attempt
    pub fn execute(&self, logger: TestLogger) -> AttemptFuture {
        (self.execute)(logger)
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("timeout", &self.timeout)
            .field("retries", &self.retries)
            .finish_non_exhaustive()
    }
}
