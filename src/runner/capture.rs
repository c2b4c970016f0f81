//! Per-case log capture
//!
//! The runner creates one capture log for each dequeued test case. Attempt
//! lifecycle lines and check output land here and are copied into the final
//! result; the runner never interprets the content.

use std::sync::{Arc, Mutex, PoisonError};

use crate::models::LogEntry;
use crate::utils::logger::LogLevel;

/// Cheap-to-clone handle to a per-case capture buffer
#[derive(Clone, Debug)]
pub struct TestLogger {
    test_id: Arc<str>,
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl TestLogger {
    /// Create a capture buffer scoped to one test case id
    pub fn new(test_id: impl AsRef<str>) -> Self {
        Self {
            test_id: Arc::from(test_id.as_ref()),
            entries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn test_id(&self) -> &str {
        &self.test_id
    }

    /// Append a leveled entry
    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        let entry = LogEntry::new(level, message);
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    /// Snapshot of the captured entries, in append order
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_order() {
        let logger = TestLogger::new("case-1");
        logger.info("first");
        logger.error("second");

        let entries = logger.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "first");
        assert_eq!(entries[0].level, LogLevel::Info);
        assert_eq!(entries[1].message, "second");
        assert_eq!(entries[1].level, LogLevel::Error);
    }

    #[test]
    fn test_clones_share_buffer() {
        let logger = TestLogger::new("case-1");
        let handle = logger.clone();
        handle.info("from the clone");

        assert_eq!(logger.len(), 1);
        assert_eq!(logger.test_id(), "case-1");
    }

    #[test]
    fn test_snapshot_is_detached() {
        let logger = TestLogger::new("case-1");
        logger.info("before");
        let snapshot = logger.entries();
        logger.info("after");

        assert_eq!(snapshot.len(), 1);
        assert_eq!(logger.len(), 2);
    }
}
