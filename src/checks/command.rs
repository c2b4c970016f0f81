//! Command check
//!
//! Spawns a local process and asserts on its exit code.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::process::Command;
use tracing::debug;

use crate::checks::snippet;
use crate::models::TestCase;
use crate::runner::TestLogger;
use crate::utils::timer::Timer;

const OUTPUT_SNIPPET_CHARS: usize = 400;

/// Declarative local-process check
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommandCheck {
    /// Program followed by its arguments
    pub command: Vec<String>,

    /// Working directory for the process
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,

    /// Extra environment variables
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub env: HashMap<String, String>,

    /// Expected exit code
    #[serde(default)]
    pub expect_exit: i32,
}

impl CommandCheck {
    pub fn new(command: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            command: command.into_iter().map(Into::into).collect(),
            cwd: None,
            env: HashMap::new(),
            expect_exit: 0,
        }
    }

    pub fn with_cwd(mut self, cwd: impl Into<String>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn with_expect_exit(mut self, code: i32) -> Self {
        self.expect_exit = code;
        self
    }

    /// Check the declaration itself, before anything is spawned
    pub fn validate(&self) -> Result<()> {
        match self.command.first() {
            None => bail!("command must not be empty"),
            Some(program) if program.is_empty() => bail!("command program must not be empty"),
            Some(_) => Ok(()),
        }
    }

    /// Convert into a runnable test case
    pub fn into_case(self, id: &str, name: &str) -> Result<TestCase> {
        self.validate()?;
        let check = Arc::new(self);

        Ok(TestCase::new(id, name, move |logger| {
            let check = check.clone();
            async move { check.probe(&logger).await }
        }))
    }

    /// Spawn the process once and assert on its exit code
    pub async fn probe(&self, logger: &TestLogger) -> Result<()> {
        let program = self
            .command
            .first()
            .context("command must not be empty")?;
        debug!("spawning {:?}", self.command);

        let mut command = Command::new(program);
        command.args(&self.command[1..]);
        command.envs(&self.env);
        if let Some(cwd) = &self.cwd {
            command.current_dir(cwd);
        }

        let timer = Timer::start();
        let output = command
            .output()
            .await
            .with_context(|| format!("failed to spawn {program:?}"))?;
        let exit = output.status.code().unwrap_or(-1);

        logger.info(format!(
            "{program} exited with {exit} in {}ms",
            timer.elapsed_ms()
        ));

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            logger.debug(format!("stdout: {}", snippet(stdout.trim(), OUTPUT_SNIPPET_CHARS)));
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            logger.debug(format!("stderr: {}", snippet(stderr.trim(), OUTPUT_SNIPPET_CHARS)));
        }

        if exit != self.expect_exit {
            if stderr.trim().is_empty() {
                bail!("expected exit code {}, got {exit}", self.expect_exit);
            }
            bail!(
                "expected exit code {}, got {exit}: {}",
                self.expect_exit,
                snippet(stderr.trim(), OUTPUT_SNIPPET_CHARS)
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_empty() {
        assert!(CommandCheck::new(Vec::<String>::new()).validate().is_err());
        assert!(CommandCheck::new(["true"]).validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let check = CommandCheck::new(["sh", "-c", "exit 3"])
            .with_cwd("/tmp")
            .with_env("KEY", "value")
            .with_expect_exit(3);

        assert_eq!(check.command.len(), 3);
        assert_eq!(check.cwd.as_deref(), Some("/tmp"));
        assert_eq!(check.env.get("KEY").map(String::as_str), Some("value"));
        assert_eq!(check.expect_exit, 3);
    }

    #[test]
    fn test_probe_matches_exit_code() {
        let logger = TestLogger::new("exit-check");
        let check = CommandCheck::new(["sh", "-c", "exit 3"]).with_expect_exit(3);

        let outcome = tokio_test::block_on(check.probe(&logger));
        assert!(outcome.is_ok());
    }

    #[test]
    fn test_probe_reports_mismatch() {
        let logger = TestLogger::new("exit-check");
        let check = CommandCheck::new(["sh", "-c", "echo oops >&2; exit 1"]);

        let outcome = tokio_test::block_on(check.probe(&logger));
        let err = outcome.unwrap_err();
        assert!(err.to_string().contains("exit code"));
        assert!(err.to_string().contains("oops"));
    }
}
