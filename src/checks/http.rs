//! HTTP check
//!
//! Probes an HTTP endpoint and asserts on status code and response body.

use anyhow::{bail, Context, Result};
use reqwest::header::HOST;
use reqwest::{Client, Method};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::checks::snippet;
use crate::models::TestCase;
use crate::runner::TestLogger;
use crate::utils::timer::Timer;

fn default_method() -> String {
    "GET".to_string()
}

fn default_status() -> u16 {
    200
}

/// Declarative HTTP probe
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpCheck {
    /// Target URL (http or https)
    pub url: String,

    /// HTTP method
    #[serde(default = "default_method")]
    pub method: String,

    /// Expected response status code
    #[serde(default = "default_status")]
    pub expect_status: u16,

    /// Host header override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_header: Option<String>,

    /// Request body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    /// Substring the response body must contain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_contains: Option<String>,

    /// Accept invalid TLS certificates
    #[serde(default)]
    pub insecure: bool,
}

impl HttpCheck {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: default_method(),
            expect_status: default_status(),
            host_header: None,
            body: None,
            body_contains: None,
            insecure: false,
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn with_expect_status(mut self, status: u16) -> Self {
        self.expect_status = status;
        self
    }

    pub fn with_body_contains(mut self, needle: impl Into<String>) -> Self {
        self.body_contains = Some(needle.into());
        self
    }

    /// Check the declaration itself, before any request goes out
    pub fn validate(&self) -> Result<()> {
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            bail!("URL must use http or https: {}", self.url);
        }
        Method::from_bytes(self.method.as_bytes())
            .with_context(|| format!("invalid HTTP method: {}", self.method))?;
        Ok(())
    }

    /// Convert into a runnable test case
    pub fn into_case(self, id: &str, name: &str) -> Result<TestCase> {
        self.validate()?;

        let client = Client::builder()
            .danger_accept_invalid_certs(self.insecure)
            .build()
            .context("failed to build HTTP client")?;
        let check = Arc::new(self);

        Ok(TestCase::new(id, name, move |logger| {
            let check = check.clone();
            let client = client.clone();
            async move { check.probe(&client, &logger).await }
        }))
    }

    /// Issue one probe and assert on the response
    pub async fn probe(&self, client: &Client, logger: &TestLogger) -> Result<()> {
        let method = Method::from_bytes(self.method.as_bytes())
            .with_context(|| format!("invalid HTTP method: {}", self.method))?;
        debug!("probing {} {}", self.method, self.url);

        let mut request = client.request(method, self.url.as_str());
        if let Some(host) = &self.host_header {
            request = request.header(HOST, host.clone());
        }
        if let Some(body) = &self.body {
            request = request.body(body.clone());
        }

        let timer = Timer::start();
        let response = request
            .send()
            .await
            .with_context(|| format!("request to {} failed", self.url))?;
        let status = response.status().as_u16();

        logger.info(format!(
            "{} {} -> {} in {}ms",
            self.method,
            self.url,
            status,
            timer.elapsed_ms()
        ));

        if status != self.expect_status {
            bail!("expected status {}, got {}", self.expect_status, status);
        }

        if let Some(needle) = &self.body_contains {
            let body = response
                .text()
                .await
                .context("failed to read response body")?;
            if !body.contains(needle.as_str()) {
                logger.warn(format!("body: {}", snippet(&body, 200)));
                bail!("response body does not contain {needle:?}");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let check = HttpCheck::new("http://localhost/health");
        assert_eq!(check.method, "GET");
        assert_eq!(check.expect_status, 200);
        assert!(check.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_scheme() {
        let check = HttpCheck::new("ftp://example.com");
        assert!(check.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_method() {
        let check = HttpCheck::new("http://example.com").with_method("NOT A METHOD");
        assert!(check.validate().is_err());
    }

    #[test]
    fn test_into_case_carries_identity() {
        let case = HttpCheck::new("http://localhost/health")
            .with_expect_status(204)
            .into_case("health", "API health")
            .unwrap();
        assert_eq!(case.id(), "health");
        assert_eq!(case.name(), "API health");
    }
}
