//! Output formatters for run reports
//!
//! Provides Table, JSON, CSV, and summary output formats.

use std::io::Write;

use crate::models::{RunSummary, TestResult, TestStatus};

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    JsonPretty,
    Csv,
    Summary,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            "csv" => Some(OutputFormat::Csv),
            "summary" => Some(OutputFormat::Summary),
            _ => None,
        }
    }
}

/// Report formatter
pub struct ResultFormatter {
    format: OutputFormat,
    colorize: bool,
}

impl ResultFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: true,
        }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    /// Format a single result
    pub fn format_result(&self, result: &TestResult) -> String {
        match self.format {
            OutputFormat::Table => self.format_result_line(result),
            OutputFormat::Json => serde_json::to_string(result).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(result).unwrap_or_default(),
            OutputFormat::Csv => self.format_result_csv(result),
            OutputFormat::Summary => self.format_result_brief(result),
        }
    }

    fn status_str(&self, status: TestStatus) -> String {
        let plain = format!("{} {}", status.symbol(), status);
        if !self.colorize {
            return plain;
        }
        match status {
            TestStatus::Passed => format!("\x1b[32m{plain}\x1b[0m"),
            TestStatus::Failed => format!("\x1b[31m{plain}\x1b[0m"),
        }
    }

    fn format_result_line(&self, result: &TestResult) -> String {
        let mut line = format!(
            "{:24} {} [{:>6}ms]",
            result.test_name,
            self.status_str(result.status),
            result.execution_time_ms
        );
        if result.retry_count > 0 {
            line.push_str(&format!(" ({} retries)", result.retry_count));
        }
        if let Some(err) = &result.error {
            line.push_str(&format!(" - {err}"));
        }
        line
    }

    fn format_result_csv(&self, result: &TestResult) -> String {
        format!(
            "{},{},{},{},{},\"{}\"",
            result.test_id,
            result.test_name,
            result.status,
            result.execution_time_ms,
            result.retry_count,
            result
                .error
                .as_ref()
                .map(|e| e.message.replace('"', "\"\""))
                .unwrap_or_default()
        )
    }

    fn format_result_brief(&self, result: &TestResult) -> String {
        format!(
            "{} {} ({}ms)",
            result.status.symbol(),
            result.test_name,
            result.execution_time_ms
        )
    }

    /// Format a whole run report
    pub fn format_summary(&self, summary: &RunSummary) -> String {
        match self.format {
            OutputFormat::Table => self.format_summary_table(summary),
            OutputFormat::Json => serde_json::to_string(summary).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(summary).unwrap_or_default(),
            OutputFormat::Csv => self.format_summary_csv(summary),
            OutputFormat::Summary => self.format_summary_brief(summary),
        }
    }

    fn format_summary_table(&self, summary: &RunSummary) -> String {
        let mut output = String::new();

        output.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
        for result in &summary.results {
            output.push_str("  ");
            output.push_str(&self.format_result_line(result));
            output.push('\n');
        }
        output.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

        let pass_str = if self.colorize {
            format!("\x1b[32m{}\x1b[0m", summary.passed)
        } else {
            summary.passed.to_string()
        };
        let fail_str = if self.colorize && summary.failed > 0 {
            format!("\x1b[31m{}\x1b[0m", summary.failed)
        } else {
            summary.failed.to_string()
        };

        output.push_str(&format!(
            "  Total: {} | Pass: {} | Fail: {} | Status: {}\n",
            summary.total, pass_str, fail_str, summary.status
        ));
        output.push_str(&format!(
            "  Pass Rate: {:.1}% | Duration: {}ms\n",
            summary.pass_rate(),
            summary.wall_time_ms
        ));

        output
    }

    fn format_summary_csv(&self, summary: &RunSummary) -> String {
        let mut output = String::new();
        output.push_str("id,name,status,duration_ms,retries,error\n");
        for result in &summary.results {
            output.push_str(&self.format_result_csv(result));
            output.push('\n');
        }
        output
    }

    fn format_summary_brief(&self, summary: &RunSummary) -> String {
        format!(
            "{}/{} passed ({:.1}%) in {}ms - {}",
            summary.passed,
            summary.total,
            summary.pass_rate(),
            summary.wall_time_ms,
            summary.status
        )
    }
}

impl Default for ResultFormatter {
    fn default() -> Self {
        Self::new(OutputFormat::Table)
    }
}

/// Write a run report to a file, with color stripped
pub fn write_report_to_file(
    path: &str,
    summary: &RunSummary,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let formatter = ResultFormatter::new(format).no_color();
    let content = formatter.format_summary(summary);

    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RunStatus, TestError};
    use chrono::Utc;

    fn sample_summary() -> RunSummary {
        let start = Utc::now();
        let results = vec![
            TestResult::passed("web", "web root", 120, start, 0, Vec::new()),
            TestResult::failed(
                "db",
                "db ping",
                40,
                start,
                TestError::new("connection refused"),
                2,
                Vec::new(),
            ),
        ];
        RunSummary::new(RunStatus::Completed, results, 160)
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("TABLE"), Some(OutputFormat::Table));
        assert_eq!(OutputFormat::from_str("unknown"), None);
    }

    #[test]
    fn test_table_mentions_failure() {
        let formatter = ResultFormatter::new(OutputFormat::Table).no_color();
        let output = formatter.format_summary(&sample_summary());
        assert!(output.contains("db ping"));
        assert!(output.contains("connection refused"));
        assert!(output.contains("2 retries"));
        assert!(!output.contains("\x1b["));
    }

    #[test]
    fn test_csv_has_header_and_rows() {
        let formatter = ResultFormatter::new(OutputFormat::Csv);
        let output = formatter.format_summary(&sample_summary());
        let lines: Vec<&str> = output.trim_end().lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("id,name,status"));
        assert!(lines[2].contains("FAIL"));
    }

    #[test]
    fn test_json_roundtrips() {
        let formatter = ResultFormatter::new(OutputFormat::Json);
        let output = formatter.format_summary(&sample_summary());
        let parsed: RunSummary = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed.total, 2);
        assert_eq!(parsed.passed, 1);
    }

    #[test]
    fn test_brief_line() {
        let formatter = ResultFormatter::new(OutputFormat::Summary);
        let output = formatter.format_summary(&sample_summary());
        assert!(output.contains("1/2 passed"));
    }
}
