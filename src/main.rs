//! soundcheck - concurrent smoke-test harness
//!
//! A CLI for running suites of HTTP and command checks with bounded
//! concurrency, per-check timeouts, and retries.
//!
//! ## Usage
//!
//! ```bash
//! # Write an example suite file
//! soundcheck init
//!
//! # Run a suite
//! soundcheck run --suite smoke.yaml
//!
//! # Raise concurrency and stop at the first failure
//! soundcheck run --suite smoke.yaml --concurrent 8 --stop-on-error
//!
//! # List the declared checks
//! soundcheck list --suite smoke.yaml --detailed
//!
//! # Validate a suite without running it
//! soundcheck validate smoke.yaml
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use soundcheck::cli::{self, Args};
use soundcheck::config::SuiteFile;
use soundcheck::output::{write_report_to_file, OutputFormat, ResultFormatter};
use soundcheck::utils::logger::{init_logger, LogLevel};
use soundcheck::utils::timer::Timer;
use soundcheck::{ProgressFn, RunSummary, TestRunner};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logger(if args.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    });

    match args.command {
        cli::Command::Run(run_args) => run_suite(run_args).await,
        cli::Command::List(list_args) => list_checks(list_args),
        cli::Command::Validate(validate_args) => validate_suite(validate_args),
        cli::Command::Init(init_args) => init_suite(init_args),
    }
}

async fn run_suite(args: cli::RunArgs) -> Result<()> {
    let suite = SuiteFile::load(&args.suite)?;

    let mut config = suite.runner_config();
    if let Some(concurrent) = args.concurrent {
        config = config.with_max_concurrency(concurrent);
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config = config.with_timeout_ms(timeout_ms);
    }
    if let Some(retries) = args.retries {
        config = config.with_retries(retries);
    }
    if args.stop_on_error {
        config = config.with_stop_on_error(true);
    }

    let suite_name = suite.name.clone().unwrap_or_else(|| args.suite.clone());
    let mut cases = suite.into_cases()?;
    if let Some(filter) = &args.filter {
        cases.retain(|case| case.id().contains(filter.as_str()));
        if cases.is_empty() {
            anyhow::bail!("no checks match filter: {filter}");
        }
    }

    info!(
        "Running {} checks from '{}' (max {} concurrent)",
        cases.len(),
        suite_name,
        config.max_concurrency
    );

    let total = cases.len();
    let runner = TestRunner::new(config);

    // Ctrl-C stops admission; in-flight checks are still awaited
    let ctrl_c_runner = runner.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping run");
            ctrl_c_runner.stop();
        }
    });

    let progress: ProgressFn = Arc::new(move |active, results| {
        info!(
            "[{}/{}] done, {} in flight",
            results.len(),
            total,
            active.len()
        );
    });

    let timer = Timer::start();
    let results = runner.run_tests(cases, Some(progress)).await;
    let summary = RunSummary::new(runner.status(), results, timer.elapsed_ms());

    let format = OutputFormat::from_str(&args.format).unwrap_or(OutputFormat::Table);
    let mut formatter = ResultFormatter::new(format);
    if args.no_color {
        formatter = formatter.no_color();
    }
    println!("{}", formatter.format_summary(&summary));

    if let Some(output) = &args.output {
        write_report_to_file(output, &summary, format)?;
        info!("report written to {output}");
    }

    // Non-zero exit when something failed or the run was cut short
    if !summary.is_all_passed() || summary.total < total {
        std::process::exit(1);
    }
    Ok(())
}

fn list_checks(args: cli::ListArgs) -> Result<()> {
    let suite = SuiteFile::load(&args.suite)?;
    let title = suite.name.as_deref().unwrap_or(args.suite.as_str());

    println!("\n{} ({} checks)\n", title, suite.checks.len());
    println!("──────────────────────────────────────────────────────────────────────");

    for check in &suite.checks {
        if args.detailed {
            let timeout = check
                .timeout_ms
                .map(|t| format!("{t}ms"))
                .unwrap_or_else(|| "-".to_string());
            let retries = check
                .retries
                .map(|r| r.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  {:20} [{:7}] {:40} timeout={:8} retries={}",
                check.id,
                check.kind.label(),
                check.kind.target(),
                timeout,
                retries
            );
        } else {
            println!("  {:20} {}", check.id, check.kind.target());
        }
    }

    println!("──────────────────────────────────────────────────────────────────────\n");
    Ok(())
}

fn validate_suite(args: cli::ValidateArgs) -> Result<()> {
    match SuiteFile::load(&args.suite) {
        Ok(suite) => {
            println!(
                "✓ Suite file is valid: {} ({} checks)",
                args.suite,
                suite.checks.len()
            );
            Ok(())
        }
        Err(e) => {
            println!("✗ Suite file is invalid: {}", args.suite);
            println!("  Error: {e:#}");
            Err(e)
        }
    }
}

fn init_suite(args: cli::InitArgs) -> Result<()> {
    let path = Path::new(&args.output);
    if path.exists() && !args.force {
        anyhow::bail!(
            "suite file already exists: {}. Use --force to overwrite.",
            args.output
        );
    }

    SuiteFile::example().save(path)?;
    println!("✓ Example suite written to: {}", args.output);
    println!(
        "\nEdit the file, then run: soundcheck run --suite {}",
        args.output
    );
    Ok(())
}
