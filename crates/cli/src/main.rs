//! jira-records CLI entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Parse configuration**: load the TOML config file and validate it.
//! 2. **Wire logging**: configure `tracing-subscriber` (text or JSON) on
//!    stderr. All `tracing` spans and events emitted by the gateway and the
//!    Jira client flow through this subscriber. Stdout carries only results.
//! 3. **Construct infrastructure**: build a [`JiraClient`] through
//!    [`QueryGateway::setup`] and apply the configured timeout policies.
//! 4. **Run the command**: `search`, `get`, `count`, or `check`.

mod cli;
mod config;
mod output;

use std::io::Write;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use gateway::QueryGateway;
use jira::JiraClient;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use tracker::{Jql, SearchOptions};

use crate::cli::{Cli, Command, LogFormat};
use crate::config::CliConfig;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.log_format, cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(format: LogFormat, verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let text = (format == LogFormat::Text).then(|| fmt::layer().with_writer(std::io::stderr));
    let json = (format == LogFormat::Json).then(|| fmt::layer().json().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(text)
        .with(json)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = CliConfig::load(&cli.config, cli.password)?;
    let gateway = QueryGateway::<JiraClient>::setup(config.jira)
        .context("failed to set up Jira client")?
        .with_search_policy(config.policy.search_policy()?)
        .with_issues_policy(config.policy.issues_policy()?);

    match cli.command {
        Command::Search { jql, max_results } => {
            let jql = parse_jql(jql)?;
            let issues = gateway
                .search_issues(&jql, &SearchOptions::with_max_results(max_results))
                .await?;
            info!(issues = issues.len(), "writing records");
            output::write_records(&issues, &mut std::io::stdout().lock())
        }
        Command::Get {
            jql,
            paths,
            max_results,
        } => {
            let jql = parse_jql(jql)?;
            let issues = gateway
                .search_issues(&jql, &SearchOptions::with_max_results(max_results))
                .await?;
            info!(issues = issues.len(), paths = paths.len(), "writing selected fields");
            output::write_paths(&issues, &paths, &mut std::io::stdout().lock())
        }
        Command::Count { jql } => {
            let jql = parse_jql(jql)?;
            let total = gateway.total_count(&jql).await?;
            writeln!(std::io::stdout().lock(), "{total}")?;
            Ok(())
        }
        Command::Check => {
            let account = gateway.client().check_credentials().await?;
            writeln!(
                std::io::stdout().lock(),
                "Authenticated as {}",
                account.display_name
            )?;
            Ok(())
        }
    }
}

fn parse_jql(jql: String) -> Result<Jql> {
    Jql::new(jql).context("JQL query must not be empty")
}
