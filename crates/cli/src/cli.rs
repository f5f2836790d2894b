//! Command line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Query a Jira site and print issues as flat records.
#[derive(Debug, Parser)]
#[command(name = "jira-records", version, about)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, short, default_value = "jira-records.toml", global = true)]
    pub config: PathBuf,

    /// Password or API token; overrides the configuration file.
    #[arg(long, env = "JIRA_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,

    /// Log output format (logs always go to stderr).
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    /// Enable debug logging.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print matching issues as flattened JSON records, one per line.
    Search {
        /// JQL filter expression.
        jql: String,
        /// Maximum number of issues to fetch.
        #[arg(long, default_value_t = 50)]
        max_results: u32,
    },
    /// Print selected dotted-path fields of matching issues, one object per line.
    Get {
        /// JQL filter expression.
        jql: String,
        /// Dotted field paths, e.g. `status.name`.
        #[arg(required = true)]
        paths: Vec<String>,
        /// Maximum number of issues to fetch.
        #[arg(long, default_value_t = 50)]
        max_results: u32,
    },
    /// Print the number of issues matching a query.
    Count {
        /// JQL filter expression.
        jql: String,
    },
    /// Validate the configuration and credentials.
    Check,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}
