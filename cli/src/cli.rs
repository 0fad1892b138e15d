use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "autochangelog")]
#[command(
    author,
    version,
    about = "Keep the latest changes section of a changelog in sync with closed issues"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rewrite the latest changes section of the changelog from closed issues
    Update {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        common: CommonArgs,

        /// Fail if the changelog is out of date instead of writing it
        #[clap(long, default_value_t = false, conflicts_with = "dry_run")]
        check: bool,

        /// Print the updated changelog instead of writing it
        #[clap(long, default_value_t = false)]
        dry_run: bool,
    },

    /// Print the rendered latest changes section without touching the changelog
    Render {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Write a default configuration file and create the changelog if missing
    Init {
        #[command(flatten)]
        common: CommonArgs,

        /// Overwrite an existing configuration file
        #[clap(long, default_value_t = false)]
        force: bool,
    },
}

/// Options shared by every command
#[derive(Args, Clone, Debug, Default)]
pub struct CommonArgs {
    /// Configuration file path (defaults to autochangelog.toml)
    #[clap(short, long)]
    pub config: Option<PathBuf>,

    /// Changelog file to update (overrides the configuration)
    #[clap(long)]
    pub changelog_file: Option<PathBuf>,

    /// Literal line that marks the latest changes section (overrides the configuration)
    #[clap(long)]
    pub marker: Option<String>,

    /// Enable verbose output with additional information
    #[clap(short, long, default_value_t = false)]
    pub verbose: bool,
}

/// Where closed issues come from
#[derive(Args, Clone, Debug, Default)]
pub struct SourceArgs {
    /// GitHub repository as owner/name
    #[clap(long, env = "GITHUB_REPOSITORY")]
    pub repository: Option<String>,

    /// GitHub token (defaults to the variable named by github.token_env)
    #[clap(long)]
    pub token: Option<String>,

    /// GitHub API root, for GitHub Enterprise installations
    #[clap(long)]
    pub api_base: Option<String>,

    /// Read closed issues from a JSON file instead of GitHub
    #[clap(long)]
    pub issues_file: Option<PathBuf>,

    /// Only include issues closed at or after this RFC 3339 timestamp
    #[clap(long)]
    pub since: Option<DateTime<Utc>>,
}
