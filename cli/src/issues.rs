use crate::cli::SourceArgs;
use crate::config::AppConfig;
use crate::error::{CliError, Result, ResultExt};
use crate::ui;
use changelog::Issue;
use std::env;
use tokio::runtime::Runtime;
use tracker::{GitHubIssueSource, IssueSource, JsonIssueSource, Repository};

/// Where issues will be read from once arguments and configuration are merged
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceChoice {
    File(std::path::PathBuf),
    GitHub {
        repository: Repository,
        api_base: String,
        token: Option<String>,
        include_pull_requests: bool,
    },
}

impl SourceChoice {
    /// `--issues-file` wins over everything else. Otherwise the repository
    /// comes from `--repository`, `GITHUB_REPOSITORY` or `github.repository`,
    /// and the token from `--token` or the variable named by `github.token_env`.
    ///
    /// # Errors
    /// Returns `MissingRepository` when no repository is known and `Tracker`
    /// when it is not of the form `owner/name`
    pub fn resolve(args: &SourceArgs, config: &AppConfig) -> Result<Self> {
        if let Some(path) = &args.issues_file {
            return Ok(Self::File(path.clone()));
        }

        let repository = args
            .repository
            .as_deref()
            .or(config.github.repository.as_deref())
            .filter(|value| !value.trim().is_empty())
            .ok_or(CliError::MissingRepository)?;
        let repository = Repository::parse(repository)?;

        let token = args
            .token
            .clone()
            .or_else(|| env::var(&config.github.token_env).ok());

        Ok(Self::GitHub {
            repository,
            api_base: args
                .api_base
                .clone()
                .unwrap_or_else(|| config.github.api_base.clone()),
            token,
            include_pull_requests: config.github.include_pull_requests,
        })
    }
}

/// Fetches closed issues on a fresh runtime
///
/// # Errors
/// Returns an error if the runtime cannot start or the source fails
pub fn fetch_issues(args: &SourceArgs, config: &AppConfig, verbose: bool) -> Result<Vec<Issue>> {
    let choice = SourceChoice::resolve(args, config)?;

    let rt = Runtime::new()
        .map_err(|e| CliError::from(e).with_context("Failed to create async runtime"))?;

    match choice {
        SourceChoice::File(path) => {
            if args.since.is_some() {
                ui::note_message("--since is ignored when reading from an issues file");
            }
            fetch(&rt, &JsonIssueSource::new(path), verbose)
        }
        SourceChoice::GitHub {
            repository,
            api_base,
            token,
            include_pull_requests,
        } => {
            if token.is_none() && verbose {
                ui::note_message(&format!(
                    "No token found in {}, using unauthenticated requests",
                    config.github.token_env
                ));
            }
            let source = GitHubIssueSource::new(repository)?
                .with_token(token)
                .with_api_base(api_base)
                .include_pull_requests(include_pull_requests)
                .closed_since(args.since);
            fetch(&rt, &source, verbose)
        }
    }
}

fn fetch<S: IssueSource>(rt: &Runtime, source: &S, verbose: bool) -> Result<Vec<Issue>> {
    if verbose {
        ui::note_message(&format!("Reading closed issues from {}", source.describe()));
    }

    rt.block_on(source.fetch_closed_issues())
        .with_context(|| format!("Failed to fetch issues from {}", source.describe()))
}
