use crate::cli::{CommonArgs, SourceArgs};
use crate::config::AppConfig;
use crate::error::{CliError, Result, ResultExt};
use crate::issues::fetch_issues;
use crate::progress::ProgressTracker;
use crate::ui::{self, Stream};
use changelog::{ChangelogUpdater, UpdateOutcome};
use std::fs;
use std::path::Path;

/// What `update` does with the merged document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Write,
    Check,
    DryRun,
}

impl WriteMode {
    pub const fn from_flags(check: bool, dry_run: bool) -> Self {
        if check {
            Self::Check
        } else if dry_run {
            Self::DryRun
        } else {
            Self::Write
        }
    }

    /// A dry run prints the document on stdout, so progress moves to stderr
    pub const fn progress_stream(self) -> Stream {
        match self {
            Self::DryRun => Stream::Stderr,
            Self::Write | Self::Check => Stream::Stdout,
        }
    }
}

pub fn execute(source: SourceArgs, common: CommonArgs, mode: WriteMode) -> Result<()> {
    let verbose = common.verbose;
    let mut progress = ProgressTracker::on(mode.progress_stream(), "Changelog Update").with_steps([
        "Loading configuration",
        "Reading changelog",
        "Fetching closed issues",
        "Rendering latest changes",
        "Writing changelog",
    ]);

    progress.start_step();
    let config = AppConfig::resolve(&common)?;
    let updater = ChangelogUpdater::new(config.changelog.clone())?;
    progress.complete_step();

    progress.start_step();
    let path = config.changelog_file.clone();
    let document = read_changelog(&path)?;
    progress.complete_step();

    progress.start_step();
    let issues = fetch_issues(&source, &config, verbose)?;
    progress.complete_step_with(&format!("{} found", issues.len()));

    progress.start_step();
    let outcome = updater
        .update(&document, &issues)
        .with_context(|| format!("Failed to update {}", path.display()))?;
    progress.complete_step();

    if verbose {
        report_outcome(&outcome, progress.stream());
    }

    match mode {
        WriteMode::Check => {
            if outcome.changed {
                return Err(CliError::OutOfDate(path));
            }
            progress.skip_step("check only");
            progress.complete();
            ui::success_message(&format!("{} is up to date", path.display()));
        }
        WriteMode::DryRun => {
            progress.skip_step("dry run");
            progress.complete();
            print!("{}", outcome.content);
        }
        WriteMode::Write => {
            progress.start_step();
            if outcome.changed {
                fs::write(&path, &outcome.content)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                progress.complete_step();
            } else {
                progress.skip_step("already up to date");
            }
            progress.complete();
            summarize(&outcome, &path);
        }
    }

    Ok(())
}

pub(crate) fn read_changelog(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(CliError::ChangelogNotFound(path.to_path_buf()));
    }
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn summarize(outcome: &UpdateOutcome, path: &Path) {
    if !outcome.changed {
        ui::info_message(&format!("{} is already up to date", path.display()));
        return;
    }

    let report = &outcome.report;
    ui::success_message(&format!("Updated {}", path.display()));
    ui::info_message(&format!(
        "{} added, {} removed, {} unchanged",
        report.added.len(),
        report.removed.len(),
        report.retained.len()
    ));
}

fn report_outcome(outcome: &UpdateOutcome, stream: Stream) {
    if !outcome.unmatched.is_empty() {
        ui::warning_message_to(
            stream,
            &format!(
                "{} issues carry no configured label and were left out",
                outcome.unmatched.len()
            ),
        );
        for issue in &outcome.unmatched {
            ui::detail_message_to(
                stream,
                &format!("#{} {} [{}]", issue.number, issue.title, issue.labels),
            );
        }
    }

    if !outcome.skipped_released.is_empty() {
        ui::detail_message_to(
            stream,
            &format!("Already released: {}", join_numbers(&outcome.skipped_released)),
        );
    }

    let report = &outcome.report;
    if !report.added.is_empty() {
        ui::detail_message_to(stream, &format!("Added: {}", join_numbers(&report.added)));
    }
    if !report.removed.is_empty() {
        ui::detail_message_to(stream, &format!("Removed: {}", join_numbers(&report.removed)));
    }
}

pub(crate) fn join_numbers(numbers: &[u64]) -> String {
    numbers
        .iter()
        .map(|number| format!("#{number}"))
        .collect::<Vec<_>>()
        .join(", ")
}
