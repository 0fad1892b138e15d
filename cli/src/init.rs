use crate::cli::CommonArgs;
use crate::config::{AppConfig, DEFAULT_CONFIG_FILE};
use crate::error::{CliError, Result, ResultExt};
use crate::ui;
use std::fs;
use std::path::{Path, PathBuf};

/// What `init` did, for the summary and for tests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitOutcome {
    pub config_path: PathBuf,
    pub changelog_path: PathBuf,
    pub changelog_created: bool,
    pub marker_missing: bool,
}

pub fn execute(common: CommonArgs, force: bool) -> Result<()> {
    let outcome = initialize(&common, force)?;

    ui::success_message(&format!(
        "Wrote configuration to {}",
        outcome.config_path.display()
    ));
    if outcome.changelog_created {
        ui::success_message(&format!("Created {}", outcome.changelog_path.display()));
    } else if outcome.marker_missing {
        ui::warning_message(&format!(
            "{} has no marker line. Add the line configured as latest_changes_header where new changes should be listed",
            outcome.changelog_path.display()
        ));
    } else {
        ui::info_message(&format!(
            "{} already contains the marker line",
            outcome.changelog_path.display()
        ));
    }
    ui::info_message("Run `autochangelog update` to fill in the latest changes");
    Ok(())
}

/// Writes the default configuration and a changelog skeleton if none exists
///
/// # Errors
/// Returns `ConfigExists` when the configuration file is present and `force`
/// is not set
pub fn initialize(common: &CommonArgs, force: bool) -> Result<InitOutcome> {
    let config_path = common
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    if config_path.exists() && !force {
        return Err(CliError::ConfigExists(config_path));
    }

    let mut config = AppConfig::default();
    config.apply_overrides(common);
    config.changelog.validate()?;

    let template = if common.changelog_file.is_some() || common.marker.is_some() {
        toml::to_string_pretty(&config)?
    } else {
        AppConfig::default_toml()?
    };
    write_file(&config_path, &template)?;

    let marker = &config.changelog.latest_changes_header;
    let changelog_path = config.changelog_file;
    let mut changelog_created = false;
    let mut marker_missing = false;

    if changelog_path.exists() {
        let content = fs::read_to_string(&changelog_path)
            .with_context(|| format!("Failed to read {}", changelog_path.display()))?;
        marker_missing = !content
            .lines()
            .any(|line| line.trim_end_matches('\r') == marker);
    } else {
        write_file(&changelog_path, &changelog_skeleton(marker))?;
        changelog_created = true;
    }

    Ok(InitOutcome {
        config_path,
        changelog_path,
        changelog_created,
        marker_missing,
    })
}

fn changelog_skeleton(marker: &str) -> String {
    format!("# Changelog\n\n{marker}\n\n")
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}
