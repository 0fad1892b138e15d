use crate::cli::{CommonArgs, SourceArgs};
use crate::config::AppConfig;
use crate::error::Result;
use crate::issues::fetch_issues;
use crate::ui;
use crate::update::{join_numbers, read_changelog};
use changelog::{ChangelogUpdater, RenderedSection};

/// Prints the rendered section to stdout. Everything else goes to stderr so
/// the output can be piped.
pub fn execute(source: SourceArgs, common: CommonArgs) -> Result<()> {
    let rendered = render_latest(&source, &common)?;

    if rendered.is_empty() {
        ui::note_message("No labelled issues to render");
    } else {
        print!("{}", rendered.text);
    }
    Ok(())
}

/// Renders the latest changes section without touching the changelog.
///
/// With `skip_released` on and an existing changelog, issues already listed
/// there are left out. Every fetched issue is validated either way.
///
/// # Errors
/// Returns an error if configuration, fetching or rendering fails
pub fn render_latest(source: &SourceArgs, common: &CommonArgs) -> Result<RenderedSection> {
    let verbose = common.verbose;
    let config = AppConfig::resolve(common)?;
    let updater = ChangelogUpdater::new(config.changelog.clone())?;

    let mut issues = fetch_issues(source, &config, verbose)?;
    if verbose {
        ui::note_message(&format!("Fetched {} closed issues", issues.len()));
    }

    if config.changelog.skip_released && config.changelog_file.exists() {
        let document = read_changelog(&config.changelog_file)?;
        let (candidates, skipped) = updater.partition_released(&document, &issues)?;
        if verbose && !skipped.is_empty() {
            ui::note_message(&format!(
                "Left out issues already listed in {}: {}",
                config.changelog_file.display(),
                join_numbers(&skipped)
            ));
        }
        issues = candidates;
    }

    let rendered = updater.render_section(&issues)?;
    if verbose && !rendered.unmatched().is_empty() {
        ui::note_message(&format!(
            "{} issues carry no configured label",
            rendered.unmatched().len()
        ));
    }
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use changelog::ChangelogError;
    use std::fs;
    use tempfile::TempDir;

    const ISSUES: &str = r#"[
        {"number": 1, "title": "Fix crash", "labels": ["bug"], "url": ""},
        {"number": 2, "title": "Add dark mode", "labels": ["feature"], "url": ""},
        {"number": 3, "title": "Fix typo", "labels": ["bug"], "url": ""},
        {"number": 4, "title": "Tidy workspace", "labels": ["chore"], "url": ""}
    ]"#;

    const RELEASED_CHANGELOG: &str = "\
# Changelog

### Latest Changes

## 0.1.0

- Fix crash (#1)
";

    fn write_fixture(dir: &TempDir, issues: &str, extra_config: &str) -> (SourceArgs, CommonArgs) {
        let issues_path = dir.path().join("issues.json");
        let config_path = dir.path().join("autochangelog.toml");
        fs::write(&issues_path, issues).unwrap();
        fs::write(
            &config_path,
            format!(
                r#"
[changelog]
{extra_config}

[[changelog.labels]]
label = "feature"
header = "Features"

[[changelog.labels]]
label = "bug"
header = "Fixes"
"#
            ),
        )
        .unwrap();

        let source = SourceArgs {
            issues_file: Some(issues_path),
            ..SourceArgs::default()
        };
        let common = CommonArgs {
            config: Some(config_path),
            changelog_file: Some(dir.path().join("CHANGELOG.md")),
            ..CommonArgs::default()
        };
        (source, common)
    }

    #[test]
    fn renders_without_a_changelog() {
        let temp_dir = TempDir::new().unwrap();
        let (source, common) = write_fixture(&temp_dir, ISSUES, "");

        let rendered = render_latest(&source, &common).unwrap();
        assert_eq!(
            rendered.text,
            "#### Features\n\n- Add dark mode (#2)\n\n#### Fixes\n\n- Fix crash (#1)\n- Fix typo (#3)\n\n"
        );
        assert_eq!(rendered.unmatched().len(), 1);
        assert!(!temp_dir.path().join("CHANGELOG.md").exists());
    }

    #[test]
    fn leaves_out_released_issues() {
        let temp_dir = TempDir::new().unwrap();
        let (source, common) = write_fixture(&temp_dir, ISSUES, "");
        let changelog_path = common.changelog_file.clone().unwrap();
        fs::write(&changelog_path, RELEASED_CHANGELOG).unwrap();

        let rendered = render_latest(&source, &common).unwrap();
        assert_eq!(
            rendered.text,
            "#### Features\n\n- Add dark mode (#2)\n\n#### Fixes\n\n- Fix typo (#3)\n\n"
        );
        assert_eq!(fs::read_to_string(&changelog_path).unwrap(), RELEASED_CHANGELOG);
    }

    #[test]
    fn keeps_released_issues_when_disabled() {
        let temp_dir = TempDir::new().unwrap();
        let (source, common) = write_fixture(&temp_dir, ISSUES, "skip_released = false");
        fs::write(common.changelog_file.as_ref().unwrap(), RELEASED_CHANGELOG).unwrap();

        let rendered = render_latest(&source, &common).unwrap();
        assert!(rendered.text.contains("- Fix crash (#1)"));
    }

    #[test]
    fn changelog_without_marker_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let (source, common) = write_fixture(&temp_dir, ISSUES, "");
        fs::write(common.changelog_file.as_ref().unwrap(), "# Changelog\n\n## 0.1.0\n").unwrap();

        let err = render_latest(&source, &common).unwrap_err();
        assert!(matches!(
            err,
            CliError::Changelog(ChangelogError::MarkerNotFound { .. })
        ));
    }

    #[test]
    fn nothing_labelled_renders_empty() {
        let temp_dir = TempDir::new().unwrap();
        let issues = r#"[{"number": 4, "title": "Tidy workspace", "labels": ["chore"]}]"#;
        let (source, common) = write_fixture(&temp_dir, issues, "");

        let rendered = render_latest(&source, &common).unwrap();
        assert!(rendered.is_empty());
        assert_eq!(rendered.text, "");
    }
}
