//! Shared fixtures for the integration tests

use changelog::{ChangelogConfig, Issue, LabelConfig};
use serde_json::{Value, json};

pub const MARKER: &str = "### Latest Changes";

/// A changelog with a preamble, an owned region and two released versions
pub const SAMPLE_CHANGELOG: &str = "\
# Changelog

All notable changes to this project are listed here.

### Latest Changes

### 0.2.0

#### Fixes

- Fix startup crash ([#5](https://github.com/octo/demo/issues/5))

### 0.1.0

- Initial release
";

/// Features first, then fixes
pub fn features_and_fixes() -> ChangelogConfig {
    ChangelogConfig {
        labels: vec![
            LabelConfig::new("feature", "Features"),
            LabelConfig::new("bug", "Fixes"),
        ],
        ..ChangelogConfig::default()
    }
}

pub fn issue(number: u64, title: &str, labels: &[&str]) -> Issue {
    Issue::new(
        number,
        title,
        labels.iter().copied().collect(),
        format!("https://github.com/octo/demo/issues/{number}"),
    )
}

/// One record of the GitHub list-issues response
pub fn github_issue(number: u64, title: &str, labels: &[&str]) -> Value {
    json!({
        "number": number,
        "title": title,
        "html_url": format!("https://github.com/octo/demo/issues/{number}"),
        "state": "closed",
        "closed_at": "2024-03-01T12:00:00Z",
        "labels": labels
            .iter()
            .map(|name| json!({ "name": name, "color": "ededed" }))
            .collect::<Vec<_>>(),
    })
}
