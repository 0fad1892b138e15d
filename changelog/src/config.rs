use crate::error::ChangelogError;
use crate::formatter::TemplateSectionFormatter;
use crate::types::{LabelRule, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const DEFAULT_LATEST_CHANGES_HEADER: &str = "### Latest Changes";
pub const DEFAULT_LABEL_HEADER_PREFIX: &str = "#### ";

/// One configured label and the category header it maps to
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LabelConfig {
    pub label: String,
    pub header: String,
}

impl LabelConfig {
    pub fn new(label: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            header: header.into(),
        }
    }
}

/// What to write into the owned region when no issue renders
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptySectionPolicy {
    /// Replace the owned region with nothing
    #[default]
    Clear,
    /// Leave the document untouched
    Keep,
    /// Replace the owned region with `placeholder_text`
    Placeholder,
}

/// Files issues without a configured label under a trailing category
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UnlabeledConfig {
    pub header: String,
}

/// Configuration options for classification, rendering and merging
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ChangelogConfig {
    /// Ordered label to header mapping. Earlier entries win when an issue
    /// carries several configured labels.
    pub labels: Vec<LabelConfig>,
    pub label_header_prefix: String,
    /// Literal line marking the region this tool owns
    pub latest_changes_header: String,
    /// Line prefixes that start a release section and end the owned region
    pub release_header_prefixes: Vec<String>,
    pub empty_section: EmptySectionPolicy,
    pub placeholder_text: String,
    pub unlabeled: Option<UnlabeledConfig>,
    /// Drop issues that are already listed outside the owned region
    pub skip_released: bool,
    /// Bullet template, e.g. `- {{ title }} ([#{{ number }}]({{ url }}))`
    pub entry_template: Option<String>,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        Self {
            labels: vec![
                LabelConfig::new("breaking", "Breaking Changes"),
                LabelConfig::new("security", "Security Fixes"),
                LabelConfig::new("feature", "Features"),
                LabelConfig::new("bug", "Fixes"),
                LabelConfig::new("refactor", "Refactors"),
                LabelConfig::new("upgrade", "Upgrades"),
                LabelConfig::new("docs", "Docs"),
                LabelConfig::new("lang-all", "Translations"),
                LabelConfig::new("internal", "Internal"),
            ],
            label_header_prefix: DEFAULT_LABEL_HEADER_PREFIX.to_string(),
            latest_changes_header: DEFAULT_LATEST_CHANGES_HEADER.to_string(),
            release_header_prefixes: vec!["# ".to_string(), "## ".to_string(), "### ".to_string()],
            empty_section: EmptySectionPolicy::default(),
            placeholder_text: "No changes yet.".to_string(),
            unlabeled: None,
            skip_released: true,
            entry_template: None,
        }
    }
}

impl ChangelogConfig {
    /// Label rules in configured order, with the header prefix applied
    #[must_use]
    pub fn rules(&self) -> Vec<LabelRule> {
        self.labels
            .iter()
            .map(|entry| LabelRule::new(&entry.label, &entry.header, &self.label_header_prefix))
            .collect()
    }

    /// The catch-all rule for unlabeled issues, when enabled
    #[must_use]
    pub fn fallback_rule(&self) -> Option<LabelRule> {
        self.unlabeled
            .as_ref()
            .map(|unlabeled| LabelRule::new("", &unlabeled.header, &self.label_header_prefix))
    }

    /// Validates the configuration
    ///
    /// # Errors
    /// Returns `InvalidConfig` describing the first problem found
    pub fn validate(&self) -> Result<()> {
        if self.labels.is_empty() {
            return Err(ChangelogError::invalid_config("at least one label must be configured"));
        }

        let marker = &self.latest_changes_header;
        if marker.trim().is_empty() {
            return Err(ChangelogError::invalid_config("latest_changes_header must not be empty"));
        }
        if marker.contains('\n') || marker.contains('\r') {
            return Err(ChangelogError::invalid_config(
                "latest_changes_header must be a single line",
            ));
        }

        if self.release_header_prefixes.iter().any(|p| p.is_empty()) {
            return Err(ChangelogError::invalid_config(
                "release_header_prefixes must not contain an empty prefix",
            ));
        }

        let mut seen = HashSet::with_capacity(self.labels.len());
        for entry in &self.labels {
            if entry.label.trim().is_empty() {
                return Err(ChangelogError::invalid_config("label names must not be empty"));
            }
            if entry.header.trim().is_empty() {
                return Err(ChangelogError::invalid_config(format!(
                    "label '{}' has an empty header",
                    entry.label
                )));
            }
            if !seen.insert(entry.label.as_str()) {
                return Err(ChangelogError::invalid_config(format!(
                    "label '{}' is configured more than once",
                    entry.label
                )));
            }
        }

        if let Some(unlabeled) = &self.unlabeled {
            if unlabeled.header.trim().is_empty() {
                return Err(ChangelogError::invalid_config("unlabeled.header must not be empty"));
            }
        }

        // A category heading that looks like a release heading would end the
        // owned region early on the next run.
        let rules = self.rules();
        let fallback = self.fallback_rule();
        let headings = rules.iter().chain(fallback.iter()).map(LabelRule::heading);
        for heading in headings {
            if let Some(prefix) = self
                .release_header_prefixes
                .iter()
                .find(|prefix| heading.starts_with(prefix.as_str()))
            {
                return Err(ChangelogError::invalid_config(format!(
                    "category heading '{heading}' starts with release heading prefix '{prefix}'"
                )));
            }
        }

        if self.empty_section == EmptySectionPolicy::Placeholder {
            self.validate_placeholder()?;
        }

        if let Some(template) = &self.entry_template {
            TemplateSectionFormatter::new(template.as_str())?;
        }

        Ok(())
    }

    // The placeholder sits inside the owned region, so it must not look like
    // the start of the next release.
    fn validate_placeholder(&self) -> Result<()> {
        let text = self.placeholder_text.trim();
        if text.is_empty() {
            return Err(ChangelogError::invalid_config(
                "placeholder_text must not be empty when empty_section = \"placeholder\"",
            ));
        }
        if text.contains('\n') || text.contains('\r') {
            return Err(ChangelogError::invalid_config("placeholder_text must be a single line"));
        }
        if let Some(prefix) = self
            .release_header_prefixes
            .iter()
            .find(|prefix| text.starts_with(prefix.as_str()))
        {
            return Err(ChangelogError::invalid_config(format!(
                "placeholder_text '{text}' starts with release heading prefix '{prefix}'"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ChangelogConfig::default();
        config.validate().unwrap();
        let rules = config.rules();
        assert_eq!(rules[0].heading(), "#### Breaking Changes");
        assert_eq!(rules[3].label, "bug");
    }

    #[test]
    fn default_labels_include_translations() {
        let rules = ChangelogConfig::default().rules();
        let translations = rules.iter().position(|rule| rule.label == "lang-all").unwrap();
        assert_eq!(rules[translations].header, "Translations");
        assert_eq!(rules[translations - 1].label, "docs");
        assert_eq!(rules.last().unwrap().label, "internal");
    }

    #[test]
    fn parses_from_toml_keeping_label_order() {
        let config: ChangelogConfig = toml::from_str(
            r#####"
label_header_prefix = "#### "
latest_changes_header = "## Unreleased"
release_header_prefixes = ["## "]
empty_section = "placeholder"

[[labels]]
label = "feature"
header = "Features"

[[labels]]
label = "bug"
header = "Fixes"

[unlabeled]
header = "Other"
"#####,
        )
        .unwrap();

        config.validate().unwrap();
        let labels: Vec<_> = config.rules().into_iter().map(|r| r.label).collect();
        assert_eq!(labels, ["feature", "bug"]);
        assert_eq!(config.empty_section, EmptySectionPolicy::Placeholder);
        assert_eq!(config.fallback_rule().unwrap().heading(), "#### Other");
        assert!(config.skip_released);
    }

    #[test]
    fn rejects_duplicate_labels() {
        let mut config = ChangelogConfig::default();
        config.labels.push(LabelConfig::new("bug", "More Fixes"));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("'bug' is configured more than once"));
    }

    #[test]
    fn rejects_heading_that_ends_region() {
        let config = ChangelogConfig {
            label_header_prefix: "### ".to_string(),
            ..ChangelogConfig::default()
        };
        assert!(matches!(config.validate(), Err(ChangelogError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_multiline_marker() {
        let config = ChangelogConfig {
            latest_changes_header: "### Latest\nChanges".to_string(),
            ..ChangelogConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn placeholder_must_not_end_the_region() {
        let placeholder = |text: &str| ChangelogConfig {
            empty_section: EmptySectionPolicy::Placeholder,
            placeholder_text: text.to_string(),
            ..ChangelogConfig::default()
        };

        placeholder("Nothing yet.").validate().unwrap();
        for text in ["## Nothing yet", "   ### 1.0.0", "Nothing\nyet", "  "] {
            assert!(
                matches!(placeholder(text).validate(), Err(ChangelogError::InvalidConfig(_))),
                "{text:?} was accepted"
            );
        }

        // Only checked when the placeholder is actually written
        ChangelogConfig {
            placeholder_text: "## Nothing yet".to_string(),
            ..ChangelogConfig::default()
        }
        .validate()
        .unwrap();
    }

    #[test]
    fn entry_template_is_checked() {
        let mut config = ChangelogConfig {
            entry_template: Some("- {{ title }} (#{{ number }})".to_string()),
            ..ChangelogConfig::default()
        };
        config.validate().unwrap();

        config.entry_template = Some("- {{ title }}".to_string());
        assert!(matches!(config.validate(), Err(ChangelogError::InvalidConfig(_))));
    }
}
