use crate::classifier::Classifier;
use crate::config::{ChangelogConfig, EmptySectionPolicy};
use crate::formatter::{MarkdownSectionFormatter, SectionFormatter, TemplateSectionFormatter};
use crate::merger::{ChangelogMerger, MergeReport, RegionMerger};
use crate::router::{FirstMatchRouter, LabelRouter};
use crate::types::{CategoryBuckets, Issue, LabelRule, Result};
use crate::utils::issue_numbers;
use std::collections::BTreeSet;

/// A rendered section together with the grouping it came from
#[derive(Debug, Clone)]
pub struct RenderedSection {
    pub text: String,
    pub buckets: CategoryBuckets,
}

impl RenderedSection {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Issues no configured label claimed
    #[must_use]
    pub fn unmatched(&self) -> &[Issue] {
        self.buckets.unmatched()
    }
}

/// Result of running the whole pipeline over one document
#[derive(Debug, Clone)]
pub struct UpdateOutcome {
    pub content: String,
    pub changed: bool,
    pub report: MergeReport,
    pub unmatched: Vec<Issue>,
    /// Issues dropped because they are already listed outside the owned region
    pub skipped_released: Vec<u64>,
}

/// Classifies, renders and merges closed issues into a changelog document.
///
/// The updater never touches the filesystem: it takes the document text and
/// returns the new text.
pub struct ChangelogUpdater {
    config: ChangelogConfig,
    rules: Vec<LabelRule>,
    router: Box<dyn LabelRouter>,
    formatter: Box<dyn SectionFormatter>,
    merger: Box<dyn ChangelogMerger>,
}

impl ChangelogUpdater {
    /// Creates an updater with first-match routing and region merging.
    /// Bullets use `entry_template` when one is configured, plain markdown
    /// otherwise.
    ///
    /// # Errors
    /// Returns `InvalidConfig` if the configuration does not validate
    pub fn new(config: ChangelogConfig) -> Result<Self> {
        config.validate()?;
        let merger = RegionMerger::from_config(&config);
        let formatter: Box<dyn SectionFormatter> = match &config.entry_template {
            Some(template) => Box::new(TemplateSectionFormatter::new(template.as_str())?),
            None => Box::new(MarkdownSectionFormatter),
        };

        Ok(Self {
            rules: config.rules(),
            config,
            router: Box::new(FirstMatchRouter),
            formatter,
            merger: Box::new(merger),
        })
    }

    #[must_use]
    pub fn with_formatter(mut self, formatter: impl SectionFormatter + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    fn classifier(&self) -> Classifier<'_> {
        let classifier = Classifier::new(self.router.as_ref());
        match self.config.fallback_rule() {
            Some(rule) => classifier.with_fallback(rule),
            None => classifier,
        }
    }

    /// Classifies `issues` and renders the section text
    ///
    /// # Errors
    /// Returns `MalformedIssue` if any issue fails validation
    pub fn render_section(&self, issues: &[Issue]) -> Result<RenderedSection> {
        let buckets = self.classifier().classify(issues, &self.rules)?;
        let text = self.formatter.format(&buckets, buckets.rules());
        Ok(RenderedSection { text, buckets })
    }

    /// Issue numbers already listed in `document` outside the owned region
    ///
    /// # Errors
    /// Returns `MarkerNotFound` if the document has no marker line
    pub fn released_issue_numbers(&self, document: &str) -> Result<BTreeSet<u64>> {
        let region = self
            .merger
            .owned_region(document, &self.config.latest_changes_header)?;
        let mut numbers = issue_numbers(&document[..region.start]);
        numbers.extend(issue_numbers(&document[region.end..]));
        Ok(numbers)
    }

    /// Splits `issues` into those still to be listed and the sorted numbers of
    /// those already released in `document`. Nothing is skipped when
    /// `skip_released` is off.
    ///
    /// # Errors
    /// Returns `MarkerNotFound` if the document has no marker line and
    /// `MalformedIssue` if any issue fails validation, released or not
    pub fn partition_released(
        &self,
        document: &str,
        issues: &[Issue],
    ) -> Result<(Vec<Issue>, Vec<u64>)> {
        let released = if self.config.skip_released {
            self.released_issue_numbers(document)?
        } else {
            BTreeSet::new()
        };
        for issue in issues {
            issue.validate()?;
        }

        let (skipped, candidates): (Vec<&Issue>, Vec<&Issue>) = issues
            .iter()
            .partition(|issue| released.contains(&issue.number));
        let mut skipped_released: Vec<u64> = skipped.iter().map(|issue| issue.number).collect();
        skipped_released.sort_unstable();
        skipped_released.dedup();

        Ok((candidates.into_iter().cloned().collect(), skipped_released))
    }

    /// Runs classify, render and merge over `document`
    ///
    /// # Errors
    /// Returns `MarkerNotFound` if the document has no marker line and
    /// `MalformedIssue` if any issue fails validation
    pub fn update(&self, document: &str, issues: &[Issue]) -> Result<UpdateOutcome> {
        let marker = &self.config.latest_changes_header;
        let region = self.merger.owned_region(document, marker)?;

        let (candidates, skipped_released) = self.partition_released(document, issues)?;

        let rendered = self.render_section(&candidates)?;
        let unmatched = rendered.unmatched().to_vec();

        let section = if rendered.is_empty() {
            match self.config.empty_section {
                EmptySectionPolicy::Clear => String::new(),
                EmptySectionPolicy::Placeholder => {
                    format!("{}\n\n", self.config.placeholder_text.trim())
                }
                EmptySectionPolicy::Keep => {
                    return Ok(UpdateOutcome {
                        content: document.to_string(),
                        changed: false,
                        report: MergeReport::default(),
                        unmatched,
                        skipped_released,
                    });
                }
            }
        } else {
            rendered.text
        };

        let content = self.merger.merge(document, marker, &section)?;
        let report = MergeReport::between(region.slice(document), &section);

        Ok(UpdateOutcome {
            changed: content != document,
            content,
            report,
            unmatched,
            skipped_released,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LabelConfig, UnlabeledConfig};
    use crate::error::ChangelogError;
    use crate::types::LabelSet;

    fn config() -> ChangelogConfig {
        ChangelogConfig {
            labels: vec![
                LabelConfig::new("feature", "Features"),
                LabelConfig::new("bug", "Fixes"),
            ],
            ..ChangelogConfig::default()
        }
    }

    fn issue(number: u64, title: &str, labels: &[&str]) -> Issue {
        Issue::new(number, title, labels.iter().copied().collect(), "")
    }

    const DOCUMENT: &str = "\
# Changelog

### Latest Changes

### 0.1.0

#### Fixes

- Fix install script (#1)
";

    #[test]
    fn update_renders_into_owned_region() {
        let updater = ChangelogUpdater::new(config()).unwrap();
        let issues = vec![
            issue(2, "Add dark mode", &["feature"]),
            issue(3, "Fix crash", &["bug"]),
            issue(4, "Question", &[]),
        ];

        let outcome = updater.update(DOCUMENT, &issues).unwrap();

        assert!(outcome.changed);
        assert_eq!(
            outcome.content,
            "\
# Changelog

### Latest Changes

#### Features

- Add dark mode (#2)

#### Fixes

- Fix crash (#3)

### 0.1.0

#### Fixes

- Fix install script (#1)
"
        );
        assert_eq!(outcome.report.added, [2, 3]);
        assert_eq!(outcome.unmatched.len(), 1);
        assert_eq!(outcome.unmatched[0].number, 4);
    }

    #[test]
    fn second_update_with_same_issues_changes_nothing() {
        let updater = ChangelogUpdater::new(config()).unwrap();
        let issues = vec![issue(2, "Add dark mode", &["feature"])];

        let first = updater.update(DOCUMENT, &issues).unwrap();
        let second = updater.update(&first.content, &issues).unwrap();

        assert!(!second.changed);
        assert_eq!(first.content, second.content);
        assert!(second.report.is_empty());
        assert_eq!(second.report.retained, [2]);
    }

    #[test]
    fn released_issues_are_skipped() {
        let updater = ChangelogUpdater::new(config()).unwrap();
        let issues = vec![
            issue(1, "Fix install script", &["bug"]),
            issue(5, "Fix typo", &["bug"]),
        ];

        let outcome = updater.update(DOCUMENT, &issues).unwrap();

        assert_eq!(outcome.skipped_released, [1]);
        assert_eq!(outcome.content.matches("(#1)").count(), 1);
        assert!(outcome.content.contains("- Fix typo (#5)\n\n### 0.1.0"));
    }

    #[test]
    fn released_issues_are_kept_when_skipping_is_disabled() {
        let updater = ChangelogUpdater::new(ChangelogConfig {
            skip_released: false,
            ..config()
        })
        .unwrap();
        let outcome = updater
            .update(DOCUMENT, &[issue(1, "Fix install script", &["bug"])])
            .unwrap();
        assert!(outcome.skipped_released.is_empty());
        assert_eq!(outcome.content.matches("(#1)").count(), 2);
    }

    #[test]
    fn released_numbers_ignore_owned_region() {
        let updater = ChangelogUpdater::new(config()).unwrap();
        let first = updater
            .update(DOCUMENT, &[issue(9, "New thing", &["feature"])])
            .unwrap();
        let released: Vec<_> = updater
            .released_issue_numbers(&first.content)
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(released, [1]);
    }

    #[test]
    fn empty_section_policies() {
        let issues = vec![issue(4, "Question", &[])];
        let previous = "### Latest Changes\n\n- Stale (#8)\n";

        let clear = ChangelogUpdater::new(config()).unwrap();
        let outcome = clear.update(previous, &issues).unwrap();
        assert_eq!(outcome.content, "### Latest Changes\n\n");
        assert_eq!(outcome.report.removed, [8]);

        let keep = ChangelogUpdater::new(ChangelogConfig {
            empty_section: EmptySectionPolicy::Keep,
            ..config()
        })
        .unwrap();
        let outcome = keep.update(previous, &issues).unwrap();
        assert!(!outcome.changed);
        assert_eq!(outcome.content, previous);

        let placeholder = ChangelogUpdater::new(ChangelogConfig {
            empty_section: EmptySectionPolicy::Placeholder,
            placeholder_text: "Nothing yet.".to_string(),
            ..config()
        })
        .unwrap();
        let outcome = placeholder.update(previous, &issues).unwrap();
        assert_eq!(outcome.content, "### Latest Changes\n\nNothing yet.\n\n");
    }

    #[test]
    fn unlabeled_issues_use_fallback_header() {
        let updater = ChangelogUpdater::new(ChangelogConfig {
            unlabeled: Some(UnlabeledConfig {
                header: "Other".to_string(),
            }),
            ..config()
        })
        .unwrap();
        let section = updater
            .render_section(&[issue(4, "Question", &[]), issue(5, "Fix", &["bug"])])
            .unwrap();
        assert_eq!(
            section.text,
            "#### Fixes\n\n- Fix (#5)\n\n#### Other\n\n- Question (#4)\n\n"
        );
        assert_eq!(section.unmatched().len(), 1);
    }

    #[test]
    fn missing_marker_fails_before_rendering() {
        let updater = ChangelogUpdater::new(config()).unwrap();
        let err = updater
            .update("# Changelog\n", &[Issue::new(1, "", LabelSet::new(), "")])
            .unwrap_err();
        assert!(matches!(err, ChangelogError::MarkerNotFound { .. }));
    }

    #[test]
    fn malformed_issue_aborts_update() {
        let updater = ChangelogUpdater::new(config()).unwrap();
        let err = updater
            .update(DOCUMENT, &[issue(2, "Fine", &["bug"]), issue(0, "Zero", &["bug"])])
            .unwrap_err();
        assert!(matches!(err, ChangelogError::MalformedIssue { .. }));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let result = ChangelogUpdater::new(ChangelogConfig {
            labels: Vec::new(),
            ..ChangelogConfig::default()
        });
        assert!(matches!(result, Err(ChangelogError::InvalidConfig(_))));
    }

    struct PlainFormatter;

    impl SectionFormatter for PlainFormatter {
        fn format(&self, buckets: &CategoryBuckets, _rules: &[LabelRule]) -> String {
            buckets
                .iter()
                .flat_map(|(_, issues)| issues.iter())
                .map(|issue| format!("* {}\n", issue.title))
                .collect()
        }
    }

    #[test]
    fn custom_formatter_is_used() {
        let updater = ChangelogUpdater::new(config())
            .unwrap()
            .with_formatter(PlainFormatter);
        let outcome = updater
            .update("### Latest Changes\n", &[issue(3, "Fix crash", &["bug"])])
            .unwrap();
        assert_eq!(outcome.content, "### Latest Changes\n\n* Fix crash\n");
    }

    #[test]
    fn malformed_issue_is_reported_even_when_released() {
        let updater = ChangelogUpdater::new(config()).unwrap();
        let err = updater
            .update(DOCUMENT, &[issue(1, "   ", &["bug"])])
            .unwrap_err();
        assert!(matches!(
            err,
            ChangelogError::MalformedIssue { number: Some(1), .. }
        ));
    }

    #[test]
    fn placeholder_run_twice_is_stable() {
        let updater = ChangelogUpdater::new(ChangelogConfig {
            empty_section: EmptySectionPolicy::Placeholder,
            placeholder_text: "_Nothing yet_".to_string(),
            ..config()
        })
        .unwrap();

        let first = updater.update(DOCUMENT, &[]).unwrap();
        let second = updater.update(&first.content, &[]).unwrap();
        assert!(first.content.contains("### Latest Changes\n\n_Nothing yet_\n\n### 0.1.0"));
        assert!(!second.changed);

        let heading_like = ChangelogUpdater::new(ChangelogConfig {
            empty_section: EmptySectionPolicy::Placeholder,
            placeholder_text: "## Nothing yet".to_string(),
            ..config()
        });
        assert!(matches!(heading_like, Err(ChangelogError::InvalidConfig(_))));
    }

    #[test]
    fn entry_template_drives_bullets_and_release_detection() {
        let updater = ChangelogUpdater::new(ChangelogConfig {
            entry_template: Some("* {{ title }} (#{{ number }})".to_string()),
            ..config()
        })
        .unwrap();
        let issues = vec![
            issue(1, "Fix install script", &["bug"]),
            issue(6, "Add export", &["feature"]),
        ];

        let first = updater.update(DOCUMENT, &issues).unwrap();
        assert!(first.content.contains("#### Features\n\n* Add export (#6)\n\n### 0.1.0"));
        assert_eq!(first.skipped_released, [1]);

        let second = updater.update(&first.content, &issues).unwrap();
        assert!(!second.changed);
        assert_eq!(second.report.retained, [6]);
    }
}
