use crate::error::ChangelogError;
use crate::types::{CategoryBuckets, Issue, LabelRule, LabelSet, Result};
use crate::utils::{BULLET_PATTERN, TEMPLATE_PLACEHOLDER_PATTERN, issue_numbers};
use regex::Captures;

pub trait SectionFormatter: Send + Sync {
    /// Renders the buckets of `rules`, in the order of `rules`
    fn format(&self, buckets: &CategoryBuckets, rules: &[LabelRule]) -> String;
}

/// Markdown output: a heading per non-empty category followed by one bullet
/// per issue.
///
/// ```text
/// #### Features
///
/// - Add dark mode ([#2](https://github.com/owner/repo/issues/2))
///
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownSectionFormatter;

impl SectionFormatter for MarkdownSectionFormatter {
    fn format(&self, buckets: &CategoryBuckets, rules: &[LabelRule]) -> String {
        format_sections(buckets, rules, format_issue_line)
    }
}

/// Same layout as [`MarkdownSectionFormatter`], with each bullet produced by
/// an entry template such as `- {{ title }} by the team (#{{ number }})`.
///
/// Placeholders are `number`, `title`, `url` and `labels`, optionally written
/// `issue.<field>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSectionFormatter {
    template: String,
}

const TEMPLATE_FIELDS: [&str; 4] = ["number", "title", "url", "labels"];

impl TemplateSectionFormatter {
    /// Checks `template` and builds the formatter.
    ///
    /// The template must be one line starting with a `- ` or `* ` bullet,
    /// use known placeholders only, and render a trailing issue reference
    /// (`(#{{ number }})` or `([#{{ number }}]({{ url }}))`) so later runs
    /// can tell which issues a section already lists.
    ///
    /// # Errors
    /// Returns `InvalidConfig` describing the first problem found
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        if template.contains('\n') || template.contains('\r') {
            return Err(ChangelogError::invalid_config("entry_template must be a single line"));
        }
        if !BULLET_PATTERN.is_match(&template) {
            return Err(ChangelogError::invalid_config(
                "entry_template must start with a '- ' or '* ' bullet",
            ));
        }
        if let Some(unknown) = TEMPLATE_PLACEHOLDER_PATTERN
            .captures_iter(&template)
            .filter_map(|caps| caps.get(1))
            .map(|field| field.as_str())
            .find(|field| !TEMPLATE_FIELDS.contains(field))
        {
            return Err(ChangelogError::invalid_config(format!(
                "entry_template uses unknown placeholder '{unknown}'"
            )));
        }

        let formatter = Self { template };
        let sample = Issue::new(
            4242,
            "Sample",
            LabelSet::new(),
            "https://example.com/issues/4242",
        );
        if !issue_numbers(&formatter.entry(&sample)).contains(&4242) {
            return Err(ChangelogError::invalid_config(
                "entry_template must end with an issue reference such as (#{{ number }})",
            ));
        }
        Ok(formatter)
    }

    #[must_use]
    pub fn entry(&self, issue: &Issue) -> String {
        TEMPLATE_PLACEHOLDER_PATTERN
            .replace_all(&self.template, |caps: &Captures<'_>| match &caps[1] {
                "number" => issue.number.to_string(),
                "title" => single_line(&issue.title),
                "url" => issue.url.trim().to_string(),
                "labels" => issue.labels.to_string(),
                _ => caps[0].to_string(),
            })
            .into_owned()
    }
}

impl SectionFormatter for TemplateSectionFormatter {
    fn format(&self, buckets: &CategoryBuckets, rules: &[LabelRule]) -> String {
        format_sections(buckets, rules, |issue| self.entry(issue))
    }
}

fn format_sections<F>(buckets: &CategoryBuckets, rules: &[LabelRule], entry: F) -> String
where
    F: Fn(&Issue) -> String,
{
    let mut formatted = String::with_capacity(1024);

    for rule in rules {
        let Some(issues) = buckets.get(rule) else {
            continue;
        };
        if issues.is_empty() {
            continue;
        }

        formatted.push_str(&rule.heading());
        formatted.push_str("\n\n");
        for issue in issues {
            formatted.push_str(&entry(issue));
            formatted.push('\n');
        }
        formatted.push('\n');
    }

    formatted
}

/// Renders the section for `buckets` with [`MarkdownSectionFormatter`]
#[must_use]
pub fn render(buckets: &CategoryBuckets, rules: &[LabelRule]) -> String {
    MarkdownSectionFormatter.format(buckets, rules)
}

/// `- <title> ([#<number>](<url>))`, or `- <title> (#<number>)` without a url
#[must_use]
pub fn format_issue_line(issue: &Issue) -> String {
    let title = single_line(&issue.title);
    let url = issue.url.trim();
    if url.is_empty() {
        format!("- {title} (#{})", issue.number)
    } else {
        format!("- {title} ([#{}]({url}))", issue.number)
    }
}

fn single_line(title: &str) -> String {
    title
        .lines()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
