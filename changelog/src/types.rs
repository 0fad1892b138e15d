use crate::error::ChangelogError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};

/// Type alias for Result with `ChangelogError`
pub type Result<T> = std::result::Result<T, ChangelogError>;

/// Label names attached to an issue.
///
/// Membership is exact and case-sensitive: `Bug` and `bug` are different
/// labels. Duplicates collapse and iteration is sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelSet(BTreeSet<String>);

impl LabelSet {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeSet::new())
    }

    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.0.contains(label)
    }

    pub fn insert(&mut self, label: impl Into<String>) -> bool {
        self.0.insert(label.into())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for LabelSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl Display for LabelSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "no labels");
        }
        let joined = self.iter().collect::<Vec<_>>().join(", ");
        write!(f, "{joined}")
    }
}

/// A closed issue as handed to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub labels: LabelSet,
    pub url: String,
}

impl Issue {
    pub fn new(
        number: u64,
        title: impl Into<String>,
        labels: LabelSet,
        url: impl Into<String>,
    ) -> Self {
        Self {
            number,
            title: title.into(),
            labels,
            url: url.into(),
        }
    }

    /// Checks the fields every rendered bullet depends on
    ///
    /// # Errors
    /// Returns `MalformedIssue` when the number is zero or the title is blank
    pub fn validate(&self) -> Result<()> {
        if self.number == 0 {
            return Err(ChangelogError::malformed_issue(None, "issue number must be positive"));
        }
        if self.title.trim().is_empty() {
            return Err(ChangelogError::malformed_issue(
                Some(self.number),
                "title is empty",
            ));
        }
        Ok(())
    }
}

/// A label as it appears in issue payloads: either a bare name or an object
/// carrying a `name` field.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawLabel {
    Name(String),
    Object { name: String },
}

impl RawLabel {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) | Self::Object { name } => name,
        }
    }
}

/// Loosely typed issue record, as received from a tracker or an issues file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawIssue {
    pub number: Option<u64>,
    pub title: Option<String>,
    #[serde(default)]
    pub labels: Option<Vec<RawLabel>>,
    #[serde(default)]
    pub url: Option<String>,
}

impl TryFrom<RawIssue> for Issue {
    type Error = ChangelogError;

    fn try_from(raw: RawIssue) -> Result<Self> {
        let number = raw
            .number
            .ok_or_else(|| ChangelogError::malformed_issue(None, "issue number is missing"))?;
        let title = raw.title.ok_or_else(|| {
            ChangelogError::malformed_issue(Some(number), "title is missing")
        })?;
        let labels = raw
            .labels
            .unwrap_or_default()
            .iter()
            .map(|label| label.name().to_string())
            .collect();

        let issue = Self::new(number, title, labels, raw.url.unwrap_or_default());
        issue.validate()?;
        Ok(issue)
    }
}

/// Maps one label to a changelog category.
///
/// Rules are always kept in a `Vec`; their order is the category precedence
/// and the section order of the rendered output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LabelRule {
    pub label: String,
    pub header: String,
    pub header_prefix: String,
}

impl LabelRule {
    pub fn new(
        label: impl Into<String>,
        header: impl Into<String>,
        header_prefix: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            header: header.into(),
            header_prefix: header_prefix.into(),
        }
    }

    /// The heading line for this category, without a line terminator
    #[must_use]
    pub fn heading(&self) -> String {
        format!("{}{}", self.header_prefix, self.header)
    }
}

/// Issues grouped per rule, in rule order.
///
/// Every rule has a bucket, even an empty one. `unmatched` keeps the issues no
/// rule claimed so the caller can report them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryBuckets {
    rules: Vec<LabelRule>,
    buckets: Vec<Vec<Issue>>,
    unmatched: Vec<Issue>,
}

impl CategoryBuckets {
    #[must_use]
    pub fn new(rules: &[LabelRule]) -> Self {
        Self {
            rules: rules.to_vec(),
            buckets: vec![Vec::new(); rules.len()],
            unmatched: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, index: usize, issue: Issue) {
        if let Some(bucket) = self.buckets.get_mut(index) {
            bucket.push(issue);
        }
    }

    pub(crate) fn push_unmatched(&mut self, issue: Issue) {
        self.unmatched.push(issue);
    }

    /// The rules the buckets were built for, in order
    #[must_use]
    pub fn rules(&self) -> &[LabelRule] {
        &self.rules
    }

    /// Issues filed under `rule`, or `None` if the rule is not part of this grouping
    #[must_use]
    pub fn get(&self, rule: &LabelRule) -> Option<&[Issue]> {
        self.rules
            .iter()
            .position(|candidate| candidate == rule)
            .and_then(|idx| self.buckets.get(idx))
            .map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LabelRule, &[Issue])> + '_ {
        self.rules
            .iter()
            .zip(self.buckets.iter().map(Vec::as_slice))
    }

    #[must_use]
    pub fn unmatched(&self) -> &[Issue] {
        &self.unmatched
    }

    /// Number of issues filed under some rule
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }
}
