use crate::error::Result;
use crate::source::IssueSource;
use changelog::{Issue, RawIssue};
use std::path::PathBuf;

/// Reads closed issues from a JSON array on disk.
///
/// Each element needs `number` and `title`; `labels` (names or `{ "name" }`
/// objects) and `url` are optional.
#[derive(Debug, Clone)]
pub struct JsonIssueSource {
    path: PathBuf,
}

impl JsonIssueSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parses issues from JSON text
    ///
    /// # Errors
    /// Returns `Json` for invalid JSON and `Issue` for records missing a
    /// number or title
    pub fn parse(content: &str) -> Result<Vec<Issue>> {
        let raw: Vec<RawIssue> = serde_json::from_str(content)?;
        let issues = raw
            .into_iter()
            .map(Issue::try_from)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(issues)
    }
}

impl IssueSource for JsonIssueSource {
    fn describe(&self) -> String {
        format!("issues file {}", self.path.display())
    }

    async fn fetch_closed_issues(&self) -> Result<Vec<Issue>> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        Self::parse(&content)
    }
}
