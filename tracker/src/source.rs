use crate::error::Result;
use changelog::Issue;
use std::future::Future;

/// Anything that can list the closed issues of a project
pub trait IssueSource: Send + Sync {
    /// Short human-readable description, used in progress output
    fn describe(&self) -> String;

    /// Fetches every closed issue, oldest first
    fn fetch_closed_issues(&self) -> impl Future<Output = Result<Vec<Issue>>> + Send;
}
