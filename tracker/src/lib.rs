//! Issue sources feeding the changelog engine.

mod error;
mod file;
mod github;
mod repository;
mod source;

pub use error::{Result, TrackerError};
pub use file::JsonIssueSource;
pub use github::{DEFAULT_API_BASE, GitHubIssueSource};
pub use repository::Repository;
pub use source::IssueSource;
