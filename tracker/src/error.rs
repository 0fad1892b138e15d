use thiserror::Error;

/// Result type alias for issue fetching
pub type Result<T> = std::result::Result<T, TrackerError>;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid issue record: {0}")]
    Issue(#[from] changelog::ChangelogError),

    #[error("Invalid repository '{0}', expected 'owner/name'")]
    InvalidRepository(String),

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limited by the issue tracker")]
    RateLimited,

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

impl TrackerError {
    pub fn api<S: Into<String>>(status: u16, message: S) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Io(err) => format!("Failed to read issues: {err}"),
            Self::Http(err) => format!("Request to the issue tracker failed: {err}"),
            Self::Json(err) => format!("Failed to parse issues: {err}"),
            Self::Issue(err) => err.user_message(),
            Self::InvalidRepository(value) => {
                format!("Invalid repository '{value}'. Use the form 'owner/name'")
            }
            Self::AuthFailed(msg) => {
                format!("Authentication failed: {msg}. Check the token passed with --token or GITHUB_TOKEN")
            }
            Self::NotFound(msg) => format!("Not found: {msg}"),
            Self::RateLimited => {
                "The issue tracker rate limit is exhausted. Retry later or provide a token".to_string()
            }
            Self::Api { status, message } => format!("Issue tracker returned {status}: {message}"),
        }
    }
}
