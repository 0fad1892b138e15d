use thiserror::Error;

/// Errors produced by the changelog engine
#[derive(Error, Debug)]
pub enum ChangelogError {
    #[error("Malformed issue {}: {reason}", issue_label(.number))]
    MalformedIssue { number: Option<u64>, reason: String },

    #[error("Latest changes marker '{marker}' not found in changelog")]
    MarkerNotFound { marker: String },

    #[error("Invalid changelog configuration: {0}")]
    InvalidConfig(String),

    #[error("{0}: {1}")]
    WithContext(String, Box<ChangelogError>),
}

fn issue_label(number: &Option<u64>) -> String {
    number.map_or_else(|| "without a number".to_string(), |n| format!("#{n}"))
}

impl ChangelogError {
    pub fn malformed_issue<S: Into<String>>(number: Option<u64>, reason: S) -> Self {
        Self::MalformedIssue {
            number,
            reason: reason.into(),
        }
    }

    pub fn marker_not_found<S: Into<String>>(marker: S) -> Self {
        Self::MarkerNotFound {
            marker: marker.into(),
        }
    }

    pub fn invalid_config<S: Into<String>>(message: S) -> Self {
        Self::InvalidConfig(message.into())
    }

    #[must_use]
    pub fn with_context<C: Into<String>>(self, context: C) -> Self {
        Self::WithContext(context.into(), Box::new(self))
    }

    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::MalformedIssue { number, reason } => {
                format!("Issue {} cannot be used: {reason}", issue_label(number))
            }
            Self::MarkerNotFound { marker } => format!(
                "The changelog does not contain the line '{marker}'. Add it where new changes should be listed"
            ),
            Self::InvalidConfig(msg) => format!("Invalid configuration: {msg}"),
            Self::WithContext(ctx, err) => format!("{ctx}: {}", err.user_message()),
        }
    }
}
