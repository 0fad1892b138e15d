use crate::error::{Result, TrackerError};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// A repository on the issue tracker, written `owner/name`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub owner: String,
    pub name: String,
}

impl Repository {
    /// Parses `owner/name`
    ///
    /// # Errors
    /// Returns `InvalidRepository` unless the value has exactly two non-empty parts
    pub fn parse(value: &str) -> Result<Self> {
        let trimmed = value.trim().trim_end_matches(".git");
        let mut parts = trimmed.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(name), None)
                if is_valid_part(owner) && is_valid_part(name) =>
            {
                Ok(Self {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(TrackerError::InvalidRepository(value.to_string())),
        }
    }
}

fn is_valid_part(part: &str) -> bool {
    !part.is_empty() && !part.chars().any(char::is_whitespace)
}

impl FromStr for Repository {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Display for Repository {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
