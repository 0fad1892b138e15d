use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Changelog error: {0}")]
    Changelog(#[from] changelog::ChangelogError),

    #[error("Issue tracker error: {0}")]
    Tracker(#[from] tracker::TrackerError),

    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Configuration serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("Configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("Configuration file already exists: {0}")]
    ConfigExists(PathBuf),

    #[error("Changelog file not found: {0}")]
    ChangelogNotFound(PathBuf),

    #[error("No repository configured")]
    MissingRepository,

    #[error("Changelog is out of date: {0}")]
    OutOfDate(PathBuf),

    #[error("{0}: {1}")]
    WithContext(String, Box<CliError>),
}

impl CliError {
    pub fn with_context<C: Into<String>>(self, context: C) -> Self {
        Self::WithContext(context.into(), Box::new(self))
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::Io(err) => format!("I/O operation failed: {err}"),
            Self::Changelog(err) => err.user_message(),
            Self::Tracker(err) => err.user_message(),
            Self::ConfigParse(err) => format!("Failed to parse configuration: {err}"),
            Self::ConfigSerialize(err) => format!("Failed to write configuration: {err}"),
            Self::ConfigNotFound(path) => {
                format!("Configuration file not found at: {}", path.display())
            }
            Self::ConfigExists(path) => format!(
                "Configuration file already exists at: {} (use --force to overwrite)",
                path.display()
            ),
            Self::ChangelogNotFound(path) => format!(
                "Changelog not found at: {} (run `autochangelog init` to create one)",
                path.display()
            ),
            Self::MissingRepository => "No repository configured. Pass --repository owner/name, set GITHUB_REPOSITORY, or set github.repository in the configuration".to_string(),
            Self::OutOfDate(path) => format!(
                "{} is out of date. Run `autochangelog update` to refresh it",
                path.display()
            ),
            Self::WithContext(ctx, err) => format!("{ctx}: {}", err.user_message()),
        }
    }
}

pub type Result<T> = std::result::Result<T, CliError>;

pub trait ResultExt<T> {
    fn with_context<C, F>(self, context: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<CliError>,
{
    fn with_context<C, F>(self, context: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|err| {
            let cli_err: CliError = err.into();
            cli_err.with_context(context())
        })
    }
}
