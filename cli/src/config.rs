use crate::cli::CommonArgs;
use crate::error::{CliError, Result};
use crate::ui;
use changelog::ChangelogConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "autochangelog.toml";
pub const DEFAULT_CHANGELOG_FILE: &str = "CHANGELOG.md";
pub const DEFAULT_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// GitHub settings of the configuration file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Repository as `owner/name`
    pub repository: Option<String>,
    pub api_base: String,
    /// Environment variable holding the API token
    pub token_env: String,
    pub include_pull_requests: bool,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            repository: None,
            api_base: tracker::DEFAULT_API_BASE.to_string(),
            token_env: DEFAULT_TOKEN_ENV.to_string(),
            include_pull_requests: false,
        }
    }
}

/// Contents of `autochangelog.toml`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub changelog_file: PathBuf,
    pub github: GitHubConfig,
    pub changelog: ChangelogConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            changelog_file: PathBuf::from(DEFAULT_CHANGELOG_FILE),
            github: GitHubConfig::default(),
            changelog: ChangelogConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads a configuration file
    ///
    /// # Errors
    /// Returns `ConfigNotFound` if the file is missing and `ConfigParse` if it
    /// is not valid TOML for this schema
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CliError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| {
            CliError::from(e).with_context(format!("Failed to parse {}", path.display()))
        })?;
        Ok(config)
    }

    /// Resolves the configuration for a command: the explicit `--config` file,
    /// else `autochangelog.toml` if present, else built-in defaults. Command
    /// line overrides are applied last and the result is validated.
    ///
    /// # Errors
    /// Returns an error if an explicit file is missing, a file fails to parse,
    /// or the resulting changelog settings are invalid
    pub fn resolve(common: &CommonArgs) -> Result<Self> {
        let mut config = match &common.config {
            Some(path) => Self::load_from_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load_from_file(default_path)?
                } else {
                    if common.verbose {
                        ui::note_message(&format!(
                            "No {DEFAULT_CONFIG_FILE} found, using built-in defaults"
                        ));
                    }
                    Self::default()
                }
            }
        };

        config.apply_overrides(common);
        config.changelog.validate()?;
        Ok(config)
    }

    pub fn apply_overrides(&mut self, common: &CommonArgs) {
        if let Some(path) = &common.changelog_file {
            self.changelog_file.clone_from(path);
        }
        if let Some(marker) = &common.marker {
            self.changelog.latest_changes_header.clone_from(marker);
        }
    }

    /// The default configuration as a commented TOML document
    ///
    /// # Errors
    /// Returns `ConfigSerialize` if serialization fails
    pub fn default_toml() -> Result<String> {
        let body = toml::to_string_pretty(&Self::default())?;
        Ok(format!(
            "# autochangelog configuration\n\
             #\n\
             # Labels are matched exactly and case-sensitively. When an issue carries\n\
             # several configured labels, the first entry in this file wins, and\n\
             # sections are written in this order.\n\
             #\n\
             # Uncomment to list issues without a configured label under their own header:\n\
             # [changelog.unlabeled]\n\
             # header = \"Other Changes\"\n\n{body}"
        ))
    }
}
