use crate::{
    cli::OutputFormat,
    error::{AppError, Result},
};
use audible_extractor::extractor::ClientOptions;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::info;

/// Settings stored in `<config dir>/audible-cli/config.toml`.
///
/// Command-line flags take precedence over every field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub output_format: OutputFormat,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Netscape cookies.txt used when no cookies are given on the command line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookies_file: Option<PathBuf>,
    pub colored_output: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Pretty,
            timeout_secs: ClientOptions::default().timeout.as_secs(),
            user_agent: None,
            cookies_file: None,
            colored_output: true,
        }
    }
}

impl AppConfig {
    pub fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("audible-cli").join("config.toml"))
            .ok_or_else(|| AppError::Config("cannot determine the config directory".to_string()))
    }

    fn resolve_path(path: Option<&Path>) -> Result<PathBuf> {
        match path {
            Some(path) => Ok(path.to_path_buf()),
            None => Self::default_path(),
        }
    }

    /// Loads the configuration, writing the defaults first if the file does not exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = Self::resolve_path(path)?;
        if !path.exists() {
            let config = Self::default();
            config.save(&path)?;
            info!("Created default config at {}", path.display());
            return Ok(config);
        }

        let data = fs::read_to_string(&path)?;
        Ok(toml::from_str(&data)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.show()?)?;
        Ok(())
    }

    /// Overwrites the file with the defaults and returns where it lives.
    pub fn reset(path: Option<&Path>) -> Result<PathBuf> {
        let path = Self::resolve_path(path)?;
        Self::default().save(&path)?;
        Ok(path)
    }

    pub fn show(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// HTTP client settings, with command-line overrides applied.
    pub fn client_options(&self, timeout_secs: Option<u64>, user_agent: Option<&str>) -> ClientOptions {
        let defaults = ClientOptions::default();
        ClientOptions {
            timeout: Duration::from_secs(timeout_secs.unwrap_or(self.timeout_secs)),
            user_agent: user_agent
                .map(ToOwned::to_owned)
                .or_else(|| self.user_agent.clone())
                .unwrap_or(defaults.user_agent),
        }
    }
}
