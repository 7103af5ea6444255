use audible_extractor::extractor::error::ExtractorError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Extractor(#[from] ExtractorError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to write configuration: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Failures caused by user input (bad url, missing login) rather than the tool.
    pub fn is_user_error(&self) -> bool {
        match self {
            AppError::Extractor(e) => e.is_expected(),
            AppError::ConfigParse(_) | AppError::Config(_) => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
