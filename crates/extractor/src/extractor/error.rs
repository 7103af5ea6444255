use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractorError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("http error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("url parse error: {0}")]
    UrlParseError(#[from] url::ParseError),
    #[error("tls error: {0}")]
    TlsError(String),
    #[error("unsupported extractor")]
    UnsupportedExtractor,
    #[error("{0}")]
    LoginRequired(String),
    #[error("could not find token")]
    TokenNotFound,
    #[error("hls playlist error: {0}")]
    HlsPlaylistError(String),
    #[error("cookie file error: {0}")]
    CookieFileError(String),
    #[error("validation error: {0}")]
    ValidationError(String),
}

impl ExtractorError {
    /// Errors the user can fix on their side (cookies, url) rather than bugs or outages.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            ExtractorError::InvalidUrl(_)
                | ExtractorError::UnsupportedExtractor
                | ExtractorError::LoginRequired(_)
                | ExtractorError::CookieFileError(_)
        )
    }
}
