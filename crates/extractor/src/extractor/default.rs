use super::error::ExtractorError;
use super::factory::ExtractorFactory;
use reqwest::Client;
use rustls::ClientConfig;
use rustls::crypto::aws_lc_rs;
use rustls_platform_verifier::BuilderVerifierExt;
use std::sync::Arc;
use std::time::Duration;

pub(crate) const DEFAULT_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Knobs for the shared HTTP client.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_UA.to_string(),
        }
    }
}

pub fn build_client(options: &ClientOptions) -> Result<Client, ExtractorError> {
    let provider = Arc::new(aws_lc_rs::default_provider());
    let tls_config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| ExtractorError::TlsError(e.to_string()))?
        .with_platform_verifier()
        .map_err(|e| ExtractorError::TlsError(e.to_string()))?
        .with_no_client_auth();

    Ok(Client::builder()
        .use_preconfigured_tls(tls_config)
        .user_agent(options.user_agent.as_str())
        .timeout(options.timeout)
        .build()?)
}

pub fn default_client() -> Result<Client, ExtractorError> {
    build_client(&ClientOptions::default())
}

/// Returns a new `ExtractorFactory` populated with all the supported platforms.
pub fn default_factory() -> Result<ExtractorFactory, ExtractorError> {
    Ok(ExtractorFactory::new(default_client()?))
}
