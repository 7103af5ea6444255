//! HTTP capability used by the extractors.
//!
//! Extractors never talk to `reqwest` directly; they go through [`SiteFetcher`]
//! so the whole request sequence of an extraction can be replayed against
//! canned pages.

use async_trait::async_trait;
use tracing::debug;

use super::error::ExtractorError;
use super::platform_extractor::Extractor;

#[async_trait]
pub trait SiteFetcher: Send + Sync {
    /// GET `url` and return the body as text. Non-2xx statuses are errors.
    async fn get_text(&self, url: &str) -> Result<String, ExtractorError>;

    /// POST `form` as `application/x-www-form-urlencoded` and return the body as text.
    async fn post_form(&self, url: &str, form: &[(&str, &str)])
    -> Result<String, ExtractorError>;
}

#[async_trait]
impl SiteFetcher for Extractor {
    async fn get_text(&self, url: &str) -> Result<String, ExtractorError> {
        debug!(platform = %self.platform_name, "GET {}", url);
        let response = self.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }

    async fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
    ) -> Result<String, ExtractorError> {
        debug!(platform = %self.platform_name, "POST {}", url);
        let response = self.post(url).form(form).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}
