use std::fmt;

use serde::Deserialize;
use tracing::warn;

use crate::extractor::utils::deserialize_lenient_f64;
use crate::media::Chapter;

/// Retailer identifier (ASIN) taken from the last path segment of a product url.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BookId(String);

impl BookId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hidden-form token scraped from the cloud player page.
///
/// Not `Clone`: it is moved into the single license request it was fetched for.
#[derive(Debug, PartialEq, Eq)]
pub struct LicenseToken(String);

impl LicenseToken {
    pub(crate) fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseResponse {
    #[serde(rename = "hlscontentLicenseUrl", default)]
    pub hls_content_license_url: Option<String>,
    // seconds
    #[serde(default, deserialize_with = "deserialize_lenient_f64")]
    pub run_time: Option<f64>,
    #[serde(default)]
    pub cloud_player_chapters: Option<Vec<CloudPlayerChapter>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudPlayerChapter {
    // milliseconds
    #[serde(default, deserialize_with = "deserialize_lenient_f64")]
    pub chapter_start_position: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_lenient_f64")]
    pub chapter_end_position: Option<f64>,
    #[serde(default)]
    pub chapter_title: Option<String>,
}

impl LicenseResponse {
    pub fn hls_url(&self) -> Option<&str> {
        self.hls_content_license_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Chapters in seconds, or nothing at all if any entry lacks a start or end.
    pub fn chapters(&self) -> Vec<Chapter> {
        let Some(entries) = &self.cloud_player_chapters else {
            return Vec::new();
        };

        let mut chapters = Vec::with_capacity(entries.len());
        for entry in entries {
            let (Some(start), Some(end)) = (entry.chapter_start_position, entry.chapter_end_position)
            else {
                warn!("Missing chapter information");
                return Vec::new();
            };

            let title = entry
                .chapter_title
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(ToOwned::to_owned);
            chapters.push(Chapter::from_millis(start, end, title));
        }
        chapters
    }
}
