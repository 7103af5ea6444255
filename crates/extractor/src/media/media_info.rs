use chrono::{Datelike, NaiveDate};
use rustc_hash::FxHashMap;

use super::chapter::{Chapter, Thumbnail};
use super::stream_info::StreamInfo;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
/// Everything a downloader needs to fetch and tag one audiobook.
///
/// `chapters` and `thumbnails` are either absent or non-empty: the builder
/// collapses empty lists to `None` and they are skipped when serializing.
///
/// # Examples
///
/// ```rust
/// use audible_extractor::media::{MediaInfo, Thumbnail};
///
/// let media = MediaInfo::builder("B01LZB4R8W", "https://www.audible.com/pd/B01LZB4R8W", "Sample Book")
///     .author(Some("Sample Author".to_string()))
///     .thumbnails(vec![Thumbnail::new("https://example.com/og.jpg", 210)])
///     .chapters(vec![])
///     .build();
///
/// assert_eq!(media.uploader.as_deref(), Some("Sample Author"));
/// assert!(media.chapters.is_none());
/// let json = media.to_json().unwrap();
/// assert!(!json.contains("\"chapters\""));
/// ```
pub struct MediaInfo {
    pub id: String,
    // product page the record was extracted from
    pub site_url: String,
    pub title: String,
    pub author: Option<String>,
    pub uploader: Option<String>,
    pub narrator: Option<String>,
    // retailer format label, e.g. "Unabridged Audiobook"
    pub format_label: Option<String>,
    pub publisher: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub release_year: Option<i32>,
    // seconds
    pub duration: Option<f64>,
    pub formats: Vec<StreamInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapters: Option<Vec<Chapter>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnails: Option<Vec<Thumbnail>>,
    pub headers: Option<FxHashMap<String, String>>,
}

impl MediaInfo {
    pub fn builder(
        id: impl Into<String>,
        site_url: impl Into<String>,
        title: impl Into<String>,
    ) -> MediaInfoBuilder {
        MediaInfoBuilder::new(id, site_url, title)
    }

    /// Highest-preference thumbnail, if any.
    pub fn best_thumbnail(&self) -> Option<&Thumbnail> {
        self.thumbnails.as_ref().and_then(|t| t.first())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

#[derive(Debug, Clone)]
pub struct MediaInfoBuilder {
    inner: MediaInfo,
}

impl MediaInfoBuilder {
    pub fn new(id: impl Into<String>, site_url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            inner: MediaInfo {
                id: id.into(),
                site_url: site_url.into(),
                title: title.into(),
                author: None,
                uploader: None,
                narrator: None,
                format_label: None,
                publisher: None,
                release_date: None,
                release_year: None,
                duration: None,
                formats: Vec::new(),
                chapters: None,
                thumbnails: None,
                headers: None,
            },
        }
    }

    /// The author is also reported as the uploader.
    pub fn author(mut self, author: Option<String>) -> Self {
        self.inner.uploader = author.clone();
        self.inner.author = author;
        self
    }

    pub fn narrator(mut self, narrator: Option<String>) -> Self {
        self.inner.narrator = narrator;
        self
    }

    pub fn format_label(mut self, format_label: Option<String>) -> Self {
        self.inner.format_label = format_label;
        self
    }

    pub fn publisher(mut self, publisher: Option<String>) -> Self {
        self.inner.publisher = publisher;
        self
    }

    pub fn release_date(mut self, release_date: Option<NaiveDate>) -> Self {
        self.inner.release_year = release_date.map(|d| d.year());
        self.inner.release_date = release_date;
        self
    }

    pub fn duration(mut self, duration: Option<f64>) -> Self {
        self.inner.duration = duration;
        self
    }

    pub fn formats(mut self, formats: Vec<StreamInfo>) -> Self {
        self.inner.formats = formats;
        self
    }

    pub fn chapters(mut self, chapters: Vec<Chapter>) -> Self {
        self.inner.chapters = (!chapters.is_empty()).then_some(chapters);
        self
    }

    /// Stores the thumbnails ordered by descending preference.
    pub fn thumbnails(mut self, mut thumbnails: Vec<Thumbnail>) -> Self {
        thumbnails.sort_by(|a, b| b.preference.cmp(&a.preference));
        self.inner.thumbnails = (!thumbnails.is_empty()).then_some(thumbnails);
        self
    }

    pub fn headers(mut self, headers: FxHashMap<String, String>) -> Self {
        self.inner.headers = Some(headers);
        self
    }

    pub fn build(self) -> MediaInfo {
        self.inner
    }
}
