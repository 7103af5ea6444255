use std::sync::LazyLock;

use super::error::ExtractorError;
use super::platform_extractor::PlatformExtractor;
use crate::extractor::platforms::{self, audible::Audible};
use regex::Regex;
use reqwest::Client;
use tracing::debug;

// A type alias for a thread-safe constructor function.
type ExtractorConstructor = fn(String, Client, Option<String>) -> Box<dyn PlatformExtractor>;

struct PlatformEntry {
    name: &'static str,
    regex: &'static LazyLock<Regex>,
    constructor: ExtractorConstructor,
}

macro_rules! platform_registry {
    ( $( $name:literal : $regex:path => $builder:path ),+ $(,)? ) => {
        &[
            $(
                PlatformEntry {
                    name: $name,
                    regex: &$regex,
                    constructor: |url, client, cookies| {
                        Box::new($builder(url, client, cookies)) as Box<dyn PlatformExtractor>
                    },
                },
            )+
        ]
    };
}

// Static platform registry.
static PLATFORMS: &[PlatformEntry] = platform_registry![
    "audible": platforms::audible::URL_REGEX => Audible::new,
];

/// A factory for creating platform-specific extractors.
pub struct ExtractorFactory {
    client: Client,
}

impl ExtractorFactory {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Whether any registered platform accepts `url`; needs no client.
    pub fn is_supported(url: &str) -> bool {
        PLATFORMS.iter().any(|p| p.regex.is_match(url))
    }

    pub fn create_extractor(
        &self,
        url: &str,
        cookies: Option<String>,
    ) -> Result<Box<dyn PlatformExtractor>, ExtractorError> {
        let platform = PLATFORMS
            .iter()
            .find(|platform| platform.regex.is_match(url))
            .ok_or(ExtractorError::UnsupportedExtractor)?;

        debug!("Using the {} extractor for {}", platform.name, url);
        Ok((platform.constructor)(url.to_string(), self.client.clone(), cookies))
    }
}
