use crate::cookies::domain_matches;
use crate::media::media_info::MediaInfo;

use super::error::ExtractorError;
use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use tracing::debug;
use url::Url;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE_EN: &str = "en-US,en;q=0.9";

/// Request state shared by every call of one extraction: the client, the
/// headers the site expects and the session cookies supplied from outside.
///
/// Cookies are only replayed, never obtained by logging in, and whatever the
/// server sets in responses is not kept. They are scoped to one domain and its
/// subdomains (by default the host of `url`); requests to any other host go
/// out without a `Cookie` header.
///
/// # Example Usage
///
/// ```rust,no_run
/// # use reqwest::Client;
/// # use audible_extractor::extractor::platform_extractor::Extractor;
/// let mut extractor = Extractor::new("Audible", "https://www.audible.com/pd/Some-Book/B000000000", Client::new());
///
/// // Cookie header copied from a signed-in browser
/// extractor.set_cookies_from_string("session-id=123-456; ubid-main=789");
/// assert!(extractor.has_cookie("session-id"));
/// ```
#[derive(Debug, Clone)]
pub struct Extractor {
    // product page, e.g. "https://www.audible.com/pd/Title-Audiobook/B01LZB4R8W"
    pub url: String,
    pub platform_name: String,
    pub client: Client,
    headers: HeaderMap,
    // ordered so the rendered Cookie header is stable between runs
    cookies: BTreeMap<String, String>,
    cookie_domain: Option<String>,
}

impl Extractor {
    pub fn new(platform_name: impl Into<String>, url: impl Into<String>, client: Client) -> Self {
        let url = url.into();
        let cookie_domain = Url::parse(&url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_owned));

        let mut headers = HeaderMap::with_capacity(4);
        headers.insert(header::ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static(ACCEPT_LANGUAGE_EN),
        );

        Self {
            url,
            platform_name: platform_name.into(),
            client,
            headers,
            cookies: BTreeMap::new(),
            cookie_domain,
        }
    }

    pub fn set_referer_static(&mut self, referer: &'static str) {
        self.headers
            .insert(header::REFERER, HeaderValue::from_static(referer));
    }

    /// Restricts the session cookies to `domain` and its subdomains.
    pub fn set_cookie_domain(&mut self, domain: impl Into<String>) {
        self.cookie_domain = Some(domain.into());
    }

    fn sends_cookies_to(&self, url: &str) -> bool {
        let Some(domain) = self.cookie_domain.as_deref() else {
            return false;
        };
        Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(|host| domain_matches(host, domain, true)))
            .unwrap_or(false)
    }

    pub fn add_cookie(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.cookies.insert(name.into(), value.into());
    }

    /// Adds every `name=value` pair of a `Cookie` header style string.
    ///
    /// Pairs may be separated by `;` or newlines; pairs without a name or a
    /// value are ignored. Later pairs overwrite earlier ones with the same name.
    ///
    /// ```rust,no_run
    /// # use reqwest::Client;
    /// # use audible_extractor::extractor::platform_extractor::Extractor;
    /// # let mut extractor = Extractor::new("Audible", "https://www.audible.com", Client::new());
    /// extractor.set_cookies_from_string("session-token=abc; at-main=def");
    /// ```
    pub fn set_cookies_from_string(&mut self, cookie_string: &str) {
        let pairs = cookie_string
            .split([';', '\n'])
            .filter_map(|part| part.split_once('='))
            .map(|(name, value)| (name.trim(), value.trim()))
            .filter(|(name, value)| !name.is_empty() && !value.is_empty());

        for (name, value) in pairs {
            self.add_cookie(name, value);
        }
    }

    pub fn has_cookie(&self, name: &str) -> bool {
        self.cookies.contains_key(name)
    }

    pub fn get_cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    pub fn cookie_count(&self) -> usize {
        self.cookies.len()
    }

    fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        let header = self
            .cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ");
        Some(header)
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        self.request(Method::GET, url)
    }

    pub fn post(&self, url: &str) -> RequestBuilder {
        self.request(Method::POST, url)
    }

    /// Builds a request carrying the site headers, plus the session cookies
    /// when `url` is inside the cookie domain.
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let mut headers = self.headers.clone();

        let cookies = self
            .cookie_header()
            .filter(|_| self.sends_cookies_to(url));
        if !self.cookies.is_empty() && cookies.is_none() {
            debug!("Withholding cookies from {}", url);
        }

        if let Some(cookies) = cookies {
            match HeaderValue::from_str(&cookies) {
                Ok(value) => {
                    headers.insert(header::COOKIE, value);
                }
                // control characters in a cookie value
                Err(e) => debug!(error = %e, "Dropping invalid Cookie header"),
            }
        }

        self.client.request(method, url).headers(headers)
    }

    pub fn get_platform_headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Headers a downloader has to replay, as plain strings.
    pub fn get_platform_headers_map(&self) -> FxHashMap<String, String> {
        self.headers
            .iter()
            .filter_map(|(name, value)| {
                let value = value.to_str().ok()?;
                Some((name.as_str().to_owned(), value.to_owned()))
            })
            .collect()
    }
}

#[async_trait]
pub trait PlatformExtractor: Send + Sync {
    fn get_extractor(&self) -> &Extractor;

    fn get_platform_headers(&self) -> &HeaderMap {
        self.get_extractor().get_platform_headers()
    }

    async fn extract(&self) -> Result<MediaInfo, ExtractorError>;
}
