use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::{
    extractor::{
        error::ExtractorError,
        fetcher::SiteFetcher,
        hls_extractor::HlsExtractor,
        platform_extractor::{Extractor, PlatformExtractor},
        platforms::audible::{
            models::{BookId, LicenseResponse, LicenseToken},
            scrape::PageMetadata,
        },
        utils::capture_name_or_invalid_url,
    },
    html,
    media::MediaInfo,
};

pub static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?:[^/?#]+?\.)?audible\.com/pd/(?:.+)/(?P<id>[^/?#&]+)").unwrap()
});

const LOGIN_REQUIRED_MESSAGE: &str = "It is currently not possible to automate the login process for Audible. \
     You must log in with a browser, then export your cookies and pass them with --cookies or --cookies-file.";

pub struct Audible {
    pub extractor: Extractor,
    // replaces the cookie-aware client for every request when set
    fetcher: Option<Arc<dyn SiteFetcher>>,
}

impl Audible {
    const HOMEPAGE_URL: &str = "https://www.audible.com";

    // session cookies go to this domain and its subdomains only
    const COOKIE_DOMAIN: &str = "audible.com";

    const CLOUD_PLAYER_URL: &str = "https://www.audible.com/cloudplayer";

    const LICENSE_URL: &str = "https://www.audible.com/contentlicenseajax";

    const CLIENT_KEY: &str = "AudibleCloudPlayer";

    const LICENSE_ACTION: &str = "getUrl";

    // only rendered for signed-in sessions
    const LOGIN_MARKER_CLASS: &str = "ui-it-credit-balance";

    const M3U8_ID: &str = "hls";

    pub fn new(url: String, client: Client, cookies: Option<String>) -> Self {
        let mut extractor = Extractor::new("Audible", url, client);

        if let Some(cookies) = cookies {
            extractor.set_cookies_from_string(&cookies);
        }
        extractor.set_referer_static(Self::HOMEPAGE_URL);
        extractor.set_cookie_domain(Self::COOKIE_DOMAIN);

        Self {
            extractor,
            fetcher: None,
        }
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn SiteFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    fn fetcher(&self) -> &dyn SiteFetcher {
        match &self.fetcher {
            Some(fetcher) => fetcher.as_ref(),
            None => &self.extractor,
        }
    }

    pub fn book_id(&self) -> Result<BookId, ExtractorError> {
        capture_name_or_invalid_url(&URL_REGEX, "id", &self.extractor.url).map(BookId::new)
    }

    /// Fails with [`ExtractorError::LoginRequired`] unless the session cookies belong to a signed-in account.
    pub async fn check_login_status(&self) -> Result<(), ExtractorError> {
        let homepage = self.fetcher().get_text(Self::HOMEPAGE_URL).await?;

        if !html::has_class(&homepage, Self::LOGIN_MARKER_CLASS) {
            return Err(ExtractorError::LoginRequired(
                LOGIN_REQUIRED_MESSAGE.to_string(),
            ));
        }

        debug!("Audible session is logged in");
        Ok(())
    }

    pub async fn fetch_license_token(
        &self,
        book_id: &BookId,
    ) -> Result<LicenseToken, ExtractorError> {
        let url = format!("{}?asin={}", Self::CLOUD_PLAYER_URL, book_id);
        let page = self.fetcher().get_text(&url).await?;

        let mut inputs = html::hidden_inputs(&page);
        debug!("Cloud player form fields: {:?}", inputs.keys().collect::<Vec<_>>());

        inputs
            .remove("token")
            .map(LicenseToken::new)
            .ok_or(ExtractorError::TokenNotFound)
    }

    pub async fn resolve_license(
        &self,
        book_id: &BookId,
        token: LicenseToken,
    ) -> Result<LicenseResponse, ExtractorError> {
        let form = [
            ("asin", book_id.as_str()),
            ("token", token.as_str()),
            ("key", Self::CLIENT_KEY),
            ("action", Self::LICENSE_ACTION),
        ];

        let body = self.fetcher().post_form(Self::LICENSE_URL, &form).await?;
        let license: LicenseResponse = serde_json::from_str(&body)?;
        debug!(
            "License for {}: hls={:?}, chapters={}",
            book_id,
            license.hls_url(),
            license.cloud_player_chapters.as_ref().map_or(0, Vec::len)
        );

        Ok(license)
    }
}

#[async_trait]
impl HlsExtractor for Audible {
    fn hls_fetcher(&self) -> &dyn SiteFetcher {
        self.fetcher()
    }
}

#[async_trait]
impl PlatformExtractor for Audible {
    fn get_extractor(&self) -> &Extractor {
        &self.extractor
    }

    async fn extract(&self) -> Result<MediaInfo, ExtractorError> {
        let book_id = self.book_id()?;

        self.check_login_status().await?;

        let page = self.fetcher().get_text(&self.extractor.url).await?;
        let metadata = PageMetadata::from_html(&page)?;

        let token = self.fetch_license_token(&book_id).await?;
        let license = self.resolve_license(&book_id, token).await?;

        let formats = match license.hls_url() {
            Some(m3u8_url) => {
                self.extract_hls_formats_non_fatal(m3u8_url, Self::M3U8_ID)
                    .await
            }
            None => {
                warn!("License response for {} has no HLS manifest", book_id);
                Vec::new()
            }
        };
        let chapters = license.chapters();

        info!(
            "Extracted {}: {} formats, {} chapters",
            book_id,
            formats.len(),
            chapters.len()
        );

        Ok(
            MediaInfo::builder(book_id.as_str(), &self.extractor.url, metadata.title)
                .author(metadata.author)
                .narrator(metadata.narrator)
                .format_label(metadata.format_label)
                .publisher(metadata.publisher)
                .release_date(metadata.release_date)
                .duration(license.run_time)
                .formats(formats)
                .chapters(chapters)
                .thumbnails(metadata.thumbnails)
                .headers(self.extractor.get_platform_headers_map())
                .build(),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use rustc_hash::FxHashMap;
    use tracing::Level;

    use super::*;
    use crate::extractor::default::default_client;
    use crate::media::StreamProtocol;

    const PRODUCT_URL: &str =
        "https://www.audible.com/pd/Neil-Gaimans-How-the-Marquis-Got-His-Coat-Back-Audiobook/B01LZB4R8W";
    const CLOUD_PLAYER: &str = "https://www.audible.com/cloudplayer?asin=B01LZB4R8W";
    const MANIFEST_URL: &str = "https://dcdn.audible.com/hls/B01LZB4R8W/master.m3u8";

    const HOMEPAGE_SIGNED_IN: &str = r#"<html><body>
        <span class="bc-text ui-it-credit-balance">2 Credits</span>
    </body></html>"#;

    const HOMEPAGE_SIGNED_OUT: &str =
        r#"<html><body><a href="/signin">Sign In</a></body></html>"#;

    const PRODUCT_PAGE: &str = r#"<html><head>
        <meta property="og:title" content="How the Marquis Got His Coat Back">
        <meta property="og:image" content="https://m.media-amazon.com/og.jpg">
    </head><body>
        <img alt="How the Marquis Got His Coat Back cover art" src="https://m.media-amazon.com/cover.jpg">
        <li class="bc-list-item authorLabel">By: <a>Neil Gaiman</a></li>
        <li class="bc-list-item narratorLabel">Narrated by: <a>Full Cast</a></li>
        <li class="bc-list-item publisherLabel">Publisher: <a>BBC Worldwide Ltd</a></li>
        <li class="bc-list-item releaseDateLabel">Release date: 09-27-16</li>
    </body></html>"#;

    const CLOUD_PLAYER_PAGE: &str = r#"<form id="player">
        <input type="hidden" name="asin" value="B01LZB4R8W">
        <input type="hidden" name="token" value="tok-123">
    </form>"#;

    const MASTER: &str = "#EXTM3U
#EXT-X-STREAM-INF:BANDWIDTH=32000,CODECS=\"mp4a.40.2\"
32/index.m3u8
#EXT-X-STREAM-INF:BANDWIDTH=64000,CODECS=\"mp4a.40.2\"
64/index.m3u8
";

    const LICENSE: &str = r#"{
        "hlscontentLicenseUrl": "https://dcdn.audible.com/hls/B01LZB4R8W/master.m3u8",
        "runTime": 4140,
        "cloudPlayerChapters": [
            {"chapterStartPosition": 0, "chapterEndPosition": 60000, "chapterTitle": "Chapter 1"},
            {"chapterStartPosition": 60000, "chapterEndPosition": 4140000, "chapterTitle": "Chapter 2"}
        ]
    }"#;

    /// Serves canned bodies by url and records every request in order.
    #[derive(Default)]
    struct RecordingSite {
        pages: FxHashMap<String, String>,
        license: Option<String>,
        requests: Mutex<Vec<String>>,
    }

    impl RecordingSite {
        fn signed_in() -> Self {
            Self::default()
                .page(Audible::HOMEPAGE_URL, HOMEPAGE_SIGNED_IN)
                .page(PRODUCT_URL, PRODUCT_PAGE)
                .page(CLOUD_PLAYER, CLOUD_PLAYER_PAGE)
                .page(MANIFEST_URL, MASTER)
                .license(LICENSE)
        }

        fn page(mut self, url: &str, body: &str) -> Self {
            self.pages.insert(url.to_string(), body.to_string());
            self
        }

        fn without(mut self, url: &str) -> Self {
            self.pages.remove(url);
            self
        }

        fn license(mut self, body: &str) -> Self {
            self.license = Some(body.to_string());
            self
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SiteFetcher for RecordingSite {
        async fn get_text(&self, url: &str) -> Result<String, ExtractorError> {
            self.requests.lock().unwrap().push(format!("GET {url}"));
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| ExtractorError::ValidationError(format!("404 for {url}")))
        }

        async fn post_form(
            &self,
            url: &str,
            form: &[(&str, &str)],
        ) -> Result<String, ExtractorError> {
            let encoded = form
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("&");
            self.requests
                .lock()
                .unwrap()
                .push(format!("POST {url} {encoded}"));
            self.license
                .clone()
                .ok_or_else(|| ExtractorError::ValidationError(format!("404 for {url}")))
        }
    }

    fn audible(site: &Arc<RecordingSite>) -> Audible {
        Audible::new(
            PRODUCT_URL.to_string(),
            default_client().unwrap(),
            Some("session-id=1".to_string()),
        )
        .with_fetcher(site.clone())
    }

    #[test]
    fn test_url_regex() {
        for url in [
            PRODUCT_URL,
            "https://audible.com/pd/Some-Book/B00ABCDEFG?ref=a_search",
            "http://www.audible.com/pd/Sci-Fi-Fantasy/Some-Book/B00ABCDEFG",
        ] {
            assert!(URL_REGEX.is_match(url), "{url}");
        }
        for url in [
            "https://www.audible.co.uk/pd/Some-Book/B00ABCDEFG",
            "https://www.audible.com/search?keywords=gaiman",
            "https://www.audible.com/pd/B00ABCDEFG",
            "https://attacker.example/x.audible.com/pd/a/B01LZB4R8W",
            "https://attacker.example?.audible.com/pd/a/B01LZB4R8W",
        ] {
            assert!(!URL_REGEX.is_match(url), "{url}");
        }
    }

    #[test]
    fn test_session_cookies_only_reach_audible_hosts() {
        let audible = Audible::new(
            PRODUCT_URL.to_string(),
            default_client().unwrap(),
            Some("session-token=SECRET".to_string()),
        );
        let cookie_of = |url: &str| {
            audible
                .extractor
                .get(url)
                .build()
                .unwrap()
                .headers()
                .get(reqwest::header::COOKIE)
                .map(|v| v.to_str().unwrap().to_owned())
        };

        assert_eq!(cookie_of(Audible::LICENSE_URL).as_deref(), Some("session-token=SECRET"));
        assert_eq!(
            cookie_of("https://dcdn.audible.com/hls/B01LZB4R8W/master.m3u8").as_deref(),
            Some("session-token=SECRET")
        );
        assert_eq!(cookie_of("https://cdn.example.net/hls/master.m3u8"), None);
        assert_eq!(cookie_of("https://attacker.example/x.audible.com/pd/a/B01LZB4R8W"), None);
    }

    #[test]
    fn test_book_id() {
        let site = Arc::new(RecordingSite::default());
        assert_eq!(audible(&site).book_id().unwrap().as_str(), "B01LZB4R8W");

        let with_query = Audible::new(
            "https://www.audible.com/pd/Some-Book/B00ABCDEFG?qid=1&sr=1-1".to_string(),
            default_client().unwrap(),
            None,
        );
        assert_eq!(with_query.book_id().unwrap().as_str(), "B00ABCDEFG");
    }

    #[tokio::test]
    async fn test_extract_full_record() {
        let site = Arc::new(RecordingSite::signed_in());
        let media = audible(&site).extract().await.unwrap();

        assert_eq!(media.id, "B01LZB4R8W");
        assert_eq!(media.title, "How the Marquis Got His Coat Back");
        assert_eq!(media.author.as_deref(), Some("Neil Gaiman"));
        assert_eq!(media.uploader.as_deref(), Some("Neil Gaiman"));
        assert_eq!(media.narrator.as_deref(), Some("Full Cast"));
        assert_eq!(media.publisher.as_deref(), Some("BBC Worldwide Ltd"));
        assert_eq!(media.release_year, Some(2016));
        assert_eq!(media.duration, Some(4140.0));

        let thumbnails = media.thumbnails.as_ref().unwrap();
        assert_eq!(thumbnails[0].url, "https://m.media-amazon.com/cover.jpg");
        assert_eq!(thumbnails[0].preference, 500);
        assert_eq!(thumbnails[1].preference, 210);

        let chapters = media.chapters.as_ref().unwrap();
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[1].start_time, 60.0);
        assert_eq!(chapters[1].end_time, 4140.0);

        let headers = media.headers.as_ref().unwrap();
        assert_eq!(
            headers.get("referer").map(String::as_str),
            Some("https://www.audible.com")
        );

        assert_eq!(
            site.requests(),
            vec![
                "GET https://www.audible.com".to_string(),
                format!("GET {PRODUCT_URL}"),
                format!("GET {CLOUD_PLAYER}"),
                "POST https://www.audible.com/contentlicenseajax asin=B01LZB4R8W&token=tok-123&key=AudibleCloudPlayer&action=getUrl".to_string(),
                format!("GET {MANIFEST_URL}"),
            ]
        );
    }

    #[tokio::test]
    async fn test_only_hls_formats_without_legacy_manifest() {
        let site = Arc::new(RecordingSite::signed_in());
        let media = audible(&site).extract().await.unwrap();

        let ids: Vec<_> = media.formats.iter().map(|f| f.format_id.as_str()).collect();
        assert_eq!(ids, ["hls-64", "hls-32"]);
        assert!(media.formats.iter().all(|f| f.protocol.is_hls()));
        assert!(media
            .formats
            .iter()
            .all(|f| f.protocol == StreamProtocol::M3u8Native && f.ext == "mp4"));
    }

    #[tokio::test]
    async fn test_not_logged_in_stops_before_product_page() {
        let site = Arc::new(
            RecordingSite::signed_in().page(Audible::HOMEPAGE_URL, HOMEPAGE_SIGNED_OUT),
        );
        let err = audible(&site).extract().await.unwrap_err();

        assert!(matches!(err, ExtractorError::LoginRequired(_)));
        assert!(err.is_expected());
        assert!(err.to_string().contains("export your cookies"));
        assert_eq!(site.requests(), vec!["GET https://www.audible.com"]);
    }

    #[tokio::test]
    async fn test_missing_token_aborts_before_license_request() {
        let site = Arc::new(RecordingSite::signed_in().page(
            CLOUD_PLAYER,
            r#"<form><input type="hidden" name="asin" value="B01LZB4R8W"></form>"#,
        ));
        let err = audible(&site).extract().await.unwrap_err();

        assert!(matches!(err, ExtractorError::TokenNotFound));
        assert!(!site.requests().iter().any(|r| r.starts_with("POST")));
    }

    #[tokio::test]
    async fn test_incomplete_chapter_drops_all_chapters() {
        let site = Arc::new(RecordingSite::signed_in().license(
            r#"{
                "hlscontentLicenseUrl": "https://dcdn.audible.com/hls/B01LZB4R8W/master.m3u8",
                "cloudPlayerChapters": [
                    {"chapterStartPosition": 0, "chapterEndPosition": 60000},
                    {"chapterStartPosition": 60000, "chapterTitle": "Chapter 2"}
                ]
            }"#,
        ));
        let media = audible(&site).extract().await.unwrap();

        assert!(media.chapters.is_none());
        assert!(media.to_value().unwrap().get("chapters").is_none());
        assert_eq!(media.formats.len(), 2);
    }

    #[tokio::test]
    async fn test_no_thumbnails_key_when_page_has_none() {
        let site = Arc::new(RecordingSite::signed_in().page(
            PRODUCT_URL,
            r#"<html><head><meta property="og:title" content="Bare"></head><body></body></html>"#,
        ));
        let media = audible(&site).extract().await.unwrap();

        assert_eq!(media.title, "Bare");
        assert!(media.to_value().unwrap().get("thumbnails").is_none());
    }

    #[tokio::test]
    async fn test_manifest_failure_is_not_fatal() {
        let site = Arc::new(RecordingSite::signed_in().without(MANIFEST_URL));
        let media = audible(&site).extract().await.unwrap();

        assert!(media.formats.is_empty());
        assert!(media.chapters.is_some());
    }

    #[tokio::test]
    async fn test_license_without_manifest_skips_manifest_request() {
        let site = Arc::new(RecordingSite::signed_in().license(r#"{"runTime": "120"}"#));
        let media = audible(&site).extract().await.unwrap();

        assert!(media.formats.is_empty());
        assert_eq!(media.duration, Some(120.0));
        assert!(!site.requests().iter().any(|r| r.contains("m3u8")));
    }

    #[tokio::test]
    async fn test_malformed_license_is_fatal() {
        let site = Arc::new(RecordingSite::signed_in().license("<html>error</html>"));
        let err = audible(&site).extract().await.unwrap_err();
        assert!(matches!(err, ExtractorError::JsonError(_)));
    }

    #[tokio::test]
    #[ignore]
    async fn test_extract_live() {
        tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .init();
        // needs a signed-in session, e.g. AUDIBLE_COOKIES="session-id=...; at-main=..."
        let cookies = std::env::var("AUDIBLE_COOKIES").ok();
        let audible = Audible::new(PRODUCT_URL.to_string(), default_client().unwrap(), cookies);
        let media_info = audible.extract().await.unwrap();
        println!("{}", media_info.to_json_pretty().unwrap());
    }
}
