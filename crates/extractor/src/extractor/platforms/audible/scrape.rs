//! Product page scraping.
//!
//! Labeled blocks are located by their class names; the visible label
//! ("By:", "Narrated by:", ...) is part of the element text and gets stripped.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::extractor::error::ExtractorError;
use crate::extractor::utils::strip_label_prefix;
use crate::html::Document;
use crate::media::Thumbnail;

pub const OG_IMAGE_PREFERENCE: i32 = 210;
pub const COVER_ART_PREFERENCE: i32 = 500;

static COVER_ART_ALT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bcover art\b").unwrap());

static RELEASE_DATE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{2})-(\d{2})-(\d{2})\b").unwrap());

const AUTHOR_LABEL: (&str, &str) = ("authorLabel", "By:");
const NARRATOR_LABEL: (&str, &str) = ("narratorLabel", "Narrated by:");
const FORMAT_LABEL: (&str, &str) = ("format", "Format:");
const PUBLISHER_LABEL: (&str, &str) = ("publisherLabel", "Publisher:");
const RELEASE_DATE_LABEL: (&str, &str) = ("releaseDateLabel", "Release date:");

#[derive(Debug, Clone, PartialEq)]
pub struct PageMetadata {
    pub title: String,
    pub thumbnails: Vec<Thumbnail>,
    pub author: Option<String>,
    pub narrator: Option<String>,
    pub format_label: Option<String>,
    pub publisher: Option<String>,
    pub release_date: Option<NaiveDate>,
}

impl PageMetadata {
    pub fn from_html(page: &str) -> Result<Self, ExtractorError> {
        let doc = Document::parse(page);

        let title = doc
            .og_property("title")
            .or_else(|| doc.title())
            .ok_or_else(|| {
                ExtractorError::ValidationError("no title found on product page".to_string())
            })?;

        let mut thumbnails = Vec::with_capacity(2);
        if let Some(url) = doc.og_property("image") {
            thumbnails.push(Thumbnail::new(url, OG_IMAGE_PREFERENCE));
        }
        if let Some(url) = doc.img_src_by_alt(&COVER_ART_ALT) {
            thumbnails.push(Thumbnail::new(url, COVER_ART_PREFERENCE));
        }

        let labeled = |(class, prefix): (&str, &str)| {
            doc.text_by_class(class)
                .map(|text| strip_label_prefix(&text, prefix).to_owned())
                .filter(|text| !text.is_empty())
        };

        Ok(Self {
            title,
            thumbnails,
            author: labeled(AUTHOR_LABEL),
            narrator: labeled(NARRATOR_LABEL),
            format_label: labeled(FORMAT_LABEL),
            publisher: labeled(PUBLISHER_LABEL),
            release_date: labeled(RELEASE_DATE_LABEL)
                .as_deref()
                .and_then(parse_release_date),
        })
    }
}

/// Parses the first `MM-DD-YY` date in `text`.
pub fn parse_release_date(text: &str) -> Option<NaiveDate> {
    let caps = RELEASE_DATE_REGEX.captures(text)?;
    let month = caps[1].parse().ok()?;
    let day = caps[2].parse().ok()?;
    let year = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(expand_two_digit_year(year), month, day)
}

/// 80..=99 are the 1900s, everything else the 2000s.
pub fn expand_two_digit_year(year: i32) -> i32 {
    if year >= 80 { 1900 + year } else { 2000 + year }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use rstest::rstest;

    const PRODUCT_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Neil Gaiman's How the Marquis Got His Coat Back Audiobook | Audible.com</title>
  <meta property="og:title" content="Neil Gaiman's How the Marquis Got His Coat Back">
  <meta property="og:image" content="https://m.media-amazon.com/images/I/51og._SL210_.jpg">
</head>
<body>
  <img class="bc-pub-block" alt="Neil Gaiman's How the Marquis Got His Coat Back Audiobook By Neil Gaiman cover art"
       src="https://m.media-amazon.com/images/I/51cover._SL500_.jpg">
  <ul>
    <li class="bc-list-item authorLabel">
      By:
      <a class="bc-link" href="/author/Neil-Gaiman/B000AQ01G2">Neil Gaiman</a>
    </li>
    <li class="bc-list-item narratorLabel">
      Narrated by:
      <a class="bc-link" href="/search?searchNarrator=Full+Cast">Full Cast</a>
    </li>
    <li class="bc-list-item format">
      Format: Original Recording
    </li>
    <li class="bc-list-item publisherLabel">
      Publisher:
      <a class="bc-link" href="/search?searchProvider=BBC">BBC Worldwide Ltd</a>
    </li>
    <li class="bc-list-item releaseDateLabel">
      Release date:
      09-27-16
    </li>
  </ul>
</body>
</html>"#;

    #[test]
    fn test_labeled_blocks_are_prefix_stripped() {
        let meta = PageMetadata::from_html(PRODUCT_PAGE).unwrap();

        assert_eq!(meta.title, "Neil Gaiman's How the Marquis Got His Coat Back");
        assert_eq!(meta.author.as_deref(), Some("Neil Gaiman"));
        assert_eq!(meta.narrator.as_deref(), Some("Full Cast"));
        assert_eq!(meta.format_label.as_deref(), Some("Original Recording"));
        assert_eq!(meta.publisher.as_deref(), Some("BBC Worldwide Ltd"));
        assert_eq!(meta.release_date, NaiveDate::from_ymd_opt(2016, 9, 27));
    }

    #[test]
    fn test_thumbnail_candidates() {
        let meta = PageMetadata::from_html(PRODUCT_PAGE).unwrap();
        assert_eq!(
            meta.thumbnails,
            vec![
                Thumbnail::new(
                    "https://m.media-amazon.com/images/I/51og._SL210_.jpg",
                    OG_IMAGE_PREFERENCE
                ),
                Thumbnail::new(
                    "https://m.media-amazon.com/images/I/51cover._SL500_.jpg",
                    COVER_ART_PREFERENCE
                ),
            ]
        );
    }

    #[test]
    fn test_sparse_page() {
        let meta = PageMetadata::from_html(
            "<html><head><title>Just A Title</title></head><body></body></html>",
        )
        .unwrap();

        assert_eq!(meta.title, "Just A Title");
        assert!(meta.thumbnails.is_empty());
        assert_eq!(meta.author, None);
        assert_eq!(meta.release_date, None);
    }

    #[test]
    fn test_missing_title_is_an_error() {
        assert!(matches!(
            PageMetadata::from_html("<html><body><p>nothing</p></body></html>"),
            Err(ExtractorError::ValidationError(_))
        ));
    }

    #[rstest]
    #[case("03-15-85", 1985)]
    #[case("03-15-15", 2015)]
    #[case("01-01-80", 1980)]
    #[case("12-31-79", 2079)]
    #[case("Release date: 09-27-16", 2016)]
    fn test_release_year_pivot(#[case] text: &str, #[case] year: i32) {
        assert_eq!(parse_release_date(text).map(|d| d.year()), Some(year));
    }

    #[rstest]
    #[case::invalid_month("13-01-15")]
    #[case::invalid_day("02-30-15")]
    #[case::no_date("coming soon")]
    fn test_unparseable_release_date(#[case] text: &str) {
        assert_eq!(parse_release_date(text), None);
    }
}
