//! Small DOM helpers shared by the page scrapers.
//!
//! Every helper parses and drops its own [`Html`] so callers can hold the
//! results across `.await` points (`Html` is not `Send`).

use std::sync::LazyLock;

use regex::Regex;
use rustc_hash::FxHashMap;
use scraper::{ElementRef, Html, Selector};

use crate::extractor::utils::collapse_whitespace;

static META_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("meta").unwrap());
static TITLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());
static INPUT_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("input").unwrap());
static IMG_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img[alt]").unwrap());
static CLASSED_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[class]").unwrap());

/// Parsed document with the lookups the extractors need.
pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(source: &str) -> Self {
        Self {
            html: Html::parse_document(source),
        }
    }

    /// Content of `<meta property="og:{name}">` (or `name="og:{name}"`), trimmed and non-empty.
    pub fn og_property(&self, name: &str) -> Option<String> {
        let key = format!("og:{name}");
        self.html
            .select(&META_SELECTOR)
            .filter(|meta| {
                let attrs = meta.value();
                attrs.attr("property") == Some(key.as_str()) || attrs.attr("name") == Some(key.as_str())
            })
            .filter_map(|meta| meta.value().attr("content"))
            .map(str::trim)
            .find(|content| !content.is_empty())
            .map(ToOwned::to_owned)
    }

    pub fn title(&self) -> Option<String> {
        self.html
            .select(&TITLE_SELECTOR)
            .next()
            .map(|t| collapse_whitespace(&t.text().collect::<String>()))
            .filter(|t| !t.is_empty())
    }

    fn first_with_class(&self, class: &str) -> Option<ElementRef<'_>> {
        self.html
            .select(&CLASSED_SELECTOR)
            .find(|el| el.value().classes().any(|c| c == class))
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.first_with_class(class).is_some()
    }

    /// Whitespace-collapsed text of the first element carrying `class`.
    pub fn text_by_class(&self, class: &str) -> Option<String> {
        self.first_with_class(class)
            .map(|el| collapse_whitespace(&el.text().collect::<Vec<_>>().join(" ")))
    }

    /// `src` of the first `<img>` whose `alt` matches `alt_pattern`.
    ///
    /// Later matches are never consulted, even when the first one has no `src`.
    pub fn img_src_by_alt(&self, alt_pattern: &Regex) -> Option<String> {
        self.html
            .select(&IMG_SELECTOR)
            .find(|img| img.value().attr("alt").is_some_and(|alt| alt_pattern.is_match(alt)))?
            .value()
            .attr("src")
            .map(str::trim)
            .filter(|src| !src.is_empty())
            .map(ToOwned::to_owned)
    }

    /// Name/value pairs of every hidden or submit `<input>`.
    ///
    /// The key is `name`, falling back to `id`; a missing `value` maps to "".
    pub fn hidden_inputs(&self) -> FxHashMap<String, String> {
        self.html
            .select(&INPUT_SELECTOR)
            .filter(|input| {
                input
                    .value()
                    .attr("type")
                    .is_some_and(|t| t.eq_ignore_ascii_case("hidden") || t.eq_ignore_ascii_case("submit"))
            })
            .filter_map(|input| {
                let attrs = input.value();
                let key = attrs.attr("name").or_else(|| attrs.attr("id"))?;
                Some((key.to_owned(), attrs.attr("value").unwrap_or_default().to_owned()))
            })
            .collect()
    }
}

pub fn hidden_inputs(source: &str) -> FxHashMap<String, String> {
    Document::parse(source).hidden_inputs()
}

pub fn has_class(source: &str, class: &str) -> bool {
    Document::parse(source).has_class(class)
}
