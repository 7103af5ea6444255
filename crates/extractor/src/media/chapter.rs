use serde::{Deserialize, Serialize};

/// A chapter boundary, in seconds from the start of the book.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Chapter {
    pub start_time: f64,
    pub end_time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Chapter {
    pub fn from_millis(start_ms: f64, end_ms: f64, title: Option<String>) -> Self {
        Self {
            start_time: start_ms / 1000.0,
            end_time: end_ms / 1000.0,
            title,
        }
    }
}

/// A cover image candidate; higher `preference` wins.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub url: String,
    pub preference: i32,
}

impl Thumbnail {
    pub fn new(url: impl Into<String>, preference: i32) -> Self {
        Self {
            url: url.into(),
            preference,
        }
    }
}
