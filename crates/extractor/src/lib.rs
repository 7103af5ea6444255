//! Audiobook metadata and stream extraction for Audible product pages.
//!
//! The entry point is [`extractor::ExtractorFactory`] (or
//! [`extractor::default_factory`]), which maps a product url to a
//! [`extractor::platform_extractor::PlatformExtractor`]. Calling
//! `extract()` on it yields a [`media::MediaInfo`].

pub mod cookies;
pub mod extractor;
pub mod html;
pub mod media;
