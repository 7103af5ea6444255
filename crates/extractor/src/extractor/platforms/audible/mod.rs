mod builder;
pub mod models;
pub mod scrape;

pub use builder::{Audible, URL_REGEX};
pub use models::{BookId, LicenseResponse, LicenseToken};
pub use scrape::PageMetadata;
