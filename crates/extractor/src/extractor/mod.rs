pub mod error;
pub mod factory;
pub mod fetcher;
pub mod hls_extractor;
pub mod platform_extractor;
pub mod platforms;
pub mod utils;
mod default;

pub use default::{ClientOptions, build_client, default_client, default_factory};
pub use factory::ExtractorFactory;
