pub mod chapter;
pub mod media_format;
pub mod media_info;
pub mod stream_info;

pub use chapter::{Chapter, Thumbnail};
pub use media_format::StreamProtocol;
pub use media_info::MediaInfo;
pub use stream_info::{StreamInfo, sort_streams};
