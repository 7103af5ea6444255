use serde::{Deserialize, Serialize};
use std::fmt;

/// How a downloader is expected to fetch a stream.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StreamProtocol {
    /// HLS that a built-in segment downloader can handle.
    M3u8Native,
    /// HLS that must be handed to an external muxer (unsupported encryption, live, ...).
    M3u8,
}

impl StreamProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamProtocol::M3u8Native => "m3u8_native",
            StreamProtocol::M3u8 => "m3u8",
        }
    }

    pub fn is_hls(&self) -> bool {
        matches!(self, StreamProtocol::M3u8Native | StreamProtocol::M3u8)
    }
}

impl fmt::Display for StreamProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
