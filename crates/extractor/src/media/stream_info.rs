use crate::media::StreamProtocol;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt;

/// One downloadable variant of the audiobook.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StreamInfo {
    // Identifier unique within one record, e.g. "hls-64"
    pub format_id: String,
    // Url of the stream (variant playlist)
    pub url: String,
    // Manifest the variant was listed in
    pub manifest_url: Option<String>,
    pub protocol: StreamProtocol,
    // Container extension handed to the muxer, e.g. "mp4"
    pub ext: String,
    // Quality label, e.g. "64k" or "1920x1080"
    pub quality: String,
    // Bitrate in kbps, 0 when unknown
    pub bitrate: u64,
    // Raw CODECS attribute
    pub codec: String,
    pub acodec: Option<String>,
    pub vcodec: Option<String>,
    pub resolution: Option<String>,
    // Higher ranks first
    pub priority: i32,
}

impl StreamInfo {
    pub fn builder(
        format_id: impl Into<String>,
        url: impl Into<String>,
        protocol: StreamProtocol,
    ) -> StreamInfoBuilder {
        StreamInfoBuilder::new(format_id, url, protocol)
    }

    pub fn is_audio_only(&self) -> bool {
        self.vcodec.as_deref() == Some("none")
    }

    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

impl fmt::Display for StreamInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} ({})", self.format_id, self.quality, self.protocol)?;
        if self.bitrate > 0 {
            write!(f, " {} kbps", self.bitrate)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct StreamInfoBuilder {
    inner: StreamInfo,
}

impl StreamInfoBuilder {
    pub fn new(
        format_id: impl Into<String>,
        url: impl Into<String>,
        protocol: StreamProtocol,
    ) -> Self {
        Self {
            inner: StreamInfo {
                format_id: format_id.into(),
                url: url.into(),
                manifest_url: None,
                protocol,
                ext: "mp4".to_string(),
                quality: String::new(),
                bitrate: 0,
                codec: String::new(),
                acodec: None,
                vcodec: None,
                resolution: None,
                priority: 0,
            },
        }
    }

    pub fn manifest_url(mut self, manifest_url: impl Into<String>) -> Self {
        self.inner.manifest_url = Some(manifest_url.into());
        self
    }

    pub fn quality(mut self, quality: impl Into<String>) -> Self {
        self.inner.quality = quality.into();
        self
    }

    pub fn bitrate(mut self, bitrate: u64) -> Self {
        self.inner.bitrate = bitrate;
        self
    }

    /// Sets the raw CODECS attribute and derives the audio/video codec split from it.
    pub fn codec(mut self, codec: impl Into<String>) -> Self {
        let codec = codec.into();
        let (acodec, vcodec) = split_codecs(&codec);
        self.inner.acodec = acodec;
        self.inner.vcodec = vcodec;
        self.inner.codec = codec;
        self
    }

    pub fn resolution(mut self, resolution: Option<String>) -> Self {
        self.inner.resolution = resolution;
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.inner.priority = priority;
        self
    }

    pub fn build(self) -> StreamInfo {
        self.inner
    }
}

const AUDIO_CODEC_PREFIXES: &[&str] = &["mp4a", "ac-3", "ec-3", "opus", "flac", "mp3", "vorbis"];
const VIDEO_CODEC_PREFIXES: &[&str] = &[
    "avc1", "avc3", "hvc1", "hev1", "vp8", "vp09", "vp9", "av01", "dvh1", "dvhe",
];

/// Splits a CODECS attribute into (audio, video). A list made only of audio
/// codecs yields `vcodec == "none"`, and the other way round.
fn split_codecs(codecs: &str) -> (Option<String>, Option<String>) {
    let mut acodec = None;
    let mut vcodec = None;
    for codec in codecs.split(',').map(str::trim).filter(|c| !c.is_empty()) {
        let lower = codec.to_ascii_lowercase();
        if acodec.is_none() && AUDIO_CODEC_PREFIXES.iter().any(|p| lower.starts_with(p)) {
            acodec = Some(codec.to_string());
        } else if vcodec.is_none() && VIDEO_CODEC_PREFIXES.iter().any(|p| lower.starts_with(p)) {
            vcodec = Some(codec.to_string());
        }
    }

    match (acodec, vcodec) {
        (Some(a), None) => (Some(a), Some("none".to_string())),
        (None, Some(v)) => (Some("none".to_string()), Some(v)),
        other => other,
    }
}

/// Ranks formats best first: explicit priority, then bitrate. Ties keep their order.
pub fn sort_streams(streams: &mut [StreamInfo]) {
    streams.sort_by_key(|s| (Reverse(s.priority), Reverse(s.bitrate)));
}
