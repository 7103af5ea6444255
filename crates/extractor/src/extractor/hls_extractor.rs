use async_trait::async_trait;
use m3u8_rs::{AlternativeMediaType, MasterPlaylist, MediaPlaylist, Playlist};
use rustc_hash::FxHashSet;
use tracing::{debug, warn};
use url::Url;

use super::error::ExtractorError;
use super::fetcher::SiteFetcher;
use crate::media::{StreamInfo, StreamProtocol, sort_streams};

/// Turns an HLS manifest url into ranked format descriptors.
#[async_trait]
pub trait HlsExtractor: Send + Sync {
    fn hls_fetcher(&self) -> &dyn SiteFetcher;

    async fn extract_hls_formats(
        &self,
        m3u8_url: &str,
        m3u8_id: &str,
    ) -> Result<Vec<StreamInfo>, ExtractorError> {
        let manifest = self.hls_fetcher().get_text(m3u8_url).await?;
        parse_hls_formats(&manifest, m3u8_url, m3u8_id)
    }

    /// Like [`HlsExtractor::extract_hls_formats`], but any failure degrades to no formats.
    async fn extract_hls_formats_non_fatal(&self, m3u8_url: &str, m3u8_id: &str) -> Vec<StreamInfo> {
        match self.extract_hls_formats(m3u8_url, m3u8_id).await {
            Ok(formats) => formats,
            Err(e) => {
                warn!(error = %e, "Failed to extract HLS formats from {}", m3u8_url);
                Vec::new()
            }
        }
    }
}

/// Parses manifest text fetched from `manifest_url` into formats, best first.
pub fn parse_hls_formats(
    manifest: &str,
    manifest_url: &str,
    m3u8_id: &str,
) -> Result<Vec<StreamInfo>, ExtractorError> {
    let base_url =
        Url::parse(manifest_url).map_err(|e| ExtractorError::HlsPlaylistError(e.to_string()))?;

    let playlist = m3u8_rs::parse_playlist_res(manifest.as_bytes())
        .map_err(|e| ExtractorError::HlsPlaylistError(e.to_string()))?;

    let mut streams = match playlist {
        Playlist::MasterPlaylist(pl) => {
            let protocol = protocol_for(manifest, false);
            process_master_playlist(pl, &base_url, m3u8_id, protocol)?
        }
        Playlist::MediaPlaylist(pl) => vec![process_media_playlist(&pl, manifest, manifest_url, m3u8_id)],
    };

    sort_streams(&mut streams);
    debug!("{} HLS formats parsed from {}", streams.len(), manifest_url);
    Ok(streams)
}

/// Whether a segment downloader can fetch the playlist itself, without an external muxer.
///
/// Rejected: keys other than `NONE`/`AES-128`, `AES-128` combined with
/// byte ranges, and live playlists.
///
/// For a master playlist only the keys it advertises through
/// `#EXT-X-SESSION-KEY` are seen; the variant playlists are not fetched.
pub fn can_download_natively(manifest: &str, is_live: bool) -> bool {
    if is_live {
        return false;
    }

    let mut is_aes128 = false;
    for line in manifest.lines().map(str::trim) {
        let Some(attributes) = line
            .strip_prefix("#EXT-X-KEY:")
            .or_else(|| line.strip_prefix("#EXT-X-SESSION-KEY:"))
        else {
            continue;
        };
        match key_method(attributes) {
            Some("NONE") => {}
            Some("AES-128") => is_aes128 = true,
            _ => return false,
        }
    }

    !(is_aes128 && manifest.contains("#EXT-X-BYTERANGE"))
}

fn key_method(attributes: &str) -> Option<&str> {
    attributes
        .split(',')
        .find_map(|attr| attr.trim().strip_prefix("METHOD="))
        .map(|method| method.trim_matches('"'))
}

fn protocol_for(manifest: &str, is_live: bool) -> StreamProtocol {
    if can_download_natively(manifest, is_live) {
        StreamProtocol::M3u8Native
    } else {
        StreamProtocol::M3u8
    }
}

fn process_master_playlist(
    playlist: MasterPlaylist,
    base_url: &Url,
    m3u8_id: &str,
    protocol: StreamProtocol,
) -> Result<Vec<StreamInfo>, ExtractorError> {
    let mut used_ids = FxHashSet::default();
    let mut streams = Vec::with_capacity(playlist.variants.len());

    for (index, variant) in playlist
        .variants
        .into_iter()
        .filter(|v| !v.is_i_frame)
        .enumerate()
    {
        let stream_url = base_url.join(&variant.uri)?;
        let bitrate = variant.average_bandwidth.unwrap_or(variant.bandwidth) / 1000;
        let resolution = variant
            .resolution
            .map(|r| format!("{}x{}", r.width, r.height));

        let base_id = if bitrate > 0 {
            format!("{m3u8_id}-{bitrate}")
        } else {
            format!("{m3u8_id}-{index}")
        };
        let quality = match (&resolution, bitrate) {
            (Some(res), _) => res.clone(),
            (None, 0) => String::new(),
            (None, kbps) => format!("{kbps}k"),
        };

        streams.push(
            StreamInfo::builder(unique_id(&mut used_ids, base_id), stream_url, protocol)
                .manifest_url(base_url.as_str())
                .quality(quality)
                .bitrate(bitrate)
                .codec(variant.codecs.unwrap_or_default())
                .resolution(resolution)
                .build(),
        );
    }

    for alternative in playlist.alternatives {
        if !matches!(alternative.media_type, AlternativeMediaType::Audio) {
            continue;
        }
        let Some(uri) = alternative.uri else {
            continue;
        };
        let stream_url = base_url.join(&uri)?;
        let base_id = format!(
            "{m3u8_id}-{}-{}",
            alternative.group_id,
            alternative.name.replace(char::is_whitespace, "_")
        );

        streams.push(
            StreamInfo::builder(unique_id(&mut used_ids, base_id), stream_url, protocol)
                .manifest_url(base_url.as_str())
                .quality(alternative.name)
                .priority(-1)
                .build(),
        );
    }

    Ok(streams)
}

fn process_media_playlist(
    playlist: &MediaPlaylist,
    manifest: &str,
    manifest_url: &str,
    m3u8_id: &str,
) -> StreamInfo {
    let protocol = protocol_for(manifest, !playlist.end_list);
    StreamInfo::builder(m3u8_id, manifest_url, protocol)
        .manifest_url(manifest_url)
        .quality("source")
        .build()
}

fn unique_id(used: &mut FxHashSet<String>, base: String) -> String {
    if used.insert(base.clone()) {
        return base;
    }
    let mut n = 1;
    loop {
        let candidate = format!("{base}-{n}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}
