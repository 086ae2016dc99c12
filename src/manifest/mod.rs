//! HLS manifest introspection: stream dimensions and duration without playback.
//!
//! Two sources feed a [`SourceMeta`]:
//!
//! - [`fetch_source_meta`] reads the master playlist over a [`Fetcher`], picks
//!   the widest variant, reads that variant's media playlist and sums its
//!   segment durations.
//! - [`probe::MetaProbe`] listens to a throwaway decoder session instead.
//!
//! Both are best-effort. Playlists are parsed with `hls_m3u8`; documents it
//! rejects fall back to a lenient line scan. A missing `RESOLUTION` counts
//! as zero and any fetch failure produces [`SourceMeta::empty`].

pub mod prefetch;
pub mod probe;

use crate::net::Fetcher;
use crate::platform::decoder::Level;
use crate::Result;
use hls_m3u8::tags::VariantStream as HlsVariantStream;
use hls_m3u8::{MasterPlaylist as HlsMasterPlaylist, MediaPlaylist as HlsMediaPlaylist};
use serde::Serialize;

const STREAM_INF: &str = "#EXT-X-STREAM-INF:";
const EXTINF: &str = "#EXTINF:";

/// Best-effort stream metadata. `duration` is NaN when unknown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SourceMeta {
    pub width: u32,
    pub height: u32,
    pub duration: f64,
}

impl SourceMeta {
    /// The sentinel for "nothing could be determined"
    pub fn empty() -> Self {
        Self { width: 0, height: 0, duration: f64::NAN }
    }

    pub fn has_dimensions(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Duration when it is finite and positive
    pub fn known_duration(&self) -> Option<f64> {
        (self.duration.is_finite() && self.duration > 0.0).then_some(self.duration)
    }

    pub fn is_empty(&self) -> bool {
        !self.has_dimensions() && self.known_duration().is_none()
    }
}

impl Default for SourceMeta {
    fn default() -> Self {
        Self::empty()
    }
}

/// One `#EXT-X-STREAM-INF` entry and the URI line that follows it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantEntry {
    pub uri: String,
    pub resolution: Option<(u32, u32)>,
    pub bandwidth: Option<u64>,
}

impl VariantEntry {
    pub fn width(&self) -> u32 {
        self.resolution.map(|(w, _)| w).unwrap_or(0)
    }
}

/// Parsed master playlist
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MasterInfo {
    pub variants: Vec<VariantEntry>,
    /// True when the document carries `#EXTINF` lines itself (a media
    /// playlist handed over as the source)
    pub has_segments: bool,
}

impl MasterInfo {
    /// Widest variant; the first one wins ties and when no variant declares a
    /// resolution.
    pub fn best(&self) -> Option<&VariantEntry> {
        let first = self.variants.first()?;
        Some(
            self.variants
                .iter()
                .fold(first, |best, v| if v.width() > best.width() { v } else { best }),
        )
    }
}

/// Parse `WIDTHxHEIGHT`
pub fn parse_resolution(value: &str) -> Option<(u32, u32)> {
    let (w, h) = value.split_once(['x', 'X'])?;
    Some((w.trim().parse().ok()?, h.trim().parse().ok()?))
}

fn has_segment_lines(text: &str) -> bool {
    text.lines().any(|l| l.trim_start().starts_with(EXTINF))
}

/// Parse a master playlist. Never fails; unusable input yields no variants.
///
/// Documents `hls_m3u8` rejects (no `#EXTM3U` header, a variant without
/// `BANDWIDTH`) go through [`scan_master`] instead.
pub fn parse_master(text: &str) -> MasterInfo {
    let has_segments = has_segment_lines(text);
    match HlsMasterPlaylist::try_from(text) {
        Ok(master) => {
            let variants = master
                .variant_streams
                .iter()
                .filter_map(|vs| match vs {
                    HlsVariantStream::ExtXStreamInf { uri, stream_data, .. } => Some(VariantEntry {
                        uri: uri.to_string(),
                        resolution: stream_data.resolution().map(|r| {
                            let width = u32::try_from(r.width()).unwrap_or(0);
                            let height = u32::try_from(r.height()).unwrap_or(0);
                            (width, height)
                        }),
                        bandwidth: Some(stream_data.bandwidth()),
                    }),
                    // i-frame streams are not playable renditions
                    HlsVariantStream::ExtXIFrame { .. } => None,
                })
                .collect();
            MasterInfo { variants, has_segments }
        }
        Err(e) => {
            log::trace!("master playlist rejected ({}), scanning lines", e);
            MasterInfo { variants: scan_master(text), has_segments }
        }
    }
}

/// Line scan over `#EXT-X-STREAM-INF` entries. Only `RESOLUTION` and
/// `BANDWIDTH` are read; anything unparseable is ignored.
pub fn scan_master(text: &str) -> Vec<VariantEntry> {
    let mut variants = Vec::new();
    let mut pending: Option<(Option<(u32, u32)>, Option<u64>)> = None;

    for line in text.lines().map(str::trim) {
        if let Some(attrs) = line.strip_prefix(STREAM_INF) {
            let mut resolution = None;
            let mut bandwidth = None;
            for (k, v) in attrs.split(',').filter_map(|pair| pair.split_once('=')) {
                match k.trim() {
                    "RESOLUTION" => resolution = parse_resolution(v),
                    "BANDWIDTH" => bandwidth = v.trim().parse().ok(),
                    _ => {}
                }
            }
            pending = Some((resolution, bandwidth));
        } else if !line.is_empty() && !line.starts_with('#') {
            if let Some((resolution, bandwidth)) = pending.take() {
                variants.push(VariantEntry { uri: line.to_string(), resolution, bandwidth });
            }
        }
    }
    variants
}

/// Sum every segment duration of a media playlist, in seconds.
///
/// Falls back to summing `#EXTINF` lines when `hls_m3u8` rejects the
/// document; unparseable entries are skipped there.
pub fn sum_segment_durations(text: &str) -> f64 {
    match HlsMediaPlaylist::try_from(text) {
        Ok(media) => media.segments.values().map(|seg| seg.duration.duration().as_secs_f64()).sum(),
        Err(e) => {
            log::trace!("media playlist rejected ({}), scanning lines", e);
            text.lines()
                .filter_map(|l| l.trim().strip_prefix(EXTINF))
                .filter_map(|rest| {
                    let end = rest
                        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
                        .unwrap_or(rest.len());
                    rest[..end].parse::<f64>().ok()
                })
                .sum()
        }
    }
}

/// Widest decoder level, first wins ties
pub fn best_level(levels: &[Level]) -> Option<Level> {
    let first = *levels.first()?;
    Some(levels.iter().fold(first, |best, l| if l.width > best.width { *l } else { best }))
}

/// Resolve `reference` against `base`, falling back to the reference as-is
/// when either side is not a valid URL.
pub fn resolve_url(base: &str, reference: &str) -> String {
    url::Url::parse(base)
        .and_then(|b| b.join(reference))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| reference.to_string())
}

fn try_fetch_source_meta(fetcher: &dyn Fetcher, src: &str) -> Result<SourceMeta> {
    let master = fetcher.fetch_text(src)?;
    let info = parse_master(&master);

    let Some(best) = info.best() else {
        let duration = if info.has_segments { sum_segment_durations(&master) } else { f64::NAN };
        return Ok(SourceMeta { width: 0, height: 0, duration });
    };

    let (width, height) = best.resolution.unwrap_or((0, 0));
    let media_url = url::Url::parse(src)?.join(&best.uri)?.to_string();
    log::trace!("reading variant playlist {}", media_url);
    let media = fetcher.fetch_text(&media_url)?;

    Ok(SourceMeta { width, height, duration: sum_segment_durations(&media) })
}

/// Determine dimensions and duration of an HLS source by reading its
/// playlists. Never fails: errors resolve to [`SourceMeta::empty`].
pub fn fetch_source_meta(fetcher: &dyn Fetcher, src: &str) -> SourceMeta {
    match try_fetch_source_meta(fetcher, src) {
        Ok(meta) => meta,
        Err(e) => {
            log::debug!("metadata prefetch for {} failed: {}", src, e);
            SourceMeta::empty()
        }
    }
}
