/// Playback capability probing

/// MIME type of HLS manifests, probed for native support
pub const HLS_MIME: &str = "application/vnd.apple.mpegurl";

/// Answers the two questions backend selection depends on.
pub trait PlaybackCapabilityProvider: Send + Sync {
    /// Whether the media surface plays `mime` without help
    fn supports_native(&self, mime: &str) -> bool;

    /// Whether a segmented-stream decoder is present and supported here
    fn segmented_decoder_available(&self) -> bool;
}

/// Fixed answers, set up front
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticCapabilities {
    pub native_hls: bool,
    pub segmented_decoder: bool,
}

impl StaticCapabilities {
    pub fn new(native_hls: bool, segmented_decoder: bool) -> Self {
        StaticCapabilities { native_hls, segmented_decoder }
    }
}

impl PlaybackCapabilityProvider for StaticCapabilities {
    fn supports_native(&self, mime: &str) -> bool {
        self.native_hls && mime.eq_ignore_ascii_case(HLS_MIME)
    }

    fn segmented_decoder_available(&self) -> bool {
        self.segmented_decoder
    }
}
