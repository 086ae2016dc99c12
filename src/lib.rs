//! RFox Media Widgets
//!
//! A headless controller for adaptive-streaming video widgets embedded in
//! HTML pages. It discovers widget elements, picks a playback backend per
//! widget and keeps an authoritative state record for each one while the host
//! forwards media, decoder, visibility and pointer events.
//!
//! # Features
//!
//! - **Backend selection**: native HLS, a segmented decoder session, or the
//!   manifest URL as a direct source
//! - **Lazy attachment**: on mount, on first play, or after a metadata-only
//!   prefetch of dimensions and duration
//! - **Viewport autoplay** that never overrides a manual pause
//! - **Scrubbing** with a throttled seek, hover/idle tracking and progress
//!   rendering
//!
//! # Example
//!
//! ```no_run
//! use rfmedia::{Page, PageConfig, platform::NoopPlatform};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut page = Page::new(PageConfig::default(), Arc::new(NoopPlatform::new()));
//! let ids = page.mount_document(
//!     r#"<div data-bunny-player-init data-player-src="https://cdn.example/a.m3u8">
//!          <video></video>
//!        </div>"#,
//!     None,
//! )?;
//! for id in ids {
//!     page.click_control(id, rfmedia::Control::TogglePlay);
//!     println!("{}", serde_json::to_string(&page.view(id))?);
//! }
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;

pub mod error;
pub use error::{Error, Result};

// Playlist parsing and metadata resolution
pub mod manifest;

// HTTP text fetching
pub mod net;

pub mod page;

// Platform API surface (media surface, decoders, viewport, frames, fullscreen, layout)
pub mod platform;

pub mod time;

pub mod widget;

pub use manifest::SourceMeta;
pub use page::{discover_elements, Page};
pub use time::format_time;
pub use widget::{
    Backend, Control, HoverState, LazyMode, MediaEvent, PauseOrigin, PauseReason, SizeSync, Status,
    Widget,
    WidgetConfig, WidgetElement, WidgetId, WidgetVariant, WidgetView,
};

/// Page-level configuration
///
/// Widget behaviour is configured per element through `data-player-*`
/// attributes; this struct holds the knobs shared by every widget of a page
/// and the HTTP settings of the manifest fetcher.
///
/// # Examples
///
/// ```
/// let cfg = rfmedia::PageConfig::default();
/// assert_eq!(cfg.seek_throttle_ms, 180);
/// assert!(cfg.user_agent.contains("RFOX"));
/// ```
#[derive(Debug, Clone)]
pub struct PageConfig {
    /// User agent string to send with requests
    pub user_agent: String,
    /// Timeout for document and manifest fetches in milliseconds
    pub timeout_ms: u64,
    /// Custom HTTP headers
    pub headers: HashMap<String, String>,
    /// Minimum spacing between seeks committed while dragging the timeline
    pub seek_throttle_ms: u64,
    /// Inactivity before the controls go idle
    pub hover_idle_ms: u64,
    /// Buffer-ahead limit handed to decoder sessions, in seconds
    pub decoder_buffer_secs: u64,
    /// Visible fraction at which autoplay widgets get visibility callbacks
    pub visibility_threshold: f64,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) Gecko/20100101 Firefox/115.0 RFOX/0.3"
                .to_string(),
            timeout_ms: 30000,
            headers: HashMap::new(),
            seek_throttle_ms: 180,
            hover_idle_ms: 3000,
            decoder_buffer_secs: 10,
            visibility_threshold: 0.1,
        }
    }
}

impl PageConfig {
    /// Reject values the controllers cannot work with
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.visibility_threshold) {
            return Err(Error::ConfigError(format!(
                "visibility_threshold must be within 0..=1, got {}",
                self.visibility_threshold
            )));
        }
        if self.timeout_ms == 0 {
            return Err(Error::ConfigError("timeout_ms must be non-zero".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PageConfig::default();
        assert_eq!(config.hover_idle_ms, 3000);
        assert_eq!(config.decoder_buffer_secs, 10);
        assert_eq!(config.visibility_threshold, 0.1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_threshold() {
        let config = PageConfig { visibility_threshold: 1.5, ..Default::default() };
        assert!(matches!(config.validate(), Err(Error::ConfigError(_))));
    }
}
