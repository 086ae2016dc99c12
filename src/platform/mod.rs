//! Platform API surface: media surfaces, decoder sessions, capability probing,
//! visibility, animation frames, fullscreen and element geometry.
//!
//! These are the collaborators a widget needs from its host. Every surface is
//! a trait so hosts (and tests) can substitute deterministic versions; the
//! `Noop*` implementations keep their state in memory and are what
//! [`NoopPlatform`] hands out.

pub mod capability;
pub mod decoder;
pub mod frame;
pub mod fullscreen;
pub mod layout;
pub mod media;
pub mod viewport;

pub use capability::{PlaybackCapabilityProvider, StaticCapabilities, HLS_MIME};
pub use decoder::{
    DecoderConfig, DecoderEvent, DecoderSession, Level, NoopDecoderFactory,
    SegmentedDecoderFactory, SessionId,
};
pub use frame::{FrameHandle, FrameScheduler, NoopFrameScheduler};
pub use fullscreen::{Fullscreen, NoopFullscreen};
pub use layout::{Bounds, ElementLayout, FixedLayout};
pub use media::{MediaSurface, NoopMediaSurface, Preload};
pub use viewport::{IntersectionEntry, NoopViewportObserver, ViewportObserver};

use crate::net::{Fetcher, OfflineFetcher};
use crate::widget::{WidgetElement, WidgetId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Per-widget collaborators produced when a widget is mounted
#[derive(Clone)]
pub struct WidgetBindings {
    pub surface: Arc<dyn MediaSurface>,
    pub layout: Arc<dyn ElementLayout>,
}

/// A composite trait hosts implement to give a page typed access to platform
/// primitives.
pub trait PlatformApi: Send + Sync {
    fn capabilities(&self) -> Arc<dyn PlaybackCapabilityProvider>;
    fn decoder_factory(&self) -> Arc<dyn SegmentedDecoderFactory>;
    fn fetcher(&self) -> Arc<dyn Fetcher>;
    fn frame_scheduler(&self) -> Arc<dyn FrameScheduler>;
    fn viewport_observer(&self) -> Arc<dyn ViewportObserver>;
    fn fullscreen(&self) -> Arc<dyn Fullscreen>;

    /// Bind a discovered element to its surface and geometry. `None` skips the
    /// widget (for example when it has no media element).
    fn bind_widget(&self, id: WidgetId, element: &WidgetElement) -> Option<WidgetBindings>;
}

/// A small in-memory platform used in tests and as a safe default for hosts
/// that haven't wired the full surface yet.
pub struct NoopPlatform {
    capabilities: StaticCapabilities,
    decoders: Arc<NoopDecoderFactory>,
    fetcher: Arc<dyn Fetcher>,
    frames: Arc<NoopFrameScheduler>,
    viewport: Arc<NoopViewportObserver>,
    fullscreen: Arc<NoopFullscreen>,
    surfaces: Mutex<HashMap<WidgetId, Arc<NoopMediaSurface>>>,
    layouts: Mutex<HashMap<WidgetId, Arc<FixedLayout>>>,
}

impl NoopPlatform {
    pub fn new() -> Self {
        NoopPlatform {
            capabilities: StaticCapabilities::default(),
            decoders: Arc::new(NoopDecoderFactory::new()),
            fetcher: Arc::new(OfflineFetcher),
            frames: Arc::new(NoopFrameScheduler::new()),
            viewport: Arc::new(NoopViewportObserver::new()),
            fullscreen: Arc::new(NoopFullscreen::new()),
            surfaces: Mutex::new(HashMap::new()),
            layouts: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_capabilities(mut self, capabilities: StaticCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn decoders(&self) -> &NoopDecoderFactory {
        &self.decoders
    }

    pub fn frames(&self) -> &NoopFrameScheduler {
        &self.frames
    }

    pub fn viewport(&self) -> &NoopViewportObserver {
        &self.viewport
    }

    pub fn fullscreen_state(&self) -> &NoopFullscreen {
        &self.fullscreen
    }

    /// The surface bound to `id`, if the widget was mounted
    pub fn surface(&self, id: WidgetId) -> Option<Arc<NoopMediaSurface>> {
        self.surfaces.lock().ok().and_then(|s| s.get(&id).cloned())
    }

    pub fn layout(&self, id: WidgetId) -> Option<Arc<FixedLayout>> {
        self.layouts.lock().ok().and_then(|l| l.get(&id).cloned())
    }
}

impl Default for NoopPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformApi for NoopPlatform {
    fn capabilities(&self) -> Arc<dyn PlaybackCapabilityProvider> {
        Arc::new(self.capabilities)
    }

    fn decoder_factory(&self) -> Arc<dyn SegmentedDecoderFactory> {
        self.decoders.clone()
    }

    fn fetcher(&self) -> Arc<dyn Fetcher> {
        self.fetcher.clone()
    }

    fn frame_scheduler(&self) -> Arc<dyn FrameScheduler> {
        self.frames.clone()
    }

    fn viewport_observer(&self) -> Arc<dyn ViewportObserver> {
        self.viewport.clone()
    }

    fn fullscreen(&self) -> Arc<dyn Fullscreen> {
        self.fullscreen.clone()
    }

    fn bind_widget(&self, id: WidgetId, element: &WidgetElement) -> Option<WidgetBindings> {
        if !element.has_video {
            return None;
        }
        let surface = Arc::new(NoopMediaSurface::new());
        let layout = Arc::new(FixedLayout::default());
        if let Ok(mut s) = self.surfaces.lock() {
            s.insert(id, surface.clone());
        }
        if let Ok(mut l) = self.layouts.lock() {
            l.insert(id, layout.clone());
        }
        Some(WidgetBindings { surface, layout })
    }
}
