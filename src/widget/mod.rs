//! Widget instances: one independently controlled media element each.
//!
//! A [`Widget`] owns the authoritative state record of its element and
//! exposes a small command surface:
//!
//! - [`Widget::attach`] binds the playback backend (once).
//! - [`Widget::request_play`] / [`Widget::request_pause`] issue play and pause.
//! - [`Widget::seek_to`] moves the play-head.
//!
//! The autoplay, scrub, hover, control and progress logic only go through
//! those entry points; media and decoder events are reconciled in
//! [`Widget::on_media_event`] and [`Widget::on_decoder_event`].

mod attach;
mod autoplay;
pub mod config;
mod controls;
mod hover;
mod progress;
mod scrub;
mod status;

pub use attach::resolve_backend;
pub use config::{LazyMode, SizeSync, Slots, WidgetConfig, WidgetElement, WidgetVariant};
pub use controls::Control;
pub use status::{MediaEvent, PauseOrigin};

use crate::manifest::probe::MetaProbe;
use crate::manifest::SourceMeta;
use crate::platform::{
    DecoderSession, ElementLayout, FrameHandle, FrameScheduler, Fullscreen, MediaSurface,
    PlatformApi, PlaybackCapabilityProvider, Preload, SegmentedDecoderFactory, ViewportObserver,
    WidgetBindings, HLS_MIME,
};
use crate::time::{format_time, set_text};
use crate::PageConfig;
use hover::HoverTracker;
use scrub::ScrubState;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Stable identifier of a widget within its page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct WidgetId(pub u32);

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "widget#{}", self.0)
    }
}

/// Externally observable lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Idle,
    Loading,
    Playing,
    Paused,
    /// Poster ready, never played
    Ready,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Idle => "idle",
            Status::Loading => "loading",
            Status::Playing => "playing",
            Status::Paused => "paused",
            Status::Ready => "ready",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who issued the most recent pause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PauseReason {
    #[default]
    None,
    Manual,
    Visibility,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HoverState {
    Active,
    #[default]
    Idle,
}

impl HoverState {
    pub fn as_str(&self) -> &'static str {
        match self {
            HoverState::Active => "active",
            HoverState::Idle => "idle",
        }
    }
}

/// Playback mechanism bound at attach time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Backend {
    NativeStreaming,
    SegmentedDecoder,
    Direct,
}

/// The state record of one widget
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct WidgetState {
    pub backend: Option<Backend>,
    pub attached: bool,
    pub status: Status,
    pub activated: bool,
    pub pending_play: bool,
    pub last_pause_reason: PauseReason,
    pub muted: bool,
    pub fullscreen: bool,
    pub hover: HoverState,
    pub dragging: bool,
}

/// Cosmetic outputs written for the surrounding UI
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Visuals {
    pub duration_texts: Vec<String>,
    pub progress_texts: Vec<String>,
    /// Play-head position in percent
    pub played_pct: f64,
    pub buffered_pct: f64,
    /// Placeholder `padding-top` in percent
    pub aspect_padding_pct: Option<f64>,
}

impl Visuals {
    fn for_slots(slots: &Slots) -> Self {
        Self {
            duration_texts: vec![String::new(); slots.time_duration],
            progress_texts: vec![String::new(); slots.time_progress],
            ..Default::default()
        }
    }

    /// `transform` of the progress bar
    pub fn progress_transform(&self) -> String {
        format!("translateX({}%)", -100.0 + self.played_pct)
    }

    /// `transform` of the buffered bar
    pub fn buffered_transform(&self) -> String {
        format!("translateX({}%)", -100.0 + self.buffered_pct)
    }

    /// `left` of the timeline handle
    pub fn handle_left(&self) -> String {
        format!("{}%", self.played_pct)
    }
}

/// Serializable snapshot for hosts
#[derive(Debug, Clone, Serialize)]
pub struct WidgetView {
    pub id: WidgetId,
    pub variant: WidgetVariant,
    pub source_url: String,
    #[serde(flatten)]
    pub state: WidgetState,
    pub visuals: Visuals,
}

/// Timing knobs shared by every widget of a page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tuning {
    pub seek_throttle: Duration,
    pub hover_idle: Duration,
    pub decoder_buffer: Duration,
    pub visibility_threshold: f64,
}

impl From<&PageConfig> for Tuning {
    fn from(c: &PageConfig) -> Self {
        Self {
            seek_throttle: Duration::from_millis(c.seek_throttle_ms),
            hover_idle: Duration::from_millis(c.hover_idle_ms),
            decoder_buffer: Duration::from_secs(c.decoder_buffer_secs),
            visibility_threshold: c.visibility_threshold,
        }
    }
}

/// Page-wide collaborators, cloned into each widget
#[derive(Clone)]
pub struct Services {
    pub capabilities: Arc<dyn PlaybackCapabilityProvider>,
    pub decoders: Arc<dyn SegmentedDecoderFactory>,
    pub frames: Arc<dyn FrameScheduler>,
    pub viewport: Arc<dyn ViewportObserver>,
    pub fullscreen: Arc<dyn Fullscreen>,
    pub tuning: Tuning,
}

impl Services {
    pub fn from_platform(platform: &dyn PlatformApi, config: &PageConfig) -> Self {
        Self {
            capabilities: platform.capabilities(),
            decoders: platform.decoder_factory(),
            frames: platform.frame_scheduler(),
            viewport: platform.viewport_observer(),
            fullscreen: platform.fullscreen(),
            tuning: Tuning::from(config),
        }
    }
}

pub struct Widget {
    id: WidgetId,
    config: WidgetConfig,
    state: WidgetState,
    visuals: Visuals,
    surface: Arc<dyn MediaSurface>,
    layout: Arc<dyn ElementLayout>,
    services: Services,
    decoder_session: Option<Box<dyn DecoderSession>>,
    meta_probe: Option<MetaProbe>,
    /// Native backend: first `LoadedMetadata` still owes a readiness check
    awaiting_native_meta: bool,
    frame: Option<FrameHandle>,
    scrub: ScrubState,
    hover: HoverTracker,
    disposed: bool,
}

impl Widget {
    pub fn new(
        id: WidgetId,
        config: WidgetConfig,
        bindings: WidgetBindings,
        services: Services,
    ) -> Self {
        let visuals = Visuals::for_slots(&config.slots);
        Self {
            id,
            config,
            state: WidgetState::default(),
            visuals,
            surface: bindings.surface,
            layout: bindings.layout,
            services,
            decoder_session: None,
            meta_probe: None,
            awaiting_native_meta: false,
            frame: None,
            scrub: ScrubState::default(),
            hover: HoverTracker::default(),
            disposed: false,
        }
    }

    /// Prepare the surface and apply the lazy policy.
    ///
    /// Returns the manifest URL when metadata must be prefetched over the
    /// network; the caller runs that off-thread and hands the result to
    /// [`Widget::on_meta_resolved`].
    pub fn init(&mut self) -> Option<String> {
        self.surface.reset();

        if self.config.autoplay {
            // autoplay only works muted; visibility re-entry must not re-seek
            self.set_muted(true);
            self.surface.set_looping(true);
        } else {
            self.set_muted(self.config.muted);
        }

        let mut prefetch = None;
        match self.config.lazy_mode {
            LazyMode::MetadataOnly => {
                prefetch = self.begin_prefetch();
                self.surface.set_preload(Preload::None);
            }
            LazyMode::Deferred => self.surface.set_preload(Preload::None),
            LazyMode::None => self.attach(),
        }

        if self.config.autoplay {
            self.services.viewport.observe(self.id, self.services.tuning.visibility_threshold);
        }
        log::debug!(
            "{} mounted ({:?}, lazy={:?})",
            self.id,
            self.config.variant,
            self.config.lazy_mode
        );
        prefetch
    }

    fn begin_prefetch(&mut self) -> Option<String> {
        let caps = &self.services.capabilities;
        let decoder_usable =
            caps.segmented_decoder_available() && !caps.supports_native(HLS_MIME);
        if decoder_usable {
            let probe = MetaProbe::start(self.services.decoders.as_ref(), &self.config.source_url);
            if let Some(probe) = probe {
                self.meta_probe = Some(probe);
                return None;
            }
        }
        Some(self.config.source_url.clone())
    }

    /// Apply prefetched metadata: aspect ratio, duration text and the
    /// idle-readiness check.
    pub fn on_meta_resolved(&mut self, meta: SourceMeta) {
        if self.disposed {
            return;
        }
        if meta.has_dimensions() {
            self.set_aspect_ratio(meta.width, meta.height);
        }
        if let Some(d) = meta.known_duration() {
            self.set_duration_text(d);
        }
        self.ready_if_idle();
    }

    /// Destroy every session, stop frames and visibility observation. The
    /// widget ignores all further input.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        if let Some(mut s) = self.decoder_session.take() {
            s.destroy();
        }
        if let Some(mut p) = self.meta_probe.take() {
            p.finish();
        }
        if let Some(h) = self.frame.take() {
            self.services.frames.cancel_frame(h);
        }
        if self.config.autoplay {
            self.services.viewport.unobserve(self.id);
        }
        log::debug!("{} disposed", self.id);
    }

    pub fn id(&self) -> WidgetId {
        self.id
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn state(&self) -> &WidgetState {
        &self.state
    }

    pub fn visuals(&self) -> &Visuals {
        &self.visuals
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn has_decoder_session(&self) -> bool {
        self.decoder_session.is_some()
    }

    pub fn view(&self) -> WidgetView {
        WidgetView {
            id: self.id,
            variant: self.config.variant,
            source_url: self.config.source_url.clone(),
            state: self.state.clone(),
            visuals: self.visuals.clone(),
        }
    }

    /// The observable contract as `data-*` attribute pairs
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        let b = |v: bool| if v { "true" } else { "false" }.to_string();
        let mut out = vec![
            ("data-player-status", self.state.status.as_str().to_string()),
            ("data-player-activated", b(self.state.activated)),
            ("data-player-muted", b(self.state.muted)),
        ];
        if self.config.variant.is_player() {
            out.push(("data-player-fullscreen", b(self.state.fullscreen)));
            out.push(("data-player-hover", self.state.hover.as_str().to_string()));
            if self.config.slots.timeline {
                out.push(("data-timeline-drag", b(self.state.dragging)));
            }
        }
        out
    }

    fn is_playing(&self) -> bool {
        !self.surface.is_paused() && !self.surface.is_ended()
    }

    fn set_muted(&mut self, muted: bool) {
        self.surface.set_muted(muted);
        self.state.muted = self.surface.is_muted();
    }

    fn set_duration_text(&mut self, seconds: f64) {
        set_text(&mut self.visuals.duration_texts, &format_time(seconds));
    }

    /// Placeholder padding from a pixel size; only in `SizeFromMetadata` mode
    fn set_aspect_ratio(&mut self, width: u32, height: u32) {
        if self.config.size_sync != SizeSync::SizeFromMetadata || !self.config.slots.before {
            return;
        }
        if width == 0 || height == 0 {
            return;
        }
        self.visuals.aspect_padding_pct = Some(height as f64 / width as f64 * 100.0);
    }

    /// Fill an unset placeholder from the surface's own pixel size
    fn maybe_ratio_from_surface(&mut self) {
        let unset = self.visuals.aspect_padding_pct.map(|p| p == 0.0).unwrap_or(true);
        if unset {
            let (w, h) = self.surface.video_size();
            self.set_aspect_ratio(w, h);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests_support {
    use super::config::ATTR_SRC;
    use super::*;
    use crate::platform::{NoopMediaSurface, NoopPlatform, StaticCapabilities};

    pub const SRC: &str = "https://cdn.example/v/playlist.m3u8";

    pub fn full_slots() -> Slots {
        Slots {
            timeline: true,
            progress: true,
            buffered: true,
            handle: true,
            time_duration: 2,
            time_progress: 1,
            before: true,
        }
    }

    pub fn element(variant: WidgetVariant, attrs: &[(&str, &str)]) -> WidgetElement {
        let mut attributes: std::collections::BTreeMap<String, String> =
            attrs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        attributes.entry(ATTR_SRC.to_string()).or_insert_with(|| SRC.to_string());
        attributes.insert(variant.marker().to_string(), String::new());
        WidgetElement { variant, attributes, slots: full_slots(), has_video: true }
    }

    pub fn mount(
        element: &WidgetElement,
        native: bool,
        decoder: bool,
    ) -> (Widget, Arc<NoopMediaSurface>, Arc<NoopPlatform>) {
        let caps = StaticCapabilities::new(native, decoder);
        let platform = Arc::new(NoopPlatform::new().with_capabilities(caps));
        let id = WidgetId(1);
        let config = WidgetConfig::from_element(element).expect("config");
        let bindings = platform.bind_widget(id, element).expect("bindings");
        let services = Services::from_platform(platform.as_ref(), &PageConfig::default());
        let surface = platform.surface(id).expect("surface");
        (Widget::new(id, config, bindings, services), surface, platform)
    }

    /// A player widget with every slot present
    pub fn widget(
        attrs: &[(&str, &str)],
        native: bool,
        decoder: bool,
    ) -> (Widget, Arc<NoopMediaSurface>, Arc<NoopPlatform>) {
        mount(&element(WidgetVariant::Player, attrs), native, decoder)
    }

    /// Widget that has seen its first `Play` and `Playing` events
    pub fn playing(attrs: &[(&str, &str)]) -> (Widget, Arc<NoopMediaSurface>, Arc<NoopPlatform>) {
        let (mut w, surface, platform) = widget(attrs, false, false);
        w.init();
        w.request_play();
        w.on_media_event(MediaEvent::Play);
        w.on_media_event(MediaEvent::Playing);
        (w, surface, platform)
    }
}
