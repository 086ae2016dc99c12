//! Source attachment: backend selection and wiring to the surface.

use super::{Backend, LazyMode, SizeSync, Widget, WidgetVariant};
use crate::manifest::best_level;
use crate::platform::{
    DecoderConfig, DecoderEvent, PlaybackCapabilityProvider, Preload, SessionId, HLS_MIME,
};

/// Native HLS first, then a segmented decoder, then the URL as a plain
/// progressive source.
pub fn resolve_backend(caps: &dyn PlaybackCapabilityProvider) -> Backend {
    if caps.supports_native(HLS_MIME) {
        Backend::NativeStreaming
    } else if caps.segmented_decoder_available() {
        Backend::SegmentedDecoder
    } else {
        Backend::Direct
    }
}

impl Widget {
    /// Bind the playback backend to the surface. Only the first call does work.
    pub fn attach(&mut self) {
        if self.state.attached || self.disposed {
            return;
        }
        self.state.attached = true;

        if let Some(mut prior) = self.decoder_session.take() {
            prior.destroy();
        }

        let mut backend = resolve_backend(self.services.capabilities.as_ref());
        let src = self.config.source_url.clone();

        match backend {
            Backend::NativeStreaming => {
                match (self.config.variant, self.config.lazy_mode) {
                    (WidgetVariant::Player, mode) if mode.is_lazy() => {
                        self.surface.set_preload(Preload::Auto)
                    }
                    (WidgetVariant::Player, _) => {}
                    (WidgetVariant::Background, LazyMode::Deferred) => {
                        self.surface.set_preload(Preload::None)
                    }
                    (WidgetVariant::Background, _) => self.surface.set_preload(Preload::Auto),
                }
                self.surface.set_source(Some(&src));
                self.awaiting_native_meta = true;
            }
            Backend::SegmentedDecoder => {
                let config =
                    DecoderConfig { max_buffer_length: self.services.tuning.decoder_buffer };
                match self.services.decoders.create_session(&config) {
                    Some(mut session) => {
                        // the source is loaded once MediaAttached comes back
                        session.attach_media(self.surface.clone());
                        self.decoder_session = Some(session);
                        self.finish_probe();
                    }
                    None => {
                        log::warn!(
                            "{} decoder session unavailable, playing {} directly",
                            self.id,
                            src
                        );
                        backend = Backend::Direct;
                        self.surface.set_source(Some(&src));
                    }
                }
            }
            Backend::Direct => self.surface.set_source(Some(&src)),
        }

        self.state.backend = Some(backend);
        log::debug!("{} attached via {:?}", self.id, backend);
    }

    /// Close a still-running metadata probe once playback has its own
    /// session, keeping whatever it gathered so far.
    fn finish_probe(&mut self) {
        let Some(mut probe) = self.meta_probe.take() else {
            return;
        };
        let meta = probe.finish();
        log::trace!("{} closing metadata probe {:?} early", self.id, probe.session_id());
        if meta.has_dimensions() {
            self.set_aspect_ratio(meta.width, meta.height);
        }
        if let Some(d) = meta.known_duration() {
            self.set_duration_text(d);
        }
    }

    /// Whether `session` is this widget's playback or probe session
    pub fn owns_session(&self, session: SessionId) -> bool {
        self.decoder_session.as_ref().map(|s| s.id()) == Some(session)
            || self.meta_probe.as_ref().map(|p| p.session_id()) == Some(session)
    }

    /// Route a decoder event to the playback session or the metadata probe.
    /// Events from unknown (destroyed) sessions are dropped.
    pub fn on_decoder_event(&mut self, session: SessionId, event: DecoderEvent) {
        if self.disposed {
            return;
        }

        if self.meta_probe.as_ref().map(|p| p.session_id()) == Some(session) {
            let done = self.meta_probe.as_mut().and_then(|p| p.on_event(&event));
            if let Some(meta) = done {
                self.meta_probe = None;
                self.on_meta_resolved(meta);
            }
            return;
        }

        let Some(current) = self.decoder_session.as_mut() else {
            return;
        };
        if current.id() != session {
            log::trace!("{} dropping event from stale session {:?}", self.id, session);
            return;
        }

        match event {
            DecoderEvent::MediaAttached => {
                current.load_source(&self.config.source_url);
            }
            DecoderEvent::ManifestParsed { levels } => {
                self.ready_if_idle();
                if self.config.size_sync == SizeSync::SizeFromMetadata {
                    if let Some(best) = best_level(&levels) {
                        self.set_aspect_ratio(best.width, best.height);
                    }
                }
            }
            DecoderEvent::LevelLoaded { total_duration } => {
                if total_duration.is_finite() {
                    self.set_duration_text(total_duration);
                }
            }
            DecoderEvent::Error { fatal, details } => {
                log::warn!("{} decoder error (fatal={}): {}", self.id, fatal, details);
            }
        }
    }
}
