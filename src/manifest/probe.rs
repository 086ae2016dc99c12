//! Metadata introspection through a throwaway decoder session.

use super::{best_level, SourceMeta};
use crate::platform::decoder::{
    DecoderConfig, DecoderEvent, DecoderSession, SegmentedDecoderFactory, SessionId,
};

/// A decoder session that is loaded but never bound to a surface. It lives
/// until the first level playlist loads or the first error, then destroys
/// itself and hands back whatever it gathered.
pub struct MetaProbe {
    session: Option<Box<dyn DecoderSession>>,
    id: SessionId,
    meta: SourceMeta,
}

impl MetaProbe {
    /// Open a probe session and start loading `src`. `None` when the factory
    /// cannot create a session.
    pub fn start(factory: &dyn SegmentedDecoderFactory, src: &str) -> Option<Self> {
        let mut session = factory.create_session(&DecoderConfig::default())?;
        let id = session.id();
        session.load_source(src);
        log::trace!("metadata probe {:?} loading {}", id, src);
        Some(Self { session: Some(session), id, meta: SourceMeta::empty() })
    }

    pub fn session_id(&self) -> SessionId {
        self.id
    }

    /// Feed one event. Returns the final result once the probe is done.
    pub fn on_event(&mut self, event: &DecoderEvent) -> Option<SourceMeta> {
        match event {
            DecoderEvent::ManifestParsed { levels } => {
                if let Some(best) = best_level(levels) {
                    if best.width > 0 && best.height > 0 {
                        self.meta.width = best.width;
                        self.meta.height = best.height;
                    }
                }
                None
            }
            DecoderEvent::LevelLoaded { total_duration } => {
                if total_duration.is_finite() {
                    self.meta.duration = *total_duration;
                }
                Some(self.finish())
            }
            DecoderEvent::Error { details, .. } => {
                log::debug!("metadata probe {:?} failed: {}", self.id, details);
                Some(self.finish())
            }
            DecoderEvent::MediaAttached => None,
        }
    }

    /// Destroy the session (idempotent) and return the gathered metadata
    pub fn finish(&mut self) -> SourceMeta {
        if let Some(mut s) = self.session.take() {
            s.destroy();
        }
        self.meta
    }
}

impl Drop for MetaProbe {
    fn drop(&mut self) {
        if let Some(mut s) = self.session.take() {
            s.destroy();
        }
    }
}
