/// Segmented-stream decoder sessions (MSE-style HLS players)

use super::media::MediaSurface;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Identifies one decoder session so forwarded events can be routed (and
/// events from destroyed sessions dropped).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SessionId(pub u64);

/// Session construction options
#[derive(Debug, Clone, PartialEq)]
pub struct DecoderConfig {
    /// How far ahead of the play-head the decoder may buffer
    pub max_buffer_length: Duration,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self { max_buffer_length: Duration::from_secs(10) }
    }
}

/// One rendition advertised by a parsed manifest
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Level {
    pub width: u32,
    pub height: u32,
    pub bitrate: Option<u64>,
}

/// Events a decoder session reports back through the host
#[derive(Debug, Clone, PartialEq)]
pub enum DecoderEvent {
    /// The session finished binding to the media surface
    MediaAttached,
    /// The master manifest was parsed
    ManifestParsed { levels: Vec<Level> },
    /// A level's media playlist was loaded
    LevelLoaded { total_duration: f64 },
    /// A decoder fault
    Error { fatal: bool, details: String },
}

/// A live decoder session. Exclusively owned by whoever created it.
pub trait DecoderSession: Send {
    fn id(&self) -> SessionId;
    /// Bind to a surface; completion is reported as [`DecoderEvent::MediaAttached`]
    fn attach_media(&mut self, surface: Arc<dyn MediaSurface>);
    fn load_source(&mut self, url: &str);
    fn destroy(&mut self);
}

/// Creates decoder sessions.
pub trait SegmentedDecoderFactory: Send + Sync {
    /// `None` when sessions cannot be created after all
    fn create_session(&self, config: &DecoderConfig) -> Option<Box<dyn DecoderSession>>;
}

/// What happened to one session, as seen by [`NoopDecoderFactory`]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionRecord {
    pub id: u64,
    pub max_buffer_length: Duration,
    pub attached: bool,
    pub sources: Vec<String>,
    pub destroyed: bool,
}

type SessionLog = Arc<Mutex<Vec<SessionRecord>>>;

/// In-memory decoder factory that records every session it hands out.
pub struct NoopDecoderFactory {
    next_id: AtomicU64,
    log: SessionLog,
}

impl NoopDecoderFactory {
    pub fn new() -> Self {
        NoopDecoderFactory { next_id: AtomicU64::new(1), log: Arc::new(Mutex::new(Vec::new())) }
    }

    pub fn sessions(&self) -> Vec<SessionRecord> {
        self.log.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Sessions created and not yet destroyed
    pub fn live_sessions(&self) -> Vec<SessionRecord> {
        self.sessions().into_iter().filter(|s| !s.destroyed).collect()
    }
}

impl Default for NoopDecoderFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl SegmentedDecoderFactory for NoopDecoderFactory {
    fn create_session(&self, config: &DecoderConfig) -> Option<Box<dyn DecoderSession>> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut log) = self.log.lock() {
            log.push(SessionRecord {
                id,
                max_buffer_length: config.max_buffer_length,
                ..Default::default()
            });
        }
        Some(Box::new(NoopDecoderSession { id, log: self.log.clone() }))
    }
}

struct NoopDecoderSession {
    id: u64,
    log: SessionLog,
}

impl NoopDecoderSession {
    fn record(&self, f: impl FnOnce(&mut SessionRecord)) {
        if let Ok(mut log) = self.log.lock() {
            if let Some(rec) = log.iter_mut().find(|r| r.id == self.id) {
                f(rec);
            }
        }
    }
}

impl DecoderSession for NoopDecoderSession {
    fn id(&self) -> SessionId {
        SessionId(self.id)
    }

    fn attach_media(&mut self, _surface: Arc<dyn MediaSurface>) {
        self.record(|r| r.attached = true);
    }

    fn load_source(&mut self, url: &str) {
        self.record(|r| r.sources.push(url.to_string()));
    }

    fn destroy(&mut self) {
        self.record(|r| r.destroyed = true);
    }
}
