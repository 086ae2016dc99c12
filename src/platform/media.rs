/// Media surface: the `<video>`-like element a backend renders into

use crate::{Error, Result};
use serde::Serialize;
use std::sync::Mutex;

/// Preload hint forwarded to the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Preload {
    None,
    Auto,
}

/// Playback surface operations used by the widget controllers.
///
/// `duration` returns NaN while unknown. `play` returning an error models a
/// platform policy rejection; controllers treat it as benign.
pub trait MediaSurface: Send + Sync {
    fn play(&self) -> Result<()>;
    fn pause(&self);
    fn seek(&self, seconds: f64);
    fn current_time(&self) -> f64;
    fn duration(&self) -> f64;
    /// End of the last buffered range, if any range is buffered
    fn buffered_end(&self) -> Option<f64>;
    fn is_paused(&self) -> bool;
    fn is_ended(&self) -> bool;
    fn is_muted(&self) -> bool;
    fn set_muted(&self, muted: bool);
    fn set_looping(&self, looping: bool);
    fn set_preload(&self, preload: Preload);
    /// Assign (or clear) the directly playable source
    fn set_source(&self, url: Option<&str>);
    /// Native pixel size, `(0, 0)` until metadata is known
    fn video_size(&self) -> (u32, u32);
    /// Pause, drop any source and reload so the element starts from a clean slate
    fn reset(&self);
}

#[derive(Debug, Clone)]
struct SurfaceState {
    paused: bool,
    ended: bool,
    muted: bool,
    looping: bool,
    preload: Preload,
    source: Option<String>,
    current_time: f64,
    duration: f64,
    buffered_end: Option<f64>,
    size: (u32, u32),
    reject_play: bool,
    play_calls: usize,
    pause_calls: usize,
    seeks: Vec<f64>,
}

/// In-memory surface used by tests and hosts without a real element.
///
/// It never emits media events on its own: the host (or test) forwards
/// `MediaEvent`s into the page after driving it.
pub struct NoopMediaSurface {
    state: Mutex<SurfaceState>,
}

impl NoopMediaSurface {
    pub fn new() -> Self {
        NoopMediaSurface {
            state: Mutex::new(SurfaceState {
                paused: true,
                ended: false,
                muted: false,
                looping: false,
                preload: Preload::Auto,
                source: None,
                current_time: 0.0,
                duration: f64::NAN,
                buffered_end: None,
                size: (0, 0),
                reject_play: false,
                play_calls: 0,
                pause_calls: 0,
                seeks: Vec::new(),
            }),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut SurfaceState) -> R) -> R {
        let mut s = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut s)
    }

    /// Make subsequent `play` calls fail like an autoplay policy would
    pub fn set_reject_play(&self, reject: bool) {
        self.with(|s| s.reject_play = reject);
    }

    /// Simulate loaded metadata
    pub fn set_metadata(&self, duration: f64, width: u32, height: u32) {
        self.with(|s| {
            s.duration = duration;
            s.size = (width, height);
        });
    }

    pub fn set_current_time(&self, seconds: f64) {
        self.with(|s| s.current_time = seconds);
    }

    pub fn set_buffered_end(&self, end: Option<f64>) {
        self.with(|s| s.buffered_end = end);
    }

    /// Simulate playback reaching the end
    pub fn finish(&self) {
        self.with(|s| {
            s.paused = true;
            s.ended = true;
            s.current_time = s.duration;
        });
    }

    pub fn source(&self) -> Option<String> {
        self.with(|s| s.source.clone())
    }

    pub fn preload(&self) -> Preload {
        self.with(|s| s.preload)
    }

    pub fn is_looping(&self) -> bool {
        self.with(|s| s.looping)
    }

    pub fn play_calls(&self) -> usize {
        self.with(|s| s.play_calls)
    }

    pub fn pause_calls(&self) -> usize {
        self.with(|s| s.pause_calls)
    }

    pub fn seeks(&self) -> Vec<f64> {
        self.with(|s| s.seeks.clone())
    }
}

impl Default for NoopMediaSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaSurface for NoopMediaSurface {
    fn play(&self) -> Result<()> {
        self.with(|s| {
            s.play_calls += 1;
            if s.reject_play {
                return Err(Error::PlayRejected("NotAllowedError".to_string()));
            }
            s.paused = false;
            s.ended = false;
            Ok(())
        })
    }

    fn pause(&self) {
        self.with(|s| {
            s.pause_calls += 1;
            s.paused = true;
        });
    }

    fn seek(&self, seconds: f64) {
        self.with(|s| {
            s.seeks.push(seconds);
            s.current_time = seconds;
            s.ended = false;
        });
    }

    fn current_time(&self) -> f64 {
        self.with(|s| s.current_time)
    }

    fn duration(&self) -> f64 {
        self.with(|s| s.duration)
    }

    fn buffered_end(&self) -> Option<f64> {
        self.with(|s| s.buffered_end)
    }

    fn is_paused(&self) -> bool {
        self.with(|s| s.paused)
    }

    fn is_ended(&self) -> bool {
        self.with(|s| s.ended)
    }

    fn is_muted(&self) -> bool {
        self.with(|s| s.muted)
    }

    fn set_muted(&self, muted: bool) {
        self.with(|s| s.muted = muted);
    }

    fn set_looping(&self, looping: bool) {
        self.with(|s| s.looping = looping);
    }

    fn set_preload(&self, preload: Preload) {
        self.with(|s| s.preload = preload);
    }

    fn set_source(&self, url: Option<&str>) {
        self.with(|s| s.source = url.map(|u| u.to_string()));
    }

    fn video_size(&self) -> (u32, u32) {
        self.with(|s| s.size)
    }

    fn reset(&self) {
        self.with(|s| {
            s.paused = true;
            s.ended = false;
            s.source = None;
            s.current_time = 0.0;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_surface_transitions_state() {
        let m = NoopMediaSurface::new();
        assert!(m.is_paused());
        m.play().unwrap();
        assert!(!m.is_paused());
        m.pause();
        assert!(m.is_paused());
        assert_eq!(m.play_calls(), 1);
        assert_eq!(m.pause_calls(), 1);
    }

    #[test]
    fn rejected_play_leaves_surface_paused() {
        let m = NoopMediaSurface::new();
        m.set_reject_play(true);
        assert!(matches!(m.play(), Err(Error::PlayRejected(_))));
        assert!(m.is_paused());
    }

    #[test]
    fn seek_records_position_and_clears_ended() {
        let m = NoopMediaSurface::new();
        m.set_metadata(30.0, 1920, 1080);
        m.finish();
        assert!(m.is_ended());
        m.seek(12.5);
        assert!(!m.is_ended());
        assert_eq!(m.current_time(), 12.5);
        assert_eq!(m.seeks(), vec![12.5]);
    }
}
