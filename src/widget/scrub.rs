//! Timeline scrubbing with a throttled seek.

use super::{PauseOrigin, Widget};
use crate::platform::Bounds;
use crate::time::{format_time, set_text};
use std::time::Instant;

#[derive(Debug, Default)]
pub(super) struct ScrubState {
    was_playing: bool,
    target_time: f64,
    last_commit: Option<Instant>,
    /// Timeline box measured at drag start
    rect: Option<Bounds>,
}

impl Widget {
    fn scrubbable(&self) -> bool {
        !self.disposed && self.config.variant.is_player() && self.config.slots.timeline
    }

    fn known_duration(&self) -> Option<f64> {
        let d = self.surface.duration();
        (d.is_finite() && d > 0.0).then_some(d)
    }

    /// Pointer pressed on the timeline track or its handle
    pub fn on_timeline_pointer_down(&mut self, pointer_id: i32, x: f64, now: Instant) {
        if !self.scrubbable() || self.known_duration().is_none() {
            return;
        }
        self.state.dragging = true;
        self.scrub.was_playing = self.is_playing();
        if self.scrub.was_playing {
            self.request_pause(PauseOrigin::Scrub);
        }
        self.scrub.rect = Some(self.layout.timeline_bounds());
        self.layout.capture_pointer(pointer_id);
        self.scrub_to(x, now);
    }

    pub(super) fn on_scrub_move(&mut self, x: f64, now: Instant) {
        if !self.state.dragging || self.disposed {
            return;
        }
        self.scrub_to(x, now);
    }

    /// Release ends the drag and always commits the final position.
    pub(super) fn on_scrub_release(&mut self, now: Instant) {
        if !self.state.dragging {
            return;
        }
        self.state.dragging = false;
        self.scrub.rect = None;
        self.seek_to(self.scrub.target_time);
        self.scrub.last_commit = Some(now);

        if self.scrub.was_playing {
            self.request_play();
        } else {
            self.update_progress_visuals();
            self.update_time_texts();
        }
    }

    /// Layout changed; the cached box is stale unless a drag holds it
    pub fn on_resize(&mut self) {
        if !self.state.dragging {
            self.scrub.rect = None;
        }
    }

    fn scrub_to(&mut self, x: f64, now: Instant) {
        let Some(duration) = self.known_duration() else {
            return;
        };
        let layout = &self.layout;
        let rect = *self.scrub.rect.get_or_insert_with(|| layout.timeline_bounds());
        let fraction = rect.fraction_x(x);
        self.scrub.target_time = fraction * duration;

        self.visuals.played_pct = fraction * 100.0;
        set_text(&mut self.visuals.progress_texts, &format_time(self.scrub.target_time));

        let due = self
            .scrub
            .last_commit
            .map(|t| now.saturating_duration_since(t) >= self.services.tuning.seek_throttle)
            .unwrap_or(true);
        if due {
            self.scrub.last_commit = Some(now);
            self.seek_to(self.scrub.target_time);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests_support::*;
    use crate::platform::{Bounds, MediaSurface};
    use crate::widget::{MediaEvent, PauseReason, Status};
    use std::time::{Duration, Instant};

    // default timeline box spans x = 20..620
    const MID: f64 = 320.0;

    #[test]
    fn pointer_down_without_duration_is_ignored() {
        let (mut w, surface, _) = widget(&[], false, false);
        w.init();
        w.on_timeline_pointer_down(1, MID, Instant::now());
        assert!(!w.state().dragging);
        assert!(surface.seeks().is_empty());
    }

    #[test]
    fn commits_are_throttled_and_release_always_commits() {
        let (mut w, surface, platform) = widget(&[], false, false);
        w.init();
        surface.set_metadata(100.0, 0, 0);
        let t0 = Instant::now();

        w.on_timeline_pointer_down(7, MID, t0);
        assert!(w.state().dragging);
        assert_eq!(platform.layout(w.id()).unwrap().captured_pointer(), Some(7));
        assert_eq!(surface.seeks(), vec![50.0]);
        assert_eq!(w.visuals().played_pct, 50.0);
        assert_eq!(w.visuals().progress_texts[0], "00:50");

        w.on_pointer_move(170.0, 344.0, t0 + Duration::from_millis(100));
        assert_eq!(surface.seeks().len(), 1);
        assert_eq!(w.visuals().played_pct, 25.0);

        w.on_pointer_move(470.0, 344.0, t0 + Duration::from_millis(180));
        assert_eq!(surface.seeks(), vec![50.0, 75.0]);

        w.on_pointer_move(20.0, 344.0, t0 + Duration::from_millis(200));
        w.on_pointer_up(t0 + Duration::from_millis(210));
        assert_eq!(surface.seeks(), vec![50.0, 75.0, 0.0]);
        assert!(!w.state().dragging);
    }

    #[test]
    fn drag_pauses_and_resumes_playback() {
        let (mut w, surface, _) = playing(&[]);
        surface.set_metadata(60.0, 0, 0);
        w.on_timeline_pointer_down(1, MID, Instant::now());
        assert!(surface.is_paused());
        // a scrub pause does not count as a manual one
        assert_eq!(w.state().last_pause_reason, PauseReason::None);
        w.on_media_event(MediaEvent::Pause);

        w.on_pointer_up(Instant::now());
        assert!(!surface.is_paused());
        assert_eq!(w.state().status, Status::Loading);
        assert_eq!(surface.play_calls(), 2);
    }

    #[test]
    fn box_is_measured_once_per_drag() {
        let (mut w, surface, platform) = widget(&[], false, false);
        w.init();
        surface.set_metadata(100.0, 0, 0);
        let layout = platform.layout(w.id()).unwrap();
        let t0 = Instant::now();
        w.on_timeline_pointer_down(1, MID, t0);
        layout.set_timeline(Bounds::new(0.0, 0.0, 1000.0, 8.0));
        w.on_resize();
        w.on_pointer_move(320.0, 0.0, t0 + Duration::from_secs(1));
        assert_eq!(layout.measurements(), 1);
        assert_eq!(w.visuals().played_pct, 50.0);
        w.on_pointer_up(t0 + Duration::from_secs(1));

        w.on_timeline_pointer_down(1, 500.0, t0 + Duration::from_secs(2));
        assert_eq!(layout.measurements(), 2);
        assert_eq!(w.visuals().played_pct, 50.0);
    }

    #[test]
    fn moves_without_drag_do_not_seek() {
        let (mut w, surface, _) = widget(&[], false, false);
        w.init();
        surface.set_metadata(100.0, 0, 0);
        w.on_pointer_move(MID, 344.0, Instant::now());
        w.on_pointer_up(Instant::now());
        assert!(surface.seeks().is_empty());
    }
}
