//! Status state machine: play/pause commands and media event reconciliation.

use super::{PauseReason, Status, Widget};

/// Media element events forwarded by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaEvent {
    Play,
    Playing,
    Pause,
    /// Buffering / stalled
    Waiting,
    CanPlay,
    Ended,
    LoadedMetadata,
    LoadedData,
    TimeUpdate,
    DurationChange,
    /// Buffered ranges grew
    Progress,
}

/// Who asks for a pause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseOrigin {
    /// A control press; blocks visibility auto-resume
    User,
    /// The widget left the viewport
    Visibility,
    /// A timeline drag; keeps the previous reason
    Scrub,
}

impl Widget {
    pub(super) fn set_status(&mut self, status: Status) {
        if self.state.status != status {
            log::trace!("{} status {} -> {}", self.id, self.state.status, status);
            self.state.status = status;
        }
    }

    /// Report `Ready` only for an idle widget that was never played and has
    /// no play request in flight.
    pub(super) fn ready_if_idle(&mut self) {
        if !self.state.pending_play && !self.state.activated && self.state.status == Status::Idle {
            self.set_status(Status::Ready);
        }
    }

    /// Ask the surface to play.
    ///
    /// Attaches a lazy backend first. The status flips to `Loading` right away;
    /// `Playing` only follows the real media event. A policy rejection is
    /// swallowed and clears `pending_play` so the flag cannot go stale.
    pub fn request_play(&mut self) {
        if self.disposed {
            return;
        }
        if !self.state.attached {
            self.attach();
        }
        self.state.pending_play = true;
        self.state.last_pause_reason = PauseReason::None;
        self.set_status(Status::Loading);
        if let Err(e) = self.surface.play() {
            log::debug!("{} play rejected: {}", self.id, e);
            self.state.pending_play = false;
        }
    }

    /// Pause when playing. Does nothing otherwise.
    pub fn request_pause(&mut self, origin: PauseOrigin) {
        if self.disposed || !self.is_playing() {
            return;
        }
        match origin {
            PauseOrigin::User => self.state.last_pause_reason = PauseReason::Manual,
            PauseOrigin::Visibility => self.state.last_pause_reason = PauseReason::Visibility,
            PauseOrigin::Scrub => {}
        }
        self.surface.pause();
    }

    /// Play when paused or ended, otherwise pause on behalf of the user
    pub fn toggle_play(&mut self) {
        if self.surface.is_paused() || self.surface.is_ended() {
            self.request_play();
        } else {
            self.request_pause(PauseOrigin::User);
        }
    }

    /// Move the play-head; ignored while the duration is unknown
    pub fn seek_to(&mut self, seconds: f64) {
        if self.disposed {
            return;
        }
        let duration = self.surface.duration();
        if !duration.is_finite() || duration <= 0.0 {
            return;
        }
        self.surface.seek(seconds.clamp(0.0, duration));
    }

    /// Reconcile the state record with a media event
    pub fn on_media_event(&mut self, event: MediaEvent) {
        if self.disposed {
            return;
        }
        match event {
            MediaEvent::Play => {
                self.state.activated = true;
                self.start_progress_loop();
                self.set_status(Status::Playing);
            }
            MediaEvent::Playing => {
                self.state.pending_play = false;
                self.state.activated = true;
                self.set_status(Status::Playing);
                self.maybe_ratio_from_surface();
            }
            MediaEvent::Pause => {
                self.state.pending_play = false;
                self.stop_progress_loop();
                self.set_status(Status::Paused);
            }
            MediaEvent::Waiting => self.set_status(Status::Loading),
            MediaEvent::CanPlay => self.ready_if_idle(),
            MediaEvent::Ended => {
                self.state.pending_play = false;
                self.stop_progress_loop();
                self.set_status(Status::Paused);
                self.state.activated = false;
            }
            MediaEvent::LoadedMetadata => {
                if self.awaiting_native_meta {
                    self.awaiting_native_meta = false;
                    self.ready_if_idle();
                }
                self.update_time_texts();
                self.maybe_ratio_from_surface();
                self.update_buffered();
            }
            MediaEvent::LoadedData => self.maybe_ratio_from_surface(),
            MediaEvent::TimeUpdate => self.update_time_texts(),
            MediaEvent::DurationChange => {
                self.update_time_texts();
                self.update_buffered();
            }
            MediaEvent::Progress => self.update_buffered(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests_support::*;
    use super::*;
    use crate::platform::MediaSurface;

    #[test]
    fn play_request_is_loading_until_playing_event() {
        let (mut w, surface, _) = widget(&[("data-player-lazy", "true")], false, false);
        w.init();
        w.request_play();
        assert!(w.state().pending_play);
        assert_eq!(w.state().status, Status::Loading);
        assert_eq!(surface.play_calls(), 1);

        // lazily attached media announces readiness before playing
        w.on_media_event(MediaEvent::CanPlay);
        assert_eq!(w.state().status, Status::Loading);

        w.on_media_event(MediaEvent::Play);
        w.on_media_event(MediaEvent::Playing);
        assert!(!w.state().pending_play);
        assert!(w.state().activated);
        assert_eq!(w.state().status, Status::Playing);
    }

    #[test]
    fn rejected_play_clears_pending_and_stays_loading() {
        let (mut w, surface, _) = widget(&[], false, false);
        w.init();
        surface.set_reject_play(true);
        w.request_play();
        assert!(!w.state().pending_play);
        assert_eq!(w.state().status, Status::Loading);
        assert!(!w.state().activated);
    }

    #[test]
    fn can_play_reports_ready_only_from_idle() {
        let (mut w, _, _) = widget(&[], false, false);
        w.init();
        w.on_media_event(MediaEvent::CanPlay);
        assert_eq!(w.state().status, Status::Ready);
    }

    #[test]
    fn ended_deactivates_and_never_returns_to_ready() {
        let (mut w, surface, _) = widget(&[], false, false);
        w.init();
        w.request_play();
        w.on_media_event(MediaEvent::Play);
        w.on_media_event(MediaEvent::Playing);
        surface.finish();
        w.on_media_event(MediaEvent::Ended);
        assert_eq!(w.state().status, Status::Paused);
        assert!(!w.state().activated);
        w.on_media_event(MediaEvent::CanPlay);
        assert_eq!(w.state().status, Status::Paused);
    }

    #[test]
    fn user_pause_marks_manual_reason() {
        let (mut w, surface, _) = widget(&[], false, false);
        w.init();
        w.request_play();
        w.on_media_event(MediaEvent::Playing);
        w.toggle_play();
        assert_eq!(w.state().last_pause_reason, PauseReason::Manual);
        assert!(surface.is_paused());
        w.on_media_event(MediaEvent::Pause);
        assert_eq!(w.state().status, Status::Paused);
    }

    #[test]
    fn pause_request_while_paused_is_ignored() {
        let (mut w, surface, _) = widget(&[], false, false);
        w.init();
        w.request_pause(PauseOrigin::User);
        assert_eq!(w.state().last_pause_reason, PauseReason::None);
        assert_eq!(surface.pause_calls(), 0);
    }

    #[test]
    fn waiting_reports_loading() {
        let (mut w, _, _) = widget(&[], false, false);
        w.init();
        w.request_play();
        w.on_media_event(MediaEvent::Playing);
        w.on_media_event(MediaEvent::Waiting);
        assert_eq!(w.state().status, Status::Loading);
    }

    #[test]
    fn seek_is_clamped_and_needs_duration() {
        let (mut w, surface, _) = widget(&[], false, false);
        w.init();
        w.seek_to(5.0);
        assert!(surface.seeks().is_empty());
        surface.set_metadata(20.0, 0, 0);
        w.seek_to(25.0);
        assert_eq!(surface.seeks(), vec![20.0]);
    }
}
