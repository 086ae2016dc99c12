//! Progress rendering: played/buffered percentages and time texts.

use super::Widget;
use crate::time::{format_time, set_text};

impl Widget {
    /// (Re)start the per-frame loop: render now, then keep requesting frames
    /// while playing.
    pub(super) fn start_progress_loop(&mut self) {
        if !self.config.variant.is_player() {
            return;
        }
        self.cancel_frame();
        self.render_frame();
    }

    /// Stop scheduling and render the final position once
    pub(super) fn stop_progress_loop(&mut self) {
        if !self.config.variant.is_player() {
            return;
        }
        self.cancel_frame();
        self.update_progress_visuals();
        self.update_buffered();
    }

    /// Display-frame callback for this widget
    pub fn on_animation_frame(&mut self) {
        self.frame = None;
        if self.disposed || !self.config.variant.is_player() {
            return;
        }
        self.render_frame();
    }

    fn render_frame(&mut self) {
        self.update_progress_visuals();
        self.update_buffered();
        if self.is_playing() {
            self.frame = Some(self.services.frames.request_frame(self.id));
        }
    }

    fn cancel_frame(&mut self) {
        if let Some(handle) = self.frame.take() {
            self.services.frames.cancel_frame(handle);
        }
    }

    pub(super) fn update_progress_visuals(&mut self) {
        let duration = self.surface.duration();
        if !duration.is_finite() || duration <= 0.0 {
            return;
        }
        let played = self.surface.current_time() / duration * 100.0;
        self.visuals.played_pct = played.clamp(0.0, 100.0);
    }

    pub(super) fn update_buffered(&mut self) {
        if !self.config.slots.buffered {
            return;
        }
        let duration = self.surface.duration();
        if !duration.is_finite() || duration <= 0.0 {
            return;
        }
        if let Some(end) = self.surface.buffered_end() {
            self.visuals.buffered_pct = (end / duration * 100.0).clamp(0.0, 100.0);
        }
    }

    pub(super) fn update_time_texts(&mut self) {
        let duration = self.surface.duration();
        // an unknown duration keeps whatever the prefetch wrote
        if duration.is_finite() {
            set_text(&mut self.visuals.duration_texts, &format_time(duration));
        }
        let current = self.surface.current_time();
        set_text(&mut self.visuals.progress_texts, &format_time(current));
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests_support::*;
    use crate::widget::{MediaEvent, WidgetVariant};

    #[test]
    fn frames_are_requested_only_while_playing() {
        let (mut w, surface, platform) = playing(&[]);
        surface.set_metadata(100.0, 1280, 720);
        surface.set_current_time(25.0);
        assert!(platform.frames().is_pending(w.id()));

        assert_eq!(platform.frames().drain(), vec![w.id()]);
        w.on_animation_frame();
        assert_eq!(w.visuals().played_pct, 25.0);
        assert_eq!(w.visuals().progress_transform(), "translateX(-75%)");
        assert_eq!(w.visuals().handle_left(), "25%");
        assert!(platform.frames().is_pending(w.id()));

        w.toggle_play();
        surface.set_current_time(30.0);
        w.on_media_event(MediaEvent::Pause);
        assert!(!platform.frames().is_pending(w.id()));
        assert_eq!(w.visuals().played_pct, 30.0);
    }

    #[test]
    fn each_frame_refreshes_buffered_bar() {
        let (mut w, surface, platform) = playing(&[]);
        surface.set_metadata(100.0, 0, 0);
        surface.set_current_time(10.0);
        surface.set_buffered_end(Some(40.0));
        platform.frames().drain();
        w.on_animation_frame();
        assert_eq!(w.visuals().played_pct, 10.0);
        assert_eq!(w.visuals().buffered_pct, 40.0);

        surface.set_buffered_end(Some(70.0));
        w.toggle_play();
        w.on_media_event(MediaEvent::Pause);
        assert_eq!(w.visuals().buffered_pct, 70.0);
    }

    #[test]
    fn buffered_refreshes_on_progress_event() {
        let (mut w, surface, _) = widget(&[], false, false);
        w.init();
        surface.set_metadata(200.0, 0, 0);
        surface.set_buffered_end(Some(50.0));
        w.on_media_event(MediaEvent::Progress);
        assert_eq!(w.visuals().buffered_pct, 25.0);
        assert_eq!(w.visuals().buffered_transform(), "translateX(-75%)");
    }

    #[test]
    fn time_texts_follow_surface() {
        let (mut w, surface, _) = widget(&[], false, false);
        w.init();
        surface.set_metadata(3661.0, 0, 0);
        surface.set_current_time(65.0);
        w.on_media_event(MediaEvent::TimeUpdate);
        assert_eq!(w.visuals().duration_texts, vec!["1:01:01".to_string(), "1:01:01".to_string()]);
        assert_eq!(w.visuals().progress_texts, vec!["01:05".to_string()]);
    }

    #[test]
    fn background_never_renders_progress() {
        let background = element(WidgetVariant::Background, &[]);
        let (mut w, surface, platform) = mount(&background, false, false);
        w.init();
        surface.set_metadata(10.0, 0, 0);
        w.request_play();
        w.on_media_event(MediaEvent::Play);
        assert!(!platform.frames().is_pending(w.id()));
        assert_eq!(w.visuals().played_pct, 0.0);
    }
}
