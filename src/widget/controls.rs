//! Control buttons: play/pause, mute and fullscreen.

use super::Widget;
use serde::Serialize;
use std::time::Instant;

/// A `data-player-control` button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Control {
    TogglePlay,
    Mute,
    Fullscreen,
}

impl Control {
    /// Parse a `data-player-control` value; unknown values are not controls
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "play" | "pause" | "playpause" => Some(Control::TogglePlay),
            "mute" => Some(Control::Mute),
            "fullscreen" => Some(Control::Fullscreen),
            _ => None,
        }
    }
}

impl Widget {
    pub fn click_control(&mut self, control: Control) {
        if self.disposed {
            return;
        }
        log::trace!("{} control {:?}", self.id, control);
        match control {
            Control::TogglePlay => self.toggle_play(),
            Control::Mute => self.toggle_mute(),
            Control::Fullscreen => self.toggle_fullscreen(),
        }
    }

    pub fn toggle_mute(&mut self) {
        let muted = self.surface.is_muted();
        self.set_muted(!muted);
    }

    /// Ask the platform to enter or leave fullscreen. The flag itself follows
    /// the change notification, see [`Widget::on_fullscreen_change`].
    pub fn toggle_fullscreen(&mut self) {
        if !self.config.variant.is_player() {
            return;
        }
        let fs = &self.services.fullscreen;
        if fs.is_active(self.id) {
            fs.exit(self.id);
        } else {
            fs.enter(self.id);
        }
    }

    /// Document-wide fullscreen change: mirror the flag and wake the controls
    pub fn on_fullscreen_change(&mut self, now: Instant) {
        if self.disposed || !self.config.variant.is_player() {
            return;
        }
        self.state.fullscreen = self.services.fullscreen.is_active(self.id);
        self.on_pointer_down(now);
    }
}
