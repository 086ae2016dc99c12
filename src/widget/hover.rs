//! Hover/idle tracking and pointer routing.

use super::{HoverState, Widget};
use std::time::Instant;

#[derive(Debug, Default)]
pub(super) struct HoverTracker {
    deadline: Option<Instant>,
    /// Window-wide moves are followed between enter and leave
    tracking: bool,
}

impl Widget {
    fn wake(&mut self, now: Instant) {
        if self.disposed || !self.config.variant.is_player() {
            return;
        }
        self.state.hover = HoverState::Active;
        self.hover.deadline = Some(now + self.services.tuning.hover_idle);
    }

    pub fn on_pointer_enter(&mut self, now: Instant) {
        self.wake(now);
        self.hover.tracking = true;
    }

    pub fn on_pointer_leave(&mut self) {
        self.hover.tracking = false;
        self.hover.deadline = None;
        if self.config.variant.is_player() {
            self.state.hover = HoverState::Idle;
        }
    }

    /// Pointer pressed anywhere on the widget
    pub fn on_pointer_down(&mut self, now: Instant) {
        self.wake(now);
    }

    /// Window-level pointer move: feeds an active drag and keeps the
    /// controls awake while the pointer is over the widget.
    pub fn on_pointer_move(&mut self, x: f64, y: f64, now: Instant) {
        self.on_scrub_move(x, now);
        if self.hover.tracking && self.layout.widget_bounds().contains(x, y) {
            self.wake(now);
        }
    }

    /// Window-level pointer release
    pub fn on_pointer_up(&mut self, now: Instant) {
        self.on_scrub_release(now);
    }

    /// Fire the idle deadline when it has passed
    pub fn tick(&mut self, now: Instant) {
        if let Some(deadline) = self.hover.deadline {
            if now >= deadline {
                self.hover.deadline = None;
                self.state.hover = HoverState::Idle;
            }
        }
    }

    /// Earliest pending deadline, so hosts can sleep until it
    pub fn next_deadline(&self) -> Option<Instant> {
        self.hover.deadline
    }
}
