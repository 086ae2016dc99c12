//! Viewport-driven autoplay.

use super::{PauseOrigin, PauseReason, Status, Widget};
use crate::platform::IntersectionEntry;

impl Widget {
    /// Visibility callback. Only autoplay widgets are observed; anything else
    /// ignores the entry.
    pub fn on_intersection(&mut self, entry: IntersectionEntry) {
        if self.disposed || !self.config.autoplay {
            return;
        }

        if entry.in_view() {
            if self.config.lazy_mode.is_lazy() && !self.state.attached {
                self.attach();
            }
            if self.surface.is_paused() {
                // a manual pause sticks until the user plays again
                if self.state.last_pause_reason != PauseReason::Manual {
                    self.request_play();
                }
            } else {
                self.set_status(Status::Playing);
            }
        } else if self.is_playing() {
            self.request_pause(PauseOrigin::Visibility);
            self.set_status(Status::Paused);
        }
    }
}
