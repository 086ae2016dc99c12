/// Fullscreen primitives

use crate::widget::WidgetId;
use std::collections::HashSet;
use std::sync::Mutex;

pub trait Fullscreen: Send + Sync {
    fn is_active(&self, widget: WidgetId) -> bool;
    fn enter(&self, widget: WidgetId);
    fn exit(&self, widget: WidgetId);
}

/// Noop implementation that stores the fullscreen set in a Mutex
pub struct NoopFullscreen {
    active: Mutex<HashSet<WidgetId>>,
}

impl NoopFullscreen {
    pub fn new() -> Self {
        NoopFullscreen { active: Mutex::new(HashSet::new()) }
    }
}

impl Default for NoopFullscreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Fullscreen for NoopFullscreen {
    fn is_active(&self, widget: WidgetId) -> bool {
        self.active.lock().map(|a| a.contains(&widget)).unwrap_or(false)
    }

    fn enter(&self, widget: WidgetId) {
        if let Ok(mut a) = self.active.lock() {
            // one element may own the screen at a time
            a.clear();
            a.insert(widget);
        }
    }

    fn exit(&self, widget: WidgetId) {
        if let Ok(mut a) = self.active.lock() {
            a.remove(&widget);
        }
    }
}
