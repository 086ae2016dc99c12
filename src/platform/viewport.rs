/// Viewport visibility observation

use crate::widget::WidgetId;
use std::collections::HashMap;
use std::sync::Mutex;

/// One visibility callback payload
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    pub is_intersecting: bool,
    pub intersection_ratio: f64,
}

impl IntersectionEntry {
    pub fn visible(ratio: f64) -> Self {
        Self { is_intersecting: ratio > 0.0, intersection_ratio: ratio }
    }

    pub fn hidden() -> Self {
        Self { is_intersecting: false, intersection_ratio: 0.0 }
    }

    /// Any non-zero overlap counts as in view
    pub fn in_view(&self) -> bool {
        self.is_intersecting && self.intersection_ratio > 0.0
    }
}

/// Membership test primitive. The host delivers entries for observed widgets
/// through `Page::on_intersection`.
pub trait ViewportObserver: Send + Sync {
    fn observe(&self, widget: WidgetId, threshold: f64);
    fn unobserve(&self, widget: WidgetId);
}

/// Keeps the observed set in memory
pub struct NoopViewportObserver {
    observed: Mutex<HashMap<WidgetId, f64>>,
}

impl NoopViewportObserver {
    pub fn new() -> Self {
        NoopViewportObserver { observed: Mutex::new(HashMap::new()) }
    }

    /// Threshold a widget was registered with, if it is observed
    pub fn threshold(&self, widget: WidgetId) -> Option<f64> {
        self.observed.lock().ok().and_then(|m| m.get(&widget).copied())
    }
}

impl Default for NoopViewportObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewportObserver for NoopViewportObserver {
    fn observe(&self, widget: WidgetId, threshold: f64) {
        if let Ok(mut m) = self.observed.lock() {
            m.insert(widget, threshold);
        }
    }

    fn unobserve(&self, widget: WidgetId) {
        if let Ok(mut m) = self.observed.lock() {
            m.remove(&widget);
        }
    }
}
