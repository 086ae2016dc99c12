/// Animation-frame scheduling

use crate::widget::WidgetId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Requests one callback on the next display frame. The host answers with
/// `Page::on_animation_frame(widget)`.
pub trait FrameScheduler: Send + Sync {
    fn request_frame(&self, widget: WidgetId) -> FrameHandle;
    fn cancel_frame(&self, handle: FrameHandle);
}

/// Keeps outstanding requests in memory so tests can inspect them
pub struct NoopFrameScheduler {
    next: AtomicU64,
    pending: Mutex<HashMap<FrameHandle, WidgetId>>,
}

impl NoopFrameScheduler {
    pub fn new() -> Self {
        NoopFrameScheduler { next: AtomicU64::new(1), pending: Mutex::new(HashMap::new()) }
    }

    pub fn is_pending(&self, widget: WidgetId) -> bool {
        self.pending.lock().map(|p| p.values().any(|w| *w == widget)).unwrap_or(false)
    }

    /// Take every outstanding request, as a display frame would
    pub fn drain(&self) -> Vec<WidgetId> {
        self.pending.lock().map(|mut p| p.drain().map(|(_, w)| w).collect()).unwrap_or_default()
    }
}

impl Default for NoopFrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameScheduler for NoopFrameScheduler {
    fn request_frame(&self, widget: WidgetId) -> FrameHandle {
        let handle = FrameHandle(self.next.fetch_add(1, Ordering::Relaxed));
        if let Ok(mut p) = self.pending.lock() {
            p.insert(handle, widget);
        }
        handle
    }

    fn cancel_frame(&self, handle: FrameHandle) {
        if let Ok(mut p) = self.pending.lock() {
            p.remove(&handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_removes_request() {
        let s = NoopFrameScheduler::new();
        let h = s.request_frame(WidgetId(1));
        assert!(s.is_pending(WidgetId(1)));
        s.cancel_frame(h);
        assert!(!s.is_pending(WidgetId(1)));
    }

    #[test]
    fn drain_empties_queue() {
        let s = NoopFrameScheduler::new();
        s.request_frame(WidgetId(1));
        s.request_frame(WidgetId(2));
        let mut got = s.drain();
        got.sort();
        assert_eq!(got, vec![WidgetId(1), WidgetId(2)]);
        assert!(s.drain().is_empty());
    }
}
