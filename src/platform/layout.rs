/// Element geometry and pointer capture

use serde::Serialize;
use std::sync::Mutex;

/// Client-space rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Bounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Edges are inclusive
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.right() && y >= self.top && y <= self.bottom()
    }

    /// Horizontal position of `x` along the box, clamped to `0..=1`
    pub fn fraction_x(&self, x: f64) -> f64 {
        if self.width <= 0.0 {
            return 0.0;
        }
        ((x - self.left) / self.width).clamp(0.0, 1.0)
    }
}

/// Per-widget geometry queries. Measuring is assumed to be expensive, so
/// callers cache results.
pub trait ElementLayout: Send + Sync {
    fn widget_bounds(&self) -> Bounds;
    fn timeline_bounds(&self) -> Bounds;
    fn capture_pointer(&self, pointer_id: i32);
}

/// Fixed geometry that counts measurements
pub struct FixedLayout {
    widget: Mutex<Bounds>,
    timeline: Mutex<Bounds>,
    measurements: Mutex<usize>,
    captured: Mutex<Option<i32>>,
}

impl FixedLayout {
    pub fn new(widget: Bounds, timeline: Bounds) -> Self {
        FixedLayout {
            widget: Mutex::new(widget),
            timeline: Mutex::new(timeline),
            measurements: Mutex::new(0),
            captured: Mutex::new(None),
        }
    }

    pub fn set_timeline(&self, b: Bounds) {
        if let Ok(mut t) = self.timeline.lock() {
            *t = b;
        }
    }

    /// How many times the timeline box was measured
    pub fn measurements(&self) -> usize {
        self.measurements.lock().map(|m| *m).unwrap_or(0)
    }

    pub fn captured_pointer(&self) -> Option<i32> {
        self.captured.lock().ok().and_then(|c| *c)
    }
}

impl Default for FixedLayout {
    fn default() -> Self {
        Self::new(Bounds::new(0.0, 0.0, 640.0, 360.0), Bounds::new(20.0, 340.0, 600.0, 8.0))
    }
}

impl ElementLayout for FixedLayout {
    fn widget_bounds(&self) -> Bounds {
        self.widget.lock().map(|b| *b).unwrap_or_default()
    }

    fn timeline_bounds(&self) -> Bounds {
        if let Ok(mut m) = self.measurements.lock() {
            *m += 1;
        }
        self.timeline.lock().map(|b| *b).unwrap_or_default()
    }

    fn capture_pointer(&self, pointer_id: i32) {
        if let Ok(mut c) = self.captured.lock() {
            *c = Some(pointer_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fraction_is_clamped() {
        let b = Bounds::new(100.0, 0.0, 200.0, 10.0);
        assert_eq!(b.fraction_x(50.0), 0.0);
        assert_eq!(b.fraction_x(200.0), 0.5);
        assert_eq!(b.fraction_x(400.0), 1.0);
    }

    #[test]
    fn zero_width_box_yields_zero() {
        assert_eq!(Bounds::default().fraction_x(10.0), 0.0);
    }

    #[test]
    fn contains_is_inclusive() {
        let b = Bounds::new(0.0, 0.0, 10.0, 10.0);
        assert!(b.contains(10.0, 10.0));
        assert!(!b.contains(10.1, 5.0));
    }
}
