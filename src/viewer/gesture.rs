//! Click vs drag classification for pointer input on the viewer.

use std::time::Duration;

use web_time::Instant;

/// Raw pointer input in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Pressed { x: f64, y: f64 },
    Moved { x: f64, y: f64 },
    Released { x: f64, y: f64 },
    /// Wheel scroll; positive `delta` zooms in
    Scrolled { delta: f64, x: f64, y: f64 },
}

/// What a pointer sequence amounted to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// Quick press and release without meaningful movement
    Click { x: f64, y: f64 },
    /// Pointer moved while held past the click threshold
    Drag { dx: f64, dy: f64 },
    /// Button released after a drag, or a press that took too long
    Release,
    Zoom { delta: f64, x: f64, y: f64 },
}

/// Limits that separate a click from a drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickThresholds {
    /// Maximum travel in screen pixels
    pub distance: f64,
    /// Maximum press duration
    pub time: Duration,
}

impl Default for ClickThresholds {
    fn default() -> Self {
        Self {
            distance: 5.0,
            time: Duration::from_millis(300),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Press {
    origin: (f64, f64),
    last: (f64, f64),
    at: Instant,
    dragging: bool,
}

/// Tracks one pointer press at a time.
#[derive(Debug, Clone, Default)]
pub struct GestureTracker {
    thresholds: ClickThresholds,
    press: Option<Press>,
}

impl GestureTracker {
    pub fn new(thresholds: ClickThresholds) -> Self {
        Self {
            thresholds,
            press: None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.press.is_some_and(|p| p.dragging)
    }

    /// Forget any press in progress.
    pub fn reset(&mut self) {
        self.press = None;
    }

    pub fn handle(&mut self, event: PointerEvent) -> Option<Gesture> {
        self.handle_at(event, Instant::now())
    }

    /// Classify an event that happened at `now`.
    pub fn handle_at(&mut self, event: PointerEvent, now: Instant) -> Option<Gesture> {
        match event {
            PointerEvent::Pressed { x, y } => {
                self.press = Some(Press {
                    origin: (x, y),
                    last: (x, y),
                    at: now,
                    dragging: false,
                });
                None
            }
            PointerEvent::Moved { x, y } => {
                let thresholds = self.thresholds;
                let press = self.press.as_mut()?;
                if !press.dragging && distance(press.origin, (x, y)) >= thresholds.distance {
                    press.dragging = true;
                }
                if !press.dragging {
                    return None;
                }
                let (lx, ly) = press.last;
                press.last = (x, y);
                Some(Gesture::Drag {
                    dx: x - lx,
                    dy: y - ly,
                })
            }
            PointerEvent::Released { x, y } => {
                let press = self.press.take()?;
                let quick = !press.dragging
                    && distance(press.origin, (x, y)) < self.thresholds.distance
                    && now.saturating_duration_since(press.at) <= self.thresholds.time;
                if quick {
                    Some(Gesture::Click { x, y })
                } else {
                    Some(Gesture::Release)
                }
            }
            PointerEvent::Scrolled { delta, x, y } => Some(Gesture::Zoom { delta, x, y }),
        }
    }
}

fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    (a.0 - b.0).hypot(a.1 - b.1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> GestureTracker {
        GestureTracker::new(ClickThresholds::default())
    }

    #[test]
    fn test_quick_click() {
        let mut t = tracker();
        let start = Instant::now();
        assert_eq!(t.handle_at(PointerEvent::Pressed { x: 10.0, y: 10.0 }, start), None);
        assert_eq!(
            t.handle_at(
                PointerEvent::Released { x: 12.0, y: 11.0 },
                start + Duration::from_millis(80)
            ),
            Some(Gesture::Click { x: 12.0, y: 11.0 })
        );
    }

    #[test]
    fn test_small_jitter_stays_a_click() {
        let mut t = tracker();
        let start = Instant::now();
        t.handle_at(PointerEvent::Pressed { x: 0.0, y: 0.0 }, start);
        assert_eq!(t.handle_at(PointerEvent::Moved { x: 2.0, y: 2.0 }, start), None);
        assert!(!t.is_dragging());
        assert_eq!(
            t.handle_at(PointerEvent::Released { x: 2.0, y: 2.0 }, start),
            Some(Gesture::Click { x: 2.0, y: 2.0 })
        );
    }

    #[test]
    fn test_drag_is_not_a_click() {
        let mut t = tracker();
        let start = Instant::now();
        t.handle_at(PointerEvent::Pressed { x: 0.0, y: 0.0 }, start);
        assert_eq!(
            t.handle_at(PointerEvent::Moved { x: 20.0, y: 0.0 }, start),
            Some(Gesture::Drag { dx: 20.0, dy: 0.0 })
        );
        assert_eq!(
            t.handle_at(PointerEvent::Moved { x: 25.0, y: 5.0 }, start),
            Some(Gesture::Drag { dx: 5.0, dy: 5.0 })
        );
        // Returning to the origin does not turn it back into a click
        t.handle_at(PointerEvent::Moved { x: 0.0, y: 0.0 }, start);
        assert_eq!(
            t.handle_at(PointerEvent::Released { x: 0.0, y: 0.0 }, start),
            Some(Gesture::Release)
        );
    }

    #[test]
    fn test_slow_press_is_not_a_click() {
        let mut t = tracker();
        let start = Instant::now();
        t.handle_at(PointerEvent::Pressed { x: 5.0, y: 5.0 }, start);
        assert_eq!(
            t.handle_at(
                PointerEvent::Released { x: 5.0, y: 5.0 },
                start + Duration::from_millis(900)
            ),
            Some(Gesture::Release)
        );
    }

    #[test]
    fn test_release_without_press_ignored() {
        let mut t = tracker();
        assert_eq!(t.handle(PointerEvent::Released { x: 1.0, y: 1.0 }), None);
        assert_eq!(t.handle(PointerEvent::Moved { x: 1.0, y: 1.0 }), None);
    }
}
