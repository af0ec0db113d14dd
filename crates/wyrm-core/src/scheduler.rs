//! Frame pacing. The host owns the loop and calls [`FrameGate::admit`] on
//! every display refresh; motion constants are per processed frame, so the
//! cap also sets the apparent speed.

use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameGate {
    interval_ms: Option<f64>,
    last_ms: Option<f64>,
}

impl FrameGate {
    pub fn new(fps_cap: Option<f32>) -> Self {
        Self {
            interval_ms: fps_cap
                .filter(|fps| *fps > 0.0)
                .map(|fps| 1000.0 / f64::from(fps)),
            last_ms: None,
        }
    }

    pub fn interval_ms(&self) -> Option<f64> {
        self.interval_ms
    }

    /// True when enough time has passed since the last admitted frame.
    pub fn admit(&mut self, now_ms: f64) -> bool {
        if let (Some(interval), Some(last)) = (self.interval_ms, self.last_ms) {
            let elapsed = now_ms - last;
            if elapsed < interval {
                trace!(elapsed, interval, "frame skipped");
                return false;
            }
        }
        self.last_ms = Some(now_ms);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caps_at_thirty_fps() {
        let mut gate = FrameGate::new(Some(30.0));
        assert!(gate.admit(0.0));
        assert!(!gate.admit(16.7));
        assert!(!gate.admit(33.0));
        assert!(gate.admit(33.4));
        assert!(!gate.admit(50.0));
        assert!(gate.admit(70.0));
    }

    #[test]
    fn uncapped_admits_every_frame() {
        let mut gate = FrameGate::new(None);
        assert_eq!(gate.interval_ms(), None);
        assert!((0..10).all(|i| gate.admit(i as f64)));
    }

    #[test]
    fn halves_a_fifty_hz_display() {
        let mut gate = FrameGate::new(Some(30.0));
        let admitted = (0..600).filter(|i| gate.admit(*i as f64 * 20.0)).count();
        assert_eq!(admitted, 300);
    }
}
