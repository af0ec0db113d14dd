//! Target source for a lone chain.
//!
//! Pointer and touch input steer the head directly. Once a permission request
//! resolves as granted, the device tilt steers it instead. When neither has
//! produced input for a while, the target falls back to an idle orbit.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::ProfileConfig;
use crate::error::OrientationError;
use crate::viewport::Viewport;
use crate::wander::OrbitWander;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverMode {
    Pointer,
    Orientation,
}

/// Answer from the host's permission prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionOutcome {
    Granted,
    Denied,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct HeadDriver {
    mode: DriverMode,
    pending: bool,
    target: Vec2,
    last_activity_ms: Option<f64>,
    orbit: OrbitWander,
}

impl HeadDriver {
    pub fn new(viewport: Viewport, orbit_phase: f32) -> Self {
        Self {
            mode: DriverMode::Pointer,
            pending: false,
            target: viewport.center(),
            last_activity_ms: None,
            orbit: OrbitWander::new(orbit_phase),
        }
    }

    pub fn mode(&self) -> DriverMode {
        self.mode
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn is_request_pending(&self) -> bool {
        self.pending
    }

    pub fn last_activity_ms(&self) -> Option<f64> {
        self.last_activity_ms
    }

    pub fn pointer_moved(&mut self, point: Vec2, now_ms: f64, viewport: Viewport, margin: f32) {
        if self.mode == DriverMode::Orientation {
            return;
        }
        self.target = viewport.clamp_inset(point, margin);
        self.last_activity_ms = Some(now_ms);
    }

    pub fn touch_moved(&mut self, touches: &[Vec2], now_ms: f64, viewport: Viewport, margin: f32) {
        if let Some(first) = touches.first() {
            self.pointer_moved(*first, now_ms, viewport, margin);
        }
    }

    /// Tilt sample in degrees. A sample missing either axis is ignored.
    pub fn orientation(
        &mut self,
        gamma: Option<f32>,
        beta: Option<f32>,
        viewport: Viewport,
        params: &ProfileConfig,
    ) {
        if self.mode != DriverMode::Orientation {
            return;
        }
        let (Some(gamma), Some(beta)) = (gamma, beta) else {
            return;
        };
        let sensitivity = params.orientation.sensitivity;
        self.target = viewport.center()
            + Vec2::new(
                gamma * viewport.width / sensitivity,
                beta * viewport.height / sensitivity,
            );
    }

    /// Mark a permission request as outstanding. The current mode stays
    /// active until [`HeadDriver::resolve_orientation`] sees a grant.
    pub fn request_orientation(&mut self) -> Result<(), OrientationError> {
        if self.pending {
            return Err(OrientationError::AlreadyPending);
        }
        self.pending = true;
        Ok(())
    }

    pub fn resolve_orientation(&mut self, outcome: PermissionOutcome) -> Result<(), OrientationError> {
        if !self.pending {
            warn!(?outcome, "permission outcome without a pending request, ignored");
            return Ok(());
        }
        self.pending = false;
        match outcome {
            PermissionOutcome::Granted => {
                info!("motion sensor access granted, following device tilt");
                self.mode = DriverMode::Orientation;
                Ok(())
            }
            PermissionOutcome::Denied => {
                warn!("motion sensor access denied, staying in {:?} mode", self.mode);
                Err(OrientationError::Denied)
            }
            PermissionOutcome::Failed(reason) => {
                warn!(%reason, "motion sensor request failed, staying in {:?} mode", self.mode);
                Err(OrientationError::Failed(reason))
            }
        }
    }

    pub fn disable_orientation(&mut self) {
        if self.mode == DriverMode::Orientation {
            info!("motion sensor steering disabled");
        }
        self.mode = DriverMode::Pointer;
    }

    /// Target for this tick, advancing the idle orbit when pointer input has
    /// been quiet for longer than the timeout.
    pub fn next_target(&mut self, now_ms: f64, viewport: Viewport, params: &ProfileConfig) -> Vec2 {
        if self.mode == DriverMode::Pointer && self.is_idle(now_ms, params.orbit.idle_timeout_ms) {
            self.target = self.orbit.next_target(viewport, &params.orbit);
        }
        self.target
    }

    fn is_idle(&self, now_ms: f64, timeout_ms: f64) -> bool {
        match self.last_activity_ms {
            Some(last) => now_ms - last > timeout_ms,
            None => true,
        }
    }
}
