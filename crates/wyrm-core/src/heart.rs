//! Heart episode state. The choreography itself is driven by
//! [`Formation`](crate::formation::Formation); this module holds the data
//! and the pure shape maths.

use std::f32::consts::PI;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::angle::heart_curve;
use crate::config::HeartConfig;
use crate::viewport::Viewport;
use crate::wander::Motion;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeartPhase {
    Idle,
    Approach,
    Form,
    Hold,
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    fn sign(self) -> f32 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }

    /// Where this half's head waits while the heart is drawn.
    pub fn anchor(self, viewport: Viewport, margin: f32, params: &HeartConfig) -> Vec2 {
        let point = viewport.center() + Vec2::new(self.sign() * params.side_offset, 0.0);
        viewport.clamp_inset(point, margin)
    }

    /// Offset of body segment `index` (of `len`) from the head at the given
    /// drawing progress. Left draws from the bottom point up over the left
    /// lobe, Right draws from the top dip down over the right lobe.
    pub fn curve_offset(self, index: usize, len: usize, progress: f32, params: &HeartConfig) -> Vec2 {
        let t = (index as f32 / (len - 1).max(1) as f32) * progress;
        let theta = match self {
            Side::Left => PI - t * PI,
            Side::Right => t * PI,
        };
        let curve = heart_curve(theta) * params.curve_scale;
        Vec2::new(self.sign() * (curve.x + params.lobe_offset), curve.y)
    }
}

/// Temporary look and goal layered over a chain while it is part of an episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartOverride {
    pub side: Side,
    pub color: String,
    pub target: Vec2,
    pub speed: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeartMember {
    pub chain: usize,
    pub side: Side,
    /// Motion captured on entry, written back verbatim on exit.
    pub saved: Motion,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeartEpisode {
    pub phase: HeartPhase,
    pub progress: f32,
    pub members: [HeartMember; 2],
    pub phase_entered_at_ms: f64,
}

impl HeartEpisode {
    pub fn new(members: [HeartMember; 2], now_ms: f64) -> Self {
        Self {
            phase: HeartPhase::Approach,
            progress: 0.0,
            members,
            phase_entered_at_ms: now_ms,
        }
    }

    pub fn enter(&mut self, phase: HeartPhase, now_ms: f64) {
        self.phase = phase;
        self.phase_entered_at_ms = now_ms;
    }

    pub fn involves(&self, chain: usize) -> bool {
        self.members.iter().any(|m| m.chain == chain)
    }

    /// Progress used for shaping: the body stays collapsed until forming starts.
    pub fn shape_progress(&self) -> f32 {
        match self.phase {
            HeartPhase::Form | HeartPhase::Hold => self.progress,
            _ => 0.0,
        }
    }
}

/// Fires once after `first_delay_ms` from the first observed tick, then
/// every `interval_ms`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeartTimer {
    next_at_ms: Option<f64>,
}

impl HeartTimer {
    pub fn new() -> Self {
        Self { next_at_ms: None }
    }

    pub fn next_at_ms(&self) -> Option<f64> {
        self.next_at_ms
    }

    pub fn poll(&mut self, now_ms: f64, params: &HeartConfig) -> bool {
        match self.next_at_ms {
            None => {
                self.next_at_ms = Some(now_ms + params.first_delay_ms);
                false
            }
            Some(at) if now_ms >= at => {
                let mut next = at + params.interval_ms;
                if next <= now_ms {
                    // Host stalled past a whole interval; do not burst.
                    next = now_ms + params.interval_ms;
                }
                self.next_at_ms = Some(next);
                true
            }
            Some(_) => false,
        }
    }
}

impl Default for HeartTimer {
    fn default() -> Self {
        Self::new()
    }
}
