use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::chain::SegmentPose;
use crate::config::ProfileKind;
use crate::driver::DriverMode;
use crate::heart::{HeartPhase, Side};
use crate::viewport::Viewport;

/// Serialisable picture of the simulation for debug overlays and the
/// headless host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub frame: u64,
    pub profile: ProfileKind,
    pub viewport: Viewport,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_mode: Option<DriverMode>,
    pub chains: Vec<ChainSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart: Option<HeartSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainSnapshot {
    pub color: String,
    pub head: Vec2,
    pub target: Vec2,
    pub speed: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_side: Option<Side>,
    pub poses: Vec<SegmentPose>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartSnapshot {
    pub phase: HeartPhase,
    pub progress: f32,
    pub left: usize,
    pub right: usize,
}

impl EngineSnapshot {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
