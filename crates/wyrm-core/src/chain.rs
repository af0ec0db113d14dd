//! Follow-chain: a driven head and a body where every segment relaxes toward
//! its already-updated predecessor.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::angle::{bearing, unit};
use crate::config::ChainConfig;
use crate::viewport::Viewport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Head,
    Fin,
    Spine,
}

impl SegmentKind {
    /// Sprite for body segment `index`. Segment 1 carries the head sprite
    /// because segment 0 is the invisible driven point.
    pub fn for_index(index: usize, fins: &[usize]) -> Self {
        if index == 1 {
            SegmentKind::Head
        } else if fins.contains(&index) {
            SegmentKind::Fin
        } else {
            SegmentKind::Spine
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub index: usize,
    pub position: Vec2,
}

/// Per-segment render transform: translate to `anchor`, rotate by
/// `angle_deg`, scale uniformly by `scale`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct SegmentPose {
    pub anchor: Vec2,
    pub angle_deg: f32,
    pub scale: f32,
}

#[derive(Debug, Clone)]
pub struct Chain {
    params: ChainConfig,
    segments: Vec<Segment>,
    /// `poses[i - 1]` belongs to segment `i`.
    poses: Vec<SegmentPose>,
}

impl Chain {
    pub fn new(params: ChainConfig, start: Vec2) -> Self {
        let len = params.segments.max(2);
        let segments = (0..len)
            .map(|index| Segment {
                index,
                position: start,
            })
            .collect();
        Self {
            params,
            segments,
            poses: vec![SegmentPose::default(); len - 1],
        }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn params(&self) -> &ChainConfig {
        &self.params
    }

    pub fn head(&self) -> Vec2 {
        self.segments[0].position
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn kind(&self, index: usize) -> SegmentKind {
        SegmentKind::for_index(index, &self.params.fin_indices)
    }

    pub fn poses(&self) -> &[SegmentPose] {
        &self.poses
    }

    /// Poses as raw bytes, ready for an instance buffer upload.
    pub fn pose_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.poses)
    }

    pub fn advance(&mut self, head_target: Vec2, viewport: Viewport) {
        self.advance_with(head_target, self.params.head_smoothing, viewport);
    }

    /// Low-pass the head toward `head_target` with factor `k`, then relax.
    pub fn advance_with(&mut self, head_target: Vec2, k: f32, viewport: Viewport) {
        self.steer_head(head_target, k, viewport);
        self.relax(self.params.scale_factor);
    }

    /// Move and clamp the head only; the body is left for [`Chain::morph`].
    pub fn steer_head(&mut self, head_target: Vec2, k: f32, viewport: Viewport) {
        let head = self.segments[0].position;
        self.segments[0].position = head + (head_target - head) * k;
        self.clamp_head(viewport);
    }

    /// Put the head exactly at `head`, clamp it, then relax.
    pub fn advance_placed(&mut self, head: Vec2, viewport: Viewport) {
        self.segments[0].position = head;
        self.clamp_head(viewport);
        self.relax(self.params.scale_factor);
    }

    pub fn clamp_head(&mut self, viewport: Viewport) {
        let head = self.segments[0].position;
        self.segments[0].position = viewport.clamp_inset(head, self.params.margin);
    }

    fn relax(&mut self, scale_factor: f32) {
        let damping = self.params.damping;
        for i in 1..self.segments.len() {
            let prev = self.segments[i - 1].position;
            let current = self.segments[i].position;
            let a = bearing(prev, current);
            let spring_target = prev + unit(a) * self.params.taper(i);
            let next = current + (spring_target - current) / damping;
            self.segments[i].position = next;
            self.poses[i - 1] = SegmentPose {
                anchor: (prev + next) * 0.5,
                angle_deg: a.to_degrees(),
                scale: self.params.scale(i, scale_factor),
            };
        }
    }

    /// Assign every body segment to `head + offset(i)` directly, bypassing
    /// the spring. Poses anchor on the segment itself and face away from the
    /// head.
    pub fn morph(&mut self, offset: impl Fn(usize) -> Vec2, scale_factor: f32) {
        let head = self.segments[0].position;
        for i in 1..self.segments.len() {
            let position = head + offset(i);
            self.segments[i].position = position;
            self.poses[i - 1] = SegmentPose {
                anchor: position,
                angle_deg: bearing(head, position).to_degrees(),
                scale: self.params.scale(i, scale_factor),
            };
        }
    }
}
