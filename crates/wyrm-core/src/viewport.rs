use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Drawable area in logical pixels, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Lower and upper corner of the rect inset by `margin` on every side.
    ///
    /// On an axis shorter than `2 * margin` both bounds collapse onto the
    /// centre of that axis.
    pub fn inset_bounds(&self, margin: f32) -> (Vec2, Vec2) {
        let center = self.center();
        let lo = Vec2::splat(margin).min(center);
        let hi = (self.size() - Vec2::splat(margin)).max(center);
        (lo, hi)
    }

    pub fn clamp_inset(&self, point: Vec2, margin: f32) -> Vec2 {
        let (lo, hi) = self.inset_bounds(margin);
        point.clamp(lo, hi)
    }

    pub fn contains_inset(&self, point: Vec2, margin: f32) -> bool {
        let (lo, hi) = self.inset_bounds(margin);
        point.cmpge(lo).all() && point.cmple(hi).all()
    }
}
