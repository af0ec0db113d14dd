//! The compact scene: one chain steered by a [`HeadDriver`].

use std::f32::consts::TAU;

use glam::Vec2;
use rand::rngs::StdRng;
use rand::Rng;

use crate::chain::Chain;
use crate::config::ProfileConfig;
use crate::driver::HeadDriver;
use crate::input::InputEvent;
use crate::render::{emit_chain, PoseSink};
use crate::viewport::Viewport;

#[derive(Debug)]
pub struct Solo {
    params: ProfileConfig,
    chain: Chain,
    driver: HeadDriver,
    color: String,
}

impl Solo {
    pub fn new(params: ProfileConfig, viewport: Viewport, mut rng: StdRng) -> Self {
        let chain = Chain::new(params.chain.clone(), viewport.center());
        let driver = HeadDriver::new(viewport, rng.gen::<f32>() * TAU);
        let color = params.color_for(0);
        Self {
            params,
            chain,
            driver,
            color,
        }
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    pub fn driver(&self) -> &HeadDriver {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut HeadDriver {
        &mut self.driver
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn handle(&mut self, event: &InputEvent, now_ms: f64, viewport: Viewport) {
        let margin = self.params.chain.margin;
        match event {
            InputEvent::PointerMoved(point) => {
                self.driver.pointer_moved(*point, now_ms, viewport, margin)
            }
            InputEvent::TouchMoved(touches) => {
                self.driver.touch_moved(touches, now_ms, viewport, margin)
            }
            InputEvent::Orientation { gamma, beta } => {
                self.driver.orientation(*gamma, *beta, viewport, &self.params)
            }
            InputEvent::Resized(_) => {}
        }
    }

    pub fn tick(&mut self, now_ms: f64, viewport: Viewport) -> Vec2 {
        let target = self.driver.next_target(now_ms, viewport, &self.params);
        self.chain.advance(target, viewport);
        target
    }

    pub fn render<S: PoseSink + ?Sized>(&self, sink: &mut S) {
        emit_chain(sink, 0, &self.chain, &self.color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn follows_the_pointer() {
        let viewport = Viewport::new(400.0, 800.0);
        let mut solo = Solo::new(ProfileConfig::compact(), viewport, StdRng::seed_from_u64(1));
        let goal = Vec2::new(100.0, 650.0);
        let mut now = 0.0;
        for _ in 0..120 {
            now += 33.0;
            solo.handle(&InputEvent::PointerMoved(goal), now, viewport);
            solo.tick(now, viewport);
        }
        assert!(solo.chain().head().distance(goal) < 1.0);
    }

    #[test]
    fn orbits_when_left_alone() {
        let viewport = Viewport::new(400.0, 800.0);
        let mut solo = Solo::new(ProfileConfig::compact(), viewport, StdRng::seed_from_u64(1));
        let first = solo.tick(0.0, viewport);
        let second = solo.tick(33.0, viewport);
        assert_ne!(first, second);
    }

    #[test]
    fn renders_every_body_segment_in_its_color() {
        let viewport = Viewport::new(400.0, 800.0);
        let solo = Solo::new(ProfileConfig::compact(), viewport, StdRng::seed_from_u64(1));
        let mut strokes = Vec::new();
        solo.render(&mut |stroke: crate::render::SegmentStroke<'_>| {
            strokes.push((stroke.index, stroke.color.to_string()))
        });
        assert_eq!(strokes.len(), 13);
        assert_eq!(strokes[0], (1, "#09ff00".to_string()));
    }
}
