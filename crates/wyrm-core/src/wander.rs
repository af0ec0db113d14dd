//! Autonomous target policies: the Lissajous orbit used by an idle single
//! chain, and waypoint steering used by every chain of a formation.

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::angle::{bearing, normalize_delta, unit};
use crate::config::{OrbitConfig, WanderConfig};
use crate::viewport::Viewport;

/// A formation chain's own locomotion state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    pub color: String,
    pub target: Vec2,
    pub speed: f32,
    pub heading: f32,
    pub wave_phase: f32,
}

impl Motion {
    /// Random spawn inside the inset rect for chain `color`. Returns the
    /// motion and the spawn point for the head.
    pub fn spawn<R: Rng + ?Sized>(
        rng: &mut R,
        color: String,
        viewport: Viewport,
        params: &WanderConfig,
    ) -> (Self, Vec2) {
        let start = random_inset_point(rng, viewport, params.spawn_inset);
        let target = random_inset_point(rng, viewport, params.spawn_inset);
        let motion = Self {
            color,
            target,
            speed: params.speed_min + rng.gen::<f32>() * params.speed_range,
            heading: rng.gen::<f32>() * TAU,
            wave_phase: rng.gen::<f32>() * TAU,
        };
        (motion, start)
    }

    /// Turn toward the current waypoint and integrate one tick of travel,
    /// returning the new (unclamped) head position.
    pub fn steer(
        &mut self,
        head: Vec2,
        chain_index: usize,
        now_ms: f64,
        params: &WanderConfig,
    ) -> Vec2 {
        let wanted = bearing(head, self.target);
        self.heading += normalize_delta(wanted - self.heading) * params.turn_rate;

        let ci = chain_index as f32;
        self.wave_phase += params.wave_phase_step + params.wave_phase_step_per_chain * ci;
        let wave_radius = params.wave_radius_base
            + params.wave_radius_swing
                * ((now_ms / params.wave_period_ms) as f32 + params.wave_chain_offset * ci).sin();

        head + unit(self.heading) * self.speed * params.speed_gain
            + unit(self.heading + FRAC_PI_2) * self.wave_phase.sin() * wave_radius * params.wave_gain
    }

    pub fn arrived(&self, head: Vec2, params: &WanderConfig) -> bool {
        head.distance(self.target) < params.arrival_radius
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaypointPick {
    pub point: Vec2,
    pub attempts: u32,
}

/// Pick the next waypoint: a random hop biased toward the viewport centre.
/// Candidates closer than `min_separation` are retried; the last one is
/// accepted once `max_attempts` is spent.
pub fn pick_waypoint<R: Rng + ?Sized>(
    rng: &mut R,
    head: Vec2,
    viewport: Viewport,
    margin: f32,
    params: &WanderConfig,
) -> WaypointPick {
    let center = viewport.center();
    let max_attempts = params.max_attempts.max(1);
    let mut attempts = 0;
    loop {
        attempts += 1;
        let angle = rng.gen::<f32>() * TAU;
        let hop = params.hop_min + rng.gen::<f32>() * params.hop_range;
        let jitter = Vec2::new(rng.gen::<f32>() - 0.5, rng.gen::<f32>() - 0.5) * params.jitter;
        let raw = head + unit(angle) * hop + (center - head) * params.center_bias + jitter;
        let point = viewport.clamp_inset(raw, margin);
        if head.distance(point) >= params.min_separation {
            return WaypointPick { point, attempts };
        }
        if attempts >= max_attempts {
            debug!(
                ?head,
                ?point,
                attempts,
                "no separated waypoint found, accepting short hop"
            );
            return WaypointPick { point, attempts };
        }
    }
}

/// Idle flight path for a lone chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitWander {
    pub phase: f32,
}

impl OrbitWander {
    pub fn new(phase: f32) -> Self {
        Self { phase }
    }

    pub fn next_target(&mut self, viewport: Viewport, params: &OrbitConfig) -> Vec2 {
        self.phase += params.phase_step;
        viewport.center()
            + Vec2::new(
                self.phase.cos() * viewport.width * params.radius_x_frac,
                (self.phase * params.y_frequency).sin() * viewport.height * params.radius_y_frac,
            )
    }
}

fn random_inset_point<R: Rng + ?Sized>(rng: &mut R, viewport: Viewport, inset: f32) -> Vec2 {
    let span = (viewport.size() - Vec2::splat(2.0 * inset)).max(Vec2::ZERO);
    let point = Vec2::new(rng.gen::<f32>() * span.x, rng.gen::<f32>() * span.y) + Vec2::splat(inset);
    point.min(viewport.size())
}
