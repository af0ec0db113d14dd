//! Top-level simulation state. The host feeds it input events and a clock,
//! asks for frames, and hands it a sink to draw into.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::config::{EngineConfig, ProfileKind};
use crate::driver::{DriverMode, PermissionOutcome};
use crate::error::{ConfigError, OrientationError};
use crate::formation::Formation;
use crate::input::InputEvent;
use crate::render::PoseSink;
use crate::scheduler::FrameGate;
use crate::snapshot::{ChainSnapshot, EngineSnapshot, HeartSnapshot};
use crate::solo::Solo;
use crate::viewport::Viewport;

#[derive(Debug)]
pub enum Scene {
    Solo(Solo),
    Formation(Formation),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resize {
    /// Same profile; positions are clamped into the new bounds on the next tick.
    Clamped,
    /// The profile changed and the scene was rebuilt from scratch.
    Reinitialized(ProfileKind),
}

#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    profile: ProfileKind,
    viewport: Viewport,
    scene: Scene,
    gate: FrameGate,
    rng: StdRng,
    frame: u64,
}

impl Engine {
    pub fn new(config: EngineConfig, viewport: Viewport) -> Result<Self, ConfigError> {
        let seed = config.seed.unwrap_or_else(rand::random);
        Self::with_seed(config, viewport, seed)
    }

    pub fn with_seed(config: EngineConfig, viewport: Viewport, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(seed);
        let profile = config.classify(viewport);
        let scene = build_scene(&config, profile, viewport, &mut rng);
        let gate = FrameGate::new(config.profile(profile).frame.fps_cap);
        info!(
            seed,
            ?profile,
            width = viewport.width,
            height = viewport.height,
            "engine started"
        );
        Ok(Self {
            config,
            profile,
            viewport,
            scene,
            gate,
            rng,
            frame: 0,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn profile(&self) -> ProfileKind {
        self.profile
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn frames(&self) -> u64 {
        self.frame
    }

    /// Route one input event. Only `Resized` produces a [`Resize`].
    pub fn handle(&mut self, event: &InputEvent, now_ms: f64) -> Option<Resize> {
        if let InputEvent::Resized(viewport) = event {
            return Some(self.resize(*viewport));
        }
        if let Scene::Solo(solo) = &mut self.scene {
            solo.handle(event, now_ms, self.viewport);
        }
        None
    }

    pub fn resize(&mut self, viewport: Viewport) -> Resize {
        self.viewport = viewport;
        let profile = self.config.classify(viewport);
        if profile == self.profile {
            return Resize::Clamped;
        }
        info!(from = ?self.profile, to = ?profile, "viewport crossed profile threshold, rebuilding");
        self.profile = profile;
        self.scene = build_scene(&self.config, profile, viewport, &mut self.rng);
        self.gate = FrameGate::new(self.config.profile(profile).frame.fps_cap);
        Resize::Reinitialized(profile)
    }

    /// Run one tick if the frame gate admits `now_ms`.
    pub fn frame(&mut self, now_ms: f64) -> bool {
        if !self.gate.admit(now_ms) {
            return false;
        }
        self.step(now_ms);
        true
    }

    /// Run one tick regardless of the frame cap.
    pub fn step(&mut self, now_ms: f64) {
        self.frame += 1;
        match &mut self.scene {
            Scene::Solo(solo) => {
                solo.tick(now_ms, self.viewport);
            }
            Scene::Formation(formation) => formation.tick(now_ms, self.viewport),
        }
    }

    pub fn render<S: PoseSink + ?Sized>(&self, sink: &mut S) {
        match &self.scene {
            Scene::Solo(solo) => solo.render(sink),
            Scene::Formation(formation) => formation.render(sink),
        }
    }

    pub fn driver_mode(&self) -> Option<DriverMode> {
        match &self.scene {
            Scene::Solo(solo) => Some(solo.driver().mode()),
            Scene::Formation(_) => None,
        }
    }

    pub fn request_orientation(&mut self) -> Result<(), OrientationError> {
        match &mut self.scene {
            Scene::Solo(solo) => solo.driver_mut().request_orientation(),
            Scene::Formation(_) => Err(OrientationError::Unavailable),
        }
    }

    pub fn resolve_orientation(&mut self, outcome: PermissionOutcome) -> Result<(), OrientationError> {
        match &mut self.scene {
            Scene::Solo(solo) => solo.driver_mut().resolve_orientation(outcome),
            Scene::Formation(_) => Err(OrientationError::Unavailable),
        }
    }

    pub fn disable_orientation(&mut self) {
        if let Scene::Solo(solo) = &mut self.scene {
            solo.driver_mut().disable_orientation();
        }
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        let (driver_mode, chains, heart) = match &self.scene {
            Scene::Solo(solo) => {
                let chain = ChainSnapshot {
                    color: solo.color().to_string(),
                    head: solo.chain().head(),
                    target: solo.driver().target(),
                    speed: None,
                    heart_side: None,
                    poses: solo.chain().poses().to_vec(),
                };
                (Some(solo.driver().mode()), vec![chain], None)
            }
            Scene::Formation(formation) => {
                let chains = formation
                    .dragons()
                    .iter()
                    .map(|dragon| ChainSnapshot {
                        color: dragon.color().to_string(),
                        head: dragon.chain().head(),
                        target: dragon.target(),
                        speed: Some(dragon.speed()),
                        heart_side: dragon.heart().map(|over| over.side),
                        poses: dragon.chain().poses().to_vec(),
                    })
                    .collect();
                let heart = formation.episode().map(|episode| HeartSnapshot {
                    phase: episode.phase,
                    progress: episode.progress,
                    left: episode.members[0].chain,
                    right: episode.members[1].chain,
                });
                (None, chains, heart)
            }
        };
        EngineSnapshot {
            frame: self.frame,
            profile: self.profile,
            viewport: self.viewport,
            driver_mode,
            chains,
            heart,
        }
    }
}

fn build_scene(config: &EngineConfig, profile: ProfileKind, viewport: Viewport, rng: &mut StdRng) -> Scene {
    let scene_rng = StdRng::seed_from_u64(rng.gen());
    let params = config.profile(profile).clone();
    match profile {
        ProfileKind::Compact => Scene::Solo(Solo::new(params, viewport, scene_rng)),
        ProfileKind::Full => Scene::Formation(Formation::new(params, viewport, scene_rng)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn picks_profile_from_viewport() {
        let small = Engine::with_seed(EngineConfig::default(), Viewport::new(390.0, 844.0), 1).unwrap();
        assert_eq!(small.profile(), ProfileKind::Compact);
        assert_eq!(small.driver_mode(), Some(DriverMode::Pointer));
        let large = Engine::with_seed(EngineConfig::default(), Viewport::new(1920.0, 1080.0), 1).unwrap();
        assert_eq!(large.profile(), ProfileKind::Full);
        assert_eq!(large.snapshot().chains.len(), 5);
    }

    #[test]
    fn rejects_invalid_config() {
        let mut config = EngineConfig::default();
        config.compact.chain.segments = 1;
        assert!(matches!(
            Engine::with_seed(config, Viewport::new(400.0, 400.0), 1),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn resize_across_threshold_rebuilds() {
        let mut engine = Engine::with_seed(EngineConfig::default(), Viewport::new(1920.0, 1080.0), 9).unwrap();
        assert_eq!(engine.resize(Viewport::new(1600.0, 1000.0)), Resize::Clamped);
        assert_eq!(
            engine.resize(Viewport::new(800.0, 1000.0)),
            Resize::Reinitialized(ProfileKind::Compact)
        );
        assert!(matches!(engine.scene(), Scene::Solo(_)));
        assert_eq!(
            engine.handle(&InputEvent::Resized(Viewport::new(1920.0, 1080.0)), 0.0),
            Some(Resize::Reinitialized(ProfileKind::Full))
        );
        assert_eq!(engine.profile(), ProfileKind::Full);
        assert_eq!(
            engine.handle(&InputEvent::Resized(Viewport::new(1920.0, 1000.0)), 0.0),
            Some(Resize::Clamped)
        );
        assert_eq!(engine.handle(&InputEvent::PointerMoved(Vec2::new(5.0, 5.0)), 0.0), None);
    }

    #[test]
    fn frame_respects_the_cap() {
        let mut engine = Engine::with_seed(EngineConfig::default(), Viewport::new(400.0, 800.0), 2).unwrap();
        assert!(engine.frame(0.0));
        assert!(!engine.frame(10.0));
        assert!(engine.frame(40.0));
        assert_eq!(engine.frames(), 2);
    }

    #[test]
    fn formation_rejects_orientation() {
        let mut engine = Engine::with_seed(EngineConfig::default(), Viewport::new(1920.0, 1080.0), 3).unwrap();
        assert_eq!(engine.request_orientation(), Err(OrientationError::Unavailable));
        engine.handle(&InputEvent::PointerMoved(Vec2::new(10.0, 10.0)), 0.0);
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let mut engine = Engine::with_seed(EngineConfig::default(), Viewport::new(400.0, 800.0), 4).unwrap();
        engine.step(0.0);
        let json = engine.snapshot().to_json().unwrap();
        assert!(json.contains("\"profile\":\"compact\""), "{json}");
        assert!(json.contains("\"driver_mode\":\"pointer\""), "{json}");
    }

    #[test]
    fn same_seed_same_flight() {
        let viewport = Viewport::new(1920.0, 1080.0);
        let mut a = Engine::with_seed(EngineConfig::default(), viewport, 77).unwrap();
        let mut b = Engine::with_seed(EngineConfig::default(), viewport, 77).unwrap();
        for i in 0..300 {
            a.step(i as f64 * 33.0);
            b.step(i as f64 * 33.0);
        }
        assert_eq!(a.snapshot(), b.snapshot());
    }
}
