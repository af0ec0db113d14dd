//! Several wandering chains plus the heart choreography that borrows two of
//! them at a time.

use rand::rngs::StdRng;
use rand::seq::index::sample;
use tracing::{debug, info, warn};

use crate::chain::Chain;
use crate::config::ProfileConfig;
use crate::heart::{HeartEpisode, HeartMember, HeartOverride, HeartPhase, HeartTimer, Side};
use crate::render::{emit_chain, PoseSink};
use crate::viewport::Viewport;
use crate::wander::{pick_waypoint, Motion};

/// A formation chain: its body, its own motion, and the heart override
/// currently layered over that motion, if any.
#[derive(Debug, Clone)]
pub struct Dragon {
    chain: Chain,
    motion: Motion,
    heart: Option<HeartOverride>,
}

impl Dragon {
    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    /// The chain's own motion, untouched while an override is attached.
    pub fn motion(&self) -> &Motion {
        &self.motion
    }

    pub fn heart(&self) -> Option<&HeartOverride> {
        self.heart.as_ref()
    }

    pub fn color(&self) -> &str {
        match &self.heart {
            Some(over) => &over.color,
            None => &self.motion.color,
        }
    }

    pub fn target(&self) -> glam::Vec2 {
        self.heart.as_ref().map_or(self.motion.target, |over| over.target)
    }

    pub fn speed(&self) -> f32 {
        self.heart.as_ref().map_or(self.motion.speed, |over| over.speed)
    }
}

#[derive(Debug)]
pub struct Formation {
    params: ProfileConfig,
    dragons: Vec<Dragon>,
    episode: Option<HeartEpisode>,
    timer: HeartTimer,
    rng: StdRng,
    warned_too_few: bool,
}

impl Formation {
    pub fn new(params: ProfileConfig, viewport: Viewport, mut rng: StdRng) -> Self {
        let dragons = (0..params.chain_count)
            .map(|d| {
                let (motion, start) =
                    Motion::spawn(&mut rng, params.color_for(d), viewport, &params.wander);
                Dragon {
                    chain: Chain::new(params.chain.clone(), start),
                    motion,
                    heart: None,
                }
            })
            .collect::<Vec<_>>();
        info!(chains = dragons.len(), "formation created");
        Self {
            params,
            dragons,
            episode: None,
            timer: HeartTimer::new(),
            rng,
            warned_too_few: false,
        }
    }

    pub fn params(&self) -> &ProfileConfig {
        &self.params
    }

    pub fn dragons(&self) -> &[Dragon] {
        &self.dragons
    }

    pub fn episode(&self) -> Option<&HeartEpisode> {
        self.episode.as_ref()
    }

    pub fn heart_phase(&self) -> HeartPhase {
        self.episode.as_ref().map_or(HeartPhase::Idle, |e| e.phase)
    }

    pub fn tick(&mut self, now_ms: f64, viewport: Viewport) {
        if self.params.heart.enabled && self.timer.poll(now_ms, &self.params.heart) {
            self.start_heart(now_ms, viewport);
        }
        // Members sit out normal locomotion, including on the tick they are released.
        let busy = self.advance_heart(now_ms, viewport);

        let Formation {
            params,
            dragons,
            rng,
            ..
        } = self;
        let margin = params.chain.margin;
        for (d, dragon) in dragons.iter_mut().enumerate() {
            if busy.is_some_and(|members| members.contains(&d)) {
                continue;
            }
            let head = dragon.chain.head();
            let next = dragon.motion.steer(head, d, now_ms, &params.wander);
            if dragon.motion.arrived(next, &params.wander) {
                dragon.motion.target =
                    pick_waypoint(&mut *rng, next, viewport, margin, &params.wander).point;
            }
            dragon.chain.advance_placed(next, viewport);
        }
    }

    /// Begin a heart episode with two random chains, restoring any episode
    /// already in flight first. Returns false when there are too few chains.
    pub fn start_heart(&mut self, now_ms: f64, viewport: Viewport) -> bool {
        if self.dragons.len() < 2 {
            if !self.warned_too_few {
                warn!(chains = self.dragons.len(), "heart episode needs at least two chains");
                self.warned_too_few = true;
            }
            return false;
        }
        if self.episode.is_some() {
            debug!("heart episode cancelled by a new start");
            self.cancel_heart();
        }

        let picks = sample(&mut self.rng, self.dragons.len(), 2);
        let (left, right) = (picks.index(0), picks.index(1));
        let margin = self.params.chain.margin;
        let heart = &self.params.heart;
        let members = [(left, Side::Left), (right, Side::Right)].map(|(chain, side)| {
            let dragon = &mut self.dragons[chain];
            dragon.heart = Some(HeartOverride {
                side,
                color: heart.color.clone(),
                target: side.anchor(viewport, margin, heart),
                speed: heart.speed,
            });
            HeartMember {
                chain,
                side,
                saved: dragon.motion.clone(),
            }
        });
        self.episode = Some(HeartEpisode::new(members, now_ms));
        debug!(left, right, "heart episode started");
        true
    }

    /// Drop the current episode, writing back each member's saved motion.
    pub fn cancel_heart(&mut self) {
        let Some(episode) = self.episode.take() else {
            return;
        };
        for member in episode.members {
            self.dragons[member.chain].motion = member.saved;
        }
        for dragon in &mut self.dragons {
            dragon.heart = None;
        }
    }

    /// Step the active episode, returning the chains it occupied this tick.
    fn advance_heart(&mut self, now_ms: f64, viewport: Viewport) -> Option<[usize; 2]> {
        let Some(episode) = self.episode.as_mut() else {
            return None;
        };
        let members = [episode.members[0].chain, episode.members[1].chain];
        let heart = &self.params.heart;
        let margin = self.params.chain.margin;
        let previous = episode.phase;

        match episode.phase {
            HeartPhase::Approach => {
                let mut arrived = true;
                for member in &episode.members {
                    let dragon = &mut self.dragons[member.chain];
                    let anchor = member.side.anchor(viewport, margin, heart);
                    if let Some(over) = dragon.heart.as_mut() {
                        over.target = anchor;
                    }
                    dragon
                        .chain
                        .steer_head(anchor, heart.approach_smoothing, viewport);
                    let gap = (dragon.chain.head() - anchor).abs();
                    arrived &= gap.x < heart.arrival_tolerance && gap.y < heart.arrival_tolerance;
                }
                if arrived {
                    episode.progress = 0.0;
                    episode.enter(HeartPhase::Form, now_ms);
                }
            }
            HeartPhase::Form => {
                episode.progress += heart.progress_step;
                if episode.progress >= 1.0 {
                    episode.progress = 1.0;
                    episode.enter(HeartPhase::Hold, now_ms);
                }
            }
            HeartPhase::Hold => {
                if now_ms - episode.phase_entered_at_ms > heart.hold_ms {
                    episode.enter(HeartPhase::Release, now_ms);
                }
            }
            HeartPhase::Idle | HeartPhase::Release => {}
        }

        if episode.phase != previous {
            debug!(from = ?previous, to = ?episode.phase, "heart phase");
        }
        if episode.phase == HeartPhase::Release {
            self.cancel_heart();
            debug!("heart episode released");
            return Some(members);
        }

        let progress = episode.shape_progress();
        for member in &episode.members {
            let chain = &mut self.dragons[member.chain].chain;
            let len = chain.len();
            let side = member.side;
            chain.morph(
                |i| side.curve_offset(i, len, progress, heart),
                heart.scale_factor,
            );
        }
        Some(members)
    }

    pub fn render<S: PoseSink + ?Sized>(&self, sink: &mut S) {
        for (d, dragon) in self.dragons.iter().enumerate() {
            emit_chain(sink, d, &dragon.chain, dragon.color());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn formation(chains: usize) -> (Formation, Viewport) {
        let viewport = Viewport::new(1920.0, 1080.0);
        let params = ProfileConfig {
            chain_count: chains,
            ..ProfileConfig::full()
        };
        (Formation::new(params, viewport, StdRng::seed_from_u64(5)), viewport)
    }

    #[test]
    fn spawns_palette_colored_chains_in_bounds() {
        let (formation, viewport) = formation(5);
        assert_eq!(formation.dragons().len(), 5);
        assert_eq!(formation.dragons()[2].color(), "#2299ff");
        for dragon in formation.dragons() {
            assert!(viewport.contains_inset(dragon.chain().head(), 50.0));
        }
    }

    #[test]
    fn start_assigns_two_distinct_sides() {
        let (mut formation, viewport) = formation(5);
        assert!(formation.start_heart(0.0, viewport));
        let episode = formation.episode().unwrap();
        assert_ne!(episode.members[0].chain, episode.members[1].chain);
        assert_eq!(episode.members[0].side, Side::Left);
        assert_eq!(episode.members[1].side, Side::Right);
        let overridden = formation.dragons().iter().filter(|d| d.heart().is_some()).count();
        assert_eq!(overridden, 2);
        let member = &formation.dragons()[episode.members[0].chain];
        assert_eq!(member.color(), "#ff2222");
        assert_eq!(member.speed(), 6.0);
        assert_eq!(member.target(), glam::Vec2::new(870.0, 540.0));
    }

    #[test]
    fn single_chain_never_starts_a_heart() {
        let (mut formation, viewport) = formation(1);
        assert!(!formation.start_heart(0.0, viewport));
        assert_eq!(formation.heart_phase(), HeartPhase::Idle);
    }

    #[test]
    fn episode_runs_through_every_phase() {
        let (mut formation, viewport) = formation(3);
        formation.start_heart(0.0, viewport);
        let mut seen = vec![HeartPhase::Approach];
        let mut now = 0.0;
        for _ in 0..2000 {
            now += 33.0;
            formation.tick(now, viewport);
            let phase = formation.heart_phase();
            if seen.last() != Some(&phase) {
                seen.push(phase);
            }
            if phase == HeartPhase::Idle {
                break;
            }
        }
        assert_eq!(
            seen,
            vec![HeartPhase::Approach, HeartPhase::Form, HeartPhase::Hold, HeartPhase::Idle]
        );
        assert!(formation.dragons().iter().all(|d| d.heart().is_none()));
    }

    #[test]
    fn held_heart_is_drawn_around_the_center() {
        let (mut formation, viewport) = formation(2);
        formation.start_heart(0.0, viewport);
        let mut now = 0.0;
        while formation.heart_phase() != HeartPhase::Hold {
            now += 33.0;
            formation.tick(now, viewport);
            assert!(now < 60_000.0, "heart never formed");
        }
        let episode = formation.episode().unwrap();
        let left = formation.dragons()[episode.members[0].chain].chain();
        let bottom = left.segments()[1].position;
        // First body segment of the left half still sits near the bottom point.
        assert!((bottom.x - 960.0).abs() < 30.0, "{bottom}");
        assert!(bottom.y > 540.0);
    }
}
