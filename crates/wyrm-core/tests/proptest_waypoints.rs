use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use wyrm_core::config::WanderConfig;
use wyrm_core::wander::pick_waypoint;
use wyrm_core::{Vec2, Viewport};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn pick_is_separated_or_exhausted(
        seed in any::<u64>(),
        width in 60.0f32..2560.0,
        height in 60.0f32..1440.0,
        fx in 0.0f32..1.0,
        fy in 0.0f32..1.0,
    ) {
        let viewport = Viewport::new(width, height);
        let params = WanderConfig::default();
        let head = Vec2::new(fx * width, fy * height);
        let mut rng = StdRng::seed_from_u64(seed);
        let pick = pick_waypoint(&mut rng, head, viewport, 30.0, &params);
        prop_assert!(pick.attempts >= 1 && pick.attempts <= params.max_attempts);
        prop_assert!(
            head.distance(pick.point) >= params.min_separation || pick.attempts == params.max_attempts,
            "short hop {} after {} attempts", head.distance(pick.point), pick.attempts
        );
        prop_assert!(viewport.contains_inset(pick.point, 30.0));
    }
}
