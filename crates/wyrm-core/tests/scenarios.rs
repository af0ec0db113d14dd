use wyrm_core::{Engine, EngineConfig, InputEvent, Scene, Vec2, Viewport};

const FRAME_MS: f64 = 1000.0 / 30.0;

#[test]
fn five_chains_stay_on_screen_for_a_thousand_ticks() {
    let viewport = Viewport::new(1920.0, 1080.0);
    let mut config = EngineConfig::default();
    config.full.chain.segments = 24;
    config.full.heart.first_delay_ms = 1_000.0;
    let margin = config.full.chain.margin;
    let mut engine = Engine::with_seed(config, viewport, 0x5eed).unwrap();

    for tick in 0..1000 {
        engine.step(tick as f64 * FRAME_MS);
        let Scene::Formation(formation) = engine.scene() else {
            panic!("expected the full profile");
        };
        assert_eq!(formation.dragons().len(), 5);
        for (d, dragon) in formation.dragons().iter().enumerate() {
            assert_eq!(dragon.chain().len(), 24);
            let head = dragon.chain().head();
            assert!(
                viewport.contains_inset(head, margin),
                "tick {tick}: chain {d} head {head} left the screen"
            );
        }
    }
}

#[test]
fn fixed_pointer_converges_without_oscillating() {
    let viewport = Viewport::new(600.0, 800.0);
    let mut engine = Engine::with_seed(EngineConfig::default(), viewport, 8).unwrap();
    let center = viewport.center();

    // Park the head in a corner first.
    let mut now = 0.0;
    for _ in 0..60 {
        now += FRAME_MS;
        engine.handle(&InputEvent::PointerMoved(Vec2::new(50.0, 50.0)), now);
        engine.step(now);
    }
    let head = engine.snapshot().chains[0].head;
    assert!(head.distance(center) > 300.0, "head never left the center: {head}");

    let mut converged_at = None;
    for tick in 0..500 {
        now += FRAME_MS;
        engine.handle(&InputEvent::PointerMoved(center), now);
        engine.step(now);
        let distance = engine.snapshot().chains[0].head.distance(center);
        match converged_at {
            None if distance < 1.0 => converged_at = Some(tick),
            Some(at) => assert!(distance < 1.0, "drifted to {distance} at tick {tick} after converging at {at}"),
            None => {}
        }
    }
    assert!(converged_at.is_some_and(|at| at < 200));
}

#[test]
fn touch_and_tilt_follow_the_permission_flow() {
    let viewport = Viewport::new(400.0, 800.0);
    let mut engine = Engine::with_seed(EngineConfig::default(), viewport, 12).unwrap();
    engine.handle(&InputEvent::TouchMoved(vec![Vec2::new(100.0, 100.0)]), 0.0);
    engine.step(0.0);
    assert_eq!(engine.snapshot().chains[0].target, Vec2::new(100.0, 100.0));

    engine.request_orientation().unwrap();
    // Tick loop keeps going in pointer mode while the prompt is open.
    engine.handle(&InputEvent::Orientation { gamma: Some(6.0), beta: Some(6.0) }, 10.0);
    engine.step(10.0);
    assert_eq!(engine.snapshot().chains[0].target, Vec2::new(100.0, 100.0));

    engine.resolve_orientation(wyrm_core::PermissionOutcome::Granted).unwrap();
    engine.handle(&InputEvent::Orientation { gamma: Some(6.0), beta: Some(6.0) }, 20.0);
    engine.step(20.0);
    let expected = viewport.center() + Vec2::new(6.0 * 400.0 / 30.0, 6.0 * 800.0 / 30.0);
    assert!((engine.snapshot().chains[0].target - expected).length() < 1e-3);
}
