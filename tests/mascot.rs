use folio_fx::layout::fallback_anchor;
use folio_fx::mascot::{Mascot, MascotConfig};
use folio_fx::math::Vec2;
use folio_fx::signals::{Pointer, ScrollSignal, Signals, Viewport};

const DT: f64 = 1.0 / 60.0;

fn viewport() -> Viewport {
    Viewport::new(1280.0, 800.0)
}

fn signals(pointer: Pointer, progress: f64) -> Signals {
    Signals {
        pointer,
        scroll: ScrollSignal {
            progress,
            ..Default::default()
        },
        viewport: viewport(),
        ..Default::default()
    }
}

fn quiet() -> MascotConfig {
    MascotConfig {
        greeting_delay: 1e9,
        ..Default::default()
    }
}

#[test]
fn push_settles_to_exactly_zero_once_pointer_leaves() {
    let anchor = Vec2::new(500.0, 400.0);
    let mut mascot = Mascot::new(quiet(), 1);

    let near = signals(Pointer::at(520.0, 400.0), 0.0);
    for _ in 0..30 {
        mascot.tick(DT, &near, Some(anchor));
    }
    assert!(mascot.push().x < -1.0, "pushed away from the pointer: {:?}", mascot.push());

    let far = signals(Pointer::at(5000.0, 5000.0), 0.0);
    let mut last = mascot.push().length();
    let mut settled = None;
    for frame in 0..600 {
        mascot.tick(DT, &far, Some(anchor));
        let len = mascot.push().length();
        assert!(len <= last + 1e-12);
        last = len;
        if mascot.push() == Vec2::ZERO {
            settled = Some(frame);
            break;
        }
    }
    assert!(settled.is_some(), "push never settled: {:?}", mascot.push());
}

#[test]
fn push_never_exceeds_strength() {
    let cfg = quiet();
    let max = cfg.push_strength;
    let mut mascot = Mascot::new(cfg, 2);
    let s = signals(Pointer::at(501.0, 400.0), 0.0);
    for _ in 0..240 {
        mascot.tick(DT, &s, Some(Vec2::new(500.0, 400.0)));
        assert!(mascot.push().length() <= max + 1e-9);
    }
}

#[test]
fn click_flees_to_the_opposite_half() {
    let vp = Viewport::new(1000.0, 800.0);
    for seed in 0..50 {
        let mut mascot = Mascot::new(quiet(), seed);
        assert!(mascot.on_click(200.0, vp).x > 0.0);
        assert!(mascot.on_click(800.0, vp).x < 0.0);
        let v = mascot.on_click(100.0, vp).y;
        assert!(v.abs() <= mascot.config().flee_vertical);
    }
}

#[test]
fn flee_offset_decays_away() {
    let mut mascot = Mascot::new(quiet(), 3);
    mascot.on_click(100.0, viewport());
    let s = signals(Pointer::away(), 0.0);
    for _ in 0..600 {
        mascot.tick(DT, &s, None);
    }
    assert_eq!(mascot.flee(), Vec2::ZERO);
}

#[test]
fn scale_is_exact_at_both_ends_and_linear_between() {
    let cfg = quiet();
    let (hero, float) = (cfg.hero_scale, cfg.float_scale);
    let scale_at = |p: f64| {
        let mut mascot = Mascot::new(cfg.clone(), 4);
        mascot.tick(DT, &signals(Pointer::away(), p), None).transform.scale
    };
    assert_eq!(scale_at(0.0), hero);
    assert_eq!(scale_at(1.0), float);
    assert!((scale_at(0.25) - (hero + (float - hero) * 0.25)).abs() < 1e-12);
    // progress outside [0, 1] is clamped
    assert_eq!(scale_at(3.0), float);
}

#[test]
fn missing_anchor_uses_fallback_spot() {
    let mut mascot = Mascot::new(quiet(), 5);
    let frame = mascot.tick(DT, &signals(Pointer::away(), 0.0), None);
    let expected = fallback_anchor(viewport());
    assert!(frame.transform.position.distance(expected) < 1e-9);
}

#[test]
fn position_stays_inside_viewport() {
    let cfg = quiet();
    let half = cfg.size * cfg.hero_scale * 0.5;
    let margin = cfg.margin;
    let mut mascot = Mascot::new(cfg, 6);
    let frame = mascot.tick(DT, &signals(Pointer::away(), 0.0), Some(Vec2::new(-500.0, 5000.0)));
    let p = frame.transform.position;
    assert!(p.x >= margin + half - 1e-9);
    assert!(p.y <= 800.0 - margin - half + 1e-9);
}

#[test]
fn scroll_velocity_tilts_within_limit() {
    let cfg = quiet();
    let max = cfg.max_tilt;
    let mut mascot = Mascot::new(cfg, 7);
    let mut s = signals(Pointer::away(), 0.5);
    s.scroll.velocity = 1000.0;
    for _ in 0..600 {
        mascot.tick(DT, &s, None);
        assert!(mascot.tilt() >= -max);
    }
    assert!((mascot.tilt() + max).abs() < 0.01);
}

#[test]
fn greeting_shows_once_after_delay() {
    let cfg = MascotConfig::default();
    let greeting = cfg.greeting.clone();
    let mut mascot = Mascot::new(cfg, 8);
    let s = signals(Pointer::away(), 0.0);

    for _ in 0..10 {
        mascot.tick(0.1, &s, None);
    }
    assert_eq!(mascot.bubble(), None);

    let mut shown = 0;
    for _ in 0..10 {
        let before = mascot.bubble().is_some();
        let frame = mascot.tick(0.1, &s, None);
        if !before && mascot.bubble().is_some() {
            assert!(frame.bubble_changed);
            shown += 1;
        }
    }
    assert_eq!(shown, 1);
    assert_eq!(mascot.bubble(), Some(greeting.as_str()));

    for _ in 0..100 {
        mascot.tick(0.1, &s, None);
    }
    assert_eq!(mascot.bubble(), None);
}

#[test]
fn proximity_messages_respect_cooldown() {
    let cfg = quiet();
    let messages = cfg.messages.clone();
    let cooldown = cfg.bubble_cooldown;
    let mut mascot = Mascot::new(cfg, 9);
    let anchor = Vec2::new(500.0, 400.0);
    let near = signals(Pointer::at(520.0, 400.0), 0.0);

    let mut appeared = Vec::new();
    let mut t = 0.0;
    while t < cooldown * 2.0 - 0.5 {
        let before = mascot.bubble().is_some();
        mascot.tick(0.1, &near, Some(anchor));
        t += 0.1;
        if !before {
            if let Some(text) = mascot.bubble() {
                assert!(messages.iter().any(|m| m == text));
                appeared.push(t);
            }
        }
    }
    assert_eq!(appeared.len(), 2, "appeared at {appeared:?}");
    assert!(appeared[1] - appeared[0] >= cooldown - 1e-9);
}

#[test]
fn greeting_is_not_replaced_by_a_proximity_message() {
    let cfg = MascotConfig::default();
    let greeting = cfg.greeting.clone();
    let duration = cfg.bubble_duration;
    let mut mascot = Mascot::new(cfg, 10);
    let anchor = Vec2::new(500.0, 400.0);
    let away = signals(Pointer::away(), 0.0);
    let near = signals(Pointer::at(520.0, 400.0), 0.0);

    let mut waited = 0.0;
    while mascot.bubble().is_none() {
        mascot.tick(0.1, &away, Some(anchor));
        waited += 0.1;
        assert!(waited < 10.0, "greeting never appeared");
    }
    assert_eq!(mascot.bubble(), Some(greeting.as_str()));

    let mut held = 0.0;
    while mascot.bubble() == Some(greeting.as_str()) {
        mascot.tick(0.1, &near, Some(anchor));
        held += 0.1;
        assert!(held < 10.0, "greeting never expired");
    }
    assert!(held >= duration - 0.1 - 1e-9, "greeting held for {held}s");
    assert_eq!(mascot.bubble(), None);
}
