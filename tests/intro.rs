use folio_fx::intro::{IntroConfig, IntroPhase, IntroSequence};
use folio_fx::layout::fallback_anchor;
use folio_fx::math::Vec2;
use folio_fx::signals::Viewport;

const DT: f64 = 0.01;

fn viewport() -> Viewport {
    Viewport::new(1000.0, 800.0)
}

#[test]
fn spins_in_the_centre_first() {
    let mut intro = IntroSequence::new(IntroConfig::default(), viewport(), Some(Vec2::new(700.0, 300.0)));
    let frame = intro.tick(0.5, || None);
    assert_eq!(intro.phase(), IntroPhase::Spin);
    assert_eq!(frame.transform.position, Vec2::new(500.0, 400.0));
    assert_eq!(frame.opacity, 1.0);
    assert!((frame.transform.rotation - 270.0).abs() < 1e-9);
    assert!(!frame.completed);
}

#[test]
fn completes_exactly_once_at_the_target() {
    let cfg = IntroConfig::default();
    let target = Vec2::new(700.0, 300.0);
    let mut intro = IntroSequence::new(cfg, viewport(), Some(target));

    let mut completions = 0;
    let mut completed_at = None;
    let mut elapsed = 0.0;
    let mut last_opacity = 1.0;
    while elapsed < 4.0 {
        let frame = intro.tick(DT, || Some(target));
        elapsed += DT;
        if intro.phase() == IntroPhase::Fly {
            assert!(frame.opacity <= last_opacity + 1e-12);
        }
        last_opacity = frame.opacity;
        if frame.completed {
            completions += 1;
            completed_at = Some(elapsed);
            assert!(frame.transform.position.distance(target) < 1e-9);
            assert!((frame.transform.scale - cfg.fly_scale).abs() < 1e-12);
            assert!(frame.opacity.abs() < 1e-12);
        }
    }

    assert_eq!(completions, 1);
    assert_eq!(intro.phase(), IntroPhase::Done);
    let at = completed_at.unwrap_or_default();
    assert!((at - cfg.total_duration).abs() <= DT + 1e-9, "completed at {at}");

    let after = intro.tick(DT, || Some(target));
    assert!(!after.completed);
    assert_eq!(after.opacity, 0.0);
}

#[test]
fn target_is_located_again_when_flying_starts() {
    let mut intro = IntroSequence::new(IntroConfig::default(), viewport(), Some(Vec2::new(700.0, 300.0)));
    let moved = Vec2::new(650.0, 320.0);
    let mut asked = 0;
    for _ in 0..200 {
        intro.tick(DT, || {
            asked += 1;
            Some(moved)
        });
    }
    assert_eq!(asked, 1);
    assert_eq!(intro.target(), moved);
}

#[test]
fn missing_target_falls_back() {
    let mut intro = IntroSequence::new(IntroConfig::default(), viewport(), None);
    assert_eq!(intro.target(), fallback_anchor(viewport()));
    for _ in 0..200 {
        intro.tick(DT, || None);
    }
    assert_eq!(intro.phase(), IntroPhase::Fly);
    assert_eq!(intro.target(), fallback_anchor(viewport()));
}

#[test]
fn relayout_only_applies_while_spinning() {
    let mut intro = IntroSequence::new(IntroConfig::default(), viewport(), Some(Vec2::new(700.0, 300.0)));
    let wide = Viewport::new(1600.0, 900.0);
    intro.relayout(wide, Some(Vec2::new(1200.0, 400.0)));
    assert_eq!(intro.center(), Vec2::new(800.0, 450.0));
    assert_eq!(intro.target(), Vec2::new(1200.0, 400.0));

    for _ in 0..200 {
        intro.tick(DT, || Some(Vec2::new(1100.0, 380.0)));
    }
    assert_eq!(intro.phase(), IntroPhase::Fly);
    intro.relayout(viewport(), Some(Vec2::new(10.0, 10.0)));
    assert_eq!(intro.center(), Vec2::new(800.0, 450.0));
    assert_eq!(intro.target(), Vec2::new(1100.0, 380.0));
}
