use folio_fx::math::{Rect, Vec2};
use folio_fx::tilt::{Rotation, Tilt, TiltConfig};

const DT: f64 = 1.0 / 60.0;

fn card() -> Rect {
    Rect::new(100.0, 100.0, 200.0, 100.0)
}

#[test]
fn top_right_corner_tilts_toward_the_pointer() {
    let mut tilt = Tilt::new(TiltConfig::default());
    tilt.pointer_moved(Vec2::new(300.0, 100.0), card());
    assert_eq!(tilt.target(), Rotation { x: 10.0, y: 10.0 });

    tilt.pointer_moved(Vec2::new(200.0, 150.0), card());
    assert_eq!(tilt.target(), Rotation { x: 0.0, y: 0.0 });
}

#[test]
fn pointer_outside_the_card_is_clamped() {
    let mut tilt = Tilt::new(TiltConfig::default());
    tilt.pointer_moved(Vec2::new(-1000.0, 5000.0), card());
    assert_eq!(tilt.target(), Rotation { x: -10.0, y: -10.0 });
}

#[test]
fn eases_in_and_back_out() {
    let mut tilt = Tilt::new(TiltConfig::default());
    tilt.pointer_moved(Vec2::new(300.0, 200.0), card());
    let first = tilt.tick(DT);
    assert!(first.y > 0.0 && first.y < 10.0);
    for _ in 0..300 {
        tilt.tick(DT);
    }
    assert!((tilt.current().y - 10.0).abs() < 1e-3);

    tilt.pointer_left();
    for _ in 0..300 {
        tilt.tick(DT);
    }
    assert!(tilt.current().x.abs() < 1e-3);
    assert!(tilt.current().y.abs() < 1e-3);
    assert!(tilt.to_css().starts_with("perspective(1000px) rotateX("));
}

#[test]
fn degenerate_bounds_are_ignored() {
    let mut tilt = Tilt::new(TiltConfig::default());
    tilt.pointer_moved(Vec2::new(5.0, 5.0), Rect::new(0.0, 0.0, 0.0, 10.0));
    assert_eq!(tilt.target(), Rotation::default());
}
