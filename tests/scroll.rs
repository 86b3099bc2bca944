use std::cell::RefCell;
use std::rc::Rc;

use folio_fx::scroll::{Easing, ScrollConfig, ScrollEngine, ScrollToOptions};
use folio_fx::signals::{Direction, ScrollSignal};

const DT: f64 = 1.0 / 60.0;

fn engine(limit: f64) -> ScrollEngine {
    ScrollEngine::new(ScrollConfig::default(), limit)
}

/// Ticks from `from` to `until` seconds, returning every emitted signal with
/// its timestamp.
fn run(engine: &mut ScrollEngine, from: f64, until: f64) -> Vec<(f64, ScrollSignal)> {
    let mut out = Vec::new();
    let mut frame = 1;
    loop {
        let now = from + frame as f64 * DT;
        if now > until {
            break;
        }
        if let Some(s) = engine.tick(now) {
            out.push((now, s));
        }
        frame += 1;
    }
    out
}

#[test]
fn wheel_to_the_bottom_then_settle() {
    let mut engine = engine(4000.0);
    assert!(engine.input(4000.0, 0.0));
    let emitted = run(&mut engine, 0.0, 3.0);

    let (moving, idle): (Vec<_>, Vec<_>) = emitted.iter().partition(|(_, s)| s.is_scrolling);
    assert!(!moving.is_empty());
    for (_, s) in &moving {
        assert_eq!(s.direction, Direction::Down);
        assert!((s.progress - s.scroll / 4000.0).abs() < 1e-12);
        assert!(s.velocity > 0.0);
    }
    let (last_move, last) = moving[moving.len() - 1];
    assert_eq!(last.scroll, 4000.0);
    assert_eq!(last.progress, 1.0);

    // exactly one idle event, shortly after motion stops
    assert_eq!(idle.len(), 1);
    let (idle_at, settled) = idle[0];
    let delay = engine.config().scroll_end_delay;
    assert!(idle_at - last_move >= delay - 1e-9);
    assert!(idle_at - last_move <= delay + DT + 1e-9);
    assert_eq!(settled.direction, Direction::Idle);
    assert_eq!(settled.velocity, 0.0);
    assert_eq!(settled.progress, 1.0);
}

#[test]
fn progress_is_monotonic_while_scrolling_down() {
    let mut engine = engine(4000.0);
    engine.scroll_to(4000.0, ScrollToOptions::default(), 0.0);
    let mut last = 0.0;
    for (_, s) in run(&mut engine, 0.0, 2.0) {
        assert!(s.progress >= last);
        assert!((0.0..=1.0).contains(&s.progress));
        last = s.progress;
    }
    assert_eq!(last, 1.0);
}

#[test]
fn scrolling_up_reports_up() {
    let mut engine = engine(4000.0);
    engine.jump(3000.0, 0.0);
    engine.input(-500.0, 1.0);
    let emitted = run(&mut engine, 1.0, 1.5);
    assert!(emitted.iter().any(|(_, s)| s.direction == Direction::Up));
}

#[test]
fn targets_are_clamped_to_the_limit() {
    let mut engine = engine(1000.0);
    engine.input(5000.0, 0.0);
    assert_eq!(engine.target(), 1000.0);
    engine.input(-9000.0, 0.01);
    assert_eq!(engine.target(), 0.0);
}

#[test]
fn paused_engine_ignores_input() {
    let mut engine = engine(4000.0);
    engine.pause();
    assert!(engine.is_paused());
    assert!(!engine.input(300.0, 0.0));
    assert!(run(&mut engine, 0.0, 1.0).is_empty());
    assert_eq!(engine.current(), 0.0);

    engine.resume();
    assert!(engine.input(300.0, 1.0));
    run(&mut engine, 1.0, 4.0);
    assert_eq!(engine.current(), 300.0);
}

#[test]
fn pause_freezes_a_running_tween() {
    let mut engine = engine(4000.0);
    engine.scroll_to(2000.0, ScrollToOptions::default(), 0.0);
    run(&mut engine, 0.0, 0.2);
    engine.pause();
    let frozen = engine.current();
    assert!(frozen > 0.0 && frozen < 2000.0);
    run(&mut engine, 0.2, 2.0);
    assert_eq!(engine.current(), frozen);
}

#[test]
fn jump_moves_immediately_and_notifies() {
    let mut engine = engine(4000.0);
    let seen = Rc::new(RefCell::new(Vec::new()));
    {
        let seen = seen.clone();
        engine.subscribe(move |s| seen.borrow_mut().push(s.scroll));
    }
    let signal = engine.jump(1000.0, 0.0);
    assert_eq!(engine.current(), 1000.0);
    assert_eq!(signal.progress, 0.25);
    assert_eq!(*seen.borrow(), vec![1000.0]);
    assert!(!engine.is_animating());
}

#[test]
fn unsubscribed_listener_stops_hearing() {
    let mut engine = engine(4000.0);
    let count = Rc::new(RefCell::new(0));
    let id = {
        let count = count.clone();
        engine.subscribe(move |_| *count.borrow_mut() += 1)
    };
    engine.jump(10.0, 0.0);
    assert!(engine.unsubscribe(id));
    assert!(!engine.unsubscribe(id));
    engine.jump(20.0, 0.0);
    assert_eq!(*count.borrow(), 1);
}

#[test]
fn immediate_scroll_to_does_not_animate() {
    let mut engine = engine(4000.0);
    engine.scroll_to(
        500.0,
        ScrollToOptions {
            immediate: true,
            offset: -100.0,
            ..Default::default()
        },
        0.0,
    );
    assert_eq!(engine.current(), 400.0);
    assert!(!engine.is_animating());
}

#[test]
fn linear_easing_is_halfway_at_half_time() {
    let mut engine = engine(4000.0);
    engine.scroll_to(
        1000.0,
        ScrollToOptions {
            duration: Some(1.0),
            easing: Some(Easing::Linear),
            ..Default::default()
        },
        0.0,
    );
    engine.tick(0.5);
    assert!((engine.current() - 500.0).abs() < 1e-9);
}

#[test]
fn locked_animation_rejects_input_until_done() {
    let mut engine = engine(4000.0);
    engine.scroll_to(
        2000.0,
        ScrollToOptions {
            lock: true,
            duration: Some(1.0),
            ..Default::default()
        },
        0.0,
    );
    assert!(!engine.input(100.0, 0.1));
    run(&mut engine, 0.0, 1.1);
    assert!(engine.input(100.0, 1.2));
}

#[test]
fn fast_input_shortens_duration_and_idle_resets_it() {
    let mut engine = engine(100_000.0);
    let cfg = *engine.config();
    engine.input(100.0, 0.0);
    engine.input(100.0, 0.01);
    assert_eq!(engine.duration(), cfg.fast_duration);

    run(&mut engine, 0.01, 5.0);
    assert_eq!(engine.duration(), cfg.default_duration);

    engine.input(10.0, 6.0);
    engine.input(10.0, 6.2);
    assert_eq!(engine.duration(), cfg.slow_duration);
}

#[test]
fn native_scroll_is_adopted_only_when_idle() {
    let mut engine = engine(4000.0);
    engine.scroll_to(1000.0, ScrollToOptions::default(), 0.0);
    assert_eq!(engine.sync(300.0, 0.1), None);

    run(&mut engine, 0.0, 3.0);
    let adopted = engine.sync(300.0, 3.1).map(|s| s.scroll);
    assert_eq!(adopted, Some(300.0));
    assert_eq!(engine.target(), 300.0);
    assert_eq!(engine.sync(300.2, 3.2), None);
}

#[test]
fn shrinking_limit_clamps_position() {
    let mut engine = engine(4000.0);
    engine.jump(3000.0, 0.0);
    engine.set_limit(1000.0);
    assert_eq!(engine.current(), 1000.0);
    assert_eq!(engine.signal().progress, 1.0);
}

#[test]
fn page_growing_after_install_extends_the_range() {
    let mut engine = engine(1000.0);
    assert!(engine.refresh_limit(3000.0));
    assert!(!engine.refresh_limit(3000.2));
    assert_eq!(engine.limit(), 3000.0);

    let adopted = engine.sync(2500.0, 0.0);
    assert_eq!(adopted.map(|s| s.scroll), Some(2500.0));
    assert!((engine.signal().progress - 2500.0 / 3000.0).abs() < 1e-12);

    run(&mut engine, 0.0, 1.0);
    assert!(engine.input(2000.0, 1.0));
    assert_eq!(engine.target(), 3000.0);
    run(&mut engine, 1.0, 5.0);
    assert_eq!(engine.current(), 3000.0);
}

#[test]
fn listener_can_unsubscribe_from_inside_a_tick() {
    let mut engine = engine(4000.0);
    let subs = engine.subscribers();
    let own = Rc::new(std::cell::Cell::new(None));
    let calls = Rc::new(std::cell::Cell::new(0));
    let id = {
        let (own, calls) = (own.clone(), calls.clone());
        engine.subscribe(move |_| {
            calls.set(calls.get() + 1);
            if let Some(id) = own.get() {
                assert!(subs.unsubscribe(id));
            }
        })
    };
    own.set(Some(id));

    engine.input(500.0, 0.0);
    run(&mut engine, 0.0, 3.0);
    assert_eq!(calls.get(), 1);
    assert!(!engine.unsubscribe(id));
}
