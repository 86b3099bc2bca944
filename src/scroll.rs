//! Virtual scroll: native input deltas feed an eased tween whose duration
//! follows how fast the user is scrolling. Every update is broadcast as a
//! `ScrollSignal`.

use serde::Deserialize;

use crate::error::{FxError, Result};
use crate::math::{ease_in_out_cubic, ease_out_expo, lerp};
use crate::signals::{Broadcast, Direction, ScrollSignal, Subscribers, SubscriptionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Easing {
    #[default]
    ExpoOut,
    Linear,
    CubicInOut,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::ExpoOut => ease_out_expo(t),
            Easing::Linear => t,
            Easing::CubicInOut => ease_in_out_cubic(t),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScrollConfig {
    /// Seconds; used when idle and for `scroll_to` without an override.
    pub default_duration: f64,
    pub fast_duration: f64,
    pub slow_duration: f64,
    /// Input speed (px/s) at or above which `fast_duration` applies.
    pub fast_velocity: f64,
    /// Input speed (px/s) at or below which `slow_duration` applies.
    pub slow_velocity: f64,
    /// Seconds without movement before `is_scrolling` turns false.
    pub scroll_end_delay: f64,
    pub wheel_multiplier: f64,
    pub touch_multiplier: f64,
    pub easing: Easing,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            default_duration: 1.2,
            fast_duration: 0.8,
            slow_duration: 2.4,
            fast_velocity: 3000.0,
            slow_velocity: 300.0,
            scroll_end_delay: 0.15,
            wheel_multiplier: 1.0,
            touch_multiplier: 1.5,
            easing: Easing::ExpoOut,
        }
    }
}

impl ScrollConfig {
    pub fn validate(&self) -> Result<()> {
        for (field, v) in [
            ("scroll.defaultDuration", self.default_duration),
            ("scroll.fastDuration", self.fast_duration),
            ("scroll.slowDuration", self.slow_duration),
        ] {
            if v <= 0.0 {
                return Err(FxError::invalid(field, "must be positive"));
            }
        }
        if self.fast_velocity <= self.slow_velocity {
            return Err(FxError::invalid(
                "scroll.fastVelocity",
                "must be greater than slowVelocity",
            ));
        }
        if self.scroll_end_delay < 0.0 {
            return Err(FxError::invalid("scroll.scrollEndDelay", "must not be negative"));
        }
        Ok(())
    }

    /// Settle time for input arriving at `speed` px/s.
    pub fn duration_for(&self, speed: f64) -> f64 {
        let t = ((speed - self.slow_velocity) / (self.fast_velocity - self.slow_velocity)).clamp(0.0, 1.0);
        lerp(self.slow_duration, self.fast_duration, t)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScrollToOptions {
    /// Added to the resolved target.
    pub offset: f64,
    pub duration: Option<f64>,
    pub easing: Option<Easing>,
    pub immediate: bool,
    /// Ignore user input until this animation finishes.
    pub lock: bool,
}

#[derive(Debug, Clone, Copy)]
struct Tween {
    from: f64,
    to: f64,
    start: f64,
    duration: f64,
    easing: Easing,
}

/// Gaps between input events longer than this start a new gesture.
const GESTURE_GAP: f64 = 0.25;

pub struct ScrollEngine {
    config: ScrollConfig,
    limit: f64,
    current: f64,
    target: f64,
    tween: Option<Tween>,
    duration: f64,
    paused: bool,
    locked: bool,
    velocity: f64,
    direction: Direction,
    is_scrolling: bool,
    last_motion: f64,
    last_input: Option<f64>,
    input_speed: f64,
    listeners: Broadcast<ScrollSignal>,
}

impl ScrollEngine {
    pub fn new(config: ScrollConfig, limit: f64) -> Self {
        Self {
            duration: config.default_duration,
            config,
            limit: limit.max(0.0),
            current: 0.0,
            target: 0.0,
            tween: None,
            paused: false,
            locked: false,
            velocity: 0.0,
            direction: Direction::Idle,
            is_scrolling: false,
            last_motion: 0.0,
            last_input: None,
            input_speed: 0.0,
            listeners: Broadcast::new(ScrollSignal::default()),
        }
    }

    pub fn config(&self) -> &ScrollConfig {
        &self.config
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn limit(&self) -> f64 {
        self.limit
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_animating(&self) -> bool {
        self.tween.is_some()
    }

    pub fn signal(&self) -> ScrollSignal {
        ScrollSignal {
            scroll: self.current,
            limit: self.limit,
            progress: if self.limit > 0.0 {
                (self.current / self.limit).clamp(0.0, 1.0)
            } else {
                0.0
            },
            velocity: self.velocity,
            direction: self.direction,
            is_scrolling: self.is_scrolling,
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&ScrollSignal) + 'static) -> SubscriptionId {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Handle that stays usable while the engine is borrowed for a tick.
    pub fn subscribers(&self) -> Subscribers<ScrollSignal> {
        self.listeners.subscribers()
    }

    fn emit(&mut self) -> ScrollSignal {
        let signal = self.signal();
        self.listeners.publish(signal);
        signal
    }

    fn clamp(&self, y: f64) -> f64 {
        y.clamp(0.0, self.limit)
    }

    fn start_tween(&mut self, to: f64, duration: f64, easing: Easing, now: f64) {
        self.target = to;
        self.tween = Some(Tween {
            from: self.current,
            to,
            start: now,
            duration: duration.max(f64::EPSILON),
            easing,
        });
    }

    /// New page height; keeps positions inside the scrollable range.
    pub fn set_limit(&mut self, limit: f64) {
        self.limit = limit.max(0.0);
        self.current = self.clamp(self.current);
        self.target = self.clamp(self.target);
        if let Some(tw) = self.tween.as_mut() {
            tw.to = tw.to.clamp(0.0, self.limit);
        }
    }

    /// Follows a page whose height changed after install. Returns whether
    /// the limit moved.
    pub fn refresh_limit(&mut self, limit: f64) -> bool {
        if (limit.max(0.0) - self.limit).abs() < 0.5 {
            return false;
        }
        self.set_limit(limit);
        true
    }

    /// Wheel or touch delta in pixels. Returns whether the input was taken.
    pub fn input(&mut self, delta: f64, now: f64) -> bool {
        if self.paused || self.locked || delta == 0.0 {
            return false;
        }
        match self.last_input {
            Some(prev) if now - prev < GESTURE_GAP && now > prev => {
                let speed = delta.abs() / (now - prev);
                self.input_speed = if self.input_speed > 0.0 {
                    (self.input_speed + speed) * 0.5
                } else {
                    speed
                };
                self.duration = self.config.duration_for(self.input_speed);
            }
            _ => self.input_speed = 0.0,
        }
        self.last_input = Some(now);

        let to = self.clamp(self.target + delta);
        self.start_tween(to, self.duration, self.config.easing, now);
        true
    }

    /// Animates to an absolute offset.
    pub fn scroll_to(&mut self, y: f64, options: ScrollToOptions, now: f64) {
        let to = self.clamp(y + options.offset);
        if options.immediate {
            self.jump(to, now);
            return;
        }
        let duration = options.duration.unwrap_or(self.config.default_duration);
        let easing = options.easing.unwrap_or(self.config.easing);
        self.locked = options.lock;
        self.start_tween(to, duration, easing, now);
        log::debug!("scroll_to {to:.0} over {duration:.2}s");
    }

    /// Relocates without animating.
    pub fn jump(&mut self, y: f64, now: f64) -> ScrollSignal {
        let to = self.clamp(y);
        self.tween = None;
        self.locked = false;
        self.move_to(to, now);
        self.target = to;
        self.emit()
    }

    /// Stops translating input into movement and freezes any tween in place.
    pub fn pause(&mut self) {
        self.paused = true;
        self.tween = None;
        self.locked = false;
        self.target = self.current;
    }

    pub fn resume(&mut self) {
        self.paused = false;
        self.last_input = None;
    }

    /// Adopts a native scroll position (scrollbar drag, keyboard, find-in-page)
    /// when the engine is not driving the page itself.
    pub fn sync(&mut self, native: f64, now: f64) -> Option<ScrollSignal> {
        if self.tween.is_some() || self.paused {
            return None;
        }
        let y = self.clamp(native);
        if (y - self.current).abs() < 0.5 {
            return None;
        }
        self.move_to(y, now);
        self.target = y;
        Some(self.emit())
    }

    fn move_to(&mut self, y: f64, now: f64) {
        let delta = y - self.current;
        self.current = y;
        self.velocity = delta;
        if delta != 0.0 {
            self.direction = if delta > 0.0 { Direction::Down } else { Direction::Up };
            self.is_scrolling = true;
            self.last_motion = now;
        }
    }

    /// Advances the tween to `now` (seconds). Returns the signal when it
    /// changed, including the single idle event after motion stops.
    pub fn tick(&mut self, now: f64) -> Option<ScrollSignal> {
        if let Some(tw) = self.tween {
            let t = ((now - tw.start) / tw.duration).clamp(0.0, 1.0);
            let y = if t >= 1.0 {
                self.tween = None;
                self.locked = false;
                tw.to
            } else {
                tw.from + (tw.to - tw.from) * tw.easing.apply(t)
            };
            if y != self.current {
                self.move_to(y, now);
                return Some(self.emit());
            }
        }

        if self.is_scrolling && self.tween.is_none() && now - self.last_motion >= self.config.scroll_end_delay {
            self.is_scrolling = false;
            self.velocity = 0.0;
            self.direction = Direction::Idle;
            self.duration = self.config.default_duration;
            self.input_speed = 0.0;
            return Some(self.emit());
        }
        None
    }
}
