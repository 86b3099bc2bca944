use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::window;

use crate::error::{FxError, Result};
use crate::signals::{Pointer, ScrollSignal, Signals};
use crate::theme::Theme;
use crate::wasm::dom;

/// Longest step handed to effects; a tab returning from the background
/// would otherwise produce a multi-second `dt`.
pub const MAX_DT: f64 = 0.1;

/// A per-frame driver attached to one element.
pub trait Effect {
    fn tick(&mut self, dt: f64, signals: &Signals);

    /// Removes listeners and releases resources.
    fn teardown(&mut self) {}

    /// Finished effects are torn down and dropped by the loop.
    fn finished(&self) -> bool {
        false
    }
}

/// The broadcast inputs effects read from. Each cell has a single writer.
#[derive(Clone, Default)]
pub struct SignalSources {
    pub pointer: Rc<Cell<Pointer>>,
    pub scroll: Rc<Cell<ScrollSignal>>,
    pub theme: Rc<Cell<Theme>>,
}

impl SignalSources {
    pub fn snapshot(&self, time: f64) -> Signals {
        Signals {
            pointer: self.pointer.get(),
            scroll: self.scroll.get(),
            viewport: dom::viewport(),
            theme: self.theme.get(),
            time,
        }
    }
}

type Effects = Rc<RefCell<Vec<Box<dyn Effect>>>>;

/// Owns the single recurring animation-frame callback and ticks every
/// registered effect in registration order.
pub struct FrameLoop {
    effects: Effects,
    callback: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>,
    handle: Rc<Cell<Option<i32>>>,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self {
            effects: Rc::new(RefCell::new(Vec::new())),
            callback: Rc::new(RefCell::new(None)),
            handle: Rc::new(Cell::new(None)),
        }
    }

    /// Effects added before `start` tick from the first frame.
    pub fn add(&self, effect: Box<dyn Effect>) {
        self.effects.borrow_mut().push(effect);
    }

    pub fn len(&self) -> usize {
        self.effects.borrow().len()
    }

    pub fn is_running(&self) -> bool {
        self.callback.borrow().is_some()
    }

    pub fn start(&self, sources: SignalSources) -> Result<()> {
        if self.is_running() {
            return Ok(());
        }

        // `f` holds the animation-frame closure so it can re-request itself.
        let f = self.callback.clone();
        let handle = self.handle.clone();
        let effects = self.effects.clone();
        let mut started: Option<f64> = None;
        let mut last: Option<f64> = None;

        *self.callback.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
            let start = *started.get_or_insert(ts);
            let dt = last.map(|l| ((ts - l) / 1000.0).clamp(0.0, MAX_DT)).unwrap_or(0.0);
            last = Some(ts);
            let time = (ts - start) / 1000.0;

            // taken out of the cell so effects and host callbacks may call
            // `add` or `stop` while ticking
            let mut running = std::mem::take(&mut *effects.borrow_mut());
            for effect in running.iter_mut() {
                let signals = sources.snapshot(time);
                effect.tick(dt, &signals);
            }
            running.retain_mut(|effect| {
                if effect.finished() {
                    effect.teardown();
                    false
                } else {
                    true
                }
            });

            if f.borrow().is_none() {
                // stopped during this frame
                for mut effect in running {
                    effect.teardown();
                }
                return;
            }
            {
                let mut slot = effects.borrow_mut();
                running.append(&mut *slot);
                *slot = running;
            }

            // schedule next
            let next = f
                .borrow()
                .as_ref()
                .and_then(|cb| window()?.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
            handle.set(next);
        }) as Box<dyn FnMut(f64)>));

        let id = {
            let callback = self.callback.borrow();
            let cb = callback.as_ref().ok_or(FxError::Unsupported("animation frame"))?;
            dom::window()?
                .request_animation_frame(cb.as_ref().unchecked_ref())
                .map_err(FxError::from_js)?
        };
        self.handle.set(Some(id));
        log::debug!("frame loop started with {} effects", self.len());
        Ok(())
    }

    /// Cancels the pending frame and tears every effect down.
    pub fn stop(&self) {
        if let Some(id) = self.handle.take() {
            if let Some(w) = window() {
                let _ = w.cancel_animation_frame(id);
            }
        }
        // dropping the closure breaks its reference cycle through `f`
        self.callback.borrow_mut().take();
        let stopped = std::mem::take(&mut *self.effects.borrow_mut());
        for mut effect in stopped {
            effect.teardown();
        }
    }
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.stop();
    }
}
