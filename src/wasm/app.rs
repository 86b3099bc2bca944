use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use js_sys::{Function, Object, Reflect, JSON};
use wasm_bindgen::prelude::*;

use crate::config::{FxConfig, CONFIG_ELEMENT_ID};
use crate::error::{FxError, Result};
use crate::scroll::ScrollToOptions;
use crate::signals::{ScrollSignal, SubscriptionId};
use crate::theme::Theme;
use crate::wasm::dom::{self, PointerTracker};
use crate::wasm::frame::{FrameLoop, SignalSources};
use crate::wasm::intro::IntroEffect;
use crate::wasm::mascot::MascotEffect;
use crate::wasm::particles::ParticleEffect;
use crate::wasm::scroll::{NativeScroll, ScrollBroadcaster, ScrollControl};
use crate::wasm::theme::ThemeWatcher;
use crate::wasm::tilt::TiltEffect;

/// Reads the page's JSON config element; defaults when there is none.
pub fn read_page_config() -> Result<FxConfig> {
    let text = dom::document()?
        .get_element_by_id(CONFIG_ELEMENT_ID)
        .and_then(|el| el.text_content());
    match text {
        Some(json) if !json.trim().is_empty() => FxConfig::from_json(&json),
        _ => Ok(FxConfig::default()),
    }
}

fn signal_to_js(signal: &ScrollSignal) -> JsValue {
    let obj = Object::new();
    let set = |key: &str, value: JsValue| {
        let _ = Reflect::set(&obj, &key.into(), &value);
    };
    set("scroll", signal.scroll.into());
    set("limit", signal.limit.into());
    set("progress", signal.progress.into());
    set("velocity", signal.velocity.into());
    set("direction", signal.direction.as_str().into());
    set("isScrolling", signal.is_scrolling.into());
    obj.into()
}

fn parse_options(options: &JsValue) -> Result<ScrollToOptions> {
    if options.is_undefined() || options.is_null() {
        return Ok(ScrollToOptions::default());
    }
    let json: String = JSON::stringify(options)
        .map_err(FxError::from_js)?
        .into();
    Ok(serde_json::from_str(&json)?)
}

/// Handle to the mounted effects. Dropping it (or calling `destroy`) stops
/// the frame loop, removes every listener and restores patched globals.
#[wasm_bindgen]
pub struct FolioFx {
    frame: FrameLoop,
    scroll: Option<ScrollControl>,
    theme: Option<ThemeWatcher>,
    pointer: Option<PointerTracker>,
    scroll_subs: HashMap<u32, SubscriptionId>,
    theme_subs: HashMap<u32, SubscriptionId>,
    next_sub: u32,
}

impl FolioFx {
    pub fn mount(config: FxConfig, on_intro_complete: Option<Function>) -> Result<Self> {
        let pointer = PointerTracker::install()?;
        let theme = ThemeWatcher::install()?;
        let sources = SignalSources {
            pointer: pointer.shared(),
            scroll: Rc::new(Cell::new(ScrollSignal::default())),
            theme: Rc::new(Cell::new(theme.theme())),
        };
        {
            let cell = sources.theme.clone();
            theme.subscribe(move |t: &Theme| cell.set(*t));
        }

        let frame = FrameLoop::new();

        // scroll first so every other effect sees this frame's progress
        let scroll = match ScrollBroadcaster::install(config.scroll, sources.scroll.clone())? {
            Some(broadcaster) => {
                let control = broadcaster.control();
                frame.add(Box::new(broadcaster));
                Some(control)
            }
            None => {
                frame.add(Box::new(NativeScroll::new(sources.scroll.clone())));
                None
            }
        };

        let mascot_visible = Rc::new(Cell::new(!config.intro_enabled));
        if config.intro_enabled {
            match IntroEffect::mount(&config, on_intro_complete, mascot_visible.clone()) {
                Ok(intro) => frame.add(Box::new(intro)),
                Err(e) => {
                    log::warn!("intro skipped: {e}");
                    mascot_visible.set(true);
                }
            }
        }

        match ParticleEffect::mount(&config.dom.particle_canvas, config.particles.clone(), theme.theme()) {
            Ok(particles) => frame.add(Box::new(particles)),
            Err(e) => log::warn!("particle field skipped: {e}"),
        }
        match TiltEffect::mount(&config.dom.tilt_target, config.tilt) {
            Ok(tilt) => frame.add(Box::new(tilt)),
            Err(e) => log::warn!("tilt skipped: {e}"),
        }
        match MascotEffect::mount(&config, mascot_visible) {
            Ok(mascot) => frame.add(Box::new(mascot)),
            Err(e) => log::warn!("mascot skipped: {e}"),
        }

        frame.start(sources)?;
        log::info!("mounted {} effects", frame.len());

        Ok(Self {
            frame,
            scroll,
            theme: Some(theme),
            pointer: Some(pointer),
            scroll_subs: HashMap::new(),
            theme_subs: HashMap::new(),
            next_sub: 0,
        })
    }

    pub fn is_destroyed(&self) -> bool {
        self.theme.is_none() && self.pointer.is_none() && !self.frame.is_running()
    }

    fn next_id(&mut self) -> u32 {
        self.next_sub += 1;
        self.next_sub
    }
}

#[wasm_bindgen]
impl FolioFx {
    /// `target`: number, `"top"`, `"bottom"`, selector or element.
    /// `options`: `{ offset, duration, easing, immediate, lock }`.
    #[wasm_bindgen(js_name = scrollTo)]
    pub fn scroll_to(&self, target: JsValue, options: JsValue) -> std::result::Result<bool, JsValue> {
        let options = parse_options(&options)?;
        Ok(self
            .scroll
            .as_ref()
            .is_some_and(|s| s.scroll_to(&target, options)))
    }

    pub fn jump(&self, y: f64) {
        match &self.scroll {
            Some(s) => s.jump(y),
            None => {
                if let Ok(w) = dom::window() {
                    w.scroll_to_with_x_and_y(0.0, y);
                }
            }
        }
    }

    pub fn pause(&self) {
        if let Some(s) = &self.scroll {
            s.pause();
        }
    }

    pub fn resume(&self) {
        if let Some(s) = &self.scroll {
            s.resume();
        }
    }

    /// Calls `callback({ scroll, limit, progress, velocity, direction,
    /// isScrolling })` on every virtual scroll update. Returns 0 when
    /// virtual scrolling is off.
    #[wasm_bindgen(js_name = onScroll)]
    pub fn on_scroll(&mut self, callback: Function) -> u32 {
        let Some(scroll) = &self.scroll else {
            return 0;
        };
        let sub = scroll.subscribers().subscribe(move |s| {
            let _ = callback.call1(&JsValue::NULL, &signal_to_js(s));
        });
        let id = self.next_id();
        self.scroll_subs.insert(id, sub);
        id
    }

    #[wasm_bindgen(js_name = offScroll)]
    pub fn off_scroll(&mut self, id: u32) -> bool {
        let (Some(sub), Some(scroll)) = (self.scroll_subs.get(&id), &self.scroll) else {
            return false;
        };
        let removed = scroll.subscribers().unsubscribe(*sub);
        if removed {
            self.scroll_subs.remove(&id);
        }
        removed
    }

    /// Calls `callback(isDark)` whenever the document theme flips.
    #[wasm_bindgen(js_name = onTheme)]
    pub fn on_theme(&mut self, callback: Function) -> u32 {
        let Some(theme) = &self.theme else {
            return 0;
        };
        let sub = theme.subscribe(move |t: &Theme| {
            let _ = callback.call1(&JsValue::NULL, &JsValue::from_bool(t.is_dark()));
        });
        let id = self.next_id();
        self.theme_subs.insert(id, sub);
        id
    }

    #[wasm_bindgen(js_name = offTheme)]
    pub fn off_theme(&mut self, id: u32) -> bool {
        let Some(theme) = &self.theme else {
            return false;
        };
        let removed = self
            .theme_subs
            .get(&id)
            .is_some_and(|sub| theme.unsubscribe(*sub));
        if removed {
            self.theme_subs.remove(&id);
        }
        removed
    }

    /// Stops every effect and removes all listeners and observers. Later
    /// calls on the handle are no-ops.
    pub fn destroy(&mut self) {
        self.frame.stop();
        self.pointer = None;
        self.theme = None;
        self.scroll = None;
        self.scroll_subs.clear();
        self.theme_subs.clear();
    }
}
