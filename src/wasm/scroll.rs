//! Browser side of the virtual scroll engine: input listeners, native scroll
//! writes, and the reversible overrides that route smooth-scroll requests
//! through the engine.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use js_sys::{Function, Object, Reflect};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{Element, Event, TouchEvent, WheelEvent};

use crate::error::{FxError, Result};
use crate::scroll::{ScrollConfig, ScrollEngine, ScrollToOptions};
use crate::signals::{ScrollSignal, Signals, Subscribers};
use crate::wasm::dom::{self, Listener};
use crate::wasm::frame::Effect;

/// Nested scrollers carrying this attribute keep native wheel behaviour.
pub const PREVENT_ATTR: &str = "data-scroll-prevent";

const LINE_HEIGHT: f64 = 16.0;

/// A global function replaced for the lifetime of the patch. Restores the
/// captured original when released or dropped.
pub struct GlobalPatch {
    target: Object,
    key: &'static str,
    original: JsValue,
    active: bool,
    _handler: Closure<dyn FnMut(JsValue, JsValue)>,
}

impl GlobalPatch {
    fn install(
        target: &Object,
        key: &'static str,
        replacement: &JsValue,
        handler: Closure<dyn FnMut(JsValue, JsValue)>,
    ) -> Result<Self> {
        let original = Reflect::get(target, &key.into()).map_err(FxError::from_js)?;
        Reflect::set(target, &key.into(), replacement).map_err(FxError::from_js)?;
        Ok(Self {
            target: target.clone(),
            key,
            original,
            active: true,
            _handler: handler,
        })
    }

    pub fn original(&self) -> &JsValue {
        &self.original
    }

    pub fn release(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if Reflect::set(&self.target, &self.key.into(), &self.original).is_err() {
            log::error!("failed to restore {}", self.key);
        }
    }
}

impl Drop for GlobalPatch {
    fn drop(&mut self) {
        self.release();
    }
}

/// What `scroll_to` accepts from JS.
#[derive(Debug, Clone)]
pub enum ScrollTarget {
    Offset(f64),
    Top,
    Bottom,
    Selector(String),
    Element(Element),
}

impl ScrollTarget {
    /// A number, `"top"` / `"#"`, `"bottom"`, a CSS selector or an element.
    pub fn from_js(value: &JsValue) -> Option<Self> {
        if let Some(y) = value.as_f64() {
            return Some(ScrollTarget::Offset(y));
        }
        if let Some(s) = value.as_string() {
            return Some(match s.as_str() {
                "top" | "#" => ScrollTarget::Top,
                "bottom" => ScrollTarget::Bottom,
                _ => ScrollTarget::Selector(s),
            });
        }
        value.dyn_ref::<Element>().cloned().map(ScrollTarget::Element)
    }

    /// Document offset in pixels; `None` when a selector matches nothing.
    pub fn resolve(&self, limit: f64) -> Option<f64> {
        match self {
            ScrollTarget::Offset(y) => Some(*y),
            ScrollTarget::Top => Some(0.0),
            ScrollTarget::Bottom => Some(limit),
            ScrollTarget::Selector(selector) => {
                let el = dom::document().ok()?.query_selector(selector).ok()??;
                Some(element_offset(&el))
            }
            ScrollTarget::Element(el) => Some(element_offset(el)),
        }
    }
}

pub fn resolve_target(target: &JsValue, limit: f64) -> Option<f64> {
    ScrollTarget::from_js(target)?.resolve(limit)
}

fn element_offset(el: &Element) -> f64 {
    dom::rect_of(el).y + dom::scroll_y()
}

fn wants_smooth(options: &JsValue) -> bool {
    options.is_object()
        && Reflect::get(options, &"behavior".into())
            .ok()
            .and_then(|b| b.as_string())
            .is_some_and(|b| b == "smooth")
}

fn wheel_delta(e: &WheelEvent, page: f64) -> f64 {
    match e.delta_mode() {
        WheelEvent::DOM_DELTA_LINE => e.delta_y() * LINE_HEIGHT,
        WheelEvent::DOM_DELTA_PAGE => e.delta_y() * page,
        _ => e.delta_y(),
    }
}

fn inside_prevented(e: &Event) -> bool {
    e.target()
        .and_then(|t| t.dyn_into::<Element>().ok())
        .and_then(|el| el.closest(&format!("[{PREVENT_ATTR}]")).ok().flatten())
        .is_some()
}

/// Shared handle used by the exported API while the broadcaster itself
/// lives in the frame loop.
#[derive(Clone)]
pub struct ScrollControl {
    engine: Rc<RefCell<ScrollEngine>>,
    subscribers: Subscribers<ScrollSignal>,
}

impl ScrollControl {
    pub fn engine(&self) -> &Rc<RefCell<ScrollEngine>> {
        &self.engine
    }

    pub fn subscribers(&self) -> &Subscribers<ScrollSignal> {
        &self.subscribers
    }

    pub fn scroll_to(&self, target: &JsValue, options: ScrollToOptions) -> bool {
        let Ok(mut engine) = self.engine.try_borrow_mut() else {
            return false;
        };
        match resolve_target(target, engine.limit()) {
            Some(y) => {
                engine.scroll_to(y, options, dom::now_seconds());
                true
            }
            None => {
                log::warn!("scroll_to: unresolvable target {:?}", target);
                false
            }
        }
    }

    pub fn jump(&self, y: f64) {
        if let Ok(mut engine) = self.engine.try_borrow_mut() {
            engine.jump(y, dom::now_seconds());
        }
    }

    pub fn pause(&self) {
        if let Ok(mut engine) = self.engine.try_borrow_mut() {
            engine.pause();
        }
    }

    pub fn resume(&self) {
        if let Ok(mut engine) = self.engine.try_borrow_mut() {
            engine.resume();
        }
    }
}

pub struct ScrollBroadcaster {
    control: ScrollControl,
    shared: Rc<Cell<ScrollSignal>>,
    native_scroll_to: Function,
    listeners: Vec<Listener>,
    patches: Vec<GlobalPatch>,
}

impl ScrollBroadcaster {
    /// Installs unless the user prefers reduced motion, in which case the
    /// page keeps native scrolling and `None` is returned.
    pub fn install(config: ScrollConfig, shared: Rc<Cell<ScrollSignal>>) -> Result<Option<Self>> {
        Self::install_with(config, shared, dom::prefers_reduced_motion())
    }

    pub fn install_with(
        config: ScrollConfig,
        shared: Rc<Cell<ScrollSignal>>,
        reduced_motion: bool,
    ) -> Result<Option<Self>> {
        if reduced_motion {
            log::info!("reduced motion requested; keeping native scrolling");
            return Ok(None);
        }

        let window = dom::window()?;
        let document = dom::document()?;
        let native_scroll_to: Function = Reflect::get(&window, &"scrollTo".into())
            .map_err(FxError::from_js)?
            .dyn_into()
            .map_err(|_| FxError::Unsupported("window.scrollTo"))?;

        let mut engine = ScrollEngine::new(config, dom::scroll_limit());
        engine.jump(dom::scroll_y(), dom::now_seconds());
        shared.set(engine.signal());
        let control = ScrollControl {
            subscribers: engine.subscribers(),
            engine: Rc::new(RefCell::new(engine)),
        };

        let mut listeners = Vec::new();

        let wheel = {
            let engine = control.engine.clone();
            Listener::with_options(&window, "wheel", false, false, move |e| {
                if inside_prevented(&e) {
                    return;
                }
                let Some(wheel) = e.dyn_ref::<WheelEvent>() else {
                    return;
                };
                let Ok(mut engine) = engine.try_borrow_mut() else {
                    return;
                };
                let delta = wheel_delta(wheel, dom::viewport().height) * engine.config().wheel_multiplier;
                engine.input(delta, dom::now_seconds());
                e.prevent_default();
            })?
        };
        listeners.push(wheel);

        let last_touch = Rc::new(Cell::new(None::<f64>));
        let touch_start = {
            let last_touch = last_touch.clone();
            Listener::new(&window, "touchstart", move |e| {
                let y = e
                    .dyn_ref::<TouchEvent>()
                    .and_then(|t| t.touches().get(0))
                    .map(|t| t.client_y() as f64);
                last_touch.set(y);
            })?
        };
        listeners.push(touch_start);

        let touch_move = {
            let engine = control.engine.clone();
            let last_touch = last_touch.clone();
            Listener::with_options(&window, "touchmove", false, false, move |e| {
                if inside_prevented(&e) {
                    return;
                }
                let Some(y) = e
                    .dyn_ref::<TouchEvent>()
                    .and_then(|t| t.touches().get(0))
                    .map(|t| t.client_y() as f64)
                else {
                    return;
                };
                let prev = last_touch.replace(Some(y));
                let (Some(prev), Ok(mut engine)) = (prev, engine.try_borrow_mut()) else {
                    return;
                };
                let delta = (prev - y) * engine.config().touch_multiplier;
                engine.input(delta, dom::now_seconds());
                e.prevent_default();
            })?
        };
        listeners.push(touch_move);

        let native = {
            let engine = control.engine.clone();
            let shared = shared.clone();
            Listener::new(&window, "scroll", move |_| {
                if let Ok(mut engine) = engine.try_borrow_mut() {
                    engine.refresh_limit(dom::scroll_limit());
                    if let Some(signal) = engine.sync(dom::scroll_y(), dom::now_seconds()) {
                        shared.set(signal);
                    }
                }
            })?
        };
        listeners.push(native);

        let resize = {
            let engine = control.engine.clone();
            Listener::new(&window, "resize", move |_| {
                if let Ok(mut engine) = engine.try_borrow_mut() {
                    engine.set_limit(dom::scroll_limit());
                }
            })?
        };
        listeners.push(resize);

        let anchors = {
            let control = control.clone();
            Listener::with_options(&document, "click", true, false, move |e| {
                let link = e
                    .target()
                    .and_then(|t| t.dyn_into::<Element>().ok())
                    .and_then(|el| el.closest("a[href^='#']").ok().flatten());
                let Some(href) = link.and_then(|a| a.get_attribute("href")) else {
                    return;
                };
                if control.scroll_to(&JsValue::from_str(&href), ScrollToOptions::default()) {
                    e.prevent_default();
                }
            })?
        };
        listeners.push(anchors);

        let mut patches = Vec::new();
        patches.push(Self::patch_window_scroll_to(&control, &native_scroll_to)?);
        patches.push(Self::patch_scroll_into_view(&control)?);

        log::debug!("scroll broadcaster installed");
        Ok(Some(Self {
            control,
            shared,
            native_scroll_to,
            listeners,
            patches,
        }))
    }

    /// `window.scrollTo({ behavior: "smooth", top })` goes through the engine;
    /// everything else reaches the browser untouched.
    fn patch_window_scroll_to(control: &ScrollControl, native: &Function) -> Result<GlobalPatch> {
        let window = dom::window()?;
        let handler = {
            let control = control.clone();
            let native = native.clone();
            let window = window.clone();
            Closure::wrap(Box::new(move |a: JsValue, b: JsValue| {
                if wants_smooth(&a) {
                    let top = Reflect::get(&a, &"top".into())
                        .ok()
                        .and_then(|v| v.as_f64())
                        .unwrap_or_else(dom::scroll_y);
                    control.scroll_to(&JsValue::from_f64(top), ScrollToOptions::default());
                } else {
                    let result = if b.is_undefined() {
                        native.call1(&window, &a)
                    } else {
                        native.call2(&window, &a, &b)
                    };
                    if let Err(e) = result {
                        log::warn!("scrollTo failed: {:?}", e);
                    }
                }
            }) as Box<dyn FnMut(JsValue, JsValue)>)
        };
        let replacement: JsValue = handler.as_ref().clone();
        GlobalPatch::install(&window, "scrollTo", &replacement, handler)
    }

    /// `Element.prototype.scrollIntoView` needs the receiving element, so the
    /// replacement is a small JS shim forwarding `this` to the handler.
    fn patch_scroll_into_view(control: &ScrollControl) -> Result<GlobalPatch> {
        let window = dom::window()?;
        let element_ctor = Reflect::get(&window, &"Element".into()).map_err(FxError::from_js)?;
        let prototype: Object = Reflect::get(&element_ctor, &"prototype".into())
            .map_err(FxError::from_js)?
            .dyn_into()
            .map_err(|_| FxError::Unsupported("Element.prototype"))?;
        let native: Function = Reflect::get(&prototype, &"scrollIntoView".into())
            .map_err(FxError::from_js)?
            .dyn_into()
            .map_err(|_| FxError::Unsupported("scrollIntoView"))?;

        let handler = {
            let control = control.clone();
            Closure::wrap(Box::new(move |this: JsValue, arg: JsValue| {
                if wants_smooth(&arg) {
                    control.scroll_to(&this, ScrollToOptions::default());
                } else if let Err(e) = native.call1(&this, &arg) {
                    log::warn!("scrollIntoView failed: {:?}", e);
                }
            }) as Box<dyn FnMut(JsValue, JsValue)>)
        };
        let factory = Function::new_with_args(
            "route",
            "return function scrollIntoView(arg) { return route(this, arg); };",
        );
        let shim = factory
            .call1(&JsValue::NULL, handler.as_ref())
            .map_err(FxError::from_js)?;
        GlobalPatch::install(&prototype, "scrollIntoView", &shim, handler)
    }

    pub fn control(&self) -> ScrollControl {
        self.control.clone()
    }

    /// Restores every patched global and removes all listeners.
    pub fn uninstall(&mut self) {
        for patch in self.patches.iter_mut() {
            patch.release();
        }
        self.patches.clear();
        self.listeners.clear();
        log::debug!("scroll broadcaster removed");
    }
}

impl Effect for ScrollBroadcaster {
    fn tick(&mut self, _dt: f64, _signals: &Signals) {
        let Ok(mut engine) = self.control.engine.try_borrow_mut() else {
            return;
        };
        // late images, fonts and sections grow the page without a resize
        if engine.refresh_limit(dom::scroll_limit()) {
            log::debug!("scroll limit now {:.0}", engine.limit());
        }
        engine.tick(dom::now_seconds());
        let signal = engine.signal();
        drop(engine);

        self.shared.set(signal);
        if (signal.scroll - dom::scroll_y()).abs() >= 0.5 {
            let Ok(window) = dom::window() else {
                return;
            };
            let _ = self
                .native_scroll_to
                .call2(&window, &JsValue::from_f64(0.0), &JsValue::from_f64(signal.scroll));
        }
    }

    fn teardown(&mut self) {
        self.uninstall();
    }
}

impl Drop for ScrollBroadcaster {
    fn drop(&mut self) {
        self.uninstall();
    }
}

/// Publishes native scroll progress when the broadcaster is not installed,
/// so scroll-driven effects still follow the page.
pub struct NativeScroll {
    shared: Rc<Cell<ScrollSignal>>,
    last: f64,
}

impl NativeScroll {
    pub fn new(shared: Rc<Cell<ScrollSignal>>) -> Self {
        Self {
            shared,
            last: dom::scroll_y(),
        }
    }
}

impl Effect for NativeScroll {
    fn tick(&mut self, _dt: f64, _signals: &Signals) {
        let y = dom::scroll_y();
        let limit = dom::scroll_limit();
        let velocity = y - self.last;
        self.last = y;
        self.shared.set(ScrollSignal {
            scroll: y,
            limit,
            progress: if limit > 0.0 { (y / limit).clamp(0.0, 1.0) } else { 0.0 },
            velocity,
            direction: match velocity {
                v if v > 0.0 => crate::signals::Direction::Down,
                v if v < 0.0 => crate::signals::Direction::Up,
                _ => crate::signals::Direction::Idle,
            },
            is_scrolling: velocity != 0.0,
        });
    }
}
