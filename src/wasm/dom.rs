//! Thin helpers over `web-sys`: lookups, geometry, owned event listeners and
//! the shared pointer position.

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{AddEventListenerOptions, Document, Element, Event, EventTarget, HtmlElement, MouseEvent, TouchEvent, Window};

use crate::error::{FxError, Result};
use crate::math::{Rect, Vec2};
use crate::signals::{Pointer, Viewport};

pub const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

pub fn window() -> Result<Window> {
    web_sys::window().ok_or(FxError::Unsupported("window"))
}

pub fn document() -> Result<Document> {
    window()?.document().ok_or(FxError::Unsupported("document"))
}

/// Element by id, cast to `T`. `None` when missing or of another type.
pub fn by_id<T: JsCast>(id: &str) -> Option<T> {
    document()
        .ok()?
        .get_element_by_id(id)?
        .dyn_into::<T>()
        .ok()
}

pub fn viewport() -> Viewport {
    let Ok(window) = window() else {
        return Viewport::default();
    };
    let w = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    let h = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    Viewport::new(w, h)
}

pub fn device_pixel_ratio() -> f64 {
    web_sys::window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0).max(1.0)
}

pub fn rect_of(el: &Element) -> Rect {
    let r = el.get_bounding_client_rect();
    Rect::new(r.left(), r.top(), r.width(), r.height())
}

/// Centre of the element with `id`, in viewport pixels.
pub fn center_of(id: &str) -> Option<Vec2> {
    by_id::<Element>(id).map(|el| rect_of(&el).center())
}

/// Seconds on the page's monotonic clock.
pub fn now_seconds() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now() / 1000.0)
        .unwrap_or(0.0)
}

pub fn random_seed() -> u64 {
    (js_sys::Math::random() * u64::MAX as f64) as u64
}

pub fn prefers_reduced_motion() -> bool {
    web_sys::window()
        .and_then(|w| w.match_media(REDUCED_MOTION_QUERY).ok().flatten())
        .map(|q| q.matches())
        .unwrap_or(false)
}

pub fn scroll_y() -> f64 {
    web_sys::window().and_then(|w| w.scroll_y().ok()).unwrap_or(0.0)
}

/// Maximum native scroll offset of the document.
pub fn scroll_limit() -> f64 {
    let Ok(document) = document() else {
        return 0.0;
    };
    let height = document
        .document_element()
        .map(|el| el.scroll_height() as f64)
        .unwrap_or(0.0);
    (height - viewport().height).max(0.0)
}

pub fn set_style(el: &HtmlElement, property: &str, value: &str) {
    if let Err(e) = el.style().set_property(property, value) {
        log::warn!("style {property} rejected: {:?}", e);
    }
}

/// An event listener that is removed again when dropped.
pub struct Listener {
    target: EventTarget,
    kind: &'static str,
    capture: bool,
    closure: Closure<dyn FnMut(Event)>,
}

impl Listener {
    pub fn new(
        target: &EventTarget,
        kind: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self> {
        Self::with_options(target, kind, false, true, handler)
    }

    /// `passive: false` allows the handler to call `prevent_default`.
    pub fn with_options(
        target: &EventTarget,
        kind: &'static str,
        capture: bool,
        passive: bool,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self> {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        let options = AddEventListenerOptions::new();
        options.set_capture(capture);
        options.set_passive(passive);
        target
            .add_event_listener_with_callback_and_add_event_listener_options(
                kind,
                closure.as_ref().unchecked_ref(),
                &options,
            )
            .map_err(FxError::from_js)?;
        Ok(Self {
            target: target.clone(),
            kind,
            capture,
            closure,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self.target.remove_event_listener_with_callback_and_bool(
            self.kind,
            self.closure.as_ref().unchecked_ref(),
            self.capture,
        );
    }
}

/// Window-wide pointer and touch position. Leaving the window or lifting the
/// finger resets it to "away".
pub struct PointerTracker {
    pointer: Rc<Cell<Pointer>>,
    _listeners: Vec<Listener>,
}

impl PointerTracker {
    pub fn install() -> Result<Self> {
        let window = window()?;
        let document = document()?;
        let pointer = Rc::new(Cell::new(Pointer::away()));

        let mouse = {
            let pointer = pointer.clone();
            Listener::new(&window, "mousemove", move |e| {
                if let Some(e) = e.dyn_ref::<MouseEvent>() {
                    pointer.set(Pointer::at(e.client_x() as f64, e.client_y() as f64));
                }
            })?
        };
        let touch = {
            let pointer = pointer.clone();
            Listener::new(&window, "touchmove", move |e| {
                let touch = e.dyn_ref::<TouchEvent>().and_then(|t| t.touches().get(0));
                if let Some(t) = touch {
                    pointer.set(Pointer::at(t.client_x() as f64, t.client_y() as f64));
                }
            })?
        };
        let touch_end = {
            let pointer = pointer.clone();
            Listener::new(&window, "touchend", move |_| pointer.set(Pointer::away()))?
        };
        let leave = {
            let pointer = pointer.clone();
            Listener::new(&document, "mouseleave", move |_| pointer.set(Pointer::away()))?
        };

        Ok(Self {
            pointer,
            _listeners: vec![mouse, touch, touch_end, leave],
        })
    }

    pub fn shared(&self) -> Rc<Cell<Pointer>> {
        self.pointer.clone()
    }
}
