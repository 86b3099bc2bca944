use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, HtmlElement, HtmlVideoElement, MouseEvent};

use crate::config::FxConfig;
use crate::error::{FxError, Result};
use crate::mascot::{glow_filter, Mascot};
use crate::math::Vec2;
use crate::signals::Signals;
use crate::theme::Theme;
use crate::wasm::dom::{self, Listener};
use crate::wasm::frame::Effect;
use crate::wasm::render::ChromaCompositor;

/// Drives the `#mascot` container: position, speech bubble, glow, and the
/// keyed video drawn inside it.
pub struct MascotEffect {
    mascot: Mascot,
    container: HtmlElement,
    bubble: Option<HtmlElement>,
    anchor_id: String,
    compositor: Option<ChromaCompositor>,
    /// Hidden until the intro (if any) hands over.
    visible: Rc<Cell<bool>>,
    shown: bool,
    pending_click: Rc<Cell<Option<f64>>>,
    theme: Option<Theme>,
    warned_anchor: bool,
    _click: Listener,
}

impl MascotEffect {
    pub fn mount(config: &FxConfig, visible: Rc<Cell<bool>>) -> Result<Self> {
        let dom_ids = &config.dom;
        let container: HtmlElement =
            dom::by_id(&dom_ids.mascot).ok_or_else(|| FxError::MissingElement(dom_ids.mascot.clone()))?;
        let bubble = dom::by_id::<HtmlElement>(&dom_ids.mascot_bubble);

        let compositor = match (
            dom::by_id::<HtmlCanvasElement>(&dom_ids.mascot_canvas),
            dom::by_id::<HtmlVideoElement>(&dom_ids.mascot_video),
        ) {
            (Some(canvas), Some(video)) => Some(ChromaCompositor::new(canvas, video, config.chroma)),
            _ => {
                log::warn!("mascot video or canvas missing; sprite stays blank");
                None
            }
        };

        let pending_click = Rc::new(Cell::new(None));
        let click = {
            let pending = pending_click.clone();
            Listener::new(&container, "click", move |e| {
                if let Some(e) = e.dyn_ref::<MouseEvent>() {
                    pending.set(Some(e.client_x() as f64));
                }
            })?
        };

        dom::set_style(&container, "position", "fixed");
        dom::set_style(&container, "left", "0");
        dom::set_style(&container, "top", "0");
        dom::set_style(&container, "will-change", "transform");
        let size = format!("{}px", config.mascot.size);
        dom::set_style(&container, "width", &size);
        dom::set_style(&container, "height", &size);
        if !visible.get() {
            // revealed on the first visible tick
            dom::set_style(&container, "opacity", "0");
        }

        Ok(Self {
            mascot: Mascot::new(config.mascot.clone(), dom::random_seed()),
            container,
            bubble,
            anchor_id: dom_ids.mascot_anchor.clone(),
            compositor,
            visible,
            shown: false,
            pending_click,
            theme: None,
            warned_anchor: false,
            _click: click,
        })
    }

    fn anchor(&mut self) -> Option<Vec2> {
        let anchor = dom::center_of(&self.anchor_id);
        if anchor.is_none() && !self.warned_anchor {
            log::warn!("anchor #{} not found; using fallback position", self.anchor_id);
            self.warned_anchor = true;
        }
        anchor
    }

    fn sync_bubble(&self) {
        let Some(bubble) = &self.bubble else {
            return;
        };
        match self.mascot.bubble() {
            Some(text) => {
                bubble.set_text_content(Some(text));
                dom::set_style(bubble, "opacity", "1");
            }
            None => dom::set_style(bubble, "opacity", "0"),
        }
    }
}

impl Effect for MascotEffect {
    fn tick(&mut self, dt: f64, signals: &Signals) {
        if !self.visible.get() {
            return;
        }
        if !self.shown {
            self.shown = true;
            dom::set_style(&self.container, "opacity", "1");
        }
        if self.theme != Some(signals.theme) {
            self.theme = Some(signals.theme);
            dom::set_style(&self.container, "filter", glow_filter(signals.theme));
        }
        if let Some(x) = self.pending_click.take() {
            self.mascot.on_click(x, signals.viewport);
        }

        let anchor = self.anchor();
        let frame = self.mascot.tick(dt, signals, anchor);
        let size = self.mascot.config().size;
        dom::set_style(&self.container, "transform", &frame.transform.to_css(Vec2::new(size, size)));
        if frame.bubble_changed {
            self.sync_bubble();
        }

        if let Some(compositor) = self.compositor.as_mut() {
            compositor.draw();
        }
    }

    fn teardown(&mut self) {
        if let Some(compositor) = self.compositor.as_mut() {
            compositor.release();
        }
    }
}
