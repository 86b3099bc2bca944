use std::cell::Cell;
use std::rc::Rc;

use js_sys::Function;
use wasm_bindgen::JsValue;
use web_sys::{HtmlCanvasElement, HtmlElement, HtmlVideoElement};

use crate::config::FxConfig;
use crate::error::{FxError, Result};
use crate::intro::{IntroPhase, IntroSequence};
use crate::math::Vec2;
use crate::signals::Signals;
use crate::wasm::dom::{self, Listener};
use crate::wasm::frame::Effect;
use crate::wasm::render::ChromaCompositor;

/// Plays the intro once, then flips `done` and calls the host's callback.
pub struct IntroEffect {
    sequence: IntroSequence,
    element: HtmlElement,
    target_id: String,
    compositor: Option<ChromaCompositor>,
    on_complete: Option<Function>,
    done: Rc<Cell<bool>>,
    resized: Rc<Cell<bool>>,
    _resize: Listener,
}

impl IntroEffect {
    pub fn mount(config: &FxConfig, on_complete: Option<Function>, done: Rc<Cell<bool>>) -> Result<Self> {
        let ids = &config.dom;
        let element: HtmlElement = dom::by_id(&ids.intro).ok_or_else(|| FxError::MissingElement(ids.intro.clone()))?;
        let compositor = match (
            dom::by_id::<HtmlCanvasElement>(&ids.intro_canvas),
            dom::by_id::<HtmlVideoElement>(&ids.intro_video),
        ) {
            (Some(canvas), Some(video)) => Some(ChromaCompositor::new(canvas, video, config.chroma)),
            _ => None,
        };

        let resized = Rc::new(Cell::new(false));
        let resize = {
            let resized = resized.clone();
            Listener::new(&dom::window()?, "resize", move |_| resized.set(true))?
        };

        dom::set_style(&element, "position", "fixed");
        dom::set_style(&element, "left", "0");
        dom::set_style(&element, "top", "0");
        dom::set_style(&element, "will-change", "transform, opacity");

        let sequence = IntroSequence::new(config.intro, dom::viewport(), dom::center_of(&ids.mascot_anchor));
        Ok(Self {
            sequence,
            element,
            target_id: ids.mascot_anchor.clone(),
            compositor,
            on_complete,
            done,
            resized,
            _resize: resize,
        })
    }

    fn size(&self) -> Vec2 {
        Vec2::new(self.element.offset_width() as f64, self.element.offset_height() as f64)
    }
}

impl Effect for IntroEffect {
    fn tick(&mut self, dt: f64, signals: &Signals) {
        if self.resized.replace(false) {
            self.sequence.relayout(signals.viewport, dom::center_of(&self.target_id));
        }

        let target_id = self.target_id.clone();
        let frame = self.sequence.tick(dt, move || dom::center_of(&target_id));
        dom::set_style(&self.element, "transform", &frame.transform.to_css(self.size()));
        dom::set_style(&self.element, "opacity", &format!("{:.3}", frame.opacity));

        if let Some(compositor) = self.compositor.as_mut() {
            compositor.draw();
        }

        if frame.completed {
            self.done.set(true);
            if let Some(callback) = self.on_complete.take() {
                if let Err(e) = callback.call0(&JsValue::NULL) {
                    log::warn!("intro completion callback threw: {:?}", e);
                }
            }
        }
    }

    fn teardown(&mut self) {
        if let Some(compositor) = self.compositor.as_mut() {
            compositor.release();
        }
    }

    fn finished(&self) -> bool {
        self.sequence.phase() == IntroPhase::Done
    }
}
