use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use web_sys::{HtmlElement, MouseEvent};

use crate::error::{FxError, Result};
use crate::math::Vec2;
use crate::signals::Signals;
use crate::tilt::{Tilt, TiltConfig};
use crate::wasm::dom::{self, Listener};
use crate::wasm::frame::Effect;

pub struct TiltEffect {
    tilt: Rc<RefCell<Tilt>>,
    element: HtmlElement,
    _listeners: Vec<Listener>,
}

impl TiltEffect {
    pub fn mount(id: &str, config: TiltConfig) -> Result<Self> {
        let element: HtmlElement = dom::by_id(id).ok_or_else(|| FxError::MissingElement(id.to_owned()))?;
        let document = dom::document()?;
        let tilt = Rc::new(RefCell::new(Tilt::new(config)));

        let moved = {
            let tilt = tilt.clone();
            let element = element.clone();
            Listener::new(&document, "mousemove", move |e| {
                let Some(e) = e.dyn_ref::<MouseEvent>() else {
                    return;
                };
                let pointer = Vec2::new(e.client_x() as f64, e.client_y() as f64);
                if let Ok(mut tilt) = tilt.try_borrow_mut() {
                    tilt.pointer_moved(pointer, dom::rect_of(&element));
                }
            })?
        };
        let left = {
            let tilt = tilt.clone();
            Listener::new(&document, "mouseleave", move |_| {
                if let Ok(mut tilt) = tilt.try_borrow_mut() {
                    tilt.pointer_left();
                }
            })?
        };

        dom::set_style(&element, "will-change", "transform");
        Ok(Self {
            tilt,
            element,
            _listeners: vec![moved, left],
        })
    }
}

impl Effect for TiltEffect {
    fn tick(&mut self, dt: f64, _signals: &Signals) {
        let Ok(mut tilt) = self.tilt.try_borrow_mut() else {
            return;
        };
        tilt.tick(dt);
        dom::set_style(&self.element, "transform", &tilt.to_css());
    }
}
