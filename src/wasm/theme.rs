use std::cell::Cell;
use std::rc::Rc;

use js_sys::Array;
use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{MutationObserver, MutationObserverInit, MutationRecord};

use crate::error::{FxError, Result};
use crate::signals::{Broadcast, Subscribers, SubscriptionId};
use crate::theme::Theme;
use crate::wasm::dom;

fn current_theme() -> Theme {
    dom::document()
        .ok()
        .and_then(|d| d.document_element())
        .map(|el| Theme::from_class_list(&el.class_name()))
        .unwrap_or_default()
}

/// Publishes the theme whenever the document element's `class` changes.
/// Listeners may subscribe, unsubscribe or read the theme while being
/// notified.
pub struct ThemeWatcher {
    current: Rc<Cell<Theme>>,
    subscribers: Subscribers<Theme>,
    observer: MutationObserver,
    _callback: Closure<dyn FnMut(Array, MutationObserver)>,
}

impl ThemeWatcher {
    pub fn install() -> Result<Self> {
        let root = dom::document()?
            .document_element()
            .ok_or(FxError::Unsupported("document element"))?;
        let mut signal = Broadcast::new(current_theme());
        let current = Rc::new(Cell::new(signal.get()));
        let subscribers = signal.subscribers();

        let callback = {
            let current = current.clone();
            Closure::wrap(Box::new(move |records: Array, _observer: MutationObserver| {
                let touched = records
                    .iter()
                    .filter_map(|r| r.dyn_into::<MutationRecord>().ok())
                    .any(|r| r.attribute_name().as_deref() == Some("class"));
                if !touched {
                    return;
                }
                let theme = current_theme();
                if signal.get() != theme {
                    log::debug!("theme -> {:?}", theme);
                    current.set(theme);
                    signal.publish(theme);
                }
            }) as Box<dyn FnMut(Array, MutationObserver)>)
        };

        let observer = MutationObserver::new(callback.as_ref().unchecked_ref()).map_err(FxError::from_js)?;
        let init = MutationObserverInit::new();
        init.set_attributes(true);
        js_sys::Reflect::set(&init, &"attributeFilter".into(), &Array::of1(&"class".into()))
            .map_err(FxError::from_js)?;
        observer
            .observe_with_options(&root, &init)
            .map_err(FxError::from_js)?;

        Ok(Self {
            current,
            subscribers,
            observer,
            _callback: callback,
        })
    }

    pub fn theme(&self) -> Theme {
        self.current.get()
    }

    pub fn subscribers(&self) -> Subscribers<Theme> {
        self.subscribers.clone()
    }

    pub fn subscribe(&self, listener: impl FnMut(&Theme) + 'static) -> SubscriptionId {
        self.subscribers.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }
}

impl Drop for ThemeWatcher {
    fn drop(&mut self) {
        self.observer.disconnect();
        self.subscribers.clear();
    }
}
