#![cfg_attr(target_arch = "wasm32", allow(dead_code))]

//! Interactive decoration for a portfolio page: a chroma-keyed mascot that
//! dodges the cursor, a particle backdrop, a tilting profile card, inertial
//! scrolling and a short intro animation.
//!
//! The controllers are plain state machines ticked with `(dt, &Signals)` and
//! are tested on the host; the browser glue lives in [`wasm`].

pub mod chroma;
pub mod config;
pub mod error;
pub mod intro;
pub mod layout;
pub mod mascot;
pub mod math;
pub mod particles;
pub mod scroll;
pub mod signals;
pub mod theme;
pub mod tilt;

pub use config::FxConfig;
pub use error::FxError;

// Only compile wasm-specific code when targeting wasm32.

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use wasm_bindgen::prelude::*;

    use crate::config::FxConfig;

    pub mod app;
    pub mod dom;
    pub mod frame;
    pub mod intro;
    pub mod mascot;
    pub mod particles;
    pub mod render;
    pub mod scroll;
    pub mod theme;
    pub mod tilt;

    pub use app::FolioFx;

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        #[cfg(feature = "console_error_panic_hook")]
        console_error_panic_hook::set_once();

        let config = app::read_page_config();
        let level = config
            .as_ref()
            .map(|c| c.log_level)
            .unwrap_or_default()
            .to_level();
        console_log::init_with_level(level).ok();

        match config {
            Ok(_) => log::info!("folio_fx {} loaded", env!("CARGO_PKG_VERSION")),
            Err(e) => log::error!("page config rejected: {e}"),
        }
        Ok(())
    }

    /// Mounts every effect whose elements exist on the page, using the page's
    /// JSON config (or defaults).
    #[wasm_bindgen]
    pub fn mount(on_intro_complete: Option<js_sys::Function>) -> Result<FolioFx, JsValue> {
        let config: FxConfig = app::read_page_config()?;
        Ok(FolioFx::mount(config, on_intro_complete)?)
    }
}

// When compiling for non-wasm targets (e.g., `cargo test` on host),
// provide an empty stub so the crate still builds.
#[cfg(not(target_arch = "wasm32"))]
pub fn main() {}
