#![forbid(unsafe_code)]
//! Browser host for the accessibility preference overlay.
//!
//! Mounting renders the launcher and panel, restores saved preferences onto
//! `<html>` and installs document listeners. Pages configure the widget by
//! setting `window.A11yWidgetConfig` (an object or a JSON string) before the
//! module loads.
use std::cell::RefCell;

use ally_engine::OverlayConfig;
use wasm_bindgen::prelude::*;

pub mod a11y;
pub mod dialog;
pub mod dom;
pub mod element;
pub mod error;
pub mod logging;
pub mod render;
pub mod speech;
pub mod storage;
pub mod widget;

pub use error::WebError;
pub use widget::{SharedWidget, Widget, mount};

use crate::error::JsResultExt;

/// Global the page sets to configure the widget.
pub const CONFIG_GLOBAL: &str = "A11yWidgetConfig";

thread_local! {
    static WIDGET: RefCell<Option<SharedWidget>> = const { RefCell::new(None) };
}

fn with_widget<R>(f: impl FnOnce(&mut Widget) -> R) -> Option<R> {
    let shared = WIDGET.with(|slot| slot.borrow().clone())?;
    let Ok(mut widget) = shared.try_borrow_mut() else {
        log::debug!("widget busy; call ignored");
        return None;
    };
    Some(f(&mut widget))
}

/// Open the panel. Returns whether it is open.
#[wasm_bindgen(js_name = open)]
pub fn open_panel() -> bool {
    with_widget(Widget::open).unwrap_or(false)
}

#[wasm_bindgen(js_name = close)]
pub fn close_panel() -> bool {
    with_widget(Widget::close).unwrap_or(false)
}

#[wasm_bindgen(js_name = toggle)]
pub fn toggle_panel() -> bool {
    with_widget(Widget::toggle).unwrap_or(false)
}

/// Clear every stored preference and return the page to defaults.
#[wasm_bindgen(js_name = reset)]
pub fn reset_preferences() {
    with_widget(Widget::reset);
}

/// Read `window.A11yWidgetConfig`, falling back to defaults when unset.
///
/// # Errors
///
/// Returns an error if the value is present but is not a valid config.
pub fn read_config() -> Result<OverlayConfig, WebError> {
    let window = dom::window()?;
    let raw = js_sys::Reflect::get(&window, &JsValue::from_str(CONFIG_GLOBAL))
        .context("read config global")?;
    if raw.is_undefined() || raw.is_null() {
        return Ok(OverlayConfig::default());
    }
    if let Some(json) = raw.as_string() {
        return OverlayConfig::from_json(&json)
            .map_err(|err| WebError::ConfigShape(format!("{err:#}")));
    }
    let config: OverlayConfig = serde_wasm_bindgen::from_value(raw)
        .map_err(|err| WebError::ConfigShape(err.to_string()))?;
    config.validate()?;
    Ok(config)
}

#[cfg(target_arch = "wasm32")]
fn boot() -> anyhow::Result<()> {
    use anyhow::Context;

    let config = read_config().unwrap_or_else(|err| {
        dom::console_error(&format!("{err}; using default widget settings"));
        OverlayConfig::default()
    });
    logging::init(config.level_filter());
    let widget = mount(&config).context("mounting accessibility widget")?;
    WIDGET.with(|slot| *slot.borrow_mut() = Some(widget));
    Ok(())
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    if let Err(err) = boot() {
        dom::console_error(&format!("{err:#}"));
    }
}
