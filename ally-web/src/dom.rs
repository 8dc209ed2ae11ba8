use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, NodeList, Storage, Window};

use crate::error::{JsResultExt, WebError};

/// Retrieve the global `window` object.
///
/// # Errors
/// Returns an error outside of a browser context.
pub fn window() -> Result<Window, WebError> {
    web_sys::window().ok_or(WebError::NoWindow)
}

/// Retrieve the document object for DOM interactions.
///
/// # Errors
/// Returns an error when the document cannot be accessed from the current window.
pub fn document() -> Result<Document, WebError> {
    window()?.document().ok_or(WebError::NoDocument)
}

/// Convert a JavaScript value into a readable string for error reporting.
#[must_use]
pub fn js_error_message(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|err| err.message().into())
        })
        .unwrap_or_else(|| format!("{value:?}"))
}

/// Log an error message to the browser console.
pub fn console_error(message: &str) {
    web_sys::console::error_1(&JsValue::from(message));
}

/// Access the browser `localStorage` handle.
///
/// # Errors
/// Returns an error if the browser window cannot be accessed or `localStorage` is unavailable.
pub fn local_storage() -> Result<Storage, WebError> {
    window()?
        .local_storage()
        .context("localStorage access")?
        .ok_or(WebError::Js {
            context: "localStorage access",
            message: "localStorage unavailable".to_string(),
        })
}

/// Run `callback` once after `delay_ms`. Returns the timer id for [`clear_timeout`].
///
/// # Errors
/// Returns an error if the timer cannot be scheduled.
pub fn set_timeout(callback: impl FnOnce() + 'static, delay_ms: i32) -> Result<i32, WebError> {
    let closure = Closure::once_into_js(callback);
    window()?
        .set_timeout_with_callback_and_timeout_and_arguments_0(closure.unchecked_ref(), delay_ms)
        .context("setTimeout")
}

pub fn clear_timeout(id: i32) {
    if let Ok(win) = window() {
        win.clear_timeout_with_handle(id);
    }
}

/// Collect a `NodeList` into elements, skipping non-element nodes.
#[must_use]
pub fn elements(list: &NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|index| list.get(index))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

/// Move focus to `element` if it is focusable HTML.
pub fn focus(element: &Element) {
    if let Some(html) = element.dyn_ref::<HtmlElement>() {
        let _ = html.focus();
    }
}
