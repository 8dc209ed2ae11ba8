use ally_engine::ConfigError;
use wasm_bindgen::JsValue;

use crate::dom::js_error_message;

/// Failures talking to the browser.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error("`window` is not available")]
    NoWindow,
    #[error("`document` is not available")]
    NoDocument,
    #[error("{context}: {message}")]
    Js {
        context: &'static str,
        message: String,
    },
    #[error("invalid widget config: {0}")]
    Config(#[from] ConfigError),
    #[error("widget config could not be read: {0}")]
    ConfigShape(String),
}

impl WebError {
    /// Wrap a thrown JS value with the operation that threw it.
    #[must_use]
    pub fn js(context: &'static str, value: &JsValue) -> Self {
        Self::Js {
            context,
            message: js_error_message(value),
        }
    }
}

/// Shorthand for mapping `Result<T, JsValue>` into [`WebError`].
pub trait JsResultExt<T> {
    /// # Errors
    ///
    /// Returns the JS failure wrapped as [`WebError::Js`].
    fn context(self, context: &'static str) -> Result<T, WebError>;
}

impl<T> JsResultExt<T> for Result<T, JsValue> {
    fn context(self, context: &'static str) -> Result<T, WebError> {
        self.map_err(|err| WebError::js(context, &err))
    }
}
