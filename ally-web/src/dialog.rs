//! Panel host over the live DOM.
use ally_engine::DialogHost;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{Document, Element, HtmlElement, KeyboardEvent, Node};

use crate::dom::{self, js_error_message};
use crate::element::DomNode;

pub const FOCUSABLE_QUERY: &str = "button:not([disabled]), [href], input:not([disabled]), \
     select:not([disabled]), textarea:not([disabled]), [tabindex]:not([tabindex='-1'])";

/// The panel's close control takes focus when the panel opens.
pub const INITIAL_FOCUS_QUERY: &str = "[data-a11y-control='close']";

pub type KeyListener = Closure<dyn FnMut(KeyboardEvent)>;

pub struct DomDialogHost {
    document: Document,
    panel: Element,
    opener: Option<Element>,
    trap: Option<KeyListener>,
}

impl DomDialogHost {
    #[must_use]
    pub const fn new(document: Document, panel: Element, opener: Option<Element>) -> Self {
        Self {
            document,
            panel,
            opener,
            trap: None,
        }
    }

    /// Listener installed on the document while the panel is open.
    pub fn set_trap(&mut self, listener: KeyListener) {
        self.trap = Some(listener);
    }
}

impl DialogHost for DomDialogHost {
    type Element = DomNode;

    fn active_element(&self) -> Option<DomNode> {
        self.document.active_element().map(DomNode)
    }

    fn initial_focus(&self) -> Option<DomNode> {
        self.panel
            .query_selector(INITIAL_FOCUS_QUERY)
            .ok()
            .flatten()
            .map(DomNode)
    }

    fn focusable_elements(&self) -> Vec<DomNode> {
        match self.panel.query_selector_all(FOCUSABLE_QUERY) {
            Ok(list) => dom::elements(&list).into_iter().map(DomNode).collect(),
            Err(err) => {
                log::warn!("focusable query failed: {}", js_error_message(&err));
                Vec::new()
            }
        }
    }

    fn focus(&mut self, element: &DomNode) {
        dom::focus(element.element());
    }

    fn can_receive_focus(&self, element: &DomNode) -> bool {
        let el = element.element();
        el.is_connected()
            && el.dyn_ref::<HtmlElement>().is_some()
            && !el.has_attribute("disabled")
    }

    fn contains(&self, element: &DomNode) -> bool {
        let node: &Node = element.element();
        self.panel.contains(Some(node))
    }

    fn is_opener(&self, element: &DomNode) -> bool {
        let node: &Node = element.element();
        self.opener
            .as_ref()
            .is_some_and(|opener| opener.contains(Some(node)))
    }

    fn set_open(&mut self, open: bool) {
        let result = if open {
            self.panel.remove_attribute("hidden")
        } else {
            self.panel.set_attribute("hidden", "")
        };
        if let Err(err) = result {
            log::warn!("panel visibility not updated: {}", js_error_message(&err));
        }
        if let Some(opener) = &self.opener {
            let _ = opener.set_attribute("aria-expanded", if open { "true" } else { "false" });
        }
    }

    fn install_key_handlers(&mut self) {
        let Some(trap) = &self.trap else {
            return;
        };
        if let Err(err) = self
            .document
            .add_event_listener_with_callback("keydown", trap.as_ref().unchecked_ref())
        {
            log::error!("focus trap not installed: {}", js_error_message(&err));
        }
    }

    fn remove_key_handlers(&mut self) {
        let Some(trap) = &self.trap else {
            return;
        };
        if let Err(err) = self
            .document
            .remove_event_listener_with_callback("keydown", trap.as_ref().unchecked_ref())
        {
            log::warn!("focus trap not removed: {}", js_error_message(&err));
        }
    }
}
