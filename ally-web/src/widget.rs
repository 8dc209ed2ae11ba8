//! The mounted widget and the DOM listeners that drive it.
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use ally_engine::controls::descriptors;
use ally_engine::{
    Activation, ClickOutcome, ControlResponse, HoverOutcome, HoverToken, KeyDisposition,
    KeyInput, Overlay, OverlayConfig, ProfileCatalog, Registry,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{Element, Event, EventTarget, KeyboardEvent};

use crate::a11y::{DocumentEffects, reflect_control, set_status};
use crate::dialog::DomDialogHost;
use crate::dom;
use crate::element::DomNode;
use crate::error::{JsResultExt, WebError};
use crate::render::{WidgetElements, render_widget};
use crate::speech::WebSpeech;
use crate::storage::LocalStorageStore;

pub type WebOverlay = Overlay<LocalStorageStore, DocumentEffects, WebSpeech, DomNode>;
pub type SharedWidget = Rc<RefCell<Widget>>;

pub struct Widget {
    this: Weak<RefCell<Self>>,
    overlay: WebOverlay,
    host: DomDialogHost,
    elements: WidgetElements,
    hover_timer: Option<(HoverToken, i32)>,
}

impl Widget {
    #[must_use]
    pub const fn overlay(&self) -> &WebOverlay {
        &self.overlay
    }

    #[must_use]
    pub const fn elements(&self) -> &WidgetElements {
        &self.elements
    }

    pub fn open(&mut self) -> bool {
        self.overlay.open(&mut self.host);
        self.refresh();
        self.overlay.is_open()
    }

    pub fn close(&mut self) -> bool {
        self.overlay.close(&mut self.host);
        self.overlay.is_open()
    }

    pub fn toggle(&mut self) -> bool {
        let open = self.overlay.toggle(&mut self.host);
        self.refresh();
        open
    }

    pub fn reset(&mut self) {
        self.overlay.reset();
        self.cancel_hover_timer();
        self.refresh();
    }

    /// Re-read every control's state onto its button.
    pub fn refresh(&self) {
        for (id, button) in &self.elements.controls {
            match self.overlay.control_state(id) {
                Ok(state) => reflect_control(button, &state),
                Err(err) => log::warn!("control {id} not reflected: {err}"),
            }
        }
    }

    fn announce(&self, response: &ControlResponse) {
        if let Some(status) = &response.status {
            set_status(&self.elements.status, status);
        }
    }

    fn on_click(&mut self, event: &Event) {
        let Some(target) = event_element(event) else {
            return;
        };
        match self.overlay.handle_click(&mut self.host, &DomNode(target)) {
            ClickOutcome::Activated { activation, open } => {
                if activation == Activation::Link {
                    event.prevent_default();
                }
                log::debug!(
                    "panel {} via {activation:?}",
                    if open { "opened" } else { "closed" }
                );
                self.refresh();
            }
            ClickOutcome::Control(response) => {
                event.prevent_default();
                self.announce(&response);
                self.refresh();
            }
            ClickOutcome::Ignored => {}
        }
    }

    fn on_pointer_down(&mut self, event: &Event) {
        if let Some(target) = event_element(event) {
            self.overlay.handle_pointer_down(&mut self.host, &DomNode(target));
        }
    }

    fn on_shortcut(&mut self, event: &KeyboardEvent) {
        if self.overlay.handle_shortcut(&mut self.host, &key_input(event)) {
            event.prevent_default();
            self.refresh();
        }
    }

    fn on_dialog_key(&mut self, event: &KeyboardEvent) {
        match self.overlay.handle_dialog_key(&mut self.host, &key_input(event)) {
            KeyDisposition::Handled | KeyDisposition::Closed => event.prevent_default(),
            KeyDisposition::Ignored => {}
        }
    }

    fn on_mouse_over(&mut self, event: &Event) {
        let Some(target) = event_element(event) else {
            return;
        };
        match self.overlay.pointer_over(&DomNode(target)) {
            HoverOutcome::Scheduled { token, delay_ms } => self.schedule_hover(token, delay_ms),
            HoverOutcome::Deduplicated | HoverOutcome::AlreadySpoken | HoverOutcome::Ignored => {
                self.sync_hover_timer();
            }
        }
    }

    fn on_focus_in(&mut self, event: &Event) {
        if let Some(target) = event_element(event)
            && let Some(spoken) = self.overlay.focus_in(&DomNode(target))
        {
            log::trace!("spoke focused element: {spoken}");
        }
        self.sync_hover_timer();
    }

    fn schedule_hover(&mut self, token: HoverToken, delay_ms: u32) {
        self.cancel_hover_timer();
        let this = self.this.clone();
        let delay = i32::try_from(delay_ms).unwrap_or(i32::MAX);
        let fire = move || {
            let Some(widget) = this.upgrade() else {
                return;
            };
            let Ok(mut widget) = widget.try_borrow_mut() else {
                log::debug!("hover timer fired during another handler; dropped");
                return;
            };
            widget.hover_timer = None;
            if let Some(spoken) = widget.overlay.fire_hover(token) {
                log::trace!("spoke hovered element: {spoken}");
            }
        };
        match dom::set_timeout(fire, delay) {
            Ok(id) => self.hover_timer = Some((token, id)),
            Err(err) => log::warn!("hover speech not scheduled: {err}"),
        }
    }

    /// Drop the browser timer once the overlay no longer expects it.
    fn sync_hover_timer(&mut self) {
        if let Some((token, _)) = self.hover_timer
            && self.overlay.pending_hover() != Some(token)
        {
            self.cancel_hover_timer();
        }
    }

    fn cancel_hover_timer(&mut self) {
        if let Some((_, id)) = self.hover_timer.take() {
            dom::clear_timeout(id);
        }
    }
}

/// Keyboard state as the engine sees it.
///
/// Alt-modified letters report composed characters on some layouts, so the
/// physical key wins for letter keys.
#[must_use]
pub fn key_input(event: &KeyboardEvent) -> KeyInput {
    let code = event.code();
    let key = match code.strip_prefix("Key") {
        Some(letter) if event.alt_key() && letter.len() == 1 => letter.to_ascii_lowercase(),
        _ => event.key(),
    };
    KeyInput {
        key,
        shift: event.shift_key(),
        ctrl: event.ctrl_key(),
        alt: event.alt_key(),
        meta: event.meta_key(),
    }
}

fn event_element(event: &Event) -> Option<Element> {
    event.target()?.dyn_into::<Element>().ok()
}

fn listen<E>(
    target: &EventTarget,
    name: &'static str,
    widget: &Weak<RefCell<Widget>>,
    handler: fn(&mut Widget, &E),
) -> Result<(), WebError>
where
    E: JsCast + 'static,
{
    let widget = widget.clone();
    let closure = Closure::wrap(Box::new(move |event: Event| {
        let Some(shared) = widget.upgrade() else {
            return;
        };
        let Ok(event) = event.dyn_into::<E>() else {
            return;
        };
        match shared.try_borrow_mut() {
            Ok(mut widget) => handler(&mut widget, &event),
            Err(_) => log::debug!("{name} arrived during another handler; skipped"),
        }
    }) as Box<dyn FnMut(Event)>);
    target
        .add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())
        .context("addEventListener")?;
    closure.forget();
    Ok(())
}

/// Render the widget, restore saved preferences and start listening.
///
/// # Errors
///
/// Returns an error if the page has no document or rejects a DOM call.
pub fn mount(config: &OverlayConfig) -> Result<SharedWidget, WebError> {
    let document = dom::document()?;
    let root = document.document_element().ok_or(WebError::NoDocument)?;
    let controls = descriptors(&Registry::standard(), &ProfileCatalog::standard());
    let elements = render_widget(&document, &controls, &config.open_attribute)?;

    let sink = DocumentEffects::new(root, Some(elements.panel.clone()));
    let mut overlay = Overlay::new(config, LocalStorageStore::open(), sink, WebSpeech::detect());
    overlay.boot();

    let host = DomDialogHost::new(
        document.clone(),
        elements.panel.clone(),
        Some(elements.launcher.clone()),
    );
    let widget = Rc::new_cyclic(|this| {
        RefCell::new(Widget {
            this: this.clone(),
            overlay,
            host,
            elements,
            hover_timer: None,
        })
    });

    let this = Rc::downgrade(&widget);
    let trap_target = this.clone();
    let trap = Closure::wrap(Box::new(move |event: KeyboardEvent| {
        if let Some(shared) = trap_target.upgrade()
            && let Ok(mut widget) = shared.try_borrow_mut()
        {
            widget.on_dialog_key(&event);
        }
    }) as Box<dyn FnMut(KeyboardEvent)>);
    widget.borrow_mut().host.set_trap(trap);

    let target: &EventTarget = &document;
    listen::<Event>(target, "click", &this, |w, e| w.on_click(e))?;
    listen::<Event>(target, "pointerdown", &this, |w, e| w.on_pointer_down(e))?;
    listen::<KeyboardEvent>(target, "keydown", &this, |w, e| w.on_shortcut(e))?;
    listen::<Event>(target, "mouseover", &this, |w, e| w.on_mouse_over(e))?;
    listen::<Event>(target, "focusin", &this, |w, e| w.on_focus_in(e))?;

    widget.borrow().refresh();
    log::info!("accessibility widget mounted");
    Ok(widget)
}
