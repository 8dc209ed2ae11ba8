//! Panel behaviour: open/close, focus trap, focus restore.
//!
//! The panel is non-modal. The page stays interactive and scrollable.
//!
//! The controller is host-agnostic. The host supplies focus primitives and
//! the live list of focusable elements inside the panel through
//! [`DialogHost`]; the list is re-queried on every Tab so that content
//! changes while the panel is open are respected.
use crate::input::KeyInput;

pub trait DialogHost {
    type Element: Clone + PartialEq;

    /// Element that currently holds focus anywhere in the document.
    fn active_element(&self) -> Option<Self::Element>;
    /// Preferred element to focus when the panel opens.
    fn initial_focus(&self) -> Option<Self::Element>;
    /// Focusable elements inside the panel, in document order.
    fn focusable_elements(&self) -> Vec<Self::Element>;
    fn focus(&mut self, element: &Self::Element);
    /// Whether `element` is still attached and able to take focus.
    fn can_receive_focus(&self, element: &Self::Element) -> bool;
    /// Whether `element` lies inside the panel.
    fn contains(&self, element: &Self::Element) -> bool;
    /// Whether `element` is (inside) the control that opens the panel.
    fn is_opener(&self, element: &Self::Element) -> bool;
    fn set_open(&mut self, open: bool);
    fn install_key_handlers(&mut self);
    fn remove_key_handlers(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    /// Not ours; let the browser handle it.
    Ignored,
    /// Consumed; the host should prevent the default action.
    Handled,
    /// Consumed, and the panel closed as a result.
    Closed,
}

#[derive(Debug, Clone)]
pub struct DialogController<E> {
    open: bool,
    return_focus: Option<E>,
}

impl<E> Default for DialogController<E> {
    fn default() -> Self {
        Self {
            open: false,
            return_focus: None,
        }
    }
}

impl<E: Clone + PartialEq> DialogController<E> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// Open the panel. Returns `false` if it was already open.
    pub fn open<H: DialogHost<Element = E>>(&mut self, host: &mut H) -> bool {
        if self.open {
            return false;
        }
        self.return_focus = host.active_element();
        host.set_open(true);
        self.open = true;
        let target = host
            .initial_focus()
            .or_else(|| host.focusable_elements().into_iter().next());
        if let Some(target) = target {
            host.focus(&target);
        }
        host.install_key_handlers();
        log::debug!("panel opened");
        true
    }

    /// Close the panel and hand focus back to whatever had it before.
    /// Returns `false` if it was already closed.
    pub fn close<H: DialogHost<Element = E>>(&mut self, host: &mut H) -> bool {
        if !self.open {
            return false;
        }
        host.remove_key_handlers();
        host.set_open(false);
        self.open = false;
        if let Some(previous) = self.return_focus.take() {
            if host.can_receive_focus(&previous) {
                host.focus(&previous);
            } else {
                log::debug!("previous focus target is gone; leaving focus in place");
            }
        }
        log::debug!("panel closed");
        true
    }

    pub fn toggle<H: DialogHost<Element = E>>(&mut self, host: &mut H) -> bool {
        if self.open {
            self.close(host);
        } else {
            self.open(host);
        }
        self.open
    }

    /// Keydown while the panel is open: Escape closes, Tab wraps.
    pub fn handle_key<H: DialogHost<Element = E>>(
        &mut self,
        host: &mut H,
        key: &KeyInput,
    ) -> KeyDisposition {
        if !self.open {
            return KeyDisposition::Ignored;
        }
        if key.is("Escape") {
            self.close(host);
            return KeyDisposition::Closed;
        }
        if key.is("Tab") {
            return Self::trap_tab(host, key.shift);
        }
        KeyDisposition::Ignored
    }

    /// Pointer pressed somewhere. Closes the panel when the press lands
    /// outside both the panel and its opener.
    pub fn handle_pointer_down<H: DialogHost<Element = E>>(
        &mut self,
        host: &mut H,
        target: &E,
    ) -> bool {
        if !self.open || host.contains(target) || host.is_opener(target) {
            return false;
        }
        self.close(host)
    }

    fn trap_tab<H: DialogHost<Element = E>>(host: &mut H, backwards: bool) -> KeyDisposition {
        let focusable = host.focusable_elements();
        let (Some(first), Some(last)) = (focusable.first(), focusable.last()) else {
            return KeyDisposition::Ignored;
        };
        let wrap_to = match host.active_element() {
            Some(active) if host.contains(&active) => {
                if backwards && active == *first {
                    Some(last)
                } else if !backwards && active == *last {
                    Some(first)
                } else {
                    None
                }
            }
            _ => Some(if backwards { last } else { first }),
        };
        match wrap_to {
            Some(target) => {
                host.focus(target);
                KeyDisposition::Handled
            }
            None => KeyDisposition::Ignored,
        }
    }
}
