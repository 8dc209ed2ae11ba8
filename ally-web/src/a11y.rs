// Applying preferences to the page

use ally_engine::{ControlState, Effect, EffectSet, EffectSink, PanelSide};
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement};

/// Critical CSS for the widget chrome and screen reader helpers.
///
/// The page's own stylesheet is expected to define what each effect class
/// looks like; this only covers the panel itself.
#[must_use]
pub const fn widget_css() -> &'static str {
    "[data-a11y-widget] :focus{outline:3px solid #00D9C0;outline-offset:2px} [data-a11y-widget] [hidden]{display:none} .a11y-sr-only{position:absolute;width:1px;height:1px;margin:-1px;overflow:hidden;clip:rect(0 0 0 0);white-space:nowrap;}"
}

/// Classes a leveled effect can put on the document element.
#[must_use]
pub fn level_classes(name: &str, max_level: u8) -> Vec<String> {
    (1..=max_level).map(|level| format!("{name}-{level}")).collect()
}

/// CSS custom property carrying a palette effect's colour.
#[must_use]
pub fn custom_property(name: &str) -> String {
    format!("--{name}")
}

/// Attribute mirroring a palette effect's colour, for selectors.
#[must_use]
pub fn data_attribute(name: &str) -> String {
    format!("data-{name}")
}

/// Effect sink over the document element's class list, style and attributes.
#[derive(Debug, Clone)]
pub struct DocumentEffects {
    root: Element,
    panel: Option<Element>,
}

impl DocumentEffects {
    #[must_use]
    pub const fn new(root: Element, panel: Option<Element>) -> Self {
        Self { root, panel }
    }

    fn apply_effect(&self, effect: &Effect) {
        let classes = self.root.class_list();
        let result = match *effect {
            Effect::Flag { name, on } => classes.toggle_with_force(name, on).map(|_| ()),
            Effect::Level {
                name, max_level, ..
            } => {
                for class in level_classes(name, max_level) {
                    let _ = classes.remove_1(&class);
                }
                effect
                    .class_name()
                    .map_or(Ok(()), |class| classes.add_1(&class))
            }
            Effect::Color { name, value } => self.apply_color(name, value),
        };
        if let Err(err) = result {
            log::warn!(
                "could not apply {}: {}",
                effect.name(),
                crate::dom::js_error_message(&err)
            );
        }
    }

    fn apply_color(
        &self,
        name: &str,
        value: Option<&str>,
    ) -> Result<(), wasm_bindgen::JsValue> {
        let style = self
            .root
            .dyn_ref::<HtmlElement>()
            .map(HtmlElement::style);
        let attribute = data_attribute(name);
        match value {
            Some(color) => {
                if let Some(style) = style {
                    style.set_property(&custom_property(name), color)?;
                }
                self.root.set_attribute(&attribute, color)
            }
            None => {
                if let Some(style) = style {
                    style.remove_property(&custom_property(name))?;
                }
                self.root.remove_attribute(&attribute)
            }
        }
    }
}

impl EffectSink for DocumentEffects {
    fn apply(&mut self, effects: &EffectSet) {
        for effect in effects.iter() {
            self.apply_effect(effect);
        }
    }

    fn place_panel(&mut self, side: PanelSide) {
        let Some(panel) = &self.panel else {
            return;
        };
        if let Err(err) = panel.set_attribute("data-a11y-side", side.as_str()) {
            log::warn!(
                "could not move panel: {}",
                crate::dom::js_error_message(&err)
            );
        }
    }
}

/// Update the panel's live region for screen readers.
pub fn set_status(region: &Element, msg: &str) {
    region.set_text_content(Some(msg));
}

/// Mirror a control's state onto its button.
pub fn reflect_control(button: &Element, state: &ControlState) {
    let _ = button.set_attribute("aria-label", &state.label);
    let _ = match state.aria_pressed() {
        Some(pressed) => {
            button.set_attribute("aria-pressed", if pressed { "true" } else { "false" })
        }
        None => button.remove_attribute("aria-pressed"),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_family_names() {
        assert_eq!(
            level_classes("a11y-zoom", 3),
            vec!["a11y-zoom-1", "a11y-zoom-2", "a11y-zoom-3"]
        );
        assert!(level_classes("a11y-zoom", 0).is_empty());
    }

    #[test]
    fn palette_names() {
        assert_eq!(custom_property("a11y-text-color"), "--a11y-text-color");
        assert_eq!(data_attribute("a11y-text-color"), "data-a11y-text-color");
    }
}
