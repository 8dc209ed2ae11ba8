//! Widget markup, built from the engine's control descriptors.
use ally_engine::constants::{CONTROL_ATTRIBUTE, WIDGET_ATTRIBUTE};
use ally_engine::{Binding, ControlDescriptor};
use web_sys::{Document, Element};

use crate::a11y::widget_css;
use crate::error::{JsResultExt, WebError};

pub const PANEL_ID: &str = "a11y-panel";
pub const STATUS_ID: &str = "a11y-status";
const TITLE_ID: &str = "a11y-panel-title";

/// Handles to the rendered widget.
#[derive(Debug, Clone)]
pub struct WidgetElements {
    pub root: Element,
    pub launcher: Element,
    pub panel: Element,
    pub status: Element,
    pub controls: Vec<(String, Element)>,
}

/// Section a control is rendered into.
#[must_use]
pub const fn group_of(binding: &Binding) -> (&'static str, &'static str) {
    match binding {
        Binding::Profile(_) => ("profiles", "Profiles"),
        Binding::Feature(_) => ("features", "Adjustments"),
        Binding::Swatch { .. } => ("colors", "Colors"),
        Binding::SpeechEnabled | Binding::SpeechRate => ("speech", "Speech"),
        Binding::PanelSide | Binding::Action(_) => ("actions", "Widget"),
    }
}

fn element(
    document: &Document,
    tag: &str,
    attributes: &[(&str, &str)],
) -> Result<Element, WebError> {
    let el = document.create_element(tag).context("createElement")?;
    for (name, value) in attributes {
        el.set_attribute(name, value).context("setAttribute")?;
    }
    Ok(el)
}

fn append(parent: &Element, child: &Element) -> Result<(), WebError> {
    parent.append_child(child).context("appendChild").map(|_| ())
}

/// Build the launcher and panel and attach them to `<body>`.
///
/// # Errors
///
/// Returns an error if the document has no body or rejects a DOM call.
pub fn render_widget(
    document: &Document,
    controls: &[ControlDescriptor],
    open_attribute: &str,
) -> Result<WidgetElements, WebError> {
    let body = document.body().ok_or(WebError::NoDocument)?;
    let root = element(document, "div", &[(WIDGET_ATTRIBUTE, "")])?;

    let style = element(document, "style", &[])?;
    style.set_text_content(Some(widget_css()));
    append(&root, &style)?;

    let launcher = element(
        document,
        "button",
        &[
            ("type", "button"),
            ("class", "a11y-launcher"),
            (open_attribute, ""),
            ("aria-haspopup", "dialog"),
            ("aria-expanded", "false"),
            ("aria-controls", PANEL_ID),
        ],
    )?;
    launcher.set_text_content(Some("Accessibility"));
    append(&root, &launcher)?;

    let panel = element(
        document,
        "div",
        &[
            ("id", PANEL_ID),
            ("role", "dialog"),
            ("aria-labelledby", TITLE_ID),
            ("hidden", ""),
        ],
    )?;
    let title = element(document, "h2", &[("id", TITLE_ID)])?;
    title.set_text_content(Some("Accessibility Adjustments"));
    append(&panel, &title)?;
    let status = element(
        document,
        "p",
        &[
            ("id", STATUS_ID),
            ("class", "a11y-sr-only"),
            ("role", "status"),
            ("aria-live", "polite"),
        ],
    )?;
    append(&panel, &status)?;

    let mut sections: Vec<(&'static str, Element)> = Vec::new();
    let mut rendered = Vec::with_capacity(controls.len());
    for descriptor in controls {
        let (group, heading) = group_of(&descriptor.binding);
        let section = match sections.iter().find(|(name, _)| *name == group) {
            Some((_, section)) => section.clone(),
            None => {
                let section = element(document, "section", &[("data-group", group)])?;
                let label = element(document, "h3", &[])?;
                label.set_text_content(Some(heading));
                append(&section, &label)?;
                append(&panel, &section)?;
                sections.push((group, section.clone()));
                section
            }
        };
        let button = element(
            document,
            "button",
            &[("type", "button"), (CONTROL_ATTRIBUTE, descriptor.id.as_str())],
        )?;
        if let Binding::Swatch { .. } = descriptor.binding
            && let Some((_, hex)) = descriptor.label.rsplit_once(": ")
        {
            button
                .set_attribute("style", &format!("background:{hex}"))
                .context("setAttribute")?;
        }
        button.set_text_content(Some(&descriptor.label));
        append(&section, &button)?;
        rendered.push((descriptor.id.clone(), button));
    }

    append(&root, &panel)?;
    append(&body, &root)?;
    Ok(WidgetElements {
        root,
        launcher,
        panel,
        status,
        controls: rendered,
    })
}
