//! Live DOM elements as seen by the engine.
use ally_engine::SpeakableNode;
use web_sys::Element;

use crate::dom;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomNode(pub Element);

impl DomNode {
    #[must_use]
    pub const fn element(&self) -> &Element {
        &self.0
    }
}

impl From<Element> for DomNode {
    fn from(element: Element) -> Self {
        Self(element)
    }
}

impl SpeakableNode for DomNode {
    fn parent(&self) -> Option<Self> {
        self.0.parent_element().map(Self)
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.0.get_attribute(name)
    }

    fn tag_name(&self) -> String {
        self.0.tag_name().to_ascii_lowercase()
    }

    fn text_content(&self) -> String {
        self.0.text_content().unwrap_or_default()
    }

    fn element_by_id(&self, id: &str) -> Option<Self> {
        self.0.owner_document()?.get_element_by_id(id).map(Self)
    }

    fn descendant_image_alt(&self) -> Option<String> {
        let images = self.0.query_selector_all("img[alt]").ok()?;
        dom::elements(&images)
            .into_iter()
            .filter_map(|img| img.get_attribute("alt"))
            .find(|alt| !alt.trim().is_empty())
    }
}
