//! In-memory element tree.
//!
//! An arena of elements addressed by index. Used to drive the resolver,
//! dialog, and overlay logic without a browser.
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::resolver::SpeakableNode;

const FOCUSABLE_TAGS: &[&str] = &["button", "input", "select", "textarea"];

#[derive(Debug, Default)]
struct ElementData {
    tag: String,
    attributes: BTreeMap<String, String>,
    text: String,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Shared handle to an element arena. Clones refer to the same document.
#[derive(Clone)]
pub struct MemoryDom {
    elements: Rc<RefCell<Vec<ElementData>>>,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryDom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryDom")
            .field("elements", &self.elements.borrow().len())
            .finish()
    }
}

impl MemoryDom {
    /// A document containing only a `body` element.
    #[must_use]
    pub fn new() -> Self {
        let body = ElementData {
            tag: "body".to_string(),
            ..ElementData::default()
        };
        Self {
            elements: Rc::new(RefCell::new(vec![body])),
        }
    }

    #[must_use]
    pub fn root(&self) -> MemoryNode {
        self.node(0)
    }

    /// Append a new child element to `parent`.
    pub fn append(&self, parent: &MemoryNode, tag: &str) -> MemoryNode {
        let mut elements = self.elements.borrow_mut();
        let id = elements.len();
        elements.push(ElementData {
            tag: tag.to_ascii_lowercase(),
            parent: Some(parent.id),
            ..ElementData::default()
        });
        elements[parent.id].children.push(id);
        drop(elements);
        self.node(id)
    }

    fn node(&self, id: usize) -> MemoryNode {
        MemoryNode {
            dom: self.clone(),
            id,
        }
    }

    fn find(&self, predicate: impl Fn(&ElementData) -> bool) -> Option<MemoryNode> {
        let index = self.elements.borrow().iter().position(predicate)?;
        Some(self.node(index))
    }
}

/// Handle to one element of a [`MemoryDom`].
#[derive(Clone)]
pub struct MemoryNode {
    dom: MemoryDom,
    id: usize,
}

impl PartialEq for MemoryNode {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && Rc::ptr_eq(&self.dom.elements, &other.dom.elements)
    }
}

impl Eq for MemoryNode {}

impl fmt::Debug for MemoryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let elements = self.dom.elements.borrow();
        let data = &elements[self.id];
        write!(f, "<{}#{}", data.tag, self.id)?;
        if let Some(id) = data.attributes.get("id") {
            write!(f, " id={id}")?;
        }
        write!(f, ">")
    }
}

impl MemoryNode {
    #[must_use]
    pub fn with_attribute(self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    #[must_use]
    pub fn with_text(self, text: &str) -> Self {
        self.dom.elements.borrow_mut()[self.id].text = text.to_string();
        self
    }

    pub fn set_attribute(&self, name: &str, value: &str) {
        self.dom.elements.borrow_mut()[self.id]
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    #[must_use]
    pub fn children(&self) -> Vec<Self> {
        let children = self.dom.elements.borrow()[self.id].children.clone();
        children.into_iter().map(|id| self.dom.node(id)).collect()
    }

    /// All descendants in document order.
    #[must_use]
    pub fn descendants(&self) -> Vec<Self> {
        let mut out = Vec::new();
        for child in self.children() {
            out.push(child.clone());
            out.extend(child.descendants());
        }
        out
    }

    /// Whether `other` is this element or one of its descendants.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        let mut current = Some(other.clone());
        while let Some(node) = current {
            if node == *self {
                return true;
            }
            current = node.parent();
        }
        false
    }

    /// Matches what `button, [href], input, select, textarea, [tabindex]`
    /// minus `tabindex="-1"` and disabled controls would select.
    #[must_use]
    pub fn is_focusable(&self) -> bool {
        let elements = self.dom.elements.borrow();
        let data = &elements[self.id];
        if data.attributes.contains_key("disabled") {
            return false;
        }
        match data.attributes.get("tabindex") {
            Some(index) if index.trim() == "-1" => false,
            Some(_) => true,
            None => {
                FOCUSABLE_TAGS.contains(&data.tag.as_str())
                    || data.attributes.contains_key("href")
            }
        }
    }
}

impl SpeakableNode for MemoryNode {
    fn parent(&self) -> Option<Self> {
        let parent = self.dom.elements.borrow()[self.id].parent?;
        Some(self.dom.node(parent))
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.dom.elements.borrow()[self.id]
            .attributes
            .get(name)
            .cloned()
    }

    fn tag_name(&self) -> String {
        self.dom.elements.borrow()[self.id].tag.clone()
    }

    fn text_content(&self) -> String {
        let mut text = self.dom.elements.borrow()[self.id].text.clone();
        for child in self.children() {
            text.push_str(&child.text_content());
        }
        text
    }

    fn element_by_id(&self, id: &str) -> Option<Self> {
        self.dom
            .find(|data| data.attributes.get("id").is_some_and(|value| value == id))
    }

    fn descendant_image_alt(&self) -> Option<String> {
        self.descendants().into_iter().find_map(|node| {
            (node.tag_name() == "img")
                .then(|| node.attribute("alt"))
                .flatten()
                .filter(|alt| !alt.trim().is_empty())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_navigation() {
        let dom = MemoryDom::new();
        let list = dom.append(&dom.root(), "ul").with_attribute("id", "menu");
        let item = dom.append(&list, "li").with_text("Soup");
        let link = dom.append(&item, "a").with_attribute("href", "#soup");

        assert_eq!(link.parent(), Some(item.clone()));
        assert_eq!(dom.root().element_by_id("menu"), Some(list.clone()));
        assert!(list.contains(&link));
        assert!(!link.contains(&list));
        assert_eq!(list.text_content(), "Soup");
        assert_eq!(dom.root().descendants(), vec![list, item, link]);
    }

    #[test]
    fn focusability_follows_selector_rules() {
        let dom = MemoryDom::new();
        let root = dom.root();
        assert!(dom.append(&root, "button").is_focusable());
        assert!(dom.append(&root, "a").with_attribute("href", "/").is_focusable());
        assert!(!dom.append(&root, "a").is_focusable());
        assert!(dom.append(&root, "div").with_attribute("tabindex", "0").is_focusable());
        assert!(
            !dom.append(&root, "button")
                .with_attribute("tabindex", "-1")
                .is_focusable()
        );
        assert!(
            !dom.append(&root, "input")
                .with_attribute("disabled", "")
                .is_focusable()
        );
    }
}
