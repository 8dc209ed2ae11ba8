//! Speakable-text resolution
//!
//! Given the element under the pointer (or holding focus), walk up a bounded
//! number of ancestors and return the first non-empty accessible text found,
//! checking each level in a fixed priority order.
use crate::constants::{DEFAULT_ANCESTOR_DEPTH, DEFAULT_FALLBACK_MAX_CHARS, WIDGET_ATTRIBUTE};

const TEXT_INPUT_TYPES: &[&str] = &["text", "search", "email", "tel", "url", "password", "number"];

/// Read-only view of a document element, as needed by the resolver.
pub trait SpeakableNode: Clone + PartialEq {
    fn parent(&self) -> Option<Self>;
    fn attribute(&self, name: &str) -> Option<String>;
    /// Lower-case tag name.
    fn tag_name(&self) -> String;
    /// Concatenated text of this element and its descendants.
    fn text_content(&self) -> String;
    /// Look up another element in the same document.
    fn element_by_id(&self, id: &str) -> Option<Self>;
    /// `alt` of the first descendant image that has a non-empty one.
    fn descendant_image_alt(&self) -> Option<String>;

    fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }
}

/// Collapse runs of whitespace to single spaces and trim the ends.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn non_empty(text: Option<String>) -> Option<String> {
    text.map(|t| collapse_whitespace(&t)).filter(|t| !t.is_empty())
}

/// Whether `node` or any ancestor is part of the overlay itself.
pub fn is_within_widget<N: SpeakableNode>(node: &N) -> bool {
    let mut current = Some(node.clone());
    while let Some(el) = current {
        if el.has_attribute(WIDGET_ATTRIBUTE) {
            return true;
        }
        current = el.parent();
    }
    false
}

/// Nearest element (starting at `node`) carrying `attribute`, with its value.
pub fn closest_with_attribute<N: SpeakableNode>(node: &N, attribute: &str) -> Option<(N, String)> {
    let mut current = Some(node.clone());
    while let Some(el) = current {
        if let Some(value) = el.attribute(attribute) {
            return Some((el, value));
        }
        current = el.parent();
    }
    None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeakableTextResolver {
    depth: usize,
    max_chars: usize,
}

impl Default for SpeakableTextResolver {
    fn default() -> Self {
        Self::new(DEFAULT_ANCESTOR_DEPTH, DEFAULT_FALLBACK_MAX_CHARS)
    }
}

impl SpeakableTextResolver {
    /// `depth` counts the target itself; a depth of zero is treated as one.
    #[must_use]
    pub const fn new(depth: usize, max_chars: usize) -> Self {
        Self {
            depth: if depth == 0 { 1 } else { depth },
            max_chars,
        }
    }

    /// Text to speak for `target`, or `None` if nothing speakable was found.
    pub fn resolve<N: SpeakableNode>(&self, target: &N) -> Option<String> {
        let mut current = Some(target.clone());
        for _ in 0..self.depth {
            let Some(node) = current else {
                break;
            };
            if let Some(text) = Self::candidate(&node) {
                return Some(text);
            }
            current = node.parent();
        }
        let fallback: String = collapse_whitespace(&target.text_content())
            .chars()
            .take(self.max_chars)
            .collect();
        let fallback = fallback.trim_end().to_string();
        (!fallback.is_empty()).then_some(fallback)
    }

    fn candidate<N: SpeakableNode>(node: &N) -> Option<String> {
        Self::referenced_text(node, "aria-labelledby")
            .or_else(|| Self::referenced_text(node, "aria-describedby"))
            .or_else(|| non_empty(node.attribute("aria-label")))
            .or_else(|| {
                Self::is_interactive(node)
                    .then(|| node.text_content())
                    .and_then(|text| non_empty(Some(text)))
            })
            .or_else(|| non_empty(node.attribute("title")))
            .or_else(|| {
                (node.tag_name() == "img")
                    .then(|| node.attribute("alt"))
                    .and_then(non_empty)
            })
            .or_else(|| {
                Self::is_text_input(node)
                    .then(|| node.attribute("placeholder"))
                    .and_then(non_empty)
            })
            .or_else(|| non_empty(node.descendant_image_alt()))
    }

    fn referenced_text<N: SpeakableNode>(node: &N, relation: &str) -> Option<String> {
        let ids = node.attribute(relation)?;
        let joined = ids
            .split_whitespace()
            .filter_map(|id| node.element_by_id(id))
            .map(|el| el.text_content())
            .collect::<Vec<_>>()
            .join(" ");
        non_empty(Some(joined))
    }

    fn is_interactive<N: SpeakableNode>(node: &N) -> bool {
        let tag = node.tag_name();
        tag == "button"
            || tag == "a"
            || node
                .attribute("role")
                .is_some_and(|role| role == "button" || role == "link")
    }

    fn is_text_input<N: SpeakableNode>(node: &N) -> bool {
        match node.tag_name().as_str() {
            "textarea" => true,
            "input" => node.attribute("type").is_none_or(|kind| {
                TEXT_INPUT_TYPES
                    .iter()
                    .any(|t| t.eq_ignore_ascii_case(kind.as_str()))
            }),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_dom::MemoryDom;

    #[test]
    fn aria_label_beats_inner_text() {
        let dom = MemoryDom::new();
        let button = dom
            .append(&dom.root(), "button")
            .with_attribute("aria-label", "Submit order")
            .with_text("Go");
        assert_eq!(
            SpeakableTextResolver::default().resolve(&button).as_deref(),
            Some("Submit order")
        );
    }

    #[test]
    fn labelled_by_and_described_by_take_priority() {
        let dom = MemoryDom::new();
        let root = dom.root();
        dom.append(&root, "span")
            .with_attribute("id", "first")
            .with_text("Shipping");
        dom.append(&root, "span")
            .with_attribute("id", "second")
            .with_text("  address ");
        dom.append(&root, "p")
            .with_attribute("id", "hint")
            .with_text("Where we send it");
        let field = dom
            .append(&root, "input")
            .with_attribute("aria-labelledby", "first missing second")
            .with_attribute("aria-label", "ignored")
            .with_attribute("placeholder", "ignored too");
        let resolver = SpeakableTextResolver::default();
        assert_eq!(resolver.resolve(&field).as_deref(), Some("Shipping address"));

        let described = dom
            .append(&root, "div")
            .with_attribute("aria-describedby", "hint")
            .with_attribute("title", "later");
        assert_eq!(resolver.resolve(&described).as_deref(), Some("Where we send it"));
    }

    #[test]
    fn walks_up_to_an_interactive_ancestor() {
        let dom = MemoryDom::new();
        let link = dom
            .append(&dom.root(), "a")
            .with_attribute("href", "/cart")
            .with_text("View cart");
        let icon = dom.append(&link, "span");
        assert_eq!(
            SpeakableTextResolver::default().resolve(&icon).as_deref(),
            Some("View cart")
        );
    }

    #[test]
    fn images_inputs_and_descendant_images() {
        let dom = MemoryDom::new();
        let root = dom.root();
        let resolver = SpeakableTextResolver::new(1, 160);

        let img = dom.append(&root, "img").with_attribute("alt", "A red kettle");
        assert_eq!(resolver.resolve(&img).as_deref(), Some("A red kettle"));

        let search = dom
            .append(&root, "input")
            .with_attribute("type", "search")
            .with_attribute("placeholder", "Search recipes");
        assert_eq!(resolver.resolve(&search).as_deref(), Some("Search recipes"));

        let checkbox = dom
            .append(&root, "input")
            .with_attribute("type", "checkbox")
            .with_attribute("placeholder", "never spoken");
        assert_eq!(resolver.resolve(&checkbox), None);

        let figure = dom.append(&root, "figure");
        dom.append(&figure, "img").with_attribute("alt", "");
        dom.append(&figure, "img").with_attribute("alt", "Stew pot");
        assert_eq!(resolver.resolve(&figure).as_deref(), Some("Stew pot"));
    }

    #[test]
    fn fallback_collapses_and_truncates_target_text() {
        let dom = MemoryDom::new();
        let para = dom
            .append(&dom.root(), "p")
            .with_text("  Slow   cooked\n\n beef   stew with root vegetables ");
        let resolver = SpeakableTextResolver::new(2, 17);
        assert_eq!(resolver.resolve(&para).as_deref(), Some("Slow cooked beef"));

        let empty = dom.append(&dom.root(), "div").with_text("   ");
        assert_eq!(resolver.resolve(&empty), None);
    }

    #[test]
    fn depth_bounds_the_ancestor_walk() {
        let dom = MemoryDom::new();
        let labelled = dom
            .append(&dom.root(), "section")
            .with_attribute("aria-label", "Specials");
        let mid = dom.append(&labelled, "div");
        let leaf = dom.append(&mid, "span").with_text("Today only");
        assert_eq!(
            SpeakableTextResolver::new(3, 160).resolve(&leaf).as_deref(),
            Some("Specials")
        );
        assert_eq!(
            SpeakableTextResolver::new(2, 160).resolve(&leaf).as_deref(),
            Some("Today only")
        );
    }

    #[test]
    fn widget_membership_checks_every_ancestor() {
        let dom = MemoryDom::new();
        let panel = dom
            .append(&dom.root(), "div")
            .with_attribute(WIDGET_ATTRIBUTE, "");
        let inner = dom.append(&dom.append(&panel, "div"), "button");
        assert!(is_within_widget(&inner));
        assert!(!is_within_widget(&dom.append(&dom.root(), "p")));
    }
}
