//! Ways the panel can be opened from the host page.
use crate::config::OverlayConfig;
use crate::input::{KeyChord, KeyInput};
use crate::resolver::{SpeakableNode, closest_with_attribute, collapse_whitespace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// The global keyboard chord.
    Shortcut,
    /// An anchor whose text names the accessibility page.
    Link,
    /// An element carrying the open attribute.
    Marker,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationTriggers {
    shortcut: KeyChord,
    phrases: Vec<String>,
    open_attribute: String,
}

impl Default for ActivationTriggers {
    fn default() -> Self {
        Self::from_config(&OverlayConfig::default())
    }
}

impl ActivationTriggers {
    #[must_use]
    pub fn from_config(config: &OverlayConfig) -> Self {
        Self {
            shortcut: config.shortcut.clone(),
            phrases: config
                .activation_phrases
                .iter()
                .map(|phrase| normalize(phrase))
                .filter(|phrase| !phrase.is_empty())
                .collect(),
            open_attribute: config.open_attribute.clone(),
        }
    }

    #[must_use]
    pub fn is_shortcut(&self, key: &KeyInput) -> bool {
        self.shortcut.matches(key)
    }

    /// Case- and whitespace-insensitive match against the activation phrases.
    #[must_use]
    pub fn matches_link_text(&self, text: &str) -> bool {
        let text = normalize(text);
        self.phrases.iter().any(|phrase| *phrase == text)
    }

    #[must_use]
    pub fn open_attribute(&self) -> &str {
        &self.open_attribute
    }

    /// Decide whether a click on `target` should open the panel.
    pub fn classify_click<N: SpeakableNode>(&self, target: &N) -> Option<Activation> {
        if closest_with_attribute(target, &self.open_attribute).is_some() {
            return Some(Activation::Marker);
        }
        let mut current = Some(target.clone());
        while let Some(node) = current {
            if node.tag_name() == "a" {
                return self
                    .matches_link_text(&node.text_content())
                    .then_some(Activation::Link);
            }
            current = node.parent();
        }
        None
    }
}

fn normalize(text: &str) -> String {
    collapse_whitespace(text).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_dom::MemoryDom;

    #[test]
    fn footer_links_match_regardless_of_case_and_spacing() {
        let triggers = ActivationTriggers::default();
        assert!(triggers.matches_link_text("  Accessibility "));
        assert!(triggers.matches_link_text("ACCESSIBILITY\n Statement"));
        assert!(!triggers.matches_link_text("Accessibility policy"));
    }

    #[test]
    fn clicks_resolve_through_ancestors() {
        let dom = MemoryDom::new();
        let root = dom.root();
        let triggers = ActivationTriggers::default();

        let link = dom
            .append(&root, "a")
            .with_attribute("href", "/accessibility")
            .with_text("Accessibility Support");
        let inner = dom.append(&link, "span");
        assert_eq!(triggers.classify_click(&inner), Some(Activation::Link));

        let other = dom.append(&root, "a").with_text("Contact");
        assert_eq!(triggers.classify_click(&other), None);

        let marker = dom
            .append(&root, "div")
            .with_attribute("data-a11y-open", "");
        let icon = dom.append(&marker, "svg");
        assert_eq!(triggers.classify_click(&icon), Some(Activation::Marker));
    }

    #[test]
    fn custom_phrases_and_attribute() {
        let config = OverlayConfig {
            activation_phrases: vec!["Reading Help".into(), "   ".into()],
            open_attribute: "data-help".into(),
            ..OverlayConfig::default()
        };
        let triggers = ActivationTriggers::from_config(&config);
        assert!(triggers.matches_link_text("reading help"));
        assert!(!triggers.matches_link_text("accessibility"));
        assert!(!triggers.matches_link_text(""));
        assert_eq!(triggers.open_attribute(), "data-help");
    }
}
