//! Hover and focus speech.
//!
//! [`SpeechSession`] owns the timing rules: hover requests are debounced
//! behind a token the host schedules a timer for, keyboard focus speaks
//! right away, and the same text for the same element is never repeated
//! back to back. Actual synthesis sits behind [`SpeechBackend`].
use std::cell::RefCell;
use std::rc::Rc;

use crate::constants::{SPEECH_OFF_PHRASE, SPEECH_ON_PHRASE, SPEECH_UNSUPPORTED};
use crate::settings::SpeechRate;

/// Platform speech synthesis.
pub trait SpeechBackend {
    fn is_available(&self) -> bool;
    /// Speak `text`, cancelling anything already in flight.
    fn speak(&mut self, text: &str, rate: f32);
    fn cancel(&mut self);
}

/// Backend for hosts without speech synthesis.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSpeech;

impl SpeechBackend for NoSpeech {
    fn is_available(&self) -> bool {
        false
    }

    fn speak(&mut self, _text: &str, _rate: f32) {}

    fn cancel(&mut self) {}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub rate: f32,
}

#[derive(Debug, Default)]
struct Transcript {
    spoken: Vec<Utterance>,
    cancels: usize,
}

/// Backend that records what would have been spoken. Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct RecordingSpeech {
    transcript: Rc<RefCell<Transcript>>,
}

impl RecordingSpeech {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn spoken(&self) -> Vec<Utterance> {
        self.transcript.borrow().spoken.clone()
    }

    #[must_use]
    pub fn texts(&self) -> Vec<String> {
        self.transcript
            .borrow()
            .spoken
            .iter()
            .map(|u| u.text.clone())
            .collect()
    }

    #[must_use]
    pub fn cancels(&self) -> usize {
        self.transcript.borrow().cancels
    }
}

impl SpeechBackend for RecordingSpeech {
    fn is_available(&self) -> bool {
        true
    }

    fn speak(&mut self, text: &str, rate: f32) {
        self.transcript.borrow_mut().spoken.push(Utterance {
            text: text.to_string(),
            rate,
        });
    }

    fn cancel(&mut self) {
        self.transcript.borrow_mut().cancels += 1;
    }
}

/// Identifies one scheduled hover request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HoverToken(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverOutcome {
    /// Host should call [`SpeechSession::fire`] with `token` after `delay_ms`.
    Scheduled { token: HoverToken, delay_ms: u32 },
    /// Same element and text are already pending.
    Deduplicated,
    /// Same element and text were the last thing spoken.
    AlreadySpoken,
    /// Speech is off.
    Ignored,
}

#[derive(Debug, Clone)]
struct Pending<T> {
    token: HoverToken,
    target: T,
    text: String,
}

#[derive(Debug, Clone)]
pub struct SpeechSession<T> {
    active: bool,
    rate: SpeechRate,
    hover_delay_ms: u32,
    next_token: u64,
    pending: Option<Pending<T>>,
    last_spoken: Option<(T, String)>,
}

impl<T: PartialEq + Clone> SpeechSession<T> {
    #[must_use]
    pub const fn new(hover_delay_ms: u32) -> Self {
        Self {
            active: false,
            rate: SpeechRate::Normal,
            hover_delay_ms,
            next_token: 0,
            pending: None,
            last_spoken: None,
        }
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub const fn rate(&self) -> SpeechRate {
        self.rate
    }

    /// Token of the hover request still waiting on its timer.
    #[must_use]
    pub fn pending_token(&self) -> Option<HoverToken> {
        self.pending.as_ref().map(|p| p.token)
    }

    /// Align with persisted preferences. Turning speech off drops any pending
    /// request and forgets what was last spoken.
    pub fn sync(&mut self, active: bool, rate: SpeechRate) {
        if !active {
            self.pending = None;
            self.last_spoken = None;
        }
        self.active = active;
        self.rate = rate;
    }

    /// Pointer arrived at `target`, whose speakable text is `text`.
    pub fn hover(&mut self, target: T, text: String) -> HoverOutcome {
        if !self.active {
            return HoverOutcome::Ignored;
        }
        if self
            .pending
            .as_ref()
            .is_some_and(|p| p.target == target && p.text == text)
        {
            return HoverOutcome::Deduplicated;
        }
        self.pending = None;
        if self.was_last_spoken(&target, &text) {
            return HoverOutcome::AlreadySpoken;
        }
        self.next_token += 1;
        let token = HoverToken(self.next_token);
        self.pending = Some(Pending {
            token,
            target,
            text,
        });
        HoverOutcome::Scheduled {
            token,
            delay_ms: self.hover_delay_ms,
        }
    }

    /// Timer for `token` elapsed. Returns the text to speak if the request
    /// was not superseded.
    pub fn fire(&mut self, token: HoverToken) -> Option<String> {
        if self.pending_token() != Some(token) {
            return None;
        }
        let pending = self.pending.take()?;
        self.last_spoken = Some((pending.target, pending.text.clone()));
        Some(pending.text)
    }

    /// Keyboard focus moved to `target`. Speaks immediately and supersedes
    /// any pending hover.
    pub fn focus(&mut self, target: T, text: String) -> Option<String> {
        if !self.active {
            return None;
        }
        self.pending = None;
        if self.was_last_spoken(&target, &text) {
            return None;
        }
        self.last_spoken = Some((target, text.clone()));
        Some(text)
    }

    pub fn cancel_pending(&mut self) {
        self.pending = None;
    }

    fn was_last_spoken(&self, target: &T, text: &str) -> bool {
        self.last_spoken
            .as_ref()
            .is_some_and(|(last, spoken)| last == target && spoken == text)
    }
}

/// Status line for the speech toggle.
#[must_use]
pub const fn toggle_phrase(available: bool, active: bool) -> &'static str {
    match (available, active) {
        (false, _) => SPEECH_UNSUPPORTED,
        (true, true) => SPEECH_ON_PHRASE,
        (true, false) => SPEECH_OFF_PHRASE,
    }
}

/// Spoken confirmation after the rate changes.
#[must_use]
pub fn rate_phrase(rate: SpeechRate) -> String {
    format!("Speech rate {}", rate.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> SpeechSession<u32> {
        let mut session = SpeechSession::new(220);
        session.sync(true, SpeechRate::Normal);
        session
    }

    #[test]
    fn inactive_session_ignores_everything() {
        let mut session = SpeechSession::<u32>::new(220);
        assert_eq!(session.hover(1, "Menu".into()), HoverOutcome::Ignored);
        assert_eq!(session.focus(1, "Menu".into()), None);
        assert_eq!(session.pending_token(), None);
    }

    #[test]
    fn hover_schedules_then_fires_once() {
        let mut session = session();
        let HoverOutcome::Scheduled { token, delay_ms } = session.hover(1, "Menu".into()) else {
            panic!("expected a scheduled hover");
        };
        assert_eq!(delay_ms, 220);
        assert_eq!(session.hover(1, "Menu".into()), HoverOutcome::Deduplicated);
        assert_eq!(session.fire(token).as_deref(), Some("Menu"));
        assert_eq!(session.fire(token), None);
        assert_eq!(session.hover(1, "Menu".into()), HoverOutcome::AlreadySpoken);
    }

    #[test]
    fn newer_hover_supersedes_pending_one() {
        let mut session = session();
        let HoverOutcome::Scheduled { token: first, .. } = session.hover(1, "Menu".into()) else {
            panic!("expected a scheduled hover");
        };
        let HoverOutcome::Scheduled { token: second, .. } = session.hover(2, "Cart".into()) else {
            panic!("expected a scheduled hover");
        };
        assert_ne!(first, second);
        assert_eq!(session.fire(first), None);
        assert_eq!(session.fire(second).as_deref(), Some("Cart"));
    }

    #[test]
    fn returning_to_last_spoken_cancels_pending() {
        let mut session = session();
        let HoverOutcome::Scheduled { token, .. } = session.hover(1, "Menu".into()) else {
            panic!("expected a scheduled hover");
        };
        session.fire(token);
        session.hover(2, "Cart".into());
        assert_eq!(session.hover(1, "Menu".into()), HoverOutcome::AlreadySpoken);
        assert_eq!(session.pending_token(), None);
    }

    #[test]
    fn focus_speaks_immediately_and_dedupes() {
        let mut session = session();
        session.hover(2, "Cart".into());
        assert_eq!(session.focus(1, "Menu".into()).as_deref(), Some("Menu"));
        assert_eq!(session.pending_token(), None);
        assert_eq!(session.focus(1, "Menu".into()), None);
        assert_eq!(session.focus(1, "Menu, expanded".into()).as_deref(), Some("Menu, expanded"));
    }

    #[test]
    fn disabling_forgets_history() {
        let mut session = session();
        session.focus(1, "Menu".into());
        session.sync(false, SpeechRate::Fast);
        session.sync(true, SpeechRate::Fast);
        assert_eq!(session.rate(), SpeechRate::Fast);
        assert_eq!(session.focus(1, "Menu".into()).as_deref(), Some("Menu"));
    }

    #[test]
    fn phrases() {
        assert_eq!(toggle_phrase(false, true), SPEECH_UNSUPPORTED);
        assert_eq!(toggle_phrase(true, true), SPEECH_ON_PHRASE);
        assert_eq!(rate_phrase(SpeechRate::Slow), "Speech rate slow");
    }
}
