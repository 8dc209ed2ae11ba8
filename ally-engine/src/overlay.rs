//! The overlay context object.
//!
//! [`Overlay`] owns every piece of per-page state: the preference engine,
//! the speech session, the panel controller, and the activation triggers.
//! Hosts keep exactly one and route DOM events into it.
use crate::config::OverlayConfig;
use crate::constants::{CONTROL_ATTRIBUTE, RESET_PHRASE};
use crate::controls::{Action, Binding, ControlDescriptor, ControlState, descriptors};
use crate::dialog::{DialogController, DialogHost, KeyDisposition};
use crate::effects::EffectSink;
use crate::engine::PreferenceEngine;
use crate::error::PreferenceError;
use crate::input::KeyInput;
use crate::profiles::ProfileCatalog;
use crate::registry::{FeatureKind, Registry};
use crate::resolver::{
    SpeakableNode, SpeakableTextResolver, closest_with_attribute, is_within_widget,
};
use crate::settings::SpeechRate;
use crate::speech::{
    HoverOutcome, HoverToken, SpeechBackend, SpeechSession, rate_phrase, toggle_phrase,
};
use crate::store::KeyValueStore;
use crate::triggers::{Activation, ActivationTriggers};

/// What a control activation asks the host to show.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ControlResponse {
    /// Message for the panel's live region.
    pub status: Option<String>,
    /// The panel closed as part of the activation.
    pub closed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// A page trigger fired; `open` is the resulting panel state.
    Activated { activation: Activation, open: bool },
    Control(ControlResponse),
    Ignored,
}

pub struct Overlay<S, E, B, N> {
    engine: PreferenceEngine<S, E>,
    speech: SpeechSession<N>,
    backend: B,
    resolver: SpeakableTextResolver,
    dialog: DialogController<N>,
    triggers: ActivationTriggers,
}

impl<S, E, B, N> Overlay<S, E, B, N>
where
    S: KeyValueStore,
    E: EffectSink,
    B: SpeechBackend,
    N: SpeakableNode,
{
    /// Overlay with the standard features and profiles.
    pub fn new(config: &OverlayConfig, store: S, sink: E, speech: B) -> Self {
        Self::with_catalogs(
            config,
            Registry::standard(),
            ProfileCatalog::standard(),
            store,
            sink,
            speech,
        )
    }

    pub fn with_catalogs(
        config: &OverlayConfig,
        registry: Registry,
        profiles: ProfileCatalog,
        store: S,
        sink: E,
        speech: B,
    ) -> Self {
        Self {
            engine: PreferenceEngine::new(registry, profiles, store, sink)
                .with_switch_policy(config.switch_policy),
            speech: SpeechSession::new(config.hover_delay_ms),
            backend: speech,
            resolver: SpeakableTextResolver::new(config.ancestor_depth, config.fallback_max_chars),
            dialog: DialogController::new(),
            triggers: ActivationTriggers::from_config(config),
        }
    }

    /// Load persisted preferences and apply them to the page.
    pub fn boot(&mut self) {
        self.engine.hydrate();
        self.engine.apply_all();
        self.sync_speech();
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.dialog.is_open()
    }

    /// Open the panel, re-reading storage first so that changes made in
    /// another tab are picked up.
    pub fn open<H: DialogHost<Element = N>>(&mut self, host: &mut H) -> bool {
        if self.dialog.is_open() {
            return false;
        }
        self.boot();
        self.dialog.open(host)
    }

    pub fn close<H: DialogHost<Element = N>>(&mut self, host: &mut H) -> bool {
        self.dialog.close(host)
    }

    pub fn toggle<H: DialogHost<Element = N>>(&mut self, host: &mut H) -> bool {
        if self.dialog.is_open() {
            self.close(host);
        } else {
            self.open(host);
        }
        self.dialog.is_open()
    }

    /// Persist everything, then close.
    pub fn save<H: DialogHost<Element = N>>(&mut self, host: &mut H) -> bool {
        self.engine.flush();
        self.close(host)
    }

    /// Restore every default and silence speech.
    pub fn reset(&mut self) {
        self.engine.reset();
        self.backend.cancel();
        self.sync_speech();
    }

    /// Document-level keydown: the shortcut first, then the panel's own keys.
    pub fn handle_key<H: DialogHost<Element = N>>(
        &mut self,
        host: &mut H,
        key: &KeyInput,
    ) -> KeyDisposition {
        if self.handle_shortcut(host, key) {
            return KeyDisposition::Handled;
        }
        self.handle_dialog_key(host, key)
    }

    /// Toggle the panel if `key` is the configured chord.
    pub fn handle_shortcut<H: DialogHost<Element = N>>(
        &mut self,
        host: &mut H,
        key: &KeyInput,
    ) -> bool {
        if !self.triggers.is_shortcut(key) {
            return false;
        }
        self.toggle(host);
        true
    }

    /// Escape and Tab handling while the panel is open.
    pub fn handle_dialog_key<H: DialogHost<Element = N>>(
        &mut self,
        host: &mut H,
        key: &KeyInput,
    ) -> KeyDisposition {
        self.dialog.handle_key(host, key)
    }

    /// Document-level click. Controls inside the panel dispatch by id; page
    /// links open the panel; open markers toggle it.
    pub fn handle_click<H: DialogHost<Element = N>>(
        &mut self,
        host: &mut H,
        target: &N,
    ) -> ClickOutcome {
        if is_within_widget(target)
            && let Some((_, id)) = closest_with_attribute(target, CONTROL_ATTRIBUTE)
        {
            return match self.activate_control(host, &id) {
                Ok(response) => ClickOutcome::Control(response),
                Err(err) => {
                    log::warn!("control click ignored: {err}");
                    ClickOutcome::Ignored
                }
            };
        }
        match self.triggers.classify_click(target) {
            Some(Activation::Marker) => ClickOutcome::Activated {
                activation: Activation::Marker,
                open: self.toggle(host),
            },
            Some(activation) => {
                self.open(host);
                ClickOutcome::Activated {
                    activation,
                    open: self.dialog.is_open(),
                }
            }
            None => ClickOutcome::Ignored,
        }
    }

    /// Pointer pressed somewhere on the page. Presses on any trigger that
    /// opens the panel leave it alone; the click that follows decides.
    pub fn handle_pointer_down<H: DialogHost<Element = N>>(
        &mut self,
        host: &mut H,
        target: &N,
    ) -> bool {
        if self.triggers.classify_click(target).is_some() {
            return false;
        }
        self.dialog.handle_pointer_down(host, target)
    }

    #[must_use]
    pub fn controls(&self) -> Vec<ControlDescriptor> {
        descriptors(self.engine.registry(), self.engine.profiles())
    }

    /// Current presentation of control `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` does not name a control.
    pub fn control_state(&self, id: &str) -> Result<ControlState, PreferenceError> {
        let binding = Binding::parse(id, self.engine.registry(), self.engine.profiles())?;
        Ok(ControlState::describe(
            binding,
            self.engine.registry(),
            self.engine.profiles(),
            self.engine.state(),
        ))
    }

    /// Run the action bound to control `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` does not name a control.
    pub fn activate_control<H: DialogHost<Element = N>>(
        &mut self,
        host: &mut H,
        id: &str,
    ) -> Result<ControlResponse, PreferenceError> {
        let binding = Binding::parse(id, self.engine.registry(), self.engine.profiles())?;
        let mut response = ControlResponse::default();
        match binding {
            Binding::Feature(key) => {
                let feature = *self.engine.registry().require(key)?;
                match feature.kind {
                    FeatureKind::Toggle => {
                        self.engine.toggle(key)?;
                    }
                    FeatureKind::Leveled { .. } => {
                        self.engine.cycle_level(key)?;
                    }
                    FeatureKind::Palette { .. } => {
                        return Err(PreferenceError::KindMismatch {
                            key: key.to_string(),
                            expected: feature.kind.label(),
                        });
                    }
                }
            }
            Binding::Swatch { feature, index } => {
                self.engine.select_swatch(feature, index)?;
            }
            Binding::Profile(id) => {
                self.engine.toggle_profile(id)?;
            }
            Binding::PanelSide => {
                self.engine.toggle_panel_side();
            }
            Binding::SpeechEnabled => {
                let enable = !self.engine.state().speech_enabled;
                response.status = Some(self.set_speech_enabled(enable).to_string());
            }
            Binding::SpeechRate => {
                let rate = self.engine.state().speech_rate.next();
                self.set_speech_rate(rate);
                response.status = Some(rate_phrase(rate));
            }
            Binding::Action(Action::Reset) => {
                self.reset();
                response.status = Some(RESET_PHRASE.to_string());
            }
            Binding::Action(Action::Save) => response.closed = self.save(host),
            Binding::Action(Action::Close) => response.closed = self.close(host),
        }
        Ok(response)
    }

    /// Turn hover speech on or off. Returns the status line to announce.
    /// Without a speech backend the preference is still saved, silently.
    pub fn set_speech_enabled(&mut self, enabled: bool) -> &'static str {
        let available = self.backend.is_available();
        if enabled && !available {
            log::warn!("speech synthesis unavailable; preference kept without audio");
        }
        self.engine.set_speech_enabled(enabled);
        if !enabled {
            self.backend.cancel();
        }
        self.sync_speech();
        let phrase = toggle_phrase(available, enabled);
        if enabled {
            self.speak(phrase);
        }
        phrase
    }

    /// Change the speaking rate, confirming it aloud when speech is on.
    pub fn set_speech_rate(&mut self, rate: SpeechRate) {
        self.engine.set_speech_rate(rate);
        self.sync_speech();
        if self.speech.is_active() {
            self.speak(&rate_phrase(rate));
        }
    }

    /// Pointer entered `target`. The host schedules a timer for
    /// [`HoverOutcome::Scheduled`] and calls [`Self::fire_hover`] when it
    /// elapses.
    pub fn pointer_over(&mut self, target: &N) -> HoverOutcome {
        if !self.speech.is_active() {
            return HoverOutcome::Ignored;
        }
        if is_within_widget(target) {
            self.speech.cancel_pending();
            return HoverOutcome::Ignored;
        }
        match self.resolver.resolve(target) {
            Some(text) => self.speech.hover(target.clone(), text),
            None => HoverOutcome::Ignored,
        }
    }

    /// Hover timer elapsed. Returns what was spoken, if anything.
    pub fn fire_hover(&mut self, token: HoverToken) -> Option<String> {
        let text = self.speech.fire(token)?;
        self.speak(&text);
        Some(text)
    }

    /// Keyboard focus landed on `target`. Speaks immediately.
    pub fn focus_in(&mut self, target: &N) -> Option<String> {
        if !self.speech.is_active() || is_within_widget(target) {
            return None;
        }
        let text = self.resolver.resolve(target)?;
        let text = self.speech.focus(target.clone(), text)?;
        self.speak(&text);
        Some(text)
    }

    #[must_use]
    pub fn pending_hover(&self) -> Option<HoverToken> {
        self.speech.pending_token()
    }

    #[must_use]
    pub const fn engine(&self) -> &PreferenceEngine<S, E> {
        &self.engine
    }

    pub const fn engine_mut(&mut self) -> &mut PreferenceEngine<S, E> {
        &mut self.engine
    }

    #[must_use]
    pub const fn triggers(&self) -> &ActivationTriggers {
        &self.triggers
    }

    fn speak(&mut self, text: &str) {
        if self.backend.is_available() {
            self.backend
                .speak(text, self.engine.state().speech_rate.multiplier());
        }
    }

    fn sync_speech(&mut self) {
        let state = self.engine.state();
        self.speech.sync(
            state.speech_enabled && self.backend.is_available(),
            state.speech_rate,
        );
    }
}
