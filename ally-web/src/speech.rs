//! Speech synthesis through `window.speechSynthesis`.
use ally_engine::SpeechBackend;
use web_sys::{SpeechSynthesis, SpeechSynthesisUtterance};

use crate::dom::{self, js_error_message};

#[derive(Debug, Clone, Default)]
pub struct WebSpeech {
    synth: Option<SpeechSynthesis>,
}

impl WebSpeech {
    #[must_use]
    pub fn detect() -> Self {
        let synth = dom::window()
            .ok()
            .and_then(|win| win.speech_synthesis().ok());
        if synth.is_none() {
            log::info!("speech synthesis not supported");
        }
        Self { synth }
    }
}

impl SpeechBackend for WebSpeech {
    fn is_available(&self) -> bool {
        self.synth.is_some()
    }

    fn speak(&mut self, text: &str, rate: f32) {
        let Some(synth) = &self.synth else {
            return;
        };
        synth.cancel();
        match SpeechSynthesisUtterance::new_with_text(text) {
            Ok(utterance) => {
                utterance.set_rate(rate);
                synth.speak(&utterance);
            }
            Err(err) => log::warn!("utterance rejected: {}", js_error_message(&err)),
        }
    }

    fn cancel(&mut self) {
        if let Some(synth) = &self.synth {
            synth.cancel();
        }
    }
}
