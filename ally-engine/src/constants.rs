//! Centralized keys, attribute names, and tuning constants for the overlay.
//!
//! Storage keys and effect names are part of the external contract with the
//! host page and its stylesheet, so they live here rather than next to the
//! code that happens to use them.

// Storage keys ------------------------------------------------------------
pub const STORAGE_PREFIX: &str = "a11y.";
pub const KEY_PANEL_SIDE: &str = "a11y.panel-side";
pub const KEY_SPEECH_ACTIVE: &str = "a11y.speech-active";
pub const KEY_SPEECH_RATE: &str = "a11y.speech-rate";
pub const KEY_ACTIVE_PROFILE: &str = "a11y.active-profile";
pub const KEY_PROFILE_BACKUP: &str = "a11y.profile-backup";

pub const SCALAR_KEYS: [&str; 5] = [
    KEY_PANEL_SIDE,
    KEY_SPEECH_ACTIVE,
    KEY_SPEECH_RATE,
    KEY_ACTIVE_PROFILE,
    KEY_PROFILE_BACKUP,
];

// Effect names --------------------------------------------------------------
pub const EFFECT_PREFIX: &str = "a11y-";

// Coupled features ----------------------------------------------------------
pub const REDUCE_MOTION: &str = "reduce-motion";
pub const PAUSE_ROTATION: &str = "pause-rotation";

// DOM markers ---------------------------------------------------------------
pub const WIDGET_ATTRIBUTE: &str = "data-a11y-widget";
pub const OPEN_ATTRIBUTE: &str = "data-a11y-open";
pub const CONTROL_ATTRIBUTE: &str = "data-a11y-control";

// Speech tuning -------------------------------------------------------------
pub const DEFAULT_HOVER_DELAY_MS: u32 = 220;
pub const DEFAULT_ANCESTOR_DEPTH: usize = 5;
pub const DEFAULT_FALLBACK_MAX_CHARS: usize = 160;
pub const MAX_ANCESTOR_DEPTH: usize = 16;
pub const MAX_HOVER_DELAY_MS: u32 = 2_000;

// Status phrases ------------------------------------------------------------
pub const SPEECH_UNSUPPORTED: &str = "Speech is not supported in this browser";
pub const SPEECH_ON_PHRASE: &str = "Hover speech on";
pub const SPEECH_OFF_PHRASE: &str = "Hover speech off";
pub const RESET_PHRASE: &str = "All settings reset";

// Activation ----------------------------------------------------------------
pub const DEFAULT_ACTIVATION_PHRASES: [&str; 3] = [
    "accessibility",
    "accessibility support",
    "accessibility statement",
];
