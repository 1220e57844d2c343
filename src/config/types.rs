use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub return_url: ReturnUrlConfig,
}

/// Event stream settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Capacity of the inbound event queue (default: 64).
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
    /// Capacity of the folded-event and state-update broadcasts (default: 256).
    #[serde(default = "default_event_tap_capacity")]
    pub event_tap_capacity: usize,
}

/// Client return URL checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnUrlConfig {
    /// URL schemes the device can open (default: https, http, tel, mailto).
    #[serde(default = "default_allowed_schemes")]
    pub allowed_schemes: Vec<String>,
}

fn default_event_buffer() -> usize {
    64
}

fn default_event_tap_capacity() -> usize {
    256
}

fn default_allowed_schemes() -> Vec<String> {
    ["https", "http", "tel", "mailto"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            event_buffer: default_event_buffer(),
            event_tap_capacity: default_event_tap_capacity(),
        }
    }
}

impl Default for ReturnUrlConfig {
    fn default() -> Self {
        Self {
            allowed_schemes: default_allowed_schemes(),
        }
    }
}
