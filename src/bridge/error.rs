use thiserror::Error;

/// Errors at the event/command boundary.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Unknown event '{name}'")]
    UnknownEvent { name: String },

    #[error("Failed to decode '{name}' payload: {source}")]
    Decode {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode event: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Session event stream disconnected")]
    Disconnected,
}
