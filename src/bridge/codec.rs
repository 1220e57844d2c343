//! Named JSON events, as dispatched across the native bridge.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::BridgeError;
use crate::session::{SessionEvent, SessionEventKind};

/// One event as it crosses the bridge: a method name plus JSON payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedEvent {
    pub name: String,
    pub payload: Value,
}

const TAG: &str = "type";

/// Decode a named payload into a session event.
///
/// The payload must be a JSON object carrying `sessionID`.
pub fn decode(name: &str, payload: Value) -> Result<SessionEvent, BridgeError> {
    if !SessionEventKind::NAMES.contains(&name) {
        return Err(BridgeError::UnknownEvent {
            name: name.to_string(),
        });
    }

    let mut object = match payload {
        Value::Object(object) => object,
        Value::Null => Map::new(),
        other => {
            return Err(BridgeError::Decode {
                name: name.to_string(),
                source: serde::de::Error::custom(format!("expected JSON object, got {other}")),
            })
        }
    };
    object.insert(TAG.to_string(), Value::String(name.to_string()));

    serde_json::from_value(Value::Object(object)).map_err(|source| BridgeError::Decode {
        name: name.to_string(),
        source,
    })
}

/// Decode a payload that is still a JSON string.
pub fn decode_str(name: &str, payload: &str) -> Result<SessionEvent, BridgeError> {
    let value = serde_json::from_str(payload).map_err(|source| BridgeError::Decode {
        name: name.to_string(),
        source,
    })?;
    decode(name, value)
}

/// Encode a session event as a named payload; inverse of [`decode`].
pub fn encode(event: &SessionEvent) -> Result<NamedEvent, BridgeError> {
    let mut value = serde_json::to_value(event).map_err(BridgeError::Encode)?;
    if let Value::Object(object) = &mut value {
        object.remove(TAG);
    }
    Ok(NamedEvent {
        name: event.kind.name().to_string(),
        payload: value,
    })
}

impl TryFrom<NamedEvent> for SessionEvent {
    type Error = BridgeError;

    fn try_from(named: NamedEvent) -> Result<Self, Self::Error> {
        decode(&named.name, named.payload)
    }
}
