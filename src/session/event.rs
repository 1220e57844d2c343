//! Protocol events, from the backend and from the client.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::state::{RequestorInfo, SessionError, SessionType};
use crate::attribute::{AttributeIdentifier, ConCon, RawCandidates, TranslatedValue};
use crate::irma::RawCredential;
use crate::mvi::Intent;

/// Key scoping all events and state to one protocol session.
pub type SessionId = u32;

/// What the holder scanned or was handed to start a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPointer {
    /// Session URL at the requestor's server.
    pub u: String,
    pub irmaqr: SessionType,
}

/// An event tagged with the session it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEvent {
    #[serde(rename = "sessionID")]
    pub session_id: SessionId,
    #[serde(flatten)]
    pub kind: SessionEventKind,
}

impl SessionEvent {
    pub fn new(session_id: SessionId, kind: SessionEventKind) -> Self {
        Self { session_id, kind }
    }
}

/// Every kind of event that can appear on the session event stream.
///
/// The serde tag doubles as the event name on the bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEventKind {
    #[serde(rename = "NewSessionEvent", rename_all = "camelCase")]
    NewSession {
        request: SessionPointer,
        #[serde(default)]
        continue_on_second_device: bool,
        #[serde(default)]
        in_app_credential: Option<String>,
        #[serde(default, rename = "clientReturnURL")]
        client_return_url: Option<String>,
    },

    #[serde(rename = "FailureSessionEvent")]
    Failure { error: SessionError },

    #[serde(rename = "StatusUpdateSessionEvent")]
    StatusUpdate {
        #[serde(default)]
        action: Option<String>,
        status: String,
    },

    #[serde(rename = "ClientReturnURLSetSessionEvent")]
    ClientReturnUrlSet {
        #[serde(rename = "clientReturnURL")]
        client_return_url: String,
    },

    #[serde(rename = "PairingRequiredSessionEvent", rename_all = "camelCase")]
    PairingRequired { pairing_code: String },

    #[serde(rename = "RequestIssuancePermissionSessionEvent", rename_all = "camelCase")]
    RequestIssuancePermission {
        server_name: RequestorInfo,
        satisfiable: bool,
        #[serde(default)]
        issued_credentials: Vec<RawCredential>,
        /// Keyed by discon position, as a decimal string.
        #[serde(default)]
        disclosures_labels: BTreeMap<String, TranslatedValue>,
        #[serde(default)]
        disclosures_candidates: RawCandidates,
    },

    #[serde(rename = "RequestVerificationPermissionSessionEvent", rename_all = "camelCase")]
    RequestVerificationPermission {
        server_name: RequestorInfo,
        satisfiable: bool,
        #[serde(default)]
        is_signature_session: bool,
        #[serde(default)]
        signed_message: Option<String>,
        #[serde(default)]
        disclosures_labels: BTreeMap<String, TranslatedValue>,
        #[serde(default)]
        disclosures_candidates: RawCandidates,
    },

    #[serde(rename = "ContinueToIssuanceEvent")]
    ContinueToIssuance,

    #[serde(rename = "DisclosureChoiceUpdateSessionEvent", rename_all = "camelCase")]
    DisclosureChoiceUpdate { discon_index: usize, con_index: usize },

    #[serde(rename = "SuccessSessionEvent")]
    Success,

    #[serde(rename = "CanceledSessionEvent")]
    Canceled,

    #[serde(rename = "RequestPinSessionEvent", rename_all = "camelCase")]
    RequestPin {
        #[serde(default)]
        remaining_attempts: Option<i32>,
    },

    #[serde(rename = "RespondPermissionEvent", rename_all = "camelCase")]
    RespondPermission {
        proceed: bool,
        #[serde(default)]
        disclosure_choices: Option<ConCon<AttributeIdentifier>>,
    },

    #[serde(rename = "RespondPinEvent")]
    RespondPin {
        proceed: bool,
        #[serde(default)]
        pin: Option<String>,
    },

    #[serde(rename = "DismissSessionEvent")]
    Dismiss,
}

impl Intent for SessionEventKind {}

impl SessionEventKind {
    /// Bridge name of this event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NewSession { .. } => "NewSessionEvent",
            Self::Failure { .. } => "FailureSessionEvent",
            Self::StatusUpdate { .. } => "StatusUpdateSessionEvent",
            Self::ClientReturnUrlSet { .. } => "ClientReturnURLSetSessionEvent",
            Self::PairingRequired { .. } => "PairingRequiredSessionEvent",
            Self::RequestIssuancePermission { .. } => "RequestIssuancePermissionSessionEvent",
            Self::RequestVerificationPermission { .. } => {
                "RequestVerificationPermissionSessionEvent"
            }
            Self::ContinueToIssuance => "ContinueToIssuanceEvent",
            Self::DisclosureChoiceUpdate { .. } => "DisclosureChoiceUpdateSessionEvent",
            Self::Success => "SuccessSessionEvent",
            Self::Canceled => "CanceledSessionEvent",
            Self::RequestPin { .. } => "RequestPinSessionEvent",
            Self::RespondPermission { .. } => "RespondPermissionEvent",
            Self::RespondPin { .. } => "RespondPinEvent",
            Self::Dismiss => "DismissSessionEvent",
        }
    }

    /// Every name the bridge accepts.
    pub const NAMES: [&'static str; 15] = [
        "NewSessionEvent",
        "FailureSessionEvent",
        "StatusUpdateSessionEvent",
        "ClientReturnURLSetSessionEvent",
        "PairingRequiredSessionEvent",
        "RequestIssuancePermissionSessionEvent",
        "RequestVerificationPermissionSessionEvent",
        "ContinueToIssuanceEvent",
        "DisclosureChoiceUpdateSessionEvent",
        "SuccessSessionEvent",
        "CanceledSessionEvent",
        "RequestPinSessionEvent",
        "RespondPermissionEvent",
        "RespondPinEvent",
        "DismissSessionEvent",
    ];

    /// Return URL carried by this event, if it carries one.
    pub fn client_return_url(&self) -> Option<&str> {
        match self {
            Self::NewSession {
                client_return_url, ..
            } => client_return_url.as_deref(),
            Self::ClientReturnUrlSet { client_return_url } => Some(client_return_url),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_flattened_tagged_event() {
        let json = r#"{
            "type": "DisclosureChoiceUpdateSessionEvent",
            "sessionID": 7,
            "disconIndex": 1,
            "conIndex": 2
        }"#;
        let event: SessionEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.session_id, 7);
        assert_eq!(
            event.kind,
            SessionEventKind::DisclosureChoiceUpdate {
                discon_index: 1,
                con_index: 2
            }
        );
    }

    #[test]
    fn unit_events_carry_only_type_and_session() {
        let event = SessionEvent::new(3, SessionEventKind::Success);
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"sessionID": 3, "type": "SuccessSessionEvent"})
        );
    }

    #[test]
    fn name_matches_serde_tag() {
        let kinds = [
            SessionEventKind::ContinueToIssuance,
            SessionEventKind::Canceled,
            SessionEventKind::Dismiss,
            SessionEventKind::PairingRequired {
                pairing_code: "1234".to_string(),
            },
            SessionEventKind::ClientReturnUrlSet {
                client_return_url: "https://shop.example".to_string(),
            },
        ];
        for kind in kinds {
            let value = serde_json::to_value(SessionEvent::new(1, kind.clone())).unwrap();
            assert_eq!(value["type"], kind.name());
            assert!(SessionEventKind::NAMES.contains(&kind.name()));
        }
    }

    #[test]
    fn only_url_events_carry_return_urls() {
        let set = SessionEventKind::ClientReturnUrlSet {
            client_return_url: "tel:112".to_string(),
        };
        assert_eq!(set.client_return_url(), Some("tel:112"));
        assert_eq!(SessionEventKind::Success.client_return_url(), None);
    }
}
