//! Per-session state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::return_url::ClientReturnUrl;
use crate::attribute::{Attribute, AttributeIdentifier, ConCon, ConDisCon, TranslatedValue};
use crate::irma::Credential;
use crate::mvi::State;

/// Protocol phase of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionStatus {
    /// No event has touched this session yet.
    #[default]
    Uninitialized,
    Initialized,
    Pairing,
    Communicating,
    RequestIssuancePermission,
    RequestDisclosurePermission,
    RequestPin,
    Success,
    Canceled,
    Error,
}

impl SessionStatus {
    /// Map a status code from a generic backend status update.
    pub fn from_backend_code(code: &str) -> Option<Self> {
        match code {
            "initialized" => Some(Self::Initialized),
            "connected" | "communicating" => Some(Self::Communicating),
            "pairing" => Some(Self::Pairing),
            "done" | "success" => Some(Self::Success),
            "cancelled" | "canceled" => Some(Self::Canceled),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Canceled | Self::Error)
    }
}

/// Flow kind announced by the session request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    Disclosing,
    Signing,
    Issuing,
    Redirect,
}

/// Identity of the party on the other end of the session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestorInfo {
    pub id: String,
    pub name: TranslatedValue,
    #[serde(default)]
    pub industry: Option<TranslatedValue>,
    #[serde(default)]
    pub logo_path: Option<String>,
    /// Not (yet) confirmed by the backend.
    #[serde(default)]
    pub unverified: bool,
}

impl RequestorInfo {
    /// Stand-in identity derived from the session URL host.
    pub fn provisional(host: &str) -> Self {
        Self {
            id: host.to_string(),
            name: TranslatedValue::untranslated(host),
            industry: None,
            logo_path: None,
            unverified: true,
        }
    }

    pub fn from_session_url(url: &str) -> Option<Self> {
        let url = reqwest::Url::parse(url).ok()?;
        url.host_str()
            .filter(|host| !host.is_empty())
            .map(Self::provisional)
    }
}

/// Structured failure reported by the backend; surfaced verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionError {
    pub error_type: String,
    #[serde(default)]
    pub wrapped_error: String,
    #[serde(default)]
    pub info: Option<String>,
    #[serde(default)]
    pub stack: Option<String>,
    #[serde(default)]
    pub remote_status: Option<u16>,
    #[serde(default)]
    pub remote_error: Option<serde_json::Value>,
}

/// Everything known about one session.
///
/// Immutable by convention: every transition builds a new value with
/// struct update syntax.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub status: SessionStatus,
    pub server_name: Option<RequestorInfo>,
    pub session_type: Option<SessionType>,
    pub client_return_url: Option<ClientReturnUrl>,
    pub continue_on_second_device: bool,
    pub in_app_credential: Option<String>,
    pub pairing_code: Option<String>,
    pub is_signature_session: Option<bool>,
    pub signed_message: Option<String>,
    pub disclosures_candidates: Option<ConDisCon<Attribute>>,
    /// Chosen con per discon; same length as the candidate tree.
    pub disclosure_indices: Option<Vec<usize>>,
    pub disclosure_choices: Option<ConCon<AttributeIdentifier>>,
    pub disclosures_labels: BTreeMap<usize, TranslatedValue>,
    pub issued_credentials: Option<Vec<Credential>>,
    pub can_be_finished: bool,
    pub satisfiable: Option<bool>,
    pub error: Option<SessionError>,
}

impl State for SessionState {}

impl SessionState {
    /// Waiting for the holder to approve a disclosure.
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::RequestDisclosurePermission
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }
}
