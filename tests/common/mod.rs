//! Shared test fixtures: scheme configuration, wallet, and event builders.

#![allow(dead_code, unused_imports)]

use std::sync::Arc;

use async_trait::async_trait;
use irma_session::attribute::{DisclosureCandidate, RawCandidates, TranslatedValue};
use irma_session::irma::{
    AttributeType, CredentialType, Credentials, IrmaConfiguration, RawCredential, Snapshot,
};
use irma_session::session::{
    ClientReturnUrl, Collaborators, FoldContext, RequestorInfo, ReturnUrlValidator,
    SessionEvent, SessionEventKind, SessionPointer, SessionType,
};
use parking_lot::Mutex;

/// Obtainable, and present in the wallet.
pub const PERSONAL: &str = "pbdf.gemeente.personalData";
pub const PERSONAL_HASH: &str = "personal-hash";
/// Obtainable, not in the wallet.
pub const EMAIL: &str = "pbdf.sidn-pbdf.email";
/// Not obtainable, not in the wallet.
pub const PASSPORT: &str = "pbdf.gemeente.passport";

pub fn configuration() -> IrmaConfiguration {
    let mut config = IrmaConfiguration::default();
    for (id, issue_url) in [
        (PERSONAL, Some("https://services.nijmegen.nl/irma/gemeente/start")),
        (EMAIL, Some("https://privacybydesign.foundation/myirma/")),
        (PASSPORT, None),
    ] {
        config.credential_types.insert(
            id.to_string(),
            CredentialType {
                full_id: id.to_string(),
                name: TranslatedValue::untranslated(id),
                issue_url: issue_url.map(TranslatedValue::untranslated),
            },
        );
    }
    for (attr, index) in [("fullname", 0), ("over18", 1), ("email", 0), ("number", 0)] {
        let credential = match attr {
            "email" => EMAIL,
            "number" => PASSPORT,
            _ => PERSONAL,
        };
        let full_id = format!("{credential}.{attr}");
        config.attribute_types.insert(
            full_id.clone(),
            AttributeType {
                full_id,
                display_index: Some(index),
                ..AttributeType::default()
            },
        );
    }
    config
}

pub fn raw_personal_credential() -> RawCredential {
    RawCredential {
        id: PERSONAL.to_string(),
        hash: PERSONAL_HASH.to_string(),
        attributes: [
            (format!("{PERSONAL}.fullname"), raw_value("Ada Lovelace")),
            (format!("{PERSONAL}.over18"), raw_value("yes")),
        ]
        .into_iter()
        .collect(),
        ..RawCredential::default()
    }
}

pub fn wallet(config: &IrmaConfiguration) -> Credentials {
    Credentials::from_raw(&[raw_personal_credential()], config)
}

pub fn raw_value(raw: &str) -> TranslatedValue {
    TranslatedValue::new(
        [("rawvalue", raw), ("en", raw), ("nl", raw)]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

/// Candidate backed by the personal data credential in the wallet.
pub fn owned(attr: &str, raw: &str) -> DisclosureCandidate {
    DisclosureCandidate {
        attribute_type: format!("{PERSONAL}.{attr}"),
        credential_hash: PERSONAL_HASH.to_string(),
        value: Some(raw_value(raw)),
        ..DisclosureCandidate::default()
    }
}

/// Candidate for a credential the holder does not have.
pub fn missing(credential: &str, attr: &str) -> DisclosureCandidate {
    DisclosureCandidate {
        attribute_type: format!("{credential}.{attr}"),
        ..DisclosureCandidate::default()
    }
}

pub fn context() -> FoldContext {
    let config = configuration();
    FoldContext {
        credentials: Arc::new(wallet(&config)),
        configuration: Arc::new(config),
        validated_return_url: None,
    }
}

pub fn context_with_return_url(url: &str) -> FoldContext {
    FoldContext {
        validated_return_url: ClientReturnUrl::parse(url),
        ..context()
    }
}

pub fn requestor(name: &str) -> RequestorInfo {
    RequestorInfo {
        id: name.to_lowercase(),
        name: TranslatedValue::untranslated(name),
        ..RequestorInfo::default()
    }
}

pub fn new_session(url: &str, client_return_url: Option<&str>) -> SessionEventKind {
    SessionEventKind::NewSession {
        request: SessionPointer {
            u: url.to_string(),
            irmaqr: SessionType::Disclosing,
        },
        continue_on_second_device: false,
        in_app_credential: None,
        client_return_url: client_return_url.map(str::to_string),
    }
}

pub fn issuance_request(candidates: RawCandidates) -> SessionEventKind {
    SessionEventKind::RequestIssuancePermission {
        server_name: requestor("Gemeente"),
        satisfiable: true,
        issued_credentials: vec![raw_personal_credential()],
        disclosures_labels: Default::default(),
        disclosures_candidates: candidates,
    }
}

pub fn verification_request(candidates: RawCandidates) -> SessionEventKind {
    SessionEventKind::RequestVerificationPermission {
        server_name: requestor("Webshop"),
        satisfiable: true,
        is_signature_session: false,
        signed_message: None,
        disclosures_labels: Default::default(),
        disclosures_candidates: candidates,
    }
}

pub fn event(session_id: u32, kind: SessionEventKind) -> SessionEvent {
    SessionEvent::new(session_id, kind)
}

/// Return URL oracle with a fixed answer that records what it was asked.
pub struct RecordingValidator {
    accept: bool,
    pub seen: Mutex<Vec<String>>,
}

impl RecordingValidator {
    pub fn new(accept: bool) -> Arc<Self> {
        Arc::new(Self {
            accept,
            seen: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ReturnUrlValidator for RecordingValidator {
    async fn can_open(&self, url: &ClientReturnUrl) -> bool {
        self.seen.lock().push(url.to_string());
        self.accept
    }
}

pub fn collaborators(validator: Arc<dyn ReturnUrlValidator>) -> Collaborators {
    let config = configuration();
    Collaborators {
        credentials: Snapshot::fixed(wallet(&config)),
        configuration: Snapshot::fixed(config),
        return_url_validator: validator,
    }
}
