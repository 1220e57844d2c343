//! Raw disclosure candidates as delivered by the backend.

use serde::{Deserialize, Serialize};

use super::con_dis_con::{Con, ConDisCon, DisCon};
use super::model::{Attribute, AttributeValue};
use super::translated::TranslatedValue;
use crate::irma::{Credentials, IrmaConfiguration};

/// One attribute option inside a raw candidate tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisclosureCandidate {
    /// Full attribute type identifier.
    #[serde(rename = "type")]
    pub attribute_type: String,
    #[serde(default)]
    pub credential_hash: String,
    #[serde(default)]
    pub value: Option<TranslatedValue>,
    #[serde(default)]
    pub expired: bool,
    #[serde(default)]
    pub revoked: bool,
    #[serde(default)]
    pub not_revokable: bool,
}

/// Three nested sequences: DisCons, their Cons, and the Cons' candidates.
pub type RawCandidates = Vec<Vec<Vec<DisclosureCandidate>>>;

impl Attribute {
    pub fn from_candidate(
        candidate: &DisclosureCandidate,
        configuration: &IrmaConfiguration,
        credentials: &Credentials,
    ) -> Self {
        let attribute_type = configuration.attribute_type(&candidate.attribute_type);
        let credential_type = configuration.credential_type(attribute_type.credential_type_id());
        let value = AttributeValue::from_raw(&attribute_type, candidate.value.as_ref());
        let raw_value = candidate
            .value
            .as_ref()
            .and_then(TranslatedValue::raw_value)
            .map(str::to_string);

        let owned = !candidate.credential_hash.is_empty()
            && credentials.contains(&candidate.credential_hash);
        let choosable = owned && !candidate.expired && !candidate.revoked;

        Self {
            attribute_type,
            credential_type,
            credential_hash: candidate.credential_hash.clone(),
            value,
            raw_value,
            choosable,
            expired: candidate.expired,
            revoked: candidate.revoked,
            not_revokable: candidate.not_revokable,
        }
    }
}

/// Resolve a raw candidate tree into attributes, preserving its shape.
pub fn resolve_candidates(
    raw: &RawCandidates,
    configuration: &IrmaConfiguration,
    credentials: &Credentials,
) -> ConDisCon<Attribute> {
    raw.iter()
        .map(|discon| {
            discon
                .iter()
                .map(|con| {
                    con.iter()
                        .map(|candidate| {
                            Attribute::from_candidate(candidate, configuration, credentials)
                        })
                        .collect::<Con<_>>()
                })
                .collect::<DisCon<_>>()
        })
        .collect()
}
