use std::mem;

use serde::{Deserialize, Serialize};

use super::translated::TranslatedValue;
use crate::irma::{AttributeType, CredentialType};

/// Runtime representation of an attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum AttributeValue {
    /// The attribute has no value (optional attribute left empty, or
    /// a candidate the holder does not own yet).
    Null,
    Text(TranslatedValue),
    /// Base64-encoded JPEG.
    Photo(String),
}

impl AttributeValue {
    pub fn from_raw(attribute_type: &AttributeType, value: Option<&TranslatedValue>) -> Self {
        let Some(value) = value else {
            return Self::Null;
        };
        let Some(raw) = value.raw_value() else {
            return Self::Null;
        };
        if attribute_type.is_portrait_photo() {
            Self::Photo(raw.to_string())
        } else {
            Self::Text(value.clone())
        }
    }
}

/// Stable reference to one attribute inside one credential instance.
///
/// This is what the backend needs to actually execute a disclosure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeIdentifier {
    #[serde(rename = "Type")]
    pub attribute_type: String,
    #[serde(rename = "CredentialHash")]
    pub credential_hash: String,
}

/// A disclosure candidate resolved against the current snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    pub attribute_type: AttributeType,
    /// Issuance metadata of the owning credential type.
    pub credential_type: CredentialType,
    /// Empty when the holder does not own a matching credential.
    pub credential_hash: String,
    pub value: AttributeValue,
    pub raw_value: Option<String>,
    /// The holder owns a usable credential and can disclose this right away.
    pub choosable: bool,
    pub expired: bool,
    pub revoked: bool,
    pub not_revokable: bool,
}

impl Attribute {
    /// Structural equality used when merging candidate trees.
    ///
    /// Trees are rebuilt from scratch on every round-trip, so two candidates
    /// are the same option when type, value representation and raw value agree.
    pub fn matches(&self, other: &Attribute) -> bool {
        self.attribute_type.full_id == other.attribute_type.full_id
            && mem::discriminant(&self.value) == mem::discriminant(&other.value)
            && self.raw_value == other.raw_value
    }

    pub fn identifier(&self) -> AttributeIdentifier {
        AttributeIdentifier {
            attribute_type: self.attribute_type.full_id.clone(),
            credential_hash: self.credential_hash.clone(),
        }
    }
}
