//! Wallet snapshot: the credentials the holder currently owns.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::configuration::{AttributeType, CredentialType, IrmaConfiguration};
use crate::attribute::{AttributeValue, TranslatedValue};

/// A credential as serialized by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCredential {
    /// Full credential type identifier.
    pub id: String,
    pub hash: String,
    #[serde(default)]
    pub signed_on: Option<i64>,
    #[serde(default)]
    pub expires: Option<i64>,
    /// Attribute values keyed by full attribute type identifier.
    #[serde(default)]
    pub attributes: BTreeMap<String, TranslatedValue>,
    #[serde(default)]
    pub revoked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialAttribute {
    pub attribute_type: AttributeType,
    pub value: AttributeValue,
    pub raw_value: Option<String>,
}

/// A credential resolved against the scheme configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub hash: String,
    pub credential_type: CredentialType,
    pub signed_on: Option<i64>,
    pub expires: Option<i64>,
    pub revoked: bool,
    /// Ordered by the attribute types' display index.
    pub attributes: Vec<CredentialAttribute>,
}

impl Credential {
    pub fn from_raw(raw: &RawCredential, configuration: &IrmaConfiguration) -> Self {
        let mut attributes: Vec<CredentialAttribute> = raw
            .attributes
            .iter()
            .map(|(id, value)| {
                let attribute_type = configuration.attribute_type(id);
                CredentialAttribute {
                    value: AttributeValue::from_raw(&attribute_type, Some(value)),
                    raw_value: value.raw_value().map(str::to_string),
                    attribute_type,
                }
            })
            .collect();
        // Unindexed attributes go last; ties keep identifier order.
        attributes.sort_by_key(|attr| attr.attribute_type.display_index.unwrap_or(u32::MAX));

        Self {
            hash: raw.hash.clone(),
            credential_type: configuration.credential_type(&raw.id),
            signed_on: raw.signed_on,
            expires: raw.expires,
            revoked: raw.revoked,
            attributes,
        }
    }
}

/// All credentials in the wallet, keyed by credential hash.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credentials(BTreeMap<String, Credential>);

impl Credentials {
    pub fn from_raw(raw: &[RawCredential], configuration: &IrmaConfiguration) -> Self {
        raw.iter()
            .map(|credential| Credential::from_raw(credential, configuration))
            .collect()
    }

    pub fn contains(&self, hash: &str) -> bool {
        self.0.contains_key(hash)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Credential> for Credentials {
    fn from_iter<I: IntoIterator<Item = Credential>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|credential| (credential.hash.clone(), credential))
                .collect(),
        )
    }
}
