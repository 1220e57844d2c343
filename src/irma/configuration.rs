//! Scheme configuration snapshot: credential and attribute type metadata.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::attribute::TranslatedValue;

/// Display hint marking an attribute as a portrait photo.
pub const PORTRAIT_PHOTO_HINT: &str = "portraitPhoto";

/// Metadata of a credential type, including how to obtain it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialType {
    /// Full identifier: `scheme.issuer.credential`.
    pub full_id: String,
    #[serde(default)]
    pub name: TranslatedValue,
    /// Where the holder can go to get this credential issued.
    #[serde(default)]
    pub issue_url: Option<TranslatedValue>,
}

impl CredentialType {
    /// Placeholder used when the configuration does not know the type.
    pub fn unknown(full_id: impl Into<String>) -> Self {
        let full_id = full_id.into();
        Self {
            name: TranslatedValue::untranslated(full_id.clone()),
            full_id,
            issue_url: None,
        }
    }

    /// An issuance pathway exists for this credential type.
    pub fn is_obtainable(&self) -> bool {
        self.issue_url
            .as_ref()
            .is_some_and(|url| !url.is_blank())
    }
}

/// Metadata of a single attribute type within a credential type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeType {
    /// Full identifier: `scheme.issuer.credential.attribute`.
    pub full_id: String,
    #[serde(default)]
    pub name: TranslatedValue,
    #[serde(default)]
    pub display_index: Option<u32>,
    #[serde(default)]
    pub display_hint: Option<String>,
}

impl AttributeType {
    pub fn unknown(full_id: impl Into<String>) -> Self {
        let full_id = full_id.into();
        Self {
            name: TranslatedValue::untranslated(full_id.clone()),
            full_id,
            display_index: None,
            display_hint: None,
        }
    }

    /// Identifier of the credential type this attribute belongs to.
    pub fn credential_type_id(&self) -> &str {
        credential_type_id(&self.full_id)
    }

    pub fn is_portrait_photo(&self) -> bool {
        self.display_hint.as_deref() == Some(PORTRAIT_PHOTO_HINT)
    }
}

/// Strip the attribute segment from `scheme.issuer.credential.attribute`.
pub fn credential_type_id(attribute_type_id: &str) -> &str {
    attribute_type_id
        .rsplit_once('.')
        .map_or(attribute_type_id, |(credential, _)| credential)
}

/// The scheme configuration as known to the backend.
///
/// Both maps are keyed by full identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrmaConfiguration {
    #[serde(default)]
    pub credential_types: BTreeMap<String, CredentialType>,
    #[serde(default)]
    pub attribute_types: BTreeMap<String, AttributeType>,
}

impl IrmaConfiguration {
    /// Resolve an attribute type, or a placeholder if it is unknown.
    pub fn attribute_type(&self, full_id: &str) -> AttributeType {
        match self.attribute_types.get(full_id) {
            Some(attribute_type) => attribute_type.clone(),
            None => {
                tracing::warn!(attribute_type = %full_id, "Unknown attribute type");
                AttributeType::unknown(full_id)
            }
        }
    }

    /// Resolve a credential type, or a placeholder if it is unknown.
    pub fn credential_type(&self, full_id: &str) -> CredentialType {
        match self.credential_types.get(full_id) {
            Some(credential_type) => credential_type.clone(),
            None => {
                tracing::warn!(credential_type = %full_id, "Unknown credential type");
                CredentialType::unknown(full_id)
            }
        }
    }
}
