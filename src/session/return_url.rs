//! Client return URL: where the holder goes after the session.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::ReturnUrlConfig;

/// A return URL that parsed as an absolute URL.
///
/// Whether it can actually be opened is decided by a [`ReturnUrlValidator`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientReturnUrl(String);

impl ClientReturnUrl {
    pub fn parse(url: &str) -> Option<Self> {
        reqwest::Url::parse(url.trim()).ok().map(|_| Self(url.trim().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn scheme(&self) -> &str {
        self.0.split_once(':').map_or("", |(scheme, _)| scheme)
    }

    pub fn is_phone_number(&self) -> bool {
        self.scheme().eq_ignore_ascii_case("tel")
    }
}

impl std::fmt::Display for ClientReturnUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Feasibility oracle: can this URL be opened on this device?
#[async_trait]
pub trait ReturnUrlValidator: Send + Sync {
    async fn can_open(&self, url: &ClientReturnUrl) -> bool;
}

/// Accepts URLs whose scheme is in an allow-list.
#[derive(Debug, Clone)]
pub struct SchemeValidator {
    allowed_schemes: Vec<String>,
}

impl SchemeValidator {
    pub fn new(allowed_schemes: impl IntoIterator<Item = String>) -> Self {
        Self {
            allowed_schemes: allowed_schemes
                .into_iter()
                .map(|scheme| scheme.to_ascii_lowercase())
                .collect(),
        }
    }
}

impl From<&ReturnUrlConfig> for SchemeValidator {
    fn from(config: &ReturnUrlConfig) -> Self {
        Self::new(config.allowed_schemes.iter().cloned())
    }
}

#[async_trait]
impl ReturnUrlValidator for SchemeValidator {
    async fn can_open(&self, url: &ClientReturnUrl) -> bool {
        let scheme = url.scheme().to_ascii_lowercase();
        self.allowed_schemes.iter().any(|allowed| *allowed == scheme)
    }
}
