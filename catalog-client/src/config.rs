use config::Config;
use config::ConfigError;
use config::Environment;
use serde::Deserialize;

use crate::error::ClientError;

const DEFAULT_API_URL: &str = "http://localhost:4000";

/// Upstream locations and credentials for the catalog client.
///
/// Each resource family may live behind a different gateway; the selectors
/// below pick the first configured base for a family.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Admin session API (login, logout, me)
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Products, product logs and uploads
    #[serde(default)]
    pub api_base: String,
    /// Contact submissions and gallery
    #[serde(default)]
    pub contact_api: String,
    /// Fallback for contact submissions
    #[serde(default)]
    pub main_api_base: String,
    /// Sent as a bearer token when present and non-empty
    #[serde(default)]
    pub id_token: Option<String>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_base: String::new(),
            contact_api: String::new(),
            main_api_base: String::new(),
            id_token: None,
        }
    }
}

impl ClientConfig {
    /// Load from `CATALOG__*` environment variables.
    ///
    /// # Example
    /// `CATALOG__API_BASE=https://api.example.com` sets `api_base`.
    ///
    /// # Errors
    /// Returns error if a variable cannot be deserialized
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(
                Environment::with_prefix("CATALOG")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }

    /// Base for products, logs and uploads.
    ///
    /// # Errors
    /// `Config` when `api_base` is empty
    pub fn products_base(&self) -> Result<String, ClientError> {
        first_configured(&[&self.api_base])
            .ok_or_else(|| ClientError::Config("API base URL is not set".to_string()))
    }

    /// Base for contact submissions: `contact_api`, then `main_api_base`,
    /// then `api_base`.
    ///
    /// # Errors
    /// `Config` when none is set
    pub fn contacts_base(&self) -> Result<String, ClientError> {
        first_configured(&[&self.contact_api, &self.main_api_base, &self.api_base])
            .ok_or_else(|| ClientError::Config("Contact API base URL is not set".to_string()))
    }

    /// Base for the gallery: `contact_api`, then `api_base`.
    ///
    /// # Errors
    /// `Config` when neither is set
    pub fn gallery_base(&self) -> Result<String, ClientError> {
        first_configured(&[&self.contact_api, &self.api_base])
            .ok_or_else(|| ClientError::Config("Gallery API base URL is not set".to_string()))
    }

    /// Bearer token, ignoring an empty value.
    pub fn bearer_token(&self) -> Option<&str> {
        self.id_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

fn first_configured(candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .map(|candidate| candidate.trim().trim_end_matches('/'))
        .find(|candidate| !candidate.is_empty())
        .map(str::to_string)
}
