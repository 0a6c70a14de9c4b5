//! Resolution of opaque storage keys into short-lived display URLs.
//!
//! Resolved URLs expire upstream, so nothing here caches them: resolve again
//! whenever a view is rebuilt.

use std::collections::BTreeSet;
use std::collections::HashMap;

use reqwest::Method;
use serde::Deserialize;
use serde::Serialize;

use crate::error::ClientError;
use crate::http::ApiClient;

const RESOLVE_PATH: &str = "upload/view";

#[derive(Debug, Serialize)]
struct ResolveRequest<'a> {
    keys: &'a [String],
}

#[derive(Debug, Deserialize)]
struct ResolveResponse {
    #[serde(default)]
    urls: Vec<ResolvedKey>,
}

#[derive(Debug, Deserialize)]
struct ResolvedKey {
    key: String,
    #[serde(default)]
    url: Option<String>,
}

/// Whether `value` can be displayed as is.
pub fn is_display_url(value: &str) -> bool {
    ["http://", "https://", "data:", "blob:"]
        .iter()
        .any(|scheme| value.starts_with(scheme))
}

#[derive(Debug, Clone)]
pub struct ImageKeyResolver {
    api: ApiClient,
}

impl ImageKeyResolver {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Resolve `keys` in one request.
    ///
    /// Keys the store could not resolve are absent from the result; treat
    /// them as not yet available. An empty input makes no request.
    pub async fn resolve(&self, keys: &[String]) -> Result<HashMap<String, String>, ClientError> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        let url = self.api.url(RESOLVE_PATH, &[]);
        let response: Option<ResolveResponse> = self
            .api
            .send_json(
                self.api
                    .request(Method::POST, url)
                    .json(&ResolveRequest { keys }),
            )
            .await?;

        let resolved: HashMap<String, String> = response
            .map(|response| response.urls)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|entry| {
                entry
                    .url
                    .filter(|url| !url.is_empty())
                    .map(|url| (entry.key, url))
            })
            .collect();

        if resolved.len() < keys.len() {
            tracing::debug!(
                requested = keys.len(),
                resolved = resolved.len(),
                "Some image keys did not resolve"
            );
        }

        Ok(resolved)
    }

    /// Map each value to something displayable.
    ///
    /// Values that already are URLs map to themselves. The remaining keys are
    /// deduplicated and resolved in one batch; unresolved keys are absent.
    pub async fn resolve_display_urls(
        &self,
        values: &[String],
    ) -> Result<HashMap<String, String>, ClientError> {
        let mut display: HashMap<String, String> = HashMap::new();
        let mut pending: BTreeSet<&str> = BTreeSet::new();

        for value in values.iter().filter(|value| !value.is_empty()) {
            if is_display_url(value) {
                display.insert(value.clone(), value.clone());
            } else {
                pending.insert(value.as_str());
            }
        }

        let keys: Vec<String> = pending.into_iter().map(str::to_string).collect();
        display.extend(self.resolve(&keys).await?);

        Ok(display)
    }
}
