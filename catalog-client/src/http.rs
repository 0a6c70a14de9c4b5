use reqwest::header;
use reqwest::multipart::Form;
use reqwest::Method;
use reqwest::RequestBuilder;
use reqwest::Response;
use reqwest::Url;
use serde::de::DeserializeOwned;

use crate::error::ClientError;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Request helper shared by every resource client.
///
/// Joins paths onto a base URL, attaches the optional bearer token and
/// turns non-success responses into [`ClientError::Api`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base: Url,
    bearer: Option<String>,
}

impl ApiClient {
    /// Create a client for `base_url`.
    ///
    /// # Errors
    /// `Config` if the base URL is empty or cannot carry a path
    pub fn new(base_url: &str, bearer: Option<&str>) -> Result<Self, ClientError> {
        Self::with_client(reqwest::Client::new(), base_url, bearer)
    }

    /// Create a client sharing an existing connection pool.
    ///
    /// # Errors
    /// `Config` if the base URL is empty or cannot carry a path
    pub fn with_client(
        client: reqwest::Client,
        base_url: &str,
        bearer: Option<&str>,
    ) -> Result<Self, ClientError> {
        let trimmed = base_url.trim();
        if trimmed.is_empty() {
            return Err(ClientError::Config("API base URL is not set".to_string()));
        }

        let base = Url::parse(trimmed)
            .map_err(|e| ClientError::Config(format!("Invalid base URL {}: {}", trimmed, e)))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::Config(format!("Invalid base URL {}", trimmed)));
        }

        Ok(Self {
            client,
            base,
            bearer: bearer
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(str::to_string),
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.client
    }

    /// Resolve `path` (slash separated) plus optional extra segments against
    /// the base URL. Extra segments are percent-encoded, so ids may contain
    /// any character.
    pub fn url(&self, path: &str, extra: &[&str]) -> Url {
        let mut url = self.base.clone();
        // Checked in the constructor
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(path.split('/').filter(|segment| !segment.is_empty()))
                .extend(extra);
        }
        url
    }

    /// Start a request with the standard headers: a JSON content type and
    /// the bearer token when one is configured.
    pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.authorize(
            self.client
                .request(method, url)
                .header(header::CONTENT_TYPE, JSON_CONTENT_TYPE),
        )
    }

    /// Start a multipart request. The content type, with its boundary, comes
    /// from the form.
    pub fn multipart_request(&self, method: Method, url: Url, form: Form) -> RequestBuilder {
        self.authorize(self.client.request(method, url)).multipart(form)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.bearer {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send and decode a JSON body. An empty body decodes as `None`.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<Option<T>, ClientError> {
        let response = builder.send().await?;
        let response = check_status(response).await?;
        let text = response.text().await?;

        decode_optional(&text)
    }

    /// Send and discard the body.
    pub async fn send_empty(&self, builder: RequestBuilder) -> Result<(), ClientError> {
        let response = builder.send().await?;
        check_status(response).await?;
        Ok(())
    }
}

/// Pass success responses through and convert the rest into errors.
pub(crate) async fn check_status(response: Response) -> Result<Response, ClientError> {
    if response.status().is_success() {
        return Ok(response);
    }

    Err(error_from_response(response).await)
}

/// Build an `Api` error carrying the most specific message available:
/// body `error`, then body `message`, then the raw text, then a generic
/// message naming the status.
pub(crate) async fn error_from_response(response: Response) -> ClientError {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();
    let message = error_message(status, &text);

    tracing::debug!(status, message = %message, "Upstream request failed");

    ClientError::Api { status, message }
}

pub(crate) fn error_message(status: u16, text: &str) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(text)
        .ok()
        .and_then(|body| {
            ["error", "message"].iter().find_map(|field| {
                body.get(field)
                    .and_then(|value| value.as_str())
                    .filter(|message| !message.is_empty())
                    .map(str::to_string)
            })
        });

    from_json
        .or_else(|| {
            let raw = text.trim();
            (!raw.is_empty()).then(|| raw.to_string())
        })
        .unwrap_or_else(|| format!("Request failed with {}", status))
}

pub(crate) fn decode_optional<T: DeserializeOwned>(text: &str) -> Result<Option<T>, ClientError> {
    if text.trim().is_empty() {
        return Ok(None);
    }

    serde_json::from_str::<Option<T>>(text).map_err(|e| ClientError::Decode(e.to_string()))
}
