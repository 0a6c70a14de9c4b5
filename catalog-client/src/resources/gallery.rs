use reqwest::multipart::Form;
use reqwest::multipart::Part;
use reqwest::Method;
use serde::Deserialize;
use serde::Serialize;

use crate::envelope::ListEnvelope;
use crate::error::ClientError;
use crate::http::ApiClient;

/// Largest file the gallery accepts, in bytes.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const GALLERY_PATH: &str = "gallery";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub last_modified: Option<String>,
}

/// Gallery images: list, multipart upload and delete by id.
#[derive(Debug, Clone)]
pub struct GalleryClient {
    api: ApiClient,
}

impl GalleryClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Vec<GalleryItem>, ClientError> {
        let url = self.api.url(GALLERY_PATH, &[]);
        let body: Option<serde_json::Value> = self
            .api
            .send_json(self.api.request(Method::GET, url))
            .await?;

        match body {
            Some(body) => Ok(ListEnvelope::from_value(body)?.into_items()),
            None => Ok(Vec::new()),
        }
    }

    /// Upload one image as the `file` part of a multipart form.
    ///
    /// # Errors
    /// `Validation` if the file is larger than [`MAX_UPLOAD_BYTES`]; nothing
    /// is sent in that case
    pub async fn upload(
        &self,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), ClientError> {
        check_upload_size(filename, bytes.len())?;

        let part = Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(content_type)?;
        let form = Form::new().part("file", part);

        let url = self.api.url(GALLERY_PATH, &[]);
        self.api
            .send_empty(self.api.multipart_request(Method::POST, url, form))
            .await?;

        tracing::debug!(filename, "Gallery image uploaded");

        Ok(())
    }

    /// Delete an image. The id travels as the `id` query parameter.
    pub async fn remove(&self, id: &str) -> Result<(), ClientError> {
        let mut url = self.api.url(GALLERY_PATH, &[]);
        url.query_pairs_mut().append_pair("id", id);

        self.api
            .send_empty(self.api.request(Method::DELETE, url))
            .await
    }
}

pub(crate) fn check_upload_size(filename: &str, len: usize) -> Result<(), ClientError> {
    if len <= MAX_UPLOAD_BYTES {
        return Ok(());
    }

    let megabytes = (len as f64 / 1024.0 / 1024.0 * 100.0).round() / 100.0;
    Err(ClientError::Validation(format!(
        "\"{}\" is too large ({} MB). Max allowed is 10 MB.",
        filename, megabytes
    )))
}
