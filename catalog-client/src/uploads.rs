//! Direct-to-storage uploads through presigned POST forms.

use std::collections::BTreeMap;

use reqwest::multipart::Form;
use reqwest::multipart::Part;
use reqwest::Method;
use serde::Deserialize;
use serde::Serialize;

use crate::error::ClientError;
use crate::http::ApiClient;

const PRESIGN_PATH: &str = "upload/presign";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignRequest {
    pub product_id: String,
    pub filename: String,
    pub content_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PresignResponse {
    pub upload: PresignedPost,
    /// Storage key the object will have once uploaded
    pub key: String,
}

/// Target URL and the form fields the storage service requires.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PresignedPost {
    pub url: String,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct UploadClient {
    api: ApiClient,
}

impl UploadClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Ask the store for a presigned upload slot.
    ///
    /// # Errors
    /// `Decode` if the response carries no upload description
    pub async fn presign(&self, request: &PresignRequest) -> Result<PresignResponse, ClientError> {
        let url = self.api.url(PRESIGN_PATH, &[]);

        self.api
            .send_json(self.api.request(Method::POST, url).json(request))
            .await?
            .ok_or_else(|| ClientError::Decode("Empty presign response".to_string()))
    }

    /// POST the file to the presigned URL: every form field first, then the
    /// file as `file`. No bearer token is attached.
    ///
    /// # Errors
    /// `Api` with message `S3 upload failed: <status>` on a non-success status
    pub async fn upload_presigned(
        &self,
        upload: &PresignedPost,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), ClientError> {
        let form = upload
            .fields
            .iter()
            .fold(Form::new(), |form, (name, value)| {
                form.text(name.clone(), value.clone())
            })
            .part(
                "file",
                Part::bytes(bytes)
                    .file_name(filename.to_string())
                    .mime_str(content_type)?,
            );

        let response = self
            .api
            .http()
            .post(&upload.url)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Presigned upload rejected");
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: format!("S3 upload failed: {}", status),
            });
        }

        Ok(())
    }

    /// Presign and upload in one go, returning the new storage key.
    pub async fn upload_file(
        &self,
        product_id: &str,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, ClientError> {
        let presigned = self
            .presign(&PresignRequest {
                product_id: product_id.to_string(),
                filename: filename.to_string(),
                content_type: content_type.to_string(),
            })
            .await?;

        self.upload_presigned(&presigned.upload, filename, content_type, bytes)
            .await?;

        Ok(presigned.key)
    }
}
