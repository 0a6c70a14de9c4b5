use std::marker::PhantomData;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::envelope::ListEnvelope;
use crate::envelope::RecordEnvelope;
use crate::error::ClientError;
use crate::http::ApiClient;

/// A record kind served under a fixed collection path.
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection path relative to the base URL, e.g. `products_info`
    const PATH: &'static str;

    /// JSON key holding the record id, e.g. `productId`
    const ID_FIELD: &'static str;

    /// Partial update body; fields left as `None` are not sent.
    type Patch: Serialize + Send + Sync;

    fn id(&self) -> &str;
}

/// Generate an id for a record about to be created.
///
/// Ids are chosen by the caller. Retrying a create with the same record
/// reuses its id, so the store sees one record rather than two.
pub fn new_record_id() -> String {
    Uuid::new_v4().to_string()
}

/// CRUD operations for one resource kind.
///
/// No retries and no caching: every call is one request (update may add a
/// read-back), and failures surface as [`ClientError`].
#[derive(Debug, Clone)]
pub struct ResourceClient<R> {
    api: ApiClient,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> ResourceClient<R> {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            _resource: PhantomData,
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Fetch the whole collection. A `null` body is an empty collection.
    ///
    /// # Errors
    /// `Decode` if the body is neither a list nor an object with `items`
    pub async fn list(&self) -> Result<Vec<R>, ClientError> {
        let url = self.api.url(R::PATH, &[]);
        let body: Option<Value> = self.api.send_json(self.api.request(Method::GET, url)).await?;

        match body {
            Some(body) => Ok(ListEnvelope::from_value(body)?.into_items()),
            None => Ok(Vec::new()),
        }
    }

    /// Fetch one record.
    ///
    /// # Errors
    /// `Decode` if the response carries no record
    pub async fn get(&self, id: &str) -> Result<R, ClientError> {
        let url = self.api.url(R::PATH, &[id]);
        let body: Option<Value> = self.api.send_json(self.api.request(Method::GET, url)).await?;

        self.record_from(body)?
            .ok_or_else(|| ClientError::Decode(format!("No {} record with id {}", R::PATH, id)))
    }

    /// Create `record`. When the response is a bare acknowledgement, the
    /// submitted record is returned.
    ///
    /// # Errors
    /// `Decode` if the response carries a record that does not parse
    pub async fn create(&self, record: &R) -> Result<R, ClientError> {
        let url = self.api.url(R::PATH, &[]);
        let body: Option<Value> = self
            .api
            .send_json(self.api.request(Method::POST, url).json(record))
            .await?;

        let stored = self.record_from(body)?;
        tracing::debug!(resource = R::PATH, id = record.id(), "Record created");

        Ok(stored.unwrap_or_else(|| record.clone()))
    }

    /// Apply a partial update. When the response does not carry the updated
    /// record, it is read back once with [`get`](Self::get).
    pub async fn update(&self, id: &str, patch: &R::Patch) -> Result<R, ClientError> {
        let url = self.api.url(R::PATH, &[id]);
        let body: Option<Value> = self
            .api
            .send_json(self.api.request(Method::PUT, url).json(patch))
            .await?;

        let stored = self.record_from(body)?;
        tracing::debug!(resource = R::PATH, id, "Record updated");

        match stored {
            Some(record) => Ok(record),
            None => self.get(id).await,
        }
    }

    pub async fn remove(&self, id: &str) -> Result<(), ClientError> {
        let url = self.api.url(R::PATH, &[id]);
        self.api
            .send_empty(self.api.request(Method::DELETE, url))
            .await?;

        tracing::debug!(resource = R::PATH, id, "Record removed");

        Ok(())
    }

    fn record_from(&self, body: Option<Value>) -> Result<Option<R>, ClientError> {
        match body {
            Some(body) => Ok(RecordEnvelope::from_value(body, R::ID_FIELD)?.into_record()),
            None => Ok(None),
        }
    }
}
