use serde::Deserialize;
use serde::Serialize;

use crate::error::ClientError;
use crate::resource::Resource;
use crate::resource::ResourceClient;

/// Audit entry recorded by the store when a product changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub log_id: String,
    #[serde(default)]
    pub ts: String,
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub details: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<serde_json::Value>,
}

impl Resource for LogEntry {
    const PATH: &'static str = "products_info/logs";
    const ID_FIELD: &'static str = "logId";
    type Patch = ();

    fn id(&self) -> &str {
        &self.log_id
    }
}

/// Read-only access to product logs.
#[derive(Debug, Clone)]
pub struct LogClient {
    entries: ResourceClient<LogEntry>,
}

impl LogClient {
    pub fn new(entries: ResourceClient<LogEntry>) -> Self {
        Self { entries }
    }

    pub async fn list(&self) -> Result<Vec<LogEntry>, ClientError> {
        self.entries.list().await
    }
}
