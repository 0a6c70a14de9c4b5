use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;

use crate::admin::errors::CredentialStoreError;
use crate::admin::models::AdminIdentity;
use crate::admin::ports::CredentialStore;

/// On-disk shape of the credentials record.
///
/// ```json
/// { "username": "admin", "passwordHash": "$argon2id$v=19$..." }
/// ```
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CredentialsRecord {
    username: String,
    password_hash: String,
}

/// Credential store backed by a JSON file.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> Result<AdminIdentity, CredentialStoreError> {
        let location = self.path.display().to_string();

        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => CredentialStoreError::NotFound(location.clone()),
                _ => CredentialStoreError::Unreadable(format!("{}: {}", location, e)),
            })?;

        let record: CredentialsRecord = serde_json::from_str(&raw)
            .map_err(|e| CredentialStoreError::Malformed(format!("{}: {}", location, e)))?;

        AdminIdentity::new(record.username, record.password_hash)
    }
}
