use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{DocumentStore, GatewayError, GatewayResult, matches_document};
use crate::model::ContactRecord;

/// JSON document file store (`file://<path>`).
///
/// The file holds the whole collection as a JSON array. Opening loads it,
/// every write rewrites it atomically, closing drops the loaded copy.
#[derive(Debug)]
pub struct FileDocumentStore {
    path: PathBuf,
    loaded: RwLock<Option<Vec<ContactRecord>>>,
}

impl FileDocumentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            loaded: RwLock::new(None),
        }
    }

    async fn load(&self) -> GatewayResult<Vec<ContactRecord>> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        if !fs::try_exists(parent).await.unwrap_or(false) {
            return Err(GatewayError::Connection(format!(
                "directory '{}' does not exist",
                parent.display()
            )));
        }

        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(GatewayError::Connection(format!(
                    "failed to read '{}': {}",
                    self.path.display(),
                    err
                )));
            }
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&bytes).map_err(|err| {
            GatewayError::Connection(format!(
                "'{}' is not a contact collection: {}",
                self.path.display(),
                err
            ))
        })
    }

    /// Gives every document without an `_id` a fresh one. Returns whether
    /// any document changed.
    fn assign_missing_ids(documents: &mut [ContactRecord]) -> bool {
        let mut assigned = false;
        for doc in documents.iter_mut().filter(|doc| doc.id.is_none()) {
            doc.id = Some(new_document_id());
            assigned = true;
        }
        assigned
    }

    async fn write_documents(&self, documents: &[ContactRecord]) -> GatewayResult<()> {
        let bytes = serde_json::to_vec_pretty(documents)
            .map_err(|err| GatewayError::backend(format!("failed to encode contacts: {err}")))?;
        atomic_write(&self.path, &bytes).await
    }

    /// Applies `mutate` to a copy of the open collection and commits it only
    /// once the file has been rewritten.
    async fn modify<T>(
        &self,
        mutate: impl FnOnce(&mut Vec<ContactRecord>) -> GatewayResult<T>,
    ) -> GatewayResult<T> {
        let mut loaded = self.loaded.write().await;
        let documents = loaded.as_ref().ok_or(GatewayError::NotConnected)?;

        let mut next = documents.clone();
        let outcome = mutate(&mut next)?;
        self.write_documents(&next).await?;
        *loaded = Some(next);
        Ok(outcome)
    }
}

fn new_document_id() -> String {
    Uuid::new_v4().simple().to_string()
}

async fn atomic_write(path: &Path, bytes: &[u8]) -> GatewayResult<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes).await.map_err(|err| {
        GatewayError::backend(format!(
            "failed to write temp file '{}': {}",
            tmp.display(),
            err
        ))
    })?;

    fs::rename(&tmp, path).await.map_err(|err| {
        GatewayError::backend(format!(
            "failed to rename temp file '{}' -> '{}': {}",
            tmp.display(),
            path.display(),
            err
        ))
    })?;
    Ok(())
}

#[async_trait]
impl DocumentStore for FileDocumentStore {
    async fn open(&self) -> GatewayResult<()> {
        let mut documents = self.load().await?;
        // Assigned ids are written back so they stay stable across opens.
        if Self::assign_missing_ids(&mut documents) {
            self.write_documents(&documents).await.map_err(|err| {
                GatewayError::Connection(format!(
                    "failed to store ids in '{}': {}",
                    self.path.display(),
                    err
                ))
            })?;
        }
        *self.loaded.write().await = Some(documents);
        Ok(())
    }

    async fn close(&self) -> GatewayResult<()> {
        self.loaded.write().await.take();
        Ok(())
    }

    async fn is_open(&self) -> bool {
        self.loaded.read().await.is_some()
    }

    async fn find_all(&self) -> GatewayResult<Vec<ContactRecord>> {
        self.loaded
            .read()
            .await
            .clone()
            .ok_or(GatewayError::NotConnected)
    }

    async fn insert(&self, mut record: ContactRecord) -> GatewayResult<ContactRecord> {
        self.modify(|documents| {
            if documents
                .iter()
                .any(|doc| doc.resource_id == record.resource_id)
            {
                return Err(GatewayError::DuplicateKey(record.resource_id));
            }
            record.id = Some(new_document_id());
            documents.push(record.clone());
            Ok(record)
        })
        .await
    }

    async fn replace(&self, record: ContactRecord) -> GatewayResult<ContactRecord> {
        self.modify(|documents| {
            if documents
                .iter()
                .any(|doc| doc.resource_id == record.resource_id && doc.id != record.id)
            {
                return Err(GatewayError::DuplicateKey(record.resource_id));
            }
            let slot = documents
                .iter_mut()
                .find(|doc| doc.id == record.id)
                .ok_or_else(|| {
                    GatewayError::backend(format!("no document found for id {:?}", record.id))
                })?;
            *slot = record.clone();
            Ok(record)
        })
        .await
    }

    async fn delete_one(&self, record: &ContactRecord) -> GatewayResult<u64> {
        {
            let loaded = self.loaded.read().await;
            let documents = loaded.as_ref().ok_or(GatewayError::NotConnected)?;
            if !documents.iter().any(|doc| matches_document(doc, record)) {
                return Ok(0);
            }
        }

        self.modify(|documents| {
            match documents.iter().position(|doc| matches_document(doc, record)) {
                Some(position) => {
                    documents.remove(position);
                    Ok(1)
                }
                None => Ok(0),
            }
        })
        .await
    }

    fn kind(&self) -> &'static str {
        "file"
    }
}
