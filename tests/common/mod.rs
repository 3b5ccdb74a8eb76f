#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use serde_json::{Value, json};
use tempfile::TempDir;

use servetracker::backend::{
    BackendError, BackendResult, Collection, FunctionEnvelope, ListQuery, RemoteBackend, StoredFile,
};
use servetracker::db::{DbPool, establish_connection_pool};
use servetracker::mirror;

/// Temporary SQLite mirror database, removed together with its directory.
pub struct TestDb {
    _dir: TempDir,
    pool: DbPool,
}

impl TestDb {
    pub fn new(name: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join(name);
        let pool =
            establish_connection_pool(path.to_str().expect("utf-8 path")).expect("create pool");
        mirror::run_migrations(&pool).expect("run migrations");
        Self { _dir: dir, pool }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }
}

fn collection_key(collection: Collection) -> &'static str {
    match collection {
        Collection::Clients => "clients",
        Collection::Cases => "cases",
        Collection::ServeAttempts => "serve_attempts",
        Collection::Documents => "documents",
    }
}

/// In-memory rendition of the hosted document/file/function API, enough for
/// the orchestration layer to run end to end.
#[derive(Default)]
pub struct FakeBackend {
    collections: Mutex<HashMap<&'static str, Vec<Value>>>,
    emails: Mutex<Vec<Value>>,
    next_file: AtomicU64,
    fail_file_deletes: AtomicBool,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plants a document as if it already existed remotely.
    pub fn seed(&self, collection: Collection, doc: Value) {
        self.collections
            .lock()
            .expect("lock poisoned")
            .entry(collection_key(collection))
            .or_default()
            .push(doc);
    }

    pub fn documents(&self, collection: Collection) -> Vec<Value> {
        self.collections
            .lock()
            .expect("lock poisoned")
            .get(collection_key(collection))
            .cloned()
            .unwrap_or_default()
    }

    /// Payloads handed to the email relay function, in dispatch order.
    pub fn sent_emails(&self) -> Vec<Value> {
        self.emails.lock().expect("lock poisoned").clone()
    }

    /// Makes every subsequent file delete fail with a server error.
    pub fn fail_file_deletes(&self) {
        self.fail_file_deletes.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl RemoteBackend for FakeBackend {
    async fn list_documents(
        &self,
        collection: Collection,
        query: ListQuery,
    ) -> BackendResult<Vec<Value>> {
        let mut matched: Vec<Value> = self
            .documents(collection)
            .into_iter()
            .filter(|doc| {
                query.filters.iter().all(|(field, value)| {
                    doc.get(field).and_then(Value::as_str) == Some(value.as_str())
                })
            })
            .collect();
        if let Some(limit) = query.limit {
            matched.truncate(limit as usize);
        }
        Ok(matched)
    }

    async fn get_document(&self, collection: Collection, id: &str) -> BackendResult<Value> {
        self.documents(collection)
            .into_iter()
            .find(|doc| doc.get("$id").and_then(Value::as_str) == Some(id))
            .ok_or(BackendError::NotFound)
    }

    async fn create_document(
        &self,
        collection: Collection,
        id: &str,
        data: &Value,
    ) -> BackendResult<Value> {
        let mut doc = data.clone();
        doc["$id"] = json!(id);
        self.seed(collection, doc.clone());
        Ok(doc)
    }

    async fn update_document(
        &self,
        collection: Collection,
        id: &str,
        data: &Value,
    ) -> BackendResult<Value> {
        let mut collections = self.collections.lock().expect("lock poisoned");
        let docs = collections.entry(collection_key(collection)).or_default();
        let doc = docs
            .iter_mut()
            .find(|doc| doc.get("$id").and_then(Value::as_str) == Some(id))
            .ok_or(BackendError::NotFound)?;
        if let (Some(target), Some(fields)) = (doc.as_object_mut(), data.as_object()) {
            for (key, value) in fields {
                target.insert(key.clone(), value.clone());
            }
        }
        Ok(doc.clone())
    }

    async fn delete_document(&self, collection: Collection, id: &str) -> BackendResult<()> {
        let mut collections = self.collections.lock().expect("lock poisoned");
        let docs = collections.entry(collection_key(collection)).or_default();
        let before = docs.len();
        docs.retain(|doc| doc.get("$id").and_then(Value::as_str) != Some(id));
        if docs.len() == before {
            return Err(BackendError::NotFound);
        }
        Ok(())
    }

    async fn upload_file(
        &self,
        file_name: &str,
        _content_type: &str,
        bytes: Vec<u8>,
    ) -> BackendResult<StoredFile> {
        let id = format!("file-{}", self.next_file.fetch_add(1, Ordering::SeqCst) + 1);
        Ok(StoredFile {
            id,
            name: file_name.to_string(),
            size: bytes.len() as i64,
        })
    }

    fn file_view_url(&self, file_id: &str) -> String {
        format!("https://files.test/{file_id}/view")
    }

    async fn delete_file(&self, _file_id: &str) -> BackendResult<()> {
        if self.fail_file_deletes.load(Ordering::SeqCst) {
            return Err(BackendError::Api {
                status: 500,
                message: "storage offline".to_string(),
            });
        }
        Ok(())
    }

    async fn invoke_function(&self, payload: &Value) -> BackendResult<FunctionEnvelope> {
        self.emails.lock().expect("lock poisoned").push(payload.clone());
        Ok(FunctionEnvelope {
            success: true,
            message: "sent".to_string(),
        })
    }
}
