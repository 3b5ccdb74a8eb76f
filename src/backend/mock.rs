//! Mock backend implementation for isolating services in tests.

use async_trait::async_trait;
use mockall::mock;
use serde_json::Value;

use crate::backend::errors::BackendResult;
use crate::backend::{Collection, FunctionEnvelope, ListQuery, RemoteBackend, StoredFile};

mock! {
    pub Backend {}

    #[async_trait]
    impl RemoteBackend for Backend {
        async fn list_documents(
            &self,
            collection: Collection,
            query: ListQuery,
        ) -> BackendResult<Vec<Value>>;

        async fn get_document(&self, collection: Collection, id: &str) -> BackendResult<Value>;

        async fn create_document(
            &self,
            collection: Collection,
            id: &str,
            data: &Value,
        ) -> BackendResult<Value>;

        async fn update_document(
            &self,
            collection: Collection,
            id: &str,
            data: &Value,
        ) -> BackendResult<Value>;

        async fn delete_document(&self, collection: Collection, id: &str) -> BackendResult<()>;

        async fn upload_file(
            &self,
            file_name: &str,
            content_type: &str,
            bytes: Vec<u8>,
        ) -> BackendResult<StoredFile>;

        fn file_view_url(&self, file_id: &str) -> String;

        async fn delete_file(&self, file_id: &str) -> BackendResult<()>;

        async fn invoke_function(&self, payload: &Value) -> BackendResult<FunctionEnvelope>;
    }
}
