//! HTTP implementation of [`RemoteBackend`] against the hosted backend's
//! REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Response, StatusCode, multipart};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::backend::errors::{BackendError, BackendResult};
use crate::backend::{Collection, FunctionEnvelope, ListQuery, RemoteBackend, StoredFile};
use crate::models::config::BackendConfig;

pub struct HttpBackend {
    http: reqwest::Client,
    config: BackendConfig,
}

impl HttpBackend {
    pub fn new(config: BackendConfig) -> BackendResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "X-Appwrite-Project",
            HeaderValue::from_str(&config.project_id)
                .map_err(|e| BackendError::Config(e.to_string()))?,
        );
        headers.insert(
            "X-Appwrite-Key",
            HeaderValue::from_str(&config.api_key)
                .map_err(|e| BackendError::Config(e.to_string()))?,
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BackendError::Config(e.to_string()))?;

        Ok(Self { http, config })
    }

    fn collection_id(&self, collection: Collection) -> &str {
        match collection {
            Collection::Clients => &self.config.clients_collection,
            Collection::Cases => &self.config.cases_collection,
            Collection::ServeAttempts => &self.config.serves_collection,
            Collection::Documents => &self.config.documents_collection,
        }
    }

    fn documents_url(&self, collection: Collection) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.config.endpoint,
            self.config.database_id,
            self.collection_id(collection)
        )
    }

    fn document_url(&self, collection: Collection, id: &str) -> String {
        format!("{}/{}", self.documents_url(collection), id)
    }

    fn files_url(&self) -> String {
        format!(
            "{}/storage/buckets/{}/files",
            self.config.endpoint, self.config.bucket_id
        )
    }
}

/// Serializes a [`ListQuery`] into the backend's `queries[]` parameters.
fn query_params(query: &ListQuery) -> Vec<(String, String)> {
    let mut params = Vec::new();
    for (field, value) in &query.filters {
        params.push((
            "queries[]".to_string(),
            json!({"method": "equal", "attribute": field, "values": [value]}).to_string(),
        ));
    }
    if let Some(limit) = query.limit {
        params.push((
            "queries[]".to_string(),
            json!({"method": "limit", "values": [limit]}).to_string(),
        ));
    }
    params
}

#[derive(Deserialize)]
struct DocumentList {
    #[serde(default)]
    documents: Vec<Value>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct Execution {
    #[serde(default, rename = "responseBody")]
    response_body: String,
}

/// Maps a non-success response to the error taxonomy, draining the body for
/// the backend's message field.
async fn check(response: Response) -> BackendResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(BackendError::NotFound);
    }
    let message = response
        .json::<ApiErrorBody>()
        .await
        .map(|body| body.message)
        .unwrap_or_default();
    Err(BackendError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl RemoteBackend for HttpBackend {
    async fn list_documents(
        &self,
        collection: Collection,
        query: ListQuery,
    ) -> BackendResult<Vec<Value>> {
        let response = self
            .http
            .get(self.documents_url(collection))
            .query(&query_params(&query))
            .send()
            .await?;
        let list = check(response).await?.json::<DocumentList>().await?;
        Ok(list.documents)
    }

    async fn get_document(&self, collection: Collection, id: &str) -> BackendResult<Value> {
        let response = self
            .http
            .get(self.document_url(collection, id))
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn create_document(
        &self,
        collection: Collection,
        id: &str,
        data: &Value,
    ) -> BackendResult<Value> {
        let response = self
            .http
            .post(self.documents_url(collection))
            .json(&json!({"documentId": id, "data": data}))
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn update_document(
        &self,
        collection: Collection,
        id: &str,
        data: &Value,
    ) -> BackendResult<Value> {
        let response = self
            .http
            .patch(self.document_url(collection, id))
            .json(&json!({"data": data}))
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn delete_document(&self, collection: Collection, id: &str) -> BackendResult<()> {
        let response = self
            .http
            .delete(self.document_url(collection, id))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn upload_file(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> BackendResult<StoredFile> {
        let part = multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .map_err(|e| BackendError::Payload(e.to_string()))?;
        let form = multipart::Form::new()
            .text("fileId", Uuid::new_v4().to_string())
            .part("file", part);

        let response = self.http.post(self.files_url()).multipart(form).send().await?;
        Ok(check(response).await?.json().await?)
    }

    fn file_view_url(&self, file_id: &str) -> String {
        format!(
            "{}/{}/view?project={}",
            self.files_url(),
            file_id,
            self.config.project_id
        )
    }

    async fn delete_file(&self, file_id: &str) -> BackendResult<()> {
        let response = self
            .http
            .delete(format!("{}/{}", self.files_url(), file_id))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn invoke_function(&self, payload: &Value) -> BackendResult<FunctionEnvelope> {
        let url = format!(
            "{}/functions/{}/executions",
            self.config.endpoint, self.config.email_function_id
        );
        let response = self
            .http
            .post(url)
            .json(&json!({"body": payload.to_string(), "async": false}))
            .send()
            .await?;
        let execution = check(response).await?.json::<Execution>().await?;
        if execution.response_body.is_empty() {
            return Err(BackendError::Payload(
                "empty function response body".to_string(),
            ));
        }
        Ok(serde_json::from_str(&execution.response_body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_params_encode_filters_and_limit() {
        let query = ListQuery::new().filter("clientId", "c1").limit(1);
        let params = query_params(&query);
        assert_eq!(params.len(), 2);
        assert!(params[0].1.contains("\"attribute\":\"clientId\""));
        assert!(params[1].1.contains("\"method\":\"limit\""));
    }
}
