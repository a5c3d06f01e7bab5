use anyhow::{anyhow, Result};
use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    Client, Method,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error};

use shared_config::AppConfig;

/// Listing envelope returned by the document store.
#[derive(Debug, Deserialize)]
pub struct DocumentList<T> {
    pub total: u64,
    pub documents: Vec<T>,
}

/// REST client for the remote document database. One instance per service;
/// holds no connection state beyond the reqwest pool.
pub struct DocumentClient {
    client: Client,
    endpoint: String,
    project_id: String,
    api_key: String,
    database_id: String,
}

impl DocumentClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.docstore_endpoint.clone(),
            project_id: config.docstore_project_id.clone(),
            api_key: config.docstore_api_key.clone(),
            database_id: config.docstore_database_id.clone(),
        }
    }

    fn get_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Ok(value) = HeaderValue::from_str(&self.project_id) {
            headers.insert("X-Appwrite-Project", value);
        }
        if let Ok(value) = HeaderValue::from_str(&self.api_key) {
            headers.insert("X-Appwrite-Key", value);
        }

        headers
    }

    fn documents_path(&self, collection_id: &str) -> String {
        format!(
            "/databases/{}/collections/{}/documents",
            self.database_id, collection_id
        )
    }

    pub async fn request<T>(&self, method: Method, path: &str, body: Option<Value>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.endpoint, path);
        debug!("Making request to {}", url);

        let mut req = self.client.request(method, &url).headers(self.get_headers());

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("Document store error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => anyhow!("Authentication error: {}", error_text),
                404 => anyhow!("Document not found: {}", error_text),
                409 => anyhow!("Document conflict: {}", error_text),
                _ => anyhow!("Document store error ({}): {}", status, error_text),
            });
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }

    /// Create a document with a store-generated identifier.
    pub async fn create_document<T>(&self, collection_id: &str, data: Value) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let path = self.documents_path(collection_id);
        let body = json!({
            "documentId": "unique()",
            "data": data,
        });

        self.request(Method::POST, &path, Some(body)).await
    }

    pub async fn get_document<T>(&self, collection_id: &str, document_id: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let path = format!("{}/{}", self.documents_path(collection_id), document_id);
        self.request(Method::GET, &path, None).await
    }

    /// Fetch a document, mapping a missing one to `None` instead of an error.
    pub async fn find_document<T>(
        &self,
        collection_id: &str,
        document_id: &str,
    ) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let path = format!("{}/{}", self.documents_path(collection_id), document_id);
        let url = format!("{}{}", self.endpoint, path);
        debug!("Making request to {}", url);

        let response = self
            .client
            .request(Method::GET, &url)
            .headers(self.get_headers())
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Ok(None);
        }
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("Document store error ({}): {}", status, error_text);
            return Err(anyhow!("Document store error ({}): {}", status, error_text));
        }

        let data = response.json::<T>().await?;
        Ok(Some(data))
    }

    /// List documents matching the given query expressions.
    pub async fn list_documents<T>(
        &self,
        collection_id: &str,
        queries: &[String],
    ) -> Result<DocumentList<T>>
    where
        T: DeserializeOwned,
    {
        let mut path = self.documents_path(collection_id);
        if !queries.is_empty() {
            let query_string = queries
                .iter()
                .map(|q| format!("queries[]={}", urlencoding::encode(q)))
                .collect::<Vec<_>>()
                .join("&");
            path = format!("{}?{}", path, query_string);
        }

        self.request(Method::GET, &path, None).await
    }

    pub async fn update_document<T>(
        &self,
        collection_id: &str,
        document_id: &str,
        data: Value,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let path = format!("{}/{}", self.documents_path(collection_id), document_id);
        let body = json!({ "data": data });

        self.request(Method::PATCH, &path, Some(body)).await
    }

    pub fn get_endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Build an equality query expression for `list_documents`.
pub fn query_equal(attribute: &str, value: &str) -> String {
    json!({
        "method": "equal",
        "attribute": attribute,
        "values": [value],
    })
    .to_string()
}
