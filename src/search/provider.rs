//! Search provider trait and a mock implementation
//!
//! A provider runs one field-filtered query against one endpoint. It knows
//! nothing about caching or about the other configured endpoints; that is
//! the gateway's job.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

/// One record returned by the search index: field name → scalar or list
pub type Document = Map<String, Value>;

/// Errors from a search provider.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    #[error("failed to create HTTP client: {0}")]
    Client(String),
    #[error("search request to {endpoint} failed: {message}")]
    Transport { endpoint: String, message: String },
    #[error("search request to {endpoint} timed out")]
    Timeout { endpoint: String },
    #[error("search endpoint {endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },
    #[error("malformed response from {endpoint}: {message}")]
    Malformed { endpoint: String, message: String },
}

/// Client trait for the bibliographic search backend.
///
/// Abstracts over transport (HTTP, mock) so the gateway does not depend on
/// how the index is reached.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run `query` against `endpoint`, requesting only `fields`.
    async fn search(
        &self,
        endpoint: &str,
        query: &str,
        fields: &[&str],
    ) -> Result<Vec<Document>, ProviderError>;
}

/// Mock provider for testing: returns preconfigured documents.
///
/// Responses are looked up by (endpoint, query) first, then by query alone.
/// Unknown queries return no documents. Every call is recorded.
#[derive(Default)]
pub struct MockProvider {
    by_endpoint: HashMap<(String, String), Result<Vec<Document>, ProviderError>>,
    by_query: HashMap<String, Result<Vec<Document>, ProviderError>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register documents returned for `query` on any endpoint.
    pub fn with_docs(mut self, query: impl Into<String>, docs: Vec<Document>) -> Self {
        self.by_query.insert(query.into(), Ok(docs));
        self
    }

    /// Register documents returned for `query` on one endpoint only.
    pub fn with_endpoint_docs(
        mut self,
        endpoint: impl Into<String>,
        query: impl Into<String>,
        docs: Vec<Document>,
    ) -> Self {
        self.by_endpoint
            .insert((endpoint.into(), query.into()), Ok(docs));
        self
    }

    /// Register a failure for `query` on one endpoint.
    pub fn with_endpoint_failure(
        mut self,
        endpoint: impl Into<String>,
        query: impl Into<String>,
        error: ProviderError,
    ) -> Self {
        self.by_endpoint
            .insert((endpoint.into(), query.into()), Err(error));
        self
    }

    /// Register a failure for `query` on any endpoint.
    pub fn with_failure(mut self, query: impl Into<String>, error: ProviderError) -> Self {
        self.by_query.insert(query.into(), Err(error));
        self
    }

    /// Recorded (endpoint, query) pairs, in call order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls().len()
    }
}

#[async_trait]
impl SearchProvider for MockProvider {
    async fn search(
        &self,
        endpoint: &str,
        query: &str,
        _fields: &[&str],
    ) -> Result<Vec<Document>, ProviderError> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((endpoint.to_string(), query.to_string()));

        let key = (endpoint.to_string(), query.to_string());
        match self.by_endpoint.get(&key).or_else(|| self.by_query.get(query)) {
            Some(response) => response.clone(),
            None => Ok(Vec::new()),
        }
    }
}

/// Helper to build a [`Document`] from a JSON object literal.
///
/// Non-object values yield an empty document.
pub fn mock_document(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        _ => Document::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn mock_returns_registered_docs() {
        let provider = MockProvider::new()
            .with_docs("q", vec![mock_document(json!({"title_s": ["T"]}))]);

        let docs = provider.search("http://a/search/", "q", &["title_s"]).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["title_s"], json!(["T"]));
    }

    #[tokio::test]
    async fn mock_unknown_query_is_empty() {
        let provider = MockProvider::new();
        let docs = provider.search("http://a/search/", "nothing", &[]).await.unwrap();
        assert!(docs.is_empty());
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn mock_endpoint_specific_wins() {
        let provider = MockProvider::new()
            .with_docs("q", vec![mock_document(json!({"n": 1}))])
            .with_endpoint_failure(
                "http://b/search/",
                "q",
                ProviderError::Timeout { endpoint: "http://b/search/".into() },
            );

        assert!(provider.search("http://a/search/", "q", &[]).await.is_ok());
        let err = provider.search("http://b/search/", "q", &[]).await.unwrap_err();
        assert!(matches!(err, ProviderError::Timeout { .. }));
        assert_eq!(
            provider.calls(),
            vec![
                ("http://a/search/".to_string(), "q".to_string()),
                ("http://b/search/".to_string(), "q".to_string()),
            ]
        );
    }
}
