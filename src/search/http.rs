//! HTTP search provider for Solr-style bibliographic APIs.
//!
//! Issues `GET {endpoint}?q=..&wt=json&fl=..` and reads the documents from
//! `response.docs` of the JSON body.

use super::provider::{Document, ProviderError, SearchProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Provider that talks to the search index over HTTP.
#[derive(Clone)]
pub struct HttpSearchProvider {
    client: Client,
    request_timeout: Duration,
}

impl HttpSearchProvider {
    /// Create a provider with explicit connect and request timeouts.
    pub fn with_timeouts(
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()
            .map_err(|e| ProviderError::Client(e.to_string()))?;

        Ok(Self {
            client,
            request_timeout,
        })
    }
}

impl fmt::Debug for HttpSearchProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpSearchProvider")
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Query-string parameters for a field-filtered query
pub fn query_params(query: &str, fields: &[&str]) -> Vec<(&'static str, String)> {
    vec![
        ("q", query.to_string()),
        ("wt", "json".to_string()),
        ("fl", fields.join(",")),
    ]
}

/// Extract the documents from a response body.
///
/// Anything other than a JSON object with a `response.docs` array of
/// objects is malformed.
pub fn parse_docs(endpoint: &str, body: &str) -> Result<Vec<Document>, ProviderError> {
    let malformed = |message: String| ProviderError::Malformed {
        endpoint: endpoint.to_string(),
        message,
    };

    let value: Value = serde_json::from_str(body).map_err(|e| malformed(e.to_string()))?;
    let docs = value
        .get("response")
        .and_then(|r| r.get("docs"))
        .and_then(Value::as_array)
        .ok_or_else(|| malformed("missing response.docs array".to_string()))?;

    docs.iter()
        .enumerate()
        .map(|(i, doc)| match doc {
            Value::Object(map) => Ok(map.clone()),
            _ => Err(malformed(format!("document {} is not an object", i))),
        })
        .collect()
}

#[async_trait]
impl SearchProvider for HttpSearchProvider {
    async fn search(
        &self,
        endpoint: &str,
        query: &str,
        fields: &[&str],
    ) -> Result<Vec<Document>, ProviderError> {
        let response = self
            .client
            .get(endpoint)
            .query(&query_params(query, fields))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout {
                        endpoint: endpoint.to_string(),
                    }
                } else {
                    ProviderError::Transport {
                        endpoint: endpoint.to_string(),
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| ProviderError::Transport {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })?;

        parse_docs(endpoint, &body)
    }
}
