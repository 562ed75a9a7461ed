//! Fan-out over the configured search endpoints, behind the result cache.

use super::provider::{Document, ProviderError, SearchProvider};
use crate::cache::ResultCache;
use std::sync::Arc;

/// Which API of the index a query targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Api {
    /// Paper search
    Papers,
    /// Author referential
    Authors,
}

impl Api {
    /// Path of the API relative to an endpoint root
    pub fn path(&self) -> &'static str {
        match self {
            Api::Papers => "search",
            Api::Authors => "ref/author",
        }
    }
}

/// Issues one query to every configured endpoint and merges the results.
#[derive(Clone)]
pub struct SearchGateway {
    provider: Arc<dyn SearchProvider>,
    cache: ResultCache,
    endpoints: Vec<String>,
}

impl SearchGateway {
    pub fn new(provider: Arc<dyn SearchProvider>, cache: ResultCache, endpoints: Vec<String>) -> Self {
        Self {
            provider,
            cache,
            endpoints,
        }
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// URL of `api` under the endpoint root `base`
    pub fn endpoint_url(base: &str, api: Api) -> String {
        format!("{}/{}/", base.trim_end_matches('/'), api.path())
    }

    /// Cache-key selector: the endpoint URLs `api` resolves to, in order
    fn selector(&self, api: Api) -> String {
        self.endpoints
            .iter()
            .map(|base| Self::endpoint_url(base, api))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Run a field-filtered query against every endpoint.
    ///
    /// Results are concatenated in endpoint order, each endpoint's own order
    /// preserved. One failing endpoint fails the whole query. Results are
    /// memoized per (query, fields, endpoint URLs).
    pub async fn search(
        &self,
        query: &str,
        fields: &[&str],
        api: Api,
    ) -> Result<Vec<Document>, ProviderError> {
        let selector = self.selector(api);
        self.cache
            .get_or_compute(query, fields, &selector, || self.fetch_all(query, fields, api))
            .await
    }

    async fn fetch_all(
        &self,
        query: &str,
        fields: &[&str],
        api: Api,
    ) -> Result<Vec<Document>, ProviderError> {
        let mut docs = Vec::new();
        for base in &self.endpoints {
            let url = Self::endpoint_url(base, api);
            let batch = self.provider.search(&url, query, fields).await?;
            tracing::debug!(endpoint = %url, %query, count = batch.len(), "search endpoint answered");
            docs.extend(batch);
        }
        Ok(docs)
    }
}

impl std::fmt::Debug for SearchGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchGateway")
            .field("endpoints", &self.endpoints)
            .field("cache", &self.cache)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;
    use crate::search::provider::{mock_document, MockProvider};
    use serde_json::json;
    use std::time::Duration;

    const A: &str = "http://a.example.org";
    const B: &str = "http://b.example.org/";

    fn gateway(provider: Arc<MockProvider>, endpoints: &[&str]) -> SearchGateway {
        let cache = ResultCache::new(Arc::new(MemoryStore::new()), Duration::from_secs(60));
        SearchGateway::new(
            provider,
            cache,
            endpoints.iter().map(|e| e.to_string()).collect(),
        )
    }

    fn doc(n: i64) -> Document {
        mock_document(json!({ "n": n }))
    }

    #[test]
    fn endpoint_url_joins_api_path() {
        assert_eq!(SearchGateway::endpoint_url(A, Api::Papers), "http://a.example.org/search/");
        assert_eq!(
            SearchGateway::endpoint_url(B, Api::Authors),
            "http://b.example.org/ref/author/"
        );
    }

    #[tokio::test]
    async fn concatenates_in_endpoint_order() {
        let provider = Arc::new(
            MockProvider::new()
                .with_endpoint_docs("http://a.example.org/search/", "q", vec![doc(1), doc(2)])
                .with_endpoint_docs("http://b.example.org/search/", "q", vec![doc(3)]),
        );
        let gw = gateway(provider.clone(), &[B, A]);

        let docs = gw.search("q", &["n"], Api::Papers).await.unwrap();
        let ns: Vec<i64> = docs.iter().map(|d| d["n"].as_i64().unwrap()).collect();
        assert_eq!(ns, vec![3, 1, 2]);
    }

    #[tokio::test]
    async fn repeated_query_hits_cache() {
        let provider = Arc::new(MockProvider::new().with_docs("q", vec![doc(1)]));
        let gw = gateway(provider.clone(), &[A, B]);

        gw.search("q", &["n"], Api::Papers).await.unwrap();
        gw.search("q", &["n"], Api::Papers).await.unwrap();
        assert_eq!(provider.call_count(), 2, "one call per endpoint, once");

        gw.search("q", &["n"], Api::Authors).await.unwrap();
        assert_eq!(provider.call_count(), 4, "other api is another key");
    }

    #[tokio::test]
    async fn endpoint_list_is_part_of_the_key() {
        let provider = Arc::new(MockProvider::new().with_docs("q", vec![doc(1)]));
        let store = Arc::new(MemoryStore::new());
        let cache = ResultCache::new(store, Duration::from_secs(60));
        let first = SearchGateway::new(provider.clone(), cache.clone(), vec![A.to_string()]);
        let second = SearchGateway::new(provider.clone(), cache, vec![A.to_string(), B.to_string()]);

        first.search("q", &["n"], Api::Papers).await.unwrap();
        let docs = second.search("q", &["n"], Api::Papers).await.unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn one_failing_endpoint_fails_query() {
        let provider = Arc::new(
            MockProvider::new()
                .with_docs("q", vec![doc(1)])
                .with_endpoint_failure(
                    "http://b.example.org/search/",
                    "q",
                    ProviderError::Malformed {
                        endpoint: "http://b.example.org/search/".into(),
                        message: "not json".into(),
                    },
                ),
        );
        let gw = gateway(provider.clone(), &[A, B]);

        let err = gw.search("q", &["n"], Api::Papers).await.unwrap_err();
        assert!(matches!(err, ProviderError::Malformed { .. }));

        // Failures are not cached
        gw.search("q", &["n"], Api::Papers).await.unwrap_err();
        assert_eq!(provider.call_count(), 4);
    }

    #[tokio::test]
    async fn no_endpoints_yields_nothing() {
        let provider = Arc::new(MockProvider::new().with_docs("q", vec![doc(1)]));
        let gw = gateway(provider.clone(), &[]);

        assert!(gw.search("q", &["n"], Api::Papers).await.unwrap().is_empty());
        assert_eq!(provider.call_count(), 0);
    }
}
