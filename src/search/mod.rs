//! Bibliographic search
//!
//! [`SearchGateway`] fans a query out to every configured endpoint through a
//! [`SearchProvider`] and memoizes the merged result.

mod gateway;
mod http;
mod provider;

pub use gateway::{Api, SearchGateway};
pub use http::{parse_docs, query_params, HttpSearchProvider};
pub use provider::{mock_document, Document, MockProvider, ProviderError, SearchProvider};
