//! bibresolve: authorship resolution for semantic query trees
//!
//! Answers "who wrote this paper?" and "what did this person write?" over
//! HAL-style bibliographic search indexes. A question arrives as a query
//! tree; every authorship triple with one unknown side is rewritten into the
//! list of matching resources, each decorated with a schema.org JSON-LD
//! graph, until the tree stops changing.
//!
//! # Core Concepts
//!
//! - **Trees**: immutable query trees, normalized bottom-up ([`tree`])
//! - **Gateway**: fan-out over the configured endpoints behind a result
//!   cache ([`search`], [`cache`])
//! - **Resolver**: the fixpoint rewrite engine and its authorship rule
//!   ([`resolve`])
//!
//! # Example
//!
//! ```
//! use bibresolve::{normalize, Tree};
//!
//! let tree = Tree::list(vec![Tree::list(vec![Tree::resource("Eddy Caron")])]);
//! assert_eq!(normalize(&tree), Tree::resource("Eddy Caron"));
//! ```

pub mod cache;
pub mod config;
pub mod envelope;
pub mod jsonld;
pub mod mcp;
pub mod resolve;
pub mod search;
pub mod tree;

pub use cache::{CacheError, CacheResult, CacheStore, MemoryStore, OpenStore, ResultCache, SqliteStore};
pub use config::{CacheBackend, CacheConfig, Config, ConfigError, CONFIG_ENV};
pub use envelope::{Measures, Request, Response, TraceItem};
pub use resolve::{AuthorshipRule, ResolveError, ResolveResult, Resolver, ResolverOptions};
pub use search::{Api, Document, HttpSearchProvider, ProviderError, SearchGateway, SearchProvider};
pub use tree::{normalize, Graph, Resource, Tree, Triple};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
