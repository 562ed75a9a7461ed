//! Result caching
//!
//! [`ResultCache`] memoizes search results under a digest of the request
//! tuple. The bytes themselves live in a [`CacheStore`]: [`MemoryStore`] for
//! a single process, [`SqliteStore`] when the cache should outlive it.

mod memory;
mod result;
mod sqlite;
mod traits;

pub use memory::MemoryStore;
pub use result::{cache_key, ResultCache};
pub use sqlite::SqliteStore;
pub use traits::{CacheError, CacheResult, CacheStore, OpenStore};
