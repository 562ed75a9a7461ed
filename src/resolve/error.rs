//! Resolution errors

use crate::search::ProviderError;
use thiserror::Error;

/// Errors that abort the resolution of a request.
///
/// Neither kind reaches the caller as an application error: an aborted
/// resolution simply produces no answer.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("search provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("internal consistency error: {0}")]
    Inconsistent(String),
}

/// Result type for resolution
pub type ResolveResult<T> = Result<T, ResolveError>;
