//! Query resolution
//!
//! [`Resolver`] drives the fixpoint traversal; [`AuthorshipRule`] is the
//! single domain rule it applies.

mod engine;
mod error;
mod rule;

pub use engine::{Resolver, ResolverOptions, DEFAULT_MAX_PASSES, DEFAULT_MODULE_NAME};
pub use error::{ResolveError, ResolveResult};
pub use rule::{
    author_query, docid_query, escape_phrase, is_authorship, title_query, AuthorshipRule,
    AUTHORSHIP_PREDICATES, DEFAULT_TITLE_SLOP,
};
