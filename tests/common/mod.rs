//! Common test utilities for resolver integration tests
//!
//! Paper records shaped like the HAL search API returns them, and a resolver
//! wired over a [`MockProvider`] and an in-memory cache.

#![allow(dead_code)]

use bibresolve::search::{mock_document, MockProvider};
use bibresolve::{Config, Document, MemoryStore, Request, Resolver, Tree};
use serde_json::json;
use std::sync::Arc;

pub const ENDPOINT: &str = "http://api.archives-ouvertes.fr";
pub const PAPERS_URL: &str = "http://api.archives-ouvertes.fr/search/";
pub const AUTHORS_URL: &str = "http://api.archives-ouvertes.fr/ref/author/";

pub const PAPER_TITLE: &str = "A Hierarchical Resource Reservation Algorithm for Network Enabled Servers";

/// A paper by Eddy Caron and Frédéric Desprez
pub fn reservation_paper() -> Document {
    mock_document(json!({
        "title_s": [PAPER_TITLE],
        "uri_s": "https://hal.inria.fr/inria-00071584",
        "halId_s": "inria-00071584",
        "releasedDate_s": "2006-05-19",
        "abstract_s": ["This paper presents a hierarchical resource reservation algorithm."],
        "authFullName_s": ["Eddy Caron", "Frédéric Desprez"],
        "authFirstName_s": ["Eddy", "Frédéric"],
        "authLastName_s": ["Caron", "Desprez"],
        "authId_i": [1020, 1021],
        "labStructName_s": ["Laboratoire de l'Informatique du Parallélisme"],
        "language_s": ["en"]
    }))
}

/// Author-referential entry of Eddy Caron (docid 1020)
pub fn caron_referential_entry() -> Document {
    mock_document(json!({
        "fullName_s": "Eddy Caron",
        "firstName_s": "Eddy",
        "lastName_s": "Caron",
        "email_s": ["eddy.caron@ens-lyon.fr"],
        "url_s": ["http://graal.ens-lyon.fr/~ecaron/", "http://www.ens-lyon.fr/LIP/"]
    }))
}

/// A second paper by Eddy Caron, with a different co-author
pub fn scheduling_paper() -> Document {
    mock_document(json!({
        "title_s": ["Scheduling Independent Tasks on Grids"],
        "uri_s": "https://hal.inria.fr/inria-00000002",
        "halId_s": "inria-00000002",
        "authFullName_s": ["Eddy Caron", "Franck Petit"]
    }))
}

/// Resolver over `provider` with an in-memory cache and default options
pub fn resolver(provider: Arc<MockProvider>) -> Resolver {
    Config::new(vec![ENDPOINT.to_string()]).build_resolver_with(provider, Arc::new(MemoryStore::new()))
}

pub fn request(tree: Tree) -> Request {
    Request::new("test-request", "en", tree)
}

pub fn r(value: &str) -> Tree {
    Tree::resource(value)
}

/// Values of a list of resources, or of a single resource
pub fn values(tree: &Tree) -> Vec<String> {
    match tree {
        Tree::Resource(res) => vec![res.value.clone()],
        Tree::List { list } => list
            .iter()
            .filter_map(Tree::as_resource)
            .map(|res| res.value.clone())
            .collect(),
        other => panic!("expected resources, got {:?}", other),
    }
}
