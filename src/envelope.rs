//! Request and response envelopes
//!
//! The resolver reads the tree and trace from a [`Request`] and answers with
//! zero or one [`Response`]. Everything else is echoed untouched.

use crate::tree::Tree;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form measures attached to an answer or a trace step
pub type Measures = Map<String, Value>;

/// One processing step recorded in a trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceItem {
    /// Name of the module that produced `tree`
    pub module: String,
    pub tree: Tree,
    #[serde(default)]
    pub measures: Measures,
}

/// Inbound request as produced by the dispatch layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub id: String,
    pub language: String,
    pub tree: Tree,
    #[serde(default)]
    pub measures: Measures,
    #[serde(default)]
    pub trace: Vec<TraceItem>,
}

impl Request {
    pub fn new(id: impl Into<String>, language: impl Into<String>, tree: Tree) -> Self {
        Self {
            id: id.into(),
            language: language.into(),
            tree,
            measures: Measures::new(),
            trace: Vec::new(),
        }
    }

    /// Attach an existing trace
    pub fn with_trace(mut self, trace: Vec<TraceItem>) -> Self {
        self.trace = trace;
        self
    }
}

/// Outward answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub language: String,
    pub tree: Tree,
    #[serde(default)]
    pub measures: Measures,
    #[serde(default)]
    pub trace: Vec<TraceItem>,
}

impl Response {
    /// Build the answer of `module` to `request`.
    ///
    /// The request trace is extended with one step naming `module`.
    pub fn answer(request: &Request, tree: Tree, measures: Measures, module: &str) -> Self {
        let mut trace = request.trace.clone();
        trace.push(TraceItem {
            module: module.to_string(),
            tree: tree.clone(),
            measures: measures.clone(),
        });
        Self {
            language: request.language.clone(),
            tree,
            measures,
            trace,
        }
    }
}
