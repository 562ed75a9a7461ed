//! Query tree model
//!
//! Immutable value types representing a semantic query. Rewrites never
//! mutate a tree in place: every step builds a new tree, so successive
//! trees can be compared structurally to detect a fixpoint.

mod normalize;


pub use normalize::normalize;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::hash::{Hash, Hasher};

/// A JSON-LD graph attached to a resource.
pub type Graph = Map<String, Value>;

/// A literal leaf value, optionally decorated with a JSON-LD graph.
///
/// Equality and hashing only look at `value`. Use [`Resource::identical`]
/// when the attached graph must match as well.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph: Option<Graph>,
}

impl Resource {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            graph: None,
        }
    }

    /// Create a linked-data resource carrying a JSON-LD graph
    pub fn with_graph(value: impl Into<String>, graph: Graph) -> Self {
        Self {
            value: value.into(),
            graph: Some(graph),
        }
    }

    /// Compare both the value and the attached graph.
    pub fn identical(&self, other: &Resource) -> bool {
        self.value == other.value && self.graph == other.graph
    }
}

impl PartialEq for Resource {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for Resource {}

impl Hash for Resource {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Subject–predicate–object relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triple {
    pub subject: Tree,
    pub predicate: Tree,
    pub object: Tree,
}

impl Triple {
    /// Predicates this triple matches on.
    ///
    /// A list predicate matches if any of its resources matches; any other
    /// shape of predicate contributes nothing.
    pub fn predicate_set(&self) -> Vec<&Resource> {
        match &self.predicate {
            Tree::Resource(r) => vec![r],
            Tree::List { list } => list.iter().filter_map(Tree::as_resource).collect(),
            _ => Vec::new(),
        }
    }
}

/// A node of a semantic query tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Tree {
    /// Unknown value, to be filled in
    Missing,
    Resource(Resource),
    /// Ordered sequence; duplicates and order are preserved
    List { list: Vec<Tree> },
    Triple(Box<Triple>),
    Intersection { list: Vec<Tree> },
    Union { list: Vec<Tree> },
}

impl Tree {
    pub fn resource(value: impl Into<String>) -> Self {
        Tree::Resource(Resource::new(value))
    }

    pub fn list(items: Vec<Tree>) -> Self {
        Tree::List { list: items }
    }

    pub fn triple(subject: Tree, predicate: Tree, object: Tree) -> Self {
        Tree::Triple(Box::new(Triple {
            subject,
            predicate,
            object,
        }))
    }

    pub fn intersection(items: Vec<Tree>) -> Self {
        Tree::Intersection { list: items }
    }

    pub fn union(items: Vec<Tree>) -> Self {
        Tree::Union { list: items }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Tree::Missing)
    }

    pub fn as_resource(&self) -> Option<&Resource> {
        match self {
            Tree::Resource(r) => Some(r),
            _ => None,
        }
    }

    /// True for a list node with no elements
    pub fn is_empty_list(&self) -> bool {
        matches!(self, Tree::List { list } if list.is_empty())
    }

    /// Number of nodes in the tree, this node included.
    pub fn size(&self) -> usize {
        match self {
            Tree::Missing | Tree::Resource(_) => 1,
            Tree::List { list } | Tree::Intersection { list } | Tree::Union { list } => {
                1 + list.iter().map(Tree::size).sum::<usize>()
            }
            Tree::Triple(t) => 1 + t.subject.size() + t.predicate.size() + t.object.size(),
        }
    }
}

impl From<Resource> for Tree {
    fn from(r: Resource) -> Self {
        Tree::Resource(r)
    }
}
