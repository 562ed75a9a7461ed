//! Structural canonicalization of query trees
//!
//! Bottom-up: every node is rebuilt from already-normalized children through
//! a smart constructor, so the output is a fixpoint of `normalize` and is
//! never larger than the input.

use super::{Resource, Tree};
use std::collections::HashSet;

/// Canonicalize a tree.
///
/// - singleton lists collapse to their element, nested lists are spliced
/// - unions and intersections of concrete answers are evaluated
/// - an intersection with an empty operand is empty
pub fn normalize(tree: &Tree) -> Tree {
    match tree {
        Tree::Missing => Tree::Missing,
        Tree::Resource(r) => Tree::Resource(r.clone()),
        Tree::List { list } => make_list(list.iter().map(normalize).collect()),
        Tree::Triple(t) => Tree::triple(
            normalize(&t.subject),
            normalize(&t.predicate),
            normalize(&t.object),
        ),
        Tree::Union { list } => make_union(list.iter().map(normalize).collect()),
        Tree::Intersection { list } => make_intersection(list.iter().map(normalize).collect()),
    }
}

fn make_list(items: Vec<Tree>) -> Tree {
    let mut flat = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Tree::List { list } => flat.extend(list),
            other => flat.push(other),
        }
    }
    if flat.len() == 1 {
        if let Some(only) = flat.pop() {
            return only;
        }
    }
    Tree::List { list: flat }
}

fn make_union(items: Vec<Tree>) -> Tree {
    let mut operands: Vec<Tree> = items.into_iter().filter(|t| !t.is_empty_list()).collect();
    match operands.len() {
        0 => return Tree::list(Vec::new()),
        1 => return operands.pop().unwrap_or(Tree::Missing),
        _ => {}
    }

    if !operands.iter().all(|t| concrete_items(t).is_some()) {
        return Tree::Union { list: operands };
    }

    let mut seen = HashSet::new();
    let merged = operands
        .iter()
        .filter_map(concrete_items)
        .flatten()
        .filter(|r| seen.insert(r.value.as_str()))
        .map(|r| Tree::Resource(r.clone()))
        .collect();
    make_list(merged)
}

fn make_intersection(mut items: Vec<Tree>) -> Tree {
    if items.is_empty() || items.iter().any(Tree::is_empty_list) {
        return Tree::list(Vec::new());
    }
    if items.len() == 1 {
        return items.pop().unwrap_or(Tree::Missing);
    }

    if !items.iter().all(|t| concrete_items(t).is_some()) {
        return Tree::Intersection { list: items };
    }

    let groups: Vec<Vec<&Resource>> = items.iter().filter_map(concrete_items).collect();
    let Some((first, rest)) = groups.split_first() else {
        return Tree::list(Vec::new());
    };
    let others: Vec<HashSet<&str>> = rest
        .iter()
        .map(|g| g.iter().map(|r| r.value.as_str()).collect())
        .collect();

    let mut seen = HashSet::new();
    let shared = first
        .iter()
        .filter(|r| others.iter().all(|o| o.contains(r.value.as_str())))
        .filter(|r| seen.insert(r.value.as_str()))
        .map(|r| Tree::Resource(Resource::clone(r)))
        .collect();
    make_list(shared)
}

/// The resources of a fully-resolved operand: a resource or a list of them.
fn concrete_items(tree: &Tree) -> Option<Vec<&Resource>> {
    match tree {
        Tree::Resource(r) => Some(vec![r]),
        Tree::List { list } => list.iter().map(Tree::as_resource).collect(),
        _ => None,
    }
}
