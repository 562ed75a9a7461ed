//! Fixpoint traversal engine
//!
//! Normalize, rewrite every authorship triple bottom-up, and repeat until a
//! pass leaves the tree unchanged.

use super::error::{ResolveError, ResolveResult};
use super::rule::{is_authorship, AuthorshipRule, DEFAULT_TITLE_SLOP};
use crate::envelope::{Measures, Request, Response};
use crate::search::SearchGateway;
use crate::tree::{normalize, Tree, Triple};
use std::future::Future;
use std::pin::Pin;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Name this resolver signs its trace entries with, unless configured
pub const DEFAULT_MODULE_NAME: &str = "HAL";

/// Pass cap, unless configured
pub const DEFAULT_MAX_PASSES: usize = 16;

/// Tunables of a [`Resolver`]
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    pub module_name: String,
    pub title_slop: u32,
    pub max_passes: usize,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            module_name: DEFAULT_MODULE_NAME.to_string(),
            title_slop: DEFAULT_TITLE_SLOP,
            max_passes: DEFAULT_MAX_PASSES,
        }
    }
}

/// Answers authorship questions by rewriting query trees to a fixpoint.
#[derive(Debug, Clone)]
pub struct Resolver {
    rule: AuthorshipRule,
    options: ResolverOptions,
}

impl Resolver {
    pub fn new(gateway: SearchGateway, options: ResolverOptions) -> Self {
        let rule = AuthorshipRule::new(gateway).with_title_slop(options.title_slop);
        Self { rule, options }
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Answer a request.
    ///
    /// Returns one response carrying the final tree, or none when the
    /// resolution aborted or ended on an empty list.
    pub async fn answer(&self, request: &Request) -> Vec<Response> {
        match self.resolve(request.tree.clone()).await {
            Ok(tree) if tree.is_empty_list() => {
                tracing::debug!(request_id = %request.id, "empty result, no answer");
                Vec::new()
            }
            Ok(tree) => vec![Response::answer(
                request,
                tree,
                Measures::new(),
                &self.options.module_name,
            )],
            Err(e @ ResolveError::Provider(_)) => {
                tracing::warn!(request_id = %request.id, error = %e, "resolution aborted");
                Vec::new()
            }
            Err(e @ ResolveError::Inconsistent(_)) => {
                tracing::error!(request_id = %request.id, error = %e, "resolution aborted");
                Vec::new()
            }
        }
    }

    /// Rewrite `tree` until a pass no longer changes it.
    pub async fn resolve(&self, tree: Tree) -> ResolveResult<Tree> {
        let mut current = tree;
        for pass in 1..=self.options.max_passes {
            let normalized = normalize(&current);
            let rewritten = self.rewrite_pass(&normalized).await?;
            if rewritten == normalized {
                tracing::debug!(passes = pass, "fixpoint reached");
                return Ok(rewritten);
            }
            current = rewritten;
        }
        Err(ResolveError::Inconsistent(format!(
            "no fixpoint after {} passes",
            self.options.max_passes
        )))
    }

    /// One bottom-up rewrite of every authorship triple in `tree`.
    pub fn rewrite_pass<'a>(&'a self, tree: &'a Tree) -> BoxFuture<'a, ResolveResult<Tree>> {
        Box::pin(async move {
            match tree {
                Tree::Missing | Tree::Resource(_) => Ok(tree.clone()),
                Tree::List { list } => Ok(Tree::List {
                    list: self.rewrite_all(list).await?,
                }),
                Tree::Intersection { list } => Ok(Tree::Intersection {
                    list: self.rewrite_all(list).await?,
                }),
                Tree::Union { list } => Ok(Tree::Union {
                    list: self.rewrite_all(list).await?,
                }),
                Tree::Triple(t) => {
                    let triple = Triple {
                        subject: self.rewrite_pass(&t.subject).await?,
                        predicate: self.rewrite_pass(&t.predicate).await?,
                        object: self.rewrite_pass(&t.object).await?,
                    };
                    if is_authorship(&triple) {
                        self.rule.replace(&triple).await
                    } else {
                        Ok(Tree::Triple(Box::new(triple)))
                    }
                }
            }
        })
    }

    fn rewrite_all<'a>(&'a self, items: &'a [Tree]) -> BoxFuture<'a, ResolveResult<Vec<Tree>>> {
        Box::pin(async move {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(self.rewrite_pass(item).await?);
            }
            Ok(out)
        })
    }
}
