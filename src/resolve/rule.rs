//! The authorship rewrite rule
//!
//! Turns `(paper, author, ?)` into the authors of the paper and
//! `(?, author, person)` into the papers of the person. Titles are matched
//! with a proximity query since they are user-typed; author names are
//! matched exactly since they come from a structured field.

use super::error::ResolveResult;
use crate::jsonld::fields::{AUTHOR_FIELDS, AUTHOR_FULL_NAME, PAPER_FIELDS, TITLE};
use crate::jsonld::{author_ids, author_resources, merge_author_record, paper_resource};
use crate::search::{Api, SearchGateway};
use crate::tree::{Resource, Tree, Triple};

/// Predicates that trigger the rule
pub const AUTHORSHIP_PREDICATES: &[&str] = &["author", "writer"];

/// Default proximity slop for title matching
pub const DEFAULT_TITLE_SLOP: u32 = 3;

/// Whether any predicate of the triple denotes authorship
pub fn is_authorship(triple: &Triple) -> bool {
    triple
        .predicate_set()
        .iter()
        .any(|p| AUTHORSHIP_PREDICATES.contains(&p.value.as_str()))
}

/// Escape a value for use inside a quoted query phrase
pub fn escape_phrase(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '"' || c == '\\' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Proximity query on paper titles
pub fn title_query(title: &str, slop: u32) -> String {
    format!("{}:\"{}\"~{}", TITLE, escape_phrase(title), slop)
}

/// Exact query on author full names
pub fn author_query(name: &str) -> String {
    format!("{}:\"{}\"", AUTHOR_FULL_NAME, escape_phrase(name))
}

/// Author-referential lookup by document id
pub fn docid_query(id: &str) -> String {
    format!("docid:{}", id)
}

/// Rewrites authorship triples by looking them up in the search index.
#[derive(Debug, Clone)]
pub struct AuthorshipRule {
    gateway: SearchGateway,
    title_slop: u32,
}

impl AuthorshipRule {
    pub fn new(gateway: SearchGateway) -> Self {
        Self {
            gateway,
            title_slop: DEFAULT_TITLE_SLOP,
        }
    }

    /// Set the proximity slop used when matching titles
    pub fn with_title_slop(mut self, slop: u32) -> Self {
        self.title_slop = slop;
        self
    }

    /// Replacement for an authorship triple.
    ///
    /// | subject  | object   | result                          |
    /// |----------|----------|---------------------------------|
    /// | missing  | missing  | unchanged, too broad            |
    /// | concrete | concrete | unchanged, not a lookup         |
    /// | resource | missing  | list of the paper's authors     |
    /// | missing  | resource | list of the person's papers     |
    ///
    /// A side that is neither missing nor a resource (an unresolved
    /// sub-tree) also leaves the triple unchanged.
    pub async fn replace(&self, triple: &Triple) -> ResolveResult<Tree> {
        match (triple.subject.is_missing(), triple.object.is_missing()) {
            (true, true) => {
                tracing::debug!("authorship triple too broad, left unchanged");
                Ok(unchanged(triple))
            }
            (false, false) => Ok(unchanged(triple)),
            (false, true) => match triple.subject.as_resource() {
                Some(paper) => self.authors_of(paper).await,
                None => Ok(unchanged(triple)),
            },
            (true, false) => match triple.object.as_resource() {
                Some(person) => self.papers_by(person).await,
                None => Ok(unchanged(triple)),
            },
        }
    }

    /// Authors of every paper whose title is close to `paper`
    async fn authors_of(&self, paper: &Resource) -> ResolveResult<Tree> {
        let query = title_query(&paper.value, self.title_slop);
        let papers = self.gateway.search(&query, PAPER_FIELDS, Api::Papers).await?;

        let mut authors = Vec::new();
        for record in &papers {
            for (mut author, id) in author_resources(record).into_iter().zip(author_ids(record)) {
                if let Some(id) = id {
                    self.enrich(&mut author, &id).await?;
                }
                authors.push(Tree::Resource(author));
            }
        }
        tracing::debug!(title = %paper.value, papers = papers.len(), authors = authors.len(), "resolved authors");
        Ok(Tree::list(authors))
    }

    /// Merge the author-referential entry for `id` into the author's graph.
    ///
    /// Ids are unique in the referential; anything but exactly one entry
    /// leaves the stub as built from the paper record.
    async fn enrich(&self, author: &mut Resource, id: &str) -> ResolveResult<()> {
        let entries = self
            .gateway
            .search(&docid_query(id), AUTHOR_FIELDS, Api::Authors)
            .await?;
        match (entries.as_slice(), author.graph.as_mut()) {
            ([entry], Some(graph)) => merge_author_record(graph, entry),
            (entries, _) => {
                tracing::debug!(docid = %id, entries = entries.len(), "no unique referential entry, keeping stub")
            }
        }
        Ok(())
    }

    /// Papers listing `person` among their authors
    async fn papers_by(&self, person: &Resource) -> ResolveResult<Tree> {
        let query = author_query(&person.value);
        let papers = self.gateway.search(&query, PAPER_FIELDS, Api::Papers).await?;

        let resources: Vec<Tree> = papers
            .iter()
            .filter_map(paper_resource)
            .map(Tree::Resource)
            .collect();
        tracing::debug!(author = %person.value, papers = resources.len(), "resolved papers");
        Ok(Tree::list(resources))
    }
}

fn unchanged(triple: &Triple) -> Tree {
    Tree::Triple(Box::new(triple.clone()))
}
