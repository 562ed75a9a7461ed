//! JSON-LD graphs for papers and authors
//!
//! Maps raw paper records from the search index to schema.org graphs. The
//! builders are pure: the same record always yields the same graph, and no
//! network or cache access happens here.

pub mod fields;

use crate::search::Document;
use crate::tree::{Graph, Resource};
use fields::*;
use serde_json::{json, Value};

const SCHEMA_CONTEXT: &str = "http://schema.org";
const ARXIV_ABS: &str = "http://arxiv.org/abs/";
const HAL_RECORD: &str = "https://hal.archives-ouvertes.fr/";
const HAL_AUTHOR: &str = "https://data.archives-ouvertes.fr/author/";
const HAL_ICON: &str = "https://hal.archives-ouvertes.fr/img/favicon.png";

/// Build the `ScholarlyArticle` graph of a paper record.
///
/// Fields absent from the record are left out of the graph, as are derived
/// lists (`sameAs`, `sourceOrganization`, `author`) that would be empty.
pub fn build_paper_graph(record: &Document) -> Graph {
    let mut graph = Graph::new();
    graph.insert("@context".into(), json!(SCHEMA_CONTEXT));
    graph.insert("@type".into(), json!("ScholarlyArticle"));

    let uri = first_str(record, URI);
    if let Some(uri) = uri {
        graph.insert("@id".into(), json!(uri));
        graph.insert("url".into(), json!(uri));
    }

    for (field, key) in [
        (TITLE, "name"),
        (ABSTRACT, "description"),
        (RELEASED_DATE, "datePublished"),
        (MODIFIED_YEAR, "dateModified"),
        (VERSION, "version"),
        (LANGUAGE, "inLanguage"),
    ] {
        if let Some(value) = scalar_or_list(record, field) {
            graph.insert(key.into(), value);
        }
    }

    let same_as: Vec<String> = strings(record, ARXIV_ID)
        .into_iter()
        .map(|id| format!("{}{}", ARXIV_ABS, id))
        .chain(
            strings(record, HAL_ID)
                .into_iter()
                .map(|id| format!("{}{}", HAL_RECORD, id)),
        )
        .collect();
    if !same_as.is_empty() {
        graph.insert("sameAs".into(), json!(same_as));
    }

    let organizations: Vec<Value> = strings(record, AUTHOR_ORGANISM)
        .into_iter()
        .chain(strings(record, LAB_STRUCT_NAME))
        .map(|name| json!({"@type": "Organization", "name": name}))
        .collect();
    if !organizations.is_empty() {
        graph.insert("sourceOrganization".into(), Value::Array(organizations));
    }

    let authors: Vec<Value> = author_stubs(record).into_iter().map(Value::Object).collect();
    if !authors.is_empty() {
        graph.insert("author".into(), Value::Array(authors));
    }

    if let Some(uri) = uri {
        graph.insert(
            "potentialAction".into(),
            json!({
                "@type": "ViewAction",
                "image": HAL_ICON,
                "target": uri,
                "name": [
                    {"@language": "en", "@value": "View on HAL"},
                    {"@language": "fr", "@value": "Voir sur HAL"}
                ]
            }),
        );
    }

    graph
}

/// Positional author ids of a record, one slot per full name.
///
/// Every slot is `None` when the ids do not line up with the names.
pub fn author_ids(record: &Document) -> Vec<Option<String>> {
    let names = strings(record, AUTHOR_FULL_NAME).len();
    let ids = strings(record, AUTHOR_ID);
    if ids.len() == names {
        ids.into_iter().map(Some).collect()
    } else {
        vec![None; names]
    }
}

/// `Person` stubs for the authors of a paper record, in record order.
///
/// Given names, family names and ids are positional companions of the full
/// names; they are only used when their count matches.
pub fn author_stubs(record: &Document) -> Vec<Graph> {
    let names = strings(record, AUTHOR_FULL_NAME);
    let aligned = |field: &str| {
        let values = strings(record, field);
        (values.len() == names.len()).then_some(values)
    };
    let given = aligned(AUTHOR_FIRST_NAME);
    let family = aligned(AUTHOR_LAST_NAME);

    names
        .iter()
        .zip(author_ids(record))
        .enumerate()
        .map(|(i, (name, id))| {
            let mut stub = Graph::new();
            stub.insert("@type".into(), json!("Person"));
            if let Some(id) = id {
                stub.insert("@id".into(), json!(format!("{}{}", HAL_AUTHOR, id)));
            }
            stub.insert("name".into(), json!(name));
            if let Some(given) = &given {
                stub.insert("givenName".into(), json!(given[i]));
            }
            if let Some(family) = &family {
                stub.insert("familyName".into(), json!(family[i]));
            }
            stub
        })
        .collect()
}

/// Build the graphs of every author of a paper record.
///
/// Each graph is a standalone schema.org document and points back at the paper through `@reverse.author`,
/// with the paper graph stripped of its own author list.
pub fn build_author_graphs(record: &Document) -> Vec<Graph> {
    let mut paper = build_paper_graph(record);
    let Some(Value::Array(authors)) = paper.remove("author") else {
        return Vec::new();
    };
    let reverse = json!({ "author": Value::Object(paper) });

    authors
        .into_iter()
        .filter_map(|author| match author {
            Value::Object(mut graph) => {
                graph.insert("@context".into(), json!(SCHEMA_CONTEXT));
                graph.insert("@reverse".into(), reverse.clone());
                Some(graph)
            }
            _ => None,
        })
        .collect()
}

/// `sameAs` links of an author-referential record.
///
/// Emails become `mailto:` URIs. URLs are only kept when they mention the
/// author's last name.
pub fn author_same_as(record: &Document) -> Vec<String> {
    let last_name = first_str(record, REF_LAST_NAME)
        .map(str::to_lowercase)
        .filter(|n| !n.is_empty());
    let emails = strings(record, REF_EMAIL)
        .into_iter()
        .map(|email| format!("mailto:{}", email));
    let urls = strings(record, REF_URL).into_iter().filter(|url| {
        last_name
            .as_deref()
            .is_some_and(|name| url.to_lowercase().contains(name))
    });
    emails.chain(urls).collect()
}

/// Fold an author-referential record into an author graph.
///
/// Adds the record's `sameAs` links after any already present, and fills
/// in given and family names the paper record did not carry.
pub fn merge_author_record(graph: &mut Graph, record: &Document) {
    for (field, key) in [(REF_FIRST_NAME, "givenName"), (REF_LAST_NAME, "familyName")] {
        if graph.contains_key(key) {
            continue;
        }
        if let Some(value) = first_str(record, field) {
            graph.insert(key.into(), json!(value));
        }
    }

    let links = author_same_as(record);
    if links.is_empty() {
        return;
    }
    let mut same_as = match graph.remove("sameAs") {
        Some(Value::Array(items)) => items,
        Some(other) => vec![other],
        None => Vec::new(),
    };
    for link in links {
        let link = Value::String(link);
        if !same_as.contains(&link) {
            same_as.push(link);
        }
    }
    graph.insert("sameAs".into(), Value::Array(same_as));
}

/// The paper of a record as a linked-data resource named by its title.
///
/// Records without a title yield nothing.
pub fn paper_resource(record: &Document) -> Option<Resource> {
    let title = first_str(record, TITLE)?;
    Some(Resource::with_graph(title, build_paper_graph(record)))
}

/// The authors of a record as linked-data resources named by full name.
pub fn author_resources(record: &Document) -> Vec<Resource> {
    build_author_graphs(record)
        .into_iter()
        .filter_map(|graph| {
            let name = graph.get("name")?.as_str()?.to_string();
            Some(Resource::with_graph(name, graph))
        })
        .collect()
}
