//! Field names of the search index and helpers to read them
//!
//! Solr returns multi-valued fields as arrays and single-valued fields as
//! scalars; the readers below accept either.

use crate::search::Document;
use serde_json::Value;

pub const ABSTRACT: &str = "abstract_s";
pub const RELEASED_DATE: &str = "releasedDate_s";
pub const MODIFIED_YEAR: &str = "modifiedDateY_i";
pub const URI: &str = "uri_s";
pub const HAL_ID: &str = "halId_s";
pub const TITLE: &str = "title_s";
pub const AUTHOR_FULL_NAME: &str = "authFullName_s";
pub const AUTHOR_FIRST_NAME: &str = "authFirstName_s";
pub const AUTHOR_LAST_NAME: &str = "authLastName_s";
pub const AUTHOR_ID: &str = "authId_i";
pub const ARXIV_ID: &str = "arxivId_s";
pub const AUTHOR_ORGANISM: &str = "authOrganism_s";
pub const LAB_STRUCT_NAME: &str = "labStructName_s";
pub const VERSION: &str = "version_i";
pub const LANGUAGE: &str = "language_s";

// Author referential
pub const REF_URL: &str = "url_s";
pub const REF_EMAIL: &str = "email_s";
pub const REF_FIRST_NAME: &str = "firstName_s";
pub const REF_LAST_NAME: &str = "lastName_s";
pub const REF_FULL_NAME: &str = "fullName_s";

/// Fields requested from the papers API
pub const PAPER_FIELDS: &[&str] = &[
    ABSTRACT,
    RELEASED_DATE,
    MODIFIED_YEAR,
    URI,
    HAL_ID,
    TITLE,
    AUTHOR_FULL_NAME,
    AUTHOR_FIRST_NAME,
    AUTHOR_LAST_NAME,
    AUTHOR_ID,
    ARXIV_ID,
    AUTHOR_ORGANISM,
    LAB_STRUCT_NAME,
    VERSION,
    LANGUAGE,
];

/// Fields requested from the author referential
pub const AUTHOR_FIELDS: &[&str] = &[REF_URL, REF_EMAIL, REF_FIRST_NAME, REF_LAST_NAME, REF_FULL_NAME];

/// All values of a field; absent and null fields have none.
pub fn values<'a>(record: &'a Document, field: &str) -> Vec<&'a Value> {
    match record.get(field) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().filter(|v| !v.is_null()).collect(),
        Some(v) => vec![v],
    }
}

/// First string value of a field
pub fn first_str<'a>(record: &'a Document, field: &str) -> Option<&'a str> {
    values(record, field).into_iter().find_map(Value::as_str)
}

/// String and numeric values of a field, rendered as strings
pub fn strings(record: &Document, field: &str) -> Vec<String> {
    values(record, field)
        .into_iter()
        .filter_map(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect()
}

/// The field's value with single-element arrays unwrapped; `None` when absent
pub fn scalar_or_list(record: &Document, field: &str) -> Option<Value> {
    match values(record, field).as_slice() {
        [] => None,
        [one] => Some((*one).clone()),
        many => Some(Value::Array(many.iter().map(|v| (*v).clone()).collect())),
    }
}
