//! MCP tool parameter structs with schemars-derived JSON schemas.

use schemars::JsonSchema;
use serde::Deserialize;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ResolveParams {
    #[schemars(
        description = "Query tree in tagged JSON form, e.g. {\"type\": \"triple\", \"subject\": {\"type\": \"resource\", \"value\": \"<title>\"}, \"predicate\": {\"type\": \"resource\", \"value\": \"author\"}, \"object\": {\"type\": \"missing\"}}"
    )]
    pub tree: serde_json::Value,
    #[schemars(description = "Language of the question (default 'en')")]
    pub language: Option<String>,
}
