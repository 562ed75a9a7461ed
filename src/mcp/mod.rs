//! MCP server for bibresolve: exposes authorship resolution via the Model
//! Context Protocol.

pub mod params;

use params::*;
use crate::{Config, Request, Resolver, Tree};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt,
};
use std::sync::Arc;

const DEFAULT_LANGUAGE: &str = "en";

fn ok_text(text: String) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

fn err_text(msg: String) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::error(vec![Content::text(msg)]))
}

#[derive(Clone)]
pub struct BibresolveMcpServer {
    resolver: Arc<Resolver>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl BibresolveMcpServer {
    pub fn new(resolver: Arc<Resolver>) -> Self {
        Self {
            resolver,
            tool_router: Self::tool_router(),
        }
    }

    /// Decode the tree, answer it, and encode the responses
    async fn answer_json(&self, p: ResolveParams) -> Result<String, String> {
        let tree: Tree =
            serde_json::from_value(p.tree).map_err(|e| format!("invalid tree: {}", e))?;
        let language = p.language.unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
        let request = Request::new(uuid::Uuid::new_v4().to_string(), language, tree);

        let responses = self.resolver.answer(&request).await;
        serde_json::to_string_pretty(&responses).map_err(|e| e.to_string())
    }

    #[tool(
        description = "Resolve authorship questions in a query tree: fill in the authors of a paper or the papers of an author. Returns the JSON array of answers (empty when nothing was found)."
    )]
    async fn resolve(
        &self,
        Parameters(p): Parameters<ResolveParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.answer_json(p).await {
            Ok(json) => ok_text(json),
            Err(e) => err_text(e),
        }
    }
}

#[tool_handler]
impl ServerHandler for BibresolveMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "bibresolve MCP server: answers 'who wrote <paper>' and 'what did <author> write' against HAL-style bibliographic indexes"
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

pub fn run_mcp_server(config: Config) -> i32 {
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("failed to create tokio runtime: {}", e);
            return 1;
        }
    };

    rt.block_on(async {
        let resolver = match config.build_resolver() {
            Ok(r) => r,
            Err(e) => {
                eprintln!("failed to set up resolver: {}", e);
                return 1;
            }
        };

        let server = BibresolveMcpServer::new(Arc::new(resolver));

        tracing::info!(endpoints = config.apis.len(), "bibresolve mcp server starting on stdio");

        let service = match server.serve(rmcp::transport::stdio()).await {
            Ok(s) => s,
            Err(e) => {
                eprintln!("failed to start MCP server: {}", e);
                return 1;
            }
        };

        if let Err(e) = service.waiting().await {
            eprintln!("MCP server error: {}", e);
            return 1;
        }

        0
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;
    use crate::resolve::title_query;
    use crate::search::{mock_document, MockProvider};
    use serde_json::json;

    fn server(provider: MockProvider) -> BibresolveMcpServer {
        let config = Config::new(vec!["http://hal.example.org".to_string()]);
        let resolver = config.build_resolver_with(Arc::new(provider), Arc::new(MemoryStore::new()));
        BibresolveMcpServer::new(Arc::new(resolver))
    }

    #[tokio::test]
    async fn resolve_tool_returns_answers() {
        let provider = MockProvider::new().with_docs(
            title_query("P1", 3),
            vec![mock_document(json!({"title_s": ["P1"], "authFullName_s": ["A"]}))],
        );
        let s = server(provider);

        let params = ResolveParams {
            tree: json!({
                "type": "triple",
                "subject": {"type": "resource", "value": "P1"},
                "predicate": {"type": "resource", "value": "author"},
                "object": {"type": "missing"}
            }),
            language: Some("fr".to_string()),
        };
        let json = s.answer_json(params).await.unwrap();

        let answers: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(answers[0]["language"], "fr");
        assert_eq!(answers[0]["tree"]["value"], "A");
    }

    #[tokio::test]
    async fn resolve_tool_rejects_bad_tree() {
        let s = server(MockProvider::new());
        let params = ResolveParams {
            tree: json!({"type": "sentence", "value": "who wrote it?"}),
            language: None,
        };

        let err = s.answer_json(params).await.unwrap_err();
        assert!(err.starts_with("invalid tree"));
    }

    #[tokio::test]
    async fn unanswered_question_is_empty_array() {
        let s = server(MockProvider::new());
        let params = ResolveParams {
            tree: json!({
                "type": "triple",
                "subject": {"type": "resource", "value": "Unknown paper"},
                "predicate": {"type": "resource", "value": "author"},
                "object": {"type": "missing"}
            }),
            language: None,
        };

        let json = s.answer_json(params).await.unwrap();
        assert_eq!(serde_json::from_str::<serde_json::Value>(&json).unwrap(), json!([]));
    }
}
