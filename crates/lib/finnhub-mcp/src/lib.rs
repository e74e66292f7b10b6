//! MCP server implementation for finnhub-mcp.
//!
//! Each catalog entry becomes an rmcp tool route backed by one shared
//! [`RestAdapter`]; a `health` tool is always present.

mod helpers;
mod tools;
pub mod server;

use finnhub_core::{Catalog, RestAdapter};
use rmcp::{
    ErrorData,
    ServerHandler,
    handler::server::tool::ToolRouter,
    tool,
    tool_handler,
    tool_router,
};
use rmcp::model::{CallToolResult, Content, ServerCapabilities, ServerInfo, Tool};

pub use tools::call_rest_tool;

const SERVER_INSTRUCTIONS: &str = r"finnhub-mcp exposes Finnhub REST endpoints as MCP tools.

Every tool issues one GET against the configured Finnhub base URL and returns the
response as indented JSON. Bodies that are not JSON are returned as-is.

Notes:
- Tool arguments map one-to-one onto query parameters; pass values as strings.
- Dates use `YYYY-MM-DD`.
- Upstream errors (HTTP 400 and above) come back as error results carrying the raw body.
- `health` returns `ok`.";

/// MCP server wrapper around the catalog's tool routes.
#[derive(Clone)]
pub struct FinnhubMcp {
    tool_router: ToolRouter<Self>,
}

impl FinnhubMcp {
    /// Creates a server exposing every tool in `catalog`.
    #[must_use]
    pub fn new(catalog: &Catalog, adapter: &RestAdapter) -> Self {
        let tool_router = Self::tool_router_core() + tools::rest_router(catalog, adapter);
        Self { tool_router }
    }

    /// Tool definitions as advertised to clients.
    #[must_use]
    pub fn tools(&self) -> Vec<Tool> {
        self.tool_router.list_all()
    }
}

#[tool_router(router = tool_router_core, vis = "pub")]
impl FinnhubMcp {
    #[tool(description = "Health check. Returns 'ok'.")]
    async fn health(&self) -> Result<CallToolResult, ErrorData> {
        Ok(CallToolResult::success(vec![Content::text("ok")]))
    }
}

#[tool_handler]
impl ServerHandler for FinnhubMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}
