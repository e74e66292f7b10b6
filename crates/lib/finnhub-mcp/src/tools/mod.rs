//! REST-backed tool routes.
//!
//! Routes are built at runtime from the catalog instead of `#[tool]` methods,
//! so adding an endpoint never means adding a handler.

use std::sync::Arc;

use finnhub_core::{Catalog, RestAdapter, ToolDescriptor};
use rmcp::ErrorData;
use rmcp::handler::server::tool::{ToolRoute, ToolRouter};
use rmcp::model::{CallToolResult, JsonObject, Tool};
use serde_json::Value;

use crate::FinnhubMcp;
use crate::helpers::to_call_tool_result;

pub fn rest_router(catalog: &Catalog, adapter: &RestAdapter) -> ToolRouter<FinnhubMcp> {
    let mut router = ToolRouter::new();
    for descriptor in catalog.tools() {
        router.add_route(rest_route(descriptor.clone(), adapter.clone()));
    }
    router
}

fn rest_route(descriptor: ToolDescriptor, adapter: RestAdapter) -> ToolRoute<FinnhubMcp> {
    let tool = tool_definition(&descriptor);
    let descriptor = Arc::new(descriptor);
    ToolRoute::new_dyn(tool, move |context| {
        let descriptor = Arc::clone(&descriptor);
        let adapter = adapter.clone();
        let arguments = context.arguments;
        Box::pin(async move {
            Ok::<_, ErrorData>(call_rest_tool(&adapter, &descriptor, arguments).await)
        })
    })
}

fn tool_definition(descriptor: &ToolDescriptor) -> Tool {
    Tool::new(
        descriptor.name.clone(),
        descriptor.description.clone(),
        Arc::new(descriptor.input_schema()),
    )
}

/// Runs one REST tool call and wraps the outcome as an MCP tool result.
pub async fn call_rest_tool(
    adapter: &RestAdapter,
    descriptor: &ToolDescriptor,
    arguments: Option<JsonObject>,
) -> CallToolResult {
    let arguments = arguments.map(Value::Object);
    let result = adapter.invoke(descriptor, arguments.as_ref()).await;
    to_call_tool_result(result)
}
