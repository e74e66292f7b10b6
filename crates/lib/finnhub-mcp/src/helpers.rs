use finnhub_core::ToolResult;
use rmcp::model::{CallToolResult, Content};

/// Error results stay tool-level (`isError: true`), never protocol errors.
pub fn to_call_tool_result(result: ToolResult) -> CallToolResult {
    match result {
        ToolResult::Text(text) => CallToolResult::success(vec![Content::text(text)]),
        error @ ToolResult::Error { .. } => {
            CallToolResult::error(vec![Content::text(error.to_string())])
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn text_maps_to_success() {
        let result = to_call_tool_result(ToolResult::Text("{\n  \"id\": 1\n}".to_string()));
        let value = serde_json::to_value(&result).expect("serialize");

        assert_ne!(value["isError"], json!(true));
        assert_eq!(value["content"][0]["text"], "{\n  \"id\": 1\n}");
    }

    #[test]
    fn error_carries_message_and_cause() {
        let result = to_call_tool_result(ToolResult::Error {
            message: "Request failed".to_string(),
            cause: Some("connection refused".to_string()),
        });
        let value = serde_json::to_value(&result).expect("serialize");

        assert_eq!(value["isError"], json!(true));
        assert_eq!(value["content"][0]["text"], "Request failed: connection refused");
    }
}
