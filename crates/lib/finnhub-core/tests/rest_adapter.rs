use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use finnhub_core::{
    ApiConfig,
    Catalog,
    ExecError,
    InvokeError,
    QueryEncoding,
    RestAdapter,
    Stage,
    ToolDescriptor,
    ToolResult,
};
use httpmock::Method::GET;
use httpmock::MockServer;
use serde_json::{Value, json};

fn local_adapter(config: ApiConfig) -> RestAdapter {
    let client = reqwest::Client::builder()
        .no_proxy()
        .timeout(config.timeout)
        .build()
        .expect("client should build");
    RestAdapter::with_client(config, client)
}

fn adapter_for(server: &MockServer) -> RestAdapter {
    local_adapter(ApiConfig::new(server.base_url()))
}

fn tool(name: &str) -> ToolDescriptor {
    Catalog::builtin()
        .get(name)
        .cloned()
        .unwrap_or_else(|| panic!("missing built-in tool {name}"))
}

fn text_of(result: ToolResult) -> String {
    match result {
        ToolResult::Text(text) => text,
        ToolResult::Error { message, cause } => {
            panic!("expected text result, got error {message} ({cause:?})")
        }
    }
}

#[tokio::test]
async fn news_request_is_formatted() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/news")
                .query_param("category", "general")
                .header("accept", "application/json");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"id":1}"#);
        })
        .await;
    let adapter = adapter_for(&server);
    let news = tool("get_news");
    let args = json!({ "category": "general" });

    let url = adapter.request_url(&news, Some(&args)).expect("url");
    let result = adapter.invoke(&news, Some(&args)).await;

    mock.assert_async().await;
    assert_eq!(url.as_str(), format!("{}/news?category=general", server.base_url()));
    assert_eq!(text_of(result), "{\n  \"id\": 1\n}");
}

#[tokio::test]
async fn holdings_without_arguments_sends_no_query() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/etf/holdings");
            then.status(200).body(r#"{"symbol":"SPY","holdings":[]}"#);
        })
        .await;
    let adapter = adapter_for(&server);
    let holdings = tool("get_etf_holdings");
    let args = json!({});

    let url = adapter.request_url(&holdings, Some(&args)).expect("url");
    let result = adapter.invoke(&holdings, Some(&args)).await;

    mock.assert_async().await;
    assert_eq!(url.as_str(), format!("{}/etf/holdings", server.base_url()));
    let parsed: Value = serde_json::from_str(&text_of(result)).expect("json text");
    assert_eq!(parsed, json!({ "symbol": "SPY", "holdings": [] }));
}

#[tokio::test]
async fn query_follows_declared_parameter_order() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/bond/tick")
                .query_param("isin", "US693475BF18")
                .query_param("limit", "500")
                .query_param("skip", "0");
            then.status(200).body(r#"{"t":[]}"#);
        })
        .await;
    let adapter = adapter_for(&server);
    let bond = tool("get_bond_tick");
    let args = json!({
        "exchange": "trace",
        "skip": 0,
        "limit": 500,
        "date": "2020-04-02",
        "isin": "US693475BF18",
    });

    let url = adapter.request_url(&bond, Some(&args)).expect("url");
    let result = adapter.invoke(&bond, Some(&args)).await;

    mock.assert_async().await;
    assert_eq!(
        url.query(),
        Some("isin=US693475BF18&date=2020-04-02&limit=500&skip=0&exchange=trace")
    );
    assert!(!result.is_error());
}

#[tokio::test]
async fn api_errors_surface_the_raw_body_without_retry() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/crypto/symbol");
            then.status(500).body(r#"{"error":"boom"}"#);
        })
        .await;
    let adapter = adapter_for(&server);

    let result = adapter
        .invoke(&tool("get_crypto_symbol"), Some(&json!({ "exchange": "binance" })))
        .await;

    mock.assert_hits_async(1).await;
    assert_eq!(
        result,
        ToolResult::Error {
            message: r#"API error: {"error":"boom"}"#.to_string(),
            cause: None,
        }
    );
}

#[tokio::test]
async fn non_json_api_error_is_reported_verbatim() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/quote");
            then.status(429)
                .body("API limit reached. Please try again later.");
        })
        .await;
    let adapter = adapter_for(&server);

    let err = adapter
        .try_invoke(&tool("get_quote"), Some(&json!({ "symbol": "AAPL" })))
        .await
        .expect_err("429 should fail");

    assert_eq!(err.stage(), Stage::AwaitingResponse);
    assert_eq!(
        err.to_string(),
        "API error: API limit reached. Please try again later."
    );
}

#[tokio::test]
async fn non_json_success_body_passes_through() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/global-filings/filter");
            then.status(200).body("countries,exchanges,forms");
        })
        .await;
    let adapter = adapter_for(&server);

    let result = adapter
        .invoke(&tool("get_global-filings_filter"), Some(&json!({ "field": "forms" })))
        .await;

    assert_eq!(result, ToolResult::Text("countries,exchanges,forms".to_string()));
}

#[tokio::test]
async fn connection_refused_is_a_transport_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind probe port");
    let addr = listener.local_addr().expect("probe addr");
    drop(listener);
    let adapter = local_adapter(ApiConfig::new(format!("http://{addr}")));

    let result = adapter
        .invoke(&tool("get_news"), Some(&json!({ "category": "general" })))
        .await;

    match result {
        ToolResult::Error { message, cause } => {
            assert_eq!(message, "Request failed");
            assert!(cause.is_some_and(|cause| !cause.is_empty()));
        }
        ToolResult::Text(text) => panic!("expected transport error, got {text}"),
    }
}

#[tokio::test]
async fn truncated_body_is_a_body_read_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind upstream port");
    let addr = listener.local_addr().expect("upstream addr");
    let upstream = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept");
        let mut request = [0_u8; 1024];
        let _ = stream.read(&mut request).expect("read request");
        stream
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\nhello")
            .expect("write partial response");
    });
    let adapter = local_adapter(ApiConfig::new(format!("http://{addr}")));

    let err = adapter
        .try_invoke(&tool("get_news"), Some(&json!({ "category": "general" })))
        .await
        .expect_err("short body should fail");
    upstream.join().expect("upstream thread");

    assert!(matches!(err, InvokeError::Exec(ExecError::BodyReadFailed(_))));
    assert_eq!(err.stage(), Stage::AwaitingResponse);
    match ToolResult::from(err) {
        ToolResult::Error { message, cause } => {
            assert_eq!(message, "Failed to read response body");
            assert!(cause.is_some_and(|cause| !cause.is_empty()));
        }
        ToolResult::Text(text) => panic!("expected body read error, got {text}"),
    }
}

#[tokio::test]
async fn slow_upstream_hits_the_request_timeout() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/news");
            then.status(200)
                .delay(Duration::from_secs(5))
                .body(r#"{"id":1}"#);
        })
        .await;
    let config = ApiConfig::new(server.base_url()).with_timeout(Duration::from_millis(200));
    let adapter = local_adapter(config);

    let err = adapter
        .try_invoke(&tool("get_news"), Some(&json!({ "category": "general" })))
        .await
        .expect_err("should time out");

    assert!(matches!(err, InvokeError::Exec(_)));
    assert!(err.to_string().starts_with("Request failed: "));
}

#[tokio::test]
async fn encoded_mode_escapes_separators() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/stock/filings")
                .query_param("form", "10-K&amended");
            then.status(200).body("[]");
        })
        .await;
    let config = ApiConfig::new(server.base_url()).with_query_encoding(QueryEncoding::Encoded);
    let adapter = local_adapter(config);

    let result = adapter
        .invoke(&tool("get_stock_filings"), Some(&json!({ "form": "10-K&amended" })))
        .await;

    mock.assert_async().await;
    assert_eq!(text_of(result), "[]");
}

#[tokio::test]
async fn verbatim_mode_sends_values_unescaped() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/stock/filings")
                .query_param("form", "10-K")
                .query_param_exists("amended");
            then.status(200).body("[]");
        })
        .await;
    let config = ApiConfig::new(server.base_url()).with_query_encoding(QueryEncoding::Verbatim);
    let adapter = local_adapter(config);

    let result = adapter
        .invoke(&tool("get_stock_filings"), Some(&json!({ "form": "10-K&amended" })))
        .await;

    mock.assert_async().await;
    assert!(!result.is_error());
}

#[tokio::test]
async fn concurrent_calls_share_one_adapter() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/quote");
            then.status(200).body(r#"{"c":1.0}"#);
        })
        .await;
    let adapter = adapter_for(&server);
    let quote = tool("get_quote");

    let calls: Vec<_> = (0..8)
        .map(|_| {
            let adapter = adapter.clone();
            let quote = quote.clone();
            tokio::spawn(async move {
                adapter
                    .invoke(&quote, Some(&json!({ "symbol": "AAPL" })))
                    .await
            })
        })
        .collect();
    let mut results = Vec::new();
    for call in calls {
        results.push(call.await.expect("task should join"));
    }

    mock.assert_hits_async(8).await;
    assert!(results.iter().all(|result| !result.is_error()));
}
