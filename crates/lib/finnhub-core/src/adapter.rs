//! Generic REST tool invocation.
//!
//! Every tool call walks the same stages: validate the argument object, build
//! the request URL, await the upstream response, then format the body. Any
//! stage can end the call with an error result; nothing is retried.

use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use reqwest::{Client, Url};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::descriptor::ToolDescriptor;
use crate::executor::{self, ExecError};
use crate::format::format_body;
use crate::query;

const USER_AGENT: &str = concat!("finnhub-mcp/", env!("CARGO_PKG_VERSION"));

/// Normalized outcome of a tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolResult {
    Text(String),
    Error {
        message: String,
        cause: Option<String>,
    },
}

impl ToolResult {
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

impl fmt::Display for ToolResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Error {
                message,
                cause: Some(cause),
            } => write!(f, "{message}: {cause}"),
            Self::Error {
                message,
                cause: None,
            } => f.write_str(message),
        }
    }
}

/// Stage of a tool call, reported alongside failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ValidatingArgs,
    BuildingRequest,
    AwaitingResponse,
    FormattingResult,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ValidatingArgs => "validating_args",
            Self::BuildingRequest => "building_request",
            Self::AwaitingResponse => "awaiting_response",
            Self::FormattingResult => "formatting_result",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub enum InvokeError {
    InvalidArguments,
    Exec(ExecError),
    FormatFailed(serde_json::Error),
}

impl InvokeError {
    /// Stage at which the call stopped.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        match self {
            Self::InvalidArguments => Stage::ValidatingArgs,
            Self::Exec(ExecError::RequestConstructionFailed(_)) => Stage::BuildingRequest,
            Self::Exec(_) => Stage::AwaitingResponse,
            Self::FormatFailed(_) => Stage::FormattingResult,
        }
    }
}

impl fmt::Display for InvokeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArguments => f.write_str("Invalid arguments object"),
            Self::Exec(err) => write!(f, "{err}"),
            Self::FormatFailed(err) => write!(f, "Failed to format JSON: {err}"),
        }
    }
}

impl Error for InvokeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidArguments => None,
            Self::Exec(err) => Some(err),
            Self::FormatFailed(err) => Some(err),
        }
    }
}

impl From<ExecError> for InvokeError {
    fn from(err: ExecError) -> Self {
        Self::Exec(err)
    }
}

impl From<InvokeError> for ToolResult {
    fn from(err: InvokeError) -> Self {
        match err {
            InvokeError::InvalidArguments => Self::Error {
                message: "Invalid arguments object".to_string(),
                cause: None,
            },
            InvokeError::Exec(exec @ ExecError::ApiError { .. }) => Self::Error {
                message: exec.to_string(),
                cause: None,
            },
            InvokeError::Exec(exec) => Self::Error {
                message: exec.summary().to_string(),
                cause: exec.cause(),
            },
            InvokeError::FormatFailed(err) => Self::Error {
                message: "Failed to format JSON".to_string(),
                cause: Some(err.to_string()),
            },
        }
    }
}

/// Runs tool descriptors against the configured upstream API.
///
/// Cheap to clone; clones share the HTTP connection pool.
#[derive(Debug, Clone)]
pub struct RestAdapter {
    config: Arc<ApiConfig>,
    client: Client,
}

impl RestAdapter {
    /// Builds an adapter with its own HTTP client honoring `config.timeout`.
    ///
    /// # Errors
    /// Returns the client builder error if TLS or the resolver cannot be
    /// initialized.
    pub fn new(config: ApiConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self::with_client(config, client))
    }

    #[must_use]
    pub fn with_client(config: ApiConfig, client: Client) -> Self {
        Self {
            config: Arc::new(config),
            client,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Resolves the URL a call with `arguments` would hit, without sending it.
    ///
    /// # Errors
    /// Returns [`InvokeError::InvalidArguments`] for a non-object argument
    /// value, or a construction error when the URL does not parse.
    pub fn request_url(
        &self,
        descriptor: &ToolDescriptor,
        arguments: Option<&Value>,
    ) -> Result<Url, InvokeError> {
        let empty = Map::new();
        let args = match arguments {
            None => &empty,
            Some(Value::Object(map)) => map,
            Some(_) => return Err(InvokeError::InvalidArguments),
        };

        let pairs = query::bind(args, &descriptor.parameters);
        let query_string = query::build(&pairs, self.config.query_encoding);
        Ok(executor::request_url(
            &self.config.base_url,
            &descriptor.path,
            &query_string,
        )?)
    }

    /// Invokes `descriptor` with caller-supplied `arguments`.
    ///
    /// Absent arguments are treated as an empty object. Failures are folded
    /// into [`ToolResult::Error`].
    pub async fn invoke(&self, descriptor: &ToolDescriptor, arguments: Option<&Value>) -> ToolResult {
        let started = Instant::now();
        match self.try_invoke(descriptor, arguments).await {
            Ok(text) => {
                debug!(
                    tool = %descriptor.name,
                    elapsed_ms = started.elapsed().as_millis(),
                    "tool call completed"
                );
                ToolResult::Text(text)
            }
            Err(err) => {
                warn!(
                    tool = %descriptor.name,
                    stage = %err.stage(),
                    elapsed_ms = started.elapsed().as_millis(),
                    "tool call failed: {err}"
                );
                err.into()
            }
        }
    }

    /// Same as [`Self::invoke`] but keeps the typed error.
    ///
    /// # Errors
    /// Returns the [`InvokeError`] of whichever stage failed.
    pub async fn try_invoke(
        &self,
        descriptor: &ToolDescriptor,
        arguments: Option<&Value>,
    ) -> Result<String, InvokeError> {
        let url = self.request_url(descriptor, arguments)?;
        let response = executor::execute(&self.client, url).await?;
        format_body(&response.body).map_err(InvokeError::FormatFailed)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::config::QueryEncoding;
    use crate::descriptor::ParameterSpec;

    fn adapter(encoding: QueryEncoding) -> RestAdapter {
        let config = ApiConfig::new("http://localhost:9/api/v1").with_query_encoding(encoding);
        RestAdapter::with_client(config, Client::new())
    }

    fn filings() -> ToolDescriptor {
        ToolDescriptor::new("get_stock_filings", "SEC Filings", "/stock/filings")
            .with_param(ParameterSpec::optional("symbol", "Symbol."))
            .with_param(ParameterSpec::optional("form", "Filter by form."))
            .with_param(ParameterSpec::optional("from", "From date."))
    }

    #[test]
    fn url_without_matching_keys_is_base_plus_path() {
        let url = adapter(QueryEncoding::Encoded)
            .request_url(&filings(), Some(&json!({ "unrelated": 1 })))
            .expect("url");

        assert_eq!(url.as_str(), "http://localhost:9/api/v1/stock/filings");
    }

    #[test]
    fn missing_arguments_behave_like_empty_object() {
        let url = adapter(QueryEncoding::Encoded)
            .request_url(&filings(), None)
            .expect("url");

        assert_eq!(url.query(), None);
    }

    #[test]
    fn url_orders_params_by_declaration() {
        let url = adapter(QueryEncoding::Encoded)
            .request_url(
                &filings(),
                Some(&json!({ "from": "2023-03-15", "symbol": "AAPL" })),
            )
            .expect("url");

        assert_eq!(url.query(), Some("symbol=AAPL&from=2023-03-15"));
    }

    #[test]
    fn encoded_and_verbatim_differ_only_in_escaping() {
        let args = json!({ "form": "NT 10-K" });

        let encoded = adapter(QueryEncoding::Encoded)
            .request_url(&filings(), Some(&args))
            .expect("url");
        let verbatim = adapter(QueryEncoding::Verbatim)
            .request_url(&filings(), Some(&args))
            .expect("url");

        assert_eq!(encoded.query(), Some("form=NT+10-K"));
        assert_eq!(verbatim.query(), Some("form=NT%2010-K"));
    }

    #[test]
    fn non_object_arguments_are_rejected() {
        let err = adapter(QueryEncoding::Encoded)
            .request_url(&filings(), Some(&json!(["AAPL"])))
            .expect_err("should reject");

        assert!(matches!(err, InvokeError::InvalidArguments));
        assert_eq!(err.stage(), Stage::ValidatingArgs);
    }

    #[tokio::test]
    async fn invalid_arguments_become_error_result() {
        let result = adapter(QueryEncoding::Encoded)
            .invoke(&filings(), Some(&json!("AAPL")))
            .await;

        assert_eq!(
            result,
            ToolResult::Error {
                message: "Invalid arguments object".to_string(),
                cause: None,
            }
        );
    }

    #[test]
    fn construction_failures_stop_at_build_stage() {
        let adapter = RestAdapter::with_client(ApiConfig::new("not a url"), Client::new());

        let err = adapter.request_url(&filings(), None).expect_err("should fail");

        assert_eq!(err.stage(), Stage::BuildingRequest);
        let result = ToolResult::from(err);
        assert!(result.to_string().starts_with("Failed to create request: "));
    }

    #[test]
    fn api_errors_keep_body_in_message() {
        let result = ToolResult::from(InvokeError::Exec(ExecError::ApiError {
            status: 429,
            body: r#"{"error":"API limit reached"}"#.to_string(),
        }));

        assert_eq!(
            result.to_string(),
            r#"API error: {"error":"API limit reached"}"#
        );
    }
}
