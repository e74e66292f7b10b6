//! Single-shot HTTP GET against the upstream API.

use std::error::Error;
use std::fmt;

use reqwest::header::ACCEPT;
use reqwest::{Client, Url};
use tracing::debug;

/// Status and full body of an upstream response below 400.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

#[derive(Debug)]
pub enum ExecError {
    RequestConstructionFailed(String),
    TransportFailed(reqwest::Error),
    BodyReadFailed(reqwest::Error),
    ApiError { status: u16, body: String },
}

impl ExecError {
    /// Short, stable description of the failure class.
    #[must_use]
    pub const fn summary(&self) -> &'static str {
        match self {
            Self::RequestConstructionFailed(_) => "Failed to create request",
            Self::TransportFailed(_) => "Request failed",
            Self::BodyReadFailed(_) => "Failed to read response body",
            Self::ApiError { .. } => "API error",
        }
    }

    /// Underlying cause, when there is one beyond the response body.
    #[must_use]
    pub fn cause(&self) -> Option<String> {
        match self {
            Self::RequestConstructionFailed(cause) => Some(cause.clone()),
            Self::TransportFailed(err) | Self::BodyReadFailed(err) => Some(error_chain(err)),
            Self::ApiError { .. } => None,
        }
    }
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApiError { body, .. } => write!(f, "{}: {body}", self.summary()),
            other => match other.cause() {
                Some(cause) => write!(f, "{}: {cause}", other.summary()),
                None => f.write_str(other.summary()),
            },
        }
    }
}

impl Error for ExecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::TransportFailed(err) | Self::BodyReadFailed(err) => Some(err),
            Self::RequestConstructionFailed(_) | Self::ApiError { .. } => None,
        }
    }
}

/// Joins `base_url`, `path` and `query` into a request URL.
///
/// # Errors
/// Returns [`ExecError::RequestConstructionFailed`] when the result is not a
/// valid absolute URL.
pub fn request_url(base_url: &str, path: &str, query: &str) -> Result<Url, ExecError> {
    let raw = format!("{}{path}{query}", base_url.trim_end_matches('/'));
    Url::parse(&raw).map_err(|err| ExecError::RequestConstructionFailed(format!("{raw}: {err}")))
}

/// Issues one GET for `url` and classifies the response.
///
/// # Errors
/// Returns an [`ExecError`] for build, transport and body-read failures, and
/// [`ExecError::ApiError`] for any status of 400 or above.
pub async fn execute(client: &Client, url: Url) -> Result<RawResponse, ExecError> {
    let request = client
        .get(url)
        .header(ACCEPT, "application/json")
        .build()
        .map_err(|err| ExecError::RequestConstructionFailed(error_chain(&err)))?;

    debug!(url = %request.url(), "sending upstream request");
    let response = client
        .execute(request)
        .await
        .map_err(ExecError::TransportFailed)?;
    let status = response.status().as_u16();
    let body = response
        .bytes()
        .await
        .map_err(ExecError::BodyReadFailed)?
        .to_vec();
    debug!(status, bytes = body.len(), "upstream responded");

    if status >= 400 {
        return Err(ExecError::ApiError {
            status,
            body: String::from_utf8_lossy(&body).into_owned(),
        });
    }

    Ok(RawResponse { status, body })
}

fn error_chain(err: &dyn Error) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(next) = source {
        let text = next.to_string();
        if !rendered.contains(&text) {
            rendered.push_str(": ");
            rendered.push_str(&text);
        }
        source = next.source();
    }
    rendered
}
