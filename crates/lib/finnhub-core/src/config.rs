use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://finnhub.io/api/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// How query values are written into the request URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryEncoding {
    /// Keys and values are form-urlencoded.
    #[default]
    Encoded,
    /// Keys and values are concatenated unchanged.
    Verbatim,
}

impl fmt::Display for QueryEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encoded => f.write_str("encoded"),
            Self::Verbatim => f.write_str("verbatim"),
        }
    }
}

impl FromStr for QueryEncoding {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "encoded" => Ok(Self::Encoded),
            "verbatim" => Ok(Self::Verbatim),
            other => Err(format!("unknown query encoding: {other}")),
        }
    }
}

/// Upstream API settings shared by every tool. Read-only once built.
#[derive(Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub auth_token: Option<String>,
    pub timeout: Duration,
    pub query_encoding: QueryEncoding,
}

impl ApiConfig {
    /// Creates a config for `base_url`. A trailing `/` is dropped so paths
    /// can be appended directly.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token: None,
            timeout: DEFAULT_TIMEOUT,
            query_encoding: QueryEncoding::default(),
        }
    }

    #[must_use]
    pub fn with_auth_token(mut self, auth_token: Option<String>) -> Self {
        self.auth_token = auth_token;
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_query_encoding(mut self, query_encoding: QueryEncoding) -> Self {
        self.query_encoding = query_encoding;
        self
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("query_encoding", &self.query_encoding)
            .finish()
    }
}
