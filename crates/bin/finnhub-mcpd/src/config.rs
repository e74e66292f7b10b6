use clap::{ArgAction, Parser, builder::BoolishValueParser};
use finnhub_core::{ApiConfig, DEFAULT_BASE_URL, QueryEncoding};
use std::error::Error;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

const DEFAULT_MCP_HTTP_ADDR: &str = "127.0.0.1:4030";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_QUERY_ENCODING: &str = "encoded";
const DEFAULT_SSE_KEEP_ALIVE_SECS: u64 = 15;

#[derive(Parser, Debug)]
#[command(name = "finnhub-mcpd", version, about = "Finnhub MCP daemon.")]
struct CliArgs {
    #[arg(long, env = "FINNHUB_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    #[arg(long, env = "FINNHUB_API_TOKEN", hide_env_values = true)]
    api_token: Option<String>,

    #[arg(long, env = "FINNHUB_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    #[arg(long, env = "FINNHUB_QUERY_ENCODING", default_value = DEFAULT_QUERY_ENCODING)]
    query_encoding: String,

    #[arg(long, env = "FINNHUB_CATALOG")]
    catalog: Option<PathBuf>,

    #[arg(long, env = "FINNHUB_TOOLS", value_delimiter = ',')]
    tools: Vec<String>,

    #[arg(
        long = "stdio",
        env = "FINNHUB_ENABLE_STDIO",
        default_value_t = false,
        value_parser = BoolishValueParser::new()
    )]
    enable_stdio: bool,

    #[arg(
        long,
        env = "FINNHUB_MCP_SERVE",
        default_value_t = true,
        value_parser = BoolishValueParser::new()
    )]
    mcp_serve: bool,

    #[arg(long, env = "FINNHUB_MCP_HTTP_ADDR", default_value = DEFAULT_MCP_HTTP_ADDR)]
    mcp_http_addr: SocketAddr,

    #[arg(
        long,
        env = "FINNHUB_MCP_STATEFUL",
        default_value_t = true,
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    mcp_stateful: bool,

    /// SSE keep-alive interval in seconds; 0 disables it.
    #[arg(
        long,
        env = "FINNHUB_MCP_SSE_KEEP_ALIVE_SECS",
        default_value_t = DEFAULT_SSE_KEEP_ALIVE_SECS
    )]
    mcp_sse_keep_alive_secs: u64,
}

/// Runtime configuration loaded from CLI arguments and environment variables.
#[derive(Clone, Debug)]
pub struct FinnhubConfig {
    pub api: ApiConfig,
    pub catalog: Option<PathBuf>,
    pub tools: Vec<String>,
    pub enable_stdio: bool,
    pub mcp_serve: bool,
    pub mcp_http_addr: SocketAddr,
    pub mcp_stateful: bool,
    pub mcp_sse_keep_alive: Option<Duration>,
}

#[derive(Debug)]
pub enum ConfigError {
    MissingSetting(&'static str),
    InvalidSetting { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSetting(name) => write!(f, "missing required setting: {name}"),
            Self::InvalidSetting { name, value } => {
                write!(f, "invalid {name} value: {value}")
            }
        }
    }
}

impl Error for ConfigError {}

impl FinnhubConfig {
    /// Parses CLI arguments and environment variables.
    ///
    /// # Errors
    /// Returns `ConfigError` when a setting is missing or invalid.
    pub fn from_args() -> Result<Self, ConfigError> {
        let args = CliArgs::parse();
        Self::try_from(args)
    }
}

impl TryFrom<CliArgs> for FinnhubConfig {
    type Error = ConfigError;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let base_url = args.base_url.trim().to_string();
        if base_url.is_empty() {
            return Err(ConfigError::MissingSetting("FINNHUB_BASE_URL"));
        }
        let parsed = Url::parse(&base_url).map_err(|_| ConfigError::InvalidSetting {
            name: "FINNHUB_BASE_URL",
            value: base_url.clone(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidSetting {
                name: "FINNHUB_BASE_URL",
                value: base_url,
            });
        }

        if args.timeout_secs == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "FINNHUB_TIMEOUT_SECS",
                value: args.timeout_secs.to_string(),
            });
        }

        let query_encoding: QueryEncoding =
            args.query_encoding
                .parse()
                .map_err(|_| ConfigError::InvalidSetting {
                    name: "FINNHUB_QUERY_ENCODING",
                    value: args.query_encoding.clone(),
                })?;

        if !args.enable_stdio && !args.mcp_serve {
            return Err(ConfigError::InvalidSetting {
                name: "FINNHUB_MCP_SERVE",
                value: "false (and stdio disabled; nothing to serve)".to_string(),
            });
        }

        let api_token = args.api_token.filter(|value| !value.trim().is_empty());
        let catalog = args
            .catalog
            .filter(|path| !path.as_os_str().is_empty());
        let tools = args
            .tools
            .into_iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();

        let mcp_sse_keep_alive = Some(args.mcp_sse_keep_alive_secs)
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        let api = ApiConfig::new(base_url)
            .with_auth_token(api_token)
            .with_timeout(Duration::from_secs(args.timeout_secs))
            .with_query_encoding(query_encoding);

        Ok(Self {
            api,
            catalog,
            tools,
            enable_stdio: args.enable_stdio,
            mcp_serve: args.mcp_serve,
            mcp_http_addr: args.mcp_http_addr,
            mcp_stateful: args.mcp_stateful,
            mcp_sse_keep_alive,
        })
    }
}
