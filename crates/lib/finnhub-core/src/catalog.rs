//! The table of REST endpoints exposed as tools.
//!
//! Built-in Finnhub endpoints ship with the crate. A TOML file with the same
//! shape can add endpoints or replace built-ins by name:
//!
//! ```toml
//! [[tools]]
//! name = "get_quote"
//! description = "Quote"
//! path = "/quote"
//!
//! [[tools.parameters]]
//! key = "symbol"
//! required = true
//! description = "Symbol"
//! ```

use std::collections::HashSet;
use std::error::Error;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::descriptor::{ParameterSpec, ToolDescriptor};

const SKIP_HOLDINGS: &str = "Skip the first n results. You can use this parameter to query historical constituents data. The latest result is returned if skip=0 or not set.";

#[derive(Debug)]
pub enum CatalogError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    EmptyName,
    DuplicateTool(String),
    InvalidPath { tool: String, path: String },
    EmptyParameterKey { tool: String },
    DuplicateParameter { tool: String, key: String },
    UnknownTools(Vec<String>),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read catalog: {err}"),
            Self::Parse(err) => write!(f, "failed to parse catalog: {err}"),
            Self::EmptyName => f.write_str("tool name must not be empty"),
            Self::DuplicateTool(name) => write!(f, "duplicate tool name: {name}"),
            Self::InvalidPath { tool, path } => {
                write!(f, "tool {tool} has invalid path {path:?}; paths start with '/' and carry no query")
            }
            Self::EmptyParameterKey { tool } => {
                write!(f, "tool {tool} declares a parameter with an empty key")
            }
            Self::DuplicateParameter { tool, key } => {
                write!(f, "tool {tool} declares parameter {key} more than once")
            }
            Self::UnknownTools(names) => write!(f, "unknown tools: {}", names.join(", ")),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<toml::de::Error> for CatalogError {
    fn from(err: toml::de::Error) -> Self {
        Self::Parse(err)
    }
}

/// Ordered, name-unique set of tool descriptors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    tools: Vec<ToolDescriptor>,
}

impl Catalog {
    /// Builds a catalog, rejecting malformed or duplicate descriptors.
    ///
    /// # Errors
    /// Returns the first validation failure found.
    pub fn new(tools: Vec<ToolDescriptor>) -> Result<Self, CatalogError> {
        let catalog = Self { tools };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Finnhub endpoints available without any catalog file.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            tools: builtin_tools(),
        }
    }

    /// Parses a catalog from TOML text.
    ///
    /// # Errors
    /// Returns a parse error or the first validation failure.
    pub fn from_toml_str(text: &str) -> Result<Self, CatalogError> {
        let catalog: Self = toml::from_str(text)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Reads and parses a TOML catalog file.
    ///
    /// # Errors
    /// Returns an I/O, parse, or validation error.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    #[must_use]
    pub fn tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.iter().find(|tool| tool.name == name)
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.tools.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Overlays `other`: same-named tools are replaced in place, new ones are
    /// appended in `other`'s order.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        for tool in other.tools {
            match self.tools.iter_mut().find(|existing| existing.name == tool.name) {
                Some(existing) => *existing = tool,
                None => self.tools.push(tool),
            }
        }
        self
    }

    /// Keeps only the named tools, preserving catalog order.
    ///
    /// # Errors
    /// Returns [`CatalogError::UnknownTools`] if any name is not in the catalog.
    pub fn retain_named<S: AsRef<str>>(mut self, names: &[S]) -> Result<Self, CatalogError> {
        let unknown: Vec<String> = names
            .iter()
            .map(AsRef::as_ref)
            .filter(|name| self.get(name).is_none())
            .map(str::to_string)
            .collect();
        if !unknown.is_empty() {
            return Err(CatalogError::UnknownTools(unknown));
        }

        let wanted: HashSet<&str> = names.iter().map(AsRef::as_ref).collect();
        self.tools.retain(|tool| wanted.contains(tool.name.as_str()));
        Ok(self)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let mut names = HashSet::new();
        for tool in &self.tools {
            if tool.name.trim().is_empty() {
                return Err(CatalogError::EmptyName);
            }
            if !names.insert(tool.name.as_str()) {
                return Err(CatalogError::DuplicateTool(tool.name.clone()));
            }
            if !tool.path.starts_with('/') || tool.path.contains('?') {
                return Err(CatalogError::InvalidPath {
                    tool: tool.name.clone(),
                    path: tool.path.clone(),
                });
            }

            let mut keys = HashSet::new();
            for param in &tool.parameters {
                if param.key.trim().is_empty() {
                    return Err(CatalogError::EmptyParameterKey {
                        tool: tool.name.clone(),
                    });
                }
                if !keys.insert(param.key.as_str()) {
                    return Err(CatalogError::DuplicateParameter {
                        tool: tool.name.clone(),
                        key: param.key.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[allow(clippy::too_many_lines)]
fn builtin_tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor::new("get_airline_price-index", "Airline Price Index", "/airline/price-index")
            .with_param(ParameterSpec::required(
                "airline",
                "Filter data by airline. Accepted values: <code>united</code>,<code>delta</code>,<code>american_airlines</code>,<code>southwest</code>,<code>southern_airways_express</code>,<code>alaska_airlines</code>,<code>frontier_airlines</code>,<code>jetblue_airways</code>,<code>spirit_airlines</code>,<code>sun_country_airlines</code>,<code>breeze_airways</code>,<code>hawaiian_airlines</code>",
            ))
            .with_param(ParameterSpec::required("from", "From date <code>YYYY-MM-DD</code>."))
            .with_param(ParameterSpec::required("to", "To date <code>YYYY-MM-DD</code>.")),
        ToolDescriptor::new("get_bond_tick", "Bond Tick Data", "/bond/tick")
            .with_param(ParameterSpec::required("isin", "ISIN."))
            .with_param(ParameterSpec::required("date", "Date: 2020-04-02."))
            .with_param(ParameterSpec::required(
                "limit",
                "Limit number of ticks returned. Maximum value: <code>25000</code>",
            ))
            .with_param(ParameterSpec::required(
                "skip",
                "Number of ticks to skip. Use this parameter to loop through the entire data.",
            ))
            .with_param(ParameterSpec::required(
                "exchange",
                "Currently support the following values: <code>trace</code>.",
            )),
        ToolDescriptor::new("get_crypto_exchange", "Crypto Exchanges", "/crypto/exchange"),
        ToolDescriptor::new("get_crypto_symbol", "Crypto Symbol", "/crypto/symbol").with_param(
            ParameterSpec::required(
                "exchange",
                "Exchange you want to get the list of symbols from.",
            ),
        ),
        ToolDescriptor::new("get_etf_holdings", "ETFs Holdings", "/etf/holdings")
            .with_param(ParameterSpec::optional("symbol", "ETF symbol."))
            .with_param(ParameterSpec::optional("isin", "ETF isin."))
            .with_param(ParameterSpec::optional("skip", SKIP_HOLDINGS))
            .with_param(ParameterSpec::optional(
                "date",
                "Query holdings by date. You can use either this param or <code>skip</code> param, not both.",
            )),
        ToolDescriptor::new("get_stock_filings", "SEC Filings", "/stock/filings")
            .with_param(ParameterSpec::optional(
                "symbol",
                "Symbol. Leave <code>symbol</code>,<code>cik</code> and <code>accessNumber</code> empty to list latest filings.",
            ))
            .with_param(ParameterSpec::optional("cik", "CIK."))
            .with_param(ParameterSpec::optional(
                "accessNumber",
                "Access number of a specific report you want to retrieve data from.",
            ))
            .with_param(ParameterSpec::optional(
                "form",
                "Filter by form. You can use this value <code>NT 10-K</code> to find non-timely filings for a company.",
            ))
            .with_param(ParameterSpec::optional("from", "From date: 2023-03-15."))
            .with_param(ParameterSpec::optional("to", "To date: 2023-03-16.")),
        ToolDescriptor::new(
            "get_stock_financials-reported",
            "Financials As Reported",
            "/stock/financials-reported",
        )
        .with_param(ParameterSpec::optional("symbol", "Symbol."))
        .with_param(ParameterSpec::optional("cik", "CIK."))
        .with_param(ParameterSpec::optional(
            "accessNumber",
            "Access number of a specific report you want to retrieve financials from.",
        ))
        .with_param(ParameterSpec::optional(
            "freq",
            "Frequency. Can be either <code>annual</code> or <code>quarterly</code>. Default to <code>annual</code>.",
        ))
        .with_param(ParameterSpec::optional(
            "from",
            "From date <code>YYYY-MM-DD</code>. Filter for endDate.",
        ))
        .with_param(ParameterSpec::optional(
            "to",
            "To date <code>YYYY-MM-DD</code>. Filter for endDate.",
        )),
        ToolDescriptor::new("get_global-filings_filter", "Search Filter", "/global-filings/filter")
            .with_param(ParameterSpec::required(
                "field",
                "Field to get available filters. Available filters are \"countries\", \"exchanges\", \"exhibits\", \"forms\", \"gics\", \"naics\", \"caps\", \"acts\", and \"sort\".",
            ))
            .with_param(ParameterSpec::optional("source", "Get available forms for each source.")),
        ToolDescriptor::new("get_news", "Market News", "/news")
            .with_param(ParameterSpec::required(
                "category",
                "This parameter can be 1 of the following values <code>general, forex, crypto, merger</code>.",
            ))
            .with_param(ParameterSpec::optional(
                "minId",
                "Use this field to get only news after this ID. Default to 0",
            )),
        ToolDescriptor::new("get_company-news", "Company News", "/company-news")
            .with_param(ParameterSpec::required("symbol", "Company symbol."))
            .with_param(ParameterSpec::required("from", "From date <code>YYYY-MM-DD</code>."))
            .with_param(ParameterSpec::required("to", "To date <code>YYYY-MM-DD</code>.")),
        ToolDescriptor::new("get_mutual-fund_holdings", "Mutual Funds Holdings", "/mutual-fund/holdings")
            .with_param(ParameterSpec::optional("symbol", "Fund's symbol."))
            .with_param(ParameterSpec::optional("isin", "Fund's isin."))
            .with_param(ParameterSpec::optional("skip", SKIP_HOLDINGS)),
        ToolDescriptor::new("get_quote", "Quote", "/quote")
            .with_param(ParameterSpec::required("symbol", "Symbol")),
        ToolDescriptor::new("get_stock_profile2", "Company Profile 2", "/stock/profile2")
            .with_param(ParameterSpec::optional("symbol", "Symbol of the company: AAPL e.g."))
            .with_param(ParameterSpec::optional("isin", "ISIN"))
            .with_param(ParameterSpec::optional("cusip", "CUSIP")),
        ToolDescriptor::new("get_stock_symbol", "Stock Symbol", "/stock/symbol")
            .with_param(ParameterSpec::required(
                "exchange",
                "Exchange you want to get the list of symbols from. List of exchange codes can be found <a href=\"https://docs.google.com/spreadsheets/d/1I3pBxjfXB056-g_JYf_6o3Rns3BV2kMGG1nCatb91ls/edit?usp=sharing\" target=\"_blank\">here</a>.",
            ))
            .with_param(ParameterSpec::optional("mic", "Filter by MIC code."))
            .with_param(ParameterSpec::optional("securityType", "Filter by security type used by OpenFigi standard."))
            .with_param(ParameterSpec::optional("currency", "Filter by currency.")),
    ]
}
