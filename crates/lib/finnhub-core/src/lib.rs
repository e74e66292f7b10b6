//! Core building blocks for finnhub-mcp.
//!
//! Every Finnhub endpoint is a [`ToolDescriptor`] row in a [`Catalog`]. A single
//! [`RestAdapter`] turns a descriptor plus caller arguments into an HTTP GET and
//! normalizes the response into a [`ToolResult`].

pub mod adapter;
pub mod catalog;
pub mod config;
pub mod descriptor;
pub mod executor;
pub mod format;
pub mod query;

pub use adapter::{InvokeError, RestAdapter, Stage, ToolResult};
pub use catalog::{Catalog, CatalogError};
pub use config::{ApiConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, QueryEncoding};
pub use descriptor::{ParameterSpec, ToolDescriptor};
pub use executor::{ExecError, RawResponse};
