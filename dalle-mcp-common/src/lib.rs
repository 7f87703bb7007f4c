//! DALL-E MCP Common Library
//!
//! Configuration, error handling, tracing and the stdio server runner shared
//! by the DALL-E MCP image server.

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod config;
pub mod error;
pub mod server;
pub mod tracing;


pub use config::Config;
pub use error::{ConfigError, Error, ErrorKind, Result};
pub use server::{McpServerBuilder, ServerError, shutdown_channel};
