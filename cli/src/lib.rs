//! Configure, validate and clean up MCP server registrations for a host assistant

pub mod catalog;
pub mod commands;
pub mod env_check;
pub mod error;
pub mod host_config;
pub mod output;
pub mod utils;

pub use error::{McpctlError, Result};
pub use host_config::{HostConfig, McpServerEntry};
