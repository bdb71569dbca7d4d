use thiserror::Error;

#[derive(Error, Debug)]
pub enum McpctlError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unable to determine home directory")]
    HomeDirUnavailable,

    #[error("Validation failed: score {score}/{total}")]
    Validation { score: usize, total: usize },

    #[error("Cleanup error: {0}")]
    Cleanup(String),

    #[error("Operation timed out")]
    Timeout,

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl McpctlError {
    pub fn exit_code(&self) -> i32 {
        match self {
            McpctlError::InvalidConfig(_) => 1,
            McpctlError::Validation { .. } => 1,
            McpctlError::Io(_) => 2,
            McpctlError::HomeDirUnavailable => 3,
            McpctlError::ConfigNotFound { .. } => 5,
            McpctlError::Timeout => 124, // Standard timeout exit code
            _ => 1,                      // Generic error
        }
    }
}

pub type Result<T> = std::result::Result<T, McpctlError>;

/// Format error for user-friendly display
pub fn format_error(error: &McpctlError) -> String {
    match error {
        McpctlError::ConfigNotFound { path } => {
            format!("Configuration Not Found: {}\n\nRun 'mcpctl configure' to create one, or pass --config-path.", path)
        }
        McpctlError::InvalidConfig(msg) => {
            format!("Invalid Configuration: {}\n\nEvery mcpServers entry needs a string 'command' and an array 'args'.", msg)
        }
        McpctlError::HomeDirUnavailable => {
            "Home Directory Unavailable: set HOME or pass --config-path explicitly.".to_string()
        }
        McpctlError::Validation { score, total } => {
            format!("Validation Incomplete: {}/{} checks passed.\n\nFollow the recommended actions above, then run 'mcpctl validate' again.", score, total)
        }
        McpctlError::Json(e) => {
            format!("JSON Error: {}\n\nThe configuration file is not valid JSON. A .backup copy may exist next to it.", e)
        }
        _ => error.to_string(),
    }
}
