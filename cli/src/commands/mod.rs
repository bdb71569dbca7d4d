pub mod cleanup;
pub mod configure;
pub mod project;
pub mod validate;

pub use cleanup::CleanupArgs;
pub use configure::ConfigureArgs;
pub use project::ProjectArgs;
pub use validate::ValidateArgs;

use std::path::{Path, PathBuf};

/// Paths every command resolves against
#[derive(Debug, Clone)]
pub struct Context {
    /// Home directory searched for host configs
    pub home: PathBuf,

    /// Working directory (project root)
    pub cwd: PathBuf,

    /// Explicit host config file, bypassing the search
    pub config_path: Option<PathBuf>,
}

impl Context {
    pub fn explicit_config(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}
