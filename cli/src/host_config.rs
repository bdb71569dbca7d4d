//! Host assistant configuration file
//!
//! The host keeps its MCP server registry in a JSON document that also holds
//! many keys this tool knows nothing about. The document is held as a raw JSON
//! object so every unknown key survives a rewrite untouched.

use crate::error::{McpctlError, Result};
use crate::utils::backup_path;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const MCP_SERVERS_KEY: &str = "mcpServers";
pub const PROJECT_CONFIGS_KEY: &str = "projectConfigs";

/// Config locations searched in order, relative to the home directory
pub fn candidate_paths(home: &Path) -> Vec<PathBuf> {
    vec![
        home.join(".claude.json"),
        home.join(".config").join("claude").join("claude_desktop_config.json"),
        home.join("AppData")
            .join("Roaming")
            .join("Claude")
            .join("claude_desktop_config.json"),
    ]
}

/// Path created when no config exists anywhere
pub fn default_path(home: &Path) -> PathBuf {
    home.join(".claude.json")
}

/// First existing config: the explicit path if given, otherwise the candidates
pub fn locate(home: &Path, explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => path.exists().then(|| path.to_path_buf()),
        None => candidate_paths(home).into_iter().find(|p| p.exists()),
    }
}

/// One MCP server registration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpServerEntry {
    /// Transport, written only for project-scoped entries
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<String>,

    pub command: String,
    pub args: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<Map<String, Value>>,
}

/// Structural problem with a registered server
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryIssue {
    pub server: String,
    pub problem: String,
}

#[derive(Debug, Clone)]
pub struct HostConfig {
    path: PathBuf,
    document: Map<String, Value>,
}

impl HostConfig {
    /// Fresh `{"mcpServers": {}}` document bound to `path`, not yet written
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        let mut document = Map::new();
        document.insert(MCP_SERVERS_KEY.to_string(), Value::Object(Map::new()));
        Self { path: path.into(), document }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => McpctlError::ConfigNotFound {
                path: path.display().to_string(),
            },
            _ => McpctlError::Io(e),
        })?;

        match serde_json::from_str::<Value>(&content)? {
            Value::Object(document) => {
                debug!(path = %path.display(), keys = document.len(), "Loaded host config");
                Ok(Self { path: path.to_path_buf(), document })
            }
            _ => Err(McpctlError::InvalidConfig(format!(
                "{} is not a JSON object",
                path.display()
            ))),
        }
    }

    /// Load the first candidate that exists, creating the default file when none does
    pub fn locate_or_create(home: &Path, explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = locate(home, explicit) {
            return Self::load(&path);
        }

        let path = explicit
            .map(Path::to_path_buf)
            .unwrap_or_else(|| default_path(home));
        let config = Self::empty(&path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, config.to_pretty_json()?)?;
        info!(path = %path.display(), "Created host config");
        Ok(config)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn document(&self) -> &Map<String, Value> {
        &self.document
    }

    pub fn mcp_servers(&self) -> Option<&Map<String, Value>> {
        self.document.get(MCP_SERVERS_KEY).and_then(Value::as_object)
    }

    pub fn server_names(&self) -> Vec<String> {
        self.mcp_servers()
            .map(|servers| servers.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Entries lacking a string `command` or an array `args`
    pub fn entry_issues(&self) -> Vec<EntryIssue> {
        let Some(servers) = self.mcp_servers() else {
            return Vec::new();
        };

        servers
            .iter()
            .filter_map(|(name, entry)| {
                let command_ok = entry
                    .get("command")
                    .and_then(Value::as_str)
                    .map(|c| !c.is_empty())
                    .unwrap_or(false);
                let args_ok = entry.get("args").map(Value::is_array).unwrap_or(false);

                let problem = match (command_ok, args_ok) {
                    (true, true) => return None,
                    (false, true) => "missing string 'command'",
                    (true, false) => "missing array 'args'",
                    (false, false) => "missing 'command' and 'args'",
                };
                Some(EntryIssue { server: name.clone(), problem: problem.to_string() })
            })
            .collect()
    }

    /// Insert or replace entries under the top-level `mcpServers`
    pub fn merge_servers(&mut self, servers: &[(String, McpServerEntry)]) -> Result<()> {
        let target = object_entry(&mut self.document, MCP_SERVERS_KEY)?;
        for (name, entry) in servers {
            target.insert(name.clone(), serde_json::to_value(entry)?);
        }
        Ok(())
    }

    /// Existing project key equal to `cwd`, or containing `pattern` case-insensitively
    pub fn find_project_key(&self, cwd: &str, pattern: Option<&str>) -> Option<String> {
        let projects = self.document.get(PROJECT_CONFIGS_KEY)?.as_object()?;
        let pattern = pattern.map(str::to_lowercase);

        projects
            .keys()
            .find(|key| {
                key.as_str() == cwd
                    || pattern
                        .as_deref()
                        .map(|p| key.to_lowercase().contains(p))
                        .unwrap_or(false)
            })
            .cloned()
    }

    /// Replace `projectConfigs[key].mcpServers`, creating the project entry if needed
    ///
    /// Returns true when a new project entry was created.
    pub fn set_project_servers(
        &mut self,
        key: &str,
        servers: &[(String, McpServerEntry)],
    ) -> Result<bool> {
        let projects = object_entry(&mut self.document, PROJECT_CONFIGS_KEY)?;

        let created = !projects.contains_key(key);
        if created {
            projects.insert(
                key.to_string(),
                json!({
                    "allowedTools": [],
                    "mcpServers": {},
                    "enabledMcpjsonServers": [],
                    "disabledMcpjsonServers": [],
                    "hasTrustDialogAccepted": false
                }),
            );
        }

        let mut map = Map::new();
        for (name, entry) in servers {
            map.insert(name.clone(), serde_json::to_value(entry)?);
        }

        let project = object_entry(projects, key)?;
        project.insert(MCP_SERVERS_KEY.to_string(), Value::Object(map));
        Ok(created)
    }

    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.document)?)
    }

    /// Copy the current file to `.backup`, then overwrite it
    ///
    /// A failed backup is logged and does not block the write. Returns the
    /// backup path when one was made.
    pub fn save(&self) -> Result<Option<PathBuf>> {
        let backup = if self.path.exists() {
            let backup = backup_path(&self.path);
            match fs::copy(&self.path, &backup) {
                Ok(_) => {
                    info!(backup = %backup.display(), "Backup created");
                    Some(backup)
                }
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "Backup failed, writing anyway");
                    None
                }
            }
        } else {
            None
        };

        fs::write(&self.path, self.to_pretty_json()?)?;
        info!(path = %self.path.display(), "Host config written");
        Ok(backup)
    }
}

/// `map[key]` as an object, replacing any non-object value
fn object_entry<'a>(map: &'a mut Map<String, Value>, key: &str) -> Result<&'a mut Map<String, Value>> {
    let slot = map
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        warn!(key, "Replacing non-object value");
        *slot = Value::Object(Map::new());
    }
    slot.as_object_mut()
        .ok_or_else(|| McpctlError::InvalidConfig(format!("'{}' is not an object", key)))
}
