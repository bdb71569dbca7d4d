use crate::error::Result;
use crate::output::{format_bytes, OutputManager};
use crate::utils::{path_size, remove_path};
use clap::Args;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const OBSOLETE_FILES: [&str; 4] = [
    "project.mcp.json",
    ".claude-mcp-config.json",
    "MCP-SETUP-GUIDE.md",
    "validate-mcp-setup.bat",
];

pub const OBSOLETE_SCRIPTS: [&str; 9] = [
    "scripts/init-mcp-services.bat",
    "scripts/mcp-infrastructure-validator.ps1",
    "scripts/mcp-performance-analyzer.ps1",
    "scripts/monitor-mcp.bat",
    "scripts/validate-mcp-full.bat",
    "scripts/validate-mcp-quick.bat",
    "scripts/validate-mcp-optimizations.bat",
    "scripts/mcp-optimization-validator.py",
    "scripts/validate-motion-mcp.bat",
];

pub const OBSOLETE_DIRS: [&str; 4] = [
    "scripts/mcp",
    "scripts/mcp-validation",
    "scripts/monitoring",
    "scripts/observability",
];

/// Configs worth keeping a copy of before they are removed
pub const BACKED_UP_FILES: [&str; 2] = ["project.mcp.json", ".claude-mcp-config.json"];

pub const BACKUP_DIR: &str = "backup-mcp-cleanup";

#[derive(Args, Debug)]
pub struct CleanupArgs {
    /// Report what would be removed without touching anything
    #[arg(long)]
    pub dry_run: bool,

    /// Project root to clean
    #[arg(long, default_value = ".")]
    pub root: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    File,
    Script,
    Directory,
}

#[derive(Debug, Clone, Serialize)]
pub struct ObsoleteItem {
    pub path: String,
    pub kind: ItemKind,
    pub size: u64,
}

#[derive(Debug, Default, Serialize)]
pub struct CleanupReport {
    pub items: Vec<ObsoleteItem>,
    pub total_size: u64,
    pub backed_up: Vec<String>,
    pub removed: Vec<String>,
    pub failed: Vec<String>,
    /// Configs kept because their backup could not be made
    pub kept: Vec<String>,
    pub dry_run: bool,
}

/// Find every obsolete item present under `root`
pub fn analyze(root: &Path) -> Vec<ObsoleteItem> {
    let groups: [(&[&str], ItemKind); 3] = [
        (&OBSOLETE_FILES, ItemKind::File),
        (&OBSOLETE_SCRIPTS, ItemKind::Script),
        (&OBSOLETE_DIRS, ItemKind::Directory),
    ];

    groups
        .iter()
        .flat_map(|(paths, kind)| {
            paths.iter().filter_map(move |relative| {
                let full = root.join(relative);
                full.exists().then(|| ObsoleteItem {
                    path: relative.to_string(),
                    kind: *kind,
                    size: path_size(&full),
                })
            })
        })
        .collect()
}

/// Copy the backed-up configs that exist into `<root>/backup-mcp-cleanup/`,
/// returning the names that were copied
pub fn backup_configs(root: &Path) -> Vec<String> {
    let present: Vec<&str> = BACKED_UP_FILES
        .iter()
        .copied()
        .filter(|name| root.join(name).is_file())
        .collect();
    if present.is_empty() {
        return Vec::new();
    }

    let backup_dir = root.join(BACKUP_DIR);
    if let Err(e) = fs::create_dir_all(&backup_dir) {
        warn!(dir = %backup_dir.display(), error = %e, "Cannot create backup directory");
        return Vec::new();
    }

    let mut copied = Vec::new();
    for name in present {
        match fs::copy(root.join(name), backup_dir.join(name)) {
            Ok(_) => copied.push(name.to_string()),
            Err(e) => warn!(file = name, error = %e, "Backup failed"),
        }
    }
    copied
}

/// Back up, then remove every item whose config copy is safe
pub fn clean(root: &Path, report: &mut CleanupReport) {
    report.backed_up = backup_configs(root);

    let (removable, kept): (Vec<ObsoleteItem>, Vec<ObsoleteItem>) =
        report.items.iter().cloned().partition(|item| {
            !BACKED_UP_FILES.contains(&item.path.as_str()) || report.backed_up.contains(&item.path)
        });
    for item in &kept {
        warn!(path = %item.path, "Not backed up, keeping");
    }

    let (removed, failed) = remove_items(root, &removable);
    report.removed = removed;
    report.failed = failed;
    report.kept = kept.into_iter().map(|item| item.path).collect();
}

/// Delete every item, skipping the ones that fail
pub fn remove_items(root: &Path, items: &[ObsoleteItem]) -> (Vec<String>, Vec<String>) {
    let mut removed = Vec::new();
    let mut failed = Vec::new();
    for item in items {
        match remove_path(&root.join(&item.path)) {
            Ok(()) => {
                info!(path = %item.path, "Removed");
                removed.push(item.path.clone());
            }
            Err(e) => {
                warn!(path = %item.path, error = %e, "Removal failed");
                failed.push(item.path.clone());
            }
        }
    }
    (removed, failed)
}

pub async fn run(args: CleanupArgs, output: OutputManager) -> Result<()> {
    let items = analyze(&args.root);
    let mut report = CleanupReport {
        total_size: items.iter().map(|i| i.size).sum(),
        items,
        dry_run: args.dry_run,
        ..Default::default()
    };

    if !output.is_json() {
        display_analysis(&report, &output)?;
    }

    if !args.dry_run && !report.items.is_empty() {
        clean(&args.root, &mut report);
    }

    if output.is_json() {
        return output.print_json(&report);
    }

    if report.items.is_empty() {
        output.print_success("Nothing to clean up")?;
    } else if args.dry_run {
        output.print_info("Dry run: nothing was removed")?;
    } else {
        for name in &report.backed_up {
            output.print_info(&format!("Backed up {} to {}/", name, BACKUP_DIR))?;
        }
        output.print_success(&format!(
            "Removed {} items ({})",
            report.removed.len(),
            format_bytes(report.total_size)
        ))?;
        for path in &report.failed {
            output.print_warning(&format!("Could not remove {}", path))?;
        }
        for path in &report.kept {
            output.print_warning(&format!("Kept {} because it could not be backed up", path))?;
        }
    }
    Ok(())
}

fn display_analysis(report: &CleanupReport, output: &OutputManager) -> Result<()> {
    output.print_header("Obsolete MCP files")?;
    let sections = [
        (ItemKind::File, "Files"),
        (ItemKind::Script, "Scripts"),
        (ItemKind::Directory, "Directories"),
    ];
    for (kind, label) in sections {
        let found: Vec<&ObsoleteItem> = report.items.iter().filter(|i| i.kind == kind).collect();
        output.print_key_value(label, &found.len().to_string())?;
        for item in found {
            output.print_list_item(&format!("{} ({})", item.path, format_bytes(item.size)))?;
        }
    }
    output.print_key_value("Total size", &format_bytes(report.total_size))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use tempfile::TempDir;

    fn seed(root: &Path) {
        fs::create_dir_all(root.join("scripts/mcp/nested")).unwrap();
        fs::write(root.join("project.mcp.json"), r#"{"servers":{}}"#).unwrap();
        fs::write(root.join("MCP-SETUP-GUIDE.md"), "# old").unwrap();
        fs::write(root.join("scripts/monitor-mcp.bat"), "echo").unwrap();
        fs::write(root.join("scripts/mcp/nested/run.js"), vec![b'x'; 64]).unwrap();
        fs::write(root.join("scripts/keep.js"), "keep").unwrap();
    }

    fn quiet() -> OutputManager {
        OutputManager::new(OutputFormat::Table, false).quiet(true)
    }

    #[test]
    fn test_analyze_finds_present_items() {
        let temp = TempDir::new().unwrap();
        seed(temp.path());

        let items = analyze(temp.path());
        let paths: Vec<&str> = items.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["project.mcp.json", "MCP-SETUP-GUIDE.md", "scripts/monitor-mcp.bat", "scripts/mcp"]
        );
        assert_eq!(items[3].kind, ItemKind::Directory);
        assert_eq!(items[3].size, 64);
    }

    #[tokio::test]
    async fn test_dry_run_keeps_everything() {
        let temp = TempDir::new().unwrap();
        seed(temp.path());

        run(CleanupArgs { dry_run: true, root: temp.path().to_path_buf() }, quiet())
            .await
            .unwrap();

        assert!(temp.path().join("project.mcp.json").exists());
        assert!(temp.path().join("scripts/mcp").exists());
        assert!(!temp.path().join(BACKUP_DIR).exists());
    }

    #[tokio::test]
    async fn test_cleanup_backs_up_and_removes() {
        let temp = TempDir::new().unwrap();
        seed(temp.path());

        run(CleanupArgs { dry_run: false, root: temp.path().to_path_buf() }, quiet())
            .await
            .unwrap();

        assert!(!temp.path().join("project.mcp.json").exists());
        assert!(!temp.path().join("MCP-SETUP-GUIDE.md").exists());
        assert!(!temp.path().join("scripts/mcp").exists());
        assert!(temp.path().join("scripts/keep.js").exists());

        let backup = temp.path().join(BACKUP_DIR).join("project.mcp.json");
        assert_eq!(fs::read_to_string(backup).unwrap(), r#"{"servers":{}}"#);
    }

    #[test]
    fn test_configs_are_kept_when_backup_fails() {
        let temp = TempDir::new().unwrap();
        seed(temp.path());
        // A plain file where the backup directory should go
        fs::write(temp.path().join(BACKUP_DIR), "blocked").unwrap();

        let mut report = CleanupReport { items: analyze(temp.path()), ..Default::default() };
        clean(temp.path(), &mut report);

        assert!(report.backed_up.is_empty());
        assert_eq!(report.kept, vec!["project.mcp.json"]);
        assert!(temp.path().join("project.mcp.json").exists());
        assert!(!temp.path().join("MCP-SETUP-GUIDE.md").exists());
        assert!(!temp.path().join("scripts/mcp").exists());
        assert!(report.failed.is_empty());
    }

    #[test]
    fn test_removal_failures_are_skipped() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("MCP-SETUP-GUIDE.md"), "x").unwrap();
        let items = vec![
            ObsoleteItem { path: "gone.bat".to_string(), kind: ItemKind::File, size: 0 },
            ObsoleteItem { path: "MCP-SETUP-GUIDE.md".to_string(), kind: ItemKind::File, size: 1 },
        ];

        let (removed, failed) = remove_items(temp.path(), &items);
        assert_eq!(removed, vec!["MCP-SETUP-GUIDE.md"]);
        assert_eq!(failed, vec!["gone.bat"]);
    }
}
