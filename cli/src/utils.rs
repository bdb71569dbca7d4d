use crate::error::{McpctlError, Result};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Current user's home directory
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or(McpctlError::HomeDirUnavailable)
}

/// `<file>.backup` next to `path`
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("config"));
    name.push(".backup");
    path.with_file_name(name)
}

/// Size of a file, or the total size of all files below a directory
pub fn path_size(path: &Path) -> u64 {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => meta.len(),
        Ok(meta) if meta.is_dir() => WalkDir::new(path)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.metadata().ok())
            .filter(|meta| meta.is_file())
            .map(|meta| meta.len())
            .sum(),
        _ => 0,
    }
}

/// Remove a file or a whole directory tree
pub fn remove_path(path: &Path) -> Result<()> {
    let meta = fs::symlink_metadata(path)?;
    if meta.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_backup_path() {
        assert_eq!(
            backup_path(Path::new("/home/u/.claude.json")),
            PathBuf::from("/home/u/.claude.json.backup")
        );
    }

    #[test]
    fn test_path_size_walks_directories() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("scripts").join("mcp");
        fs::create_dir_all(dir.join("nested")).unwrap();
        fs::write(dir.join("a.js"), vec![0u8; 100]).unwrap();
        fs::write(dir.join("nested").join("b.js"), vec![0u8; 50]).unwrap();

        assert_eq!(path_size(&dir), 150);
        assert_eq!(path_size(&dir.join("a.js")), 100);
        assert_eq!(path_size(&temp.path().join("missing")), 0);
    }

    #[test]
    fn test_remove_path() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("d");
        fs::create_dir_all(dir.join("x")).unwrap();
        fs::write(dir.join("x").join("f"), "1").unwrap();
        let file = temp.path().join("f.txt");
        fs::write(&file, "1").unwrap();

        remove_path(&dir).unwrap();
        remove_path(&file).unwrap();
        assert!(!dir.exists());
        assert!(!file.exists());
        assert!(remove_path(&file).is_err());
    }
}
