//! File primitives for the durable save pair.
//!
//! The primary file is only ever replaced atomically: content is staged in
//! a temp file in the same directory, flushed and fsynced, then renamed
//! over the primary. A crash mid-write leaves either the old file or the
//! new file, never a partial one.

use crate::core::{Result, SaveError};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

pub fn atomic_write(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| SaveError::Io(format!("Save path '{}' has no parent directory", path.display())))?;
    fs::create_dir_all(parent)
        .map_err(|e| SaveError::Io(format!("Failed to create save directory: {}", e)))?;

    // Temp file must live in the target directory so the final rename
    // stays on one filesystem.
    let mut temp = NamedTempFile::new_in(parent)
        .map_err(|e| SaveError::Io(format!("Failed to create temp save file: {}", e)))?;
    temp.write_all(contents.as_bytes())
        .map_err(|e| SaveError::Io(format!("Failed to write save file: {}", e)))?;
    temp.flush()
        .map_err(|e| SaveError::Io(format!("Failed to flush save file: {}", e)))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| SaveError::Io(format!("Failed to sync save file: {}", e)))?;
    temp.persist(path)
        .map_err(|e| SaveError::Io(format!("Failed to replace save file: {}", e)))?;
    Ok(())
}

pub fn read_if_exists(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    fs::read_to_string(path)
        .map(Some)
        .map_err(|e| SaveError::Io(format!("Failed to read save file '{}': {}", path.display(), e)))
}

pub fn copy_if_exists(from: &Path, to: &Path) -> Result<bool> {
    if !from.exists() {
        return Ok(false);
    }
    fs::copy(from, to)
        .map_err(|e| SaveError::Io(format!("Failed to copy save backup: {}", e)))?;
    Ok(true)
}

pub fn remove_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).map_err(|e| {
            SaveError::Io(format!("Failed to delete save file '{}': {}", path.display(), e))
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write_creates_and_replaces() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("save.json");
        atomic_write(&path, "first").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "first");
        atomic_write(&path, "second").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn test_atomic_write_creates_missing_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deeper").join("save.json");
        atomic_write(&path, "content").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "content");
    }

    #[test]
    fn test_read_if_exists_on_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(read_if_exists(&dir.path().join("missing.json")).unwrap().is_none());
    }

    #[test]
    fn test_copy_if_exists_reports_source_presence() {
        let dir = TempDir::new().unwrap();
        let from = dir.path().join("save.json");
        let to = dir.path().join("save.backup.json");
        assert!(!copy_if_exists(&from, &to).unwrap());
        atomic_write(&from, "data").unwrap();
        assert!(copy_if_exists(&from, &to).unwrap());
        assert_eq!(fs::read_to_string(&to).unwrap(), "data");
    }

    #[test]
    fn test_remove_if_exists_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("save.json");
        remove_if_exists(&path).unwrap();
        atomic_write(&path, "data").unwrap();
        remove_if_exists(&path).unwrap();
        assert!(!path.exists());
        remove_if_exists(&path).unwrap();
    }
}
