//! Backup/restore bookkeeping
//!
//! Before the first destructive write to a file its bytes are copied to a
//! sibling backup path, exactly once. Restoring from that backup before
//! re-processing makes repeated runs idempotent with respect to the
//! original file instead of accumulating edits on top of edits.
//!
//! There is no transactional guarantee beyond existence checks: a crash
//! between restore and re-write leaves the working file equal to the
//! backup, which is an acceptable outcome.

use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::Result;

/// Backup suffix for the patch/rebuild lineage
pub const ORIG_SUFFIX: &str = "orig.bak";

/// Backup suffix for the Keras 0.x conversion lineage
pub const KERAS0X_SUFFIX: &str = "keras0x.bak";

/// Sibling backup path: `<original path>.<suffix>`
pub fn backup_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

/// Copy the working file to its backup path, only if no backup exists yet.
/// Returns the backup path when a copy was actually made.
pub fn backup_once(path: &Path, suffix: &str) -> Result<Option<PathBuf>> {
    let backup = backup_path(path, suffix);
    if backup.exists() {
        return Ok(None);
    }
    fs::copy(path, &backup)?;
    Ok(Some(backup))
}

/// Overwrite the working file with its backed-up bytes, if a backup exists.
/// Returns whether a restore happened.
pub fn restore_from_backup(path: &Path, suffix: &str) -> Result<bool> {
    let backup = backup_path(path, suffix);
    if !backup.exists() {
        return Ok(false);
    }
    fs::copy(&backup, path)?;
    Ok(true)
}

/// Per-file operation for the `restore` subcommand: put the file back to
/// its pre-migration bytes from whichever backup lineage exists.
pub fn restore_file(path: &Path) -> Result<Vec<String>> {
    for suffix in [ORIG_SUFFIX, KERAS0X_SUFFIX] {
        if restore_from_backup(path, suffix)? {
            return Ok(vec![format!(
                "Restored from: {}",
                backup_path(path, suffix).display()
            )]);
        }
    }
    Ok(vec!["No backup found, left unchanged".to_string()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_backup_path_appends_suffix() {
        let path = Path::new("/models/a.model_arch.json");
        assert_eq!(
            backup_path(path, ORIG_SUFFIX),
            PathBuf::from("/models/a.model_arch.json.orig.bak")
        );
    }

    #[test]
    fn test_backup_happens_exactly_once() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "m.model_arch.json", "original");

        let first = backup_once(&path, ORIG_SUFFIX).unwrap();
        assert!(first.is_some());

        // Mutate the working file, then try to back up again
        fs::write(&path, "patched").unwrap();
        let second = backup_once(&path, ORIG_SUFFIX).unwrap();
        assert!(second.is_none());

        // The backup still holds the pre-first-write bytes
        let backup = backup_path(&path, ORIG_SUFFIX);
        assert_eq!(fs::read_to_string(backup).unwrap(), "original");
    }

    #[test]
    fn test_restore_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "m.model_arch.json", "original");

        backup_once(&path, ORIG_SUFFIX).unwrap();
        fs::write(&path, "patched").unwrap();

        assert!(restore_from_backup(&path, ORIG_SUFFIX).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "original");
    }

    #[test]
    fn test_restore_without_backup_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "m.model_arch.json", "untouched");

        assert!(!restore_from_backup(&path, ORIG_SUFFIX).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "untouched");
    }

    #[test]
    fn test_restore_file_prefers_orig_lineage() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "m.model_arch.json", "patched");
        fs::write(backup_path(&path, ORIG_SUFFIX), "from-orig").unwrap();
        fs::write(backup_path(&path, KERAS0X_SUFFIX), "from-0x").unwrap();

        restore_file(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "from-orig");
    }
}
