use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};
use walkdir::WalkDir;

use crate::config::{ConflictPolicy, RelocationMode};

/// Result type for file operations
pub type FileOpResult<T> = Result<T, FileOpError>;

/// Error types for file operations
#[derive(Debug, thiserror::Error)]
pub enum FileOpError {
    #[error("Copy failed: {0}")]
    CopyFailed(String),
    #[error("Remove failed: {0}")]
    RemoveFailed(String),
}

/// What happened to a single file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelocationOutcome {
    Relocated,
    /// Source and destination are the same file; nothing was touched
    InPlace,
    /// Destination existed and the conflict policy said to leave it alone
    Skipped,
}

/// Copy or move `src` to `dest`, honoring the conflict policy when `dest`
/// already exists.
///
/// A `dest` that resolves to `src` itself is left alone, since copying a
/// file onto itself truncates it.
pub fn relocate_file(
    src: &Path,
    dest: &Path,
    mode: RelocationMode,
    on_conflict: ConflictPolicy,
) -> FileOpResult<RelocationOutcome> {
    if is_same_file(src, dest) {
        debug!("{:?} is already at its destination", src);
        return Ok(RelocationOutcome::InPlace);
    }

    if dest.exists() {
        match on_conflict {
            ConflictPolicy::Skip => {
                warn!(
                    "Destination {:?} already exists, leaving {:?} in place",
                    dest, src
                );
                return Ok(RelocationOutcome::Skipped);
            }
            ConflictPolicy::Overwrite => {
                debug!("Overwriting existing destination {:?}", dest);
            }
        }
    }

    match mode {
        RelocationMode::Copy => copy_file(src, dest)?,
        RelocationMode::Move => move_file(src, dest)?,
    }
    Ok(RelocationOutcome::Relocated)
}

pub fn copy_file(src: &Path, dest: &Path) -> FileOpResult<()> {
    trace!("Copying file from {:?} to {:?}", src, dest);
    fs::copy(src, dest).map_err(|e| {
        FileOpError::CopyFailed(format!("Failed to copy from {:?} to {:?}: {}", src, dest, e))
    })?;
    Ok(())
}

/// Move a file, trying a rename first and falling back to copy + remove
/// when the rename fails (e.g. across drives).
pub fn move_file(src: &Path, dest: &Path) -> FileOpResult<()> {
    trace!("Moving file from {:?} to {:?}", src, dest);

    match fs::rename(src, dest) {
        Ok(()) => return Ok(()),
        Err(e) => debug!(
            "Rename of {:?} failed ({}), falling back to copy + remove",
            src, e
        ),
    }

    copy_file(src, dest)?;

    // Remove the original file after successful copy
    if let Err(e) = fs::remove_file(src) {
        // Leave exactly one copy behind
        let _ = fs::remove_file(dest);
        return Err(FileOpError::RemoveFailed(format!(
            "Failed to remove original file {:?}: {}",
            src, e
        )));
    }

    Ok(())
}

/// Remove every empty directory strictly below `root`, deepest first.
///
/// Only directories are ever removed. `root` itself is kept, and so is
/// anything at or below one of the `keep` paths.
pub fn prune_empty_dirs(root: &Path, keep: &[PathBuf]) -> usize {
    let root = canonical_or_raw(root);
    let keep: Vec<PathBuf> = keep.iter().map(|p| canonical_or_raw(p)).collect();

    let mut removed = 0;
    for entry in WalkDir::new(&root).min_depth(1).contents_first(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry under {:?}: {}", root, e);
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        if keep.iter().any(|k| path.starts_with(k)) {
            continue;
        }

        let is_empty = fs::read_dir(path)
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(false);
        if !is_empty {
            continue;
        }

        match fs::remove_dir(path) {
            Ok(()) => {
                debug!("Removed empty directory {:?}", path);
                removed += 1;
            }
            Err(e) => warn!("Failed to remove empty directory {:?}: {}", path, e),
        }
    }
    removed
}

/// Both paths exist and resolve to the same location.
pub fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn canonical_or_raw(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_move_removes_source() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("a.jpg");
        let dest = dir.path().join("out/a.jpg");
        write(&src, "img");
        fs::create_dir_all(dest.parent().unwrap()).unwrap();

        let outcome =
            relocate_file(&src, &dest, RelocationMode::Move, ConflictPolicy::Skip).unwrap();
        assert_eq!(outcome, RelocationOutcome::Relocated);
        assert!(!src.exists());
        assert_eq!(fs::read_to_string(&dest).unwrap(), "img");
    }

    #[test]
    fn test_copy_keeps_source_and_overwrites() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("a.jpg");
        let dest = dir.path().join("a_copy.jpg");
        write(&src, "new");
        write(&dest, "old");

        let outcome =
            relocate_file(&src, &dest, RelocationMode::Copy, ConflictPolicy::Overwrite).unwrap();
        assert_eq!(outcome, RelocationOutcome::Relocated);
        assert!(src.exists());
        assert_eq!(fs::read_to_string(&dest).unwrap(), "new");
    }

    #[test]
    fn test_move_skips_existing_destination() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("a.jpg");
        let dest = dir.path().join("b.jpg");
        write(&src, "new");
        write(&dest, "old");

        let outcome =
            relocate_file(&src, &dest, RelocationMode::Move, ConflictPolicy::Skip).unwrap();
        assert_eq!(outcome, RelocationOutcome::Skipped);
        assert_eq!(fs::read_to_string(&src).unwrap(), "new");
        assert_eq!(fs::read_to_string(&dest).unwrap(), "old");
    }

    #[test]
    fn test_copy_onto_itself_keeps_contents() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("train/images/a.jpg");
        write(&src, "0123456789");
        // Same file reached through a different spelling
        let dest = dir.path().join("train/images/../images/a.jpg");

        for mode in [RelocationMode::Copy, RelocationMode::Move] {
            let outcome = relocate_file(&src, &dest, mode, ConflictPolicy::Overwrite).unwrap();
            assert_eq!(outcome, RelocationOutcome::InPlace);
            assert_eq!(fs::read_to_string(&src).unwrap(), "0123456789");
        }
    }

    #[test]
    fn test_is_same_file() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.jpg");
        let b = dir.path().join("b.jpg");
        write(&a, "x");
        write(&b, "x");

        assert!(is_same_file(&a, &dir.path().join("./a.jpg")));
        assert!(!is_same_file(&a, &b));
        assert!(!is_same_file(&a, &dir.path().join("missing.jpg")));
    }

    #[test]
    fn test_missing_source_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result = relocate_file(
            &dir.path().join("missing.jpg"),
            &dir.path().join("dest.jpg"),
            RelocationMode::Move,
            ConflictPolicy::Skip,
        );
        assert!(matches!(result, Err(FileOpError::CopyFailed(_))));
    }

    #[test]
    fn test_prune_removes_only_empty_dirs() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("images");
        fs::create_dir_all(root.join("a/b/c")).unwrap();
        fs::create_dir_all(root.join("empty")).unwrap();
        write(&root.join("full/keep.jpg"), "x");

        let removed = prune_empty_dirs(&root, &[]);
        assert_eq!(removed, 4);
        assert!(root.exists());
        assert!(!root.join("a").exists());
        assert!(!root.join("empty").exists());
        assert!(root.join("full/keep.jpg").exists());
    }

    #[test]
    fn test_prune_keeps_root_even_when_empty() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("labels");
        fs::create_dir_all(&root).unwrap();

        assert_eq!(prune_empty_dirs(&root, &[]), 0);
        assert!(root.exists());
    }

    #[test]
    fn test_prune_skips_kept_paths() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("images");
        let kept = root.join("data/val/images");
        fs::create_dir_all(&kept).unwrap();
        fs::create_dir_all(root.join("gone")).unwrap();

        let removed = prune_empty_dirs(&root, &[root.join("data")]);
        assert_eq!(removed, 1);
        assert!(kept.exists());
        assert!(!root.join("gone").exists());
    }
}
