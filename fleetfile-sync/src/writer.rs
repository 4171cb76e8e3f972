//! Atomic artifact writer.
//!
//! ## `publish` — three-way protocol
//!
//! 1. Write the rendered content to a fresh `<path>.tmp`, created with mode
//!    `0660`.
//! 2. Target missing → rename tmp over it (`Created`).
//! 3. Target byte-identical → delete tmp, leave target and its mtime alone
//!    (`Unchanged`).
//! 4. Target differs → rename tmp over it (`Refreshed`, atomic on POSIX).
//!
//! A failed rename removes the tmp file and leaves the target as it was.

use std::io::{ErrorKind, Write as _};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{io_err, PublishError};
use crate::render::tmp_path;

// ---------------------------------------------------------------------------
// Write result
// ---------------------------------------------------------------------------

/// Outcome of publishing a single artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum WriteResult {
    /// Artifact did not exist before.
    Created { path: PathBuf },
    /// Artifact existed with different content and was replaced.
    Refreshed { path: PathBuf },
    /// Artifact already held exactly this content; nothing was touched.
    Unchanged { path: PathBuf },
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Created { path }
            | WriteResult::Refreshed { path }
            | WriteResult::Unchanged { path } => path,
        }
    }

    /// Whether the artifact on disk changed.
    pub fn is_change(&self) -> bool {
        !matches!(self, WriteResult::Unchanged { .. })
    }
}

// ---------------------------------------------------------------------------
// publish
// ---------------------------------------------------------------------------

/// Atomically publish `content` at `path`, staging it in `<path>.tmp`.
pub fn publish(path: &Path, content: &str) -> Result<WriteResult, PublishError> {
    publish_with_tmp(path, content, &tmp_path(path))
}

fn publish_with_tmp(path: &Path, content: &str, tmp: &Path) -> Result<WriteResult, PublishError> {
    stage(tmp, content)?;

    let result = match std::fs::metadata(path) {
        Err(e) if e.kind() == ErrorKind::NotFound => WriteResult::Created {
            path: path.to_path_buf(),
        },
        Err(e) => {
            let _ = std::fs::remove_file(tmp);
            return Err(io_err(path, e));
        }
        Ok(_) if files_identical(tmp, path) => {
            std::fs::remove_file(tmp).map_err(|e| io_err(tmp, e))?;
            return Ok(WriteResult::Unchanged {
                path: path.to_path_buf(),
            });
        }
        Ok(_) => WriteResult::Refreshed {
            path: path.to_path_buf(),
        },
    };

    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }
    Ok(result)
}

/// Write `content` to a fresh `tmp`, created with mode `0660` so it is never
/// readable beyond the group. A stale file at `tmp` is replaced, not reused.
fn stage(tmp: &Path, content: &str) -> Result<(), PublishError> {
    match std::fs::remove_file(tmp) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(io_err(tmp, e)),
    }

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(FILE_MODE);
    }
    let mut file = options.open(tmp).map_err(|e| io_err(tmp, e))?;

    // The umask may have narrowed the creation mode.
    let written = file
        .write_all(content.as_bytes())
        .map_err(|e| io_err(tmp, e))
        .and_then(|()| set_file_permissions(tmp));
    if written.is_err() {
        drop(file);
        let _ = std::fs::remove_file(tmp);
    }
    written
}

/// Byte-for-byte comparison. Any read error counts as "different" so the
/// caller falls through to a replace.
pub(crate) fn files_identical(a: &Path, b: &Path) -> bool {
    let (Ok(meta_a), Ok(meta_b)) = (std::fs::metadata(a), std::fs::metadata(b)) else {
        return false;
    };
    if meta_a.len() != meta_b.len() {
        return false;
    }
    match (std::fs::read(a), std::fs::read(b)) {
        (Ok(bytes_a), Ok(bytes_b)) => bytes_a == bytes_b,
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Permissions
// ---------------------------------------------------------------------------

#[cfg(unix)]
const FILE_MODE: u32 = 0o660;
#[cfg(unix)]
const DIR_MODE: u32 = 0o770;

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), PublishError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(FILE_MODE))
        .map_err(|e| io_err(path, e))
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), PublishError> {
    Ok(())
}

#[cfg(unix)]
pub(crate) fn set_dir_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(DIR_MODE))
}
#[cfg(not(unix))]
pub(crate) fn set_dir_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::{set_file_mtime, FileTime};
    use std::fs;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    #[test]
    fn first_write_returns_created() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("web.instances");
        let result = publish(&path, "hello").unwrap();
        assert!(matches!(result, WriteResult::Created { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello");
    }

    #[test]
    fn same_content_returns_unchanged_and_keeps_mtime() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("web.instances");
        publish(&path, "same content").unwrap();

        let old = FileTime::from_system_time(SystemTime::now() - Duration::from_secs(3600));
        set_file_mtime(&path, old).unwrap();

        let result = publish(&path, "same content").unwrap();
        assert!(matches!(result, WriteResult::Unchanged { .. }));
        assert!(!result.is_change());

        let mtime = FileTime::from_last_modification_time(&fs::metadata(&path).unwrap());
        assert_eq!(mtime, old, "mtime changed; file was rewritten");
        assert!(!tmp_path(&path).exists(), "tmp must be discarded");
    }

    #[test]
    fn changed_content_returns_refreshed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("web.instances");
        publish(&path, "v1").unwrap();
        let result = publish(&path, "v2").unwrap();
        assert!(matches!(result, WriteResult::Refreshed { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "v2");
    }

    #[test]
    fn same_length_different_bytes_is_refreshed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("web.instances");
        publish(&path, "10.0.0.1:9000\n").unwrap();
        let result = publish(&path, "10.0.0.2:9000\n").unwrap();
        assert!(matches!(result, WriteResult::Refreshed { .. }));
    }

    #[test]
    fn tmp_file_removed_after_write() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("clean.instances");
        publish(&path, "data").unwrap();
        publish(&path, "other").unwrap();
        assert!(!tmp_path(&path).exists(), ".tmp must be cleaned up");
    }

    #[test]
    #[cfg(unix)]
    fn published_file_is_group_rw_without_world_access() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("web.instances");
        publish(&path, "data").unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o660);
    }

    #[test]
    #[cfg(unix)]
    fn stale_world_readable_tmp_is_replaced_not_reused() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let staged = tmp.path().join("web.instances.tmp");
        fs::write(&staged, "stale and longer than the new content").unwrap();
        fs::set_permissions(&staged, fs::Permissions::from_mode(0o644)).unwrap();

        stage(&staged, "fresh").unwrap();
        let mode = fs::metadata(&staged).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o660);
        assert_eq!(fs::read_to_string(&staged).unwrap(), "fresh");
    }

    #[test]
    fn unwritable_tmp_leaves_target_untouched() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("web.instances");
        fs::write(&path, "original").unwrap();
        // A directory squatting on the tmp path makes the staged write fail.
        fs::create_dir(tmp_path(&path)).unwrap();

        let err = publish(&path, "new content").unwrap_err();
        assert!(matches!(err, PublishError::Io { .. }), "got: {err}");
        assert_eq!(fs::read_to_string(&path).unwrap(), "original");
    }

    #[test]
    fn rename_failure_cleans_tmp() {
        let root = TempDir::new().unwrap();
        // A non-empty directory cannot be replaced by a file rename.
        let path = root.path().join("web.instances");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();

        let tmp = root.path().join("staged.tmp");
        let err = publish_with_tmp(&path, "new content", &tmp)
            .expect_err("rename over a directory should fail");
        assert!(matches!(err, PublishError::Io { .. }));

        assert!(path.join("keep").exists(), "target must be intact");
        assert!(!tmp.exists(), "tmp should be cleaned up");
    }

    #[test]
    fn files_identical_compares_bytes() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a");
        let b = tmp.path().join("b");
        fs::write(&a, "x\r\n").unwrap();
        fs::write(&b, "x\r\n").unwrap();
        assert!(files_identical(&a, &b));

        fs::write(&b, "x\n").unwrap();
        assert!(!files_identical(&a, &b));
        assert!(!files_identical(&a, &tmp.path().join("missing")));
    }
}
