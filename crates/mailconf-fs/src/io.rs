//! Atomic I/O operations with file locking

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::{Error, Result};

/// Build a hidden sibling path for staging content next to `target`.
///
/// The temp file lives in the same directory so the final rename never
/// crosses a filesystem boundary.
pub fn sibling_temp_path(target: &Path) -> Result<PathBuf> {
    let file_name = target
        .file_name()
        .ok_or_else(|| Error::InvalidTarget {
            path: target.to_path_buf(),
            reason: "path has no file name".into(),
        })?
        .to_string_lossy();

    let temp_name = format!(".{}.{}.tmp", file_name, uuid::Uuid::new_v4().simple());
    Ok(target.with_file_name(temp_name))
}

/// Write `content` to `path`, creating or truncating it, and flush to disk.
pub fn write_synced(path: &Path, content: &[u8]) -> Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(|e| Error::io(path, e))?;

    file.write_all(content).map_err(|e| Error::io(path, e))?;
    file.sync_all().map_err(|e| Error::io(path, e))?;
    Ok(())
}

/// Write content atomically to a file with locking.
///
/// Uses write-to-temp-then-rename so readers see either the old or the new
/// configuration, never a partial one. When the target already exists its
/// permission bits are carried over to the replacement.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let temp_path = sibling_temp_path(path)?;

    let result = (|| {
        let mut temp_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| Error::io(&temp_path, e))?;

        temp_file.lock_exclusive().map_err(|_| Error::LockFailed {
            path: path.to_path_buf(),
        })?;

        temp_file
            .write_all(content)
            .map_err(|e| Error::io(&temp_path, e))?;
        temp_file.sync_all().map_err(|e| Error::io(&temp_path, e))?;

        temp_file.unlock().map_err(|_| Error::LockFailed {
            path: path.to_path_buf(),
        })?;

        if let Ok(existing) = fs::metadata(path) {
            fs::set_permissions(&temp_path, existing.permissions())
                .map_err(|e| Error::io(&temp_path, e))?;
        }

        fs::rename(&temp_path, path).map_err(|e| Error::io(path, e))
    })();

    if result.is_err() {
        remove_quietly(&temp_path);
    }
    result
}

/// Read the full contents of a file.
pub fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| Error::io(path, e))
}

/// Read a file as UTF-8 text.
pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

/// Remove a staging file, logging instead of failing.
///
/// A leftover temp file never changes the outcome of a comparison that has
/// already been computed.
pub fn remove_quietly(path: &Path) {
    if let Err(e) = fs::remove_file(path)
        && e.kind() != std::io::ErrorKind::NotFound
    {
        tracing::warn!(path = %path.display(), error = %e, "failed to delete temporary file");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sibling_temp_path_stays_in_same_directory() {
        let target = Path::new("/etc/postfix/main.cf");
        let temp = sibling_temp_path(target).unwrap();

        assert_eq!(temp.parent(), target.parent());
        let name = temp.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with(".main.cf."));
        assert!(name.ends_with(".tmp"));
    }

    #[test]
    fn sibling_temp_paths_are_unique() {
        let target = Path::new("/etc/opendkim.conf");
        assert_ne!(
            sibling_temp_path(target).unwrap(),
            sibling_temp_path(target).unwrap()
        );
    }

    #[test]
    fn sibling_temp_path_rejects_root() {
        let err = sibling_temp_path(Path::new("/")).unwrap_err();
        assert!(matches!(err, Error::InvalidTarget { .. }));
    }
}
