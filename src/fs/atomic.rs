//! Atomic file writes.
//!
//! Every write goes to `.{filename}.tmp` in the target directory, is synced to
//! disk, then renamed over the target. Source and destination share a
//! directory, so the rename stays on one filesystem.
//!
//! On crash a stale `.{filename}.tmp` may remain; the next write overwrites it.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Atomically write bytes to a file, creating parent directories as needed.
///
/// Errors carry the offending path in their message so callers can surface
/// them without extra context.
///
/// ```no_run
/// use atomic_cli::fs::atomic_write;
/// use std::path::Path;
///
/// atomic_write(Path::new("Build/build.json"), b"{}")?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &[u8]) -> io::Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| {
            with_context(e, format!("failed to create directory '{}'", parent.display()))
        })?;
    }

    let temp_path = generate_temp_path(path)?;
    write_and_sync(&temp_path, content)?;
    atomic_replace(&temp_path, path)
}

/// Convenience wrapper around [`atomic_write`] for string content.
pub fn atomic_write_file<P: AsRef<Path>>(path: P, content: &str) -> io::Result<()> {
    atomic_write(path, content.as_bytes())
}

fn generate_temp_path(target: &Path) -> io::Result<PathBuf> {
    let parent = target.parent().unwrap_or(Path::new("."));
    let filename = target.file_name().and_then(|n| n.to_str()).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid file path '{}'", target.display()),
        )
    })?;

    Ok(parent.join(format!(".{}.tmp", filename)))
}

fn write_and_sync(path: &Path, content: &[u8]) -> io::Result<()> {
    let mut file = File::create(path).map_err(|e| {
        with_context(
            e,
            format!("failed to create temporary file '{}'", path.display()),
        )
    })?;

    let written = file.write_all(content).and_then(|()| file.sync_all());
    if let Err(e) = written {
        let _ = fs::remove_file(path);
        return Err(with_context(
            e,
            format!("failed to write temporary file '{}'", path.display()),
        ));
    }

    Ok(())
}

fn atomic_replace(source: &Path, target: &Path) -> io::Result<()> {
    // rename() replaces an existing target on POSIX and on Windows (MoveFileEx
    // with MOVEFILE_REPLACE_EXISTING under the hood).
    fs::rename(source, target).map_err(|e| {
        let _ = fs::remove_file(source);
        with_context(
            e,
            format!("failed to atomically replace '{}'", target.display()),
        )
    })?;

    #[cfg(unix)]
    if let Some(parent) = target.parent()
        && let Ok(dir) = File::open(parent)
    {
        let _ = dir.sync_all();
    }

    Ok(())
}

fn with_context(error: io::Error, context: String) -> io::Error {
    io::Error::new(error.kind(), format!("{}: {}", context, error))
}
