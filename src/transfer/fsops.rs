//! Filesystem mutations used by copy jobs.
//!
//! Nothing in here is called in dry-run mode.

use std::fs;
use std::io;
use std::path::Path;

use filetime::FileTime;

/// Copy one entry, keeping content, permissions and timestamps.
///
/// Symbolic links are recreated as links rather than followed. The
/// destination's parent folder is created when missing. Returns the number
/// of bytes written (zero for links).
pub fn copy_entry(source: &Path, destination: &Path) -> io::Result<u64> {
    if let Some(parent) = destination.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let metadata = fs::symlink_metadata(source)?;

    if metadata.file_type().is_symlink() {
        copy_symlink(source, destination)?;
        return Ok(0);
    }

    // A stale link at the destination would make fs::copy write through it.
    if fs::symlink_metadata(destination).map(|m| m.file_type().is_symlink()).unwrap_or(false) {
        fs::remove_file(destination)?;
    }

    let bytes = fs::copy(source, destination)?;

    let accessed = FileTime::from_last_access_time(&metadata);
    let modified = FileTime::from_last_modification_time(&metadata);
    filetime::set_file_times(destination, accessed, modified)?;

    Ok(bytes)
}

fn copy_symlink(source: &Path, destination: &Path) -> io::Result<()> {
    let target = fs::read_link(source)?;

    if let Ok(existing) = fs::symlink_metadata(destination) {
        if existing.is_dir() {
            fs::remove_dir_all(destination)?;
        } else {
            fs::remove_file(destination)?;
        }
    }

    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(&target, destination)
    }

    #[cfg(windows)]
    {
        if source.is_dir() {
            std::os::windows::fs::symlink_dir(&target, destination)
        } else {
            std::os::windows::fs::symlink_file(&target, destination)
        }
    }

    #[cfg(not(any(unix, windows)))]
    {
        let _ = target;
        fs::copy(source, destination).map(|_| ())
    }
}

/// Delete a folder tree. A missing folder is not an error.
pub fn remove_tree(path: &Path) -> io::Result<()> {
    match fs::remove_dir_all(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
