//! Filesystem - Directory removal, copy and move helpers for save directories

use crate::Result;
use std::fs::{self, File, FileTimes};
use std::io;
use std::path::Path;
use std::time::SystemTime;
use tracing::{debug, warn};

/// Remove a directory along with everything inside it
///
/// Nothing happens if the path doesn't exist or is a regular file. When
/// `file_removal_required` is false, files that can't be deleted are left
/// behind silently; otherwise the first such failure is returned. The same
/// applies to `directory_removal_required` for the directories themselves,
/// which can only be removed once they are empty. Symbolic links are
/// removed themselves and never followed.
pub fn remove_directory_tree(
    directory: &Path,
    file_removal_required: bool,
    directory_removal_required: bool,
) -> Result<()> {
    if !directory.exists() || directory.is_file() {
        return Ok(());
    }

    let entries = match fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(e) if !file_removal_required => {
            debug!(path = %directory.display(), error = %e, "Skipped an unreadable directory");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let mut cleared_directory = true;

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if !file_removal_required => {
                debug!(path = %directory.display(), error = %e, "Skipped an unreadable entry");
                cleared_directory = false;
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(e) if !file_removal_required => {
                debug!(path = %path.display(), error = %e, "Skipped an entry of unknown type");
                cleared_directory = false;
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        if file_type.is_dir() {
            remove_directory_tree(&path, file_removal_required, directory_removal_required)?;
        } else if let Err(e) = remove_link_or_file(&path) {
            if file_removal_required {
                return Err(e.into());
            }

            debug!(path = %path.display(), error = %e, "Left behind a file that could not be removed");
        }

        if fs::symlink_metadata(&path).is_ok() {
            cleared_directory = false;
        }
    }

    if !cleared_directory {
        if directory_removal_required {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("Directory is not empty: {}", directory.display()),
            )
            .into());
        }

        return Ok(());
    }

    match fs::remove_dir(directory) {
        Ok(()) => Ok(()),
        Err(e) if directory_removal_required => Err(e.into()),
        Err(e) => {
            debug!(path = %directory.display(), error = %e, "Left behind a directory that could not be removed");
            Ok(())
        }
    }
}

/// Links to directories are directories themselves on Windows
fn remove_link_or_file(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if cfg!(windows) && fs::symlink_metadata(path)?.file_type().is_symlink() => {
            fs::remove_dir(path).map_err(|_| e)
        }
        other => other,
    }
}

/// Delete a directory only if it exists and is empty
pub fn close_directory(directory: &Path, ignore_errors: bool) -> Result<()> {
    let result = close_directory_inner(directory);

    match result {
        Err(e) if ignore_errors => {
            debug!(path = %directory.display(), error = %e, "Ignored an error closing a directory");
            Ok(())
        }
        other => other.map_err(Into::into),
    }
}

fn close_directory_inner(directory: &Path) -> io::Result<()> {
    if !directory.exists() || directory.is_file() {
        return Ok(());
    }

    if fs::read_dir(directory)?.next().is_some() {
        return Ok(());
    }

    fs::remove_dir(directory)
}

/// Copy a directory recursively to a destination that doesn't exist yet
///
/// Symbolic links are recreated as links rather than followed.
pub fn copy_directory(source: &Path, destination: &Path) -> Result<()> {
    debug!(
        source = %source.display(),
        destination = %destination.display(),
        "Copying directory"
    );

    fs::create_dir_all(destination)?;

    let walk = walkdir::WalkDir::new(source).min_depth(1).follow_links(false);

    for entry in walk {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        let target = destination.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else if entry.file_type().is_symlink() {
            copy_link(entry.path(), &target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            if target.exists() {
                fs::remove_file(&target)?;
            }
            fs::copy(entry.path(), &target)?;
        }
    }

    Ok(())
}

#[cfg(unix)]
fn copy_link(link: &Path, target: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(fs::read_link(link)?, target)
}

#[cfg(windows)]
fn copy_link(link: &Path, target: &Path) -> io::Result<()> {
    let destination = fs::read_link(link)?;

    if fs::metadata(link).map(|metadata| metadata.is_dir()).unwrap_or(false) {
        std::os::windows::fs::symlink_dir(destination, target)
    } else {
        std::os::windows::fs::symlink_file(destination, target)
    }
}

#[cfg(not(any(unix, windows)))]
fn copy_link(link: &Path, _target: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        format!("can't recreate the link {}", link.display()),
    ))
}

/// Move a directory, merging into the target if it already exists
///
/// A plain rename is tried first. If that fails (a different volume, or the
/// target already exists) files are moved one at a time. The moved directory
/// keeps its access and modification times.
pub fn move_directory(source: &Path, target: &Path) -> Result<()> {
    if !source.exists() || source.is_file() {
        return Ok(());
    }

    let metadata = fs::metadata(source)?;
    let accessed = metadata.accessed().ok();
    let modified = metadata.modified().ok();

    if !target.exists() && fs::rename(source, target).is_ok() {
        return Ok(());
    }

    fs::create_dir_all(target)?;

    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let current = entry.path();
        let destination = target.join(entry.file_name());

        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            move_directory(&current, &destination)?;
        } else {
            if fs::symlink_metadata(&destination).is_ok() {
                remove_link_or_file(&destination)?;
            }
            if fs::rename(&current, &destination).is_err() {
                if file_type.is_symlink() {
                    copy_link(&current, &destination)?;
                } else {
                    fs::copy(&current, &destination)?;
                }
                remove_link_or_file(&current)?;
            }
        }
    }

    if let Err(e) = set_directory_times(target, accessed, modified) {
        warn!(path = %target.display(), error = %e, "Failed to carry directory times over");
    }

    close_directory(source, true)
}

/// Stamp a directory's access and modification times to now
pub fn touch_directory(directory: &Path) -> Result<()> {
    let now = SystemTime::now();
    set_directory_times(directory, Some(now), Some(now))?;
    Ok(())
}

fn set_directory_times(
    directory: &Path,
    accessed: Option<SystemTime>,
    modified: Option<SystemTime>,
) -> io::Result<()> {
    let mut times = FileTimes::new();

    if let Some(accessed) = accessed {
        times = times.set_accessed(accessed);
    }
    if let Some(modified) = modified {
        times = times.set_modified(modified);
    }

    open_directory(directory)?.set_times(times)
}

#[cfg(not(windows))]
fn open_directory(directory: &Path) -> io::Result<File> {
    File::open(directory)
}

/// Directory handles need backup semantics and attribute write access on Windows
#[cfg(windows)]
fn open_directory(directory: &Path) -> io::Result<File> {
    use std::os::windows::fs::OpenOptionsExt;

    const FILE_WRITE_ATTRIBUTES: u32 = 0x0100;
    const FILE_FLAG_BACKUP_SEMANTICS: u32 = 0x0200_0000;

    fs::OpenOptions::new()
        .access_mode(FILE_WRITE_ATTRIBUTES)
        .custom_flags(FILE_FLAG_BACKUP_SEMANTICS)
        .open(directory)
}
