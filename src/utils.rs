//! Path helpers shared by placement and the workspace

use crate::config::FileCollisionAction;
use crate::error::{Error, PostProcessError, Result};
use std::path::{Path, PathBuf};

/// Upper bound on ` (n)` suffixes tried before giving up
const MAX_RENAME_ATTEMPTS: u32 = 9999;

/// Resolve the final destination path under the given collision action
///
/// - `Overwrite` returns `path` unchanged, replacing any existing file.
/// - `Skip` fails with [`PostProcessError::FileCollision`] if `path` exists.
/// - `Rename` appends ` (1)`, ` (2)`, ... to the stem until the name is free.
///
/// # Example
///
/// ```no_run
/// use tv_post::utils::get_unique_path;
/// use tv_post::config::FileCollisionAction;
/// use std::path::Path;
///
/// let path = Path::new("/ready/Show.Name.S01E02.mkv");
/// let unique = get_unique_path(path, FileCollisionAction::Rename).unwrap();
/// // /ready/Show.Name.S01E02 (1).mkv if the original is taken
/// ```
pub fn get_unique_path(path: &Path, action: FileCollisionAction) -> Result<PathBuf> {
    match action {
        FileCollisionAction::Overwrite => Ok(path.to_path_buf()),
        FileCollisionAction::Skip => {
            if path.exists() {
                return Err(Error::PostProcess(PostProcessError::FileCollision {
                    path: path.to_path_buf(),
                    reason: "destination already exists and collision action is skip".to_string(),
                }));
            }
            Ok(path.to_path_buf())
        }
        FileCollisionAction::Rename => {
            if !path.exists() {
                return Ok(path.to_path_buf());
            }

            let stem = path.file_stem().and_then(|s| s.to_str()).ok_or_else(|| {
                Error::PostProcess(PostProcessError::InvalidPath {
                    path: path.to_path_buf(),
                    reason: "cannot extract file stem".to_string(),
                })
            })?;
            let extension = path.extension().and_then(|e| e.to_str());
            let parent = path.parent().ok_or_else(|| {
                Error::PostProcess(PostProcessError::InvalidPath {
                    path: path.to_path_buf(),
                    reason: "cannot extract parent directory".to_string(),
                })
            })?;

            for i in 1..=MAX_RENAME_ATTEMPTS {
                let new_name = match extension {
                    Some(ext) => format!("{} ({}).{}", stem, i, ext),
                    None => format!("{} ({})", stem, i),
                };
                let new_path = parent.join(new_name);
                if !new_path.exists() {
                    return Ok(new_path);
                }
            }

            Err(Error::PostProcess(PostProcessError::FileCollision {
                path: path.to_path_buf(),
                reason: format!(
                    "could not find a free name after {} attempts",
                    MAX_RENAME_ATTEMPTS
                ),
            }))
        }
    }
}

/// Hidden sibling a copy is written to before being renamed into place
///
/// `/ready/Show.mkv` becomes `/ready/.Show.mkv.partial`, so the partial file
/// lives on the same filesystem as the destination and the final rename is
/// atomic.
pub fn partial_path_for(dest: &Path) -> Result<PathBuf> {
    let file_name = dest.file_name().ok_or_else(|| {
        Error::PostProcess(PostProcessError::InvalidPath {
            path: dest.to_path_buf(),
            reason: "destination has no file name".to_string(),
        })
    })?;
    let mut partial = std::ffi::OsString::from(".");
    partial.push(file_name);
    partial.push(".partial");
    Ok(dest.with_file_name(partial))
}

/// Whether an I/O error is a rename across filesystems (EXDEV)
pub fn is_cross_device(err: &std::io::Error) -> bool {
    err.kind() == std::io::ErrorKind::CrossesDevices || err.raw_os_error() == Some(EXDEV)
}

#[cfg(unix)]
const EXDEV: i32 = 18;
#[cfg(windows)]
const EXDEV: i32 = 17; // ERROR_NOT_SAME_DEVICE
#[cfg(not(any(unix, windows)))]
const EXDEV: i32 = -1;
