//! Recursive file search
//!
//! Every search walks the tree with entries sorted by file name, so "first
//! match" is the first match in lexicographic path order and repeated runs
//! over the same tree pick the same file.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// `name.part1.rar`, `name.part01.rar`, `name.part001.rar`, ...
static FIRST_VOLUME: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"(?i)\.part0*1\.rar$").unwrap()
});

/// Check if a filename is the first volume of a multi-part RAR set
pub fn is_first_volume(file_name: &str) -> bool {
    FIRST_VOLUME.is_match(file_name)
}

/// Check if a path has one of the given extensions (case-insensitive, no dots)
pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

/// Regular files under `root` in walk order
///
/// Unreadable entries are logged and skipped.
fn walk_files(root: &Path) -> impl Iterator<Item = PathBuf> + '_ {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(move |entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(?root, error = %e, "skipping unreadable entry during search");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
}

/// Return the first regular file under `root` accepted by `predicate`
///
/// The walk stops at the first match.
pub fn find_first<F>(root: &Path, predicate: F) -> Option<PathBuf>
where
    F: Fn(&Path) -> bool,
{
    let found = walk_files(root).find(|path| predicate(path));
    debug!(?root, found = found.is_some(), "search finished");
    found
}

/// Return every regular file under `root` accepted by `predicate`, in walk order
pub fn find_all<F>(root: &Path, predicate: F) -> Vec<PathBuf>
where
    F: Fn(&Path) -> bool,
{
    let found: Vec<PathBuf> = walk_files(root).filter(|path| predicate(path)).collect();
    debug!(?root, matches = found.len(), "search finished");
    found
}

/// First volume of a multi-part RAR set under `root`
pub fn find_first_volume(root: &Path) -> Option<PathBuf> {
    find_first(root, |p| {
        p.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(is_first_volume)
    })
}

/// Any `.rar` file under `root`
pub fn find_rar(root: &Path) -> Option<PathBuf> {
    find_first(root, |p| has_extension(p, &["rar".to_string()]))
}

/// First video file under `root`
pub fn find_video(root: &Path, video_extensions: &[String]) -> Option<PathBuf> {
    let found = find_first(root, |p| has_extension(p, video_extensions));
    debug!(?root, video = ?found, "video search result");
    found
}
