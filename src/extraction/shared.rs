use crate::types::ArchiveType;
use std::path::{Component, Path, PathBuf};

/// Detect archive type by file extension
///
/// Supports RAR (.rar, .r00) and ZIP (.zip). Multi-part names such as
/// `show.part01.rar` are RAR by their final extension.
pub fn detect_archive_type(path: &Path) -> Option<ArchiveType> {
    let ext = path.extension()?.to_str()?.to_lowercase();

    match ext.as_str() {
        "rar" | "r00" => Some(ArchiveType::Rar),
        "zip" => Some(ArchiveType::Zip),
        _ => None,
    }
}

/// Strip everything but normal components from an archive member path
///
/// Prevents path traversal (`../../etc/passwd`, absolute names). An empty
/// result means the member has no safe location and must be skipped.
pub fn sanitize_member_path(member: &Path) -> PathBuf {
    member
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .collect()
}

/// One listing line: size column then member path
pub(crate) fn format_member(path: &Path, size: u64, is_directory: bool) -> String {
    if is_directory {
        format!("{:>14}  {}/", "<dir>", path.display())
    } else {
        format!("{:>14}  {}", size, path.display())
    }
}
