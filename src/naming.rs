//! Output name resolution
//!
//! Release directories are expected to look like
//! `Show Name[-]Show.Name.S01E02[-]extra`; the middle segment is the name the
//! video is filed under.

use crate::error::{ResolveError, Result};
use std::path::Path;
use tracing::{info, warn};

/// Marker an explicit output name must contain to be taken verbatim
pub const NAME_MARKER: &str = "---";

/// Delimiter between the segments of a release path
pub const SEGMENT_DELIMITER: &str = "[-]";

/// Work out the output base name (without extension)
///
/// An override containing [`NAME_MARKER`] is used as-is. Otherwise the
/// input path is split on [`SEGMENT_DELIMITER`] and, given at least three
/// segments, the second one is used. Anything else is an error.
pub fn resolve_output_name(input: &Path, override_name: Option<&str>) -> Result<String> {
    if let Some(name) = override_name
        && name.contains(NAME_MARKER)
    {
        validate_name(input, name)?;
        return Ok(name.to_string());
    }

    warn!(
        override_name = ?override_name,
        "output name is empty or does not contain a valid name, attempting to use directory name"
    );

    let input_str = input.to_string_lossy();
    let segments: Vec<&str> = input_str.split(SEGMENT_DELIMITER).collect();
    if segments.len() < 3 {
        return Err(ResolveError::InvalidName {
            input: input.to_path_buf(),
            reason: format!(
                "path has {} '{}' segment(s), need at least 3; specify an output name containing '{}'",
                segments.len(),
                SEGMENT_DELIMITER,
                NAME_MARKER
            ),
        }
        .into());
    }

    let name = segments[1];
    validate_name(input, name)?;
    info!(name, "derived output name from input path");
    Ok(name.to_string())
}

/// A name must be non-empty and stay inside the ready directory
fn validate_name(input: &Path, name: &str) -> Result<()> {
    let reason = if name.trim().is_empty() {
        Some("name is empty")
    } else if name.chars().any(std::path::is_separator) {
        Some("name contains a path separator")
    } else if name == "." || name == ".." {
        Some("name is a relative directory reference")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ResolveError::InvalidName {
            input: input.to_path_buf(),
            reason: reason.to_string(),
        }
        .into()),
        None => Ok(()),
    }
}

/// Keep only alphanumeric characters, for use in workspace directory names
pub fn sanitize_name(name: &str) -> String {
    name.chars().filter(|c| c.is_alphanumeric()).collect()
}
