//! Core types shared by the processing pipeline

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Pipeline stage
///
/// `Start → InputValidated → Extracted → Placed → Cleaned → Done` for
/// archives, `Start → InputValidated → Placed → Done` for direct videos.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Nothing resolved yet
    Start,
    /// Input and output name resolved
    InputValidated,
    /// Archive extracted and a video located in the workspace
    Extracted,
    /// Video transferred to the ready directory
    Placed,
    /// Workspace removed
    Cleaned,
    /// Run finished
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Start => "start",
            Stage::InputValidated => "input_validated",
            Stage::Extracted => "extracted",
            Stage::Placed => "placed",
            Stage::Cleaned => "cleaned",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Archive type detected by file extension
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveType {
    /// RAR archive (.rar, .partNN.rar, .r00)
    Rar,
    /// ZIP archive (.zip)
    Zip,
}

/// What the input path turned out to be
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolvedInput {
    /// A video file that can be placed as-is
    Video(PathBuf),
    /// An archive that has to be extracted first
    Archive(PathBuf),
}

impl ResolvedInput {
    /// The concrete file this input resolved to
    pub fn path(&self) -> &Path {
        match self {
            ResolvedInput::Video(p) | ResolvedInput::Archive(p) => p,
        }
    }

    /// Whether extraction is required
    pub fn is_archive(&self) -> bool {
        matches!(self, ResolvedInput::Archive(_))
    }
}

/// How the video reaches the ready directory
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferMode {
    /// Rename into place; the source disappears
    Move,
    /// Copy beside the destination, then rename into place; the source stays
    Copy,
}

/// What the caller asked for: the raw input path and optional name override
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobRequest {
    /// Input file or directory as given on the command line
    pub input: PathBuf,
    /// Output name override (`-o`)
    pub output_name: Option<String>,
}

impl JobRequest {
    /// Create a request without a name override
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_name: None,
        }
    }

    /// Set the output name override
    pub fn with_output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = Some(name.into());
        self
    }
}

/// A fully resolved processing run
///
/// Built once by [`crate::resolve::prepare_job`] and never mutated
/// afterwards; every pipeline step takes it by reference.
#[derive(Clone, Debug)]
pub struct Job {
    /// Input path as originally given
    pub input: PathBuf,
    /// The concrete archive or video the input resolved to
    pub source: ResolvedInput,
    /// Output base name, without extension
    pub output_name: String,
    /// Directory the video is placed in
    pub ready_dir: PathBuf,
    /// Root under which the per-run workspace is created
    pub temp_root: PathBuf,
    /// Archive members smaller than this are not extracted
    pub min_file_size: u64,
    /// Video file extensions (lowercase, without dots)
    pub video_extensions: Vec<String>,
    /// Move or copy
    pub transfer: TransferMode,
    /// Resolve and log everything but skip the final transfer
    pub dry_run: bool,
}

impl Job {
    /// Whether this job needs extraction
    pub fn is_archive(&self) -> bool {
        self.source.is_archive()
    }

    /// Destination for a video with the given source path
    ///
    /// The extension of `video` is preserved; the stem is replaced by the
    /// resolved output name.
    pub fn destination_for(&self, video: &Path) -> PathBuf {
        let file_name = match video.extension() {
            Some(ext) => format!("{}.{}", self.output_name, ext.to_string_lossy()),
            None => self.output_name.clone(),
        };
        self.ready_dir.join(file_name)
    }
}
