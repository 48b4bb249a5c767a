//! Error types for tv-post
//!
//! This module provides the error taxonomy for a processing run:
//! - Configuration errors (missing ready directory, bad settings)
//! - Resolution errors (nothing to process, no usable output name)
//! - Post-processing errors (extraction, placement)
//! - Process exit code mapping for the command-line front end

use std::path::PathBuf;
use thiserror::Error;

use crate::types::Stage;

/// Result type alias for tv-post operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for tv-post
///
/// Every variant is terminal for the run: the binary logs it at error
/// severity and exits with [`ToExitCode::exit_code`].
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "ready_dir")
        key: Option<String>,
    },

    /// Input or output-name resolution failed
    #[error("resolution error: {0}")]
    Resolve(#[from] ResolveError),

    /// Post-processing error (extract, place)
    #[error("post-processing error: {0}")]
    PostProcess(#[from] PostProcessError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// External tool execution failed (unrar)
    #[error("external tool error: {0}")]
    ExternalTool(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Errors raised while working out what to process and what to call it
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The input path is neither a file nor a directory
    #[error("no valid archive, video, or directory at {path}")]
    InputNotFound {
        /// The input path as given
        path: PathBuf,
    },

    /// A directory input contained neither an archive nor a video
    #[error("{path} contains no archive and no video content")]
    NoMediaFound {
        /// The directory that was searched
        path: PathBuf,
    },

    /// No usable output name could be derived
    #[error("no valid output name for {input}: {reason}")]
    InvalidName {
        /// The input path the name was derived from
        input: PathBuf,
        /// Why the name was rejected
        reason: String,
    },
}

/// Post-processing errors (extraction, placement)
#[derive(Debug, Error)]
pub enum PostProcessError {
    /// Archive type could not be determined from the file name
    #[error("unsupported archive type for {archive}")]
    UnsupportedArchive {
        /// The archive that could not be handled
        archive: PathBuf,
    },

    /// Archive extraction failed
    #[error("extraction failed for {archive}: {reason}")]
    ExtractionFailed {
        /// The archive file that failed to extract
        archive: PathBuf,
        /// The reason extraction failed
        reason: String,
    },

    /// Extraction finished but produced no video file
    #[error("no video file found after extracting {archive}")]
    NoVideoExtracted {
        /// The archive that was extracted
        archive: PathBuf,
    },

    /// Temporary workspace could not be created
    #[error("failed to create workspace {path}: {reason}")]
    WorkspaceFailed {
        /// The workspace directory
        path: PathBuf,
        /// The reason creation failed
        reason: String,
    },

    /// Destination directory does not exist
    #[error("destination directory {path} does not exist")]
    DestinationMissing {
        /// The missing directory
        path: PathBuf,
    },

    /// Copying to the destination failed
    #[error("failed to copy {source_path} to {dest_path}: {reason}")]
    CopyFailed {
        /// The file being copied
        source_path: PathBuf,
        /// Where it was being copied to
        dest_path: PathBuf,
        /// The reason the copy failed
        reason: String,
    },

    /// The copied file does not match its source
    #[error("copy of {source_path} failed verification: {reason}")]
    VerificationFailed {
        /// The file that was copied
        source_path: PathBuf,
        /// What did not match
        reason: String,
    },

    /// File move/rename failed
    #[error("failed to move {source_path} to {dest_path}: {reason}")]
    MoveFailed {
        /// The source path of the file being moved
        source_path: PathBuf,
        /// The destination path where the file should be moved
        dest_path: PathBuf,
        /// The reason the move failed
        reason: String,
    },

    /// File collision at destination
    #[error("file collision at {path}: {reason}")]
    FileCollision {
        /// The path where the collision occurred
        path: PathBuf,
        /// The reason for the collision (e.g., "file already exists")
        reason: String,
    },

    /// Invalid path encountered during post-processing
    #[error("invalid path {path}: {reason}")]
    InvalidPath {
        /// The invalid path that was encountered
        path: PathBuf,
        /// The reason the path is invalid
        reason: String,
    },
}

impl Error {
    /// Shorthand for a configuration error tied to a setting
    pub fn config(message: impl Into<String>, key: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Pipeline stage this error belongs to
    pub fn stage(&self) -> Stage {
        match self {
            Error::Config { .. } | Error::Serialization(_) => Stage::Start,
            Error::Resolve(_) => Stage::InputValidated,
            Error::PostProcess(e) => match e {
                PostProcessError::UnsupportedArchive { .. }
                | PostProcessError::ExtractionFailed { .. }
                | PostProcessError::NoVideoExtracted { .. }
                | PostProcessError::WorkspaceFailed { .. } => Stage::Extracted,
                _ => Stage::Placed,
            },
            Error::ExternalTool(_) => Stage::Extracted,
            Error::Io(_) | Error::Other(_) => Stage::Done,
        }
    }
}

/// Convert errors to process exit codes
///
/// This trait maps domain errors onto the exit status of the binary.
pub trait ToExitCode {
    /// Get the process exit code for this error
    fn exit_code(&self) -> u8;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToExitCode for Error {
    fn exit_code(&self) -> u8 {
        match self {
            // 2 - bad configuration, nothing touched yet
            Error::Config { .. } => 2,
            Error::Serialization(_) => 2,

            // 3 - nothing to process or nothing to call it
            Error::Resolve(_) => 3,

            // 4 / 5 - extraction vs placement
            Error::PostProcess(e) => match e {
                PostProcessError::UnsupportedArchive { .. }
                | PostProcessError::ExtractionFailed { .. }
                | PostProcessError::NoVideoExtracted { .. }
                | PostProcessError::WorkspaceFailed { .. } => 4,
                PostProcessError::DestinationMissing { .. }
                | PostProcessError::CopyFailed { .. }
                | PostProcessError::VerificationFailed { .. }
                | PostProcessError::MoveFailed { .. }
                | PostProcessError::FileCollision { .. }
                | PostProcessError::InvalidPath { .. } => 5,
            },
            Error::ExternalTool(_) => 4,

            Error::Io(_) => 1,
            Error::Other(_) => 1,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Resolve(e) => match e {
                ResolveError::InputNotFound { .. } => "input_not_found",
                ResolveError::NoMediaFound { .. } => "no_media_found",
                ResolveError::InvalidName { .. } => "invalid_name",
            },
            Error::PostProcess(e) => match e {
                PostProcessError::UnsupportedArchive { .. } => "unsupported_archive",
                PostProcessError::ExtractionFailed { .. } => "extraction_failed",
                PostProcessError::NoVideoExtracted { .. } => "no_video_extracted",
                PostProcessError::WorkspaceFailed { .. } => "workspace_failed",
                PostProcessError::DestinationMissing { .. } => "destination_missing",
                PostProcessError::CopyFailed { .. } => "copy_failed",
                PostProcessError::VerificationFailed { .. } => "verification_failed",
                PostProcessError::MoveFailed { .. } => "move_failed",
                PostProcessError::FileCollision { .. } => "file_collision",
                PostProcessError::InvalidPath { .. } => "invalid_path",
            },
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
            Error::ExternalTool(_) => "external_tool_error",
            Error::Other(_) => "internal_error",
        }
    }
}
