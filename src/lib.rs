//! # tv-post
//!
//! Post-processing for completed TV downloads.
//!
//! Given a finished download (a directory, a multi-part RAR set, or a bare
//! video file), tv-post:
//! - finds the archive or video to work with,
//! - works out the name the episode should be filed under,
//! - extracts the archive into a throwaway workspace, dropping samples and
//!   other small members,
//! - moves (or, while the download is still seeding, copies) the video into
//!   the ready directory,
//! - removes the workspace.
//!
//! ## Quick Start
//!
//! ```no_run
//! use tv_post::{Config, JobRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::default();
//!     config.paths.ready_dir = Some("/ready".into());
//!     config.validate()?;
//!
//!     let request = JobRequest::new("/downloads/Show[-]Show.Name.S01E02[-]grp");
//!     let placed = tv_post::process(&request, config).await?;
//!     println!("placed at {}", placed.display());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Archive extraction
pub mod extraction;
/// Logging setup
pub mod logging;
/// Output name resolution
pub mod naming;
/// Post-processing pipeline
pub mod post_processing;
/// Input resolution
pub mod resolve;
/// Sorted filesystem searches
pub mod search;
/// Core types
pub mod types;
/// Utility functions
pub mod utils;

use std::path::PathBuf;
use std::sync::Arc;

// Re-export commonly used types
pub use config::{Config, ConfigOverrides, FileCollisionAction, TransferPolicy};
pub use error::{Error, PostProcessError, ResolveError, Result, ToExitCode};
pub use extraction::{ArchiveHandler, CliArchiveHandler, LibraryArchiveHandler, create_handler};
pub use post_processing::PostProcessor;
pub use resolve::prepare_job;
pub use types::{Job, JobRequest, ResolvedInput, Stage, TransferMode};

/// Resolve a request and run the whole pipeline for it
///
/// `config` should already have passed [`Config::validate`]. The archive
/// backend is chosen from `config.tools`.
pub async fn process(request: &JobRequest, config: Config) -> Result<PathBuf> {
    let handler = create_handler(&config.tools)?;
    let job = prepare_job(request, &config)?;
    PostProcessor::new(handler, Arc::new(config)).run(&job).await
}
