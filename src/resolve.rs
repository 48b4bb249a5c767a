//! Input resolution and job preparation
//!
//! Turns a raw [`JobRequest`] plus [`Config`] into an immutable [`Job`]:
//! what to process (archive or video), what to call it, and how to transfer
//! it.

use crate::config::Config;
use crate::error::{ResolveError, Result};
use crate::naming::resolve_output_name;
use crate::search;
use crate::types::{Job, JobRequest, ResolvedInput};
use std::path::Path;
use tracing::{error, info};

/// Work out what an input path refers to
///
/// 1. A regular file with a video extension is a direct video.
/// 2. Any other regular file is an archive candidate.
/// 3. A directory is searched for a first volume (`.part01.rar`), then any
///    `.rar`, then any video file.
/// 4. Anything else is an error.
pub fn resolve_input(input: &Path, video_extensions: &[String]) -> Result<ResolvedInput> {
    info!(?input, "resolving input");

    if input.is_file() {
        if search::has_extension(input, video_extensions) {
            return Ok(ResolvedInput::Video(input.to_path_buf()));
        }
        return Ok(ResolvedInput::Archive(input.to_path_buf()));
    }

    if !input.is_dir() {
        error!(?input, "no valid archive, video, or directory specified");
        return Err(ResolveError::InputNotFound {
            path: input.to_path_buf(),
        }
        .into());
    }

    if let Some(archive) = search::find_first_volume(input) {
        info!(?archive, "found first volume of multi-part archive");
        return Ok(ResolvedInput::Archive(archive));
    }

    // It may not have a part number, retry without parts
    if let Some(archive) = search::find_rar(input) {
        info!(?archive, "found archive");
        return Ok(ResolvedInput::Archive(archive));
    }

    info!(?input, "no rar archive found in the directory, searching for video");
    match search::find_video(input, video_extensions) {
        Some(video) => Ok(ResolvedInput::Video(video)),
        None => {
            error!(?input, "input directory contains no video content");
            Err(ResolveError::NoMediaFound {
                path: input.to_path_buf(),
            }
            .into())
        }
    }
}

/// Resolve a request against the configuration into a [`Job`]
///
/// The configuration must already have passed [`Config::validate`].
pub fn prepare_job(request: &JobRequest, config: &Config) -> Result<Job> {
    let ready_dir = config
        .ready_dir()
        .ok_or_else(|| crate::Error::config("ready directory not set", "ready_dir"))?
        .to_path_buf();
    let temp_root = config.temp_root()?;

    let source = resolve_input(&request.input, &config.extraction.video_extensions)?;
    let output_name = resolve_output_name(&request.input, request.output_name.as_deref())?;
    let transfer = config
        .placement
        .transfer
        .resolve(source.path(), &config.placement.seed_marker);

    info!(
        source = ?source,
        output_name,
        ?transfer,
        dry_run = config.test_mode,
        "job prepared"
    );

    Ok(Job {
        input: request.input.clone(),
        source,
        output_name,
        ready_dir,
        temp_root,
        min_file_size: config.extraction.min_file_size,
        video_extensions: config
            .extraction
            .video_extensions
            .iter()
            .map(|e| e.to_lowercase())
            .collect(),
        transfer,
        dry_run: config.test_mode,
    })
}
