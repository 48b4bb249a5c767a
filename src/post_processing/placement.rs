//! Moving or copying the finished video into the ready directory

use crate::config::{FileCollisionAction, PlacementConfig};
use crate::error::{Error, PostProcessError, Result};
use crate::types::TransferMode;
use crate::utils::{get_unique_path, is_cross_device, partial_path_for};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader, BufWriter};
use tracing::{debug, info, warn};

/// Read/write buffer for copies
const COPY_BUFFER_SIZE: usize = 1024 * 1024;

/// Places one file at its destination
#[derive(Clone, Debug)]
pub(crate) struct Placer {
    collision: FileCollisionAction,
    verify_checksum: bool,
}

impl Placer {
    pub(crate) fn new(config: &PlacementConfig) -> Self {
        Self {
            collision: config.file_collision,
            verify_checksum: config.verify_checksum,
        }
    }

    /// Transfer `source` to `dest`, returning the path actually written
    ///
    /// With `dry_run` set everything is checked and logged but neither the
    /// source nor the destination directory is touched.
    pub(crate) async fn place(
        &self,
        source: &Path,
        dest: &Path,
        mode: TransferMode,
        dry_run: bool,
    ) -> Result<PathBuf> {
        let dest_dir = dest.parent().ok_or_else(|| {
            Error::PostProcess(PostProcessError::InvalidPath {
                path: dest.to_path_buf(),
                reason: "destination has no parent directory".to_string(),
            })
        })?;
        if !fs::metadata(dest_dir).await.is_ok_and(|m| m.is_dir()) {
            return Err(PostProcessError::DestinationMissing {
                path: dest_dir.to_path_buf(),
            }
            .into());
        }

        let target = get_unique_path(dest, self.collision)?;
        if target != dest {
            info!(?dest, renamed = ?target, "destination exists, using a new name");
        }

        if dry_run {
            info!(?source, ?target, ?mode, "test mode, skipping transfer");
            return Ok(target);
        }

        match mode {
            TransferMode::Move => self.move_file(source, &target).await?,
            TransferMode::Copy => {
                info!(?source, ?target, "copying video");
                self.copy_verified(source, &target).await?;
            }
        }

        Ok(target)
    }

    async fn move_file(&self, source: &Path, target: &Path) -> Result<()> {
        info!(?source, ?target, "moving video");
        match fs::rename(source, target).await {
            Ok(()) => Ok(()),
            Err(e) if is_cross_device(&e) => {
                debug!(?source, ?target, "cross-device move, falling back to copy");
                self.copy_verified(source, target).await?;
                fs::remove_file(source).await.map_err(|e| {
                    Error::PostProcess(PostProcessError::MoveFailed {
                        source_path: source.to_path_buf(),
                        dest_path: target.to_path_buf(),
                        reason: format!("copied, but failed to remove source: {}", e),
                    })
                })
            }
            Err(e) => Err(PostProcessError::MoveFailed {
                source_path: source.to_path_buf(),
                dest_path: target.to_path_buf(),
                reason: e.to_string(),
            }
            .into()),
        }
    }

    /// Copy through a hidden partial file, verify it, then rename into place
    ///
    /// The partial file is removed on every failure path.
    async fn copy_verified(&self, source: &Path, target: &Path) -> Result<()> {
        let partial = partial_path_for(target)?;

        let result = self.copy_to_partial(source, &partial, target).await;
        let result = match result {
            Ok(()) => fs::rename(&partial, target).await.map_err(|e| {
                Error::PostProcess(PostProcessError::CopyFailed {
                    source_path: source.to_path_buf(),
                    dest_path: target.to_path_buf(),
                    reason: format!("failed to rename partial file into place: {}", e),
                })
            }),
            Err(e) => Err(e),
        };

        if result.is_err()
            && let Err(e) = fs::remove_file(&partial).await
            && e.kind() != std::io::ErrorKind::NotFound
        {
            warn!(?partial, error = %e, "failed to remove partial file");
        }
        result
    }

    async fn copy_to_partial(&self, source: &Path, partial: &Path, target: &Path) -> Result<()> {
        let copy_failed = |e: std::io::Error| {
            Error::PostProcess(PostProcessError::CopyFailed {
                source_path: source.to_path_buf(),
                dest_path: target.to_path_buf(),
                reason: e.to_string(),
            })
        };

        let source_len = fs::metadata(source).await.map_err(copy_failed)?.len();
        let (written, source_checksum) = copy_file(source, partial, self.verify_checksum)
            .await
            .map_err(copy_failed)?;

        let partial_len = fs::metadata(partial).await.map_err(copy_failed)?.len();
        if written != source_len || partial_len != source_len {
            return Err(PostProcessError::VerificationFailed {
                source_path: source.to_path_buf(),
                reason: format!(
                    "size mismatch: source {} bytes, copied {} bytes, on disk {} bytes",
                    source_len, written, partial_len
                ),
            }
            .into());
        }

        if let Some(expected) = source_checksum {
            let actual = sha256_file(partial).await.map_err(copy_failed)?;
            if actual != expected {
                return Err(PostProcessError::VerificationFailed {
                    source_path: source.to_path_buf(),
                    reason: format!("checksum mismatch: expected {}, got {}", expected, actual),
                }
                .into());
            }
            debug!(?partial, checksum = %actual, "checksum verified");
        }

        Ok(())
    }
}

/// Stream `source` into a new `dest`, optionally hashing what was read
async fn copy_file(
    source: &Path,
    dest: &Path,
    calculate_checksum: bool,
) -> std::io::Result<(u64, Option<String>)> {
    let source_file = File::open(source).await?;
    let dest_file = File::create(dest).await?;

    let mut reader = BufReader::with_capacity(COPY_BUFFER_SIZE, source_file);
    let mut writer = BufWriter::with_capacity(COPY_BUFFER_SIZE, dest_file);
    let mut hasher = calculate_checksum.then(Sha256::new);

    let mut total_bytes = 0u64;
    let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
    loop {
        let bytes_read = reader.read(&mut buffer).await?;
        if bytes_read == 0 {
            break;
        }
        if let Some(h) = hasher.as_mut() {
            h.update(&buffer[..bytes_read]);
        }
        writer.write_all(&buffer[..bytes_read]).await?;
        total_bytes += bytes_read as u64;
    }

    writer.flush().await?;
    writer.get_ref().sync_all().await?;

    Ok((total_bytes, hasher.map(|h| format!("{:x}", h.finalize()))))
}

async fn sha256_file(path: &Path) -> std::io::Result<String> {
    let mut reader = BufReader::with_capacity(COPY_BUFFER_SIZE, File::open(path).await?);
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
    loop {
        let bytes_read = reader.read(&mut buffer).await?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}
