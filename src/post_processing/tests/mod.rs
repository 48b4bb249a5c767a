use super::*;
use crate::extraction::{ExtractOutcome, LibraryArchiveHandler};
use crate::types::TransferMode;
use crate::Error;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

/// Archive handler that "extracts" a scripted set of members
struct FakeArchiveHandler {
    members: Vec<(&'static str, usize)>,
    fail: bool,
    list_calls: AtomicUsize,
}

impl FakeArchiveHandler {
    fn with_members(members: Vec<(&'static str, usize)>) -> Self {
        Self {
            members,
            fail: false,
            list_calls: AtomicUsize::new(0),
        }
    }

    fn failing() -> Self {
        Self {
            members: Vec::new(),
            fail: true,
            list_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ArchiveHandler for FakeArchiveHandler {
    async fn extract(
        &self,
        archive: &Path,
        dest: &Path,
        min_file_size: u64,
    ) -> Result<ExtractOutcome> {
        if self.fail {
            return Err(PostProcessError::ExtractionFailed {
                archive: archive.to_path_buf(),
                reason: "scripted failure".to_string(),
            }
            .into());
        }

        let mut outcome = ExtractOutcome::default();
        for (name, size) in &self.members {
            if (*size as u64) < min_file_size {
                outcome.skipped_small += 1;
                continue;
            }
            let path = dest.join(name);
            tokio::fs::create_dir_all(path.parent().unwrap()).await?;
            tokio::fs::write(&path, vec![0u8; *size]).await?;
            outcome.extracted.push(path);
        }
        Ok(outcome)
    }

    async fn list(&self, _archive: &Path) -> Result<Vec<String>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .members
            .iter()
            .map(|(name, size)| format!("{:>14}  {}", size, name))
            .collect())
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// Directory layout for one pipeline run
struct Layout {
    _temp: TempDir,
    ready: PathBuf,
    temp_root: PathBuf,
    input: PathBuf,
}

impl Layout {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let ready = temp.path().join("ready");
        let temp_root = temp.path().join("tmp");
        let input = temp.path().join("downloads/Show[-]Show.S01E02[-]grp");
        std::fs::create_dir_all(&ready).unwrap();
        std::fs::create_dir_all(&input).unwrap();
        Self {
            _temp: temp,
            ready,
            temp_root,
            input,
        }
    }

    fn job(&self, source: ResolvedInput) -> Job {
        Job {
            input: self.input.clone(),
            source,
            output_name: "Show.S01E02".to_string(),
            ready_dir: self.ready.clone(),
            temp_root: self.temp_root.clone(),
            min_file_size: 1000,
            video_extensions: vec!["mp4".into(), "avi".into(), "mkv".into()],
            transfer: TransferMode::Move,
            dry_run: false,
        }
    }

    fn archive(&self) -> PathBuf {
        let archive = self.input.join("show.part01.rar");
        std::fs::write(&archive, b"rar").unwrap();
        archive
    }

    fn ready_entries(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.ready)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Workspaces left behind under the temp root
    fn leftover_workspaces(&self) -> usize {
        match std::fs::read_dir(&self.temp_root) {
            Ok(entries) => entries.count(),
            Err(_) => 0,
        }
    }
}

fn processor(handler: Arc<dyn ArchiveHandler>) -> PostProcessor {
    PostProcessor::new(handler, Arc::new(Config::default()))
}

#[tokio::test]
async fn test_archive_places_video_and_removes_workspace() {
    let layout = Layout::new();
    let archive = layout.archive();
    let handler = Arc::new(FakeArchiveHandler::with_members(vec![
        ("Show/show.mkv", 5000),
        ("Show/Sample/sample.mkv", 10),
        ("Show/show.nfo", 20),
    ]));

    let placed = processor(handler.clone())
        .run(&layout.job(ResolvedInput::Archive(archive.clone())))
        .await
        .unwrap();

    assert_eq!(placed, layout.ready.join("Show.S01E02.mkv"));
    assert_eq!(std::fs::metadata(&placed).unwrap().len(), 5000);
    assert_eq!(layout.leftover_workspaces(), 0);
    assert_eq!(handler.list_calls.load(Ordering::SeqCst), 0);
    // The archive itself is never moved
    assert!(archive.exists());
}

#[tokio::test]
async fn test_archive_picks_first_video_in_path_order() {
    let layout = Layout::new();
    let archive = layout.archive();
    let handler = Arc::new(FakeArchiveHandler::with_members(vec![
        ("b/episode.mp4", 2000),
        ("a/episode.avi", 3000),
    ]));

    let placed = processor(handler)
        .run(&layout.job(ResolvedInput::Archive(archive)))
        .await
        .unwrap();

    assert_eq!(placed, layout.ready.join("Show.S01E02.avi"));
    assert_eq!(layout.ready_entries(), vec!["Show.S01E02.avi".to_string()]);
}

#[tokio::test]
async fn test_archive_with_only_small_media_fails() {
    let layout = Layout::new();
    let archive = layout.archive();
    let handler = Arc::new(FakeArchiveHandler::with_members(vec![(
        "Sample/sample.mkv",
        10,
    )]));

    let err = processor(handler.clone())
        .run(&layout.job(ResolvedInput::Archive(archive)))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::PostProcess(PostProcessError::NoVideoExtracted { .. })
    ));
    assert!(layout.ready_entries().is_empty());
    assert_eq!(layout.leftover_workspaces(), 0);
    assert_eq!(handler.list_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_extraction_failure_dumps_listing_and_cleans_up() {
    let layout = Layout::new();
    let archive = layout.archive();
    let handler = Arc::new(FakeArchiveHandler::failing());

    let err = processor(handler.clone())
        .run(&layout.job(ResolvedInput::Archive(archive)))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::PostProcess(PostProcessError::ExtractionFailed { .. })
    ));
    assert_eq!(err.stage(), Stage::Extracted);
    assert_eq!(handler.list_calls.load(Ordering::SeqCst), 1);
    assert_eq!(layout.leftover_workspaces(), 0);
}

#[tokio::test]
async fn test_placement_failure_still_cleans_up() {
    let layout = Layout::new();
    let archive = layout.archive();
    let handler = Arc::new(FakeArchiveHandler::with_members(vec![("show.mkv", 5000)]));

    let mut job = layout.job(ResolvedInput::Archive(archive));
    job.ready_dir = layout.ready.join("gone");

    let err = processor(handler).run(&job).await.unwrap_err();
    assert!(matches!(
        err,
        Error::PostProcess(PostProcessError::DestinationMissing { .. })
    ));
    assert_eq!(layout.leftover_workspaces(), 0);
}

#[tokio::test]
async fn test_direct_video_is_moved_without_extraction() {
    let layout = Layout::new();
    let video = layout.input.join("show.mp4");
    std::fs::write(&video, b"video").unwrap();
    let handler = Arc::new(FakeArchiveHandler::failing());

    let placed = processor(handler.clone())
        .run(&layout.job(ResolvedInput::Video(video.clone())))
        .await
        .unwrap();

    assert_eq!(placed, layout.ready.join("Show.S01E02.mp4"));
    assert!(placed.exists());
    assert!(!video.exists());
    assert_eq!(handler.list_calls.load(Ordering::SeqCst), 0);
    // No workspace is ever created for a direct video
    assert!(!layout.temp_root.exists());
}

#[tokio::test]
async fn test_direct_video_copy_keeps_source() {
    let layout = Layout::new();
    let video = layout.input.join("show.mkv");
    std::fs::write(&video, b"seeding").unwrap();

    let mut job = layout.job(ResolvedInput::Video(video.clone()));
    job.transfer = TransferMode::Copy;

    let placed = processor(Arc::new(LibraryArchiveHandler))
        .run(&job)
        .await
        .unwrap();

    assert_eq!(std::fs::read(&placed).unwrap(), b"seeding");
    assert!(video.exists());
}

#[tokio::test]
async fn test_dry_run_leaves_ready_dir_unchanged() {
    let layout = Layout::new();
    let archive = layout.archive();
    let handler = Arc::new(FakeArchiveHandler::with_members(vec![("show.mkv", 5000)]));

    let mut job = layout.job(ResolvedInput::Archive(archive.clone()));
    job.dry_run = true;

    let placed = processor(handler).run(&job).await.unwrap();
    assert_eq!(placed, layout.ready.join("Show.S01E02.mkv"));
    assert!(layout.ready_entries().is_empty());
    assert!(archive.exists());
    assert_eq!(layout.leftover_workspaces(), 0);
}

#[tokio::test]
async fn test_zip_archive_end_to_end() {
    let layout = Layout::new();
    let archive = layout.input.join("show.zip");
    {
        let file = std::fs::File::create(&archive).unwrap();
        let mut writer = ::zip::ZipWriter::new(file);
        let options = ::zip::write::FileOptions::default()
            .compression_method(::zip::CompressionMethod::Stored);
        writer.start_file("Show/show.mkv", options).unwrap();
        std::io::Write::write_all(&mut writer, &[9u8; 4096]).unwrap();
        writer.start_file("Show/sample.mkv", options).unwrap();
        std::io::Write::write_all(&mut writer, &[1u8; 16]).unwrap();
        writer.finish().unwrap();
    }

    let placed = processor(Arc::new(LibraryArchiveHandler))
        .run(&layout.job(ResolvedInput::Archive(archive)))
        .await
        .unwrap();

    assert_eq!(std::fs::read(&placed).unwrap(), vec![9u8; 4096]);
    assert_eq!(layout.ready_entries(), vec!["Show.S01E02.mkv".to_string()]);
    assert_eq!(layout.leftover_workspaces(), 0);
}
