use crate::config::ToolsConfig;
use crate::error::{Error, PostProcessError};
use crate::extraction::*;
use crate::types::ArchiveType;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Create a stored ZIP archive containing the given members
fn create_zip_archive(archive_path: &Path, files: &[(&str, &[u8])]) {
    let file = std::fs::File::create(archive_path).unwrap();
    let mut writer = ::zip::ZipWriter::new(file);
    let options =
        ::zip::write::FileOptions::default().compression_method(::zip::CompressionMethod::Stored);
    for (name, content) in files {
        writer.start_file(*name, options).unwrap();
        std::io::Write::write_all(&mut writer, content).unwrap();
    }
    writer.finish().unwrap();
}

// ---------------------------------------------------------------------------
// Type detection and path safety
// ---------------------------------------------------------------------------

#[test]
fn test_detect_archive_type() {
    assert_eq!(
        detect_archive_type(Path::new("show.part01.rar")),
        Some(ArchiveType::Rar)
    );
    assert_eq!(detect_archive_type(Path::new("SHOW.RAR")), Some(ArchiveType::Rar));
    assert_eq!(detect_archive_type(Path::new("show.r00")), Some(ArchiveType::Rar));
    assert_eq!(detect_archive_type(Path::new("show.zip")), Some(ArchiveType::Zip));
    assert_eq!(detect_archive_type(Path::new("show.7z")), None);
    assert_eq!(detect_archive_type(Path::new("show")), None);
}

#[test]
fn test_sanitize_member_path_strips_traversal() {
    assert_eq!(
        sanitize_member_path(Path::new("../../etc/passwd")),
        PathBuf::from("etc/passwd")
    );
    assert_eq!(
        sanitize_member_path(Path::new("/abs/show.mkv")),
        PathBuf::from("abs/show.mkv")
    );
    assert_eq!(
        sanitize_member_path(Path::new("Show/./show.mkv")),
        PathBuf::from("Show/show.mkv")
    );
    assert!(sanitize_member_path(Path::new("..")).as_os_str().is_empty());
}

// ---------------------------------------------------------------------------
// ZIP extraction
// ---------------------------------------------------------------------------

#[test]
fn test_zip_extract_applies_size_filter() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("show.zip");
    let big = vec![7u8; 4096];
    create_zip_archive(
        &archive,
        &[
            ("Show/show.mkv", big.as_slice()),
            ("Show/Sample/show-sample.mkv", b"tiny".as_slice()),
            ("Show/show.nfo", b"info".as_slice()),
        ],
    );

    let dest = temp.path().join("work");
    let outcome = ZipExtractor::extract(&archive, &dest, 1024).unwrap();

    assert_eq!(outcome.extracted, vec![dest.join("Show/show.mkv")]);
    assert_eq!(outcome.skipped_small, 2);
    assert_eq!(std::fs::read(dest.join("Show/show.mkv")).unwrap(), big);
    assert!(!dest.join("Show/Sample/show-sample.mkv").exists());
}

#[test]
fn test_zip_extract_keeps_member_at_exact_threshold() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("edge.zip");
    create_zip_archive(&archive, &[("edge.mkv", [1u8; 100].as_slice())]);

    let dest = temp.path().join("work");
    let outcome = ZipExtractor::extract(&archive, &dest, 100).unwrap();
    assert_eq!(outcome.extracted.len(), 1);
}

#[test]
fn test_zip_extract_skips_unsafe_member() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("evil.zip");
    create_zip_archive(
        &archive,
        &[
            ("../escaped.mkv", [1u8; 64].as_slice()),
            ("inside.mkv", [1u8; 64].as_slice()),
        ],
    );

    let dest = temp.path().join("work");
    let outcome = ZipExtractor::extract(&archive, &dest, 1).unwrap();

    assert_eq!(outcome.extracted, vec![dest.join("inside.mkv")]);
    assert!(!temp.path().join("escaped.mkv").exists());
}

#[test]
fn test_zip_extract_corrupt_archive_fails() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("corrupt.zip");
    std::fs::write(&archive, b"this is not a zip archive").unwrap();

    let err = ZipExtractor::extract(&archive, &temp.path().join("work"), 1).unwrap_err();
    assert!(matches!(
        err,
        Error::PostProcess(PostProcessError::ExtractionFailed { .. })
    ));
}

#[test]
fn test_zip_list_reports_every_member() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("show.zip");
    create_zip_archive(
        &archive,
        &[("a.mkv", b"12345".as_slice()), ("b.nfo", b"1".as_slice())],
    );

    let lines = ZipExtractor::list(&archive).unwrap();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("a.mkv"));
    assert!(lines[0].trim_start().starts_with('5'));
    assert!(lines[1].ends_with("b.nfo"));
}

// ---------------------------------------------------------------------------
// RAR extraction
// ---------------------------------------------------------------------------

#[test]
fn test_rar_extract_corrupt_archive_fails() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("corrupt.part01.rar");
    std::fs::write(&archive, b"Rar! but not really").unwrap();

    let err = RarExtractor::extract(&archive, &temp.path().join("work"), 1).unwrap_err();
    assert!(matches!(
        err,
        Error::PostProcess(PostProcessError::ExtractionFailed { .. })
    ));
}

#[test]
fn test_rar_list_missing_archive_fails() {
    let err = RarExtractor::list(Path::new("/nonexistent/show.rar")).unwrap_err();
    assert!(matches!(
        err,
        Error::PostProcess(PostProcessError::ExtractionFailed { .. })
    ));
}

// ---------------------------------------------------------------------------
// Library handler dispatch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_library_handler_extracts_zip() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("show.zip");
    create_zip_archive(&archive, &[("show.mp4", [3u8; 2048].as_slice())]);

    let dest = temp.path().join("work");
    let outcome = LibraryArchiveHandler
        .extract(&archive, &dest, 1000)
        .await
        .unwrap();
    assert_eq!(outcome.extracted, vec![dest.join("show.mp4")]);
}

#[tokio::test]
async fn test_library_handler_rejects_unknown_type() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("show.7z");
    std::fs::write(&archive, b"7z").unwrap();

    let err = LibraryArchiveHandler
        .extract(&archive, temp.path(), 1)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::PostProcess(PostProcessError::UnsupportedArchive { .. })
    ));

    let err = LibraryArchiveHandler.list(&archive).await.unwrap_err();
    assert!(matches!(
        err,
        Error::PostProcess(PostProcessError::UnsupportedArchive { .. })
    ));
}

#[tokio::test]
async fn test_library_handler_lists_zip() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("show.zip");
    create_zip_archive(&archive, &[("show.mp4", b"abc".as_slice())]);

    let lines = LibraryArchiveHandler.list(&archive).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("show.mp4"));
}

// ---------------------------------------------------------------------------
// Handler selection
// ---------------------------------------------------------------------------

#[test]
fn test_create_handler_defaults_to_library() {
    let handler = create_handler(&ToolsConfig::default()).unwrap();
    assert_eq!(handler.name(), "library");
}

#[test]
fn test_create_handler_uses_explicit_binary() {
    let temp = TempDir::new().unwrap();
    let fake_unrar = temp.path().join("unrar");
    std::fs::write(&fake_unrar, b"#!/bin/sh\n").unwrap();

    let tools = ToolsConfig {
        use_unrar_cli: true,
        unrar_path: Some(fake_unrar),
        search_path: false,
    };
    assert_eq!(create_handler(&tools).unwrap().name(), "cli-unrar");
}

#[test]
fn test_create_handler_missing_binary_is_config_error() {
    let tools = ToolsConfig {
        use_unrar_cli: true,
        unrar_path: Some(PathBuf::from("/nonexistent/unrar")),
        search_path: true,
    };
    assert!(matches!(create_handler(&tools), Err(Error::Config { .. })));

    let tools = ToolsConfig {
        use_unrar_cli: true,
        unrar_path: None,
        search_path: false,
    };
    assert!(matches!(create_handler(&tools), Err(Error::Config { .. })));
}
