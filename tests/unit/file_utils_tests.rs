/*!
 * Tests for file utility functions
 */

use std::fs;
use std::path::PathBuf;
use anyhow::Result;
use asstosrt::archive;
use asstosrt::file_utils::{FileManager, InputKind};
use crate::common;

/// Test that input paths are classified by extension when they are not directories
#[test]
fn test_detectInputKind_withFiles_shouldClassifyByExtension() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let script = common::create_test_subtitle(temp_dir.path(), "movie.ASS")?;
    let zip = common::create_test_file(temp_dir.path(), "show.zip", b"PK")?;
    let notes = common::create_test_file(temp_dir.path(), "notes.txt", b"")?;

    assert_eq!(FileManager::detect_input_kind(&script), InputKind::Subtitle);
    assert_eq!(FileManager::detect_input_kind(&zip), InputKind::Zip);
    assert_eq!(FileManager::detect_input_kind(&notes), InputKind::Unsupported);
    assert_eq!(FileManager::detect_input_kind("missing.ssa"), InputKind::Subtitle);
    Ok(())
}

#[test]
fn test_detectInputKind_withDirectory_shouldReturnDirectory() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    assert_eq!(FileManager::detect_input_kind(temp_dir.path()), InputKind::Directory);
    Ok(())
}

#[test]
fn test_findSubtitles_withNestedDirs_shouldFindScriptsSorted() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_subtitle(temp_dir.path(), "b.ass")?;
    common::create_test_subtitle(temp_dir.path(), "a.ssa")?;
    common::create_test_subtitle(temp_dir.path(), "season1/ep01.ass")?;
    common::create_test_file(temp_dir.path(), "notes.txt", b"ignore me")?;

    let found = FileManager::find_subtitles(temp_dir.path())?;
    let relative: Vec<PathBuf> = found
        .iter()
        .map(|p| p.strip_prefix(temp_dir.path()).unwrap().to_path_buf())
        .collect();
    assert_eq!(
        relative,
        vec![
            PathBuf::from("a.ssa"),
            PathBuf::from("b.ass"),
            PathBuf::from("season1").join("ep01.ass"),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_collectInputs_withDirectory_shouldUseRelativeNames() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_subtitle(temp_dir.path(), "season1/ep01.ass")?;
    common::create_test_subtitle(temp_dir.path(), "ep00.ass")?;

    let inputs = FileManager::collect_inputs(&[temp_dir.path().to_path_buf()]).await?;
    let names: Vec<&str> = inputs.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["ep00.ass", "season1/ep01.ass"]);
    assert_eq!(inputs[0].bytes, common::SAMPLE_ASS.as_bytes());
    Ok(())
}

#[tokio::test]
async fn test_collectInputs_withSeveralZips_shouldPrefixZipStem() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let zip = archive::pack(&[
        ("ep01.ass", common::SAMPLE_ASS.as_bytes()),
        ("cover.jpg", b"\xFF\xD8".as_slice()),
    ])?;
    let zip_path = common::create_test_file(temp_dir.path(), "show.zip", &zip)?;
    let single = common::create_test_subtitle(temp_dir.path(), "movie.ass")?;

    let inputs = FileManager::collect_inputs(&[zip_path.clone(), single]).await?;
    let names: Vec<&str> = inputs.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["show/ep01.ass", "movie.ass"]);

    let alone = FileManager::collect_inputs(&[zip_path]).await?;
    assert_eq!(alone.len(), 1);
    assert_eq!(alone[0].name, "ep01.ass");
    Ok(())
}

#[tokio::test]
async fn test_collectInputs_withMissingPath_shouldFail() {
    let result = FileManager::collect_inputs(&[PathBuf::from("no/such/input.txt")]).await;
    assert!(result.is_err());
}

#[test]
fn test_writeOutput_withExistingTarget_shouldRespectForce() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;

    let written = FileManager::write_output(temp_dir.path(), "sub/a.srt", b"first", false)?;
    let path = written.expect("first write should happen");
    assert_eq!(fs::read(&path)?, b"first");

    assert!(FileManager::write_output(temp_dir.path(), "sub/a.srt", b"second", false)?.is_none());
    assert_eq!(fs::read(&path)?, b"first");

    assert!(FileManager::write_output(temp_dir.path(), "sub/a.srt", b"second", true)?.is_some());
    assert_eq!(fs::read(&path)?, b"second");
    Ok(())
}
