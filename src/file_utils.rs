use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

use crate::archive;
use crate::converter::INPUT_SIZE_LIMIT;

// @module: File and directory utilities for the CLI

/// One subtitle script read from disk or from inside a zip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    /// Name relative to the requested input, `/`-separated
    pub name: String,
    pub bytes: Vec<u8>,
}

/// What a command line input path points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// `.ass` / `.ssa` script
    Subtitle,
    /// Zip archive of scripts
    Zip,
    /// Directory searched recursively for scripts
    Directory,
    /// Anything else; skipped
    Unsupported,
}

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    /// Classify an input path by type and extension
    pub fn detect_input_kind<P: AsRef<Path>>(path: P) -> InputKind {
        let path = path.as_ref();
        if path.is_dir() {
            return InputKind::Directory;
        }
        if archive::is_subtitle_path(path) {
            return InputKind::Subtitle;
        }
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("zip") => InputKind::Zip,
            _ => InputKind::Unsupported,
        }
    }

    /// Find subtitle scripts below a directory, sorted by path
    pub fn find_subtitles<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();
        for entry in WalkDir::new(dir.as_ref()).follow_links(true).sort_by_file_name() {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();
            if path.is_file() && archive::is_subtitle_path(path) {
                result.push(path.to_path_buf());
            }
        }
        Ok(result)
    }

    /// Read every subtitle script named by `paths`
    ///
    /// Directories contribute their scripts under names relative to the
    /// directory. Zips contribute their script entries; when more than one
    /// path was given, those entries are placed under a directory named after
    /// the zip.
    pub async fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<InputFile>> {
        let mut inputs = Vec::new();
        let several = paths.len() > 1;

        for path in paths {
            match Self::detect_input_kind(path) {
                InputKind::Subtitle => {
                    let bytes = Self::read_bytes(path).await?;
                    inputs.push(InputFile {
                        name: display_name(path.file_name().map(Path::new).unwrap_or(path.as_path())),
                        bytes,
                    });
                }
                InputKind::Directory => {
                    let found = Self::find_subtitles(path)?;
                    debug!("Found {} subtitle files in {:?}", found.len(), path);
                    for file in found {
                        let relative = file.strip_prefix(path).unwrap_or(&file);
                        let name = display_name(relative);
                        let bytes = Self::read_bytes(&file).await?;
                        inputs.push(InputFile { name, bytes });
                    }
                }
                InputKind::Zip => {
                    let bytes = Self::read_bytes(path).await?;
                    let entries = archive::extract_subtitles(bytes, INPUT_SIZE_LIMIT)
                        .with_context(|| format!("Failed to read zip file: {:?}", path))?;
                    debug!("Found {} subtitle entries in {:?}", entries.len(), path);
                    let base = path.file_stem().map(PathBuf::from).unwrap_or_default();
                    for (entry, bytes) in entries {
                        let name = if several {
                            display_name(&base.join(entry))
                        } else {
                            display_name(&entry)
                        };
                        inputs.push(InputFile { name, bytes });
                    }
                }
                InputKind::Unsupported => {
                    if !path.exists() {
                        return Err(anyhow!("Input path does not exist: {:?}", path));
                    }
                    info!("Skipping unsupported file {:?}", path);
                }
            }
        }

        Ok(inputs)
    }

    /// Read a whole file
    pub async fn read_bytes<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
        let path = path.as_ref();
        tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read file: {:?}", path))
    }

    /// Write `bytes` to `output_dir/name` through a temporary file
    ///
    /// Returns `None` when the target exists and `force` is off.
    pub fn write_output<P: AsRef<Path>>(
        output_dir: P,
        name: &str,
        bytes: &[u8],
        force: bool,
    ) -> Result<Option<PathBuf>> {
        let target = output_dir.as_ref().join(name);
        if target.exists() && !force {
            warn!("Output file already exists: {:?}. Use -f to force overwrite.", target);
            return Ok(None);
        }

        let parent = target.parent().unwrap_or(Path::new("."));
        Self::ensure_dir(parent)?;

        let mut temp = NamedTempFile::new_in(parent)
            .with_context(|| format!("Failed to create temporary file in {:?}", parent))?;
        temp.write_all(bytes)
            .with_context(|| format!("Failed to write output for {:?}", target))?;
        temp.persist(&target)
            .with_context(|| format!("Failed to move output into place: {:?}", target))?;

        debug!("Wrote {} bytes to {:?}", bytes.len(), target);
        Ok(Some(target))
    }
}

// `/`-separated name, the form archive entries and output names use
fn display_name(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
