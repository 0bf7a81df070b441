/*!
 * Zip archive packaging.
 *
 * Converted documents are bundled into one in-memory zip, in input order.
 * Zip inputs can also be expanded into their `.ass`/`.ssa` entries before
 * conversion.
 */

use std::collections::HashSet;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use log::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::errors::ConversionError;

/// Extension of converted documents
pub const OUTPUT_EXTENSION: &str = "srt";

/// Mime type of a packaged batch
pub const ARCHIVE_MIME_TYPE: &str = "application/zip";

/// File name of a packaged batch
pub const ARCHIVE_FILENAME: &str = "subtitles.zip";

/// Input extensions recognised as subtitle scripts
pub const SUBTITLE_EXTENSIONS: [&str; 2] = ["ass", "ssa"];

/// Replace the extension of `name` with `srt`, using `/` as separator
pub fn output_name(name: &str) -> String {
    let mut path = PathBuf::from(name.replace('\\', "/"));
    path.set_extension(OUTPUT_EXTENSION);
    let name = path.to_string_lossy().replace('\\', "/");
    if name.is_empty() || name == format!(".{}", OUTPUT_EXTENSION) {
        format!("subtitle.{}", OUTPUT_EXTENSION)
    } else {
        name
    }
}

/// Make names unique in order: later duplicates get `-2`, `-3`, ... before
/// the extension
pub fn unique_names<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut taken = HashSet::new();
    let mut unique = Vec::new();
    for name in names {
        let name = name.as_ref();
        let mut candidate = name.to_string();
        let mut n = 1;
        while !taken.insert(candidate.to_lowercase()) {
            n += 1;
            candidate = with_suffix(name, n);
        }
        unique.push(candidate);
    }
    unique
}

fn with_suffix(name: &str, n: usize) -> String {
    let path = Path::new(name);
    let stem = path.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    let file = match path.extension() {
        Some(ext) => format!("{}-{}.{}", stem, n, ext.to_string_lossy()),
        None => format!("{}-{}", stem, n),
    };
    match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => format!("{}/{}", parent.to_string_lossy(), file),
        None => file,
    }
}

/// Build a zip holding one entry per `(name, bytes)`, in order
///
/// Entry names must already be unique; see [`unique_names`].
pub fn pack<N, B>(documents: &[(N, B)]) -> Result<Vec<u8>, ConversionError>
where
    N: AsRef<str>,
    B: AsRef<[u8]>,
{
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, bytes) in documents {
        writer.start_file(name.as_ref(), options)?;
        writer
            .write_all(bytes.as_ref())
            .map_err(|e| ConversionError::Archive(e.to_string()))?;
    }

    let archive = writer.finish()?.into_inner();
    debug!("Packed {} entries into {} bytes", documents.len(), archive.len());
    Ok(archive)
}

/// Whether `path` has a subtitle script extension
pub fn is_subtitle_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SUBTITLE_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

/// Expand a zip into its subtitle entries
///
/// Entries with unsafe paths or other extensions are skipped. An entry larger
/// than `size_limit` fails the whole expansion.
pub fn extract_subtitles(
    bytes: Vec<u8>,
    size_limit: usize,
) -> Result<Vec<(PathBuf, Vec<u8>)>, ConversionError> {
    let mut zip = ZipArchive::new(Cursor::new(bytes))?;
    let mut entries = Vec::new();

    for i in 0..zip.len() {
        let mut file = zip.by_index(i)?;
        let Some(path) = file.enclosed_name() else {
            info!("Skipping zip entry with unsafe path: {}", file.name());
            continue;
        };
        if file.is_dir() || !is_subtitle_path(&path) {
            info!("Skipping zip entry {:?}", path);
            continue;
        }
        let declared = usize::try_from(file.size()).unwrap_or(usize::MAX);
        let buf = read_limited(&mut file, declared, size_limit)?;
        entries.push((path, buf));
    }

    Ok(entries)
}

// Reads at most `size_limit` bytes; the declared size is only a hint
fn read_limited<R: Read>(
    reader: R,
    declared: usize,
    size_limit: usize,
) -> Result<Vec<u8>, ConversionError> {
    if declared > size_limit {
        return Err(ConversionError::SizeLimit {
            size: declared,
            limit: size_limit,
        });
    }
    let mut buf = Vec::with_capacity(declared);
    reader
        .take((size_limit as u64).saturating_add(1))
        .read_to_end(&mut buf)
        .map_err(|e| ConversionError::Archive(e.to_string()))?;
    if buf.len() > size_limit {
        return Err(ConversionError::SizeLimit {
            size: buf.len(),
            limit: size_limit,
        });
    }
    Ok(buf)
}
