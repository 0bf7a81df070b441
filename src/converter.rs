/*!
 * Conversion facade.
 *
 * The two entry points hosts call: [`convert_one`] and [`convert_many`].
 * Both are synchronous, CPU-only and keep no state between calls; the only
 * shared data is the optional dictionary handle inside the options, which is
 * read but never mutated.
 *
 * Checks run in a fixed order before any decoding: input size first, then
 * option validation. In a batch, a decode or parse failure of one input
 * excludes that input and is reported next to the successful ones.
 */

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::app_config::{ConversionOptions, ResolvedOptions};
use crate::archive;
use crate::charset;
use crate::chinese_convert;
use crate::errors::{ConversionError, ErrorPayload, ParseError};
use crate::formatting;
use crate::subtitle_processor::{self, ParseDiagnostic};

/// Ceiling on the total input size of one request (100 MiB)
pub const INPUT_SIZE_LIMIT: usize = 100 * 1024 * 1024;

/// Mime type of a single converted document
pub const SRT_MIME_TYPE: &str = "text/srt";

/// One converted subtitle file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertedDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub mime_type: String,
    /// Number of cues written
    pub cues: usize,
    /// Dialogue lines skipped while parsing
    #[serde(skip)]
    pub diagnostics: Vec<ParseDiagnostic>,
}

/// Bytes handed back to the host for download
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputPayload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub filename: String,
}

impl From<ConvertedDocument> for OutputPayload {
    fn from(document: ConvertedDocument) -> Self {
        Self {
            bytes: document.bytes,
            mime_type: document.mime_type,
            filename: document.filename,
        }
    }
}

/// An input excluded from a batch
#[derive(Debug, Clone, PartialEq)]
pub struct FileFailure {
    pub filename: String,
    pub error: ConversionError,
}

impl FileFailure {
    /// Boundary payload naming the failed file
    pub fn to_payload(&self) -> ErrorPayload {
        let mut payload = self.error.to_payload();
        payload.message = format!("{}: {}", self.filename, payload.message);
        payload
    }
}

/// Outcome of a batch request
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult {
    /// Converted documents, in input order, with unique names
    pub documents: Vec<ConvertedDocument>,
    /// Single archive of `documents`; present when more than one input was
    /// requested and `no_zip` is off
    pub archive: Option<OutputPayload>,
    /// Inputs that failed, in input order
    pub failures: Vec<FileFailure>,
}

impl BatchResult {
    /// What the host offers for download: the archive, or each document
    pub fn into_payloads(self) -> Vec<OutputPayload> {
        match self.archive {
            Some(archive) => vec![archive],
            None => self.documents.into_iter().map(OutputPayload::from).collect(),
        }
    }
}

fn check_size(size: usize) -> Result<(), ConversionError> {
    if size > INPUT_SIZE_LIMIT {
        return Err(ConversionError::SizeLimit {
            size,
            limit: INPUT_SIZE_LIMIT,
        });
    }
    Ok(())
}

/// Convert one subtitle file
///
/// `filename` only names the output; its extension becomes `srt`.
pub fn convert_one(
    filename: &str,
    bytes: &[u8],
    options: &ConversionOptions,
) -> Result<ConvertedDocument, ConversionError> {
    check_size(bytes.len())?;
    let resolved = options.validate()?;
    convert_resolved(filename, bytes, &resolved)
}

/// Convert several files as one request
///
/// Fails as a whole only for size, configuration or archive errors, or when
/// every input failed (the first input's error is returned then).
pub fn convert_many<N, B>(
    inputs: &[(N, B)],
    options: &ConversionOptions,
) -> Result<BatchResult, ConversionError>
where
    N: AsRef<str>,
    B: AsRef<[u8]>,
{
    let total: usize = inputs.iter().map(|(_, bytes)| bytes.as_ref().len()).sum();
    check_size(total)?;
    let resolved = options.validate()?;

    let mut documents = Vec::new();
    let mut failures = Vec::new();
    for (name, bytes) in inputs {
        let name = name.as_ref();
        match convert_resolved(name, bytes.as_ref(), &resolved) {
            Ok(document) => documents.push(document),
            Err(error) => {
                warn!("Excluding {} from batch: {}", name, error);
                failures.push(FileFailure {
                    filename: name.to_string(),
                    error,
                });
            }
        }
    }

    if documents.is_empty() {
        if let Some(first) = failures.into_iter().next() {
            return Err(first.error);
        }
        // Empty request
        return Ok(BatchResult {
            documents,
            archive: None,
            failures: Vec::new(),
        });
    }

    let names = archive::unique_names(documents.iter().map(|d| d.filename.as_str()));
    for (document, name) in documents.iter_mut().zip(names) {
        document.filename = name;
    }

    let archive = if inputs.len() > 1 && !resolved.no_zip {
        let entries: Vec<(&str, &[u8])> = documents
            .iter()
            .map(|d| (d.filename.as_str(), d.bytes.as_slice()))
            .collect();
        Some(OutputPayload {
            bytes: archive::pack(&entries)?,
            mime_type: archive::ARCHIVE_MIME_TYPE.to_string(),
            filename: archive::ARCHIVE_FILENAME.to_string(),
        })
    } else {
        None
    };

    info!(
        "Converted {} of {} files{}",
        documents.len(),
        inputs.len(),
        if archive.is_some() { " into one archive" } else { "" }
    );
    Ok(BatchResult {
        documents,
        archive,
        failures,
    })
}

// decode -> parse -> variant conversion -> format -> encode
fn convert_resolved(
    filename: &str,
    bytes: &[u8],
    options: &ResolvedOptions,
) -> Result<ConvertedDocument, ConversionError> {
    let text = charset::decode(
        bytes,
        options.in_charset,
        options.default_charset,
        options.ignore_codec_err,
    )?;
    let parsed = subtitle_processor::parse(&text, options.skip_effects)?;
    drop(text);

    let dict = options.conv_dict.as_deref();
    let cues = parsed
        .cues
        .into_iter()
        .map(|mut cue| {
            cue.lines = chinese_convert::convert(cue.lines, dict);
            cue
        })
        .collect();

    let (srt, count) = formatting::format(cues, options.offset_ms, options.lines);
    if count == 0 {
        warn!("{}: no cue left after shifting and line stripping", filename);
        return Err(ParseError::NoCues.into());
    }
    let bytes = charset::encode(&srt, options.out_charset);
    debug!(
        "Converted {}: {} cues, {} bytes as {}",
        filename,
        count,
        bytes.len(),
        options.out_charset.name()
    );

    Ok(ConvertedDocument {
        filename: archive::output_name(filename),
        bytes,
        mime_type: SRT_MIME_TYPE.to_string(),
        cues: count,
        diagnostics: parsed.diagnostics,
    })
}
