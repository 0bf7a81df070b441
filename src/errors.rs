/*!
 * Error types for the asstosrt library and CLI.
 *
 * Conversion errors carry a stable [`ErrorKind`] so hosts can report them
 * without matching on messages. All of them are defined with thiserror.
 */

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::subtitle_processor::Field;

/// Fatal errors raised while parsing a subtitle document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// No `[Events]` section, or no `Format:` line inside it
    #[error("`[Events]` section or its `Format` line not found")]
    NoFormatLine,

    /// A required column is missing from the `Format:` line
    #[error("field `{0}` not found in `Format` line")]
    NoFormatLineField(Field),

    /// No cue survived parsing, stripping and the offset
    #[error("no cues found")]
    NoCues,
}

/// Errors raised while loading a variant-conversion dictionary
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DictError {
    /// Dictionary bytes are not UTF-8
    #[error("dictionary is not valid UTF-8")]
    NotUtf8,

    /// A line has no separator or an empty side
    #[error("malformed dictionary entry at line {line}")]
    Malformed {
        /// 1-based line number
        line: usize,
    },

    /// The dictionary has no entries at all
    #[error("dictionary contains no entries")]
    Empty,
}

/// Errors returned by the conversion facade
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    /// Input exceeds the byte ceiling; raised before any decoding
    #[error("input of {size} bytes exceeds the limit of {limit} bytes")]
    SizeLimit {
        /// Total input size
        size: usize,
        /// Configured ceiling
        limit: usize,
    },

    /// Bad charset name, malformed dictionary or unsupported option value
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Undecodable bytes while `ignore_codec_err` is off
    #[error("failed to decode input as {charset}: malformed byte sequence at offset {offset}")]
    Decode {
        /// Charset used for decoding
        charset: String,
        /// Byte offset of the first malformed sequence
        offset: usize,
    },

    /// Document structure unusable
    #[error("failed to parse subtitle: {0}")]
    Parse(#[from] ParseError),

    /// The in-memory archive writer failed
    #[error("failed to build archive: {0}")]
    Archive(String),
}

impl From<DictError> for ConversionError {
    fn from(error: DictError) -> Self {
        Self::Config(error.to_string())
    }
}

impl From<zip::result::ZipError> for ConversionError {
    fn from(error: zip::result::ZipError) -> Self {
        Self::Archive(error.to_string())
    }
}

/// Error kind reported across the host boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    SizeLimitError,
    ConfigError,
    DecodeError,
    ParseError,
    ArchiveError,
}

impl ConversionError {
    /// Kind of this error as seen by the host
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SizeLimit { .. } => ErrorKind::SizeLimitError,
            Self::Config(_) => ErrorKind::ConfigError,
            Self::Decode { .. } => ErrorKind::DecodeError,
            Self::Parse(_) => ErrorKind::ParseError,
            Self::Archive(_) => ErrorKind::ArchiveError,
        }
    }

    /// Convert into the serializable boundary payload
    pub fn to_payload(&self) -> ErrorPayload {
        ErrorPayload {
            error_kind: self.kind(),
            message: self.to_string(),
        }
    }
}

/// `{ errorKind, message }` object handed to the host on failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub error_kind: ErrorKind,
    pub message: String,
}

/// Main application error type used by the CLI
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the conversion pipeline
    #[error("Conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
