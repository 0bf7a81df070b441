use anyhow::{Context, Result};
use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::chinese_convert::Dict;
use crate::errors::ConversionError;

/// Application configuration module
/// This module holds the conversion options understood by the facade and the
/// CLI configuration file that wraps them.
/// Represents the CLI configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Conversion options applied to every input
    #[serde(default)]
    pub options: ConversionOptions,

    /// Which bundled variant dictionary to load, if any
    #[serde(default)]
    pub chinese_conversion: ChineseConversion,

    /// Directory holding `t2s.txt` / `s2t.txt`
    #[serde(default = "default_dict_dir")]
    pub dict_dir: PathBuf,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            options: ConversionOptions::default(),
            chinese_conversion: ChineseConversion::default(),
            dict_dir: default_dict_dir(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Load a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        let config = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Save the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.options
            .validate()
            .map(|_| ())
            .context("Invalid conversion options")
    }

    /// Path of the dictionary selected by `chinese_conversion`
    pub fn dict_path(&self) -> Option<PathBuf> {
        self.chinese_conversion
            .dict_name()
            .map(|name| self.dict_dir.join(name))
    }
}

/// Log level for the application
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<&LogLevel> for log::LevelFilter {
    fn from(level: &LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Chinese script variant conversion
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChineseConversion {
    #[default]
    Keep,
    ToSimplified,
    ToTraditional,
}

impl ChineseConversion {
    // @returns: Dictionary file name, none when text is kept as is
    pub fn dict_name(&self) -> Option<&'static str> {
        match self {
            Self::Keep => None,
            Self::ToSimplified => Some("t2s.txt"),
            Self::ToTraditional => Some("s2t.txt"),
        }
    }
}

/// Which lines of a multi-line cue survive
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LineStrip {
    #[default]
    All,
    First,
    Last,
    /// Keep at most this many leading lines
    Max(usize),
}

impl LineStrip {
    /// Apply the policy to the lines of one cue
    pub fn strip(&self, mut lines: Vec<String>) -> Vec<String> {
        match *self {
            Self::All => lines,
            Self::First => {
                lines.truncate(1);
                lines
            }
            Self::Last => lines.pop().into_iter().collect(),
            Self::Max(n) => {
                lines.truncate(n);
                lines
            }
        }
    }
}

/// Options for one conversion request
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ConversionOptions {
    /// Source charset label; sniffed from the BOM when absent
    pub in_charset: Option<String>,

    /// Output charset label; UTF-8 when absent
    pub out_charset: Option<String>,

    /// Charset used when there is neither a hint nor a BOM
    pub default_charset: String,

    /// Line retention policy
    pub lines: LineStrip,

    /// Replace undecodable bytes instead of failing
    pub ignore_codec_err: bool,

    /// Seconds added to every timestamp
    pub offset_secs: f64,

    /// Drop dialogue events carrying an `Effect`
    pub skip_effects: bool,

    /// Return individual documents instead of one archive
    pub no_zip: bool,

    /// Loaded variant-conversion dictionary
    #[serde(skip)]
    pub conv_dict: Option<Arc<Dict>>,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            in_charset: None,
            out_charset: None,
            default_charset: default_charset(),
            lines: LineStrip::default(),
            ignore_codec_err: false,
            offset_secs: 0.0,
            skip_effects: true,
            no_zip: false,
            conv_dict: None,
        }
    }
}

/// Options with charsets resolved and values checked
#[derive(Debug, Clone)]
pub struct ResolvedOptions {
    pub in_charset: Option<&'static Encoding>,
    pub default_charset: &'static Encoding,
    pub out_charset: &'static Encoding,
    pub lines: LineStrip,
    pub ignore_codec_err: bool,
    pub offset_ms: i64,
    pub skip_effects: bool,
    pub no_zip: bool,
    pub conv_dict: Option<Arc<Dict>>,
}

impl ConversionOptions {
    /// Resolve charset labels and reject unsupported values
    pub fn validate(&self) -> std::result::Result<ResolvedOptions, ConversionError> {
        let in_charset = self
            .in_charset
            .as_deref()
            .map(|label| resolve_charset("input", label))
            .transpose()?;
        let default_charset = resolve_charset("default", &self.default_charset)?;
        let out_charset = match self.out_charset.as_deref() {
            Some(label) => resolve_charset("output", label)?,
            None => encoding_rs::UTF_8,
        };

        if let LineStrip::Max(0) = self.lines {
            return Err(ConversionError::Config(
                "`lines` must keep at least one line".to_string(),
            ));
        }
        if !self.offset_secs.is_finite() {
            return Err(ConversionError::Config(format!(
                "`offset_secs` must be a finite number, got {}",
                self.offset_secs
            )));
        }

        Ok(ResolvedOptions {
            in_charset,
            default_charset,
            out_charset,
            lines: self.lines,
            ignore_codec_err: self.ignore_codec_err,
            offset_ms: (self.offset_secs * 1000.0).round() as i64,
            skip_effects: self.skip_effects,
            no_zip: self.no_zip,
            conv_dict: self.conv_dict.clone(),
        })
    }
}

// The "replacement" encoding decodes everything to U+FFFD and cannot encode
fn resolve_charset(role: &str, label: &str) -> std::result::Result<&'static Encoding, ConversionError> {
    Encoding::for_label(label.trim().as_bytes())
        .filter(|encoding| *encoding != encoding_rs::REPLACEMENT)
        .ok_or_else(|| ConversionError::Config(format!("unknown {} charset `{}`", role, label)))
}

fn default_charset() -> String {
    "utf-8".to_string()
}

fn default_dict_dir() -> PathBuf {
    PathBuf::from("dict")
}
