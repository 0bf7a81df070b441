use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

use crate::errors::ParseError;

// @module: ASS/SSA script parsing into timed cues

// @const: Override blocks; a `\pN` drawing block swallows everything up to `\p0`
static OVERRIDE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{[^\}]*\\p[1-9][^\}]*\}.*?(\{[^\}]*\\p0[^\}]*\}|$)|\{.*?\}").unwrap()
});

// @const: Hard and soft line breaks
static LINE_BREAK_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\[Nn]").unwrap());

/// Columns of an `[Events]` line the parser cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Start,
    End,
    Text,
    Effect,
}

impl Field {
    fn key(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
            Self::Text => "text",
            Self::Effect => "effect",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Why a single dialogue line was skipped
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LineIssue {
    #[error("field `{0}` not found in dialogue")]
    NoField(Field),

    #[error("failed to parse time `{0}`")]
    Time(String),

    #[error("end time precedes start time")]
    NegativeDuration,
}

/// Recoverable per-line parse anomaly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDiagnostic {
    /// 1-based line number in the decoded document
    pub line: usize,
    pub issue: LineIssue,
}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.issue)
    }
}

// @struct: Single timed subtitle entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    // @field: Position in output, 1-based
    pub index: usize,

    // @field: Start time in ms
    pub start_ms: u64,

    // @field: End time in ms
    pub end_ms: u64,

    // @field: Text lines with markup stripped
    pub lines: Vec<String>,
}

impl Cue {
    /// Creates a new cue
    pub fn new(index: usize, start_ms: u64, end_ms: u64, lines: Vec<String>) -> Self {
        Cue {
            index,
            start_ms,
            end_ms,
            lines,
        }
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }

    /// Parse an ASS timestamp (`H:MM:SS.cc`) to milliseconds
    ///
    /// The fractional part is read as a decimal fraction of a second, so both
    /// centiseconds and milliseconds are accepted.
    pub fn parse_timestamp(timestamp: &str) -> Result<u64, LineIssue> {
        let invalid = || LineIssue::Time(timestamp.to_string());
        let (hms, fraction) = timestamp.trim().split_once('.').ok_or_else(invalid)?;

        let parts: Vec<u64> = hms
            .split(':')
            .map(|part| part.parse::<u64>())
            .collect::<Result<_, _>>()
            .map_err(|_| invalid())?;
        let &[hours, minutes, seconds] = parts.as_slice() else {
            return Err(invalid());
        };
        if minutes >= 60 || seconds >= 60 {
            return Err(invalid());
        }

        if fraction.is_empty() || fraction.len() > 3 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let millis: u64 = format!("{:0<3}", fraction).parse().map_err(|_| invalid())?;

        hours
            .checked_mul(3_600_000)
            .and_then(|ms| ms.checked_add(minutes * 60_000 + seconds * 1_000 + millis))
            .ok_or_else(invalid)
    }

    /// Text lines joined for display
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}\r\n", self.index)?;
        write!(
            f,
            "{} --> {}\r\n",
            Self::format_timestamp(self.start_ms),
            Self::format_timestamp(self.end_ms)
        )?;
        for line in &self.lines {
            write!(f, "{}\r\n", line)?;
        }
        write!(f, "\r\n")
    }
}

/// Cues extracted from one document plus the skipped-line diagnostics
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub cues: Vec<Cue>,
    pub diagnostics: Vec<ParseDiagnostic>,
}

/// Column layout taken from the `Format:` line of `[Events]`
struct EventFormat {
    cols: HashMap<String, usize>,
    count: usize,
}

impl EventFormat {
    fn new(line: &str) -> Result<Self, ParseError> {
        let names: Vec<String> = line.split(',').map(|c| c.trim().to_lowercase()).collect();
        let count = names.len();
        let mut cols = HashMap::with_capacity(count);
        for (i, name) in names.into_iter().enumerate() {
            cols.entry(name).or_insert(i);
        }
        for field in [Field::Start, Field::End, Field::Text] {
            if !cols.contains_key(field.key()) {
                return Err(ParseError::NoFormatLineField(field));
            }
        }
        Ok(Self { cols, count })
    }

    /// Split a dialogue body; the last column keeps any embedded commas
    fn parse<'a>(&self, body: &'a str) -> Result<Dialogue<'a>, LineIssue> {
        let cols: Vec<&str> = body.splitn(self.count, ',').collect();
        let optional = |field: Field| self.cols.get(field.key()).and_then(|i| cols.get(*i).copied());
        let required = |field: Field| optional(field).ok_or(LineIssue::NoField(field));

        let start_ms = Cue::parse_timestamp(required(Field::Start)?)?;
        let end_ms = Cue::parse_timestamp(required(Field::End)?)?;
        if end_ms < start_ms {
            return Err(LineIssue::NegativeDuration);
        }
        let text = required(Field::Text)?.trim();
        let effect = optional(Field::Effect).is_some_and(|e| !e.trim().is_empty());

        Ok(Dialogue {
            start_ms,
            end_ms,
            text,
            effect,
        })
    }
}

struct Dialogue<'a> {
    start_ms: u64,
    end_ms: u64,
    text: &'a str,
    effect: bool,
}

/// Strip override codes and drawings, then split at `\N`/`\n`
///
/// Blank lines are dropped, so a cue never carries an empty text line.
pub fn cleanse_text(raw: &str) -> Vec<String> {
    let text = OVERRIDE_REGEX.replace_all(raw, "");
    let text = text.replace(r"\h", " ");
    LINE_BREAK_REGEX
        .split(&text)
        .map(str::trim_end)
        .filter(|line| !line.trim_start().is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a decoded ASS/SSA script into cues sorted by start time
///
/// Only `Dialogue:` lines inside `[Events]` become cues. Lines that fail to
/// parse are reported as diagnostics; the call only fails when the section is
/// missing or when no cue survives. With `skip_effects`, events that carry an
/// `Effect` are dropped, and events whose text is empty after markup
/// stripping are never cues.
pub fn parse(text: &str, skip_effects: bool) -> Result<ParsedDocument, ParseError> {
    let mut events = UniversalLines::new(text)
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .skip_while(|(_, line)| !line.eq_ignore_ascii_case("[events]"))
        .skip(1)
        .take_while(|(_, line)| !line.starts_with('['));

    let format = events
        .by_ref()
        .find_map(|(_, line)| strip_key(line, "Format"))
        .ok_or(ParseError::NoFormatLine)?;
    let format = EventFormat::new(format)?;

    let mut cues = Vec::new();
    let mut diagnostics = Vec::new();
    let mut effects = 0usize;
    for (line_no, line) in events {
        let Some(body) = strip_key(line, "Dialogue") else {
            continue;
        };
        let dialogue = match format.parse(body) {
            Ok(dialogue) => dialogue,
            Err(issue) => {
                warn!("Skipping dialogue at line {}: {}", line_no, issue);
                diagnostics.push(ParseDiagnostic { line: line_no, issue });
                continue;
            }
        };
        if skip_effects && dialogue.effect {
            effects += 1;
            continue;
        }
        let lines = cleanse_text(dialogue.text);
        if lines.is_empty() {
            continue;
        }
        cues.push(Cue::new(0, dialogue.start_ms, dialogue.end_ms, lines));
    }

    if cues.is_empty() {
        return Err(ParseError::NoCues);
    }

    // Stable: equal start times keep document order
    cues.sort_by_key(|cue| cue.start_ms);
    for (i, cue) in cues.iter_mut().enumerate() {
        cue.index = i + 1;
    }

    debug!(
        "Parsed {} cues ({} skipped lines, {} effect events dropped)",
        cues.len(),
        diagnostics.len(),
        effects
    );
    Ok(ParsedDocument { cues, diagnostics })
}

// `Key: rest` with the key matched case-sensitively, as ASS writers emit it
fn strip_key<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    line.strip_prefix(key)?.strip_prefix(':').map(str::trim_start)
}

/// `str::lines` that also splits at a lone `\r`
pub struct UniversalLines<'a> {
    text: &'a str,
}

impl<'a> UniversalLines<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }
}

impl<'a> Iterator for UniversalLines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.text.is_empty() {
            return None;
        }
        let end = self.text.find(['\r', '\n']).unwrap_or(self.text.len());
        let line = &self.text[..end];
        let rest = &self.text[end..];
        self.text = if rest.starts_with("\r\n") {
            &rest[2..]
        } else if rest.is_empty() {
            rest
        } else {
            &rest[1..]
        };
        Some(line)
    }
}
