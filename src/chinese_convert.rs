/*!
 * Chinese script variant conversion.
 *
 * A [`Dict`] maps source phrases to target phrases and rewrites text by
 * longest-match-first substitution. [`DictCache`] keeps loaded dictionaries
 * for reuse across conversions; a changed source replaces the cached `Arc`
 * wholesale, so conversions still holding the old one are unaffected.
 */

use std::collections::HashMap;
use std::sync::Arc;
use parking_lot::RwLock;
use log::debug;
use sha2::{Digest, Sha256};

use crate::errors::DictError;

#[derive(Debug, Default)]
struct DictNode {
    value: Option<Box<str>>,
    tails: HashMap<char, DictNode>,
}

impl DictNode {
    fn insert(&mut self, key: &str, value: &str) {
        let node = key
            .chars()
            .fold(self, |node, c| node.tails.entry(c).or_default());
        node.value = Some(value.into());
    }

    /// Longest key that prefixes `query`, as (byte length, value)
    fn prefix_match(&self, query: &str) -> Option<(usize, &str)> {
        let mut node = self;
        let mut best = None;
        for (offset, c) in query.char_indices() {
            match node.tails.get(&c) {
                Some(next) => node = next,
                None => break,
            }
            if let Some(value) = &node.value {
                best = Some((offset + c.len_utf8(), &**value));
            }
        }
        best
    }
}

/// Phrase substitution table
#[derive(Debug, Default)]
pub struct Dict {
    root: DictNode,
    len: usize,
}

impl Dict {
    /// Load a dictionary from `source<TAB or space>target [alternatives...]`
    /// lines; blank lines and `#` comments are ignored
    pub fn load(raw: &str) -> Result<Self, DictError> {
        let mut dict = Dict::default();
        for (i, line) in raw.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let malformed = DictError::Malformed { line: i + 1 };
            let (key, rest) = line
                .split_once(|c: char| c == '\t' || c == ' ')
                .ok_or(malformed.clone())?;
            let value = rest.split_whitespace().next().ok_or(malformed)?;
            dict.root.insert(key, value);
            dict.len += 1;
        }
        if dict.len == 0 {
            return Err(DictError::Empty);
        }
        debug!("Loaded conversion dictionary with {} entries", dict.len);
        Ok(dict)
    }

    /// Load a dictionary from raw bytes, which must be UTF-8
    pub fn load_bytes(raw: &[u8]) -> Result<Self, DictError> {
        let raw = std::str::from_utf8(raw).map_err(|_| DictError::NotUtf8)?;
        Self::load(raw.strip_prefix('\u{feff}').unwrap_or(raw))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the dictionary is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Rewrite `text`, always taking the longest matching phrase
    pub fn replace_all(&self, mut text: &str) -> String {
        let mut output = String::with_capacity(text.len());
        while let Some(c) = text.chars().next() {
            match self.root.prefix_match(text) {
                Some((matched, value)) => {
                    output.push_str(value);
                    text = &text[matched..];
                }
                None => {
                    output.push(c);
                    text = &text[c.len_utf8()..];
                }
            }
        }
        output
    }

    /// Convert each line on its own, keeping the line structure
    pub fn convert_lines(&self, lines: &[String]) -> Vec<String> {
        lines.iter().map(|line| self.replace_all(line)).collect()
    }
}

/// Apply an optional dictionary to cue lines; no-op without one
pub fn convert(lines: Vec<String>, dict: Option<&Dict>) -> Vec<String> {
    match dict {
        Some(dict) => dict.convert_lines(&lines),
        None => lines,
    }
}

struct CachedDict {
    digest: [u8; 32],
    dict: Arc<Dict>,
}

/// Process-wide cache of parsed dictionaries, keyed by name
///
/// Readers get a shared `Arc<Dict>`. A reload with a different source builds
/// a new dictionary and swaps the reference; the old one lives on in any
/// conversion still using it.
#[derive(Clone, Default)]
pub struct DictCache {
    entries: Arc<RwLock<HashMap<String, CachedDict>>>,
}

impl DictCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached dictionary for `name`, reloading it if `source` changed
    pub fn get_or_load(&self, name: &str, source: &[u8]) -> Result<Arc<Dict>, DictError> {
        let digest: [u8; 32] = Sha256::digest(source).into();

        if let Some(cached) = self.entries.read().get(name) {
            if cached.digest == digest {
                debug!("Dictionary cache hit for '{}'", name);
                return Ok(Arc::clone(&cached.dict));
            }
        }

        // Parse outside the lock; a failed load leaves the old entry in place
        let dict = Arc::new(Dict::load_bytes(source)?);
        let mut entries = self.entries.write();
        entries.insert(
            name.to_string(),
            CachedDict {
                digest,
                dict: Arc::clone(&dict),
            },
        );
        debug!("Dictionary '{}' (re)loaded into cache", name);
        Ok(dict)
    }

    /// Currently cached dictionary for `name`, if any
    pub fn get(&self, name: &str) -> Option<Arc<Dict>> {
        self.entries.read().get(name).map(|cached| Arc::clone(&cached.dict))
    }

    /// Number of cached dictionaries
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
