//! JSON header model and parsing

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{ContainerError, Result};

/// Reserved header key holding file-level metadata
pub const METADATA_KEY: &str = "__metadata__";

/// One tensor record from the header
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HeaderEntry {
    /// Raw dtype tag, e.g. `"BF16"`
    pub dtype: String,
    /// Declared shape
    pub shape: Vec<usize>,
    /// `[start, end)` relative to the data section
    pub data_offsets: [u64; 2],
}

impl HeaderEntry {
    /// Start offset within the data section
    pub fn start(&self) -> u64 {
        self.data_offsets[0]
    }

    /// End offset (exclusive) within the data section
    pub fn end(&self) -> u64 {
        self.data_offsets[1]
    }

    /// Declared span length in bytes
    pub fn byte_len(&self) -> u64 {
        self.end() - self.start()
    }
}

/// Parsed container header
#[derive(Debug, Clone, Default)]
pub struct ContainerHeader {
    /// Tensor records keyed by name
    pub entries: BTreeMap<String, HeaderEntry>,
    /// Contents of the reserved metadata entry, if present
    pub metadata: Option<Value>,
}

/// Parse header bytes into a [`ContainerHeader`].
///
/// Rejects non-UTF-8 text, invalid JSON, non-object headers, entries with
/// missing fields, reversed offsets and overlapping byte ranges.
pub fn parse_header(bytes: &[u8]) -> Result<ContainerHeader> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| ContainerError::malformed(format!("header is not valid UTF-8: {}", e)))?;

    let root: Map<String, Value> = serde_json::from_str(text)
        .map_err(|e| ContainerError::malformed(format!("invalid header JSON: {}", e)))?;

    let mut header = ContainerHeader::default();

    for (name, value) in root {
        if name == METADATA_KEY {
            header.metadata = Some(value);
            continue;
        }

        let entry: HeaderEntry = serde_json::from_value(value).map_err(|e| {
            ContainerError::malformed(format!("invalid entry for tensor '{}': {}", name, e))
        })?;

        if entry.end() < entry.start() {
            return Err(ContainerError::malformed(format!(
                "tensor '{}' has reversed data_offsets [{}, {})",
                name,
                entry.start(),
                entry.end()
            )));
        }

        header.entries.insert(name, entry);
    }

    check_overlaps(&header.entries)?;

    debug!(
        "Parsed header: {} entries, metadata={}",
        header.entries.len(),
        header.metadata.is_some()
    );

    Ok(header)
}

fn check_overlaps(entries: &BTreeMap<String, HeaderEntry>) -> Result<()> {
    let mut spans: Vec<(&str, u64, u64)> = entries
        .iter()
        .filter(|(_, e)| e.byte_len() > 0)
        .map(|(name, e)| (name.as_str(), e.start(), e.end()))
        .collect();
    spans.sort_by_key(|&(_, start, end)| (start, end));

    for pair in spans.windows(2) {
        let (prev_name, _, prev_end) = pair[0];
        let (name, start, _) = pair[1];
        if start < prev_end {
            return Err(ContainerError::malformed(format!(
                "data ranges of '{}' and '{}' overlap",
                prev_name, name
            )));
        }
    }

    Ok(())
}
