use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};
use crate::record::Record;

/// A bibliography entry ready to be appended to a store, with the key used
/// to decide whether it is already there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: String,
    pub text: String,
}

impl Entry {
    pub fn from_record(record: &Record) -> Self {
        Self {
            key: record.generate_key(),
            text: record.to_bibtex(),
        }
    }
}

// An entry runs from `@type{` up to the last `\n}` before the next `@`.
static ENTRY_BLOCK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"@[a-zA-Z]+\{[^@]*\n\}").unwrap());
static ENTRY_KEY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^@[a-zA-Z]+\{([^,]+),").unwrap());

/// Split a BibTeX export into verbatim entries.
///
/// `id` names the request in errors. A block whose key cannot be read is a
/// [`Error::ParseMismatch`].
pub fn split_entries(body: &str, id: &str) -> Result<Vec<Entry>> {
    ENTRY_BLOCK_RE
        .find_iter(body)
        .map(|block| {
            let text = block.as_str();
            let key = ENTRY_KEY_RE
                .captures(text)
                .and_then(|caps| caps.get(1))
                .ok_or_else(|| Error::ParseMismatch {
                    id: id.to_string(),
                    reason: format!(
                        "entry has no key: {}",
                        text.lines().next().unwrap_or_default()
                    ),
                })?;
            Ok(Entry {
                key: key.as_str().to_string(),
                text: text.to_string(),
            })
        })
        .collect()
}
