use std::collections::BTreeSet;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use log::debug;

use crate::bibtex::Entry;
use crate::error::{Error, Result};
use crate::registry::load_known_keys;

/// A BibTeX file holding the entries of one provider. Entries are only ever appended.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read the whole store. A missing file reads as `None`.
    pub fn read(&self) -> Result<Option<String>> {
        match fs::read(&self.path) {
            Ok(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|_| Error::Decode {
                    path: self.path.clone(),
                }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::io(&self.path, e)),
        }
    }

    pub fn known_keys(&self) -> Result<BTreeSet<String>> {
        Ok(self
            .read()?
            .map(|text| load_known_keys(&text))
            .unwrap_or_default())
    }

    /// Append `text` followed by a blank line, creating the file if needed.
    pub fn append_text(&self, text: &str) -> Result<()> {
        debug!("appending {} bytes to {}", text.len(), self.path.display());
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| Error::io(&self.path, e))?;
        write!(file, "{}\n\n", text.trim_end_matches('\n')).map_err(|e| Error::io(&self.path, e))
    }

    pub fn append(&self, entry: &Entry) -> Result<()> {
        self.append_text(&entry.text)
    }
}
