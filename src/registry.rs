//! Per-provider bookkeeping of citation keys for one run.

use std::collections::{BTreeMap, BTreeSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::provider::{self, Provider};

static ENTRY_OPEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"@[A-Za-z]+\{([^,]*),").unwrap());
static CITE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:cite|citep|citet|fullciteown|autocite|textcite)\{([^}]+)\}").unwrap()
});

/// Keys of the entries already present in a bibliography store.
///
/// Only the first entry-open on a line counts; lines that do not open an entry
/// are ignored.
pub fn load_known_keys(store_text: &str) -> BTreeSet<String> {
    store_text
        .lines()
        .filter_map(|line| ENTRY_OPEN_RE.captures(line))
        .filter_map(|caps| caps.get(1))
        .map(|key| key.as_str())
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .collect()
}

/// Every key cited in a source document, in order of appearance.
pub fn scan_referenced_keys(source_text: &str) -> Vec<String> {
    source_text
        .lines()
        .flat_map(|line| CITE_RE.captures_iter(line))
        .filter_map(|caps| caps.get(1))
        .flat_map(|list| list.as_str().split(','))
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Default, Clone)]
pub struct KeySet {
    pub known: BTreeSet<String>,
    pub referenced: BTreeSet<String>,
    pub fetched: BTreeSet<String>,
}

/// Tracks what is known, referenced and fetched, per provider.
#[derive(Debug, Default)]
pub struct KeyRegistry {
    sets: BTreeMap<&'static str, KeySet>,
    unused: BTreeSet<String>,
}

impl KeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn set_mut(&mut self, provider: &dyn Provider) -> &mut KeySet {
        self.sets.entry(provider.slug()).or_default()
    }

    pub fn key_set(&self, provider: &dyn Provider) -> Option<&KeySet> {
        self.sets.get(provider.slug())
    }

    pub fn add_known(&mut self, provider: &dyn Provider, keys: impl IntoIterator<Item = String>) {
        self.set_mut(provider).known.extend(keys);
    }

    /// Classify `key` by its prefix; keys no provider claims are kept as unused.
    pub fn add_referenced(&mut self, key: &str) {
        match provider::classify(key) {
            Some(p) => {
                self.set_mut(p).referenced.insert(key.to_string());
            }
            None => {
                self.unused.insert(key.to_string());
            }
        }
    }

    pub fn scan_source(&mut self, source_text: &str) {
        for key in scan_referenced_keys(source_text) {
            self.add_referenced(&key);
        }
    }

    pub fn referenced(&self, provider: &dyn Provider) -> BTreeSet<String> {
        self.key_set(provider)
            .map(|s| s.referenced.clone())
            .unwrap_or_default()
    }

    pub fn unused(&self) -> &BTreeSet<String> {
        &self.unused
    }

    /// Referenced keys that are neither in the store nor fetched in this run.
    pub fn missing_keys(&self, provider: &dyn Provider) -> BTreeSet<String> {
        let Some(set) = self.key_set(provider) else {
            return BTreeSet::new();
        };
        set.referenced
            .iter()
            .filter(|key| !set.known.contains(*key) && !set.fetched.contains(*key))
            .cloned()
            .collect()
    }

    /// Whether an entry with `key` is already in the store or was written this run.
    pub fn contains(&self, provider: &dyn Provider, key: &str) -> bool {
        self.key_set(provider)
            .is_some_and(|s| s.known.contains(key) || s.fetched.contains(key))
    }

    /// Record `key` as fetched. Returns `false` if it was already fetched.
    pub fn mark_fetched(&mut self, provider: &dyn Provider, key: &str) -> bool {
        self.set_mut(provider).fetched.insert(key.to_string())
    }
}
