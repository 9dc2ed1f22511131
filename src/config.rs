//! Settings file for `sync`.
//!
//! An INI file whose `[Defaults]` section overrides the built-in defaults:
//!
//! ```ini
//! [Defaults]
//! dblp = refs/dblp.bib
//! root = paper
//! ignore = draft.tex, old.tex
//! ```
//!
//! The one-letter keys of older setups (`d`, `ac`, ...) are accepted too.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use ini::Ini;
use log::warn;

use crate::error::{Error, Result};
use crate::provider::{self, PROVIDERS};

const SECTION: &str = "Defaults";

const LEGACY_KEYS: &[(&str, &str)] = &[
    ("ac", "acm"),
    ("a", "arxiv"),
    ("b", "base"),
    ("c", "cogprints"),
    ("d", "dblp"),
    ("j", "jstor"),
    ("m", "microsoft"),
    ("s", "springer"),
];

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Defaults {
    /// Store path by provider slug.
    pub stores: BTreeMap<String, PathBuf>,
    pub root: Option<PathBuf>,
    pub ignore: Option<BTreeSet<String>>,
}

/// Map a config key (or legacy alias) onto a provider slug.
pub fn provider_slug(key: &str) -> Option<&'static str> {
    let key = LEGACY_KEYS
        .iter()
        .find(|(alias, _)| *alias == key)
        .map_or(key, |(_, slug)| *slug);
    provider::by_slug(key).map(|p| p.slug())
}

pub fn load(path: &Path) -> Result<Defaults> {
    let text = fs::read_to_string(path).map_err(|e| Error::Config {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse(&text, path)
}

/// Parse config text. `path` is only used in errors.
pub fn parse(text: &str, path: &Path) -> Result<Defaults> {
    let config_err = |reason: String| Error::Config {
        path: path.to_path_buf(),
        reason,
    };
    let ini = Ini::load_from_str(text).map_err(|e| config_err(e.to_string()))?;
    let section = ini
        .section(Some(SECTION))
        .ok_or_else(|| config_err(format!("missing [{SECTION}] section")))?;

    let mut defaults = Defaults::default();
    for (key, value) in section.iter() {
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim();
        match key.as_str() {
            "root" => defaults.root = Some(PathBuf::from(value)),
            "ignore" => {
                defaults.ignore = Some(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|name| !name.is_empty())
                        .map(str::to_string)
                        .collect(),
                )
            }
            other => match provider_slug(other) {
                Some(slug) => {
                    defaults.stores.insert(slug.to_string(), PathBuf::from(value));
                }
                None => warn!(
                    "{}: ignoring unknown key `{other}` (expected one of: {})",
                    path.display(),
                    known_keys().collect::<Vec<_>>().join(", ")
                ),
            },
        }
    }
    Ok(defaults)
}

/// Every setting name the `[Defaults]` section understands.
pub fn known_keys() -> impl Iterator<Item = &'static str> {
    ["root", "ignore"]
        .into_iter()
        .chain(PROVIDERS.iter().map(|p| p.slug()))
}
