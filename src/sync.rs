//! One run over a document tree: find what is cited, fetch what is missing.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use owo_colors::{OwoColorize, Stream};

use crate::fetch::Fetcher;
use crate::provider::{PROVIDERS, Provider};
use crate::registry::KeyRegistry;
use crate::scan::{read_source, tex_files};
use crate::store::Store;

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub root: PathBuf,
    pub ignore: BTreeSet<String>,
    /// Store path per provider slug. Providers without an entry use their default store.
    pub stores: BTreeMap<String, PathBuf>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            ignore: BTreeSet::new(),
            stores: BTreeMap::new(),
        }
    }
}

impl SyncOptions {
    pub fn store_for(&self, provider: &dyn Provider) -> Store {
        match self.stores.get(provider.slug()) {
            Some(path) => Store::new(path),
            None => Store::new(provider.default_store()),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
    pub appended: usize,
    pub skipped: usize,
    pub unused: BTreeSet<String>,
}

fn heading(text: &str) {
    println!(
        "\n{}",
        text.if_supports_color(Stream::Stdout, |t| t.bold())
    );
}

fn progress_bar(len: usize, provider: &dyn Provider) -> anyhow::Result<ProgressBar> {
    let bar = ProgressBar::new(len as u64);
    bar.set_style(
        ProgressStyle::with_template("{spinner:.green} {prefix} [{bar:30.cyan/dim}] {pos}/{len}")?
            .progress_chars("=> "),
    );
    bar.set_prefix(provider.name());
    Ok(bar)
}

/// Run every provider in order. The first failing fetch aborts the run.
pub fn run(opts: &SyncOptions, fetcher: &dyn Fetcher) -> anyhow::Result<Summary> {
    let mut registry = KeyRegistry::new();
    let mut summary = Summary::default();

    for provider in PROVIDERS {
        let store = opts.store_for(*provider);
        if store.exists() {
            println!("Reading existing BibTeX file {}", store.path().display());
            let known = store
                .known_keys()
                .with_context(|| format!("reading {}", store.path().display()))?;
            debug!("{} known {} keys", known.len(), provider.name());
            registry.add_known(*provider, known);
        } else {
            println!(
                "BibTeX file {} not found, will try to create it.",
                store.path().display()
            );
        }
    }

    heading("Reading your LaTeX documents:");
    for path in tex_files(&opts.root, &opts.ignore) {
        println!(" * {}", display_relative(&path, &opts.root));
        let text = read_source(&path)?;
        registry.scan_source(&text);
    }

    for provider in PROVIDERS {
        let referenced = registry.referenced(*provider);
        if referenced.is_empty() {
            continue;
        }
        heading(&format!(
            "The following {} keys have been found in your LaTeX files:",
            provider.name()
        ));
        for key in referenced {
            println!(" * {key}");
        }
    }
    if !registry.unused().is_empty() {
        heading("The following unused keys have been found in your LaTeX files:");
        for key in registry.unused() {
            println!(" * {key}");
        }
    }

    for provider in PROVIDERS {
        let store = opts.store_for(*provider);
        let missing = registry.missing_keys(*provider);
        if missing.is_empty() {
            let msg = if !store.exists() && registry.referenced(*provider).is_empty() {
                format!(
                    "You do not have a {} BibTeX file, nothing needs to be fetched.",
                    provider.name()
                )
            } else {
                format!(
                    "Your {} BibTeX file is up to date, nothing needs to be fetched.",
                    provider.name()
                )
            };
            println!("{msg}");
            continue;
        }

        heading(&format!(
            "Fetching BibTeX records for missing keys from {}:",
            provider.name()
        ));
        let bar = progress_bar(missing.len(), *provider)?;
        for key in &missing {
            bar.suspend(|| println!(" * {key}"));
            fetch_one(*provider, key, &store, &mut registry, fetcher, &bar, &mut summary)?;
            bar.inc(1);
        }
        bar.finish_and_clear();
    }

    summary.unused = registry.unused().clone();
    println!(
        "\n{}",
        "All done.".if_supports_color(Stream::Stdout, |t| t.green())
    );
    Ok(summary)
}

fn fetch_one(
    provider: &dyn Provider,
    key: &str,
    store: &Store,
    registry: &mut KeyRegistry,
    fetcher: &dyn Fetcher,
    bar: &ProgressBar,
    summary: &mut Summary,
) -> anyhow::Result<()> {
    let url = provider.fetch_url(key)?;
    let body = fetcher
        .get(&url)
        .with_context(|| format!("fetching {key} from {}", provider.name()))?;
    let entries = provider.parse_response(key, &body)?;
    if entries.is_empty() {
        bar.suspend(|| {
            println!(
                "   {} no entries returned for {key}",
                "warning:".if_supports_color(Stream::Stdout, |t| t.yellow())
            )
        });
    }
    for entry in entries {
        if registry.contains(provider, &entry.key) {
            bar.suspend(|| {
                println!(
                    "   (not adding {} to {} BibTeX file, it is already there.)",
                    entry.key,
                    provider.name()
                )
            });
            summary.skipped += 1;
            continue;
        }
        store
            .append(&entry)
            .with_context(|| format!("writing {}", store.path().display()))?;
        registry.mark_fetched(provider, &entry.key);
        summary.appended += 1;
    }
    registry.mark_fetched(provider, key);
    Ok(())
}

fn display_relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}
