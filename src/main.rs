use std::io::{self, BufRead};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use log::debug;
use owo_colors::{OwoColorize, Stream};

use crate::{
    arxiv::ArxivOptions,
    cli::{ArxivArgs, Cli, Command},
    fetch::HttpFetcher,
    store::Store,
};

mod arxiv;
mod bibtex;
mod cli;
mod config;
mod error;
mod fetch;
mod normalize;
mod provider;
mod record;
mod registry;
mod scan;
mod scrape;
mod store;
mod sync;

fn read_ids_from_stdin() -> anyhow::Result<Vec<String>> {
    let stdin = io::stdin();
    let mut ids = Vec::new();
    for line in stdin.lock().lines() {
        let line = line.context("reading ids from stdin")?;
        let id = line.trim();
        if !id.is_empty() {
            ids.push(id.to_string());
        }
    }
    Ok(ids)
}

fn arxiv_options(args: ArxivArgs, verbose: bool) -> anyhow::Result<ArxivOptions> {
    let ids = if args.ids.is_empty() {
        read_ids_from_stdin()?
    } else {
        args.ids
    };
    Ok(ArxivOptions {
        ids,
        comments: args.comments,
        quiet: args.quiet,
        verbose,
        output: args.output,
    })
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Cli::parse();
    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let fetcher = HttpFetcher::new();
    match args.command {
        Command::Sync(sync_args) => {
            let opts = sync_args.resolve()?;
            debug!("sync options: {opts:?}");
            let summary = sync::run(&opts, &fetcher)?;
            debug!(
                "{} entries appended, {} already present, {} unused keys",
                summary.appended,
                summary.skipped,
                summary.unused.len()
            );
            Ok(ExitCode::SUCCESS)
        }
        Command::Arxiv(arxiv_args) => {
            let opts = arxiv_options(arxiv_args, args.verbose)?;
            Ok(ExitCode::from(arxiv::run(&opts, &fetcher)))
        }
        Command::Scrape { url, file } => {
            let store = Store::new(&file);
            let (entry, written) = scrape::scrape_into(&url, &store, &fetcher)
                .with_context(|| format!("scraping {url}"))?;
            if written {
                println!(
                    "{} {} to {}",
                    "Added".if_supports_color(Stream::Stdout, |t| t.green()),
                    entry.key,
                    file.display()
                );
            } else {
                println!(
                    "(not adding {} to {}, it is already there.)",
                    entry.key,
                    file.display()
                );
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
