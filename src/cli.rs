use std::collections::BTreeSet;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use url::Url;

use crate::config::{self, Defaults};
use crate::error::Result;
use crate::sync::SyncOptions;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Show debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch BibTeX records for cited keys that are missing from the provider files
    Sync(SyncArgs),
    /// Get the BibTeX for each arXiv id from the arXiv API
    #[command(after_help = "\
Returns 0 on success, 1 on partial failure, 2 on total failure.
Valid BibTeX is written to stdout, error messages to stderr.
If no ids are given, they are read from stdin, one per line.")]
    Arxiv(ArxivArgs),
    /// Scrape one abstract page into a BibTeX file
    Scrape {
        url: Url,
        /// BibTeX file to append to
        #[arg(short, long, default_value = "arxiv.bib")]
        file: PathBuf,
    },
}

#[derive(Args, Debug, Default, Clone)]
pub struct SyncArgs {
    /// Directory searched recursively for .tex files [default: .]
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// File name to skip while scanning; may be repeated
    #[arg(long, value_name = "NAME")]
    pub ignore: Vec<String>,

    /// INI file whose [Defaults] section overrides the defaults of these flags
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// ACM BibTeX file [default: acm.bib]
    #[arg(long, alias = "ac", value_name = "FILE")]
    pub acm: Option<PathBuf>,

    /// arXiv BibTeX file [default: arxiv.bib]
    #[arg(long, alias = "a", value_name = "FILE")]
    pub arxiv: Option<PathBuf>,

    /// BASE BibTeX file [default: base.bib]
    #[arg(long, alias = "b", value_name = "FILE")]
    pub base: Option<PathBuf>,

    /// Cogprints BibTeX file [default: cogprints.bib]
    #[arg(long, alias = "c", value_name = "FILE")]
    pub cogprints: Option<PathBuf>,

    /// DBLP BibTeX file [default: dblp.bib]
    #[arg(long, alias = "d", value_name = "FILE")]
    pub dblp: Option<PathBuf>,

    /// JSTOR BibTeX file [default: jstor.bib]
    #[arg(long, alias = "j", value_name = "FILE")]
    pub jstor: Option<PathBuf>,

    /// Microsoft Research BibTeX file [default: microsoft.bib]
    #[arg(long, alias = "m", value_name = "FILE")]
    pub microsoft: Option<PathBuf>,

    /// SpringerLink BibTeX file [default: springer.bib]
    #[arg(long, alias = "s", value_name = "FILE")]
    pub springer: Option<PathBuf>,
}

impl SyncArgs {
    fn store_flags(&self) -> [(&'static str, Option<&PathBuf>); 8] {
        [
            ("acm", self.acm.as_ref()),
            ("arxiv", self.arxiv.as_ref()),
            ("base", self.base.as_ref()),
            ("cogprints", self.cogprints.as_ref()),
            ("dblp", self.dblp.as_ref()),
            ("jstor", self.jstor.as_ref()),
            ("microsoft", self.microsoft.as_ref()),
            ("springer", self.springer.as_ref()),
        ]
    }

    /// Load `--config`, if given, and merge it under the flags.
    pub fn resolve(&self) -> Result<SyncOptions> {
        let defaults = match &self.config {
            Some(path) => config::load(path)?,
            None => Defaults::default(),
        };
        Ok(self.merge(defaults))
    }

    /// A flag beats the config file, which beats the built-in default.
    pub fn merge(&self, defaults: Defaults) -> SyncOptions {
        let mut opts = SyncOptions::default();
        if let Some(root) = self.root.clone().or(defaults.root) {
            opts.root = root;
        }
        opts.ignore = if self.ignore.is_empty() {
            defaults.ignore.unwrap_or_default()
        } else {
            self.ignore.iter().cloned().collect::<BTreeSet<_>>()
        };
        opts.stores = defaults.stores;
        for (slug, flag) in self.store_flags() {
            if let Some(path) = flag {
                opts.stores.insert(slug.to_string(), path.clone());
            }
        }
        opts
    }
}

#[derive(Args, Debug, Clone)]
pub struct ArxivArgs {
    /// arXiv identifier, such as 1201.1213
    #[arg(value_name = "ARXIV_ID")]
    pub ids: Vec<String>,

    /// Include @comment fields with error details
    #[arg(short, long)]
    pub comments: bool,

    /// Display fewer error messages
    #[arg(short, long)]
    pub quiet: bool,

    /// BibTeX file the output is appended to
    #[arg(short, long, value_name = "FILE", default_value = "arxiv.bib")]
    pub output: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::PROVIDERS;
    use clap::CommandFactory;

    fn sync_args(argv: &[&str]) -> SyncArgs {
        let cli = Cli::try_parse_from(["bibfetch", "sync"].iter().chain(argv)).expect("parse");
        match cli.command {
            Command::Sync(args) => args,
            other => panic!("expected sync, got {other:?}"),
        }
    }

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn every_provider_has_a_store_flag() {
        let args = SyncArgs::default();
        let slugs: Vec<_> = args.store_flags().iter().map(|(s, _)| *s).collect();
        let expected: Vec<_> = PROVIDERS.iter().map(|p| p.slug()).collect();
        assert_eq!(slugs, expected);
    }

    #[test]
    fn legacy_aliases_set_store_paths() {
        let args = sync_args(&["--d", "x.bib", "--ac", "y.bib", "--springer", "z.bib"]);
        assert_eq!(args.dblp, Some(PathBuf::from("x.bib")));
        assert_eq!(args.acm, Some(PathBuf::from("y.bib")));
        assert_eq!(args.springer, Some(PathBuf::from("z.bib")));
    }

    #[test]
    fn flags_override_config_which_overrides_defaults() {
        let args = sync_args(&["--dblp", "flag.bib", "--ignore", "a.tex"]);
        let mut defaults = Defaults::default();
        defaults.stores.insert("dblp".into(), PathBuf::from("config.bib"));
        defaults.stores.insert("jstor".into(), PathBuf::from("j.bib"));
        defaults.root = Some(PathBuf::from("paper"));
        defaults.ignore = Some(BTreeSet::from(["b.tex".to_string()]));

        let opts = args.merge(defaults);
        assert_eq!(opts.stores.get("dblp"), Some(&PathBuf::from("flag.bib")));
        assert_eq!(opts.stores.get("jstor"), Some(&PathBuf::from("j.bib")));
        assert_eq!(opts.stores.get("acm"), None);
        assert_eq!(opts.root, PathBuf::from("paper"));
        assert_eq!(opts.ignore, BTreeSet::from(["a.tex".to_string()]));
    }

    #[test]
    fn no_flags_and_no_config_use_defaults() {
        let opts = sync_args(&[]).merge(Defaults::default());
        assert_eq!(opts.root, PathBuf::from("."));
        assert!(opts.ignore.is_empty());
        assert!(opts.stores.is_empty());
    }

    #[test]
    fn arxiv_flags_parse() {
        let cli = Cli::try_parse_from(["bibfetch", "-v", "arxiv", "-c", "1201.1213", "hep-th/9901001"])
            .expect("parse");
        assert!(cli.verbose);
        let Command::Arxiv(args) = cli.command else {
            panic!("expected arxiv");
        };
        assert!(args.comments);
        assert!(!args.quiet);
        assert_eq!(args.ids, vec!["1201.1213", "hep-th/9901001"]);
        assert_eq!(args.output, PathBuf::from("arxiv.bib"));
    }

    #[test]
    fn scrape_requires_a_url() {
        assert!(Cli::try_parse_from(["bibfetch", "scrape", "not a url"]).is_err());
        let cli = Cli::try_parse_from(["bibfetch", "scrape", "https://arxiv.org/abs/1", "-f", "o.bib"])
            .expect("parse");
        assert!(matches!(cli.command, Command::Scrape { ref file, .. } if file == &PathBuf::from("o.bib")));
    }
}
