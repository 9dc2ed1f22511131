//! Providers whose endpoint answers with BibTeX text.

use crate::bibtex::{Entry, split_entries};
use crate::error::Result;
use crate::provider::Provider;

pub struct Passthrough {
    name: &'static str,
    slug: &'static str,
    prefixes: &'static [&'static str],
    template: &'static str,
}

impl Provider for Passthrough {
    fn name(&self) -> &'static str {
        self.name
    }

    fn slug(&self) -> &'static str {
        self.slug
    }

    fn prefixes(&self) -> &'static [&'static str] {
        self.prefixes
    }

    fn template(&self) -> &'static str {
        self.template
    }

    fn parse_response(&self, key: &str, body: &str) -> Result<Vec<Entry>> {
        split_entries(body, key)
    }
}

pub static BASE: Passthrough = Passthrough {
    name: "BASE",
    slug: "base",
    prefixes: &["BASE:"],
    template: "https://www.base-search.net/Record/{id}/Export?style[]=BibTeX",
};

pub static COGPRINTS: Passthrough = Passthrough {
    name: "Cogprints",
    slug: "cogprints",
    prefixes: &["Cogprints:"],
    template: "https://web-archive.southampton.ac.uk/cogprints.org/{id}.bib.html",
};

pub static DBLP: Passthrough = Passthrough {
    name: "DBLP",
    slug: "dblp",
    prefixes: &["DBLP:"],
    template: "https://dblp.org/rec/{id}.bib",
};

pub static JSTOR: Passthrough = Passthrough {
    name: "JSTOR",
    slug: "jstor",
    prefixes: &["JSTOR:"],
    template: "https://www.jstor.org/citation/text/{id}",
};

pub static MICROSOFT: Passthrough = Passthrough {
    name: "Microsoft Research",
    slug: "microsoft",
    prefixes: &["Microsoft:"],
    template: "https://www.microsoft.com/en-us/research/publication/{id}/bibtex/",
};

pub static SPRINGER: Passthrough = Passthrough {
    name: "SpringerLink",
    slug: "springer",
    prefixes: &["Springer:"],
    template: "https://citation-needed.springer.com/v2/references/10.1007/{id}",
};
