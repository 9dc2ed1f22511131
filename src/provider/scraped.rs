//! Providers that only offer an HTML abstract page.

use crate::bibtex::Entry;
use crate::error::{Error, Result};
use crate::provider::Provider;
use crate::scrape::scrape;

pub struct Scraped {
    name: &'static str,
    slug: &'static str,
    prefixes: &'static [&'static str],
    template: &'static str,
}

impl Provider for Scraped {
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

    /// The page yields exactly one record, keyed by [`crate::record::Record::generate_key`].
    fn parse_response(&self, key: &str, body: &str) -> Result<Vec<Entry>> {
        let record = scrape(body);
        if record.is_empty() {
            return Err(Error::NotFound(key.to_string()));
        }
        Ok(vec![Entry::from_record(&record)])
    }
}

pub static ACM: Scraped = Scraped {
    name: "ACM",
    slug: "acm",
    prefixes: &["ACM:"],
    template: "https://dl.acm.org/doi/10.1145/{id}",
};

pub static ARXIV: Scraped = Scraped {
    name: "arXiv",
    slug: "arxiv",
    prefixes: &["arXiv:", "Arxiv:"],
    template: "https://arxiv.org/abs/{id}",
};
