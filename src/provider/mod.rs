use std::path::PathBuf;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use url::Url;

use crate::bibtex::Entry;
use crate::error::{Error, Result};

pub mod passthrough;
pub mod scraped;

pub use passthrough::{BASE, COGPRINTS, DBLP, JSTOR, MICROSOFT, SPRINGER};
pub use scraped::{ACM, ARXIV};

// Slashes stay literal: DBLP ids such as `conf/foo/Bar20` are paths.
const PATH_SEGMENT_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// A bibliographic data source reachable through one endpoint.
pub trait Provider: Sync {
    /// Display name used in progress output.
    fn name(&self) -> &'static str;

    /// Short lower-case name, used for CLI flags, config keys and the default store.
    fn slug(&self) -> &'static str;

    /// Exact, case-sensitive citation key prefixes claimed by this provider.
    fn prefixes(&self) -> &'static [&'static str];

    /// Endpoint template; `{id}` is replaced by the key without its prefix.
    fn template(&self) -> &'static str;

    /// Turn a response body into the entries it describes.
    fn parse_response(&self, key: &str, body: &str) -> Result<Vec<Entry>>;

    fn default_store(&self) -> PathBuf {
        PathBuf::from(format!("{}.bib", self.slug()))
    }

    fn local_id<'k>(&self, key: &'k str) -> Option<&'k str> {
        self.prefixes().iter().find_map(|p| key.strip_prefix(p))
    }

    fn fetch_url(&self, key: &str) -> Result<Url> {
        let id = self
            .local_id(key)
            .ok_or_else(|| Error::InvalidIdentifier(key.to_string()))?;
        let encoded = utf8_percent_encode(id, PATH_SEGMENT_ENCODE_SET).to_string();
        Url::parse(&self.template().replace("{id}", &encoded))
            .map_err(|e| Error::InvalidIdentifier(format!("{key} ({e})")))
    }
}

/// Every provider, in processing order.
///
/// NOTE: The order is also the order of the progress output, so keep it stable.
pub static PROVIDERS: &[&dyn Provider] = &[
    &ACM, &ARXIV, &BASE, &COGPRINTS, &DBLP, &JSTOR, &MICROSOFT, &SPRINGER,
];

/// Find the provider claiming `key` by prefix.
pub fn classify(key: &str) -> Option<&'static dyn Provider> {
    PROVIDERS
        .iter()
        .copied()
        .find(|p| p.local_id(key).is_some())
}

pub fn by_slug(slug: &str) -> Option<&'static dyn Provider> {
    PROVIDERS.iter().copied().find(|p| p.slug() == slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn providers_are_processed_in_fixed_order() {
        let slugs: Vec<_> = PROVIDERS.iter().map(|p| p.slug()).collect();
        assert_eq!(
            slugs,
            vec!["acm", "arxiv", "base", "cogprints", "dblp", "jstor", "microsoft", "springer"]
        );
    }

    #[test]
    fn classification_is_exact_and_case_sensitive() {
        assert_eq!(classify("DBLP:conf/x/Y20").map(|p| p.slug()), Some("dblp"));
        assert_eq!(classify("Arxiv:1901.00001").map(|p| p.slug()), Some("arxiv"));
        assert_eq!(classify("arXiv:1901.00001").map(|p| p.slug()), Some("arxiv"));
        assert!(classify("dblp:conf/x/Y20").is_none());
        assert!(classify("Unrelated:bar").is_none());
        assert!(classify("DBLP").is_none());
    }

    #[test]
    fn builds_endpoint_urls() {
        let url = |key: &str| classify(key).unwrap().fetch_url(key).unwrap().to_string();
        assert_eq!(url("DBLP:foo20"), "https://dblp.org/rec/foo20.bib");
        assert_eq!(
            url("DBLP:conf/foo/Bar20"),
            "https://dblp.org/rec/conf/foo/Bar20.bib"
        );
        assert_eq!(url("ACM:3290605.3300234"), "https://dl.acm.org/doi/10.1145/3290605.3300234");
        assert_eq!(url("arXiv:1911.01234"), "https://arxiv.org/abs/1911.01234");
        assert_eq!(
            url("Springer:978-3-030-1"),
            "https://citation-needed.springer.com/v2/references/10.1007/978-3-030-1"
        );
        assert_eq!(
            url("Microsoft:widgets-1"),
            "https://www.microsoft.com/en-us/research/publication/widgets-1/bibtex/"
        );
        assert_eq!(url("JSTOR:1234"), "https://www.jstor.org/citation/text/1234");
        assert_eq!(
            url("Cogprints:42"),
            "https://web-archive.southampton.ac.uk/cogprints.org/42.bib.html"
        );
    }

    #[test]
    fn ids_are_percent_encoded() {
        assert_eq!(
            DBLP.fetch_url("DBLP:a b").unwrap().as_str(),
            "https://dblp.org/rec/a%20b.bib"
        );
    }

    #[test]
    fn foreign_key_is_not_a_valid_id() {
        assert!(matches!(
            DBLP.fetch_url("JSTOR:1"),
            Err(Error::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn default_store_is_named_after_slug() {
        assert_eq!(SPRINGER.default_store(), PathBuf::from("springer.bib"));
        assert_eq!(by_slug("acm").map(|p| p.name()), Some("ACM"));
        assert!(by_slug("nope").is_none());
    }
}
