//! BibTeX for bare arXiv ids, straight from the arXiv Atom API.
//!
//! All ids go out in one request. Ids the API cannot answer for are not fatal:
//! they come back as [`ReferenceError`] placeholders so the rest of the batch
//! still produces output.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use chrono::Month;
use log::{debug, warn};
use once_cell::sync::Lazy;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use regex::Regex;
use url::Url;

use crate::error::{Error, Result};
use crate::fetch::Fetcher;
use crate::store::Store;

pub const API_URL: &str = "http://export.arxiv.org/api/query";

static NEW_STYLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}\.\d{4,}(v\d+)?$").unwrap());
static OLD_STYLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)
        ^(
            math-ph | hep-ph | nucl-ex | nucl-th | gr-qc | astro-ph
          | hep-lat | quant-ph | hep-ex | hep-th
          | stat (\.(AP|CO|ML|ME|TH))?
          | q-bio (\.(BM|CB|GN|MN|NC|OT|PE|QM|SC|TO))?
          | cond-mat (\.(dis-nn|mes-hall|mtrl-sci|other|soft|stat-mech|str-el|supr-con))?
          | cs (\.(AR|AI|CL|CC|CE|CG|GT|CV|CY|CR|DS|DB|DL|DM|DC|GL|GR|HC|IR|IT|LG|LO
                  |MS|MA|MM|NI|NE|NA|OS|OH|PF|PL|RO|SE|SD|SC))?
          | nlin (\.(AO|CG|CD|SI|PS))?
          | physics (\.(acc-ph|ao-ph|atom-ph|atm-clus|bio-ph|chem-ph|class-ph|comp-ph
                  |data-an|flu-dyn|gen-ph|geo-ph|hist-ph|ins-det|med-ph|optics|ed-ph
                  |soc-ph|plasm-ph|pop-ph|space-ph))?
          | math (\.(AG|AT|AP|CT|CA|CO|AC|CV|DG|DS|FA|GM|GN|GT|GR|HO|IT|KT|LO|MP|MG
                  |NT|NA|OA|OC|PR|QA|RT|RA|SP|ST|SG))?
        )/\d{7}(v\d+)?$",
    )
    .unwrap()
});
static VERSION_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"v\d+$").unwrap());

/// Whether `id` looks like a new-style (`1201.1213v2`) or old-style
/// (`hep-th/9901001`) arXiv identifier.
pub fn is_valid(id: &str) -> bool {
    NEW_STYLE.is_match(id) || OLD_STYLE.is_match(id)
}

fn bare_id(id: &str) -> &str {
    VERSION_SUFFIX
        .find(id)
        .map_or(id, |m| &id[..m.start()])
}

/// One publication as described by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reference {
    pub id: String,
    pub url: String,
    pub authors: Vec<String>,
    pub title: String,
    pub summary: String,
    pub category: String,
    pub year: String,
    pub month: String,
    pub updated: String,
    pub note: String,
    pub doi: String,
}

impl Reference {
    pub fn bibtex(&self) -> String {
        let authors = self.authors.join(" and ");
        let file = format!("{}.pdf", self.id);
        let fields = [
            ("Author", authors.as_str()),
            ("Title", &self.title),
            ("Eprint", &self.id),
            ("DOI", &self.doi),
            ("ArchivePrefix", "arXiv"),
            ("PrimaryClass", &self.category),
            ("Abstract", &self.summary),
            ("Year", &self.year),
            ("Month", &self.month),
            ("Note", &self.note),
            ("Url", &self.url),
            ("File", &file),
        ];
        let mut lines = vec![format!("@article{{{}", self.id)];
        lines.extend(
            fields
                .iter()
                .filter(|(_, v)| !v.is_empty())
                .map(|(k, v)| format!("{k:<13} = {{{v}}}")),
        );
        format!("{}\n}}", lines.join(",\n"))
    }
}

/// Stand-in for an id that produced no reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceError {
    pub id: String,
    pub message: &'static str,
}

impl ReferenceError {
    pub const INVALID: &'static str = "Invalid arXiv identifier";
    pub const NOT_FOUND: &'static str = "Not found";
    pub const NO_SUCH_PUBLICATION: &'static str = "No such publication";

    fn new(id: &str, message: &'static str) -> Self {
        Self {
            id: id.to_string(),
            message,
        }
    }

    pub fn bibtex(&self) -> String {
        format!("@comment{{{}: {}}}", self.id, self.message)
    }
}

impl fmt::Display for ReferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error: {} ({})", self.message, self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Found(Reference),
    Failed(ReferenceError),
}

impl Outcome {
    fn id(&self) -> &str {
        match self {
            Outcome::Found(r) => &r.id,
            Outcome::Failed(e) => &e.id,
        }
    }

    // Placeholders sort as oldest so any real reference replaces them.
    fn updated(&self) -> &str {
        match self {
            Outcome::Found(r) => &r.updated,
            Outcome::Failed(_) => "0",
        }
    }

    pub fn bibtex(&self) -> String {
        match self {
            Outcome::Found(r) => r.bibtex(),
            Outcome::Failed(e) => e.bibtex(),
        }
    }
}

/// Fields of one `<entry>` as they appear in the feed.
#[derive(Debug, Default)]
struct RawEntry {
    id_url: String,
    title: String,
    summary: String,
    authors: Vec<String>,
    published: String,
    updated: String,
    category: String,
    journal_ref: String,
    doi: String,
}

impl RawEntry {
    fn into_outcome(self) -> Outcome {
        let id = self
            .id_url
            .find("/abs/")
            .map(|idx| self.id_url[idx + 5..].to_string())
            .unwrap_or_default();
        if id.is_empty() || self.authors.is_empty() || self.title.is_empty() {
            return Outcome::Failed(ReferenceError::new(&id, ReferenceError::NO_SUCH_PUBLICATION));
        }
        let (year, month) = published_year_month(&self.published);
        Outcome::Found(Reference {
            id,
            url: self.id_url,
            authors: self.authors,
            title: self.title,
            summary: self.summary,
            category: self.category,
            year,
            month,
            updated: self.updated,
            note: self.journal_ref,
            doi: self.doi,
        })
    }
}

// `2019-11-04T18:00:00Z` -> ("2019", "Nov"). A month that does not parse is kept as digits.
fn published_year_month(published: &str) -> (String, String) {
    let (Some(year), Some(month)) = (published.get(..4), published.get(5..7)) else {
        return (String::new(), String::new());
    };
    let month = month
        .parse::<u8>()
        .ok()
        .and_then(|n| Month::try_from(n).ok())
        .map_or(month.to_string(), |m| m.name()[..3].to_string());
    (year.to_string(), month)
}

fn is_local(name: &[u8], target: &str) -> bool {
    // Compare local name ignoring namespace prefixes.
    match name.iter().rposition(|&b| b == b':') {
        Some(pos) => &name[pos + 1..] == target.as_bytes(),
        None => name == target.as_bytes(),
    }
}

fn get_attr_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == key)
        .map(|a| String::from_utf8_lossy(a.value.as_ref()).to_string())
}

fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn parse_feed(xml: &str) -> Result<Vec<RawEntry>> {
    let mut reader = Reader::from_str(xml);
    let mut entries = Vec::new();
    let mut entry: Option<RawEntry> = None;
    let mut in_author = false;
    let mut cur_text = String::new();

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => {
                let name = e.name();
                if is_local(name.as_ref(), "entry") {
                    entry = Some(RawEntry::default());
                } else if is_local(name.as_ref(), "author") {
                    in_author = true;
                } else if let Some(entry) = entry.as_mut()
                    && is_local(name.as_ref(), "primary_category")
                    && let Some(term) = get_attr_value(&e, b"term")
                {
                    entry.category = term;
                }
                cur_text.clear();
            }
            Ok(Event::Empty(e)) => {
                if let Some(entry) = entry.as_mut()
                    && is_local(e.name().as_ref(), "primary_category")
                    && let Some(term) = get_attr_value(&e, b"term")
                {
                    entry.category = term;
                }
            }
            Ok(Event::End(e)) => {
                let name = e.name();
                let name = name.as_ref();
                if is_local(name, "entry") {
                    entries.extend(entry.take());
                } else if is_local(name, "author") {
                    in_author = false;
                } else if let Some(entry) = entry.as_mut() {
                    let text = cur_text.trim();
                    if in_author && is_local(name, "name") {
                        if !text.is_empty() {
                            entry.authors.push(normalize_ws(text));
                        }
                    } else if is_local(name, "id") {
                        entry.id_url = text.to_string();
                    } else if is_local(name, "title") {
                        entry.title = normalize_ws(text);
                    } else if is_local(name, "summary") {
                        entry.summary = text.to_string();
                    } else if is_local(name, "published") {
                        entry.published = text.to_string();
                    } else if is_local(name, "updated") {
                        entry.updated = text.to_string();
                    } else if is_local(name, "journal_ref") {
                        entry.journal_ref = text.to_string();
                    } else if is_local(name, "doi") {
                        entry.doi = text.to_string();
                    }
                }
                cur_text.clear();
            }
            Ok(Event::Text(t)) => cur_text.push_str(&String::from_utf8_lossy(t.as_ref())),
            Ok(Event::CData(t)) => cur_text.push_str(&String::from_utf8_lossy(t.as_ref())),
            Ok(Event::GeneralRef(r)) => {
                if let Ok(Some(ch)) = r.resolve_char_ref() {
                    cur_text.push(ch);
                } else {
                    let name = String::from_utf8_lossy(&r);
                    match quick_xml::escape::resolve_xml_entity(&name) {
                        Some(text) => cur_text.push_str(text),
                        None => {
                            warn!("unknown entity &{name}; in arXiv response");
                            cur_text.push('&');
                            cur_text.push_str(&name);
                            cur_text.push(';');
                        }
                    }
                }
            }
            Err(e) => {
                return Err(Error::ParseMismatch {
                    id: API_URL.to_string(),
                    reason: format!("XML parse error: {e}"),
                });
            }
            _ => {}
        }
        buf.clear();
    }
    Ok(entries)
}

pub fn request_url(ids: &[String]) -> Result<Url> {
    Url::parse_with_params(
        API_URL,
        &[
            ("id_list", ids.join(",")),
            ("max_results", ids.len().to_string()),
        ],
    )
    .map_err(|e| Error::InvalidIdentifier(format!("{} ({e})", ids.join(","))))
}

/// Look up every id, indexed by the ids as given and by their unversioned form.
///
/// Only connection-level problems are errors; per-id failures are placeholders.
pub fn lookup(ids: &[String], fetcher: &dyn Fetcher) -> Result<BTreeMap<String, Outcome>> {
    let mut found = BTreeMap::new();
    let mut valid = Vec::new();
    for id in ids {
        if is_valid(id) {
            valid.push(id.clone());
        } else {
            found.insert(
                id.clone(),
                Outcome::Failed(ReferenceError::new(id, ReferenceError::INVALID)),
            );
        }
    }

    let entries = loop {
        if valid.is_empty() {
            return Ok(found);
        }
        let body = fetcher.get(&request_url(&valid)?)?;
        let entries = parse_feed(&body)?;
        let first = entries.first().ok_or_else(|| {
            Error::FatalConnection("Unable to connect to arXiv.org API.".to_string())
        })?;
        if first.title != "Error" {
            break entries;
        }
        // The API rejects the whole batch for one bad id and names it last in the summary.
        let rejected = first
            .summary
            .split_whitespace()
            .last()
            .and_then(|bad| valid.iter().position(|id| id == bad))
            .ok_or_else(|| {
                Error::FatalConnection("Unable to parse an error returned by arXiv.org.".to_string())
            })?;
        debug!("arXiv rejected {}, retrying without it", valid[rejected]);
        valid.remove(rejected);
    };

    for outcome in entries.into_iter().map(RawEntry::into_outcome) {
        let id = outcome.id().to_string();
        let bare = bare_id(&id).to_string();
        if !bare.is_empty()
            && found
                .get(&bare)
                .is_none_or(|old| old.updated() < outcome.updated())
        {
            found.insert(bare.clone(), outcome.clone());
        }
        if !id.is_empty() {
            found.insert(id, outcome);
        }
    }
    Ok(found)
}

/// Outcomes in the order of `ids`. Ids the API left out are `Not found`.
pub fn arxiv2bib(ids: &[String], fetcher: &dyn Fetcher) -> Result<Vec<Outcome>> {
    let mut found = lookup(ids, fetcher)?;
    Ok(ids
        .iter()
        .map(|id| {
            found
                .remove(id)
                .unwrap_or_else(|| Outcome::Failed(ReferenceError::new(id, ReferenceError::NOT_FOUND)))
        })
        .collect())
}

#[derive(Debug, Clone)]
pub struct ArxivOptions {
    pub ids: Vec<String>,
    pub comments: bool,
    pub quiet: bool,
    pub verbose: bool,
    pub output: PathBuf,
}

/// What a batch produced: BibTeX for stdout and the store, messages for stderr.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Report {
    pub output: Vec<String>,
    pub messages: Vec<String>,
    pub code: u8,
}

pub fn report(outcomes: &[Outcome], opts: &ArxivOptions) -> Report {
    // Comments already carry the errors; repeating them on stderr needs --verbose.
    let quiet = opts.quiet || (opts.comments && !opts.verbose);
    let mut report = Report::default();
    let mut errors = 0;
    for outcome in outcomes {
        match outcome {
            Outcome::Found(_) => report.output.push(outcome.bibtex()),
            Outcome::Failed(e) => {
                errors += 1;
                if opts.comments {
                    report.output.push(outcome.bibtex());
                }
                if !quiet {
                    report.messages.push(e.to_string());
                }
            }
        }
    }
    report.code = if errors == opts.ids.len() {
        report.messages.push("No successful matches".to_string());
        2
    } else if errors > 0 {
        report.messages.push(format!(
            "{} of {} matched successfully",
            outcomes.len() - errors,
            outcomes.len()
        ));
        1
    } else {
        0
    };
    report
}

/// Run a batch end to end and return the process exit code.
pub fn run(opts: &ArxivOptions, fetcher: &dyn Fetcher) -> u8 {
    let outcomes = match arxiv2bib(&opts.ids, fetcher) {
        Ok(outcomes) => outcomes,
        Err(e) => {
            eprintln!("{e}");
            return 2;
        }
    };
    let report = report(&outcomes, opts);
    if !report.output.is_empty() {
        let text = report.output.join("\n");
        if let Err(e) = Store::new(&opts.output).append_text(&text) {
            eprintln!("{e}");
            return 2;
        }
        println!("{text}");
    }
    for message in &report.messages {
        eprintln!("{message}");
    }
    report.code
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <id>http://arxiv.org/api/query-id</id>
  <title type="html">ArXiv Query: id_list=1911.01234</title>
  <updated>2020-01-01T00:00:00-05:00</updated>
  <entry>
    <id>http://arxiv.org/abs/1911.01234v2</id>
    <updated>2019-11-20T10:00:00Z</updated>
    <published>2019-11-04T18:00:00Z</published>
    <title>A Study of
  Widgets</title>
    <summary>  We study widgets &amp; gadgets.
</summary>
    <author><name>John Q. Smith</name></author>
    <author><name>Jane Doe</name></author>
    <arxiv:doi xmlns:arxiv="http://arxiv.org/schemas/atom">10.1000/xyz</arxiv:doi>
    <link title="doi" href="http://dx.doi.org/10.1000/xyz" rel="related"/>
    <arxiv:journal_ref xmlns:arxiv="http://arxiv.org/schemas/atom">J. Widgets 1 (2020)</arxiv:journal_ref>
    <arxiv:primary_category xmlns:arxiv="http://arxiv.org/schemas/atom" term="cs.LG" scheme="http://arxiv.org/schemas/atom"/>
  </entry>
</feed>"#;

    const ERROR_FEED: &str = r#"<feed xmlns="http://www.w3.org/2005/Atom">
  <entry>
    <id>http://arxiv.org/api/errors#incorrect_id_format_for_1234.99999</id>
    <title>Error</title>
    <summary>incorrect id format for 1234.99999</summary>
  </entry>
</feed>"#;

    /// Answers requests in order and records their URLs.
    struct Scripted {
        bodies: RefCell<Vec<&'static str>>,
        urls: RefCell<Vec<String>>,
    }

    impl Scripted {
        fn new(bodies: &[&'static str]) -> Self {
            Self {
                bodies: RefCell::new(bodies.iter().rev().copied().collect()),
                urls: RefCell::new(Vec::new()),
            }
        }
    }

    impl Fetcher for Scripted {
        fn get(&self, url: &Url) -> Result<String> {
            self.urls.borrow_mut().push(url.to_string());
            self.bodies
                .borrow_mut()
                .pop()
                .map(str::to_string)
                .ok_or_else(|| Error::FatalConnection("unexpected request".into()))
        }
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn opts(list: &[&str]) -> ArxivOptions {
        ArxivOptions {
            ids: ids(list),
            comments: false,
            quiet: false,
            verbose: false,
            output: PathBuf::from("arxiv.bib"),
        }
    }

    #[test]
    fn validates_new_and_old_style_ids() {
        for id in ["1201.1213", "1201.12134v3", "hep-th/9901001", "math.AG/0601001v2", "cs/0112017"] {
            assert!(is_valid(id), "{id}");
        }
        for id in ["1201.123", "arXiv:1201.1213", "foo/9901001", "cs.XX/0112017", "hep-th/990100", ""] {
            assert!(!is_valid(id), "{id}");
        }
    }

    #[test]
    fn bare_id_drops_version_only() {
        assert_eq!(bare_id("1911.01234v2"), "1911.01234");
        assert_eq!(bare_id("1911.01234"), "1911.01234");
        assert_eq!(bare_id("hep-th/9901001v1"), "hep-th/9901001");
    }

    #[test]
    fn parses_atom_entry() {
        let entries = parse_feed(FEED).unwrap();
        assert_eq!(entries.len(), 1);
        let Outcome::Found(r) = entries.into_iter().next().unwrap().into_outcome() else {
            panic!("expected a reference");
        };
        assert_eq!(r.id, "1911.01234v2");
        assert_eq!(r.title, "A Study of Widgets");
        assert_eq!(r.summary, "We study widgets & gadgets.");
        assert_eq!(r.authors, vec!["John Q. Smith", "Jane Doe"]);
        assert_eq!(r.category, "cs.LG");
        assert_eq!((r.year.as_str(), r.month.as_str()), ("2019", "Nov"));
        assert_eq!(r.note, "J. Widgets 1 (2020)");
        assert_eq!(r.doi, "10.1000/xyz");
    }

    #[test]
    fn character_and_named_references_are_resolved() {
        let feed = FEED
            .replace("A Study of\n  Widgets", "Caf&#233; &#x41; &lt;Widgets&gt;")
            .replace("Jane Doe", "Jane &#x44;oe");
        let entries = parse_feed(&feed).unwrap();
        assert_eq!(entries[0].title, "Café A <Widgets>");
        assert_eq!(entries[0].authors[1], "Jane Doe");
    }

    #[test]
    fn bibtex_pads_field_names() {
        let r = Reference {
            id: "1911.01234v2".into(),
            url: "http://arxiv.org/abs/1911.01234v2".into(),
            authors: vec!["Ada".into(), "Bob".into()],
            title: "T".into(),
            year: "2019".into(),
            ..Default::default()
        };
        assert_eq!(
            r.bibtex(),
            "@article{1911.01234v2,\n\
             Author        = {Ada and Bob},\n\
             Title         = {T},\n\
             Eprint        = {1911.01234v2},\n\
             ArchivePrefix = {arXiv},\n\
             Year          = {2019},\n\
             Url           = {http://arxiv.org/abs/1911.01234v2},\n\
             File          = {1911.01234v2.pdf}\n}"
        );
    }

    #[test]
    fn published_month_falls_back_to_digits() {
        assert_eq!(published_year_month("2019-13-01"), ("2019".into(), "13".into()));
        assert_eq!(published_year_month("2019"), (String::new(), String::new()));
    }

    #[test]
    fn entry_without_authors_is_no_such_publication() {
        let raw = RawEntry {
            id_url: "http://arxiv.org/abs/1911.00001v1".into(),
            title: "Orphan".into(),
            ..Default::default()
        };
        assert_eq!(
            raw.into_outcome(),
            Outcome::Failed(ReferenceError::new("1911.00001v1", ReferenceError::NO_SUCH_PUBLICATION))
        );
    }

    #[test]
    fn error_placeholders_render_as_comments() {
        let e = ReferenceError::new("x", ReferenceError::INVALID);
        assert_eq!(e.bibtex(), "@comment{x: Invalid arXiv identifier}");
        assert_eq!(e.to_string(), "Error: Invalid arXiv identifier (x)");
    }

    #[test]
    fn resolves_by_bare_id_and_reports_missing() {
        let fetcher = Scripted::new(&[FEED]);
        let out = arxiv2bib(&ids(&["1911.01234", "bogus", "1911.05555"]), &fetcher).unwrap();
        assert_eq!(
            *fetcher.urls.borrow(),
            vec!["http://export.arxiv.org/api/query?id_list=1911.01234%2C1911.05555&max_results=2"]
        );
        assert!(matches!(&out[0], Outcome::Found(r) if r.id == "1911.01234v2"));
        assert_eq!(
            out[1],
            Outcome::Failed(ReferenceError::new("bogus", ReferenceError::INVALID))
        );
        assert_eq!(
            out[2],
            Outcome::Failed(ReferenceError::new("1911.05555", ReferenceError::NOT_FOUND))
        );
    }

    #[test]
    fn rejected_id_is_dropped_and_request_retried() {
        let fetcher = Scripted::new(&[ERROR_FEED, FEED]);
        let out = arxiv2bib(&ids(&["1234.99999", "1911.01234v2"]), &fetcher).unwrap();
        let urls = fetcher.urls.borrow();
        assert_eq!(urls.len(), 2);
        assert!(urls[1].ends_with("id_list=1911.01234v2&max_results=1"));
        assert!(matches!(&out[0], Outcome::Failed(e) if e.message == ReferenceError::NOT_FOUND));
        assert!(matches!(&out[1], Outcome::Found(_)));
    }

    #[test]
    fn empty_feed_is_fatal() {
        let fetcher = Scripted::new(&[r#"<feed xmlns="http://www.w3.org/2005/Atom"></feed>"#]);
        let err = arxiv2bib(&ids(&["1911.01234"]), &fetcher).unwrap_err();
        assert!(matches!(err, Error::FatalConnection(_)));
    }

    #[test]
    fn invalid_ids_need_no_request() {
        let fetcher = Scripted::new(&[]);
        let out = arxiv2bib(&ids(&["nope"]), &fetcher).unwrap();
        assert!(fetcher.urls.borrow().is_empty());
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn tally_sets_exit_code() {
        let found = Outcome::Found(Reference {
            id: "1".into(),
            ..Default::default()
        });
        let failed = Outcome::Failed(ReferenceError::new("2", ReferenceError::NOT_FOUND));

        let all = report(&[found.clone()], &opts(&["1"]));
        assert_eq!(all.code, 0);
        assert!(all.messages.is_empty());

        let partial = report(&[found, failed.clone()], &opts(&["1", "2"]));
        assert_eq!(partial.code, 1);
        assert_eq!(
            partial.messages,
            vec!["Error: Not found (2)", "1 of 2 matched successfully"]
        );

        let none = report(&[failed], &opts(&["2"]));
        assert_eq!(none.code, 2);
        assert_eq!(none.messages.last().map(String::as_str), Some("No successful matches"));
    }

    #[test]
    fn comments_imply_quiet_unless_verbose() {
        let failed = [Outcome::Failed(ReferenceError::new("2", ReferenceError::NOT_FOUND))];
        let mut o = opts(&["2"]);
        o.comments = true;
        let r = report(&failed, &o);
        assert_eq!(r.output, vec!["@comment{2: Not found}"]);
        assert_eq!(r.messages, vec!["No successful matches"]);

        o.verbose = true;
        let r = report(&failed, &o);
        assert_eq!(r.messages.len(), 2);
    }
}
