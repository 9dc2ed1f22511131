//! Streaming scanner for abstract pages that carry no BibTeX export.
//!
//! The page is tokenised into start tags, end tags and text. Elements whose
//! `class` is allowlisted collect their text until the matching end tag, and
//! that text becomes record fields. Text inside `descriptor` spans (labels such
//! as "Authors:") is ignored.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

use url::Url;

use crate::bibtex::Entry;
use crate::error::{Error, Result};
use crate::fetch::Fetcher;
use crate::normalize::{allowlisted, class_fields};
use crate::record::Record;
use crate::store::Store;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    Start {
        name: String,
        attrs: Vec<(String, String)>,
    },
    End {
        name: String,
    },
    Text(Cow<'a, str>),
}

static MARKUP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?s)<!--.*?-->|<![^>]*>|<\?[^>]*>|<(/?)([A-Za-z][A-Za-z0-9:-]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#,
    )
    .unwrap()
});
static ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    // key="value", key='value', key=value or a bare key
    Regex::new(r#"([^\s"'>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))?"#).unwrap()
});

/// Tokeniser over an HTML document. Content of `<script>` and `<style>` is skipped.
pub struct Tokens<'a> {
    html: &'a str,
    pos: usize,
    pending: Option<Token<'a>>,
}

impl<'a> Tokens<'a> {
    pub fn new(html: &'a str) -> Self {
        Self {
            html,
            pos: 0,
            pending: None,
        }
    }

    fn skip_raw_text(&mut self, name: &str) {
        let close = format!("</{name}");
        let rest = &self.html[self.pos..];
        let lower = rest.to_ascii_lowercase();
        self.pos = match lower.find(&close) {
            Some(idx) => self.pos + idx,
            None => self.html.len(),
        };
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        if let Some(tok) = self.pending.take() {
            return Some(tok);
        }
        let html = self.html;
        while self.pos < html.len() {
            let rest = &html[self.pos..];
            let Some(caps) = MARKUP_RE.captures(rest) else {
                self.pos = html.len();
                return Some(Token::Text(decode_entities(rest)));
            };
            let whole = caps.get(0)?;
            let text = &rest[..whole.start()];
            self.pos += whole.end();

            let tag = caps.get(2).map(|name| {
                let name = name.as_str().to_ascii_lowercase();
                if caps.get(1).is_some_and(|slash| !slash.as_str().is_empty()) {
                    Token::End { name }
                } else {
                    let attrs = parse_attrs(caps.get(3).map_or("", |m| m.as_str()));
                    Token::Start { name, attrs }
                }
            });
            if let Some(Token::Start { name, .. }) = &tag
                && (name == "script" || name == "style")
            {
                self.skip_raw_text(name);
            }

            match (text.is_empty(), tag) {
                (true, Some(tag)) => return Some(tag),
                (false, tag) => {
                    self.pending = tag;
                    return Some(Token::Text(decode_entities(text)));
                }
                // Comment or declaration with nothing before it.
                (true, None) => continue,
            }
        }
        None
    }
}

fn parse_attrs(raw: &str) -> Vec<(String, String)> {
    ATTR_RE
        .captures_iter(raw)
        .map(|cap| {
            let key = cap[1].to_ascii_lowercase();
            let value = cap
                .get(2)
                .or_else(|| cap.get(3))
                .or_else(|| cap.get(4))
                .map_or(String::new(), |m| decode_entities(m.as_str()).into_owned());
            (key, value)
        })
        .collect()
}

fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    // A reference outside the HTML5 table leaves the text as it was.
    quick_xml::escape::unescape_with(text, quick_xml::escape::resolve_html5_entity)
        .unwrap_or(Cow::Borrowed(text))
}

struct OpenElement {
    tag: String,
    class: &'static str,
    text: String,
}

/// Collects allowlisted metadata into a [`Record`] as tokens are fed in.
pub struct MetadataScanner {
    record: Record,
    stack: Vec<OpenElement>,
    in_descriptor: bool,
}

impl Default for MetadataScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataScanner {
    pub fn new() -> Self {
        Self {
            record: Record::new("misc"),
            stack: Vec::new(),
            in_descriptor: false,
        }
    }

    pub fn feed(&mut self, token: Token<'_>) {
        match token {
            Token::Start { name, attrs } => {
                for (key, value) in &attrs {
                    if key != "class" {
                        continue;
                    }
                    if let Some(class) = allowlisted(value) {
                        self.stack.push(OpenElement {
                            tag: name.clone(),
                            class,
                            text: String::new(),
                        });
                    }
                    if value == "descriptor" {
                        self.in_descriptor = true;
                    }
                }
            }
            Token::End { name } => {
                if self.in_descriptor && name == "span" {
                    self.in_descriptor = false;
                }
                if self.stack.last().is_some_and(|open| open.tag == name)
                    && let Some(open) = self.stack.pop()
                {
                    for (field, value) in class_fields(open.class, &open.text) {
                        self.record.add(&field, &value);
                    }
                }
            }
            Token::Text(text) => {
                if self.in_descriptor {
                    return;
                }
                if let Some(open) = self.stack.last_mut() {
                    open.text.push_str(&text);
                }
            }
        }
    }

    pub fn finish(self) -> Record {
        self.record
    }
}

/// Scan a whole page and return the record it describes.
pub fn scrape(html: &str) -> Record {
    let mut scanner = MetadataScanner::new();
    for token in Tokens::new(html) {
        scanner.feed(token);
    }
    scanner.finish()
}

/// Fetch one abstract page and append its record to `store` unless an entry
/// with the same generated key is already there. Returns the entry and whether
/// it was written.
pub fn scrape_into(url: &Url, store: &Store, fetcher: &dyn Fetcher) -> Result<(Entry, bool)> {
    let body = fetcher.get(url)?;
    let record = scrape(&body);
    if record.is_empty() {
        return Err(Error::NotFound(url.to_string()));
    }
    let entry = Entry::from_record(&record);
    if store.known_keys()?.contains(&entry.key) {
        return Ok((entry, false));
    }
    store.append(&entry)?;
    Ok((entry, true))
}
