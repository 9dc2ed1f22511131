//! Text normalisation for scraped metadata.
//!
//! Free text (abstracts) goes through a three-state machine that turns straight
//! double quotes into LaTeX quote digraphs and drops line-wrap hyphens. Every
//! allowlisted markup class maps onto one or more record fields.

use chrono::Month;
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Main,
    Quote,
    Hyphen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Emit {
    Nothing,
    One(char),
    Two(char, char),
    /// Emit a literal `-`, then run the character again from `Main`.
    HyphenThen(char),
}

fn step(state: State, ch: char) -> (State, Emit) {
    match (state, ch) {
        (State::Main, '"') => (State::Quote, Emit::Two('`', '`')),
        (State::Main, '-') => (State::Hyphen, Emit::Nothing),
        (State::Main, '\n') => (State::Main, Emit::One(' ')),
        (State::Main, c) => (State::Main, Emit::One(c)),
        (State::Quote, '"') => (State::Main, Emit::Two('\'', '\'')),
        (State::Quote, '\n') => (State::Quote, Emit::One(' ')),
        (State::Quote, c) => (State::Quote, Emit::One(c)),
        (State::Hyphen, ' ' | '\n') => (State::Main, Emit::Nothing),
        (State::Hyphen, c) => (State::Main, Emit::HyphenThen(c)),
    }
}

/// Lazy character stream over the quote/hyphen state machine.
pub struct Normalizer<I> {
    input: I,
    state: State,
    queued: Option<char>,
    replay: Option<char>,
}

impl<I: Iterator<Item = char>> Normalizer<I> {
    pub fn new(input: I) -> Self {
        Self {
            input,
            state: State::Main,
            queued: None,
            replay: None,
        }
    }
}

impl<I: Iterator<Item = char>> Iterator for Normalizer<I> {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        loop {
            if let Some(ch) = self.queued.take() {
                return Some(ch);
            }
            // A hyphen still pending at end of input is dropped.
            let ch = self.replay.take().or_else(|| self.input.next())?;
            let (next, emit) = step(self.state, ch);
            self.state = next;
            match emit {
                Emit::Nothing => continue,
                Emit::One(c) => return Some(c),
                Emit::Two(a, b) => {
                    self.queued = Some(b);
                    return Some(a);
                }
                Emit::HyphenThen(c) => {
                    self.replay = Some(c);
                    return Some('-');
                }
            }
        }
    }
}

pub fn normalize_text(text: &str) -> String {
    Normalizer::new(text.chars()).collect()
}

/// Markup classes whose text content becomes record fields.
pub const CLASS_ALLOWLIST: &[&str] = &[
    "title mathjax",
    "authors",
    "abstract mathjax",
    "tablecell comments",
    "tablecell arxivid",
    "tablecell subjects",
    "tablecell jref",
    "tablecell doi",
    "tablecell report-number",
    "tablecell msc-classes",
    "tablecell acm-classes",
];

pub fn allowlisted(class: &str) -> Option<&'static str> {
    CLASS_ALLOWLIST.iter().copied().find(|c| *c == class)
}

static ARXIV_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:arXiv:)?((\d\d)(\d\d)\.\d+)").unwrap());

/// Turn the text captured for one markup class into `(field, value)` pairs.
pub fn class_fields(class: &str, text: &str) -> Vec<(String, String)> {
    match class {
        "title mathjax" => vec![("title".into(), text.trim_matches('\n').to_string())],
        "authors" => vec![(
            "author".into(),
            text.trim_matches('\n').replace(',', " and "),
        )],
        "abstract mathjax" => vec![("abstract".into(), normalize_text(text.trim()))],
        _ => match class.strip_prefix("tablecell ") {
            Some("arxivid") => arxivid_fields(text),
            Some("doi") => vec![
                ("doi".into(), text.to_string()),
                ("doi-url".into(), format!("http://dx.doi.org/{text}")),
            ],
            Some(name) => vec![(name.to_string(), text.to_string())],
            None => Vec::new(),
        },
    }
}

fn arxivid_fields(text: &str) -> Vec<(String, String)> {
    let mut fields = vec![("eprint".to_string(), text.to_string())];
    let Some(caps) = ARXIV_ID_RE.captures(text.trim()) else {
        warn!("arXiv id cell {text:?} has an unexpected format; keeping eprint only");
        return fields;
    };
    fields.push(("url".into(), format!("http://arxiv.org/abs/{}", &caps[1])));
    fields.push(("year".into(), format!("20{}", &caps[2])));
    if let Some(month) = month_abbr(&caps[3]) {
        fields.push(("month".into(), month));
    }
    fields
}

fn month_abbr(digits: &str) -> Option<String> {
    let n: u8 = digits.parse().ok()?;
    let month = Month::try_from(n).ok()?;
    Some(month.name()[..3].to_string())
}
