//! Normalised bibliography records built from scraped metadata.
//!
//! Records scraped from HTML pages arrive without a provider key, so the key
//! is derived from the year, the authors and the leading title words.

/// One bibliography entry: an entry type plus fields in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    entry_type: String,
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new(entry_type: impl Into<String>) -> Self {
        Self {
            entry_type: entry_type.into(),
            fields: Vec::new(),
        }
    }

    /// Append `value` to `field`. A field seen for the first time keeps its
    /// insertion position; a repeated field has the new text concatenated.
    pub fn add(&mut self, field: &str, value: &str) {
        match self.fields.iter_mut().find(|(name, _)| name == field) {
            Some((_, existing)) => existing.push_str(value),
            None => self.fields.push((field.to_string(), value.to_string())),
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// True when no field carries a non-empty value.
    pub fn is_empty(&self) -> bool {
        self.fields.iter().all(|(_, v)| v.is_empty())
    }

    /// Generate the citation key: year, then the longest token of each author,
    /// then title words up to and including the first one longer than four
    /// characters.
    pub fn generate_key(&self) -> String {
        let mut key = String::new();
        if let Some(year) = self.get("year") {
            key.push_str(year);
        }
        if let Some(authors) = self.get("author") {
            for author in authors.split(" and ") {
                if let Some(name) = longest_token(author) {
                    key.push_str(name);
                }
            }
        }
        if let Some(title) = self.get("title") {
            for word in title.split_whitespace() {
                key.push_str(&title_case(word));
                if word.chars().count() > 4 {
                    break;
                }
            }
        }
        key
    }

    /// Serialise as `@type{key,\nfield={value},...}\n`, omitting empty fields.
    pub fn to_bibtex(&self) -> String {
        let mut out = format!("@{}{{{}", self.entry_type, self.generate_key());
        for (name, value) in self.fields() {
            if value.is_empty() {
                continue;
            }
            out.push_str(",\n");
            out.push_str(name);
            out.push_str("={");
            out.push_str(value);
            out.push('}');
        }
        out.push_str("}\n");
        out
    }
}

// Ties go to the first token reaching the maximum length.
fn longest_token(author: &str) -> Option<&str> {
    let mut best = None;
    let mut best_len = 0;
    for token in author.split_whitespace() {
        let len = token.chars().count();
        if best_len < len {
            best_len = len;
            best = Some(token);
        }
    }
    best.map(|t| t.trim_matches(|c| c == '.' || c == ','))
}

/// Upper-case the first letter of every alphabetic run and lower-case the rest,
/// so `e-mail` becomes `E-Mail` and `WIDGETS` becomes `Widgets`.
fn title_case(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut prev_alpha = false;
    for ch in word.chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Record {
        let mut r = Record::new("misc");
        r.add("year", "2020");
        r.add("author", "John Q. Smith and Jane Doe");
        r.add("title", "A Study of Widgets");
        r
    }

    #[test]
    fn key_uses_longest_author_token_and_leading_title_words() {
        // One token per author, the first of maximal length; not every running maximum.
        // "Smith" beats "John"; "Jane" beats "Doe"; "A" is kept, "Study" ends the title part.
        assert_eq!(sample().generate_key(), "2020SmithJaneAStudy");
    }

    #[test]
    fn longest_token_ties_keep_first_occurrence() {
        let mut r = Record::new("misc");
        r.add("author", "Anna Bert");
        assert_eq!(r.generate_key(), "Anna");
    }

    #[test]
    fn longest_token_strips_punctuation() {
        let mut r = Record::new("misc");
        r.add("author", "Hofstadter, D.");
        assert_eq!(r.generate_key(), "Hofstadter");
    }

    #[test]
    fn title_words_stop_after_first_long_word() {
        let mut r = Record::new("misc");
        r.add("title", "on the WIDGETS of doom");
        assert_eq!(r.generate_key(), "OnTheWidgets");
    }

    #[test]
    fn key_without_fields_is_empty() {
        assert_eq!(Record::new("misc").generate_key(), "");
    }

    #[test]
    fn add_concatenates_repeated_fields_in_place() {
        let mut r = Record::new("misc");
        r.add("title", "Part one");
        r.add("year", "2019");
        r.add("title", ", part two");
        let fields: Vec<_> = r.fields().collect();
        assert_eq!(
            fields,
            vec![("title", "Part one, part two"), ("year", "2019")]
        );
    }

    #[test]
    fn bibtex_omits_empty_fields_and_keeps_order() {
        let mut r = sample();
        r.add("doi", "");
        assert_eq!(
            r.to_bibtex(),
            "@misc{2020SmithJaneAStudy,\nyear={2020},\nauthor={John Q. Smith and Jane Doe},\ntitle={A Study of Widgets}}\n"
        );
    }

    #[test]
    fn serialised_key_is_recovered_by_entry_open_pattern() {
        let r = sample();
        let text = r.to_bibtex();
        let keys = crate::registry::load_known_keys(&text);
        assert_eq!(keys.into_iter().collect::<Vec<_>>(), vec![r.generate_key()]);
    }

    #[test]
    fn title_case_handles_runs() {
        assert_eq!(title_case("e-mail"), "E-Mail");
        assert_eq!(title_case("WIDGETS"), "Widgets");
        assert_eq!(title_case("3d"), "3D");
    }
}
