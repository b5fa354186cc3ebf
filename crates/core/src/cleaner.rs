//! Stopword removal for tag values and filenames.

use crate::models::SENTINEL;
use anyhow::Context;
use regex::Regex;

/// Removes configured noise words from text, case-insensitively and only
/// at word boundaries.
///
/// Stopwords are applied in configuration order. When one stopword is a
/// substring of another the result is order-dependent; removals are
/// otherwise independent deletions.
pub struct StopwordCleaner {
    patterns: Vec<Regex>,
}

impl StopwordCleaner {
    pub fn new(stopwords: &[String]) -> anyhow::Result<Self> {
        let patterns = stopwords
            .iter()
            .map(|word| {
                Regex::new(&format!("(?i){}", regex::escape(word)))
                    .with_context(|| format!("invalid stopword {word:?}"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// The sentinel passes through untouched. After all removals,
    /// consecutive whitespace collapses to single spaces and the ends are
    /// trimmed; an empty result becomes the sentinel.
    pub fn clean(&self, text: &str) -> String {
        if text == SENTINEL {
            return text.to_string();
        }
        let mut cleaned = text.to_string();
        for pattern in &self.patterns {
            cleaned = strip_word_matches(&cleaned, pattern);
        }
        let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            SENTINEL.to_string()
        } else {
            collapsed
        }
    }
}

/// Remove non-overlapping matches that sit on word boundaries on both
/// sides. The regex crate has no lookaround, so the neighbor check is
/// done by hand.
fn strip_word_matches(text: &str, pattern: &Regex) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for m in pattern.find_iter(text) {
        let before_ok = text[..m.start()]
            .chars()
            .next_back()
            .map_or(true, |c| !is_word_char(c));
        let after_ok = text[m.end()..]
            .chars()
            .next()
            .map_or(true, |c| !is_word_char(c));
        if before_ok && after_ok {
            out.push_str(&text[last..m.start()]);
            last = m.end();
        }
    }
    out.push_str(&text[last..]);
    out
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cleaner(words: &[&str]) -> StopwordCleaner {
        let words: Vec<String> = words.iter().map(|w| w.to_string()).collect();
        StopwordCleaner::new(&words).unwrap()
    }

    #[test]
    fn removes_stopwords_case_insensitively() {
        let c = cleaner(&["official", "video"]);
        assert_eq!(c.clean("Song OFFICIAL Video"), "Song");
    }

    #[test]
    fn sentinel_passes_through() {
        let c = cleaner(&["n", "anything"]);
        assert_eq!(c.clean("N"), "N");
    }

    #[test]
    fn empty_input_becomes_sentinel() {
        let c = cleaner(&["x"]);
        assert_eq!(c.clean(""), "N");
    }

    #[test]
    fn fully_removed_text_becomes_sentinel() {
        let c = cleaner(&["official"]);
        assert_eq!(c.clean("official  OFFICIAL"), "N");
    }

    #[test]
    fn no_partial_word_matches() {
        let c = cleaner(&["tall"]);
        assert_eq!(c.clean("Metallica"), "Metallica");
    }

    #[test]
    fn adjacent_occurrences_both_removed() {
        let c = cleaner(&["mix"]);
        assert_eq!(c.clean("mix mix track"), "track");
    }

    #[test]
    fn whitespace_collapses_after_removal() {
        let c = cleaner(&["(Official Video)"]);
        assert_eq!(c.clean("Artist - Song  (Official Video)  "), "Artist - Song");
    }

    #[test]
    fn clean_is_idempotent() {
        let c = cleaner(&["official", "hd", "remaster"]);
        for s in ["A official B  hd", "", "N", "Metallica remastered", "x HD y"] {
            let once = c.clean(s);
            assert_eq!(c.clean(&once), once, "not idempotent for {s:?}");
        }
    }
}
