//! Phrase makers: raw text to the word list a phrase is built from.
//!
//! - `SortedPhraseMaker` defines the identity of a phrase: split, drop
//!   filtered words, sort, drop case-insensitive duplicates.
//! - `OrderPreservedPhraseMaker` defines the ordered path: the same steps
//!   without sorting.
//!
//! Static phrases are matched case-insensitively against the whole trimmed
//! text and come back as a single word in their configured spelling.
use std::sync::Arc;

use ahash::{AHashMap, AHashSet};

/// Splits a phrase into words.
pub type Splitter = Arc<dyn Fn(&str) -> Vec<String> + Send + Sync>;

/// Joins words back into phrase text.
pub type Joiner = Arc<dyn Fn(&[String]) -> String + Send + Sync>;

/// Runs of whitespace.
pub fn default_splitter() -> Splitter {
    Arc::new(|text: &str| text.split_whitespace().map(str::to_string).collect())
}

/// A single space.
pub fn default_joiner() -> Joiner {
    Arc::new(|words: &[String]| words.join(" "))
}

pub trait PhraseMaker {
    fn raw_text_to_phrase(&self, raw_text: &str) -> Vec<String>;

    /// The phrase words concatenated without separator.
    fn raw_text_to_corrected_phrase(&self, raw_text: &str) -> String {
        self.raw_text_to_phrase(raw_text).concat()
    }
}

/// Word filter, static phrases and splitter shared by both makers.
#[derive(Clone)]
pub struct PhraseRules {
    word_filter: AHashSet<String>,
    static_phrases: AHashMap<String, String>,
    splitter: Splitter,
}

impl std::fmt::Debug for PhraseRules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhraseRules")
            .field("word_filter", &self.word_filter.len())
            .field("static_phrases", &self.static_phrases.len())
            .finish()
    }
}

impl Default for PhraseRules {
    fn default() -> Self {
        Self::new(Vec::<String>::new(), Vec::<String>::new(), default_splitter())
    }
}

impl PhraseRules {
    pub fn new<W, P>(word_filter: W, static_phrases: P, splitter: Splitter) -> Self
    where
        W: IntoIterator,
        W::Item: AsRef<str>,
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        Self {
            word_filter: word_filter
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .collect(),
            static_phrases: static_phrases
                .into_iter()
                .map(|p| (p.as_ref().to_lowercase(), p.as_ref().to_string()))
                .collect(),
            splitter,
        }
    }

    pub fn is_filtered(&self, word: &str) -> bool {
        self.word_filter.contains(&word.to_lowercase())
    }

    pub fn static_phrase(&self, trimmed: &str) -> Option<&str> {
        self.static_phrases
            .get(&trimmed.to_lowercase())
            .map(String::as_str)
    }

    pub fn word_filter(&self) -> &AHashSet<String> {
        &self.word_filter
    }

    /// Split `raw_text` and drop filtered words, or return the static phrase
    /// it names. `None` for blank text.
    fn words(&self, raw_text: &str) -> Option<Vec<String>> {
        let trimmed = raw_text.trim();
        if trimmed.is_empty() {
            return None;
        }
        if let Some(phrase) = self.static_phrase(trimmed) {
            return Some(vec![phrase.to_string()]);
        }
        Some(
            (self.splitter)(trimmed)
                .into_iter()
                .map(|w| w.trim().to_string())
                .filter(|w| !w.is_empty() && !self.is_filtered(w))
                .collect(),
        )
    }
}

fn dedupe_ignoring_case(words: Vec<String>) -> Vec<String> {
    let mut seen = AHashSet::new();
    words
        .into_iter()
        .filter(|w| seen.insert(w.to_lowercase()))
        .collect()
}

/// Case-insensitively de-duplicated words in case-insensitive order: the
/// identity of a phrase.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use granite_phrases::maker::{PhraseMaker, PhraseRules, SortedPhraseMaker, default_splitter};
///
/// let rules = Arc::new(PhraseRules::new(["the"], Vec::<&str>::new(), default_splitter()));
/// let maker = SortedPhraseMaker::new(rules);
/// assert_eq!(maker.raw_text_to_phrase("the fox and the dog fox"), ["and", "dog", "fox"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SortedPhraseMaker {
    rules: Arc<PhraseRules>,
}

impl SortedPhraseMaker {
    pub fn new(rules: Arc<PhraseRules>) -> Self {
        Self { rules }
    }
}

impl PhraseMaker for SortedPhraseMaker {
    fn raw_text_to_phrase(&self, raw_text: &str) -> Vec<String> {
        let Some(words) = self.rules.words(raw_text) else {
            return Vec::new();
        };
        let mut words = dedupe_ignoring_case(words);
        words.sort_by_cached_key(|w| w.to_lowercase());
        words
    }
}

/// De-duplicated words in first-seen order: the ordered path of a phrase.
#[derive(Debug, Clone, Default)]
pub struct OrderPreservedPhraseMaker {
    rules: Arc<PhraseRules>,
}

impl OrderPreservedPhraseMaker {
    pub fn new(rules: Arc<PhraseRules>) -> Self {
        Self { rules }
    }
}

impl PhraseMaker for OrderPreservedPhraseMaker {
    fn raw_text_to_phrase(&self, raw_text: &str) -> Vec<String> {
        self.rules
            .words(raw_text)
            .map(dedupe_ignoring_case)
            .unwrap_or_default()
    }
}
