//! Word bagging: raw text to an unordered, stop-filtered, stemmed token set.
//!
//! Two baggers are provided:
//! - `StemmingWordBagger` (alias `PorterWordBagger`) runs the full pipeline
//!   clean → split → stop-filter → stem → dedupe.
//! - `SpaceSplitWordBagger` skips stemming.
//!
//! Stop words come from a `StopWords` set that can be loaded from a file with
//! one lowercase token per line (`#` starts a comment, blank lines ignored).
use std::collections::BTreeSet;
use std::path::Path;

use ahash::AHashSet;
use tracing::info;

use crate::error::GraniteResult;
use crate::stemmer::{PorterStemmer, Stemmer};
use crate::text::clean_text;

/// An unordered, duplicate-free set of tokens.
pub type WordBag = BTreeSet<String>;

/// Turns raw text into a word bag.
pub trait WordBagger {
    /// Bag `text`. Empty, whitespace-only or all-stop-word text yields an empty bag.
    fn bag(&self, text: &str) -> WordBag;
}

/// A set of lowercase stop words.
#[derive(Debug, Clone, Default)]
pub struct StopWords {
    words: AHashSet<String>,
}

impl StopWords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse stop words from file contents.
    ///
    /// # Example
    /// ```
    /// use granite_core::bagger::StopWords;
    ///
    /// let sw = StopWords::from_lines("the\n# articles above\n\nOf # trailing comment\n");
    /// assert!(sw.contains("the"));
    /// assert!(sw.contains("of"));
    /// assert_eq!(sw.len(), 2);
    /// ```
    pub fn from_lines(content: &str) -> Self {
        let words = content
            .lines()
            .map(|line| line.split('#').next().unwrap_or_default().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    /// Load a stop-word file.
    pub fn load<P: AsRef<Path>>(path: P) -> GraniteResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let result = Self::from_lines(&content);
        info!(count = result.len(), path = %path.display(), "loaded stop words");
        Ok(result)
    }

    pub fn insert(&mut self, word: impl Into<String>) -> bool {
        self.words.insert(word.into().to_lowercase())
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.words.iter()
    }
}

impl<S: Into<String>> FromIterator<S> for StopWords {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut result = Self::new();
        for word in iter {
            result.insert(word);
        }
        result
    }
}

impl<S: Into<String>> Extend<S> for StopWords {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for word in iter {
            self.insert(word);
        }
    }
}

/// Upper bound on re-stemming passes; Porter reaches a fixed point in two or
/// three passes on real words.
const MAX_STEM_PASSES: usize = 8;

/// Full bagging pipeline with a pluggable stemmer.
///
/// Stems are re-stemmed until they stop changing, and stems that are
/// themselves stop words are dropped, so bagging the space-joined bag gives
/// back the same bag.
///
/// # Example
/// ```
/// use granite_core::bagger::{PorterWordBagger, StopWords, WordBagger};
///
/// let bagger = PorterWordBagger::new(["the", "of"].into_iter().collect::<StopWords>());
/// let bag = bagger.bag("The quick jumping brown fox jumped quick over the lazy, lazy dog");
/// let expected = ["brown", "dog", "fox", "jump", "lazi", "over", "quick"];
/// assert_eq!(bag.into_iter().collect::<Vec<_>>(), expected);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StemmingWordBagger<S = PorterStemmer> {
    stop_words: StopWords,
    stemmer: S,
}

/// The reference bagger.
pub type PorterWordBagger = StemmingWordBagger<PorterStemmer>;

impl PorterWordBagger {
    pub fn new(stop_words: StopWords) -> Self {
        Self::with_stemmer(stop_words, PorterStemmer)
    }
}

impl<S: Stemmer> StemmingWordBagger<S> {
    pub fn with_stemmer(stop_words: StopWords, stemmer: S) -> Self {
        Self {
            stop_words,
            stemmer,
        }
    }

    pub fn stop_words(&self) -> &StopWords {
        &self.stop_words
    }

    fn stem_to_fixpoint(&self, word: &str) -> String {
        let mut current = self.stemmer.stem(word);
        for _ in 0..MAX_STEM_PASSES {
            let next = self.stemmer.stem(&current);
            if next == current {
                break;
            }
            current = next;
        }
        current
    }
}

impl<S: Stemmer> WordBagger for StemmingWordBagger<S> {
    fn bag(&self, text: &str) -> WordBag {
        clean_text(text)
            .split_whitespace()
            .filter(|w| !self.stop_words.contains(w))
            .map(|w| self.stem_to_fixpoint(w))
            .filter(|stem| !stem.is_empty() && !self.stop_words.contains(stem))
            .collect()
    }
}

/// Bagger without stemming: clean, split on whitespace, drop stop words.
#[derive(Debug, Clone, Default)]
pub struct SpaceSplitWordBagger {
    stop_words: StopWords,
}

impl SpaceSplitWordBagger {
    pub fn new(stop_words: StopWords) -> Self {
        Self { stop_words }
    }

    pub fn stop_words(&self) -> &StopWords {
        &self.stop_words
    }
}

impl WordBagger for SpaceSplitWordBagger {
    fn bag(&self, text: &str) -> WordBag {
        clean_text(text)
            .split_whitespace()
            .filter(|w| !self.stop_words.contains(w))
            .map(str::to_string)
            .collect()
    }
}

impl<T: WordBagger + ?Sized> WordBagger for Box<T> {
    fn bag(&self, text: &str) -> WordBag {
        (**self).bag(text)
    }
}

impl<T: WordBagger + ?Sized> WordBagger for &T {
    fn bag(&self, text: &str) -> WordBag {
        (**self).bag(text)
    }
}
