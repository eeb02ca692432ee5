//! English stemming.
//!
//! `PorterStemmer` runs the Snowball English (Porter2) algorithm from
//! `rust-stemmers` over ASCII lowercase words. Words containing anything other
//! than ASCII lowercase letters are returned unchanged.
//!
//! Stemmers are used both by the word bagger (single words) and by the phrase
//! tree (whole token lists), so the trait offers both shapes.
use rust_stemmers::{Algorithm, Stemmer as SnowballStemmer};

/// Maps words to their stems.
pub trait Stemmer {
    /// Stem a single word.
    fn stem(&self, word: &str) -> String;

    /// Stem every word of a list. The output has the same length as the input.
    fn stem_all(&self, words: &[String]) -> Vec<String> {
        words.iter().map(|w| self.stem(w)).collect()
    }
}

/// Stemmer that only lowercases.
#[derive(Debug, Clone, Copy, Default)]
pub struct LowercaseStemmer;

impl Stemmer for LowercaseStemmer {
    fn stem(&self, word: &str) -> String {
        word.to_lowercase()
    }
}

/// Porter stemmer.
///
/// # Example
/// ```
/// use granite_core::stemmer::{PorterStemmer, Stemmer};
///
/// let stemmer = PorterStemmer;
/// assert_eq!(stemmer.stem("jumping"), "jump");
/// assert_eq!(stemmer.stem("lazy"), "lazi");
/// assert_eq!(stemmer.stem("relational"), "relat");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PorterStemmer;

impl Stemmer for PorterStemmer {
    fn stem(&self, word: &str) -> String {
        if !word.bytes().all(|c| c.is_ascii_lowercase()) {
            return word.to_string();
        }
        SnowballStemmer::create(Algorithm::English)
            .stem(word)
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stem(word: &str) -> String {
        PorterStemmer.stem(word)
    }

    #[test]
    fn plurals_and_participles() {
        assert_eq!(stem("caresses"), "caress");
        assert_eq!(stem("ponies"), "poni");
        assert_eq!(stem("caress"), "caress");
        assert_eq!(stem("cats"), "cat");
        assert_eq!(stem("feed"), "feed");
        assert_eq!(stem("plastered"), "plaster");
        assert_eq!(stem("motoring"), "motor");
        assert_eq!(stem("sing"), "sing");
        assert_eq!(stem("hopping"), "hop");
        assert_eq!(stem("falling"), "fall");
        assert_eq!(stem("filing"), "file");
    }

    #[test]
    fn terminal_y() {
        assert_eq!(stem("happy"), "happi");
        assert_eq!(stem("say"), "say");
        assert_eq!(stem("lazy"), "lazi");
    }

    #[test]
    fn derivational_suffixes() {
        assert_eq!(stem("relational"), "relat");
        assert_eq!(stem("conditional"), "condit");
        assert_eq!(stem("generalizations"), "general");
        assert_eq!(stem("triplicate"), "triplic");
        assert_eq!(stem("electrical"), "electr");
        assert_eq!(stem("goodness"), "good");
        assert_eq!(stem("adoption"), "adopt");
    }

    #[test]
    fn untouched_words() {
        for word in ["quick", "brown", "fox", "dog", "over", "jump"] {
            assert_eq!(stem(word), word);
        }
        assert_eq!(stem("is"), "is");
        assert_eq!(stem("Café"), "Café");
        assert_eq!(stem("Jumping"), "Jumping");
    }

    #[test]
    fn stem_all_preserves_length() {
        let words: Vec<String> = vec!["jumping".into(), "dogs".into(), "a".into()];
        let stems = PorterStemmer.stem_all(&words);
        assert_eq!(stems, vec!["jump", "dog", "a"]);
    }

    #[test]
    fn lowercase_stemmer_only_lowercases() {
        assert_eq!(LowercaseStemmer.stem("Jumping"), "jumping");
    }
}
