//! granite-core
//!
//! Statistical substrate shared by the phrase tree and the text classifier.
//!
//! Public API:
//! - `probability` - mean, median, standard deviation, independent union, cosine
//! - `WordBagger` - raw text to a stop-filtered, stemmed token set
//! - `AssociationTrainingSet` - value frequencies and pairwise co-occurrence counts
//! - `AssociationModel` - `FrequencyModel` and `BayesModel` over a training set
//! - `NaiveBayesModel` - whole-observation scoring on the Bayes statistics
//! - `Config` - configuration shared by the downstream crates
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub mod error;
pub use error::{GraniteError, GraniteResult};

pub mod probability;

pub mod stemmer;
pub use stemmer::{LowercaseStemmer, PorterStemmer, Stemmer};

pub mod text;

pub mod bagger;
pub use bagger::{
    PorterWordBagger, SpaceSplitWordBagger, StemmingWordBagger, StopWords, WordBag, WordBagger,
};

pub mod training;
pub use training::{AssociationTrainingSet, AssociationTrainingSetBuilder, TrainingRow, Value};

pub mod statistics;
pub use statistics::{AssociationStatistics, BayesAssociationStatistics};

pub mod association;
pub use association::{AssociationModel, NO_CANDIDATE_SCORE};

pub mod frequency;
pub use frequency::FrequencyModel;

pub mod bayes;
pub use bayes::{BayesModel, NaiveBayesModel};

/// Configuration shared by every granite crate.
///
/// Downstream crates flatten this into their own config so a single TOML file
/// drives the whole workspace.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// When false, a value also counts as co-occurring with itself. Read by
    /// `AssociationTrainingSetBuilder::from_config` and the models'
    /// `train_with_config`.
    pub strict_association: bool,

    /// Porter-stem words in the default bagger.
    pub stemming: bool,

    /// Inline stop words, merged with any stop-word file.
    pub stop_words: BTreeSet<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strict_association: true,
            stemming: true,
            stop_words: BTreeSet::new(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> GraniteResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> GraniteResult<()> {
        let content = self.to_toml_string()?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> GraniteResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml_string(&self) -> GraniteResult<String> {
        toml::to_string_pretty(self).map_err(|e| GraniteError::invalid_argument(e.to_string()))
    }

    /// Inline stop words plus `extra`.
    pub fn stop_words_with(&self, extra: StopWords) -> StopWords {
        let mut words = extra;
        words.extend(self.stop_words.iter().cloned());
        words
    }

    /// The bagger selected by `stemming`, over the inline stop words plus `extra`.
    ///
    /// # Example
    /// ```
    /// use granite_core::{Config, StopWords, WordBagger};
    ///
    /// let mut config = Config::default();
    /// config.stemming = false;
    /// config.stop_words.insert("the".to_string());
    /// let bagger = config.word_bagger(StopWords::new());
    /// let bag = bagger.bag("The jumping fox");
    /// assert_eq!(bag.into_iter().collect::<Vec<_>>(), ["fox", "jumping"]);
    /// ```
    pub fn word_bagger(&self, extra: StopWords) -> Box<dyn WordBagger + Send + Sync> {
        let stop_words = self.stop_words_with(extra);
        if self.stemming {
            Box::new(PorterWordBagger::new(stop_words))
        } else {
            Box::new(SpaceSplitWordBagger::new(stop_words))
        }
    }
}

/// Utility helpers.
pub mod utils {
    /// Normalize input strings (NFC) and trim whitespace.
    pub fn normalize(s: &str) -> String {
        use unicode_normalization::UnicodeNormalization;
        s.nfc().collect::<String>().trim().to_string()
    }
}
