//! Classifier configuration that extends the base `Config` from core.
//!
//! This configuration includes:
//! - All generic options from `granite_core::Config` (flattened via serde)
//! - A `[classifier]` table with the corpus files, training filters and
//!   scoring pipeline settings
//!
//! # Example
//!
//! ```rust
//! use granite_classifier::{ClassifierConfig, Ensembler};
//!
//! let config = ClassifierConfig::from_toml_str(r#"
//! stemming = false
//!
//! [classifier]
//! training-set = "train.jsonl"
//! ensembler = "mean"
//! "#).unwrap();
//! assert!(!config.base().stemming);
//! assert_eq!(config.pipeline().unwrap().ensembler(), Ensembler::Mean);
//! ```
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use granite_core::{GraniteError, GraniteResult, StopWords};
use serde::{Deserialize, Serialize};

use crate::naive_bayes::{ConditionalBasis, NaiveBayesClassifier};
use crate::patches::TextPatches;
use crate::scoring::{Ensembler, ScoreFilter, ScoringPipeline, StandardDeviationFilter};
use crate::training_set::{SharedWordFilter, TrainingSetBuilder, WordFrequencyTrainingSetFilter};
use crate::training_text::TrainingText;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Base configuration fields (stemming, association mode, stop words)
    #[serde(flatten)]
    pub base: granite_core::Config,

    pub classifier: ClassifierSection,
}

/// Ensembler selection as written in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnsemblerKind {
    #[default]
    MaxValue,
    Mean,
    StandardDeviationGatedMean,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ClassifierSection {
    pub stop_words_set: Option<PathBuf>,
    pub training_set: Option<PathBuf>,
    pub test_set: Option<PathBuf>,
    /// Tab-separated `from<TAB>to` replacements applied before bagging
    pub text_patch_set: Option<PathBuf>,

    /// 0 disables the word frequency filter
    pub min_word_frequency: u64,
    pub train_stop_words: bool,
    /// 0 disables the shared word filter
    pub shared_word_threshold: u64,
    pub conditional_basis: ConditionalBasis,

    // Scoring pipeline
    pub contributor_filter: Option<f64>,
    pub ensembler: EnsemblerKind,
    pub ensembler_deviations: f64,
    pub classification_filter: Option<f64>,
}

impl ClassifierConfig {
    /// Convert this classifier config into the base config
    pub fn into_base(self) -> granite_core::Config {
        self.base
    }

    /// Get a reference to the base config
    pub fn base(&self) -> &granite_core::Config {
        &self.base
    }

    /// Get a mutable reference to the base config
    pub fn base_mut(&mut self) -> &mut granite_core::Config {
        &mut self.base
    }

    /// Load configuration from a TOML file. Relative corpus paths are
    /// resolved against the file's directory.
    pub fn load_toml<P: AsRef<Path>>(path: P) -> GraniteResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&content)?;
        if let Some(dir) = path.parent() {
            config.classifier.resolve_paths(dir);
        }
        Ok(config)
    }

    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> GraniteResult<()> {
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    pub fn from_toml_str(content: &str) -> GraniteResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> GraniteResult<String> {
        toml::to_string_pretty(self).map_err(|e| GraniteError::invalid_argument(e.to_string()))
    }

    /// Inline stop words plus the stop-word file, if configured.
    pub fn stop_words(&self) -> GraniteResult<StopWords> {
        let file = match &self.classifier.stop_words_set {
            Some(path) => StopWords::load(path)?,
            None => StopWords::new(),
        };
        Ok(self.base.stop_words_with(file))
    }

    pub fn text_patches(&self) -> GraniteResult<TextPatches> {
        match &self.classifier.text_patch_set {
            Some(path) => TextPatches::load(path),
            None => Ok(TextPatches::new()),
        }
    }

    /// Contributor filter, ensembler and classification filter as configured.
    pub fn pipeline(&self) -> GraniteResult<ScoringPipeline> {
        let section = &self.classifier;
        let ensembler = match section.ensembler {
            EnsemblerKind::MaxValue => Ensembler::MaxValue,
            EnsemblerKind::Mean => Ensembler::Mean,
            EnsemblerKind::StandardDeviationGatedMean => {
                let deviations = StandardDeviationFilter::new(section.ensembler_deviations)?.deviations();
                Ensembler::StandardDeviationGatedMean { deviations }
            }
        };
        Ok(ScoringPipeline::new(
            deviation_filter(section.contributor_filter)?,
            ensembler,
            deviation_filter(section.classification_filter)?,
        ))
    }

    /// Training set builder with the configured bagger, patches and filters.
    pub fn training_set_builder(&self) -> GraniteResult<TrainingSetBuilder> {
        let section = &self.classifier;
        let mut builder = TrainingSetBuilder::default()
            .bagger(self.base.word_bagger(self.stop_words()?))
            .patches(self.text_patches()?)
            .train_stop_words(section.train_stop_words);
        if section.min_word_frequency > 0 {
            builder = builder.filter(Box::new(WordFrequencyTrainingSetFilter::new(
                section.min_word_frequency,
            )));
        }
        if section.shared_word_threshold > 0 {
            builder = builder.filter(Box::new(SharedWordFilter::new(section.shared_word_threshold)));
        }
        Ok(builder)
    }

    /// Train a classifier on `texts` with everything this config describes.
    pub fn train(&self, texts: &BTreeMap<usize, TrainingText>) -> GraniteResult<NaiveBayesClassifier> {
        let training_set = self.training_set_builder()?.build(texts)?;
        Ok(NaiveBayesClassifier::train(
            training_set,
            self.classifier.conditional_basis,
            self.pipeline()?,
        ))
    }
}

impl ClassifierSection {
    fn resolve_paths(&mut self, dir: &Path) {
        for path in [
            &mut self.stop_words_set,
            &mut self.training_set,
            &mut self.test_set,
            &mut self.text_patch_set,
        ]
        .into_iter()
        .flatten()
        {
            if path.is_relative() {
                *path = dir.join(&*path);
            }
        }
    }
}

fn deviation_filter(deviations: Option<f64>) -> GraniteResult<Option<Box<dyn ScoreFilter>>> {
    deviations
        .map(|k| StandardDeviationFilter::new(k).map(|f| Box::new(f) as Box<dyn ScoreFilter>))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_disable_every_optional_stage() {
        let config = ClassifierConfig::default();
        assert!(config.base().stemming);
        assert_eq!(config.classifier.min_word_frequency, 0);
        assert_eq!(config.classifier.conditional_basis, ConditionalBasis::WordShare);
        assert_eq!(config.pipeline().unwrap().ensembler(), Ensembler::MaxValue);
    }

    #[test]
    fn kebab_case_keys_parse() {
        let config = ClassifierConfig::from_toml_str(
            r#"
strict_association = false
stop_words = ["the"]

[classifier]
stop-words-set = "stop.txt"
test-set = "test.jsonl"
min-word-frequency = 2
train-stop-words = true
shared-word-threshold = 1
conditional-basis = "row-share"
contributor-filter = -0.5
ensembler = "standard-deviation-gated-mean"
ensembler-deviations = 1.5
"#,
        )
        .unwrap();
        assert!(!config.base().strict_association);
        assert!(config.base().stop_words.contains("the"));
        let section = &config.classifier;
        assert_eq!(section.stop_words_set.as_deref(), Some(Path::new("stop.txt")));
        assert_eq!(section.min_word_frequency, 2);
        assert!(section.train_stop_words);
        assert_eq!(section.conditional_basis, ConditionalBasis::RowShare);
        assert_eq!(section.contributor_filter, Some(-0.5));
        assert_eq!(
            config.pipeline().unwrap().ensembler(),
            Ensembler::StandardDeviationGatedMean { deviations: 1.5 }
        );
    }

    #[test]
    fn bad_values_are_reported() {
        assert!(matches!(
            ClassifierConfig::from_toml_str("[classifier]\nensembler = \"median\"\n"),
            Err(GraniteError::Config(_))
        ));
        let mut config = ClassifierConfig::default();
        config.classifier.classification_filter = Some(f64::NAN);
        assert!(matches!(
            config.pipeline(),
            Err(GraniteError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn file_roundtrip_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("classifier.toml");
        let mut config = ClassifierConfig::default();
        config.base_mut().stemming = false;
        config.classifier.training_set = Some(PathBuf::from("train.jsonl"));
        config.classifier.ensembler = EnsemblerKind::Mean;
        config.save_toml(&path).unwrap();

        let loaded = ClassifierConfig::load_toml(&path).unwrap();
        assert!(!loaded.base().stemming);
        assert_eq!(loaded.classifier.ensembler, EnsemblerKind::Mean);
        assert_eq!(
            loaded.classifier.training_set,
            Some(dir.path().join("train.jsonl"))
        );
        assert!(!loaded.into_base().stemming);
    }

    #[test]
    fn stop_word_file_merges_with_inline_words() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stop.txt");
        std::fs::write(&path, "of\n").unwrap();
        let mut config = ClassifierConfig::default();
        config.base.stop_words.insert("the".into());
        config.classifier.stop_words_set = Some(path);
        let stop_words = config.stop_words().unwrap();
        assert!(stop_words.contains("of"));
        assert!(stop_words.contains("the"));
    }
}
