//! granite-classifier crate root
//!
//! Naive Bayes text classification on top of `granite-core`: a labelled
//! training set built from line-delimited JSON, per-word label contributions,
//! and a scoring pipeline that turns them into ranked classifications.
//!
//! Public API exported here:
//! - `TrainingText`, `parse_training_text`, `load_training_text` from `training_text`
//! - `TextPatches` from `patches`
//! - `TrainingSet` and the training-set filters from `training_set`
//! - `NaiveBayesClassifier` and `ConditionalBasis` from `naive_bayes`
//! - `ScoringPipeline`, `Ensembler` and `StandardDeviationFilter` from `scoring`
//! - `ClassifierConfig` from `config`

pub mod config;
pub mod naive_bayes;
pub mod patches;
pub mod scoring;
pub mod training_set;
pub mod training_text;

// Convenience re-exports for common types used by callers.
pub use config::{ClassifierConfig, ClassifierSection, EnsemblerKind};
pub use naive_bayes::{ConditionalBasis, Contributions, NaiveBayesClassifier, NEGLIGIBLE_CONDITIONAL};
pub use patches::TextPatches;
pub use scoring::{
    ClassificationScore, Ensembler, ScoreFilter, ScoringPipeline, StandardDeviationFilter, StringScore,
};
pub use training_set::{
    BaggedText, FilterMasks, SharedWordFilter, TrainingSet, TrainingSetBuilder, TrainingSetFilter,
    WordFrequencyTrainingSetFilter,
};
pub use training_text::{load_training_text, parse_training_text, TrainingText};

pub use granite_core::{GraniteError, GraniteResult};
