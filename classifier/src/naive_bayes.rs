//! Naive Bayes text classifier over a [`TrainingSet`].
//!
//! Build phase derives label priors `P(L)` and word conditionals `P(W | L)`.
//! Score phase turns each known input word into a per-label contribution
//! `P(L) * likelihood(W, L)` and hands the contribution map to the
//! [`ScoringPipeline`].
use std::collections::BTreeMap;

use ahash::AHashMap;
use granite_core::probability::independent_union;
use granite_core::WordBag;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::scoring::{ClassificationScore, ScoringPipeline};
use crate::training_set::TrainingSet;

/// Conditionals below this are treated as noise and score 0.
pub const NEGLIGIBLE_CONDITIONAL: f64 = 1e-4;

/// Denominator of `P(W | L)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConditionalBasis {
    /// `count(L, W) / total word count of L`
    #[default]
    WordShare,
    /// `rows labelled L containing W / rows labelled L`
    RowShare,
}

/// `label -> word -> contribution`
pub type Contributions = BTreeMap<String, BTreeMap<String, f64>>;

/// A trained classifier. Immutable once built.
///
/// # Example
/// ```
/// use std::collections::BTreeMap;
/// use granite_classifier::{ConditionalBasis, NaiveBayesClassifier, ScoringPipeline, TrainingSet, TrainingText};
///
/// let texts = BTreeMap::from([
///     (1, TrainingText::new(1, "buy now", ["spam"])),
///     (2, TrainingText::new(2, "meeting tomorrow", ["ham"])),
/// ]);
/// let set = TrainingSet::builder().build(&texts).unwrap();
/// let classifier = NaiveBayesClassifier::train(set, ConditionalBasis::RowShare, ScoringPipeline::default());
///
/// let scores = classifier.classify("buy meeting");
/// assert_eq!(scores.len(), 2);
/// assert!((scores[0].score - 0.5).abs() < 1e-12);
/// ```
#[derive(Debug)]
pub struct NaiveBayesClassifier {
    training_set: TrainingSet,
    basis: ConditionalBasis,
    priors: BTreeMap<String, f64>,
    conditionals: AHashMap<String, BTreeMap<String, f64>>,
    pipeline: ScoringPipeline,
}

impl NaiveBayesClassifier {
    pub fn train(training_set: TrainingSet, basis: ConditionalBasis, pipeline: ScoringPipeline) -> Self {
        let size = training_set.training_set_size() as f64;
        let priors: BTreeMap<String, f64> = training_set
            .classification_line_counts()
            .iter()
            .map(|(label, &rows)| (label.clone(), rows as f64 / size))
            .collect();

        let mut conditionals: AHashMap<String, BTreeMap<String, f64>> = AHashMap::new();
        for (word, labels) in training_set.word_classification_counts() {
            let by_label = conditionals.entry(word.clone()).or_default();
            for (label, &count) in labels {
                let denominator = match basis {
                    ConditionalBasis::WordShare => {
                        training_set.classification_total_word_counts().get(label)
                    }
                    ConditionalBasis::RowShare => {
                        training_set.classification_line_counts().get(label)
                    }
                };
                if let Some(&denominator) = denominator.filter(|&&d| d > 0) {
                    by_label.insert(label.clone(), count as f64 / denominator as f64);
                }
            }
        }

        info!(
            labels = priors.len(),
            words = conditionals.len(),
            basis = ?basis,
            "trained naive bayes classifier"
        );

        Self {
            training_set,
            basis,
            priors,
            conditionals,
            pipeline,
        }
    }

    pub fn training_set(&self) -> &TrainingSet {
        &self.training_set
    }

    pub fn basis(&self) -> ConditionalBasis {
        self.basis
    }

    pub fn pipeline(&self) -> &ScoringPipeline {
        &self.pipeline
    }

    /// `P(L)`, 0 for an unknown label.
    pub fn prior(&self, label: &str) -> f64 {
        self.priors.get(label).copied().unwrap_or_default()
    }

    pub fn priors(&self) -> &BTreeMap<String, f64> {
        &self.priors
    }

    /// `P(W | L)`, 0 when the word was never seen with the label.
    pub fn conditional(&self, word: &str, label: &str) -> f64 {
        self.conditionals
            .get(word)
            .and_then(|labels| labels.get(label))
            .copied()
            .unwrap_or_default()
    }

    /// How distinctive `word` is for `label` against the other labels it was
    /// seen with.
    pub fn likelihood(&self, word: &str, label: &str) -> f64 {
        let Some(labels) = self.conditionals.get(word) else {
            return 0.0;
        };
        let Some(&p) = labels.get(label) else {
            return 0.0;
        };
        if p < NEGLIGIBLE_CONDITIONAL {
            return 0.0;
        }
        let others: Vec<f64> = labels
            .iter()
            .filter(|(other, _)| other.as_str() != label)
            .map(|(_, &q)| q)
            .collect();
        match others.as_slice() {
            [] => p,
            [q] => p / q,
            _ => p / independent_union(&others),
        }
    }

    /// Contributions of the words in `bag`. Unknown words contribute nothing.
    pub fn bag_contributions(&self, bag: &WordBag) -> Contributions {
        let mut contributions = Contributions::new();
        for word in bag {
            let Some(labels) = self.conditionals.get(word) else {
                continue;
            };
            for label in labels.keys() {
                let score = self.prior(label) * self.likelihood(word, label);
                contributions
                    .entry(label.clone())
                    .or_default()
                    .insert(word.clone(), score);
            }
        }
        contributions
    }

    /// Bag `text` the way the training rows were bagged, then score it.
    pub fn word_contributions(&self, text: &str) -> Contributions {
        self.bag_contributions(&self.training_set.bag_text(text))
    }

    /// Classification scores for `text`, highest first. Empty when no word of
    /// the text is known.
    pub fn classify(&self, text: &str) -> Vec<ClassificationScore> {
        self.pipeline.score(&self.word_contributions(text))
    }
}
