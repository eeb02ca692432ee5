//! Scoring pipeline: per-word contributions to ranked classification scores.
//!
//! Three stages, each optional:
//! 1. a contributor filter over each classification's word scores
//! 2. an ensembler collapsing the surviving contributors to one score
//! 3. a classification filter over the per-classification scores
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use granite_core::probability::{mean, standard_deviation};
use granite_core::{GraniteError, GraniteResult};
use serde::{Deserialize, Serialize};

/// A word (or any keyed item) and its score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringScore {
    pub key: String,
    pub score: f64,
}

impl StringScore {
    pub fn new(key: impl Into<String>, score: f64) -> Self {
        Self {
            key: key.into(),
            score,
        }
    }
}

/// The score of one classification together with the words that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationScore {
    pub label: String,
    pub score: f64,
    pub contributors: Vec<StringScore>,
}

/// Selects a subset of scores.
pub trait ScoreFilter: fmt::Debug + Send + Sync {
    /// One flag per input score, `true` for the scores that survive.
    fn keep_mask(&self, scores: &[f64]) -> Vec<bool>;
}

/// Keeps scores strictly greater than `mean + deviations * stdev`.
///
/// A single score never clears its own mean, so with a non-negative
/// multiplier a lone contributor is filtered out.
///
/// # Example
/// ```
/// use granite_classifier::scoring::{ScoreFilter, StandardDeviationFilter};
///
/// let filter = StandardDeviationFilter::new(0.0).unwrap();
/// assert_eq!(filter.keep_mask(&[1.0, 2.0, 6.0]), [false, false, true]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandardDeviationFilter {
    deviations: f64,
}

impl StandardDeviationFilter {
    /// `deviations` may be negative; it must be finite.
    pub fn new(deviations: f64) -> GraniteResult<Self> {
        if !deviations.is_finite() {
            return Err(GraniteError::invalid_argument(format!(
                "standard deviation multiplier must be finite, got {deviations}"
            )));
        }
        Ok(Self { deviations })
    }

    pub fn deviations(&self) -> f64 {
        self.deviations
    }

    fn threshold(&self, scores: &[f64]) -> f64 {
        let mu = mean(scores);
        mu + self.deviations * standard_deviation(scores, mu)
    }
}

impl ScoreFilter for StandardDeviationFilter {
    fn keep_mask(&self, scores: &[f64]) -> Vec<bool> {
        if scores.is_empty() {
            return Vec::new();
        }
        let threshold = self.threshold(scores);
        scores.iter().map(|&s| s > threshold).collect()
    }
}

/// How a classification's contributors collapse to one score.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Ensembler {
    /// The largest contributor.
    #[default]
    MaxValue,
    /// The arithmetic mean of the contributors.
    Mean,
    /// The mean of the contributors above `mean + deviations * stdev`, or of
    /// all contributors when none clear the bar.
    StandardDeviationGatedMean { deviations: f64 },
}

impl Ensembler {
    /// Collapse `scores`. `None` when there is nothing to collapse.
    pub fn ensemble(&self, scores: &[f64]) -> Option<f64> {
        if scores.is_empty() {
            return None;
        }
        let value = match self {
            Ensembler::MaxValue => scores.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Ensembler::Mean => mean(scores),
            Ensembler::StandardDeviationGatedMean { deviations } => {
                let mu = mean(scores);
                let threshold = mu + deviations * standard_deviation(scores, mu);
                let gated: Vec<f64> = scores.iter().copied().filter(|&s| s > threshold).collect();
                if gated.is_empty() {
                    mu
                } else {
                    mean(&gated)
                }
            }
        };
        Some(value)
    }
}

/// Contributor filter, ensembler and classification filter composed in order.
///
/// # Example
/// ```
/// use std::collections::BTreeMap;
/// use granite_classifier::scoring::ScoringPipeline;
///
/// let mut contributions = BTreeMap::new();
/// contributions.insert("spam".to_string(), BTreeMap::from([("buy".to_string(), 0.4)]));
/// contributions.insert("ham".to_string(), BTreeMap::from([("meet".to_string(), 0.7)]));
///
/// let scores = ScoringPipeline::default().score(&contributions);
/// assert_eq!(scores[0].label, "ham");
/// assert_eq!(scores[1].label, "spam");
/// ```
#[derive(Debug, Default)]
pub struct ScoringPipeline {
    contributor_filter: Option<Box<dyn ScoreFilter>>,
    ensembler: Ensembler,
    classification_filter: Option<Box<dyn ScoreFilter>>,
}

impl ScoringPipeline {
    pub fn new(
        contributor_filter: Option<Box<dyn ScoreFilter>>,
        ensembler: Ensembler,
        classification_filter: Option<Box<dyn ScoreFilter>>,
    ) -> Self {
        Self {
            contributor_filter,
            ensembler,
            classification_filter,
        }
    }

    pub fn ensembler(&self) -> Ensembler {
        self.ensembler
    }

    /// Turn `label -> word -> contribution` into classification scores,
    /// highest first. Labels whose contributors are all filtered out are dropped.
    pub fn score(
        &self,
        contributions: &BTreeMap<String, BTreeMap<String, f64>>,
    ) -> Vec<ClassificationScore> {
        let mut classified = Vec::with_capacity(contributions.len());
        for (label, words) in contributions {
            let mut contributors: Vec<StringScore> = words
                .iter()
                .map(|(word, &score)| StringScore::new(word.clone(), score))
                .collect();
            if let Some(filter) = &self.contributor_filter {
                contributors = retain_masked(contributors, filter.as_ref(), |c| c.score);
            }
            let scores: Vec<f64> = contributors.iter().map(|c| c.score).collect();
            if let Some(score) = self.ensembler.ensemble(&scores) {
                classified.push(ClassificationScore {
                    label: label.clone(),
                    score,
                    contributors,
                });
            }
        }

        if let Some(filter) = &self.classification_filter {
            classified = retain_masked(classified, filter.as_ref(), |c| c.score);
        }

        classified.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.label.cmp(&b.label))
        });
        classified
    }
}

fn retain_masked<T>(items: Vec<T>, filter: &dyn ScoreFilter, score: impl Fn(&T) -> f64) -> Vec<T> {
    let scores: Vec<f64> = items.iter().map(&score).collect();
    let mask = filter.keep_mask(&scores);
    items
        .into_iter()
        .zip(mask)
        .filter_map(|(item, keep)| keep.then_some(item))
        .collect()
}
