//! Bayes association model and the naive observation scorer built on it.
//!
//! For every value V and partner A:
//!
//! ```text
//! posterior(V | A) = P(V) · associationLikelihood(A | V) / P(A)
//! ```
//!
//! where `associationLikelihood` is the likelihood form of `assocProb(A | V)`
//! (see [`AssociationStatistics::association_likelihood`]).
use ahash::AHashMap;

use crate::association::AssociationModel;
use crate::error::GraniteResult;
use crate::statistics::{compute_statistics, AssociationStatistics, BayesAssociationStatistics};
use crate::training::{AssociationTrainingSet, AssociationTrainingSetBuilder, TrainingRow, Value};
use crate::Config;

/// Bayes association model.
///
/// # Example
/// ```
/// use granite_core::{AssociationModel, BayesModel, TrainingRow};
///
/// let model = BayesModel::train(vec![
///     TrainingRow::new(1, ["rain", "umbrella"]),
///     TrainingRow::new(2, ["rain", "coat"]),
///     TrainingRow::new(3, ["sun", "hat"]),
/// ]).unwrap();
/// let umbrella = model.mean_probability(&"rain", &["umbrella"]);
/// let hat = model.mean_probability(&"rain", &["hat"]);
/// assert!(umbrella > hat);
/// ```
#[derive(Debug, Clone)]
pub struct BayesModel<V: Value> {
    statistics: AHashMap<V, BayesAssociationStatistics<V>>,
    total_value_frequency: u64,
}

impl<V: Value> BayesModel<V> {
    pub fn build<K>(training_set: &AssociationTrainingSet<K, V>) -> Self {
        let base = compute_statistics(training_set);
        let priors: AHashMap<V, f64> = base
            .iter()
            .map(|(v, s)| (v.clone(), s.probability))
            .collect();

        let statistics = base
            .into_iter()
            .map(|(value, stats)| {
                let posteriors = stats
                    .association_likelihoods()
                    .into_iter()
                    .map(|(partner, likelihood)| {
                        let numerator = stats.probability * likelihood;
                        let partner_prior = priors.get(&partner).copied().unwrap_or(0.0);
                        let posterior = if partner_prior > 0.0 {
                            numerator / partner_prior
                        } else {
                            numerator
                        };
                        (partner, posterior)
                    })
                    .collect();
                let mut bayes = BayesAssociationStatistics::from(stats);
                bayes.associated_value_posterior_probabilities = posteriors;
                (value, bayes)
            })
            .collect();

        Self {
            statistics,
            total_value_frequency: training_set.total_value_frequency(),
        }
    }

    /// Validate rows, build the training set with strict association and
    /// derive the model.
    pub fn train<K: std::fmt::Display>(rows: Vec<TrainingRow<K, V>>) -> GraniteResult<Self> {
        Ok(Self::build(&AssociationTrainingSet::build(rows)?))
    }

    /// As [`Self::train`], with the association settings of `config`.
    pub fn train_with_config<K: std::fmt::Display>(
        rows: Vec<TrainingRow<K, V>>,
        config: &Config,
    ) -> GraniteResult<Self> {
        let training_set = AssociationTrainingSetBuilder::from_config(config)
            .rows(rows)
            .build()?;
        Ok(Self::build(&training_set))
    }

    pub fn bayes_statistics(&self, value: &V) -> Option<&BayesAssociationStatistics<V>> {
        self.statistics.get(value)
    }

    pub fn bayes_association_statistics(&self) -> &AHashMap<V, BayesAssociationStatistics<V>> {
        &self.statistics
    }
}

impl<V: Value> AssociationModel<V> for BayesModel<V> {
    fn statistics(&self, value: &V) -> Option<&AssociationStatistics<V>> {
        self.statistics.get(value).map(|s| &s.statistics)
    }

    fn total_value_frequency(&self) -> u64 {
        self.total_value_frequency
    }

    fn supporting_probabilities(&self, value: &V, context: &[V]) -> AHashMap<V, f64> {
        let Some(value_stats) = self.statistics.get(value) else {
            return AHashMap::new();
        };
        context
            .iter()
            .map(|associated| (associated.clone(), value_stats.posterior(associated)))
            .collect()
    }

    /// The likelihood of V against every other value.
    fn empty_context_probability(&self, value: &V) -> f64 {
        self.statistics
            .get(value)
            .map(|s| s.likelihood())
            .unwrap_or(0.0)
    }
}

/// Scores whole observations against the Bayes statistics.
#[derive(Debug, Clone)]
pub struct NaiveBayesModel<V: Value> {
    model: BayesModel<V>,
}

impl<V: Value> From<BayesModel<V>> for NaiveBayesModel<V> {
    fn from(model: BayesModel<V>) -> Self {
        Self { model }
    }
}

impl<V: Value> NaiveBayesModel<V> {
    pub fn build<K>(training_set: &AssociationTrainingSet<K, V>) -> Self {
        BayesModel::build(training_set).into()
    }

    pub fn train<K: std::fmt::Display>(rows: Vec<TrainingRow<K, V>>) -> GraniteResult<Self> {
        BayesModel::train(rows).map(Self::from)
    }

    pub fn train_with_config<K: std::fmt::Display>(
        rows: Vec<TrainingRow<K, V>>,
        config: &Config,
    ) -> GraniteResult<Self> {
        BayesModel::train_with_config(rows, config).map(Self::from)
    }

    pub fn model(&self) -> &BayesModel<V> {
        &self.model
    }

    /// For each observed value: its likelihood plus the posteriors that every
    /// other observed value assigns to it, divided by the observation size.
    ///
    /// Unknown values are reported with score 0.
    pub fn mean_score_observation(&self, values: &[V]) -> AHashMap<V, f64> {
        let n = values.len() as f64;
        values
            .iter()
            .map(|value| {
                let Some(stats) = self.model.bayes_statistics(value) else {
                    return (value.clone(), 0.0);
                };
                let total = stats.likelihood()
                    + values
                        .iter()
                        .filter(|other| *other != value)
                        .filter_map(|other| self.model.bayes_statistics(other))
                        .map(|other| other.posterior(value))
                        .sum::<f64>();
                (value.clone(), total / n)
            })
            .collect()
    }
}
