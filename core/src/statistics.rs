//! Per-value association statistics shared by the frequency and Bayes models.
use std::borrow::Borrow;
use std::hash::Hash;

use ahash::AHashMap;

use crate::probability::{independent_union, independent_union_excluding, is_negligible};
use crate::training::{AssociationTrainingSet, Value};

/// Probability, likelihood and partner probabilities of a single value.
#[derive(Debug, Clone)]
pub struct AssociationStatistics<V: Value> {
    pub value: V,
    /// `freq(V) / N`
    pub probability: f64,
    /// `probability / independent_union(probability of every other value)`
    pub likelihood: f64,
    /// Occurrences of the value across all rows.
    pub frequency: u64,
    /// Sum of co-occurrence counts over all partners.
    pub association_frequency: u64,
    /// `assocProb(A | V)` for every partner A.
    pub associated_value_probabilities: AHashMap<V, f64>,
}

impl<V: Value> AssociationStatistics<V> {
    pub fn new(value: V, probability: f64, frequency: u64) -> Self {
        Self {
            value,
            probability,
            likelihood: 0.0,
            frequency,
            association_frequency: 0,
            associated_value_probabilities: AHashMap::new(),
        }
    }

    /// `assocProb(partner | value)`, if the two were ever seen together.
    pub fn association_probability<Q>(&self, partner: &Q) -> Option<f64>
    where
        V: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.associated_value_probabilities.get(partner).copied()
    }

    /// Likelihood form of the partner conditional:
    /// `assocProb(key | V) / independent_union(assocProb(X | V), X != key)`.
    ///
    /// Unknown partners and negligible probabilities give 0. With no other
    /// partner, or a zero union, the conditional itself is returned.
    pub fn association_likelihood<Q>(&self, key: &Q) -> f64
    where
        V: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(p) = self.association_probability(key) else {
            return 0.0;
        };
        if is_negligible(p) {
            return 0.0;
        }
        let others: Vec<f64> = self
            .associated_value_probabilities
            .iter()
            .filter(|(partner, _)| <V as Borrow<Q>>::borrow(*partner) != key)
            .map(|(_, q)| *q)
            .collect();
        likelihood_ratio(p, others.len(), independent_union(&others))
    }

    /// Association likelihood of every partner at once.
    pub fn association_likelihoods(&self) -> AHashMap<V, f64> {
        let (partners, ps): (Vec<&V>, Vec<f64>) = self
            .associated_value_probabilities
            .iter()
            .map(|(v, p)| (v, *p))
            .unzip();
        let unions = independent_union_excluding(&ps);
        partners
            .into_iter()
            .zip(ps.iter().zip(unions))
            .map(|(partner, (p, union))| {
                let l = if is_negligible(*p) {
                    0.0
                } else {
                    likelihood_ratio(*p, ps.len() - 1, union)
                };
                (partner.clone(), l)
            })
            .collect()
    }
}

fn likelihood_ratio(p: f64, others: usize, union: f64) -> f64 {
    if others == 0 || union <= 0.0 {
        p
    } else {
        p / union
    }
}

/// Association statistics plus Bayes posteriors `posterior(V | A)`.
#[derive(Debug, Clone)]
pub struct BayesAssociationStatistics<V: Value> {
    pub statistics: AssociationStatistics<V>,
    /// `posterior(V | A)` for every partner A of V.
    pub associated_value_posterior_probabilities: AHashMap<V, f64>,
}

impl<V: Value> From<AssociationStatistics<V>> for BayesAssociationStatistics<V> {
    fn from(statistics: AssociationStatistics<V>) -> Self {
        Self {
            statistics,
            associated_value_posterior_probabilities: AHashMap::new(),
        }
    }
}

impl<V: Value> BayesAssociationStatistics<V> {
    pub fn value(&self) -> &V {
        &self.statistics.value
    }

    pub fn probability(&self) -> f64 {
        self.statistics.probability
    }

    pub fn likelihood(&self) -> f64 {
        self.statistics.likelihood
    }

    pub fn association_likelihood<Q>(&self, key: &Q) -> f64
    where
        V: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.statistics.association_likelihood(key)
    }

    /// `posterior(V | given)`, 0 when the two never co-occurred.
    pub fn posterior<Q>(&self, given: &Q) -> f64
    where
        V: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.associated_value_posterior_probabilities
            .get(given)
            .copied()
            .unwrap_or(0.0)
    }
}

/// Derive priors, partner probabilities and likelihoods for every value of a
/// training set.
pub fn compute_statistics<K, V: Value>(
    training_set: &AssociationTrainingSet<K, V>,
) -> AHashMap<V, AssociationStatistics<V>> {
    let total = training_set.total_value_frequency() as f64;
    let mut result: AHashMap<V, AssociationStatistics<V>> = AHashMap::new();
    if total <= 0.0 {
        return result;
    }

    for (value, frequency) in training_set.value_frequencies() {
        let mut stats =
            AssociationStatistics::new(value.clone(), *frequency as f64 / total, *frequency);
        if let Some(partners) = training_set.value_to_value_frequencies().get(value) {
            let association_frequency: u64 = partners.values().sum();
            stats.association_frequency = association_frequency;
            if association_frequency > 0 {
                stats.associated_value_probabilities = partners
                    .iter()
                    .map(|(partner, count)| {
                        (partner.clone(), *count as f64 / association_frequency as f64)
                    })
                    .collect();
            }
        }
        result.insert(value.clone(), stats);
    }

    let (values, probabilities): (Vec<V>, Vec<f64>) = result
        .iter()
        .map(|(v, s)| (v.clone(), s.probability))
        .unzip();
    let unions = independent_union_excluding(&probabilities);
    for ((value, p), union) in values.iter().zip(&probabilities).zip(unions) {
        if let Some(stats) = result.get_mut(value) {
            stats.likelihood = likelihood_ratio(*p, values.len() - 1, union);
        }
    }
    result
}
