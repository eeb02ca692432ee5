//! Labelled training set: bagged rows and the word/label count tables.
//!
//! Counts are per row: a word present in a row labelled `l` adds one to
//! `word_classification_counts[word][l]` however often the text repeats it.
//! The two directions of the count table always agree, and zero counts are
//! never stored.
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use ahash::{AHashMap, AHashSet};
use granite_core::{GraniteError, GraniteResult, PorterWordBagger, StopWords, WordBag, WordBagger};
use tracing::{debug, info, warn};

use crate::patches::TextPatches;
use crate::training_text::TrainingText;

/// `word -> label -> count`
pub type WordClassificationCounts = AHashMap<String, BTreeMap<String, u64>>;

/// `label -> word -> count`
pub type ClassificationWordCounts = BTreeMap<String, AHashMap<String, u64>>;

/// A training row after bagging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaggedText {
    pub id: i64,
    pub classifications: BTreeSet<String>,
    pub bag: WordBag,
}

/// What a filter removes from the count table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterMasks {
    /// Words removed from every label.
    pub words: AHashSet<String>,
    /// `(word, label)` entries removed.
    pub word_classifications: AHashSet<(String, String)>,
}

impl FilterMasks {
    pub fn is_empty(&self) -> bool {
        self.words.is_empty() && self.word_classifications.is_empty()
    }
}

/// Computes removals from the raw counts before they are published.
pub trait TrainingSetFilter: fmt::Debug + Send + Sync {
    fn masks(&self, counts: &WordClassificationCounts) -> FilterMasks;
}

/// Drops `(word, label)` entries seen in fewer than `minimum_frequency` rows.
/// A word losing every entry is dropped globally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordFrequencyTrainingSetFilter {
    minimum_frequency: u64,
}

impl WordFrequencyTrainingSetFilter {
    pub fn new(minimum_frequency: u64) -> Self {
        Self { minimum_frequency }
    }
}

impl TrainingSetFilter for WordFrequencyTrainingSetFilter {
    fn masks(&self, counts: &WordClassificationCounts) -> FilterMasks {
        let mut masks = FilterMasks::default();
        for (word, labels) in counts {
            let low: Vec<&String> = labels
                .iter()
                .filter(|(_, &count)| count < self.minimum_frequency)
                .map(|(label, _)| label)
                .collect();
            if low.len() == labels.len() {
                masks.words.insert(word.clone());
            }
            masks
                .word_classifications
                .extend(low.into_iter().map(|label| (word.clone(), label.clone())));
        }
        info!(
            entries = masks.word_classifications.len(),
            words = masks.words.len(),
            minimum = self.minimum_frequency,
            "word frequency filter"
        );
        masks
    }
}

/// For words shared by several labels, drops each `(word, label)` entry whose
/// count is at most `threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharedWordFilter {
    threshold: u64,
}

impl SharedWordFilter {
    pub fn new(threshold: u64) -> Self {
        Self { threshold }
    }
}

impl TrainingSetFilter for SharedWordFilter {
    fn masks(&self, counts: &WordClassificationCounts) -> FilterMasks {
        let mut masks = FilterMasks::default();
        for (word, labels) in counts.iter().filter(|(_, labels)| labels.len() > 1) {
            for (label, &count) in labels {
                if count <= self.threshold {
                    masks.word_classifications.insert((word.clone(), label.clone()));
                }
            }
        }
        info!(
            entries = masks.word_classifications.len(),
            threshold = self.threshold,
            "shared word filter"
        );
        masks
    }
}

/// Builder for [`TrainingSet`].
pub struct TrainingSetBuilder {
    bagger: Box<dyn WordBagger + Send + Sync>,
    patches: TextPatches,
    train_stop_words: bool,
    filters: Vec<Box<dyn TrainingSetFilter>>,
}

impl Default for TrainingSetBuilder {
    fn default() -> Self {
        Self {
            bagger: Box::new(PorterWordBagger::new(StopWords::new())),
            patches: TextPatches::new(),
            train_stop_words: false,
            filters: Vec::new(),
        }
    }
}

impl TrainingSetBuilder {
    pub fn bagger(mut self, bagger: Box<dyn WordBagger + Send + Sync>) -> Self {
        self.bagger = bagger;
        self
    }

    pub fn patches(mut self, patches: TextPatches) -> Self {
        self.patches = patches;
        self
    }

    /// Turn words tied across labels into training-set stop words and direct
    /// the other shared words to their dominant label.
    pub fn train_stop_words(mut self, enabled: bool) -> Self {
        self.train_stop_words = enabled;
        self
    }

    /// Filters run in the order they are added, each on the counts the
    /// previous one left.
    pub fn filter(mut self, filter: Box<dyn TrainingSetFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn build(self, texts: &BTreeMap<usize, TrainingText>) -> GraniteResult<TrainingSet> {
        if texts.is_empty() {
            return Err(GraniteError::EmptyTrainingSet);
        }

        let mut rows = BTreeMap::new();
        let mut skipped_rows = Vec::new();
        for (&line, text) in texts {
            text.validate()?;
            let bag = self.bagger.bag(&self.patches.apply(&text.text));
            if bag.is_empty() {
                info!(line, id = text.id, "training text bagged to nothing, skipping");
                skipped_rows.push(line);
                continue;
            }
            rows.insert(
                line,
                BaggedText {
                    id: text.id,
                    classifications: text.classifications.clone(),
                    bag,
                },
            );
        }

        let (training_stop_words, word_directions) = if self.train_stop_words {
            let trained = train_stop_words(&rows);
            rows.retain(|&line, row| {
                row.bag.retain(|word| !trained.0.contains(word));
                if row.bag.is_empty() {
                    info!(line, id = row.id, "training text filtered entirely by trained stop words");
                    skipped_rows.push(line);
                }
                !row.bag.is_empty()
            });
            trained
        } else {
            (BTreeSet::new(), BTreeMap::new())
        };
        skipped_rows.sort_unstable();

        if rows.is_empty() {
            return Err(GraniteError::EmptyTrainingSet);
        }

        let mut classification_line_counts: BTreeMap<String, u64> = BTreeMap::new();
        let mut word_classification_counts = WordClassificationCounts::new();
        for row in rows.values() {
            for label in &row.classifications {
                *classification_line_counts.entry(label.clone()).or_default() += 1;
            }
            for word in &row.bag {
                let direction = word_directions.get(word);
                for label in &row.classifications {
                    if direction.is_some_and(|d| d != label) {
                        continue;
                    }
                    *word_classification_counts
                        .entry(word.clone())
                        .or_default()
                        .entry(label.clone())
                        .or_default() += 1;
                }
            }
        }

        for filter in &self.filters {
            let masks = filter.masks(&word_classification_counts);
            apply_masks(&mut word_classification_counts, &masks);
        }

        let mut classification_word_counts = ClassificationWordCounts::new();
        let mut classification_total_word_counts: BTreeMap<String, u64> = BTreeMap::new();
        let mut word_total_counts: AHashMap<String, u64> = AHashMap::new();
        for (word, labels) in &word_classification_counts {
            for (label, &count) in labels {
                classification_word_counts
                    .entry(label.clone())
                    .or_default()
                    .insert(word.clone(), count);
                *classification_total_word_counts.entry(label.clone()).or_default() += count;
                *word_total_counts.entry(word.clone()).or_default() += count;
            }
        }

        let empty_labels: Vec<String> = classification_line_counts
            .keys()
            .filter(|label| !classification_total_word_counts.contains_key(*label))
            .cloned()
            .collect();
        if !empty_labels.is_empty() {
            return Err(GraniteError::OverFiltered {
                labels: empty_labels,
            });
        }

        for (label, _) in classification_line_counts.iter().filter(|(_, &n)| n == 1) {
            warn!(label = %label, "classification has a single training row");
        }

        let training_set_size = rows.len() as u64;
        let training_set_word_count = word_total_counts.values().sum();
        info!(
            rows = training_set_size,
            skipped = skipped_rows.len(),
            labels = classification_line_counts.len(),
            words = word_total_counts.len(),
            "built training set"
        );

        Ok(TrainingSet {
            bagger: self.bagger,
            patches: self.patches,
            training_stop_words,
            word_directions,
            rows,
            skipped_rows,
            classification_line_counts,
            word_classification_counts,
            classification_word_counts,
            classification_total_word_counts,
            word_total_counts,
            training_set_size,
            training_set_word_count,
        })
    }
}

/// Per-label row counts for each word, then stop words for ties at the top
/// and directions for a single dominant label.
fn train_stop_words(
    rows: &BTreeMap<usize, BaggedText>,
) -> (BTreeSet<String>, BTreeMap<String, String>) {
    let mut word_label_rows: AHashMap<&str, BTreeMap<&str, u64>> = AHashMap::new();
    for row in rows.values() {
        for word in &row.bag {
            let labels = word_label_rows.entry(word.as_str()).or_default();
            for label in &row.classifications {
                *labels.entry(label.as_str()).or_default() += 1;
            }
        }
    }

    let mut histogram: BTreeMap<usize, usize> = BTreeMap::new();
    let mut stop_words = BTreeSet::new();
    let mut directions = BTreeMap::new();
    for (word, labels) in &word_label_rows {
        *histogram.entry(labels.len()).or_default() += 1;
        if labels.len() < 2 {
            continue;
        }
        let top = labels.values().copied().max().unwrap_or_default();
        let leaders: Vec<&str> = labels
            .iter()
            .filter(|(_, &count)| count == top)
            .map(|(label, _)| *label)
            .collect();
        match leaders.as_slice() {
            [leader] => {
                directions.insert(word.to_string(), leader.to_string());
            }
            _ => {
                stop_words.insert(word.to_string());
            }
        }
    }

    for (labels, words) in &histogram {
        info!(labels, words, "words by number of classifications");
    }
    info!(
        stop_words = stop_words.len(),
        directed = directions.len(),
        "trained stop words"
    );
    (stop_words, directions)
}

fn apply_masks(counts: &mut WordClassificationCounts, masks: &FilterMasks) {
    if masks.is_empty() {
        return;
    }
    for (word, label) in &masks.word_classifications {
        if let Some(labels) = counts.get_mut(word) {
            labels.remove(label);
        }
    }
    counts.retain(|word, labels| {
        let keep = !labels.is_empty() && !masks.words.contains(word);
        if !keep {
            debug!(word = %word, "filtered from training set");
        }
        keep
    });
}

/// Frozen counts over a labelled corpus, plus the text pipeline that produced
/// its bags so inference text is bagged the same way.
///
/// # Example
/// ```
/// use std::collections::BTreeMap;
/// use granite_classifier::{TrainingSet, TrainingText};
///
/// let texts = BTreeMap::from([
///     (1, TrainingText::new(1, "buy now", ["spam"])),
///     (2, TrainingText::new(2, "meeting tomorrow", ["ham"])),
/// ]);
/// let set = TrainingSet::builder().build(&texts).unwrap();
/// assert_eq!(set.training_set_size(), 2);
/// assert_eq!(set.word_classification_counts()["now"]["spam"], 1);
/// ```
pub struct TrainingSet {
    bagger: Box<dyn WordBagger + Send + Sync>,
    patches: TextPatches,
    training_stop_words: BTreeSet<String>,
    word_directions: BTreeMap<String, String>,
    rows: BTreeMap<usize, BaggedText>,
    skipped_rows: Vec<usize>,
    classification_line_counts: BTreeMap<String, u64>,
    word_classification_counts: WordClassificationCounts,
    classification_word_counts: ClassificationWordCounts,
    classification_total_word_counts: BTreeMap<String, u64>,
    word_total_counts: AHashMap<String, u64>,
    training_set_size: u64,
    training_set_word_count: u64,
}

impl fmt::Debug for TrainingSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrainingSet")
            .field("rows", &self.rows.len())
            .field("skipped_rows", &self.skipped_rows)
            .field("classifications", &self.classification_line_counts)
            .field("words", &self.word_total_counts.len())
            .finish()
    }
}

impl TrainingSet {
    pub fn builder() -> TrainingSetBuilder {
        TrainingSetBuilder::default()
    }

    /// Patch, bag and drop training-set stop words, as done for training rows.
    pub fn bag_text(&self, text: &str) -> WordBag {
        let mut bag = self.bagger.bag(&self.patches.apply(text));
        bag.retain(|word| !self.training_stop_words.contains(word));
        bag
    }

    pub fn rows(&self) -> &BTreeMap<usize, BaggedText> {
        &self.rows
    }

    /// Line numbers of rows dropped because their bag came out empty.
    pub fn skipped_rows(&self) -> &[usize] {
        &self.skipped_rows
    }

    pub fn training_stop_words(&self) -> &BTreeSet<String> {
        &self.training_stop_words
    }

    /// Shared words and the single label they count towards.
    pub fn word_directions(&self) -> &BTreeMap<String, String> {
        &self.word_directions
    }

    pub fn classifications(&self) -> impl Iterator<Item = &str> {
        self.classification_line_counts.keys().map(String::as_str)
    }

    pub fn classification_line_counts(&self) -> &BTreeMap<String, u64> {
        &self.classification_line_counts
    }

    pub fn word_classification_counts(&self) -> &WordClassificationCounts {
        &self.word_classification_counts
    }

    pub fn classification_word_counts(&self) -> &ClassificationWordCounts {
        &self.classification_word_counts
    }

    pub fn classification_total_word_counts(&self) -> &BTreeMap<String, u64> {
        &self.classification_total_word_counts
    }

    pub fn word_total_counts(&self) -> &AHashMap<String, u64> {
        &self.word_total_counts
    }

    /// Rows that survived bagging.
    pub fn training_set_size(&self) -> u64 {
        self.training_set_size
    }

    /// Sum of every `(word, label)` count.
    pub fn training_set_word_count(&self) -> u64 {
        self.training_set_word_count
    }
}

#[cfg(test)]
mod tests {
    use granite_core::SpaceSplitWordBagger;

    use super::*;

    fn texts(rows: &[(&str, &[&str])]) -> BTreeMap<usize, TrainingText> {
        rows.iter()
            .enumerate()
            .map(|(i, (text, labels))| {
                (i + 1, TrainingText::new(i as i64 + 1, *text, labels.iter().copied()))
            })
            .collect()
    }

    fn plain() -> TrainingSetBuilder {
        TrainingSet::builder().bagger(Box::new(SpaceSplitWordBagger::new(
            ["the"].into_iter().collect(),
        )))
    }

    #[test]
    fn counts_are_per_row_and_symmetric() {
        let set = plain()
            .build(&texts(&[
                ("apple apple banana", &["fruit"]),
                ("apple cider", &["fruit", "drink"]),
                ("the", &["drink"]),
            ]))
            .unwrap();

        assert_eq!(set.skipped_rows(), [3]);
        assert_eq!(set.training_set_size(), 2);
        assert_eq!(set.classification_line_counts()["fruit"], 2);
        assert_eq!(set.classification_line_counts()["drink"], 1);
        assert_eq!(set.word_classification_counts()["apple"]["fruit"], 2);
        assert_eq!(set.classification_word_counts()["drink"]["apple"], 1);
        assert_eq!(set.classification_total_word_counts()["fruit"], 4);
        assert_eq!(set.word_total_counts()["apple"], 3);
        assert_eq!(set.training_set_word_count(), 6);
    }

    #[test]
    fn empty_input_and_all_skipped_rows_fail() {
        assert!(matches!(
            plain().build(&BTreeMap::new()),
            Err(GraniteError::EmptyTrainingSet)
        ));
        assert!(matches!(
            plain().build(&texts(&[("the the", &["x"])])),
            Err(GraniteError::EmptyTrainingSet)
        ));
    }

    #[test]
    fn invalid_rows_are_rejected() {
        let texts = BTreeMap::from([(1, TrainingText::new(9, "text", Vec::<String>::new()))]);
        assert!(matches!(
            plain().build(&texts),
            Err(GraniteError::InvalidTrainingRow { .. })
        ));
    }

    #[test]
    fn word_frequency_filter_removes_rare_entries() {
        let set = plain()
            .filter(Box::new(WordFrequencyTrainingSetFilter::new(2)))
            .build(&texts(&[
                ("apple pear", &["fruit"]),
                ("apple kiwi", &["fruit"]),
                ("apple beer", &["fruit", "drink"]),
                ("beer wine", &["drink"]),
            ]))
            .unwrap();
        assert_eq!(set.word_classification_counts().len(), 2);
        assert_eq!(set.word_classification_counts()["apple"].len(), 1);
        assert_eq!(set.word_classification_counts()["beer"]["drink"], 2);
        assert!(!set.word_total_counts().contains_key("kiwi"));
    }

    #[test]
    fn over_filtering_names_the_labels() {
        let err = plain()
            .filter(Box::new(WordFrequencyTrainingSetFilter::new(2)))
            .build(&texts(&[
                ("apple", &["fruit"]),
                ("apple", &["fruit"]),
                ("beer", &["drink"]),
            ]))
            .unwrap_err();
        match err {
            GraniteError::OverFiltered { labels } => assert_eq!(labels, ["drink"]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn shared_word_filter_only_touches_shared_words() {
        let set = plain()
            .filter(Box::new(SharedWordFilter::new(1)))
            .build(&texts(&[
                ("apple juice", &["fruit"]),
                ("apple pie", &["fruit"]),
                ("apple beer", &["drink"]),
            ]))
            .unwrap();
        let apple = &set.word_classification_counts()["apple"];
        assert_eq!(apple.len(), 1);
        assert_eq!(apple["fruit"], 2);
        assert_eq!(set.word_classification_counts()["beer"]["drink"], 1);
    }

    #[test]
    fn trained_stop_words_and_directions() {
        let set = plain()
            .train_stop_words(true)
            .build(&texts(&[
                ("apple shared", &["fruit"]),
                ("apple", &["fruit"]),
                ("apple shared beer", &["drink"]),
            ]))
            .unwrap();

        assert!(set.training_stop_words().contains("shared"));
        assert_eq!(set.word_directions()["apple"], "fruit");
        assert_eq!(set.word_classification_counts()["apple"].len(), 1);
        assert!(!set.word_total_counts().contains_key("shared"));
        assert_eq!(
            set.bag_text("shared apple").into_iter().collect::<Vec<_>>(),
            ["apple"]
        );
    }

    #[test]
    fn patches_apply_before_bagging() {
        let mut patches = TextPatches::new();
        patches.insert("colour", "color");
        let set = plain()
            .patches(patches)
            .build(&texts(&[("colour", &["x"])]))
            .unwrap();
        assert!(set.word_total_counts().contains_key("color"));
        assert!(set.bag_text("the colour").contains("color"));
    }

    #[test]
    fn patches_apply_to_capitalised_inference_text() {
        let patches = TextPatches::from_lines("Colour\tColor\n");
        let set = plain()
            .patches(patches)
            .build(&texts(&[("colour", &["x"])]))
            .unwrap();
        assert_eq!(set.word_total_counts().keys().collect::<Vec<_>>(), ["color"]);
        assert_eq!(set.bag_text("Colour"), set.bag_text("colour"));
        assert!(set.bag_text("COLOUR").contains("color"));
    }
}
