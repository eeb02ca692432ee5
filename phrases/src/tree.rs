//! The phrase tree: raw text to canonical, order-independent phrases.
//!
//! Nodes are keyed by stem and stored in an arena indexed by `NodeId`.
//! `known_paths` maps every identity to the first ordering seen for it;
//! later orderings of the same words are kept in `alternative_paths`.
use std::ops::Deref;
use std::sync::Arc;

use ahash::AHashMap;
use granite_core::{GraniteError, GraniteResult, LowercaseStemmer, Stemmer};
use tracing::debug;

use crate::maker::{
    default_joiner, default_splitter, Joiner, OrderPreservedPhraseMaker, PhraseMaker,
    PhraseRules, SortedPhraseMaker, Splitter,
};
use crate::node::PhraseTreeNode;
use crate::phrase::{IdentityPhrase, NodeId, OrderedPhrase, Phrase};

/// Stemming applied to the sorted words of a phrase.
pub type SharedStemmer = Arc<dyn Stemmer + Send + Sync>;

/// Builder for [`PhraseTree`].
///
/// Defaults: no word filter, no static phrases, lowercase-only stemming,
/// whitespace splitting and single-space joining.
pub struct PhraseTreeBuilder {
    word_filter: Vec<String>,
    static_phrases: Vec<String>,
    stemmer: SharedStemmer,
    splitter: Splitter,
    joiner: Joiner,
}

impl Default for PhraseTreeBuilder {
    fn default() -> Self {
        Self {
            word_filter: Vec::new(),
            static_phrases: Vec::new(),
            stemmer: Arc::new(LowercaseStemmer),
            splitter: default_splitter(),
            joiner: default_joiner(),
        }
    }
}

impl PhraseTreeBuilder {
    pub fn word_filter<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.word_filter.extend(words.into_iter().map(Into::into));
        self
    }

    pub fn static_phrases<I, S>(mut self, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.static_phrases
            .extend(phrases.into_iter().map(Into::into));
        self
    }

    pub fn stemmer<S: Stemmer + Send + Sync + 'static>(mut self, stemmer: S) -> Self {
        self.stemmer = Arc::new(stemmer);
        self
    }

    pub fn splitter<F>(mut self, splitter: F) -> Self
    where
        F: Fn(&str) -> Vec<String> + Send + Sync + 'static,
    {
        self.splitter = Arc::new(splitter);
        self
    }

    pub fn joiner<F>(mut self, joiner: F) -> Self
    where
        F: Fn(&[String]) -> String + Send + Sync + 'static,
    {
        self.joiner = Arc::new(joiner);
        self
    }

    pub fn build(self) -> PhraseTree {
        let rules = Arc::new(PhraseRules::new(
            self.word_filter,
            self.static_phrases,
            self.splitter,
        ));
        PhraseTree {
            sorted_maker: SortedPhraseMaker::new(rules.clone()),
            order_preserved_maker: OrderPreservedPhraseMaker::new(rules),
            stemmer: self.stemmer,
            joiner: self.joiner,
            nodes: AHashMap::new(),
            nodes_by_id: Vec::new(),
            known_paths: AHashMap::new(),
            alternative_paths: AHashMap::new(),
        }
    }
}

/// Growable phrase tree.
///
/// # Example
/// ```
/// use granite_phrases::PhraseTree;
///
/// let mut tree = PhraseTree::builder().word_filter(["the"]).build();
/// let first = tree.compute_if_absent("the quick brown fox").unwrap().unwrap();
/// let second = tree.compute_if_absent("brown fox the quick").unwrap().unwrap();
/// assert_eq!(first, second);
/// assert_eq!(tree.phrase_text(&second).unwrap(), "quick brown fox");
/// assert_eq!(tree.synonym("fox quick brown").unwrap(), "quick brown fox");
/// ```
#[derive(Clone)]
pub struct PhraseTree {
    sorted_maker: SortedPhraseMaker,
    order_preserved_maker: OrderPreservedPhraseMaker,
    stemmer: SharedStemmer,
    joiner: Joiner,
    nodes: AHashMap<String, NodeId>,
    nodes_by_id: Vec<PhraseTreeNode>,
    known_paths: AHashMap<IdentityPhrase, IdentityPhrase>,
    alternative_paths: AHashMap<IdentityPhrase, Vec<IdentityPhrase>>,
}

impl std::fmt::Debug for PhraseTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhraseTree")
            .field("nodes", &self.nodes_by_id.len())
            .field("known_paths", &self.known_paths.len())
            .field("alternative_paths", &self.alternative_paths.len())
            .finish()
    }
}

impl Default for PhraseTree {
    fn default() -> Self {
        PhraseTreeBuilder::default().build()
    }
}

/// Sorted words of a phrase with their stems.
struct PhraseWords {
    sorted: Vec<String>,
    stems: Vec<String>,
}

impl PhraseTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> PhraseTreeBuilder {
        PhraseTreeBuilder::default()
    }

    /// Insert the phrase for `raw_text` if its identity is new and return the
    /// canonical phrase for that identity.
    ///
    /// Returns `None` when the text is blank or only holds filtered words.
    pub fn compute_if_absent(&mut self, raw_text: &str) -> GraniteResult<Option<IdentityPhrase>> {
        let Some(words) = self.phrase_words(raw_text)? else {
            return Ok(None);
        };

        let mut ids = AHashMap::with_capacity(words.sorted.len());
        let mut parent: Option<NodeId> = None;
        for (unstemmed, stem) in words.sorted.iter().zip(&words.stems) {
            let id = self.node_for(stem, unstemmed);
            ids.insert(unstemmed.to_lowercase(), id);
            if let Some(parent) = parent.filter(|p| *p != id) {
                self.nodes_by_id[parent.index()].add_child(id);
                self.nodes_by_id[id.index()].add_parent(parent);
            }
            parent = Some(id);
        }

        let phrase = IdentityPhrase::of(self.ordered_path(raw_text, &ids, words.sorted.len())?);
        let known = self
            .known_paths
            .entry(phrase.clone())
            .or_insert_with(|| phrase.clone())
            .clone();
        if known.diverges_from(&phrase) {
            let alternatives = self.alternative_paths.entry(known.clone()).or_default();
            if !alternatives.iter().any(|p| !p.diverges_from(&phrase)) {
                debug!(
                    "recorded alternative ordering for phrase of {} words",
                    phrase.len()
                );
                alternatives.push(phrase);
            }
        }
        Ok(Some(known))
    }

    /// The canonical phrase for `raw_text` if every one of its words is
    /// already in the tree. Never modifies the tree.
    pub fn get(&self, raw_text: &str) -> GraniteResult<Option<IdentityPhrase>> {
        let Some(words) = self.phrase_words(raw_text)? else {
            return Ok(None);
        };
        let mut ids = AHashMap::with_capacity(words.sorted.len());
        for (unstemmed, stem) in words.sorted.iter().zip(&words.stems) {
            let Some(id) = self.nodes.get(stem) else {
                return Ok(None);
            };
            ids.insert(unstemmed.to_lowercase(), *id);
        }
        let phrase = IdentityPhrase::of(self.ordered_path(raw_text, &ids, words.sorted.len())?);
        Ok(self.known_paths.get(&phrase).cloned())
    }

    /// Canonical phrase text for `raw_text`, or `raw_text` itself when the
    /// phrase is unknown.
    pub fn synonym(&self, raw_text: &str) -> GraniteResult<String> {
        match self.get(raw_text)? {
            Some(phrase) => self.phrase_text(&phrase),
            None => Ok(raw_text.to_string()),
        }
    }

    /// Unstemmed words of the ordered path, joined.
    pub fn phrase_text<P: Phrase + ?Sized>(&self, phrase: &P) -> GraniteResult<String> {
        self.join_nodes(phrase.ordered_path().iter())
    }

    /// Unstemmed words of the identity set in node order, joined.
    pub fn identity_phrase_text<P: Phrase + ?Sized>(&self, phrase: &P) -> GraniteResult<String> {
        self.join_nodes(phrase.identity_set().iter())
    }

    /// Order-preserved words of `raw_text` without touching the tree.
    pub fn order_preserved_parts(&self, raw_text: &str) -> Vec<String> {
        self.order_preserved_maker.raw_text_to_phrase(raw_text)
    }

    /// Unstemmed words along the ordered path of `phrase`; ids unknown to
    /// this tree are skipped.
    pub fn phrase_parts<P: Phrase + ?Sized>(&self, phrase: &P) -> Vec<String> {
        phrase
            .ordered_path()
            .iter()
            .filter_map(|id| self.node(*id))
            .map(|node| node.unstemmed_key().to_string())
            .collect()
    }

    /// Every ordered component of every known phrase, mapped to the known
    /// phrases containing it.
    pub fn generate_ordered_component_map(
        &self,
        max_component_length: usize,
    ) -> GraniteResult<AHashMap<OrderedPhrase, Vec<IdentityPhrase>>> {
        let mut result: AHashMap<OrderedPhrase, Vec<IdentityPhrase>> = AHashMap::new();
        for phrase in self.known_paths.keys() {
            for component in OrderedPhrase::from(phrase).components(max_component_length)? {
                result.entry(component).or_default().push(phrase.clone());
            }
        }
        Ok(result)
    }

    /// Every identity component of every known phrase, mapped to the known
    /// phrases containing it.
    pub fn generate_identity_component_map(
        &self,
        max_component_length: usize,
    ) -> GraniteResult<AHashMap<IdentityPhrase, Vec<IdentityPhrase>>> {
        let mut result: AHashMap<IdentityPhrase, Vec<IdentityPhrase>> = AHashMap::new();
        for phrase in self.known_paths.keys() {
            for component in phrase.components(max_component_length)? {
                result.entry(component).or_default().push(phrase.clone());
            }
        }
        Ok(result)
    }

    pub fn node(&self, id: NodeId) -> Option<&PhraseTreeNode> {
        self.nodes_by_id.get(id.index())
    }

    pub fn node_by_key(&self, stem: &str) -> Option<&PhraseTreeNode> {
        self.nodes.get(stem).and_then(|id| self.node(*id))
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(PhraseTreeNode::children).unwrap_or(&[])
    }

    pub fn parents(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(PhraseTreeNode::parents).unwrap_or(&[])
    }

    pub fn known_paths(&self) -> impl Iterator<Item = &IdentityPhrase> {
        self.known_paths.values()
    }

    /// Orderings seen for the identity of `phrase` other than its canonical one.
    pub fn alternative_paths(&self, phrase: &IdentityPhrase) -> &[IdentityPhrase] {
        self.alternative_paths
            .get(phrase)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes_by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes_by_id.is_empty()
    }

    /// Read-only snapshot of the current state.
    pub fn snapshot(&self) -> ImmutablePhraseTree {
        ImmutablePhraseTree::from(self.clone())
    }

    /// Freeze the tree.
    pub fn freeze(self) -> ImmutablePhraseTree {
        ImmutablePhraseTree::from(self)
    }

    fn phrase_words(&self, raw_text: &str) -> GraniteResult<Option<PhraseWords>> {
        let sorted = self.sorted_maker.raw_text_to_phrase(raw_text);
        if sorted.is_empty() {
            return Ok(None);
        }
        let stems = self.stemmer.stem_all(&sorted);
        if stems.len() != sorted.len() {
            return Err(GraniteError::StemmingContract {
                expected: sorted.len(),
                actual: stems.len(),
            });
        }
        Ok(Some(PhraseWords { sorted, stems }))
    }

    /// Node ids of the order-preserved words, de-duplicated where two words
    /// share a stem.
    fn ordered_path(
        &self,
        raw_text: &str,
        ids: &AHashMap<String, NodeId>,
        expected: usize,
    ) -> GraniteResult<Vec<NodeId>> {
        let words = self.order_preserved_maker.raw_text_to_phrase(raw_text);
        if words.len() != expected {
            return Err(GraniteError::corrupt(format!(
                "ordered path has {} words, sorted phrase has {}",
                words.len(),
                expected
            )));
        }
        let mut path = Vec::with_capacity(words.len());
        for word in &words {
            let id = ids
                .get(&word.to_lowercase())
                .copied()
                .ok_or_else(|| GraniteError::corrupt(format!("no node for word '{word}'")))?;
            if !path.contains(&id) {
                path.push(id);
            }
        }
        Ok(path)
    }

    fn node_for(&mut self, stem: &str, unstemmed: &str) -> NodeId {
        if let Some(id) = self.nodes.get(stem) {
            return *id;
        }
        let id = NodeId(self.nodes_by_id.len() as u32);
        self.nodes_by_id
            .push(PhraseTreeNode::new(id, stem.to_string(), unstemmed.to_string()));
        self.nodes.insert(stem.to_string(), id);
        id
    }

    fn join_nodes<'a>(&self, ids: impl Iterator<Item = &'a NodeId>) -> GraniteResult<String> {
        let words = ids
            .map(|id| {
                self.node(*id)
                    .map(|node| node.unstemmed_key().to_string())
                    .ok_or_else(|| GraniteError::corrupt(format!("unknown node id {id} in path")))
            })
            .collect::<GraniteResult<Vec<_>>>()?;
        Ok((self.joiner)(&words))
    }
}

/// Read-only view of a phrase tree. Cheap to clone and share across threads.
///
/// All read operations of [`PhraseTree`] are available through `Deref`.
#[derive(Debug, Clone)]
pub struct ImmutablePhraseTree {
    tree: Arc<PhraseTree>,
}

impl From<PhraseTree> for ImmutablePhraseTree {
    fn from(tree: PhraseTree) -> Self {
        Self {
            tree: Arc::new(tree),
        }
    }
}

impl ImmutablePhraseTree {
    /// Always fails: the tree cannot grow.
    pub fn compute_if_absent(&self, _raw_text: &str) -> GraniteResult<Option<IdentityPhrase>> {
        Err(GraniteError::ImmutablePhraseTree)
    }
}

impl Deref for ImmutablePhraseTree {
    type Target = PhraseTree;

    fn deref(&self) -> &PhraseTree {
        &self.tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use granite_core::PorterStemmer;

    struct DroppingStemmer;

    impl Stemmer for DroppingStemmer {
        fn stem(&self, word: &str) -> String {
            word.to_string()
        }

        fn stem_all(&self, words: &[String]) -> Vec<String> {
            words.iter().skip(1).cloned().collect()
        }
    }

    #[test]
    fn get_does_not_insert() {
        let mut tree = PhraseTree::new();
        assert_eq!(tree.get("quick fox").unwrap(), None);
        assert!(tree.is_empty());
        tree.compute_if_absent("quick fox").unwrap();
        assert_eq!(tree.len(), 2);
        assert!(tree.get("fox quick").unwrap().is_some());
        assert_eq!(tree.get("fox quick lazy").unwrap(), None);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn blank_and_filtered_text_yield_nothing() {
        let mut tree = PhraseTree::builder().word_filter(["the", "a"]).build();
        assert_eq!(tree.compute_if_absent("   ").unwrap(), None);
        assert_eq!(tree.compute_if_absent("the a the").unwrap(), None);
        assert_eq!(tree.get("").unwrap(), None);
        assert_eq!(tree.synonym("the").unwrap(), "the");
    }

    #[test]
    fn stemming_contract_is_enforced() {
        let mut tree = PhraseTree::builder().stemmer(DroppingStemmer).build();
        match tree.compute_if_absent("quick brown fox") {
            Err(GraniteError::StemmingContract { expected, actual }) => {
                assert_eq!(expected, 3);
                assert_eq!(actual, 2);
            }
            other => panic!("expected stemming contract error, got {other:?}"),
        }
    }

    #[test]
    fn stems_share_nodes() {
        let mut tree = PhraseTree::builder().stemmer(PorterStemmer).build();
        let jumped = tree.compute_if_absent("fox jumped").unwrap().unwrap();
        let jumping = tree.compute_if_absent("jumping fox").unwrap().unwrap();
        assert_eq!(jumped, jumping);
        assert_eq!(tree.len(), 2);
        // the first spelling seen is kept
        assert_eq!(tree.node_by_key("jump").unwrap().unstemmed_key(), "jumped");
        assert_eq!(tree.phrase_text(&jumping).unwrap(), "fox jumped");
        assert_eq!(tree.synonym("jumps fox").unwrap(), "fox jumped");
    }

    #[test]
    fn words_with_the_same_stem_collapse() {
        let mut tree = PhraseTree::builder().stemmer(PorterStemmer).build();
        let phrase = tree.compute_if_absent("jump jumping").unwrap().unwrap();
        assert_eq!(phrase.len(), 1);
        assert_eq!(phrase.ordered_path().len(), 1);
    }

    #[test]
    fn nodes_are_linked_in_sorted_order() {
        let mut tree = PhraseTree::new();
        tree.compute_if_absent("fox brown").unwrap();
        let brown = tree.node_by_key("brown").unwrap().node_id();
        let fox = tree.node_by_key("fox").unwrap().node_id();
        assert_eq!(tree.children(brown), &[fox]);
        assert_eq!(tree.parents(fox), &[brown]);
        assert!(tree.parents(brown).is_empty());
        assert!(tree.children(NodeId(99)).is_empty());
    }

    #[test]
    fn unknown_node_ids_are_corrupt() {
        let tree = PhraseTree::new();
        let phrase = IdentityPhrase::of([NodeId(3)]);
        assert!(matches!(
            tree.phrase_text(&phrase),
            Err(GraniteError::CorruptPhraseTree { .. })
        ));
        assert!(tree.identity_phrase_text(&phrase).is_err());
        assert!(tree.phrase_parts(&phrase).is_empty());
    }

    #[test]
    fn custom_joiner_and_identity_text() {
        let mut tree = PhraseTree::builder()
            .joiner(|words: &[String]| words.join("_"))
            .build();
        let phrase = tree.compute_if_absent("zebra apple mango").unwrap().unwrap();
        assert_eq!(tree.phrase_text(&phrase).unwrap(), "zebra_apple_mango");
        // node ids are minted in sorted word order
        assert_eq!(tree.identity_phrase_text(&phrase).unwrap(), "apple_mango_zebra");
        assert_eq!(tree.phrase_parts(&phrase), ["zebra", "apple", "mango"]);
    }

    #[test]
    fn repeated_ordering_is_recorded_once() {
        let mut tree = PhraseTree::new();
        let canonical = tree.compute_if_absent("a b").unwrap().unwrap();
        tree.compute_if_absent("b a").unwrap();
        tree.compute_if_absent("b a").unwrap();
        tree.compute_if_absent("a b").unwrap();
        assert_eq!(tree.alternative_paths(&canonical).len(), 1);
        assert_eq!(tree.known_paths().count(), 1);
    }

    #[test]
    fn immutable_tree_rejects_inserts() {
        let mut tree = PhraseTree::new();
        tree.compute_if_absent("quick fox").unwrap();
        let frozen = tree.snapshot();
        tree.compute_if_absent("lazy dog").unwrap();

        assert!(matches!(
            frozen.compute_if_absent("lazy dog"),
            Err(GraniteError::ImmutablePhraseTree)
        ));
        assert!(frozen.get("fox quick").unwrap().is_some());
        assert_eq!(frozen.get("lazy dog").unwrap(), None);
        assert_eq!(frozen.len(), 2);
        assert_eq!(tree.freeze().len(), 4);
    }

    #[test]
    fn immutable_tree_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ImmutablePhraseTree>();
    }
}
