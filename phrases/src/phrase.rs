//! Phrase identities.
//!
//! A phrase is a path of node ids through a phrase tree. Every phrase carries
//! both views of that path:
//! - `ordered_path`: the node ids in the order the words were seen
//! - `identity_set`: the same ids as a sorted set
//!
//! `IdentityPhrase` compares and hashes by the identity set, so every word
//! ordering of the same words is the same phrase. `OrderedPhrase` compares and
//! hashes by the ordered path.
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use ahash::AHashSet;
use granite_core::{GraniteError, GraniteResult};

/// Opaque id of a phrase tree node, minted on first insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Ordered and sorted views of a node-id path.
#[derive(Debug, Clone, Default)]
struct PhrasePath {
    ordered_path: Vec<NodeId>,
    identity_set: BTreeSet<NodeId>,
}

impl PhrasePath {
    fn of(path: impl IntoIterator<Item = NodeId>) -> Self {
        let ordered_path: Vec<NodeId> = path.into_iter().collect();
        let identity_set = ordered_path.iter().copied().collect();
        Self {
            ordered_path,
            identity_set,
        }
    }
}

/// Operations shared by both phrase variants.
pub trait Phrase {
    fn ordered_path(&self) -> &[NodeId];

    fn identity_set(&self) -> &BTreeSet<NodeId>;

    /// Number of distinct nodes.
    fn len(&self) -> usize {
        self.identity_set().len()
    }

    fn is_empty(&self) -> bool {
        self.identity_set().is_empty()
    }

    /// True when the two ordered paths differ.
    fn diverges_from<P: Phrase + ?Sized>(&self, other: &P) -> bool {
        self.ordered_path() != other.ordered_path()
    }

    /// Whether `self` is a component of `container`.
    fn is_component_of<P: Phrase + ?Sized>(&self, container: &P) -> bool;

    /// Growing prefixes around every anchor of the ordered path.
    ///
    /// For each anchor index the anchor alone is emitted, then the anchor
    /// followed by the remaining items in path order, one more at a time.
    /// Components as long as the phrase itself are left out. Results are
    /// identity phrases in first-seen order without duplicates.
    ///
    /// # Example
    /// ```
    /// use granite_phrases::{Phrase, PhraseTree};
    ///
    /// let mut tree = PhraseTree::new();
    /// let phrase = tree.compute_if_absent("red green blue").unwrap().unwrap();
    /// // {red}, {red green}, {green}, {blue}, {blue red}
    /// assert_eq!(phrase.merge_components().len(), 5);
    /// ```
    fn merge_components(&self) -> Vec<IdentityPhrase> {
        let items = self.ordered_path();
        if items.len() <= 1 {
            return Vec::new();
        }
        let mut seen = AHashSet::new();
        let mut result = Vec::new();
        for (anchor, first) in items.iter().enumerate() {
            let mut component = vec![*first];
            let mut candidates = vec![component.clone()];
            for (index, item) in items.iter().enumerate() {
                if index == anchor {
                    continue;
                }
                component.push(*item);
                candidates.push(component.clone());
            }
            for candidate in candidates {
                if candidate.len() == items.len() {
                    continue;
                }
                let phrase = IdentityPhrase::of(candidate);
                if seen.insert(phrase.clone()) {
                    result.push(phrase);
                }
            }
        }
        result
    }
}

/// Phrase compared by its set of nodes.
///
/// # Example
/// ```
/// use granite_phrases::PhraseTree;
///
/// let mut tree = PhraseTree::new();
/// let a = tree.compute_if_absent("brown fox").unwrap();
/// let b = tree.compute_if_absent("fox brown").unwrap();
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, Default)]
pub struct IdentityPhrase {
    path: PhrasePath,
}

impl IdentityPhrase {
    pub fn of(path: impl IntoIterator<Item = NodeId>) -> Self {
        Self {
            path: PhrasePath::of(path),
        }
    }

    /// Every subset of 1 to `max_component_length` nodes, one phrase each.
    pub fn components(&self, max_component_length: usize) -> GraniteResult<Vec<IdentityPhrase>> {
        let elements = component_elements(&self.path, max_component_length)?;
        let max_length = max_component_length.min(elements.len());
        Ok((1..=max_length)
            .flat_map(|length| combinations(&elements, length))
            .map(IdentityPhrase::of)
            .collect())
    }
}

impl Phrase for IdentityPhrase {
    fn ordered_path(&self) -> &[NodeId] {
        &self.path.ordered_path
    }

    fn identity_set(&self) -> &BTreeSet<NodeId> {
        &self.path.identity_set
    }

    /// Subset test on the identity sets.
    fn is_component_of<P: Phrase + ?Sized>(&self, container: &P) -> bool {
        self.identity_set().is_subset(container.identity_set())
    }
}

impl PartialEq for IdentityPhrase {
    fn eq(&self, other: &Self) -> bool {
        self.path.identity_set == other.path.identity_set
    }
}

impl Eq for IdentityPhrase {}

impl Hash for IdentityPhrase {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.identity_set.hash(state);
    }
}

impl From<&OrderedPhrase> for IdentityPhrase {
    fn from(phrase: &OrderedPhrase) -> Self {
        Self {
            path: phrase.path.clone(),
        }
    }
}

/// Phrase compared by its exact node order.
#[derive(Debug, Clone, Default)]
pub struct OrderedPhrase {
    path: PhrasePath,
}

impl OrderedPhrase {
    pub fn of(path: impl IntoIterator<Item = NodeId>) -> Self {
        Self {
            path: PhrasePath::of(path),
        }
    }

    /// Every ordering of every subset of 1 to `max_component_length` nodes.
    pub fn components(&self, max_component_length: usize) -> GraniteResult<Vec<OrderedPhrase>> {
        let elements = component_elements(&self.path, max_component_length)?;
        let max_length = max_component_length.min(elements.len());
        Ok((1..=max_length)
            .flat_map(|length| combinations(&elements, length))
            .flat_map(|subset| permutations(&subset))
            .map(OrderedPhrase::of)
            .collect())
    }

    /// The container's ordered path restricted to the nodes of `component`,
    /// or `None` when `component` is not part of `container`.
    ///
    /// # Example
    /// ```
    /// use granite_phrases::{OrderedPhrase, PhraseTree};
    ///
    /// let mut tree = PhraseTree::new();
    /// let container = tree.compute_if_absent("quick brown fox").unwrap().unwrap();
    /// let component = tree.compute_if_absent("fox quick").unwrap().unwrap();
    /// let ordered = OrderedPhrase::extract_ordered_component(&component, &container).unwrap();
    /// assert_eq!(tree.phrase_text(&ordered).unwrap(), "quick fox");
    /// ```
    pub fn extract_ordered_component<P: Phrase + ?Sized>(
        component: &IdentityPhrase,
        container: &P,
    ) -> Option<OrderedPhrase> {
        if !component.is_component_of(container) {
            return None;
        }
        let identity = component.identity_set();
        Some(OrderedPhrase::of(
            container
                .ordered_path()
                .iter()
                .copied()
                .filter(|id| identity.contains(id)),
        ))
    }
}

impl Phrase for OrderedPhrase {
    fn ordered_path(&self) -> &[NodeId] {
        &self.path.ordered_path
    }

    fn identity_set(&self) -> &BTreeSet<NodeId> {
        &self.path.identity_set
    }

    /// Ordered sub-sequence test: the nodes of `self` appear in the
    /// container's ordered path in the same relative order, gaps allowed.
    fn is_component_of<P: Phrase + ?Sized>(&self, container: &P) -> bool {
        let path = self.ordered_path();
        if path.len() > container.ordered_path().len() {
            return false;
        }
        let mut remaining = path.iter().peekable();
        for id in container.ordered_path() {
            match remaining.peek() {
                None => break,
                Some(next) if *next == id => {
                    remaining.next();
                }
                Some(_) if self.identity_set().contains(id) => return false,
                Some(_) => {}
            }
        }
        remaining.peek().is_none()
    }
}

impl PartialEq for OrderedPhrase {
    fn eq(&self, other: &Self) -> bool {
        self.path.ordered_path == other.path.ordered_path
    }
}

impl Eq for OrderedPhrase {}

impl Hash for OrderedPhrase {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.ordered_path.hash(state);
    }
}

impl From<&IdentityPhrase> for OrderedPhrase {
    fn from(phrase: &IdentityPhrase) -> Self {
        Self {
            path: phrase.path.clone(),
        }
    }
}

fn component_elements(
    path: &PhrasePath,
    max_component_length: usize,
) -> GraniteResult<Vec<NodeId>> {
    if max_component_length == 0 {
        return Err(GraniteError::invalid_argument(
            "max component length must be at least 1",
        ));
    }
    Ok(path.identity_set.iter().copied().collect())
}

/// All `length`-element subsets of `items`, in index order.
fn combinations(items: &[NodeId], length: usize) -> Vec<Vec<NodeId>> {
    fn walk(
        items: &[NodeId],
        start: usize,
        length: usize,
        current: &mut Vec<NodeId>,
        out: &mut Vec<Vec<NodeId>>,
    ) {
        if current.len() == length {
            out.push(current.clone());
            return;
        }
        let needed = length - current.len();
        for index in start..=items.len().saturating_sub(needed) {
            current.push(items[index]);
            walk(items, index + 1, length, current, out);
            current.pop();
        }
    }

    let mut out = Vec::new();
    if length == 0 || length > items.len() {
        return out;
    }
    walk(items, 0, length, &mut Vec::with_capacity(length), &mut out);
    out
}

/// Every ordering of `items`.
fn permutations(items: &[NodeId]) -> Vec<Vec<NodeId>> {
    if items.len() <= 1 {
        return vec![items.to_vec()];
    }
    let mut out = Vec::new();
    for (index, first) in items.iter().enumerate() {
        let mut rest = items.to_vec();
        rest.remove(index);
        for mut tail in permutations(&rest) {
            tail.insert(0, *first);
            out.push(tail);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u32]) -> Vec<NodeId> {
        raw.iter().map(|&i| NodeId(i)).collect()
    }

    #[test]
    fn identity_phrase_ignores_order() {
        let a = IdentityPhrase::of(ids(&[3, 1, 2]));
        let b = IdentityPhrase::of(ids(&[1, 2, 3]));
        assert_eq!(a, b);
        assert!(a.diverges_from(&b));
        assert_eq!(a.ordered_path(), ids(&[3, 1, 2]).as_slice());
        assert_eq!(a.identity_set().iter().copied().collect::<Vec<_>>(), ids(&[1, 2, 3]));

        let mut set = AHashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn ordered_phrase_respects_order() {
        let a = OrderedPhrase::of(ids(&[3, 1, 2]));
        let b = OrderedPhrase::of(ids(&[1, 2, 3]));
        assert_ne!(a, b);
        assert_eq!(a, OrderedPhrase::of(ids(&[3, 1, 2])));
    }

    #[test]
    fn identity_components_count_combinations() {
        let phrase = IdentityPhrase::of(ids(&[0, 1, 2, 3, 4]));
        assert_eq!(phrase.components(3).unwrap().len(), 5 + 10 + 10);
        assert_eq!(phrase.components(9).unwrap().len(), 31);
        let unique: AHashSet<_> = phrase.components(5).unwrap().into_iter().collect();
        assert_eq!(unique.len(), 31);
    }

    #[test]
    fn ordered_components_count_permutations() {
        let phrase = OrderedPhrase::of(ids(&[0, 1, 2, 3, 4]));
        assert_eq!(phrase.components(3).unwrap().len(), 5 + 20 + 60);
        let unique: AHashSet<_> = phrase.components(3).unwrap().into_iter().collect();
        assert_eq!(unique.len(), 85);
    }

    #[test]
    fn zero_component_length_is_rejected() {
        let phrase = IdentityPhrase::of(ids(&[0, 1]));
        assert!(matches!(
            phrase.components(0),
            Err(GraniteError::InvalidArgument { .. })
        ));
        assert!(OrderedPhrase::from(&phrase).components(0).is_err());
        assert!(IdentityPhrase::default().components(2).unwrap().is_empty());
    }

    #[test]
    fn identity_component_is_subset() {
        let container = IdentityPhrase::of(ids(&[1, 2, 3]));
        assert!(IdentityPhrase::of(ids(&[3, 1])).is_component_of(&container));
        assert!(container.is_component_of(&container));
        assert!(!IdentityPhrase::of(ids(&[1, 4])).is_component_of(&container));
    }

    #[test]
    fn ordered_component_is_subsequence() {
        let container = OrderedPhrase::of(ids(&[1, 2, 3, 4]));
        assert!(OrderedPhrase::of(ids(&[1, 3])).is_component_of(&container));
        assert!(OrderedPhrase::of(ids(&[2, 3, 4])).is_component_of(&container));
        assert!(!OrderedPhrase::of(ids(&[3, 1])).is_component_of(&container));
        assert!(!OrderedPhrase::of(ids(&[1, 5])).is_component_of(&container));
        assert!(!OrderedPhrase::of(ids(&[1, 2, 3, 4, 5])).is_component_of(&container));
        // checked against the container's ordered path, whatever its variant
        let reversed = IdentityPhrase::of(ids(&[4, 3, 2, 1]));
        assert!(!OrderedPhrase::of(ids(&[1, 3])).is_component_of(&reversed));
    }

    #[test]
    fn extract_follows_container_order() {
        let container = IdentityPhrase::of(ids(&[4, 2, 9, 1]));
        let component = IdentityPhrase::of(ids(&[1, 4]));
        let ordered = OrderedPhrase::extract_ordered_component(&component, &container).unwrap();
        assert_eq!(ordered.ordered_path(), ids(&[4, 1]).as_slice());

        let outside = IdentityPhrase::of(ids(&[1, 7]));
        assert!(OrderedPhrase::extract_ordered_component(&outside, &container).is_none());
    }

    #[test]
    fn merge_components_skip_full_length() {
        let phrase = IdentityPhrase::of(ids(&[1, 2, 3]));
        let merged = phrase.merge_components();
        let expected = vec![
            IdentityPhrase::of(ids(&[1])),
            IdentityPhrase::of(ids(&[1, 2])),
            IdentityPhrase::of(ids(&[2])),
            IdentityPhrase::of(ids(&[3])),
            IdentityPhrase::of(ids(&[1, 3])),
        ];
        assert_eq!(merged, expected);
        assert!(IdentityPhrase::of(ids(&[7])).merge_components().is_empty());
    }
}
