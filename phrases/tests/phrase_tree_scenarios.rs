// Phrase tree canonicalisation and componentisation scenarios.

use granite_phrases::{IdentityPhrase, OrderedPhrase, Phrase, PhraseTree};
use proptest::prelude::*;

fn tree() -> PhraseTree {
    PhraseTree::builder().word_filter(["the"]).build()
}

#[test]
fn reordered_sentences_share_a_canonical_phrase() {
    let mut tree = tree();
    let first = tree
        .compute_if_absent("the quick brown fox jumped over the lazy dog")
        .unwrap()
        .unwrap();
    let second = tree
        .compute_if_absent("the lazy dog jumped over the quick brown fox")
        .unwrap()
        .unwrap();

    assert_eq!(first, second);
    assert!(!first.diverges_from(&second));
    assert_eq!(
        tree.phrase_text(&second).unwrap(),
        "quick brown fox jumped over lazy dog"
    );

    let alternatives = tree.alternative_paths(&first);
    assert_eq!(alternatives.len(), 1);
    assert_eq!(
        tree.phrase_text(&alternatives[0]).unwrap(),
        "lazy dog jumped over quick brown fox"
    );
    assert_eq!(
        tree.identity_phrase_text(&first).unwrap(),
        "brown dog fox jumped lazy over quick"
    );
    assert_eq!(
        tree.synonym("dog lazy over jumped fox brown quick").unwrap(),
        "quick brown fox jumped over lazy dog"
    );
    assert_eq!(tree.synonym("unknown words").unwrap(), "unknown words");
    assert_eq!(
        tree.order_preserved_parts("the lazy dog the lazy"),
        ["lazy", "dog"]
    );
}

#[test]
fn component_counts_for_five_words() {
    let mut tree = tree();
    let phrase = tree
        .compute_if_absent("quick brown fox lazy dog")
        .unwrap()
        .unwrap();
    assert_eq!(phrase.len(), 5);
    assert_eq!(OrderedPhrase::from(&phrase).components(3).unwrap().len(), 85);
    assert_eq!(phrase.components(3).unwrap().len(), 25);
}

#[test]
fn component_maps_cover_known_phrases() {
    let mut tree = tree();
    tree.compute_if_absent("the quick brown fox").unwrap();
    tree.compute_if_absent("the brown quick fox").unwrap();

    let ordered = tree.generate_ordered_component_map(2).unwrap();
    let identity = tree.generate_identity_component_map(2).unwrap();
    assert_eq!(ordered.len(), 9);
    assert_eq!(identity.len(), 6);

    tree.compute_if_absent("lazy fox").unwrap();
    let identity = tree.generate_identity_component_map(1).unwrap();
    let fox = tree.get("fox");
    assert_eq!(fox.unwrap(), None);
    let fox_id = tree.node_by_key("fox").unwrap().node_id();
    let containing = &identity[&IdentityPhrase::of([fox_id])];
    assert_eq!(containing.len(), 2);
    assert!(tree.generate_ordered_component_map(0).is_err());
}

#[test]
fn extracted_components_follow_canonical_order() {
    let mut tree = tree();
    let container = tree
        .compute_if_absent("the quick brown fox jumped")
        .unwrap()
        .unwrap();
    for component in container.components(2).unwrap() {
        let ordered = OrderedPhrase::extract_ordered_component(&component, &container).unwrap();
        assert!(ordered.is_component_of(&container));
        assert!(component.is_component_of(&container));
    }

    let other = tree.compute_if_absent("lazy dog").unwrap().unwrap();
    assert!(OrderedPhrase::extract_ordered_component(&other, &container).is_none());
}

#[test]
fn static_phrases_are_single_nodes() {
    let mut tree = PhraseTree::builder()
        .static_phrases(["New York"])
        .build();
    let phrase = tree.compute_if_absent("new york").unwrap().unwrap();
    assert_eq!(phrase.len(), 1);
    assert_eq!(tree.phrase_text(&phrase).unwrap(), "New York");
    assert_eq!(tree.synonym("NEW YORK").unwrap(), "New York");
}

const VOCABULARY: &[&str] = &["quick", "brown", "fox", "jumped", "over", "lazy", "dog", "red"];

fn reorderings() -> impl Strategy<Value = (Vec<&'static str>, Vec<&'static str>)> {
    prop::sample::subsequence(VOCABULARY.to_vec(), 1..VOCABULARY.len())
        .prop_flat_map(|words| (Just(words.clone()), Just(words).prop_shuffle()))
}

proptest! {
    #[test]
    fn identity_survives_reordering_stop_words_and_duplicates((words, shuffled) in reorderings()) {
        let mut tree = tree();
        let first = tree.compute_if_absent(&words.join(" ")).unwrap().unwrap();

        let mut noisy: Vec<&str> = vec!["the"];
        for word in &shuffled {
            noisy.push(word);
            noisy.push("the");
        }
        noisy.push(shuffled[0]);
        let second = tree.compute_if_absent(&noisy.join(" ")).unwrap().unwrap();

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.ordered_path(), second.ordered_path());
        if words != shuffled {
            prop_assert_eq!(tree.alternative_paths(&first).len(), 1);
        }
    }

    #[test]
    fn component_counts_match_formula(n in 1usize..6, k in 1usize..6) {
        let mut tree = tree();
        let text = VOCABULARY[..n].join(" ");
        let phrase = tree.compute_if_absent(&text).unwrap().unwrap();

        let k_eff = k.min(n);
        let choose = |n: usize, r: usize| (0..r).fold(1usize, |acc, i| acc * (n - i) / (i + 1));
        let arrange = |n: usize, r: usize| (0..r).fold(1usize, |acc, i| acc * (n - i));
        let identity: usize = (1..=k_eff).map(|r| choose(n, r)).sum();
        let ordered: usize = (1..=k_eff).map(|r| arrange(n, r)).sum();

        prop_assert_eq!(phrase.components(k).unwrap().len(), identity);
        prop_assert_eq!(OrderedPhrase::from(&phrase).components(k).unwrap().len(), ordered);
    }
}
