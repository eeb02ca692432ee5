//! granite-phrases
//!
//! Canonicalises raw phrase text into order-independent identities while
//! remembering every word ordering seen for each identity.
//!
//! Public API:
//! - `PhraseTree` - growable tree with `compute_if_absent`, `get` and `synonym`
//! - `ImmutablePhraseTree` - shareable read-only snapshot
//! - `IdentityPhrase` / `OrderedPhrase` - set and list views of a node path
//! - `maker` - splitting, filtering and ordering of phrase words
pub mod maker;
pub use maker::{OrderPreservedPhraseMaker, PhraseMaker, PhraseRules, SortedPhraseMaker};

pub mod node;
pub use node::PhraseTreeNode;

pub mod phrase;
pub use phrase::{IdentityPhrase, NodeId, OrderedPhrase, Phrase};

pub mod tree;
pub use tree::{ImmutablePhraseTree, PhraseTree, PhraseTreeBuilder};
