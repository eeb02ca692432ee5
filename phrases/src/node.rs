use crate::phrase::NodeId;

/// A word of the phrase tree.
///
/// Nodes live in the tree's arena and refer to their neighbours by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseTreeNode {
    node_id: NodeId,
    stemmed_key: String,
    unstemmed_key: String,
    children: Vec<NodeId>,
    parents: Vec<NodeId>,
}

impl PhraseTreeNode {
    pub(crate) fn new(node_id: NodeId, stemmed_key: String, unstemmed_key: String) -> Self {
        Self {
            node_id,
            stemmed_key,
            unstemmed_key,
            children: Vec::new(),
            parents: Vec::new(),
        }
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    /// The stem this node is keyed by.
    pub fn key(&self) -> &str {
        &self.stemmed_key
    }

    /// The word as first seen, before stemming.
    pub fn unstemmed_key(&self) -> &str {
        &self.unstemmed_key
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parents(&self) -> &[NodeId] {
        &self.parents
    }

    pub(crate) fn add_child(&mut self, child: NodeId) {
        if !self.children.contains(&child) {
            self.children.push(child);
        }
    }

    pub(crate) fn add_parent(&mut self, parent: NodeId) {
        if !self.parents.contains(&parent) {
            self.parents.push(parent);
        }
    }
}
