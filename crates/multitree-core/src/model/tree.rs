use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::model::language::LanguageId;
use crate::model::node::{NodeField, RawNode};

/// A node in an ordered, rooted tree, labelled with a language identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub label: LanguageId,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    #[must_use]
    pub fn new(label: LanguageId) -> Self {
        Self {
            label,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_child(mut self, child: TreeNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn add_child(&mut self, child: TreeNode) {
        self.children.push(child);
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes in this subtree, including `self`.
    #[must_use]
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(TreeNode::len).sum::<usize>()
    }

    /// Always `false`: a tree has at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Labels in pre-order.
    #[must_use]
    pub fn labels(&self) -> Vec<&LanguageId> {
        let mut out = Vec::with_capacity(self.len());
        self.collect_labels(&mut out);
        out
    }

    fn collect_labels<'a>(&'a self, out: &mut Vec<&'a LanguageId>) {
        out.push(&self.label);
        for child in &self.children {
            child.collect_labels(out);
        }
    }
}

/// One parsed MultiTree document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub description: Option<String>,

    /// Free-text region labels attached to the root.
    pub regions: Vec<String>,

    /// Citation string used to look up bibliographic sources.
    pub publications: Option<String>,

    /// `None` only when the root itself was dropped as a duplicate.
    pub root: Option<TreeNode>,

    /// Every node visited, in document order, duplicates removed.
    pub nodes: Vec<RawNode>,
}

impl Document {
    /// A document with fewer than two nodes carries no relationship and is
    /// excluded from the output.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.root.is_none() || self.nodes.len() < 2
    }

    /// Union of the metadata fields populated on any node.
    #[must_use]
    pub fn populated_fields(&self) -> BTreeSet<NodeField> {
        self.nodes
            .iter()
            .flat_map(RawNode::populated_fields)
            .collect()
    }
}
