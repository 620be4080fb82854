//! MultiTree XML document parsing.
//!
//! A document looks like
//!
//! ```xml
//! <multitree>
//!   <tree>
//!     <description>...</description>
//!     <root>
//!       <id>1</id><pri-name>...</pri-name><codes>...</codes>
//!       <node-type>Stock</node-type>
//!       <region>...</region>
//!       <publications>...</publications>
//!       <children><child>...</child></children>
//!     </root>
//!   </tree>
//! </multitree>
//! ```
//!
//! where every `child` has the same shape as `root`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use multitree_core::model::{Document, NodeField, NodeType, RawNode, TreeNode};

use crate::error::{ConvertError, ConvertResult};
use crate::xml::Element;

const CHILD_PATH: [&str; 2] = ["children", "child"];

/// Read and parse one MultiTree file.
pub fn parse_file(path: &Path) -> ConvertResult<Document> {
    let xml = std::fs::read_to_string(path).map_err(|e| ConvertError::io(path, e))?;
    parse_document(&xml, path)
}

/// Parse one MultiTree document. `origin` is only used in error messages.
pub fn parse_document(xml: &str, origin: &Path) -> ConvertResult<Document> {
    let doc = Element::parse(xml).map_err(|message| ConvertError::Xml {
        path: origin.to_path_buf(),
        message,
    })?;

    let tree = if doc.name == "tree" {
        &doc
    } else {
        doc.find("tree").ok_or_else(|| ConvertError::MissingElement {
            path: origin.to_path_buf(),
            element: "tree",
        })?
    };
    let root = tree
        .find("root")
        .ok_or_else(|| ConvertError::MissingElement {
            path: origin.to_path_buf(),
            element: "root",
        })?;

    let mut builder = TreeBuilder::new(origin);
    let root_node = builder.build(root)?;

    Ok(Document {
        description: tree.child_text("description").map(str::to_string),
        regions: root
            .find_all("region")
            .map(|e| e.text.clone())
            .filter(|t| !t.is_empty())
            .collect(),
        publications: root.child_text("publications").map(str::to_string),
        root: root_node,
        nodes: builder.into_nodes(),
    })
}

/// Recursive tree construction with per-document duplicate detection.
///
/// Nodes are identified by their `(id, name)` pair. A pair seen a second
/// time with the same number of children is a repeated copy and is
/// dropped together with its subtree; with a different number of children
/// the document is inconsistent and parsing fails.
#[derive(Debug)]
pub struct TreeBuilder {
    origin: PathBuf,
    seen: HashMap<(String, String), usize>,
    nodes: Vec<RawNode>,
}

impl TreeBuilder {
    #[must_use]
    pub fn new(origin: &Path) -> Self {
        Self {
            origin: origin.to_path_buf(),
            seen: HashMap::new(),
            nodes: Vec::new(),
        }
    }

    /// Build the subtree rooted at `element`.
    ///
    /// Returns `Ok(None)` when `element` is a dropped duplicate.
    pub fn build(&mut self, element: &Element) -> ConvertResult<Option<TreeNode>> {
        let node = raw_node(element).map_err(|source| ConvertError::MalformedNode {
            path: self.origin.clone(),
            source,
        })?;
        let children = element.find_path(&CHILD_PATH);

        let key = (node.id.clone(), node.name.clone());
        if let Some(&first) = self.seen.get(&key) {
            if first == children.len() {
                log::debug!(
                    "{}: dropping repeated node {} ({})",
                    self.origin.display(),
                    node.id,
                    node.name
                );
                return Ok(None);
            }
            return Err(ConvertError::AmbiguousDuplicate {
                path: self.origin.clone(),
                id: node.id,
                name: node.name,
                first,
                second: children.len(),
            });
        }
        self.seen.insert(key, children.len());

        let mut tree = TreeNode::new(node.language_id.clone());
        self.nodes.push(node);

        for child in children {
            if let Some(subtree) = self.build(child)? {
                tree.add_child(subtree);
            }
        }
        Ok(Some(tree))
    }

    /// The nodes visited so far, in document order.
    #[must_use]
    pub fn into_nodes(self) -> Vec<RawNode> {
        self.nodes
    }
}

fn raw_node(element: &Element) -> multitree_core::Result<RawNode> {
    let mut node = RawNode::new(
        element.child_text("id").unwrap_or_default(),
        element.child_text("pri-name").unwrap_or_default(),
        element.child_text("codes").unwrap_or_default(),
    )?;

    if let Some(raw_type) = element.child_text("node-type") {
        let node_type = raw_type.parse::<NodeType>().map_err(|e| {
            multitree_core::Error::InvalidData(format!("node {}: {e}", node.id))
        })?;
        node = node.with_node_type(node_type);
    }

    for field in NodeField::ALL {
        if let Some(value) = field.tags().iter().find_map(|tag| element.child_text(tag)) {
            node = node.with_field(field, value);
        }
    }
    Ok(node)
}
