pub mod language;
pub mod languoid;
pub mod node;
pub mod registry;
pub mod tree;

pub use language::LanguageId;
pub use languoid::{
    ExternalLanguoid, GlottologMatch, LanguageRecord, MatchKind, MULTITREE_NAMESPACE,
};
pub use node::{NodeField, NodeType, RawNode};
pub use registry::LanguageRegistry;
pub use tree::{Document, TreeNode};
