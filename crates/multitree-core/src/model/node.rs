use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::model::language::LanguageId;
use crate::text::clean_name;

/// The classification MultiTree assigns to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    #[serde(rename = "Dialect Group")]
    DialectGroup,
    Dialect,
    Language,
    #[serde(rename = "Language Subgroup")]
    LanguageSubgroup,
    #[serde(rename = "Macro Code")]
    MacroCode,
    Stock,
    Subgroup,
}

impl NodeType {
    pub const ALL: [Self; 7] = [
        Self::DialectGroup,
        Self::Dialect,
        Self::Language,
        Self::LanguageSubgroup,
        Self::MacroCode,
        Self::Stock,
        Self::Subgroup,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DialectGroup => "Dialect Group",
            Self::Dialect => "Dialect",
            Self::Language => "Language",
            Self::LanguageSubgroup => "Language Subgroup",
            Self::MacroCode => "Macro Code",
            Self::Stock => "Stock",
            Self::Subgroup => "Subgroup",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::UnknownNodeType(s.to_string()))
    }
}

/// Optional metadata slots a MultiTree node may carry.
///
/// Each field knows the XML tag(s) it is read from and the table column it
/// is written to. Values are kept verbatim; `Confidence` and `Sureness` in
/// particular use several encodings for "no data" in the source and are
/// not interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NodeField {
    Comment,
    Geography,
    Status,
    AlternativeNames,
    OtherCodes,
    StartDate,
    EndDate,
    Confidence,
    Sureness,
}

impl NodeField {
    pub const ALL: [Self; 9] = [
        Self::Comment,
        Self::Geography,
        Self::Status,
        Self::AlternativeNames,
        Self::OtherCodes,
        Self::StartDate,
        Self::EndDate,
        Self::Confidence,
        Self::Sureness,
    ];

    /// XML element names this field is read from, in lookup order.
    #[must_use]
    pub const fn tags(self) -> &'static [&'static str] {
        match self {
            Self::Comment => &["pub-comments", "pubcomments"],
            Self::Geography => &["geography"],
            Self::Status => &["status"],
            Self::AlternativeNames => &["alt-names"],
            Self::OtherCodes => &["other-codes"],
            Self::StartDate => &["start-date"],
            Self::EndDate => &["end-date"],
            Self::Confidence => &["confidence"],
            Self::Sureness => &["sureness"],
        }
    }

    /// Column name in the node table.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Comment => "Comment",
            Self::Geography => "Geography",
            Self::Status => "Status",
            Self::AlternativeNames => "Alternative_Names",
            Self::OtherCodes => "Other_Codes",
            Self::StartDate => "Start_Date",
            Self::EndDate => "End_Date",
            Self::Confidence => "Confidence",
            Self::Sureness => "Sureness",
        }
    }
}

impl fmt::Display for NodeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// One node as read from a MultiTree XML document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    /// Source-assigned identifier. Not unique within a document.
    pub id: String,

    /// Primary display name, cleaned of encoding artifacts.
    pub name: String,

    /// The code string as it appears in the source.
    pub raw_codes: String,

    /// Identifier derived from `raw_codes`.
    pub language_id: LanguageId,

    pub node_type: Option<NodeType>,

    metadata: BTreeMap<NodeField, String>,
}

impl RawNode {
    /// Build a node from its mandatory parts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] if the id, the cleaned name or the
    /// code string is empty, naming the node by its id.
    pub fn new(id: impl Into<String>, name: &str, raw_codes: &str) -> Result<Self> {
        let id = id.into().trim().to_string();
        let label = if id.is_empty() {
            String::from("<unknown>")
        } else {
            id.clone()
        };

        if id.is_empty() {
            return Err(Error::MissingField {
                node: label,
                field: "id",
            });
        }

        let cleaned = clean_name(name);
        if cleaned != name.trim() {
            log::debug!("node {label}: removed encoding artifacts from {name:?}");
        }
        let name = cleaned;
        if name.is_empty() {
            return Err(Error::MissingField {
                node: label,
                field: "pri-name",
            });
        }

        if raw_codes.trim().is_empty() {
            return Err(Error::MissingField {
                node: label,
                field: "codes",
            });
        }
        let language_id = LanguageId::normalize(raw_codes).map_err(|_| Error::MissingField {
            node: label.clone(),
            field: "codes",
        })?;

        Ok(Self {
            id,
            name,
            raw_codes: raw_codes.to_string(),
            language_id,
            node_type: None,
            metadata: BTreeMap::new(),
        })
    }

    #[must_use]
    pub fn with_node_type(mut self, node_type: NodeType) -> Self {
        self.node_type = Some(node_type);
        self
    }

    /// Set a metadata field. Blank values are ignored.
    #[must_use]
    pub fn with_field(mut self, field: NodeField, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.trim().is_empty() {
            self.metadata.insert(field, value);
        }
        self
    }

    #[must_use]
    pub fn get(&self, field: NodeField) -> Option<&str> {
        self.metadata.get(&field).map(String::as_str)
    }

    /// Fields that carry a value on this node, in column order.
    pub fn populated_fields(&self) -> impl Iterator<Item = NodeField> + '_ {
        self.metadata.keys().copied()
    }
}
