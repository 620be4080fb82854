//! Error types for the conversion run.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a conversion run.
///
/// Input errors always carry the path of the offending file.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// A file or directory could not be read or written.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A document is not well-formed XML.
    #[error("malformed XML in {}: {message}", .path.display())]
    Xml { path: PathBuf, message: String },

    /// A document lacks a structural element.
    #[error("{}: missing <{element}> element", .path.display())]
    MissingElement {
        path: PathBuf,
        element: &'static str,
    },

    /// A node lacks mandatory data or carries an invalid value.
    #[error("malformed node in {}: {source}", .path.display())]
    MalformedNode {
        path: PathBuf,
        source: multitree_core::Error,
    },

    /// The same (id, name) pair appears with different child counts.
    #[error(
        "{}: duplicate node {id} ({name:?}) with {first} and {second} children",
        .path.display()
    )]
    AmbiguousDuplicate {
        path: PathBuf,
        id: String,
        name: String,
        first: usize,
        second: usize,
    },

    /// The Glottolog catalogue could not be loaded.
    #[error("Glottolog catalogue {}: {message}", .path.display())]
    Catalogue { path: PathBuf, message: String },

    /// A tree cites a publication missing from the citation table.
    #[error("{}: unknown citation {citation:?}", .path.display())]
    UnknownCitation { path: PathBuf, citation: String },

    /// The bibliography could not be parsed.
    #[error("bibliography {}: {message}", .path.display())]
    Bibliography { path: PathBuf, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("tree serialization error: {0}")]
    Graph(#[from] multitree_graph::GraphError),
}

impl ConvertError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias for conversion results.
pub type ConvertResult<T> = std::result::Result<T, ConvertError>;
