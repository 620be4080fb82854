//! Conversion stages for the MultiTree CLDF dataset.
//!
//! Implements XML parsing, corpus loading, Glottolog reconciliation, and
//! writing (and reading back) the CLDF tables and the combined NEXUS
//! tree file.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod cldf;
pub mod config;
pub mod corpus;
pub mod error;
pub mod glottolog;
pub mod parse;
pub mod pipeline;
pub mod reconcile;
pub mod sources;
pub mod xml;

pub use cldf::CldfDataset;
pub use config::{Config, LoggingConfig, Overrides};
pub use corpus::{load_corpus, Corpus, CorpusTree};
pub use error::{ConvertError, ConvertResult};
pub use glottolog::GlottologCatalogue;
pub use parse::{parse_document, parse_file};
pub use pipeline::{make_cldf, ConversionSummary};
pub use reconcile::{reconcile, GlottologIndex, ReconcileStats, Reconciliation};
pub use sources::{BibEntry, Bibliography, CitationTable, SourceRef};
