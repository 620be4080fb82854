//! Core domain model for the MultiTree CLDF conversion.
//!
//! This crate defines the node and tree model parsed from MultiTree XML,
//! the language-code normalizer that derives language identifiers, the
//! corpus-wide language registry, and the Glottolog languoid types used
//! for reconciliation.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod error;
pub mod model;
pub mod text;

pub use error::{Error, Result};
