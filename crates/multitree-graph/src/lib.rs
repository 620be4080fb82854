//! Tree serialization for MultiTree.
//!
//! Renders parsed trees as Newick strings, collects them into a NEXUS
//! `TREES` block, reads that block back, and draws trees as text for the
//! terminal viewer.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod ascii;
pub mod error;
pub mod newick;
pub mod nexus;

pub use ascii::{ascii_art, AsciiStyle};
pub use error::{GraphError, GraphResult};
pub use newick::{parse_newick, NewickNode};
pub use nexus::{read_nexus, write_nexus};
