//! Corpus loading: every tree in the raw directory, in numeric order.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use multitree_core::model::{Document, LanguageRegistry, NodeField, TreeNode};

use crate::error::{ConvertError, ConvertResult};
use crate::parse::{parse_document, parse_file};

/// A retained (non-degenerate) tree.
#[derive(Debug, Clone)]
pub struct CorpusTree {
    /// Numeric file stem.
    pub id: u64,
    pub path: PathBuf,
    pub document: Document,
    /// Union of metadata fields populated on any node of this tree.
    pub node_metadata: BTreeSet<NodeField>,
}

impl CorpusTree {
    /// Root of the tree. Retained trees always have one.
    #[must_use]
    pub fn root(&self) -> Option<&TreeNode> {
        self.document.root.as_ref()
    }
}

/// Everything read from the raw directory.
#[derive(Debug, Default)]
pub struct Corpus {
    /// Retained trees in ascending id order.
    pub trees: Vec<CorpusTree>,
    /// Display names observed per language, across all retained trees.
    pub registry: LanguageRegistry,
    /// Ids of trees excluded for having fewer than two nodes.
    pub degenerate: Vec<u64>,
}

impl Corpus {
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.trees.iter().map(|t| t.document.nodes.len()).sum()
    }
}

/// Accumulates parsed documents into a [`Corpus`].
///
/// Documents must be added in ascending id order; the registry's row order
/// follows the order in which languages are first seen.
#[derive(Debug, Default)]
pub struct CorpusLoader {
    corpus: Corpus,
}

impl CorpusLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one parsed document. Degenerate documents are recorded and
    /// otherwise ignored. Returns whether the tree was retained.
    pub fn add_document(&mut self, id: u64, path: &Path, document: Document) -> bool {
        if document.is_degenerate() {
            log::info!(
                "Skipping tree {id} ({}): fewer than two nodes",
                path.display()
            );
            self.corpus.degenerate.push(id);
            return false;
        }

        for node in &document.nodes {
            self.corpus.registry.register(&node.language_id, &node.name);
        }
        let node_metadata = document.populated_fields();
        self.corpus.trees.push(CorpusTree {
            id,
            path: path.to_path_buf(),
            document,
            node_metadata,
        });
        true
    }

    /// Parse an in-memory document and add it.
    pub fn add_xml(&mut self, id: u64, path: &Path, xml: &str) -> ConvertResult<bool> {
        let document = parse_document(xml, path)?;
        Ok(self.add_document(id, path, document))
    }

    #[must_use]
    pub fn finish(self) -> Corpus {
        self.corpus
    }
}

/// Tree files in `dir`, sorted by numeric stem.
///
/// Only `*.xml` files whose stem is a non-negative integer are returned;
/// everything else is skipped.
pub fn discover(dir: &Path) -> ConvertResult<Vec<(u64, PathBuf)>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            let source = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("directory walk failed"));
            ConvertError::io(path, source)
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let is_xml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"));
        let id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.parse::<u64>().ok());
        match (is_xml, id) {
            (true, Some(id)) => files.push((id, path.to_path_buf())),
            _ => log::debug!("Ignoring {}", path.display()),
        }
    }
    files.sort_by_key(|(id, _)| *id);
    Ok(files)
}

/// Load every tree in `dir`.
///
/// Any unreadable or malformed file aborts the load.
pub fn load_corpus(dir: &Path) -> ConvertResult<Corpus> {
    if !dir.is_dir() {
        return Err(ConvertError::io(
            dir,
            std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        ));
    }

    let files = discover(dir)?;
    log::info!("Loading {} tree files from {}", files.len(), dir.display());

    let mut loader = CorpusLoader::new();
    for (id, path) in files {
        let document = parse_file(&path)?;
        loader.add_document(id, &path, document);
    }

    let corpus = loader.finish();
    log::info!(
        "Loaded {} trees ({} skipped), {} languages",
        corpus.trees.len(),
        corpus.degenerate.len(),
        corpus.registry.len()
    );
    Ok(corpus)
}
