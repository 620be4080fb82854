use std::path::Path;

use multitree_core::model::ExternalLanguoid;
use multitree_graph::write_nexus;

use crate::cldf::{
    self, CldfWriter, LanguageRow, MediaRow, NodeRow, TreeRow, LANGUAGES_CSV, MEDIA_CSV,
    METADATA_JSON, NODES_CSV, README_MD, SOURCES_BIB, TREES_CSV, TREES_NEX,
};
use crate::config::Config;
use crate::corpus::{load_corpus, Corpus};
use crate::error::{ConvertError, ConvertResult};
use crate::reconcile::{reconcile, ReconcileStats};
use crate::sources::{Bibliography, CitationTable, SourceRef};

/// What a conversion run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionSummary {
    pub trees: usize,
    pub nodes: usize,
    pub languages: usize,
    /// Ids of trees skipped for having fewer than two nodes.
    pub degenerate: Vec<u64>,
    pub reconcile: ReconcileStats,
    /// Whether a Glottolog catalogue was consulted.
    pub catalogue_used: bool,
}

/// Convert the raw corpus into a CLDF dataset.
///
/// Reads trees from `config.raw_dir`, citations and bibliography from
/// `config.etc_dir`, the optional Glottolog catalogue, and writes every
/// table plus `trees.nex` into `config.cldf_dir`.
///
/// # Errors
/// Any unreadable input, malformed tree, unknown citation or write
/// failure aborts the run.
pub fn make_cldf(config: &Config) -> ConvertResult<ConversionSummary> {
    let corpus = load_corpus(&config.raw_dir)?;
    let citations = load_citations(&config.citations_path())?;
    let bibliography = load_bibliography(&config.bibliography_path())?;

    let tree_rows = tree_rows(&corpus, citations.as_ref(), bibliography.as_ref())?;

    let (languoids, catalogue_used) = load_languoids(config)?;
    let reconciliation = reconcile(&corpus.registry, &languoids);

    let writer = CldfWriter::create(&config.cldf_dir)?;
    log::info!("Writing CLDF dataset to {}", writer.dir().display());

    let node_rows: Vec<NodeRow> = corpus
        .trees
        .iter()
        .flat_map(|t| t.document.nodes.iter().map(|n| NodeRow::new(t.id, n)))
        .collect();
    let language_rows: Vec<LanguageRow> = reconciliation
        .languages
        .iter()
        .map(LanguageRow::from)
        .collect();

    writer.write_table(TREES_CSV, &TreeRow::COLUMNS, &tree_rows)?;
    writer.write_table(NODES_CSV, &NodeRow::COLUMNS, &node_rows)?;
    writer.write_table(LANGUAGES_CSV, &LanguageRow::COLUMNS, &language_rows)?;
    writer.write_table(MEDIA_CSV, &MediaRow::COLUMNS, &[MediaRow::trees()])?;

    let ids: Vec<String> = corpus.trees.iter().map(|t| t.id.to_string()).collect();
    let nexus = write_nexus(
        corpus
            .trees
            .iter()
            .zip(&ids)
            .filter_map(|(t, id)| t.root().map(|root| (id.as_str(), root))),
    );
    writer.write_text(TREES_NEX, &nexus)?;

    if bibliography.is_some() {
        writer.copy_file(&config.bibliography_path(), SOURCES_BIB)?;
    }
    writer.write_json(METADATA_JSON, &cldf::metadata(bibliography.is_some()))?;
    writer.write_text(
        README_MD,
        &cldf::readme(
            tree_rows.len(),
            node_rows.len(),
            language_rows.len(),
            reconciliation.stats.matched(),
        ),
    )?;

    Ok(ConversionSummary {
        trees: tree_rows.len(),
        nodes: node_rows.len(),
        languages: language_rows.len(),
        degenerate: corpus.degenerate,
        reconcile: reconciliation.stats,
        catalogue_used,
    })
}

fn load_citations(path: &Path) -> ConvertResult<Option<CitationTable>> {
    if !path.exists() {
        log::warn!("No citation table at {}; trees get no sources", path.display());
        return Ok(None);
    }
    let table = CitationTable::from_path(path)?;
    log::info!("Read {} citations from {}", table.len(), path.display());
    Ok(Some(table))
}

fn load_bibliography(path: &Path) -> ConvertResult<Option<Bibliography>> {
    if !path.exists() {
        log::info!("No bibliography at {}", path.display());
        return Ok(None);
    }
    let bibliography = Bibliography::from_path(path)?;
    log::info!(
        "Read {} bibliography entries from {}",
        bibliography.len(),
        path.display()
    );
    Ok(Some(bibliography))
}

fn load_languoids(config: &Config) -> ConvertResult<(Vec<ExternalLanguoid>, bool)> {
    match config.catalogue() {
        Some(catalogue) => Ok((catalogue.load()?, true)),
        None => {
            log::warn!("No Glottolog catalogue configured; languages stay unresolved");
            Ok((Vec::new(), false))
        }
    }
}

/// One row per retained tree, with its publication resolved to sources.
fn tree_rows(
    corpus: &Corpus,
    citations: Option<&CitationTable>,
    bibliography: Option<&Bibliography>,
) -> ConvertResult<Vec<TreeRow>> {
    let mut rows = Vec::with_capacity(corpus.trees.len());
    for tree in &corpus.trees {
        let publications = tree.document.publications.as_deref().unwrap_or_default();
        let sources = match citations {
            Some(table) => table
                .lookup(publications)
                .ok_or_else(|| ConvertError::UnknownCitation {
                    path: tree.path.clone(),
                    citation: publications.trim().to_string(),
                })?
                .to_vec(),
            None => Vec::new(),
        };

        if let Some(bib) = bibliography {
            for source in &sources {
                let known = SourceRef::parse(source).is_some_and(|r| bib.get(&r.key).is_some());
                if !known {
                    log::warn!("Tree {}: source {source:?} not in bibliography", tree.id);
                }
            }
        }
        rows.push(TreeRow::new(tree, sources));
    }
    Ok(rows)
}
