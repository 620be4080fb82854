use anyhow::{Context, Result};
use colored::Colorize;
use std::cell::Cell;
use std::path::Path;

use multitree_etl::cldf::CldfDataset;
use multitree_etl::{BibEntry, SourceRef};
use multitree_graph::{ascii_art, AsciiStyle, NewickNode};

/// Output format of the node table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TableFormat {
    /// Space-aligned columns
    Simple,
    /// Markdown table
    Pipe,
    /// Tab-separated values
    Tsv,
}

const NODE_COLUMNS: [&str; 6] = ["Label", "Name", "Glottocode", "Type", "Status", "Geography"];

pub fn show_tree(cldf_dir: &Path, tree_id: &str, names: bool, format: TableFormat) -> Result<()> {
    let dataset = CldfDataset::open(cldf_dir)
        .with_context(|| format!("Failed to read CLDF dataset in {}", cldf_dir.display()))?;

    let tree = dataset
        .tree(tree_id)
        .ok_or_else(|| anyhow::anyhow!("No tree with ID {tree_id} in {}", cldf_dir.display()))?;
    let newick = dataset
        .newick
        .get(tree_id)
        .ok_or_else(|| anyhow::anyhow!("Tree {tree_id} is missing from the NEXUS file"))?;

    println!();
    let description = tree.description.as_deref().unwrap_or(tree.name.as_str());
    println!("{}", description.bold().underline());
    println!();

    let mut references: Vec<&BibEntry> = Vec::new();
    if !tree.source.is_empty() {
        println!("{}", "Source:".bold());
    }
    for raw in &tree.source {
        let Some(source) = SourceRef::parse(raw) else {
            println!("    {raw}");
            continue;
        };
        let entry = dataset.bibliography.get(&source.key);
        let key = entry.map_or_else(|| source.key.clone(), BibEntry::refkey);
        match &source.pages {
            Some(pages) => println!("    {key} [{pages}]"),
            None => println!("    {key}"),
        }
        if let Some(entry) = entry {
            references.push(entry);
        }
    }
    println!();

    let nodes: Vec<_> = dataset.nodes_of(tree_id).collect();
    let display_names: Vec<&str> = nodes.iter().map(|n| n.name.as_str()).collect();
    println!("{}", tree_art(newick, names.then_some(display_names.as_slice())));
    println!();

    let rows: Vec<Vec<String>> = nodes
        .iter()
        .map(|row| {
            vec![
                row.language_id.clone(),
                row.name.clone(),
                dataset
                    .language(&row.language_id)
                    .and_then(|l| l.glottocode.clone())
                    .unwrap_or_default(),
                row.node_type.map(|t| t.to_string()).unwrap_or_default(),
                row.status.clone().unwrap_or_default(),
                row.geography.clone().unwrap_or_default(),
            ]
        })
        .collect();
    print!("{}", render_table(&NODE_COLUMNS, &rows, format));
    println!();

    if !references.is_empty() {
        println!("{}", "References:".bold());
        for entry in references {
            println!("{entry}");
        }
    }

    Ok(())
}

/// Draw the tree, optionally replacing each label with a display name.
///
/// Node rows are stored in pre-order, the order the tree is drawn in, so
/// `names[i]` belongs to the i-th labelled node even when several nodes
/// share a language.
fn tree_art(newick: &NewickNode, names: Option<&[&str]>) -> String {
    let position = Cell::new(0);
    ascii_art(newick, AsciiStyle::Unicode, |label| {
        let i = position.get();
        position.set(i + 1);
        names
            .and_then(|n| n.get(i))
            .map_or(label, |n| *n)
            .to_string()
    })
}

/// Render rows under `headers` in the given format.
pub fn render_table(headers: &[&str], rows: &[Vec<String>], format: TableFormat) -> String {
    match format {
        TableFormat::Tsv => std::iter::once(headers.join("\t"))
            .chain(rows.iter().map(|r| r.join("\t")))
            .map(|line| line + "\n")
            .collect(),
        TableFormat::Simple | TableFormat::Pipe => {
            let widths: Vec<usize> = headers
                .iter()
                .enumerate()
                .map(|(i, h)| {
                    rows.iter()
                        .filter_map(|r| r.get(i))
                        .map(|c| c.chars().count())
                        .chain(std::iter::once(h.chars().count()))
                        .max()
                        .unwrap_or(0)
                })
                .collect();
            let pad = |cells: Vec<&str>| -> Vec<String> {
                cells
                    .into_iter()
                    .zip(&widths)
                    .map(|(c, w)| format!("{c:<w$}"))
                    .collect()
            };

            let header = pad(headers.to_vec());
            let body = rows.iter().map(|r| pad(r.iter().map(String::as_str).collect()));

            if format == TableFormat::Pipe {
                let rule: Vec<String> = widths
                    .iter()
                    .map(|w| format!(":{}", "-".repeat(w + 1)))
                    .collect();
                let rule = format!("|{}|\n", rule.join("|"));
                let mut lines = std::iter::once(header)
                    .chain(body)
                    .map(|cells| format!("| {} |\n", cells.join(" | ")));
                let first = lines.next().unwrap_or_default();
                std::iter::once(first)
                    .chain(std::iter::once(rule))
                    .chain(lines)
                    .collect()
            } else {
                let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
                std::iter::once(header)
                    .chain(std::iter::once(rule))
                    .chain(body)
                    .map(|cells| format!("{}\n", cells.join("  ").trim_end()))
                    .collect()
            }
        }
    }
}
