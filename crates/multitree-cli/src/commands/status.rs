use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

use multitree_etl::cldf::CldfDataset;

pub fn show_status(cldf_dir: &Path) -> Result<()> {
    if !cldf_dir.exists() {
        println!("No CLDF dataset at {}", cldf_dir.display());
        println!("\n  Run `multitree makecldf` to create it");
        return Ok(());
    }

    let dataset = CldfDataset::open(cldf_dir)
        .with_context(|| format!("Failed to read CLDF dataset in {}", cldf_dir.display()))?;

    println!("\n{}\n", "MultiTree CLDF Status".bold());
    println!("  Dataset:   {}", cldf_dir.display());
    println!("  Trees:     {}", dataset.trees.len());
    println!("  Nodes:     {}", dataset.nodes.len());
    println!("  Languages: {}", dataset.languages.len());

    let matched = dataset.matched_languages();
    let unmatched = dataset.languages.len() - matched;
    println!("  Glottolog: {} matched, {} unresolved", matched, unmatched);
    println!("  Sources:   {} bibliography entries", dataset.bibliography.len());

    if dataset.trees.len() != dataset.newick.len() {
        println!(
            "\n  {} trees.csv lists {} trees but trees.nex holds {}",
            "warning:".yellow().bold(),
            dataset.trees.len(),
            dataset.newick.len()
        );
    }

    Ok(())
}
