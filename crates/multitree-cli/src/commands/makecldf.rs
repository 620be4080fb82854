use anyhow::{Context, Result};
use colored::Colorize;
use multitree_etl::{make_cldf, Config};

pub fn run_makecldf(config: &Config) -> Result<()> {
    println!(
        "Converting {} → {}",
        config.raw_dir.display(),
        config.cldf_dir.display()
    );

    let summary = make_cldf(config)
        .with_context(|| format!("Conversion of {} failed", config.raw_dir.display()))?;

    println!("\n{} CLDF dataset written\n", "✓".green().bold());
    println!("  Directory: {}", config.cldf_dir.display());
    println!("  Trees:     {}", summary.trees);
    println!("  Nodes:     {}", summary.nodes);
    println!("  Languages: {}", summary.languages);

    if summary.catalogue_used {
        let stats = summary.reconcile;
        println!(
            "  Glottolog: {} matched ({} by identifier, {} by name), {} unresolved",
            stats.matched(),
            stats.by_identifier,
            stats.by_name,
            stats.unresolved
        );
        if stats.ambiguous_names > 0 {
            println!(
                "             {} name lookups skipped as ambiguous",
                stats.ambiguous_names
            );
        }
    } else {
        println!(
            "  Glottolog: {}",
            "not configured, languages left unresolved".yellow()
        );
    }

    if !summary.degenerate.is_empty() {
        let ids: Vec<String> = summary.degenerate.iter().map(u64::to_string).collect();
        println!(
            "\n  Skipped {} single-node trees: {}",
            ids.len(),
            ids.join(", ")
        );
    }

    Ok(())
}
