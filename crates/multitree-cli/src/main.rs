use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;

use multitree_etl::{Config, LoggingConfig, Overrides};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "multitree", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (error, warn, info, debug, trace); overrides the config file
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Convert the raw MultiTree XML files into a CLDF dataset
    ///
    /// Reads every `<number>.xml` file in the raw directory in numeric order,
    /// normalizes the language codes of all nodes, links the languages to
    /// Glottolog and writes the dataset:
    ///
    /// - trees.csv, nodes.csv, languages.csv and media.csv
    /// - trees.nex, all trees in one NEXUS TREES block
    /// - sources.bib, Generic-metadata.json and README.md
    ///
    /// Trees with fewer than two nodes are skipped and listed in the summary.
    /// Malformed trees and unknown citations abort the conversion.
    Makecldf {
        /// Directory with the MultiTree XML files
        #[arg(long)]
        raw: Option<PathBuf>,

        /// Directory with sources.csv and sources.bib
        #[arg(long)]
        etc: Option<PathBuf>,

        /// Glottolog repository checkout or JSON snapshot
        #[arg(long)]
        glottolog: Option<PathBuf>,

        /// Output directory for the CLDF dataset
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Show one tree of a written dataset
    Show {
        /// Tree ID (the number of the source file)
        tree_id: String,

        /// CLDF dataset directory
        #[arg(long)]
        cldf: Option<PathBuf>,

        /// Label tree nodes with their names instead of their language IDs
        #[arg(long)]
        names: bool,

        /// Node table format
        #[arg(long, value_enum, default_value_t = commands::show::TableFormat::Simple)]
        format: commands::show::TableFormat,
    },
    /// Show dataset statistics
    Status {
        /// CLDF dataset directory
        #[arg(long)]
        cldf: Option<PathBuf>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ConfigAction {
    /// Show the current effective configuration
    Show,
    /// Print one configuration value
    Get {
        /// Key: raw_dir, etc_dir, cldf_dir, glottolog or logging.level
        key: String,
    },
    /// Print the config file path
    Path,
    /// Print an example config file
    Example,
    /// Create the config file with defaults if it does not exist
    Init,
}

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let level = match logging.level.to_ascii_lowercase().as_str() {
        "error" => twyg::LogLevel::Error,
        "warn" | "warning" => twyg::LogLevel::Warn,
        "info" => twyg::LogLevel::Info,
        "debug" => twyg::LogLevel::Debug,
        "trace" => twyg::LogLevel::Trace,
        other => anyhow::bail!("Unknown log level: {other}"),
    };
    let opts = twyg::OptsBuilder::new()
        .coloured(logging.coloured)
        .level(level)
        .report_caller(logging.report_caller)
        .build()
        .context("Invalid logging configuration")?;
    twyg::setup(opts).context("Failed to set up logging")?;
    Ok(())
}

/// Load the configuration with CLI overrides applied and start logging.
fn setup(overrides: Overrides) -> Result<Config> {
    let config = Config::load()?.with_overrides(overrides);
    init_logging(&config.logging)?;
    log::debug!("Effective configuration: {config:?}");
    Ok(config)
}

fn run(cli: Cli) -> Result<()> {
    let log_level = cli.log_level;
    let overrides = move || Overrides {
        log_level: log_level.clone(),
        ..Overrides::default()
    };

    match cli.command {
        Commands::Makecldf {
            raw,
            etc,
            glottolog,
            out,
        } => {
            let config = setup(Overrides {
                raw_dir: raw,
                etc_dir: etc,
                cldf_dir: out,
                glottolog,
                ..overrides()
            })?;
            commands::run_makecldf(&config)
        }
        Commands::Show {
            tree_id,
            cldf,
            names,
            format,
        } => {
            let config = setup(overrides())?;
            let dir = cldf.unwrap_or(config.cldf_dir);
            commands::show_tree(&dir, &tree_id, names, format)
        }
        Commands::Status { cldf } => {
            let config = setup(overrides())?;
            let dir = cldf.unwrap_or(config.cldf_dir);
            commands::show_status(&dir)
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show_config(),
            ConfigAction::Get { key } => commands::config::get_config(&key),
            ConfigAction::Path => commands::config::show_path(),
            ConfigAction::Example => commands::config::show_example(),
            ConfigAction::Init => commands::config::init_config(),
        },
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("{}: {e:#}", "error".red().bold());
        std::process::exit(1);
    }
}
