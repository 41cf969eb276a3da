// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! ferro-mirror CLI
//!
//! Command-line interface for retrieving entries from a sequence databank
//! mirror and resolving dictionary terms.

use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::util::SubscriberInitExt;

use ferro_mirror::batch::{BatchConfig, BatchProcessor};
use ferro_mirror::cli::{write_failure, write_record, OutputFormat};
use ferro_mirror::config::MirrorConfig;
use ferro_mirror::dictionary::{DicoKind, DictionaryHandle};
use ferro_mirror::query::{read_id_list, split_id_list, FetchRequest, WindowMode};

#[derive(Parser)]
#[command(name = "ferro-mirror")]
#[command(author, version, about = "Sequence databank mirror entry extraction")]
#[command(
    long_about = "Retrieve entries from a local GenBank/EMBL/UniProt/BLAST mirror.

Examples:
  ferro-mirror fetch X56734
  ferro-mirror fetch X56734,M10051 --start 100 --stop 400 --remap --format insd
  ferro-mirror fetch --id-file ids.txt.gz --format json
  ferro-mirror dico go GO:0005634,0008150
  ferro-mirror dico taxonomy 9606 --lineage
  ferro-mirror config -o mirror.toml"
)]
struct Cli {
    /// Log level or filter directive (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Retrieve entries by id
    Fetch {
        /// Ids, comma-separated or repeated
        ids: Vec<String>,

        /// File with one id per line (.gz accepted)
        #[arg(short, long)]
        id_file: Option<PathBuf>,

        /// First base of the window (0 with --stop 0 for the whole entry)
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        start: i64,

        /// Last base of the window
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        stop: i64,

        /// Renumber coordinates so the window starts at 1
        #[arg(long)]
        remap: bool,

        /// Window normalization for start > stop, overriding the config
        #[arg(long, value_parser = ["corrected", "legacy"])]
        window_mode: Option<String>,

        /// Output format
        #[arg(short = 'f', long, default_value = "fasta", value_parser = ["fasta", "insd", "json"])]
        format: String,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Resolve dictionary terms
    Dico {
        /// Dictionary kind (taxonomy, ncbi_taxonomy, go, interpro, pfam, enzyme, cdd)
        kind: String,

        /// Comma-separated ids
        ids: String,

        /// Print the taxonomic lineage instead of the term
        #[arg(long)]
        lineage: bool,

        /// Dictionary directory, overriding the config
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Generate a sample configuration file
    Config {
        /// Output path for configuration file
        #[arg(short, long, default_value = "mirror.toml")]
        output: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(&cli.log_level) {
        eprintln!("{}", e);
        std::process::exit(2);
    }

    let result = match cli.command {
        Commands::Fetch {
            ids,
            id_file,
            start,
            stop,
            remap,
            window_mode,
            format,
            config,
        } => fetch_command(
            ids,
            id_file.as_deref(),
            (start, stop),
            remap,
            window_mode.as_deref(),
            &format,
            config.as_deref(),
        ),
        Commands::Dico {
            kind,
            ids,
            lineage,
            dir,
            config,
        } => dico_command(&kind, &ids, lineage, dir.as_deref(), config.as_deref()),
        Commands::Config { output, force } => config_command(&output, force),
    };

    if let Err(e) = result {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn fetch_command(
    ids: Vec<String>,
    id_file: Option<&Path>,
    (start, stop): (i64, i64),
    remap: bool,
    window_mode: Option<&str>,
    format: &str,
    config_path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = MirrorConfig::load(config_path)?;
    match window_mode {
        Some("legacy") => config.window_mode = WindowMode::Legacy,
        Some("corrected") => config.window_mode = WindowMode::Corrected,
        _ => {}
    }
    let format: OutputFormat = format.parse()?;

    let mut all_ids: Vec<String> = ids.iter().flat_map(|arg| split_id_list(arg)).collect();
    if let Some(path) = id_file {
        all_ids.extend(read_id_list(path)?);
    }
    if all_ids.is_empty() {
        return Err("no ids given".into());
    }

    let extractor = config.build_extractor()?;
    let request = FetchRequest::new(all_ids)
        .with_window(start, stop, config.window_mode)?
        .with_remap(remap);
    info!(
        "Fetching {} ids, window {}..{}",
        request.ids.len(),
        request.window.start,
        request.window.stop
    );

    let processor = BatchProcessor::with_config(&extractor, BatchConfig::new().progress_interval(1000));
    let result = processor.fetch_with_progress(
        request.ids.as_slice(),
        request.window,
        request.remap,
        |progress| {
            info!(
                "Processed {}/{} ids ({:.1}%)",
                progress.processed,
                progress.total,
                progress.percent()
            );
        },
    )?;
    info!(
        "Retrieved {}/{} entries in {:.2?}",
        result.success_count(),
        result.total(),
        result.duration
    );

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for outcome in &result.outcomes {
        match &outcome.result {
            Ok(record) => write_record(&mut out, record, format)?,
            Err(e) => write_failure(&mut out, &outcome.id, e, format)?,
        }
    }
    out.flush()?;
    Ok(())
}

fn dico_command(
    kind: &str,
    ids: &str,
    lineage: bool,
    dir: Option<&Path>,
    config_path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let kind: DicoKind = kind.parse()?;
    let handle = match dir {
        Some(dir) => DictionaryHandle::open(dir)?,
        None => MirrorConfig::load(config_path)?.open_dictionaries()?,
    };
    let resolver = handle.resolver();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if lineage {
        for id in split_id_list(ids) {
            let line = resolver
                .lineage(&id)?
                .unwrap_or_else(|| ferro_mirror::dictionary::UNKNOWN_TERM.to_string());
            writeln!(out, "{}\t{}", id, line)?;
        }
    } else {
        for line in resolver.query_lines(kind, ids)? {
            writeln!(out, "{}", line)?;
        }
    }
    Ok(())
}

fn config_command(output_path: &Path, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    if output_path.exists() && !force {
        return Err(format!(
            "Configuration file already exists: {} (use --force to overwrite)",
            output_path.display()
        )
        .into());
    }

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    MirrorConfig::sample().to_file(output_path)?;
    println!(
        "Sample configuration file created: {}",
        output_path.display()
    );
    Ok(())
}

fn init_tracing(level: &str) -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

    let filter =
        EnvFilter::try_new(level).map_err(|e| format!("Invalid log level '{}': {}", level, e))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();

    Ok(())
}
