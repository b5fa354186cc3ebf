use anyhow::Result;
use clap::{Parser, Subcommand};
use retagger_core::cleaner::StopwordCleaner;
use retagger_core::config;
use retagger_core::config::AppConfig;
use retagger_core::pipeline;
use retagger_core::{extractor, scanner, transcoder};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Run => run_pipeline(cfg).await,
        Commands::Scan { json } => run_scan(cfg, json),
        Commands::Extract { json } => run_extract(cfg, json),
        Commands::StripArt { dir } => run_strip_art(cfg, dir.as_deref()),
    }
}

#[derive(Parser)]
#[command(name = "ai-retagger")]
#[command(about = "AI-assisted MP3 renamer and retagger", long_about = None)]
struct Cli {
    /// Path to config TOML
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan, infer corrections, and write retagged copies
    Run,
    /// List the MP3 files a run would process
    Scan {
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Show extracted metadata without calling the model
    Extract {
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Strip embedded artwork from already-processed files
    StripArt {
        /// Directory to sweep; defaults to the configured output dir
        #[arg(long)]
        dir: Option<String>,
    },
}

async fn run_pipeline(cfg: AppConfig) -> Result<()> {
    let registry = pipeline::build_registry(&cfg);
    let summary = pipeline::run(&cfg, &registry).await?;
    println!(
        "run complete: scanned {}, applied {}",
        summary.scanned, summary.applied
    );
    Ok(())
}

fn run_scan(cfg: AppConfig, json: bool) -> Result<()> {
    let files = scanner::scan(Path::new(&cfg.library.source_dir), &cfg.library.exclude)?;
    if json {
        let paths: Vec<String> = files
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        println!("{}", serde_json::to_string_pretty(&paths)?);
    } else {
        for file in &files {
            println!("{}", file.display());
        }
        println!("scanned {} files", files.len());
    }
    Ok(())
}

fn run_extract(cfg: AppConfig, json: bool) -> Result<()> {
    let cleaner = StopwordCleaner::new(&cfg.cleaner.stopwords)?;
    let files = scanner::scan(Path::new(&cfg.library.source_dir), &cfg.library.exclude)?;
    let records: Vec<_> = files
        .iter()
        .filter_map(|path| extractor::extract(path, &cfg.tags.names, &cleaner))
        .collect();
    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        for record in &records {
            println!("{}", serde_json::to_string(record)?);
        }
        println!("extracted {} of {} files", records.len(), files.len());
    }
    Ok(())
}

fn run_strip_art(cfg: AppConfig, dir: Option<&str>) -> Result<()> {
    let dir = dir.unwrap_or(&cfg.library.output_dir);
    let removed = transcoder::strip_artwork_in_dir(Path::new(dir))?;
    println!("removed artwork from {removed} files");
    Ok(())
}
