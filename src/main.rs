//! Sekai Card Import CLI
//!
//! Imports a card collection screenshot into card states, fingerprints
//! character art for building reference tables, and prepares Tesseract.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use sekai_card_import::catalog::{ReferenceEntry, ReferenceTable};
use sekai_card_import::config::{get_config, init_config, ImportConfig};
use sekai_card_import::hash::PerceptualHasher;
use sekai_card_import::import::{
    export, import_file, merge_card_states, to_card_states, ImportOutcome,
};
use sekai_card_import::ocr::{self, TextRecognizer};
use sekai_card_import::{log, paths};

#[derive(Parser)]
#[command(name = "sekai-card-import")]
#[command(about = "Import card states from a card list screenshot")]
#[command(version)]
struct Cli {
    /// Config file (defaults to config.json in the working directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a screenshot of the card list
    Import {
        /// Screenshot file (PNG or JPEG)
        screenshot: PathBuf,

        /// Read level and master rank badges with OCR
        #[arg(long)]
        ocr: bool,

        /// Write card states as JSON
        #[arg(long, value_name = "OUT")]
        json: Option<PathBuf>,

        /// Write card states as CSV
        #[arg(long, value_name = "OUT")]
        csv: Option<PathBuf>,

        /// Earlier JSON export; its cards not found in this screenshot are kept
        #[arg(long, value_name = "FILE")]
        merge: Option<PathBuf>,

        /// Save every row's cell crop as PNG into this directory
        #[arg(long, value_name = "DIR")]
        dump_cells: Option<PathBuf>,
    },
    /// Fingerprint character art images
    Hash {
        /// Image files
        #[arg(required = true)]
        images: Vec<PathBuf>,

        /// Write a reference table keyed by file name
        #[arg(long, value_name = "OUT")]
        table: Option<PathBuf>,
    },
    /// Locate Tesseract and download English language data if missing
    SetupOcr,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = paths::ensure_directories() {
        eprintln!("Failed to create data directories: {}", e);
    }
    init_config(cli.config.as_deref());

    match cli.command {
        Commands::Import {
            screenshot,
            ocr,
            json,
            csv,
            merge,
            dump_cells,
        } => {
            let mut config = get_config().clone();
            config.ocr.enabled |= ocr;
            cmd_import(
                &screenshot,
                &config,
                json.as_deref(),
                csv.as_deref(),
                merge.as_deref(),
                dump_cells.as_deref(),
            )
        }
        Commands::Hash { images, table } => cmd_hash(&images, table.as_deref()),
        Commands::SetupOcr => cmd_setup_ocr(get_config()),
    }
}

fn cmd_import(
    screenshot: &Path,
    config: &ImportConfig,
    json: Option<&Path>,
    csv: Option<&Path>,
    merge: Option<&Path>,
    dump_cells: Option<&Path>,
) -> Result<()> {
    let recognizer = if config.ocr.enabled {
        Some(ocr::tesseract_recognizer(config.ocr.tesseract_path.as_deref())?)
    } else {
        None
    };
    let recognizer = recognizer.as_ref().map(|r| r as &dyn TextRecognizer);

    let (outcome, catalog) = import_file(screenshot, config, recognizer)?;
    print_summary(&outcome);

    if let Some(dir) = dump_cells {
        let saved = export::save_row_crops(&outcome.rows, dir)?;
        log(&format!("Saved {} cell crops to {}", saved.len(), dir.display()));
    }

    let mut states = to_card_states(&outcome.rows, &catalog);
    if let Some(existing) = merge {
        let previous = export::read_json(existing)?;
        let imported = states.len();
        states = merge_card_states(states, &previous);
        log(&format!(
            "Merged {} imported cards with {} existing, {} total",
            imported,
            previous.len(),
            states.len()
        ));
    }

    if let Some(path) = json {
        export::write_json(path, &states)?;
        log(&format!("Wrote {} card states to {}", states.len(), path.display()));
    }
    if let Some(path) = csv {
        export::write_csv(path, &states)?;
        log(&format!("Wrote {} card states to {}", states.len(), path.display()));
    }

    Ok(())
}

fn print_summary(outcome: &ImportOutcome) {
    let unmatched = outcome
        .cells
        .iter()
        .filter(|c| outcome.rows.get(c.id).is_none())
        .count();
    println!(
        "{} cells, {} rows, {} unmatched",
        outcome.cells.len(),
        outcome.rows.len(),
        unmatched
    );
    println!(
        "{:>4}  {:>6}  {:<36} {:>4}  {:>3}  {:>2}  {:>5}  {:>5}  {:>5}",
        "id", "card", "asset", "dist", "lv", "mr", "train", "ep1", "ep2"
    );

    for row in &outcome.rows {
        let (asset, distance) = row
            .selected_candidate_index()
            .and_then(|i| row.candidates().get(i))
            .or_else(|| row.candidates().first())
            .map_or(("-", 0), |c| (c.asset_name.as_str(), c.distance));
        let card = row
            .selected_card_id()
            .map_or_else(|| "?".to_string(), |id| id.to_string());

        println!(
            "{:>4}  {:>6}  {:<36} {:>4}  {:>3}  {:>2}  {:>5}  {:>5}  {:>5}",
            row.id(),
            card,
            asset,
            distance,
            row.level(),
            row.master_rank(),
            row.trained(),
            row.story1_unlock(),
            row.story2_unlock()
        );
    }
}

fn cmd_hash(images: &[PathBuf], table: Option<&Path>) -> Result<()> {
    let hasher = PerceptualHasher::new();
    let mut entries = Vec::with_capacity(images.len());

    for path in images {
        let img = image::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?
            .to_rgba8();
        let fingerprint = hasher.hash(&img);
        println!("{}  {}", fingerprint, path.display());

        let asset_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        entries.push(ReferenceEntry {
            asset_name,
            fingerprint,
        });
    }

    if let Some(out) = table {
        let json = ReferenceTable::new(entries).to_json()?;
        std::fs::write(out, json).with_context(|| format!("Failed to write {}", out.display()))?;
        log(&format!("Wrote reference table to {}", out.display()));
    }

    Ok(())
}

fn cmd_setup_ocr(config: &ImportConfig) -> Result<()> {
    let paths = ocr::ensure_tesseract(config.ocr.tesseract_path.as_deref())?;
    println!("tesseract: {}", paths.executable.display());
    match &paths.tessdata {
        Some(dir) => println!("tessdata:  {}", dir.display()),
        None => println!("tessdata:  (tesseract default)"),
    }
    Ok(())
}
