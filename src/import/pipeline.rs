//! Screenshot to rows, end to end.
//!
//! Stages run in order on the calling thread: binarize, locate the card panel,
//! segment the grid, crop every cell, fingerprint and match the art. Badge OCR
//! for the matched cells is the only parallel stage. Missing panel or grid is
//! not an error; the run just yields no rows.

use anyhow::{anyhow, Context, Result};
use image::{imageops, GrayImage, RgbaImage};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use super::rows::{BadgeText, CellMatch, RowAssembler, RowSet};
use crate::catalog::{self, CardCatalog, ReferenceTable};
use crate::config::ImportConfig;
use crate::hash::{HashMatcher, PerceptualHasher};
use crate::ocr::{recognize_batch, TextRecognizer};
use crate::vision::{
    extract_cells, locate, preprocess, segment, CellCrops, ContentRegion, GridLayout,
};

/// Per-cell match summary, including cells that produced no row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellOutcome {
    /// Row id the cell would carry
    pub id: usize,
    /// Cell origin in screenshot coordinates
    pub x: u32,
    pub y: u32,
    /// Best match distance; 64 when nothing matched
    pub best_distance: u32,
}

/// Everything one import produced.
#[derive(Clone, Debug, Default)]
pub struct ImportOutcome {
    pub region: Option<ContentRegion>,
    pub layout: Option<GridLayout>,
    pub cells: Vec<CellOutcome>,
    pub rows: RowSet,
}

/// Clears the busy flag when the run ends, however it ends.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        if flag.swap(true, Ordering::SeqCst) {
            return Err(anyhow!("Import already running"));
        }
        Ok(Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Runs imports with one configuration. One run at a time.
pub struct Importer {
    config: ImportConfig,
    hasher: PerceptualHasher,
    matcher: HashMatcher,
    assembler: RowAssembler,
    busy: AtomicBool,
}

impl Importer {
    pub fn new(config: ImportConfig) -> Result<Self> {
        let matcher = HashMatcher::new(&config.matching);
        Ok(Self {
            config,
            hasher: PerceptualHasher::new(),
            matcher,
            assembler: RowAssembler::new()?,
            busy: AtomicBool::new(false),
        })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Imports one screenshot.
    ///
    /// Pass a recognizer to read level and master rank badges; without one
    /// every row gets the default level and rank.
    pub fn run(
        &self,
        screenshot: &RgbaImage,
        table: &ReferenceTable,
        catalog: &CardCatalog,
        recognizer: Option<&dyn TextRecognizer>,
    ) -> Result<ImportOutcome> {
        let _guard = BusyGuard::acquire(&self.busy)?;

        crate::log(&format!(
            "Import: screenshot {}x{}, {} reference entries",
            screenshot.width(),
            screenshot.height(),
            table.len()
        ));

        let (_, bin) = preprocess(screenshot, self.config.locator.white_level);

        let Some(region) = locate(&bin, &self.config.locator) else {
            crate::log("Import: card panel not found");
            return Ok(ImportOutcome::default());
        };
        crate::log(&format!(
            "Import: panel at ({}, {}) size {}x{}",
            region.x1, region.y1, region.width, region.height
        ));

        let panel =
            imageops::crop_imm(screenshot, region.x1, region.y1, region.width, region.height)
                .to_image();
        let panel_bin: GrayImage =
            imageops::crop_imm(&bin, region.x1, region.y1, region.width, region.height).to_image();

        let Some(layout) = segment(&panel_bin, &self.config.grid) else {
            crate::log("Import: no card grid found in panel");
            return Ok(ImportOutcome {
                region: Some(region),
                ..ImportOutcome::default()
            });
        };

        let crops = extract_cells(&panel, &layout, self.config.ocr.badge_threshold);

        let mut cells = Vec::with_capacity(crops.len());
        let mut matched: Vec<(CellMatch, CellCrops)> = Vec::new();
        for (index, crop) in crops.into_iter().enumerate() {
            let fingerprint = self.hasher.hash(&crop.art);
            let result = self.matcher.match_fingerprint(&fingerprint, table);
            let id = index + 1;

            cells.push(CellOutcome {
                id,
                x: region.x1 + crop.x,
                y: region.y1 + crop.y,
                best_distance: result.best_distance(),
            });

            if result.is_unmatched() {
                continue;
            }
            let cell = CellMatch {
                id,
                crop: crop.cell.clone(),
                fingerprint,
                result,
            };
            matched.push((cell, crop));
        }

        crate::log(&format!(
            "Import: {} cells, {} matched",
            cells.len(),
            matched.len()
        ));

        let badges = {
            let crops: Vec<&CellCrops> = matched.iter().map(|(_, crop)| crop).collect();
            self.read_badges(&crops, recognizer)
        };

        let rows = matched
            .into_iter()
            .zip(badges)
            .filter_map(|((cell, _), text)| self.assembler.assemble(cell, &text, catalog))
            .collect();

        Ok(ImportOutcome {
            region: Some(region),
            layout: Some(layout),
            cells,
            rows: RowSet::new(rows),
        })
    }

    /// One `BadgeText` per crop, in order.
    fn read_badges(
        &self,
        crops: &[&CellCrops],
        recognizer: Option<&dyn TextRecognizer>,
    ) -> Vec<BadgeText> {
        let Some(recognizer) = recognizer else {
            return vec![BadgeText::default(); crops.len()];
        };

        let images: Vec<GrayImage> = crops
            .iter()
            .map(|c| c.level_badge.clone())
            .chain(crops.iter().map(|c| c.rank_badge.clone()))
            .collect();
        let mut texts = recognize_batch(recognizer, &images, self.config.ocr.workers);
        let ranks = texts.split_off(crops.len());

        texts
            .into_iter()
            .zip(ranks)
            .map(|(level, master_rank)| BadgeText { level, master_rank })
            .collect()
    }
}

/// Loads the reference data, then imports the screenshot at `path`.
///
/// Reference data failures abort before the screenshot is touched.
pub fn import_file(
    path: &Path,
    config: &ImportConfig,
    recognizer: Option<&dyn TextRecognizer>,
) -> Result<(ImportOutcome, CardCatalog)> {
    let table = catalog::load_reference_table(&config.sources)?;
    let cards = catalog::load_card_catalog(&config.sources)?;

    let screenshot = image::open(path)
        .with_context(|| format!("Failed to open screenshot {}", path.display()))?
        .to_rgba8();

    let importer = Importer::new(config.clone())?;
    let outcome = importer.run(&screenshot, &table, &cards, recognizer)?;
    Ok((outcome, cards))
}
