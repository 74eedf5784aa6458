//! Card state export.
//!
//! Rows become card states sorted by card id, written as pretty JSON or CSV.
//! An earlier export can be merged in so cards missing from this screenshot
//! are kept.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::rows::RowSet;
use crate::catalog::CardCatalog;

/// CSV header row.
const CSV_HEADER: &str =
    "card_id,level,master_rank,skill_level,story1_unlock,story2_unlock,trainable,trained";

/// Final per-card record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardState {
    pub card_id: u32,
    pub level: u8,
    pub master_rank: u8,
    pub skill_level: u8,
    pub story1_unlock: bool,
    pub story2_unlock: bool,
    pub trainable: bool,
    pub trained: bool,
}

/// Converts rows whose selected candidate is a known card, sorted by card id.
pub fn to_card_states(rows: &RowSet, catalog: &CardCatalog) -> Vec<CardState> {
    let mut states: Vec<CardState> = rows
        .iter()
        .filter_map(|row| {
            let card = catalog.get(row.selected_card_id()?)?;
            let trainable = card.is_trainable();
            Some(CardState {
                card_id: card.id,
                level: row.level(),
                master_rank: row.master_rank(),
                skill_level: row.skill_level(),
                story1_unlock: row.story1_unlock(),
                story2_unlock: row.story2_unlock(),
                trainable,
                trained: trainable && row.trained(),
            })
        })
        .collect();
    states.sort_by_key(|s| s.card_id);
    states
}

/// Adds every existing state whose card was not imported this time.
pub fn merge_card_states(mut states: Vec<CardState>, existing: &[CardState]) -> Vec<CardState> {
    let imported: HashSet<u32> = states.iter().map(|s| s.card_id).collect();
    states.extend(
        existing
            .iter()
            .filter(|s| !imported.contains(&s.card_id))
            .cloned(),
    );
    states.sort_by_key(|s| s.card_id);
    states
}

/// Reads a JSON export written by [`write_json`].
pub fn read_json(path: &Path) -> Result<Vec<CardState>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&json).context("Failed to parse card states")
}

/// Writes card states as pretty-printed JSON.
pub fn write_json(path: &Path, states: &[CardState]) -> Result<()> {
    let json = serde_json::to_string_pretty(states).context("Failed to serialize card states")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Writes card states as CSV with a header row.
pub fn write_csv(path: &Path, states: &[CardState]) -> Result<()> {
    let mut file = File::create(path).context("Failed to create CSV file")?;
    writeln!(file, "{}", CSV_HEADER).context("Failed to write CSV header")?;

    for s in states {
        writeln!(
            file,
            "{},{},{},{},{},{},{},{}",
            s.card_id,
            s.level,
            s.master_rank,
            s.skill_level,
            s.story1_unlock,
            s.story2_unlock,
            s.trainable,
            s.trained
        )
        .context("Failed to write CSV row")?;
    }
    Ok(())
}

/// Saves every row's cell crop as `row_<id>.png` for manual review.
pub fn save_row_crops(rows: &RowSet, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    rows.iter()
        .map(|row| {
            let path = dir.join(format!("row_{:03}.png", row.id()));
            row.crop()
                .save(&path)
                .with_context(|| format!("Failed to save {}", path.display()))?;
            Ok(path)
        })
        .collect()
}
