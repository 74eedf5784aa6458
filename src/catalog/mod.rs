//! Reference data the pipeline matches against.
//!
//! This module provides:
//! - The reference hash table (character art fingerprints by asset name)
//! - The card list (id, asset bundle name, rarity)
//! - Loading either from an HTTP(S) URL or a local JSON file

pub mod cards;
pub mod reference;

pub use cards::{CardCatalog, CardInfo};
pub use reference::{ReferenceEntry, ReferenceTable};

use anyhow::{anyhow, Context, Result};
use std::fs;
use std::time::Duration;

use crate::config::SourcesConfig;

fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Reads a JSON document from a URL or a file path.
pub fn read_source(location: &str, timeout_ms: u64) -> Result<String> {
    if !is_remote(location) {
        return fs::read_to_string(location)
            .with_context(|| format!("Failed to read {}", location));
    }

    crate::log(&format!("Downloading {}...", location));

    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_millis(timeout_ms))
        .build()?;

    let response = client
        .get(location)
        .header("User-Agent", "sekai-card-import")
        .send()
        .with_context(|| format!("Failed to fetch {}", location))?;

    if !response.status().is_success() {
        return Err(anyhow!(
            "Failed to fetch {}: HTTP {}",
            location,
            response.status()
        ));
    }

    let body = response.text()?;
    crate::log(&format!("Downloaded {} ({} bytes)", location, body.len()));
    Ok(body)
}

/// Loads the reference hash table. Fails the run if it cannot be read.
pub fn load_reference_table(sources: &SourcesConfig) -> Result<ReferenceTable> {
    let json = read_source(&sources.hash_table, sources.timeout_ms)?;
    let table = ReferenceTable::from_json(&json)?;
    crate::log(&format!("Reference table: {} entries", table.len()));
    Ok(table)
}

/// Loads the card list.
pub fn load_card_catalog(sources: &SourcesConfig) -> Result<CardCatalog> {
    let json = read_source(&sources.cards, sources.timeout_ms)?;
    let catalog = CardCatalog::from_json(&json)?;
    crate::log(&format!("Card catalog: {} cards", catalog.len()));
    Ok(catalog)
}
