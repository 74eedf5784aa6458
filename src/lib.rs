//! Sekai Card Import
//!
//! Reads a screenshot of the in-game card collection screen and turns it
//! into a list of card states: locate the card panel, cut it into
//! thumbnails, fingerprint each thumbnail with a DCT perceptual hash, match
//! the fingerprints against a reference table and optionally read the level
//! and master rank badges with OCR.

pub mod catalog;
pub mod config;
pub mod hash;
pub mod import;
pub mod ocr;
pub mod paths;
pub mod vision;

use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;

/// Logs a message to both console and log file with timestamp.
pub fn log(msg: &str) {
    let timestamp = Local::now().format("%H:%M:%S%.3f");
    let line = format!("[{}] {}\n", timestamp, msg);
    print!("{}", line);
    let log_path = paths::get_logs_dir().join("sekai_card_import.log");
    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        let _ = file.write_all(line.as_bytes());
    }
}
