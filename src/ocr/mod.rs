pub mod engine;
pub mod extract;
pub mod setup;
pub mod worker;

pub use engine::{TesseractRecognizer, TextRecognizer};
pub use extract::BadgeParser;
pub use setup::ensure_tesseract;
pub use worker::recognize_batch;

use anyhow::Result;
use std::path::Path;

/// Builds the Tesseract recognizer, downloading language data if needed.
pub fn tesseract_recognizer(override_path: Option<&Path>) -> Result<TesseractRecognizer> {
    let paths = ensure_tesseract(override_path)?;
    Ok(TesseractRecognizer::new(paths))
}
