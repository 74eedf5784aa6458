use anyhow::{anyhow, Context, Result};
use image::GrayImage;
use std::process::Command;
use tempfile::NamedTempFile;

use super::setup::TesseractPaths;

/// Reads the text in a binarized badge crop.
///
/// Implementations are shared across OCR worker threads.
pub trait TextRecognizer: Sync {
    fn recognize(&self, img: &GrayImage) -> Result<String>;
}

/// Runs the Tesseract command line on each image.
pub struct TesseractRecognizer {
    paths: TesseractPaths,
}

impl TesseractRecognizer {
    pub fn new(paths: TesseractPaths) -> Self {
        Self { paths }
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognize(&self, img: &GrayImage) -> Result<String> {
        let temp_input = NamedTempFile::with_suffix(".png")?;
        img.save(temp_input.path())
            .context("Failed to write OCR input image")?;

        let mut command = Command::new(&self.paths.executable);
        command.arg(temp_input.path()).arg("stdout");
        if let Some(tessdata) = &self.paths.tessdata {
            command.arg("--tessdata-dir").arg(tessdata);
        }
        // Badges hold a single line of text
        let output = command
            .arg("-l")
            .arg("eng")
            .arg("--psm")
            .arg("7")
            .output()
            .context("Failed to run tesseract")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("Tesseract failed: {}", stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
