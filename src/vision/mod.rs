//! Screenshot analysis: everything that touches pixels before hashing.
//!
//! This module provides:
//! - Grayscale conversion and binarization
//! - Card list panel detection
//! - Grid segmentation with tunable scan heuristics
//! - Cell, character art and badge cropping

pub mod grid;
pub mod preprocess;
pub mod region;
pub mod thumbnail;

pub use grid::{segment, GridLayout, GridStrategy};
pub use preprocess::{grayscale, preprocess, threshold_bright_pixels};
pub use region::{locate, ContentRegion};
pub use thumbnail::{extract_cells, CellCrops};
