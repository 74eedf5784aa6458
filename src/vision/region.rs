//! Card list panel detection.
//!
//! The collection screen draws the card list on a white panel surrounded by
//! non-white app chrome. The panel is found with two independent 1-D scans of
//! the binarized screenshot: rows first, then columns restricted to the row span.

use image::GrayImage;
use serde::Serialize;

use super::preprocess::WHITE;
use crate::config::LocatorConfig;

/// Axis-aligned box in screenshot coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ContentRegion {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
    pub width: u32,
    pub height: u32,
}

impl ContentRegion {
    fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Option<Self> {
        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        Some(Self {
            x1,
            y1,
            x2,
            y2,
            width: x2 - x1,
            height: y2 - y1,
        })
    }
}

fn white_ratio(count: usize, total: u32) -> f32 {
    count as f32 / total as f32
}

fn row_is_boundary(bin: &GrayImage, y: u32, threshold: f32) -> bool {
    let whites = (0..bin.width())
        .filter(|&x| bin.get_pixel(x, y)[0] == WHITE)
        .count();
    white_ratio(whites, bin.width()) >= threshold
}

fn column_is_boundary(bin: &GrayImage, x: u32, y1: u32, y2: u32, threshold: f32) -> bool {
    let whites = (y1..y2)
        .filter(|&y| bin.get_pixel(x, y)[0] == WHITE)
        .count();
    white_ratio(whites, y2 - y1) >= threshold
}

/// Locates the white card list panel in a binarized screenshot.
///
/// Returns `None` if any of the four boundaries is missing or the box would be
/// empty; callers treat that as "nothing to import".
pub fn locate(bin: &GrayImage, config: &LocatorConfig) -> Option<ContentRegion> {
    let (width, height) = bin.dimensions();
    if width == 0 || height == 0 {
        return None;
    }

    let y1 = (0..height).find(|&y| row_is_boundary(bin, y, config.x_threshold))?;
    let y2 = (0..height)
        .rev()
        .find(|&y| row_is_boundary(bin, y, config.x_threshold))?;
    if y2 <= y1 {
        return None;
    }

    let x1 = (0..width).find(|&x| column_is_boundary(bin, x, y1, y2, config.y_threshold))?;
    let x2 = (0..width)
        .rev()
        .find(|&x| column_is_boundary(bin, x, y1, y2, config.y_threshold))?;

    ContentRegion::new(x1, y1, x2, y2)
}
