//! Per-card crops.
//!
//! Every grid cell is cut from the unbinarized panel as a `cell_size` square.
//! Sub-regions are then taken relative to the cell size: the character art
//! (hashed), the level badge at the bottom left and the master rank badge at
//! the bottom right (both read with OCR).

use image::{GrayImage, RgbaImage};

use super::grid::GridLayout;
use super::preprocess::{crop_clamped, crop_square_padded, scale_nearest, threshold_bright_pixels};

/// Side length the master rank badge is scaled to before OCR.
pub const RANK_BADGE_SIZE: u32 = 32;

/// Above this cell size the larger-layout badge offsets apply.
const LARGE_CELL: u32 = 115;

fn scaled(cell: u32, factor: f64) -> u32 {
    (cell as f64 * factor).round() as u32
}

/// All crops taken from one grid cell.
#[derive(Clone, Debug)]
pub struct CellCrops {
    /// Cell origin in panel coordinates
    pub x: u32,
    pub y: u32,
    /// Full `cell_size` square
    pub cell: RgbaImage,
    /// Character art region used for hashing
    pub art: RgbaImage,
    /// Binarized, inverted level badge ("Lv.NN")
    pub level_badge: GrayImage,
    /// Binarized, inverted master rank badge, 32x32
    pub rank_badge: GrayImage,
}

/// Character art region: offset 16.5% and size 44.5% of the cell.
pub fn crop_art(cell: &RgbaImage) -> RgbaImage {
    let len = cell.width();
    let offset = scaled(len, 0.165);
    let size = scaled(len, 0.445);
    crop_clamped(cell, offset, offset, size, size)
}

/// Level badge: bottom-left strip, half the cell wide and a fifth tall.
pub fn crop_level_badge(badges: &GrayImage) -> GrayImage {
    let len = badges.width();
    let height = scaled(len, 0.2);
    crop_clamped(badges, 3, len - height, scaled(len, 0.5), height)
}

/// Master rank badge near the bottom-right corner, scaled to 32x32.
pub fn crop_rank_badge(badges: &GrayImage) -> GrayImage {
    let len = badges.width();
    let (inset, size) = if len > LARGE_CELL {
        (scaled(len, 0.24), scaled(len, 0.18))
    } else {
        (scaled(len, 0.253), scaled(len, 0.17))
    };
    let badge = crop_clamped(badges, len - inset, len - inset, size, size);
    if badge.width() == 0 || badge.height() == 0 {
        return GrayImage::new(RANK_BADGE_SIZE, RANK_BADGE_SIZE);
    }
    scale_nearest(&badge, RANK_BADGE_SIZE, RANK_BADGE_SIZE)
}

/// Crops every cell of the layout from the panel, columns outer, rows inner.
pub fn extract_cells(
    panel: &RgbaImage,
    layout: &GridLayout,
    badge_threshold: u8,
) -> Vec<CellCrops> {
    let len = layout.cell_size;

    layout
        .cells()
        .map(|(x, y)| {
            let cell = crop_square_padded(panel, x, y, len);
            let art = crop_art(&cell);
            let badges = threshold_bright_pixels(&cell, badge_threshold);
            let level_badge = crop_level_badge(&badges);
            let rank_badge = crop_rank_badge(&badges);

            CellCrops {
                x,
                y,
                cell,
                art,
                level_badge,
                rank_badge,
            }
        })
        .collect()
}
