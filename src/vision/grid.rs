//! Card grid segmentation.
//!
//! Card thumbnails are squares on a white background. The grid is recovered
//! from two 1-D scans of the binarized panel:
//! - a row scan down a single column, measuring icon heights and row tops
//! - a column scan along a single line, measuring icon widths and column lefts
//!
//! A thumbnail crossed by a scan line does not show up as one solid run: the
//! frame and artwork leave white gaps, so an icon is a group of runs. A white
//! gap of at least `icon_gap` always ends the group.
//!
//! Once both averages are known every column and every row is scanned again,
//! so a blank cell in the first column or row does not hide the rest of its
//! row or column. All the heuristic thresholds live in [`GridStrategy`].

use image::GrayImage;
use serde::{Deserialize, Serialize};

use super::preprocess::WHITE;

/// Thresholds driving the grid scans.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GridStrategy {
    /// Non-white runs assumed to make up one icon along a scan line
    pub segments_per_icon: usize,
    /// Column scan gives up on a line once it needs more runs than this
    pub max_segments: usize,
    /// Icon widths below this mean the run grouping is wrong (pixels)
    pub min_icon_width: u32,
    /// Column starts closer than this to the previous one are noise (pixels)
    pub min_column_spacing: u32,
    /// A white gap at least this wide separates two icons (pixels)
    pub icon_gap: u32,
    /// Column scan starts this far above the first row top (pixels)
    pub column_scan_margin: u32,
    /// After abandoning a line, resume this far above the second row top (pixels)
    pub retry_row_offset: u32,
    /// Leading runs shorter than this are strays, not icons (pixels)
    pub min_row_span: u32,
    /// Row scan resumes this far below a stray (pixels)
    pub stray_skip: u32,
    /// Maximum difference between consecutive icon heights (pixels)
    pub row_height_tolerance: u32,
    /// Icons found when rescanning must be within this of the average width (pixels)
    pub column_width_tolerance: u32,
    /// First row top is pulled up when its height is off by at least this much (pixels)
    pub first_row_fix_min: u32,
    /// Added to the measured icon size for the crop square (pixels)
    pub cell_padding: u32,
}

impl Default for GridStrategy {
    fn default() -> Self {
        Self {
            segments_per_icon: 2,
            max_segments: 3,
            min_icon_width: 60,
            min_column_spacing: 20,
            icon_gap: 20,
            column_scan_margin: 20,
            retry_row_offset: 15,
            min_row_span: 30,
            stray_skip: 20,
            row_height_tolerance: 10,
            column_width_tolerance: 10,
            first_row_fix_min: 4,
            cell_padding: 4,
        }
    }
}

/// Detected card grid in panel coordinates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GridLayout {
    /// Side of the square cropped for every card
    pub cell_size: u32,
    /// Left edge of every column, strictly increasing
    pub column_start_x: Vec<u32>,
    /// Top edge of every row
    pub row_start_y: Vec<u32>,
}

impl GridLayout {
    /// Cell origins in column-major order (columns outer, rows inner).
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.column_start_x
            .iter()
            .flat_map(move |&x| self.row_start_y.iter().map(move |&y| (x, y)))
    }

    pub fn cell_count(&self) -> usize {
        self.column_start_x.len() * self.row_start_y.len()
    }
}

/// A non-white run `[start, end)` along a scan line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Run {
    pub start: u32,
    pub end: u32,
}

impl Run {
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

fn total_len(runs: &[Run]) -> u32 {
    runs.iter().map(Run::len).sum()
}

fn is_ink(bin: &GrayImage, x: u32, y: u32) -> bool {
    bin.get_pixel(x, y)[0] < WHITE
}

/// True when `run` starts at least `icon_gap` after the group's last run.
fn ends_group(group: &[Run], run: &Run, strategy: &GridStrategy) -> bool {
    group
        .last()
        .is_some_and(|prev| run.start - prev.end >= strategy.icon_gap)
}

/// Sorts positions and drops any closer than `min_gap` to the one kept before it.
fn merge_positions(mut positions: Vec<u32>, min_gap: u32) -> Vec<u32> {
    positions.sort_unstable();
    let mut merged: Vec<u32> = Vec::with_capacity(positions.len());
    for p in positions {
        if merged.last().is_some_and(|&last| p - last < min_gap) {
            continue;
        }
        merged.push(p);
    }
    merged
}

fn rounded_mean(values: &[u32]) -> u32 {
    let sum: u64 = values.iter().map(|&v| v as u64).sum();
    (sum as f64 / values.len() as f64).round() as u32
}

/// One icon seen by the row scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowMeasure {
    pub top: u32,
    pub height: u32,
}

/// Result of scanning one column from a given top.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowPass {
    /// Icons accepted during this pass
    pub measures: Vec<RowMeasure>,
    /// Set when the pass hit a stray; the remaining region starts here
    pub resume_at: Option<u32>,
}

/// Scans column `x` downward from `top`.
///
/// Runs are grouped `segments_per_icon` at a time, or fewer when a wide white
/// gap ends the icon early. An icon whose height differs from the previous
/// accepted one by more than the tolerance is dropped. A leading run shorter
/// than `min_row_span` stops the pass and reports where the remaining region
/// begins.
pub fn scan_column_pass(
    bin: &GrayImage,
    x: u32,
    top: u32,
    last_height: Option<u32>,
    strategy: &GridStrategy,
) -> RowPass {
    let segments = strategy.segments_per_icon.max(1);
    let mut measures = Vec::new();
    let mut last_height = last_height;
    let mut group: Vec<Run> = Vec::with_capacity(segments);
    let mut run_start: Option<u32> = None;

    for y in top..bin.height() {
        let ink = is_ink(bin, x, y);
        match (run_start, ink) {
            (None, true) => run_start = Some(y),
            (Some(start), false) => {
                run_start = None;
                let run = Run { start, end: y };

                if ends_group(&group, &run, strategy) {
                    accept_icon(&group, &mut last_height, &mut measures, strategy);
                    group.clear();
                }

                if group.is_empty() && run.len() < strategy.min_row_span {
                    return RowPass {
                        measures,
                        resume_at: Some(run.end + strategy.stray_skip),
                    };
                }

                group.push(run);
                if group.len() < segments {
                    continue;
                }
                accept_icon(&group, &mut last_height, &mut measures, strategy);
                group.clear();
            }
            _ => {}
        }
    }

    if !group.is_empty() {
        accept_icon(&group, &mut last_height, &mut measures, strategy);
    }

    RowPass {
        measures,
        resume_at: None,
    }
}

fn accept_icon(
    group: &[Run],
    last_height: &mut Option<u32>,
    measures: &mut Vec<RowMeasure>,
    strategy: &GridStrategy,
) {
    let height = total_len(group);
    if let Some(prev) = *last_height {
        if height.abs_diff(prev) > strategy.row_height_tolerance {
            return;
        }
    }
    measures.push(RowMeasure {
        top: group[0].start,
        height,
    });
    *last_height = Some(height);
}

/// Averaged row measurement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowLayout {
    pub avg_height: u32,
    pub row_start_y: Vec<u32>,
}

/// Turns raw icon measurements into the average height and row tops.
///
/// The first height is left out of the average (the top row is often clipped
/// by the panel header). If it is off by `first_row_fix_min..=tolerance`
/// pixels its row top is pulled up by the difference; if it is off by more,
/// the row tops are left as they are.
pub fn finish_rows(measures: &[RowMeasure], strategy: &GridStrategy) -> Option<RowLayout> {
    let first = measures.first()?;
    let heights: Vec<u32> = measures.iter().map(|m| m.height).collect();
    let mut row_start_y: Vec<u32> = measures.iter().map(|m| m.top).collect();

    let avg_height = if heights.len() > 1 {
        rounded_mean(&heights[1..])
    } else {
        first.height
    };

    let deviation = first.height.abs_diff(avg_height);
    if (strategy.first_row_fix_min..=strategy.row_height_tolerance).contains(&deviation) {
        row_start_y[0] = row_start_y[0].saturating_sub(deviation);
    }

    Some(RowLayout {
        avg_height,
        row_start_y,
    })
}

/// Scans the whole of column `x`, restarting below every stray and keeping
/// what was measured above it.
fn scan_column(bin: &GrayImage, x: u32, strategy: &GridStrategy) -> Vec<RowMeasure> {
    let mut top = 0;
    let mut measures: Vec<RowMeasure> = Vec::new();

    loop {
        let last_height = measures.last().map(|m| m.height);
        let pass = scan_column_pass(bin, x, top, last_height, strategy);
        measures.extend(pass.measures);
        match pass.resume_at {
            Some(next) if next < bin.height() => top = next,
            _ => return measures,
        }
    }
}

/// Row scan: tries columns left to right until one yields icon heights.
pub fn measure_rows(bin: &GrayImage, strategy: &GridStrategy) -> Option<RowLayout> {
    (0..bin.width())
        .map(|x| scan_column(bin, x, strategy))
        .find(|measures| !measures.is_empty())
        .and_then(|measures| finish_rows(&measures, strategy))
}

/// Adds the row tops found down every known column.
///
/// Each column is scanned a quarter icon in from its left edge. Icons more
/// than `row_height_tolerance` off the average height are ignored, and tops
/// less than half an icon apart are one row.
pub fn fill_rows(
    bin: &GrayImage,
    rows: &RowLayout,
    columns: &ColumnLayout,
    strategy: &GridStrategy,
) -> Vec<u32> {
    let inset = columns.avg_width / 4;
    let mut tops = rows.row_start_y.clone();

    for x in columns.column_start_x.iter().map(|&x| x + inset) {
        if x >= bin.width() {
            continue;
        }
        tops.extend(
            scan_column(bin, x, strategy)
                .into_iter()
                .filter(|m| m.height.abs_diff(rows.avg_height) <= strategy.row_height_tolerance)
                .map(|m| m.top),
        );
    }

    merge_positions(tops, (rows.avg_height / 2).max(1))
}

/// Result of scanning one horizontal line for columns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LineScan {
    Columns { starts: Vec<u32>, widths: Vec<u32> },
    /// Icons looked too narrow even with `max_segments` runs per icon
    Abandoned,
    /// No complete icon on this line
    Empty,
}

/// Scans line `y` left to right for icon columns.
///
/// Starts with `segments_per_icon` runs per icon; whenever a group is narrower
/// than `min_icon_width` the line is rescanned with one more run per icon. A
/// wide white gap ends a group early, and a trailing group is kept only if it
/// is wide enough.
pub fn scan_line_for_columns(bin: &GrayImage, y: u32, strategy: &GridStrategy) -> LineScan {
    let mut segments = strategy.segments_per_icon.max(1);

    loop {
        let mut starts: Vec<u32> = Vec::new();
        let mut widths: Vec<u32> = Vec::new();
        let mut group: Vec<Run> = Vec::with_capacity(segments);
        let mut run_start: Option<u32> = None;
        let mut too_narrow = false;

        for x in 0..bin.width() {
            let ink = is_ink(bin, x, y);
            match (run_start, ink) {
                (None, true) => run_start = Some(x),
                (Some(start), false) => {
                    run_start = None;
                    let run = Run { start, end: x };

                    if ends_group(&group, &run, strategy) {
                        if !push_column(&group, &mut starts, &mut widths, strategy) {
                            too_narrow = true;
                            break;
                        }
                        group.clear();
                    }

                    group.push(run);
                    if group.len() < segments {
                        continue;
                    }
                    if !push_column(&group, &mut starts, &mut widths, strategy) {
                        too_narrow = true;
                        break;
                    }
                    group.clear();
                }
                _ => {}
            }
        }

        if too_narrow {
            segments += 1;
            if segments > strategy.max_segments {
                return LineScan::Abandoned;
            }
            continue;
        }

        if !group.is_empty() {
            push_column(&group, &mut starts, &mut widths, strategy);
        }

        return if widths.is_empty() {
            LineScan::Empty
        } else {
            LineScan::Columns { starts, widths }
        };
    }
}

/// Records one icon's column; `false` when the group is too narrow to be an icon.
fn push_column(
    group: &[Run],
    starts: &mut Vec<u32>,
    widths: &mut Vec<u32>,
    strategy: &GridStrategy,
) -> bool {
    let width = total_len(group);
    if width < strategy.min_icon_width {
        return false;
    }

    let start = group[0].start;
    if let Some(&last) = starts.last() {
        if start - last < strategy.min_column_spacing {
            return true;
        }
    }
    starts.push(start);
    widths.push(width);
    true
}

/// Averaged column measurement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnLayout {
    pub avg_width: u32,
    pub column_start_x: Vec<u32>,
}

/// Column scan: walks lines from just above the first row until one yields
/// icon widths.
pub fn measure_columns(
    bin: &GrayImage,
    row_start_y: &[u32],
    strategy: &GridStrategy,
) -> Option<ColumnLayout> {
    let first_row = *row_start_y.first()?;
    let mut y = first_row.saturating_sub(strategy.column_scan_margin);

    while y < bin.height() {
        match scan_line_for_columns(bin, y, strategy) {
            LineScan::Columns { starts, widths } => {
                return Some(ColumnLayout {
                    avg_width: rounded_mean(&widths),
                    column_start_x: starts,
                });
            }
            LineScan::Abandoned => {
                let retry = row_start_y
                    .get(1)
                    .map(|&top| top.saturating_sub(strategy.retry_row_offset));
                y = match retry {
                    Some(next) if next > y => next,
                    _ => y + 1,
                };
            }
            LineScan::Empty => y += 1,
        }
    }

    None
}

/// Adds the column starts found along every known row.
///
/// Each row is scanned a quarter icon below its top. Icons more than
/// `column_width_tolerance` off the average width are ignored, and starts less
/// than half an icon apart are one column.
pub fn fill_columns(
    bin: &GrayImage,
    columns: &ColumnLayout,
    row_start_y: &[u32],
    avg_height: u32,
    strategy: &GridStrategy,
) -> Vec<u32> {
    let inset = avg_height / 4;
    let mut starts = columns.column_start_x.clone();

    for y in row_start_y.iter().map(|&y| y + inset) {
        if y >= bin.height() {
            continue;
        }
        if let LineScan::Columns {
            starts: found,
            widths,
        } = scan_line_for_columns(bin, y, strategy)
        {
            starts.extend(
                found
                    .into_iter()
                    .zip(widths)
                    .filter(|&(_, w)| {
                        w.abs_diff(columns.avg_width) <= strategy.column_width_tolerance
                    })
                    .map(|(x, _)| x),
            );
        }
    }

    merge_positions(starts, (columns.avg_width / 2).max(1))
}

/// Recovers the card grid from the binarized panel.
///
/// Returns `None` if either scan finds nothing measurable.
pub fn segment(bin: &GrayImage, strategy: &GridStrategy) -> Option<GridLayout> {
    let rows = measure_rows(bin, strategy)?;
    let columns = measure_columns(bin, &rows.row_start_y, strategy)?;

    let row_start_y = fill_rows(bin, &rows, &columns, strategy);
    let column_start_x = fill_columns(bin, &columns, &row_start_y, rows.avg_height, strategy);

    crate::log(&format!(
        "Grid: avg width {} avg height {}, {} columns x {} rows",
        columns.avg_width,
        rows.avg_height,
        column_start_x.len(),
        row_start_y.len()
    ));

    Some(GridLayout {
        cell_size: columns.avg_width.max(rows.avg_height) + strategy.cell_padding,
        column_start_x,
        row_start_y,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::vision::preprocess::BLACK;
    use image::{ImageBuffer, Luma};

    /// Draws a `size`-pixel icon at (x, y) split into quarters by a 2-pixel
    /// white cross, the way a framed thumbnail reads after binarization.
    pub(crate) fn draw_split_icon(img: &mut GrayImage, x: u32, y: u32, size: u32) {
        let mid = size / 2;
        for dy in 0..size {
            for dx in 0..size {
                let on_cross = (mid - 1..=mid).contains(&dx) || (mid - 1..=mid).contains(&dy);
                if !on_cross {
                    img.put_pixel(x + dx, y + dy, Luma([BLACK]));
                }
            }
        }
    }

    fn white(width: u32, height: u32) -> GrayImage {
        ImageBuffer::from_pixel(width, height, Luma([WHITE]))
    }

    /// Panel with `cols` x `rows` split icons starting at (origin, origin).
    fn grid_image(cols: u32, rows: u32, size: u32, gap: u32, origin: u32) -> GrayImage {
        let pitch = size + gap;
        let mut img = white(origin * 2 + cols * pitch, origin * 2 + rows * pitch);
        for c in 0..cols {
            for r in 0..rows {
                draw_split_icon(&mut img, origin + c * pitch, origin + r * pitch, size);
            }
        }
        img
    }

    #[test]
    fn test_segment_recovers_synthetic_grid() {
        let (cols, rows, size, gap, origin) = (4, 3, 80, 24, 30);
        let img = grid_image(cols, rows, size, gap, origin);

        let layout = segment(&img, &GridStrategy::default()).unwrap();

        let expected_x: Vec<u32> = (0..cols).map(|c| origin + c * (size + gap)).collect();
        let expected_y: Vec<u32> = (0..rows).map(|r| origin + r * (size + gap)).collect();
        assert_eq!(layout.column_start_x, expected_x);
        assert_eq!(layout.row_start_y, expected_y);
        assert!(layout.cell_size.abs_diff(size) <= 4, "cell size {}", layout.cell_size);
        assert_eq!(layout.cell_count(), 12);
    }

    #[test]
    fn test_segment_single_run_icons_with_one_segment_strategy() {
        let mut img = white(400, 300);
        for c in 0..3 {
            for r in 0..2 {
                for dy in 0..70 {
                    for dx in 0..70 {
                        img.put_pixel(20 + c * 100 + dx, 20 + r * 100 + dy, Luma([BLACK]));
                    }
                }
            }
        }
        let strategy = GridStrategy {
            segments_per_icon: 1,
            ..GridStrategy::default()
        };

        let layout = segment(&img, &strategy).unwrap();
        assert_eq!(layout.column_start_x, vec![20, 120, 220]);
        assert_eq!(layout.row_start_y, vec![20, 120]);
        assert_eq!(layout.cell_size, 74);
    }

    #[test]
    fn test_segment_solid_icons_with_default_strategy() {
        let (size, gap, origin) = (80u32, 30u32, 30u32);
        let pitch = size + gap;
        let mut img = white(origin * 2 + 4 * pitch, origin * 2 + 3 * pitch);
        for c in 0..4 {
            for r in 0..3 {
                for dy in 0..size {
                    for dx in 0..size {
                        let (x, y) = (origin + c * pitch + dx, origin + r * pitch + dy);
                        img.put_pixel(x, y, Luma([BLACK]));
                    }
                }
            }
        }

        let layout = segment(&img, &GridStrategy::default()).unwrap();

        assert_eq!(layout.column_start_x, vec![30, 140, 250, 360]);
        assert_eq!(layout.row_start_y, vec![30, 140, 250]);
        assert_eq!(layout.cell_size, 84);
    }

    #[test]
    fn test_segment_keeps_row_and_column_of_a_blank_cell() {
        let (size, gap, origin) = (80, 24, 30);
        let pitch = size + gap;
        let expected_x: Vec<u32> = (0..4).map(|c| origin + c * pitch).collect();
        let expected_y: Vec<u32> = (0..3).map(|r| origin + r * pitch).collect();

        for (col, row) in [(0, 0), (0, 2), (2, 0), (3, 2)] {
            let mut img = grid_image(4, 3, size, gap, origin);
            for dy in 0..size {
                for dx in 0..size {
                    let (x, y) = (origin + col * pitch + dx, origin + row * pitch + dy);
                    img.put_pixel(x, y, Luma([WHITE]));
                }
            }

            let layout = segment(&img, &GridStrategy::default()).unwrap();

            assert_eq!(layout.column_start_x, expected_x, "blank at ({}, {})", col, row);
            assert_eq!(layout.row_start_y, expected_y, "blank at ({}, {})", col, row);
            assert_eq!(layout.cell_count(), 12);
        }
    }

    #[test]
    fn test_merge_positions_keeps_first_of_each_cluster() {
        assert_eq!(merge_positions(vec![134, 30, 36, 238, 140], 39), vec![30, 134, 238]);
        assert_eq!(merge_positions(Vec::new(), 39), Vec::<u32>::new());
    }

    #[test]
    fn test_segment_blank_panel_is_not_found() {
        assert_eq!(segment(&white(200, 200), &GridStrategy::default()), None);
    }

    #[test]
    fn test_row_pass_reports_stray_and_resumes_below() {
        let mut img = white(10, 300);
        // header text: a 10px run
        for y in 5..15 {
            img.put_pixel(0, y, Luma([BLACK]));
        }
        // one icon made of two 40px runs
        for y in (60..100).chain(102..142) {
            img.put_pixel(0, y, Luma([BLACK]));
        }
        let strategy = GridStrategy::default();

        let pass = scan_column_pass(&img, 0, 0, None, &strategy);
        assert!(pass.measures.is_empty());
        assert_eq!(pass.resume_at, Some(35));

        let pass = scan_column_pass(&img, 0, 35, None, &strategy);
        assert_eq!(pass.measures, vec![RowMeasure { top: 60, height: 80 }]);
        assert_eq!(pass.resume_at, None);

        let rows = measure_rows(&img, &strategy).unwrap();
        assert_eq!(rows.row_start_y, vec![60]);
        assert_eq!(rows.avg_height, 80);
    }

    #[test]
    fn test_row_pass_drops_icon_with_inconsistent_height() {
        let mut img = white(10, 400);
        for y in (10..50).chain(52..92) {
            img.put_pixel(0, y, Luma([BLACK]));
        }
        // 60px tall icon, 20px off the first one
        for y in (120..150).chain(152..182) {
            img.put_pixel(0, y, Luma([BLACK]));
        }
        for y in (210..250).chain(252..292) {
            img.put_pixel(0, y, Luma([BLACK]));
        }

        let pass = scan_column_pass(&img, 0, 0, None, &GridStrategy::default());
        let tops: Vec<u32> = pass.measures.iter().map(|m| m.top).collect();
        assert_eq!(tops, vec![10, 210]);
    }

    #[test]
    fn test_finish_rows_pulls_up_slightly_short_first_row() {
        let measures = [
            RowMeasure { top: 16, height: 74 },
            RowMeasure { top: 110, height: 80 },
            RowMeasure { top: 210, height: 80 },
        ];
        let rows = finish_rows(&measures, &GridStrategy::default()).unwrap();

        assert_eq!(rows.avg_height, 80);
        assert_eq!(rows.row_start_y, vec![10, 110, 210]);
    }

    #[test]
    fn test_finish_rows_leaves_far_off_first_row_untouched() {
        let measures = [
            RowMeasure { top: 40, height: 50 },
            RowMeasure { top: 110, height: 80 },
            RowMeasure { top: 210, height: 80 },
        ];
        let rows = finish_rows(&measures, &GridStrategy::default()).unwrap();

        assert_eq!(rows.avg_height, 80);
        assert_eq!(rows.row_start_y, vec![40, 110, 210]);
    }

    #[test]
    fn test_finish_rows_single_measurement() {
        let measures = [RowMeasure { top: 12, height: 77 }];
        let rows = finish_rows(&measures, &GridStrategy::default()).unwrap();

        assert_eq!(rows.avg_height, 77);
        assert_eq!(rows.row_start_y, vec![12]);
        assert_eq!(finish_rows(&[], &GridStrategy::default()), None);
    }

    #[test]
    fn test_line_scan_retries_with_three_segments() {
        // Each icon reads as 20 + 20 + 36 pixels of ink with 2px gaps
        let mut img = white(260, 1);
        for base in [10u32, 130] {
            for x in (base..base + 20).chain(base + 22..base + 42).chain(base + 44..base + 80) {
                img.put_pixel(x, 0, Luma([BLACK]));
            }
        }

        match scan_line_for_columns(&img, 0, &GridStrategy::default()) {
            LineScan::Columns { starts, widths } => {
                assert_eq!(starts, vec![10, 130]);
                assert_eq!(widths, vec![76, 76]);
            }
            other => panic!("unexpected scan result: {:?}", other),
        }
    }

    #[test]
    fn test_line_scan_wide_gap_ends_icon_early() {
        // Solid 80px icons 30px apart; the third runs off the line and is not counted
        let mut img = white(300, 1);
        for x in (10..90).chain(120..200).chain(230..300) {
            img.put_pixel(x, 0, Luma([BLACK]));
        }

        match scan_line_for_columns(&img, 0, &GridStrategy::default()) {
            LineScan::Columns { starts, widths } => {
                assert_eq!(starts, vec![10, 120]);
                assert_eq!(widths, vec![80, 80]);
            }
            other => panic!("unexpected scan result: {:?}", other),
        }
    }

    #[test]
    fn test_row_pass_wide_gap_ends_icon_early() {
        let mut img = white(10, 320);
        for y in (20..100).chain(130..210).chain(240..320) {
            img.put_pixel(0, y, Luma([BLACK]));
        }

        let pass = scan_column_pass(&img, 0, 0, None, &GridStrategy::default());
        assert_eq!(
            pass.measures,
            vec![
                RowMeasure { top: 20, height: 80 },
                RowMeasure { top: 130, height: 80 },
            ]
        );
    }

    #[test]
    fn test_line_scan_abandons_after_max_segments() {
        // Short dashes never add up to an icon width
        let mut img = white(200, 1);
        for x in (0..200).filter(|x| x % 10 < 5) {
            img.put_pixel(x, 0, Luma([BLACK]));
        }
        assert_eq!(
            scan_line_for_columns(&img, 0, &GridStrategy::default()),
            LineScan::Abandoned
        );
    }

    #[test]
    fn test_line_scan_merges_close_column_starts() {
        // Second icon starts 82px after the first, inside the configured spacing
        let mut img = white(300, 1);
        for x in (0..35).chain(37..72) {
            img.put_pixel(x, 0, Luma([BLACK]));
        }
        for x in (82..117).chain(119..154) {
            img.put_pixel(x, 0, Luma([BLACK]));
        }
        let strategy = GridStrategy {
            min_column_spacing: 100,
            ..GridStrategy::default()
        };

        match scan_line_for_columns(&img, 0, &strategy) {
            LineScan::Columns { starts, widths } => {
                assert_eq!(starts, vec![0]);
                assert_eq!(widths, vec![70]);
            }
            other => panic!("unexpected scan result: {:?}", other),
        }
    }

    #[test]
    fn test_cells_are_column_major() {
        let layout = GridLayout {
            cell_size: 10,
            column_start_x: vec![0, 50],
            row_start_y: vec![5, 60, 120],
        };
        let cells: Vec<(u32, u32)> = layout.cells().collect();
        assert_eq!(
            cells,
            vec![(0, 5), (0, 60), (0, 120), (50, 5), (50, 60), (50, 120)]
        );
    }
}
