//! Pattern tiling: where copies of the mark go, and pasting them.
//!
//! Placement is computed separately from pasting so the coordinate
//! bookkeeping can be inspected without rendering.

use image::{Rgba, RgbaImage};
use tracing::debug;

use crate::blending;
use crate::layout::Layout;
use crate::params::PatternMode;

/// What the tiler did to the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileOutcome {
    /// Copies were pasted (some may have been fully clipped).
    Drawn {
        /// Number of paste operations performed.
        instances: usize,
    },
    /// The mark has zero width or height; nothing was drawn.
    Degenerate,
}

/// Starting pixel of the overlay: white with zero alpha.
pub const CLEAR_OVERLAY: Rgba<u8> = Rgba([255, 255, 255, 0]);

/// A clear overlay canvas of the given size.
#[must_use]
pub fn overlay(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, CLEAR_OVERLAY)
}

/// Top-left coordinates of every copy, in paste order.
///
/// - `Single`: one copy at `round((canvas - mark) / 2)` per axis.
/// - `Grid`: rows `0..=reps_y`, columns `0..=reps_x`, row-major from the
///   top-left, at `(col * gap_x, row * gap_y)`.
/// - `Staggered`: as `Grid`, but even rows (starting with row 0) are shifted
///   right by `round(gap_x / 2)`.
///
/// Yields nothing for a zero-size mark. Coordinates are produced lazily.
pub fn placements(
    mode: PatternMode,
    (canvas_w, canvas_h): (u32, u32),
    (mark_w, mark_h): (u32, u32),
    layout: &Layout,
) -> impl Iterator<Item = (i64, i64)> {
    let (origin_x, origin_y, reps_x, reps_y, shift) = match mode {
        PatternMode::Single => (centered(canvas_w, mark_w), centered(canvas_h, mark_h), 0, 0, 0),
        PatternMode::Grid => (0, 0, layout.reps_x, layout.reps_y, 0),
        PatternMode::Staggered => (0, 0, layout.reps_x, layout.reps_y, half(layout.gap_x)),
    };
    let gap_x = i64::from(layout.gap_x);
    let gap_y = i64::from(layout.gap_y);

    #[allow(clippy::reversed_empty_ranges)]
    let rows = if mark_w == 0 || mark_h == 0 {
        1..=0
    } else {
        0..=reps_y
    };

    rows.flat_map(move |row| {
        let start_x = origin_x + if row % 2 == 0 { shift } else { 0 };
        let y = origin_y + i64::from(row) * gap_y;
        (0..=reps_x).map(move |col| (start_x + i64::from(col) * gap_x, y))
    })
}

#[allow(clippy::cast_possible_truncation)]
fn centered(canvas: u32, mark: u32) -> i64 {
    ((f64::from(canvas) - f64::from(mark)) / 2.0).round() as i64
}

#[allow(clippy::cast_possible_truncation)]
fn half(gap: u32) -> i64 {
    (f64::from(gap) / 2.0).round() as i64
}

/// Paste `mark` onto `overlay` according to `mode` and `layout`.
///
/// Each paste uses the mark's own alpha as its mask and mixes all four
/// channels (see [`blending::mix_masked`]).
pub fn tile(
    overlay: &mut RgbaImage,
    mark: &RgbaImage,
    mode: PatternMode,
    layout: &Layout,
) -> TileOutcome {
    if mark.width() == 0 || mark.height() == 0 {
        debug!("zero-size mark, nothing to tile");
        return TileOutcome::Degenerate;
    }

    let mut instances = 0;
    for (x, y) in placements(mode, overlay.dimensions(), mark.dimensions(), layout) {
        blending::paste_masked(overlay, mark, x, y);
        instances += 1;
    }
    debug!(?mode, instances, "mark tiled");
    TileOutcome::Drawn { instances }
}
