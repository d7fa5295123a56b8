//! Gap and repetition math for repeated marks.
//!
//! Both formulas run independently per axis on the *rotated* mark footprint:
//!
//! - `gap = dim` when the spacing coefficient is 0, otherwise
//!   `gap = dim + round(dim * coefficient / 10)`.
//! - `repetitions = round(target / gap)`, or 0 when the gap is 0.

use tracing::debug;

use crate::mark::MarkKind;
use crate::params::SpacingCoefficient;

/// Margin in pixels taken off the base image when tiling text.
pub const TEXT_MARGIN: u32 = 50;

/// Spacing and repetition counts for one composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Layout {
    /// Horizontal distance between consecutive copies.
    pub gap_x: u32,
    /// Vertical distance between consecutive rows.
    pub gap_y: u32,
    /// Horizontal repetition count (the tiler draws one more column).
    pub reps_x: u32,
    /// Vertical repetition count (the tiler draws one more row).
    pub reps_y: u32,
}

/// Distance between consecutive copies along one axis.
#[must_use]
pub fn gap(mark_dim: u32, coefficient: SpacingCoefficient) -> u32 {
    match coefficient.raw() {
        0 => mark_dim,
        coef => {
            let extra = (f64::from(mark_dim) * f64::from(coef) / 10.0).round();
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let extra = extra as u32;
            mark_dim + extra
        }
    }
}

/// Copies needed to span `target` pixels at the given gap.
///
/// A zero gap (zero-size mark) yields zero repetitions instead of dividing by zero.
#[must_use]
pub fn repetitions(target: u32, gap: u32) -> u32 {
    if gap == 0 {
        return 0;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let reps = (f64::from(target) / f64::from(gap)).round() as u32;
    reps
}

/// Area the repetitions must cover for a given mark kind.
///
/// Logos cover the whole base image; text leaves [`TEXT_MARGIN`] free.
#[must_use]
pub fn target_for(kind: MarkKind, base_w: u32, base_h: u32) -> (u32, u32) {
    match kind {
        MarkKind::Logo => (base_w, base_h),
        MarkKind::Text => (
            base_w.saturating_sub(TEXT_MARGIN),
            base_h.saturating_sub(TEXT_MARGIN),
        ),
    }
}

/// Plan gaps and repetitions for a (rotated) mark of `mark_w x mark_h`.
#[must_use]
pub fn plan(
    (mark_w, mark_h): (u32, u32),
    spacing_x: SpacingCoefficient,
    spacing_y: SpacingCoefficient,
    (target_w, target_h): (u32, u32),
) -> Layout {
    let gap_x = gap(mark_w, spacing_x);
    let gap_y = gap(mark_h, spacing_y);
    let layout = Layout {
        gap_x,
        gap_y,
        reps_x: repetitions(target_w, gap_x),
        reps_y: repetitions(target_h, gap_y),
    };
    debug!(
        mark_w,
        mark_h,
        target_w,
        target_h,
        gap_x = layout.gap_x,
        gap_y = layout.gap_y,
        reps_x = layout.reps_x,
        reps_y = layout.reps_y,
        "layout planned"
    );
    layout
}
