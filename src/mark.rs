//! Mark preparation: turn a logo bitmap or a text string into one RGBA
//! instance of the mark, then rotate it.
//!
//! Preparation bakes opacity (and color, for text) into the bitmap. Rotation
//! is a separate step because the rotated footprint is what the layout
//! planner measures.

use std::fmt;
use std::path::Path;

use ab_glyph::{point, Font, FontArc, PxScale, Rect, ScaleFont};
use image::imageops::{self, FilterType};
use image::{Rgb, Rgba, RgbaImage};

use crate::blending;
use crate::error::{Error, Result};
use crate::params::{Opacity, Rotation, SizeCoefficient, WatermarkParams};

/// Text em size in pixels at size coefficient 1.0.
pub const BASE_TEXT_SIZE: f64 = 70.0;

/// The two kinds of mark, one tool each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkKind {
    /// Image logo.
    Logo,
    /// Rendered text.
    Text,
}

impl fmt::Display for MarkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkKind::Logo => f.write_str("logo"),
            MarkKind::Text => f.write_str("text"),
        }
    }
}

/// A text mark: the string, its face and its fill color.
#[derive(Debug, Clone, Copy)]
pub struct TextMark<'a> {
    /// String to render; may be empty.
    pub text: &'a str,
    /// Font face (family and style).
    pub font: &'a FontArc,
    /// Fill color; alpha comes from the opacity parameter.
    pub color: Rgb<u8>,
}

/// Borrowed view of whatever mark a tool currently owns.
#[derive(Debug, Clone, Copy)]
pub enum MarkSource<'a> {
    /// A logo bitmap with alpha.
    Logo(&'a RgbaImage),
    /// A text string with font and color.
    Text(TextMark<'a>),
}

impl MarkSource<'_> {
    /// Which kind of mark this is.
    #[must_use]
    pub fn kind(&self) -> MarkKind {
        match self {
            MarkSource::Logo(_) => MarkKind::Logo,
            MarkSource::Text(_) => MarkKind::Text,
        }
    }

    /// Produce the un-rotated mark bitmap for the given parameters.
    #[must_use]
    pub fn prepare(&self, params: &WatermarkParams) -> RgbaImage {
        match self {
            MarkSource::Logo(logo) => prepare_logo(logo, params.size, params.opacity),
            MarkSource::Text(mark) => prepare_text(mark, params.size, params.opacity),
        }
    }
}

/// Decode a logo image from disk into RGBA.
///
/// # Errors
///
/// Returns [`Error::UnsupportedFormat`] if the file cannot be decoded and
/// [`Error::Io`] if it cannot be read.
pub fn load_logo(path: &Path) -> Result<RgbaImage> {
    let img = image::open(path).map_err(Error::from_decode)?;
    Ok(img.to_rgba8())
}

/// Prepare a logo: normalize alpha, stamp uniform opacity, resize.
///
/// Every pixel with non-zero source alpha ends up with alpha exactly
/// `opacity` before resizing; fully transparent pixels stay transparent.
#[must_use]
pub fn prepare_logo(logo: &RgbaImage, size: SizeCoefficient, opacity: Opacity) -> RgbaImage {
    let mut mark = RgbaImage::new(logo.width(), logo.height());
    blending::paste_over(&mut mark, logo, 0, 0);

    let alpha = opacity.alpha();
    for (px, src) in mark.pixels_mut().zip(logo.pixels()) {
        if src[3] != 0 {
            px[3] = alpha;
        }
    }

    let (w, h) = mark.dimensions();
    if w == 0 || h == 0 {
        return mark;
    }
    let new_w = scale_dimension(w, size.factor());
    let new_h = scale_dimension(h, size.factor());
    if (new_w, new_h) == (w, h) {
        return mark;
    }
    imageops::resize(&mark, new_w, new_h, FilterType::CatmullRom)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scale_dimension(dim: u32, factor: f64) -> u32 {
    ((f64::from(dim) * factor).round() as u32).max(1)
}

/// Text em size in pixels for a size coefficient: `round(70 * s)`.
#[must_use]
pub fn text_pixel_size(size: SizeCoefficient) -> f32 {
    #[allow(clippy::cast_possible_truncation)]
    let px = (BASE_TEXT_SIZE * size.factor()).round() as f32;
    px
}

/// Prepare a text mark: a transparent bitmap exactly as large as the tight
/// ink bounds of the string, filled with `(color, opacity)`.
///
/// An empty string, or one with no visible glyphs, yields a zero-area image.
#[must_use]
pub fn prepare_text(mark: &TextMark<'_>, size: SizeCoefficient, opacity: Opacity) -> RgbaImage {
    let scale = em_scale(mark.font, text_pixel_size(size));
    let glyphs = layout_line(mark.font, scale, mark.text);

    let outlined: Vec<_> = glyphs
        .into_iter()
        .filter_map(|g| mark.font.outline_glyph(g))
        .collect();

    let Some(bounds) = outlined
        .iter()
        .map(ab_glyph::OutlinedGlyph::px_bounds)
        .reduce(union)
    else {
        return RgbaImage::new(0, 0);
    };

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let (width, height) = (
        (bounds.max.x - bounds.min.x).round() as u32,
        (bounds.max.y - bounds.min.y).round() as u32,
    );
    let mut image = RgbaImage::new(width, height);
    let Rgb([r, g, b]) = mark.color;
    let alpha = f32::from(opacity.alpha());

    for glyph in &outlined {
        let gb = glyph.px_bounds();
        #[allow(clippy::cast_possible_truncation)]
        let (ox, oy) = (
            (gb.min.x - bounds.min.x).round() as i64,
            (gb.min.y - bounds.min.y).round() as i64,
        );
        glyph.draw(|x, y, coverage| {
            let px_x = ox + i64::from(x);
            let px_y = oy + i64::from(y);
            if px_x < 0 || px_y < 0 || px_x >= i64::from(width) || px_y >= i64::from(height) {
                return;
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let a = (coverage.clamp(0.0, 1.0) * alpha).round() as u8;
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let px = image.get_pixel_mut(px_x as u32, px_y as u32);
            // Overlapping glyph edges keep the stronger coverage
            if a > px[3] {
                *px = Rgba([r, g, b, a]);
            }
        });
    }

    image
}

/// Pixel scale whose em square is `em_px` pixels tall.
fn em_scale(font: &FontArc, em_px: f32) -> PxScale {
    match font.units_per_em() {
        Some(upem) if upem > 0.0 => PxScale::from(em_px * font.height_unscaled() / upem),
        _ => PxScale::from(em_px),
    }
}

/// Position glyphs on a single baseline with kerning, origin at the ascent.
fn layout_line(font: &FontArc, scale: PxScale, text: &str) -> Vec<ab_glyph::Glyph> {
    let scaled = font.as_scaled(scale);
    let mut glyphs = Vec::with_capacity(text.len());
    let mut caret = point(0.0, scaled.ascent());
    let mut prev: Option<ab_glyph::GlyphId> = None;

    for c in text.chars().filter(|c| !c.is_control()) {
        let id = scaled.glyph_id(c);
        if let Some(prev) = prev {
            caret.x += scaled.kern(prev, id);
        }
        glyphs.push(id.with_scale_and_position(scale, caret));
        caret.x += scaled.h_advance(id);
        prev = Some(id);
    }
    glyphs
}

fn union(a: Rect, b: Rect) -> Rect {
    Rect {
        min: point(a.min.x.min(b.min.x), a.min.y.min(b.min.y)),
        max: point(a.max.x.max(b.max.x), a.max.y.max(b.max.y)),
    }
}

/// Rotate a mark counter-clockwise, expanding the canvas to fit.
///
/// Multiples of 90 degrees are exact transposes. Other angles use
/// nearest-neighbour sampling; the new canvas spans
/// `ceil(max) - floor(min)` of the rotated corner coordinates.
#[must_use]
pub fn rotate(mark: &RgbaImage, rotation: Rotation) -> RgbaImage {
    let (w, h) = mark.dimensions();
    if w == 0 || h == 0 {
        return mark.clone();
    }
    match rotation.degrees() % 360 {
        0 => mark.clone(),
        90 => imageops::rotate270(mark),
        180 => imageops::rotate180(mark),
        270 => imageops::rotate90(mark),
        deg => rotate_nearest(mark, f64::from(deg)),
    }
}

fn rotate_nearest(mark: &RgbaImage, degrees: f64) -> RgbaImage {
    let (w, h) = (f64::from(mark.width()), f64::from(mark.height()));
    let theta = degrees.to_radians();
    let (sin, cos) = (round15(theta.sin()), round15(theta.cos()));

    // Half-extents of the rotated box around the source center
    let ex = (w * cos).abs() / 2.0 + (h * sin).abs() / 2.0;
    let ey = (w * sin).abs() / 2.0 + (h * cos).abs() / 2.0;
    let (cx, cy) = (w / 2.0, h / 2.0);

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let (new_w, new_h) = (
        ((cx + ex).ceil() - (cx - ex).floor()) as u32,
        ((cy + ey).ceil() - (cy - ey).floor()) as u32,
    );
    let (ncx, ncy) = (f64::from(new_w) / 2.0, f64::from(new_h) / 2.0);

    RgbaImage::from_fn(new_w, new_h, |x, y| {
        let dx = f64::from(x) + 0.5 - ncx;
        let dy = f64::from(y) + 0.5 - ncy;
        // Inverse of the counter-clockwise rotation (y axis points down)
        let sx = (cx + dx * cos - dy * sin).floor();
        let sy = (cy + dx * sin + dy * cos).floor();
        if sx < 0.0 || sy < 0.0 || sx >= w || sy >= h {
            Rgba([0, 0, 0, 0])
        } else {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let px = *mark.get_pixel(sx as u32, sy as u32);
            px
        }
    })
}

fn round15(v: f64) -> f64 {
    (v * 1e15).round() / 1e15
}
