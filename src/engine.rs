//! Core compositing pipeline and image I/O.
//!
//! [`compose`] is a pure function of the base image, the mark and the
//! parameters. Callers re-run it in full whenever anything changes; nothing
//! is cached between runs.

use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, RgbaImage};
use tracing::{info, instrument};

use crate::blending;
use crate::error::{Error, Result};
use crate::layout::{self, Layout};
use crate::mark::{self, MarkSource};
use crate::params::WatermarkParams;
use crate::tiler::{self, TileOutcome};

/// Extension appended to output paths that have none.
pub const DEFAULT_OUTPUT_EXTENSION: &str = "jpg";

/// Result of one full recomposition.
#[derive(Debug, Clone)]
pub struct Composition {
    /// The watermarked image.
    pub image: RgbaImage,
    /// Gaps and repetition counts used for tiling.
    pub layout: Layout,
    /// Whether anything was drawn.
    pub outcome: TileOutcome,
}

/// Watermark `base` with `mark`: prepare, rotate, plan, tile, composite.
///
/// The base image is never mutated; the result is a new image.
///
/// # Errors
///
/// Returns [`Error::PatternNotSelected`] if `params` has no pattern mode.
#[instrument(skip_all, fields(kind = %mark.kind(), width = base.width(), height = base.height()))]
pub fn compose(
    base: &RgbaImage,
    mark: MarkSource<'_>,
    params: &WatermarkParams,
) -> Result<Composition> {
    let mode = params.require_pattern()?;

    let prepared = mark.prepare(params);
    let rotated = mark::rotate(&prepared, params.rotation);

    let target = layout::target_for(mark.kind(), base.width(), base.height());
    let layout = layout::plan(
        rotated.dimensions(),
        params.spacing_x,
        params.spacing_y,
        target,
    );

    let mut overlay = tiler::overlay(base.width(), base.height());
    let outcome = tiler::tile(&mut overlay, &rotated, mode, &layout);

    let mut image = base.clone();
    if outcome != TileOutcome::Degenerate {
        blending::composite_over(&mut image, &overlay);
    }

    Ok(Composition {
        image,
        layout,
        outcome,
    })
}

/// Decode the base image fresh from disk and watermark it.
///
/// # Errors
///
/// Returns any error from [`load_image`] or [`compose`].
pub fn compose_file(
    base_path: &Path,
    mark: MarkSource<'_>,
    params: &WatermarkParams,
) -> Result<Composition> {
    let base = load_image(base_path)?;
    compose(&base, mark, params)
}

/// Decode an image file into RGBA.
///
/// # Errors
///
/// Returns [`Error::UnsupportedFormat`] if the data cannot be decoded and
/// [`Error::Io`] if the file cannot be read.
pub fn load_image(path: &Path) -> Result<RgbaImage> {
    let img = image::open(path).map_err(Error::from_decode)?;
    Ok(img.to_rgba8())
}

/// Check if a file has an extension the shell accepts for opening.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => matches!(ext.to_lowercase().as_str(), "jpg" | "jpeg" | "png"),
        None => false,
    }
}

/// Resolve the path an image will be written to.
///
/// A path without an extension gets `.jpg` appended. `.jpg`, `.jpeg` and
/// `.png` (any case) are kept as-is.
///
/// # Errors
///
/// Returns [`Error::UnsupportedFormat`] for any other extension.
pub fn resolve_output_path(path: &Path) -> Result<PathBuf> {
    match path.extension().and_then(|e| e.to_str()) {
        None => {
            let mut name = path.as_os_str().to_owned();
            name.push(".");
            name.push(DEFAULT_OUTPUT_EXTENSION);
            Ok(PathBuf::from(name))
        }
        Some(ext) if matches!(ext.to_lowercase().as_str(), "jpg" | "jpeg" | "png") => {
            Ok(path.to_path_buf())
        }
        Some(ext) => Err(Error::UnsupportedFormat(format!(
            "cannot save as .{ext}, use .jpg or .png"
        ))),
    }
}

/// Save a composited image.
///
/// JPEG output is flattened to RGB first; PNG keeps the alpha channel.
/// Returns the path actually written (see [`resolve_output_path`]).
///
/// # Errors
///
/// Returns an error if the extension is unsupported or writing fails.
pub fn save_image(img: &RgbaImage, path: &Path) -> Result<PathBuf> {
    let path = resolve_output_path(path)?;
    let format =
        ImageFormat::from_path(&path).map_err(|e| Error::UnsupportedFormat(e.to_string()))?;

    match format {
        ImageFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(img.clone()).to_rgb8();
            let file = std::io::BufWriter::new(std::fs::File::create(&path)?);
            let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(file, 100);
            encoder.encode_image(&rgb)?;
        }
        ImageFormat::Png => {
            img.save_with_format(&path, ImageFormat::Png)?;
        }
        _ => {
            return Err(Error::UnsupportedFormat(format!("{format:?}")));
        }
    }

    info!(path = %path.display(), ?format, "image saved");
    Ok(path)
}
