//! Error types for the watermark-studio crate.

use crate::mark::MarkKind;

/// Errors that can occur while preparing, tiling, compositing or saving a watermark.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A tool was asked to compose before it was given a mark.
    #[error("no {0} mark has been supplied yet")]
    MissingMark(MarkKind),

    /// A tool action was requested before any base image was opened.
    #[error("open a base image first")]
    MissingBaseImage,

    /// An image could not be decoded, or an output extension is not jpg/jpeg/png.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// Tiling was requested before a pattern mode was ever selected.
    #[error("no pattern mode selected")]
    PatternNotSelected,

    /// A parameter value lies outside its slider range.
    #[error("{name} must be between {min} and {max}, got {value}")]
    ParameterOutOfRange {
        /// Parameter name.
        name: &'static str,
        /// Rejected value.
        value: i64,
        /// Inclusive lower bound.
        min: i64,
        /// Inclusive upper bound.
        max: i64,
    },

    /// Font bytes could not be parsed as a TrueType/OpenType face.
    #[error("failed to load font: {0}")]
    FontLoad(String),

    /// The requested font name is not in the catalog.
    #[error("unknown font: {0}")]
    UnknownFont(String),

    /// The requested color is neither a palette name nor a hex color.
    #[error("unknown color: {0}")]
    UnknownColor(String),

    /// The requested pattern name is not one of single, grid or staggered.
    #[error("unknown pattern: {0}")]
    UnknownPattern(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error occurred during image encoding.
    #[error("image processing error: {0}")]
    Image(#[from] image::ImageError),
}

impl Error {
    /// Map a decode failure onto the crate taxonomy.
    ///
    /// Undecodable data becomes [`Error::UnsupportedFormat`]; I/O failures stay I/O.
    pub(crate) fn from_decode(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(io) => Error::Io(io),
            image::ImageError::Decoding(_) | image::ImageError::Unsupported(_) => {
                Error::UnsupportedFormat(err.to_string())
            }
            other => Error::Image(other),
        }
    }
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
