//! Tile an image logo or rendered text across a photograph.
//!
//! Every composition runs the same four stages from scratch:
//!
//! 1. **Mark preparation** ([`mark`]): bake opacity (and color, for text) into
//!    one RGBA copy of the mark, resize it, then rotate it with an expanded
//!    bounding box.
//! 2. **Layout** ([`layout`]): derive the gap between copies and the number of
//!    repetitions from the *rotated* footprint and the spacing coefficients.
//! 3. **Tiling** ([`tiler`]): paste copies onto a transparent overlay in a
//!    single, grid or staggered (diamond) pattern.
//! 4. **Compositing** ([`blending`]): alpha-composite the overlay over the base.
//!
//! # Quick Start
//!
//! ```no_run
//! use watermark_studio::{compose, MarkSource, PatternMode, WatermarkParams};
//!
//! let base = image::open("photo.jpg").unwrap().to_rgba8();
//! let logo = image::open("logo.png").unwrap().to_rgba8();
//! let params = WatermarkParams::default().with_pattern(PatternMode::Grid);
//!
//! let result = compose(&base, MarkSource::Logo(&logo), &params).unwrap();
//! watermark_studio::save_image(&result.image, "photo_marked".as_ref()).unwrap();
//! ```
//!
//! # Interactive use
//!
//! [`Workbench`] holds the base-image context and one tool per mark kind,
//! de-duplicates the "no mark yet" advisory and discards stale results when
//! the base image changes.
//!
//! ```no_run
//! use watermark_studio::{FontCatalog, Tool, ToolKind, Workbench};
//!
//! let fonts = FontCatalog::scan("Fonts".as_ref()).unwrap();
//! let mut bench = Workbench::new(fonts);
//! bench.open_base("photo.jpg".as_ref()).unwrap();
//!
//! let text = bench.text_tool().unwrap();
//! text.set_text("(c) 2026");
//! let preview = text.recompose().unwrap();
//! ```

#![deny(missing_docs)]

pub mod blending;
pub mod color;
mod engine;
pub mod error;
pub mod fonts;
pub mod layout;
pub mod mark;
pub mod params;
pub mod session;
pub mod tiler;

pub use engine::{
    compose, compose_file, is_supported_image, load_image, resolve_output_path, save_image,
    Composition, DEFAULT_OUTPUT_EXTENSION,
};
pub use error::{Error, Result};
pub use fonts::FontCatalog;
pub use layout::Layout;
pub use mark::{MarkKind, MarkSource, TextMark};
pub use params::{
    Opacity, PatternMode, Rotation, SizeCoefficient, SpacingCoefficient, WatermarkParams,
};
pub use session::{LogoTool, TextTool, Tool, ToolKind, Workbench};
pub use tiler::TileOutcome;
