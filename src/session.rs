//! Tool state for an interactive shell.
//!
//! A [`Workbench`] owns the base-image context and at most one tool of each
//! kind. Each tool keeps its own mark, its current [`WatermarkParams`] and its
//! last successful [`Composition`]. The shell decides *when* to call
//! [`Workbench::recompose`]; every call rebuilds the image from scratch.

use std::path::{Path, PathBuf};

use ab_glyph::FontArc;
use image::{Rgb, RgbaImage};
use tracing::{info, warn};

use crate::color;
use crate::engine::{self, Composition};
use crate::error::{Error, Result};
use crate::fonts::FontCatalog;
use crate::mark::{self, MarkSource, TextMark};
use crate::params::{PatternMode, WatermarkParams};

pub use crate::mark::MarkKind as ToolKind;

/// Text shown by a freshly opened or reset text tool.
pub const DEFAULT_TEXT: &str = "Your Text";

/// State shared by both tool kinds: base context, parameters, last result.
#[derive(Debug, Default)]
pub struct ToolState {
    base: Option<PathBuf>,
    params: WatermarkParams,
    missing_mark_reported: bool,
    last: Option<Composition>,
}

impl ToolState {
    fn new(base: PathBuf) -> Self {
        Self {
            base: Some(base),
            ..Self::default()
        }
    }

    fn base_changed(&mut self, base: &Path) {
        self.base = Some(base.to_path_buf());
        self.last = None;
    }

    fn reset(&mut self) {
        self.params = WatermarkParams::default();
        self.missing_mark_reported = false;
        self.last = None;
    }
}

/// Operations common to the logo and text tools.
pub trait Tool {
    /// Which mark this tool produces.
    fn kind(&self) -> ToolKind;

    /// The mark as it currently stands, if one has been supplied.
    fn mark(&self) -> Option<MarkSource<'_>>;

    #[doc(hidden)]
    fn state(&self) -> &ToolState;

    #[doc(hidden)]
    fn state_mut(&mut self) -> &mut ToolState;

    /// Current parameters.
    fn params(&self) -> &WatermarkParams {
        &self.state().params
    }

    /// Replace the parameters wholesale.
    fn set_params(&mut self, params: WatermarkParams) {
        self.state_mut().params = params;
    }

    /// Select a pattern mode, discarding the previous selection.
    fn select_pattern(&mut self, mode: PatternMode) {
        self.state_mut().params.pattern = Some(mode);
    }

    /// Last successful composition, if any since the base image last changed.
    fn last(&self) -> Option<&Composition> {
        self.state().last.as_ref()
    }

    /// Point the tool at a new base image and drop work tied to the old one.
    fn base_changed(&mut self, base: &Path) {
        self.state_mut().base_changed(base);
    }

    /// Rebuild the watermarked image from the current base, mark and params.
    ///
    /// Returns `Ok(None)` when the mark is still missing and that has already
    /// been reported once. On error the previous composition is kept.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingBaseImage`] on every call while no base is set.
    /// - [`Error::MissingMark`] the first time a mark is missing.
    /// - Any decode or precondition failure from [`engine::compose_file`].
    fn recompose(&mut self) -> Result<Option<&Composition>> {
        let base = self.state().base.clone().ok_or(Error::MissingBaseImage)?;
        let composed = self
            .mark()
            .map(|mark| engine::compose_file(&base, mark, self.params()));

        let kind = self.kind();
        let state = self.state_mut();
        match composed {
            None if state.missing_mark_reported => Ok(None),
            None => {
                state.missing_mark_reported = true;
                warn!(%kind, "recomposition requested without a mark");
                Err(Error::MissingMark(kind))
            }
            Some(result) => {
                state.last = Some(result?);
                Ok(state.last.as_ref())
            }
        }
    }

    /// Write the last composition to `path`, returning the path written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingMark`] if nothing has been composed yet, or any
    /// error from [`engine::save_image`].
    fn save(&self, path: &Path) -> Result<PathBuf> {
        let composition = self.last().ok_or(Error::MissingMark(self.kind()))?;
        engine::save_image(&composition.image, path)
    }
}

/// Tool that stamps an image logo.
#[derive(Debug)]
pub struct LogoTool {
    state: ToolState,
    logo: Option<RgbaImage>,
}

impl LogoTool {
    fn new(base: PathBuf) -> Self {
        Self {
            state: ToolState::new(base),
            logo: None,
        }
    }

    /// Use `logo` as the mark and select the single pattern.
    pub fn set_logo(&mut self, logo: RgbaImage) {
        self.logo = Some(logo);
        self.state.missing_mark_reported = false;
        self.select_pattern(PatternMode::Single);
    }

    /// Decode a logo file and use it as the mark.
    ///
    /// # Errors
    ///
    /// Returns any error from [`mark::load_logo`]; the previous logo is kept.
    pub fn open_logo(&mut self, path: &Path) -> Result<()> {
        let logo = mark::load_logo(path)?;
        info!(path = %path.display(), width = logo.width(), height = logo.height(), "logo opened");
        self.set_logo(logo);
        Ok(())
    }

    /// Forget the logo and return every parameter to its default.
    pub fn reset(&mut self) {
        self.logo = None;
        self.state.reset();
    }
}

impl Tool for LogoTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Logo
    }

    fn mark(&self) -> Option<MarkSource<'_>> {
        self.logo.as_ref().map(MarkSource::Logo)
    }

    fn state(&self) -> &ToolState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ToolState {
        &mut self.state
    }
}

/// Tool that stamps rendered text.
#[derive(Debug)]
pub struct TextTool {
    state: ToolState,
    text: String,
    color: Rgb<u8>,
    font_name: Option<String>,
    font: Option<FontArc>,
}

impl TextTool {
    fn new(base: PathBuf) -> Self {
        Self {
            state: ToolState::new(base),
            text: DEFAULT_TEXT.to_string(),
            color: color::default_color(),
            font_name: None,
            font: None,
        }
    }

    /// Replace the text; an empty string draws nothing.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Current text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Set the fill color.
    pub fn set_color(&mut self, color: Rgb<u8>) {
        self.color = color;
    }

    /// Current fill color.
    #[must_use]
    pub fn color(&self) -> Rgb<u8> {
        self.color
    }

    /// Use an already loaded font face.
    pub fn set_font(&mut self, name: impl Into<String>, font: FontArc) {
        self.font_name = Some(name.into());
        self.font = Some(font);
        self.state.missing_mark_reported = false;
    }

    /// Name of the selected font, if any.
    #[must_use]
    pub fn font_name(&self) -> Option<&str> {
        self.font_name.as_deref()
    }

    /// Select a font from the catalog by name.
    ///
    /// # Errors
    ///
    /// Returns any error from [`FontCatalog::load`]; the previous font is kept.
    pub fn select_font(&mut self, catalog: &FontCatalog, name: &str) -> Result<()> {
        let font = catalog.load(name)?;
        self.set_font(name, font);
        Ok(())
    }

    /// Restore the default text, color, first catalog font and single pattern.
    ///
    /// # Errors
    ///
    /// Returns any error from loading the first catalog font. Parameters are
    /// reset regardless.
    pub fn reset(&mut self, catalog: &FontCatalog) -> Result<()> {
        self.state.reset();
        self.text = DEFAULT_TEXT.to_string();
        self.color = color::default_color();
        self.select_pattern(PatternMode::Single);
        match catalog.first() {
            Some(first) => self.select_font(catalog, first),
            None => Ok(()),
        }
    }
}

impl Tool for TextTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Text
    }

    fn mark(&self) -> Option<MarkSource<'_>> {
        self.font.as_ref().map(|font| {
            MarkSource::Text(TextMark {
                text: &self.text,
                font,
                color: self.color,
            })
        })
    }

    fn state(&self) -> &ToolState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ToolState {
        &mut self.state
    }
}

/// Base-image context plus at most one open tool per kind.
#[derive(Debug, Default)]
pub struct Workbench {
    base: Option<PathBuf>,
    fonts: FontCatalog,
    logo: Option<LogoTool>,
    text: Option<TextTool>,
}

impl Workbench {
    /// Create a workbench with no base image and the given font catalog.
    #[must_use]
    pub fn new(fonts: FontCatalog) -> Self {
        Self {
            fonts,
            ..Self::default()
        }
    }

    /// The font catalog offered to the text tool.
    #[must_use]
    pub fn fonts(&self) -> &FontCatalog {
        &self.fonts
    }

    /// Path of the current base image.
    #[must_use]
    pub fn base(&self) -> Option<&Path> {
        self.base.as_deref()
    }

    /// Open a new base image and notify every open tool.
    ///
    /// Returns the decoded image for display.
    ///
    /// # Errors
    ///
    /// Returns any error from [`engine::load_image`]; the previous base is kept.
    pub fn open_base(&mut self, path: &Path) -> Result<RgbaImage> {
        let image = engine::load_image(path)?;
        info!(path = %path.display(), width = image.width(), height = image.height(), "base image changed");

        self.base = Some(path.to_path_buf());
        if let Some(tool) = self.logo.as_mut() {
            tool.base_changed(path);
        }
        if let Some(tool) = self.text.as_mut() {
            tool.base_changed(path);
        }
        Ok(image)
    }

    fn require_base(&self) -> Result<PathBuf> {
        self.base.clone().ok_or(Error::MissingBaseImage)
    }

    /// The logo tool, opening it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingBaseImage`] every time while no base is open.
    pub fn logo_tool(&mut self) -> Result<&mut LogoTool> {
        let base = self.require_base()?;
        Ok(self.logo.get_or_insert_with(|| LogoTool::new(base)))
    }

    /// The text tool, opening it with its defaults if needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingBaseImage`] every time while no base is open,
    /// or a font load error when opening with the first catalog font.
    pub fn text_tool(&mut self) -> Result<&mut TextTool> {
        let base = self.require_base()?;
        let tool = match self.text.take() {
            Some(tool) => tool,
            None => {
                let mut tool = TextTool::new(base);
                tool.reset(&self.fonts)?;
                tool
            }
        };
        Ok(self.text.insert(tool))
    }

    /// The open tool of `kind` as a trait object, opening it if needed.
    ///
    /// # Errors
    ///
    /// Same as [`Workbench::logo_tool`] and [`Workbench::text_tool`].
    pub fn tool(&mut self, kind: ToolKind) -> Result<&mut dyn Tool> {
        match kind {
            ToolKind::Logo => Ok(self.logo_tool()?),
            ToolKind::Text => Ok(self.text_tool()?),
        }
    }

    /// Whether a tool of `kind` is open.
    #[must_use]
    pub fn is_open(&self, kind: ToolKind) -> bool {
        match kind {
            ToolKind::Logo => self.logo.is_some(),
            ToolKind::Text => self.text.is_some(),
        }
    }

    /// Close the tool of `kind`, freeing its slot. Returns whether one was open.
    pub fn close(&mut self, kind: ToolKind) -> bool {
        match kind {
            ToolKind::Logo => self.logo.take().is_some(),
            ToolKind::Text => self.text.take().is_some(),
        }
    }

    /// Recompose with the tool of `kind`.
    ///
    /// # Errors
    ///
    /// See [`Tool::recompose`].
    pub fn recompose(&mut self, kind: ToolKind) -> Result<Option<&Composition>> {
        self.tool(kind)?.recompose()
    }

    /// Reset the tool of `kind` and return the clean base image for display.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingBaseImage`] while no base is open, or any error
    /// from decoding the base or loading the default font.
    pub fn reset(&mut self, kind: ToolKind) -> Result<RgbaImage> {
        let base = self.require_base()?;
        match kind {
            ToolKind::Logo => self.logo_tool()?.reset(),
            ToolKind::Text => match self.text.as_mut() {
                Some(tool) => tool.reset(&self.fonts)?,
                None => {
                    self.text_tool()?;
                }
            },
        }
        engine::load_image(&base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn write_base(dir: &Path, name: &str, w: u32, h: u32) -> PathBuf {
        let path = dir.join(name);
        RgbaImage::from_pixel(w, h, Rgba([200, 10, 10, 255]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn tools_require_a_base_image_every_time() {
        let mut bench = Workbench::default();
        for _ in 0..3 {
            assert!(matches!(bench.logo_tool(), Err(Error::MissingBaseImage)));
            assert!(matches!(bench.text_tool(), Err(Error::MissingBaseImage)));
            assert!(matches!(
                bench.recompose(ToolKind::Logo),
                Err(Error::MissingBaseImage)
            ));
        }
    }

    #[test]
    fn missing_mark_is_reported_once() {
        let dir = tempfile::tempdir().unwrap();
        let base = write_base(dir.path(), "base.png", 30, 20);
        let mut bench = Workbench::default();
        bench.open_base(&base).unwrap();

        assert!(matches!(
            bench.recompose(ToolKind::Logo),
            Err(Error::MissingMark(ToolKind::Logo))
        ));
        assert!(bench.recompose(ToolKind::Logo).unwrap().is_none());
        assert!(bench.recompose(ToolKind::Logo).unwrap().is_none());

        // No catalog fonts, so the text tool has no mark either
        assert!(matches!(
            bench.recompose(ToolKind::Text),
            Err(Error::MissingMark(ToolKind::Text))
        ));
    }

    #[test]
    fn one_tool_per_kind() {
        let dir = tempfile::tempdir().unwrap();
        let base = write_base(dir.path(), "base.png", 30, 20);
        let mut bench = Workbench::default();
        bench.open_base(&base).unwrap();

        bench.logo_tool().unwrap().set_logo(RgbaImage::new(2, 2));
        // Reopening returns the same tool, logo intact
        assert!(bench.logo_tool().unwrap().mark().is_some());
        assert!(bench.is_open(ToolKind::Logo));
        assert!(!bench.is_open(ToolKind::Text));

        assert!(bench.close(ToolKind::Logo));
        assert!(!bench.close(ToolKind::Logo));
        assert!(bench.logo_tool().unwrap().mark().is_none());
    }

    #[test]
    fn base_change_discards_previous_composition() {
        let dir = tempfile::tempdir().unwrap();
        let first = write_base(dir.path(), "first.png", 30, 20);
        let second = write_base(dir.path(), "second.png", 50, 40);
        let mut bench = Workbench::default();
        bench.open_base(&first).unwrap();

        let tool = bench.logo_tool().unwrap();
        tool.set_logo(RgbaImage::from_pixel(4, 4, Rgba([0, 0, 255, 255])));
        assert_eq!(
            tool.recompose().unwrap().unwrap().image.dimensions(),
            (30, 20)
        );

        bench.open_base(&second).unwrap();
        let tool = bench.logo_tool().unwrap();
        assert!(tool.last().is_none());
        assert_eq!(
            tool.recompose().unwrap().unwrap().image.dimensions(),
            (50, 40)
        );
    }

    #[test]
    fn failed_recompose_keeps_previous_result() {
        let dir = tempfile::tempdir().unwrap();
        let base = write_base(dir.path(), "base.png", 30, 20);
        let mut bench = Workbench::default();
        bench.open_base(&base).unwrap();

        let tool = bench.logo_tool().unwrap();
        tool.set_logo(RgbaImage::from_pixel(4, 4, Rgba([0, 0, 255, 255])));
        tool.recompose().unwrap();

        std::fs::write(&base, b"corrupted").unwrap();
        assert!(matches!(tool.recompose(), Err(Error::UnsupportedFormat(_))));
        assert!(tool.last().is_some());
    }

    #[test]
    fn reset_restores_defaults_and_returns_clean_base() {
        let dir = tempfile::tempdir().unwrap();
        let base = write_base(dir.path(), "base.png", 30, 20);
        let mut bench = Workbench::default();
        bench.open_base(&base).unwrap();

        let tool = bench.logo_tool().unwrap();
        tool.set_logo(RgbaImage::from_pixel(4, 4, Rgba([0, 0, 255, 255])));
        tool.select_pattern(PatternMode::Grid);
        tool.recompose().unwrap();

        let clean = bench.reset(ToolKind::Logo).unwrap();
        assert!(clean.pixels().all(|p| *p == Rgba([200, 10, 10, 255])));
        let tool = bench.logo_tool().unwrap();
        assert!(tool.mark().is_none());
        assert!(tool.last().is_none());
        assert_eq!(*tool.params(), WatermarkParams::default());
    }

    #[test]
    fn save_without_composition_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let base = write_base(dir.path(), "base.png", 30, 20);
        let mut bench = Workbench::default();
        bench.open_base(&base).unwrap();

        let tool = bench.logo_tool().unwrap();
        assert!(matches!(
            tool.save(&dir.path().join("out")),
            Err(Error::MissingMark(ToolKind::Logo))
        ));
    }
}
