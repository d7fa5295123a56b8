//! Validated watermark parameters.
//!
//! Every value here mirrors one slider of the interactive shell. The raw slider
//! integer is kept as-is; conversions into physical units happen at the point
//! of use (`/ 10` for size, raw value for the gap formula).

use std::fmt;

use crate::error::{Error, Result};

fn check_range(name: &'static str, value: i64, min: i64, max: i64) -> Result<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(Error::ParameterOutOfRange {
            name,
            value,
            min,
            max,
        })
    }
}

/// Mark size coefficient, raw slider value in `[1, 50]` (`x0.1` to `x5.0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeCoefficient(u8);

impl SizeCoefficient {
    /// Smallest accepted slider value.
    pub const MIN: u8 = 1;
    /// Largest accepted slider value.
    pub const MAX: u8 = 50;

    /// Validate a raw slider value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParameterOutOfRange`] outside `[1, 50]`.
    pub fn new(raw: i64) -> Result<Self> {
        check_range("size", raw, Self::MIN.into(), Self::MAX.into())?;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let value = raw as u8;
        Ok(Self(value))
    }

    /// Raw slider value.
    #[must_use]
    pub fn raw(self) -> u8 {
        self.0
    }

    /// Scale multiplier (`raw / 10`).
    #[must_use]
    pub fn factor(self) -> f64 {
        f64::from(self.0) / 10.0
    }
}

impl Default for SizeCoefficient {
    fn default() -> Self {
        Self(10)
    }
}

impl fmt::Display for SizeCoefficient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}x", self.factor())
    }
}

/// Spacing coefficient for one axis, raw slider value in `[0, 50]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpacingCoefficient(u8);

impl SpacingCoefficient {
    /// Largest accepted slider value.
    pub const MAX: u8 = 50;

    /// Validate a raw slider value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParameterOutOfRange`] outside `[0, 50]`.
    pub fn new(raw: i64) -> Result<Self> {
        check_range("spacing", raw, 0, Self::MAX.into())?;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let value = raw as u8;
        Ok(Self(value))
    }

    /// Raw slider value, used directly by the gap formula.
    #[must_use]
    pub fn raw(self) -> u8 {
        self.0
    }
}

impl Default for SpacingCoefficient {
    fn default() -> Self {
        Self(10)
    }
}

impl fmt::Display for SpacingCoefficient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}x", f64::from(self.0) / 10.0)
    }
}

/// Counter-clockwise rotation in whole degrees, `[0, 180]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rotation(u16);

impl Rotation {
    /// Largest accepted angle.
    pub const MAX: u16 = 180;

    /// Validate an angle in degrees.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParameterOutOfRange`] outside `[0, 180]`.
    pub fn new(degrees: i64) -> Result<Self> {
        check_range("rotation", degrees, 0, Self::MAX.into())?;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let value = degrees as u16;
        Ok(Self(value))
    }

    /// Angle in degrees.
    #[must_use]
    pub fn degrees(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\u{b0}", self.0)
    }
}

/// Uniform mark opacity, `[0, 255]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opacity(u8);

impl Opacity {
    /// Validate an opacity value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParameterOutOfRange`] outside `[0, 255]`.
    pub fn new(value: i64) -> Result<Self> {
        check_range("opacity", value, 0, 255)?;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let value = value as u8;
        Ok(Self(value))
    }

    /// Alpha value written into the mark.
    #[must_use]
    pub fn alpha(self) -> u8 {
        self.0
    }
}

impl From<u8> for Opacity {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl Default for Opacity {
    fn default() -> Self {
        Self(u8::MAX)
    }
}

impl fmt::Display for Opacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let percent = (f64::from(self.0) / 2.55 * 10.0).round() / 10.0;
        write!(f, "{percent:.1}%")
    }
}

/// Tiling strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternMode {
    /// One copy centered on the canvas.
    Single,
    /// Regular rows and columns.
    Grid,
    /// Grid with every other row shifted by half a gap (diamond pattern).
    Staggered,
}

impl std::str::FromStr for PatternMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "single" | "one" => Ok(Self::Single),
            "grid" | "checker" => Ok(Self::Grid),
            "staggered" | "diamond" => Ok(Self::Staggered),
            _ => Err(Error::UnknownPattern(s.to_string())),
        }
    }
}

/// One immutable snapshot of every slider and the pattern selection.
///
/// Defaults match the shell's initial slider positions. The pattern starts
/// unselected; composing before selecting one fails with
/// [`Error::PatternNotSelected`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WatermarkParams {
    /// Mark size coefficient.
    pub size: SizeCoefficient,
    /// Uniform mark opacity.
    pub opacity: Opacity,
    /// Rotation applied before layout.
    pub rotation: Rotation,
    /// Horizontal spacing coefficient.
    pub spacing_x: SpacingCoefficient,
    /// Vertical spacing coefficient.
    pub spacing_y: SpacingCoefficient,
    /// Active pattern; the last selection wins.
    pub pattern: Option<PatternMode>,
}

impl WatermarkParams {
    /// Return the selected pattern or fail the precondition.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PatternNotSelected`] if no mode was ever selected.
    pub fn require_pattern(&self) -> Result<PatternMode> {
        self.pattern.ok_or(Error::PatternNotSelected)
    }

    /// Copy of these parameters with `mode` selected.
    #[must_use]
    pub fn with_pattern(mut self, mode: PatternMode) -> Self {
        self.pattern = Some(mode);
        self
    }
}
