//! Text fill colors: a fixed named palette plus hex notation.

use image::Rgb;

use crate::error::{Error, Result};

/// The fixed palette offered by the text tool, in display order.
///
/// The first entry is the default after a reset.
pub const PALETTE: &[(&str, Rgb<u8>)] = &[
    ("White", Rgb([255, 255, 255])),
    ("Black", Rgb([0, 0, 0])),
    ("Gray", Rgb([128, 128, 128])),
    ("Silver", Rgb([192, 192, 192])),
    ("Red", Rgb([255, 0, 0])),
    ("Maroon", Rgb([128, 0, 0])),
    ("Orange", Rgb([255, 165, 0])),
    ("Yellow", Rgb([255, 255, 0])),
    ("Olive", Rgb([128, 128, 0])),
    ("Lime", Rgb([0, 255, 0])),
    ("Green", Rgb([0, 128, 0])),
    ("Teal", Rgb([0, 128, 128])),
    ("Cyan", Rgb([0, 255, 255])),
    ("Blue", Rgb([0, 0, 255])),
    ("Navy", Rgb([0, 0, 128])),
    ("Purple", Rgb([128, 0, 128])),
    ("Magenta", Rgb([255, 0, 255])),
    ("Pink", Rgb([255, 192, 203])),
];

/// Default text color (first palette entry).
#[must_use]
pub fn default_color() -> Rgb<u8> {
    PALETTE[0].1
}

/// Look up a palette entry by name, ignoring case.
#[must_use]
pub fn named(name: &str) -> Option<Rgb<u8>> {
    PALETTE
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|&(_, c)| c)
}

/// Resolve a palette name or a `#RGB` / `#RRGGBB` hex string.
///
/// # Errors
///
/// Returns [`Error::UnknownColor`] if the input is neither.
pub fn resolve(input: &str) -> Result<Rgb<u8>> {
    let input = input.trim();
    if let Some(c) = named(input) {
        return Ok(c);
    }
    parse_hex(input).ok_or_else(|| Error::UnknownColor(input.to_string()))
}

fn parse_hex(input: &str) -> Option<Rgb<u8>> {
    let hex = input.strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let digit = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        // Each nibble doubles: 0xF -> 0xFF
        3 => Some(Rgb([
            digit(&hex[0..1])? * 17,
            digit(&hex[1..2])? * 17,
            digit(&hex[2..3])? * 17,
        ])),
        6 => Some(Rgb([
            digit(&hex[0..2])?,
            digit(&hex[2..4])?,
            digit(&hex[4..6])?,
        ])),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_lookup_ignores_case() {
        assert_eq!(named("red"), Some(Rgb([255, 0, 0])));
        assert_eq!(named("NAVY"), Some(Rgb([0, 0, 128])));
        assert_eq!(named("chartreuse"), None);
        assert_eq!(default_color(), Rgb([255, 255, 255]));
    }

    #[test]
    fn hex_colors_parse() {
        assert_eq!(resolve("#fff").unwrap(), Rgb([255, 255, 255]));
        assert_eq!(resolve("#FF8000").unwrap(), Rgb([255, 128, 0]));
        assert_eq!(resolve("#a1b").unwrap(), Rgb([0xaa, 0x11, 0xbb]));
    }

    #[test]
    fn bad_colors_are_rejected() {
        for bad in ["", "#", "#12", "#12345", "#GGGGGG", "ff0000", "#\u{e9}ab"] {
            assert!(
                matches!(resolve(bad), Err(Error::UnknownColor(_))),
                "{bad:?} should be rejected"
            );
        }
    }
}
