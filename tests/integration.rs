use std::path::{Path, PathBuf};

use ab_glyph::FontArc;
use image::{ColorType, Rgb, Rgba, RgbaImage};
use watermark_studio::mark::{prepare_text, rotate};
use watermark_studio::{
    compose, load_image, save_image, FontCatalog, MarkSource, Opacity, PatternMode,
    SizeCoefficient, SpacingCoefficient, TextMark, TileOutcome, Tool, ToolKind,
    WatermarkParams, Workbench,
};

const FONT_NAME: &str = "DejaVuSansMono";

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn font_path() -> PathBuf {
    fixtures().join("DejaVuSansMono.ttf")
}

fn test_font() -> FontArc {
    FontArc::try_from_slice(include_bytes!("fixtures/DejaVuSansMono.ttf")).unwrap()
}

fn base(w: u32, h: u32) -> RgbaImage {
    RgbaImage::from_pixel(w, h, Rgba([90, 120, 150, 255]))
}

fn ink() -> Rgba<u8> {
    Rgba([250, 5, 5, 255])
}

/// A square logo whose top-left pixel is opaque and everything else transparent.
fn dot_logo(size: u32) -> RgbaImage {
    let mut logo = RgbaImage::new(size, size);
    logo.put_pixel(0, 0, ink());
    logo
}

fn painted_origins(img: &RgbaImage) -> Vec<(u32, u32)> {
    img.enumerate_pixels()
        .filter(|(_, _, p)| **p == ink())
        .map(|(x, y, _)| (x, y))
        .collect()
}

#[test]
fn grid_with_two_repetitions_draws_nine_copies() {
    // gap = 25 + round(25 * 10 / 10) = 50, reps = round(120 / 50) = 2
    let logo = dot_logo(25);
    let params = WatermarkParams::default().with_pattern(PatternMode::Grid);
    let out = compose(&base(120, 120), MarkSource::Logo(&logo), &params).unwrap();

    assert_eq!(out.layout.gap_x, 50);
    assert_eq!(out.layout.reps_x, 2);
    assert_eq!(out.layout.reps_y, 2);
    assert_eq!(out.outcome, TileOutcome::Drawn { instances: 9 });
    assert_eq!(
        painted_origins(&out.image),
        vec![
            (0, 0),
            (50, 0),
            (100, 0),
            (0, 50),
            (50, 50),
            (100, 50),
            (0, 100),
            (50, 100),
            (100, 100),
        ]
    );
}

#[test]
fn staggered_rows_alternate_half_gap_offset() {
    let logo = dot_logo(25);
    let params = WatermarkParams::default().with_pattern(PatternMode::Staggered);
    let out = compose(&base(120, 120), MarkSource::Logo(&logo), &params).unwrap();

    let origins = painted_origins(&out.image);
    let row = |y: u32| -> Vec<u32> {
        origins
            .iter()
            .filter(|(_, oy)| *oy == y)
            .map(|(x, _)| *x)
            .collect()
    };
    // round(50 / 2) = 25; the third copy of shifted rows starts at 125, off canvas
    assert_eq!(row(0), vec![25, 75]);
    assert_eq!(row(50), vec![0, 50, 100]);
    assert_eq!(row(100), row(0));
}

#[test]
fn single_is_centered() {
    let logo = RgbaImage::from_pixel(31, 11, ink());
    let params = WatermarkParams::default().with_pattern(PatternMode::Single);
    let out = compose(&base(100, 50), MarkSource::Logo(&logo), &params).unwrap();

    let painted = painted_origins(&out.image);
    assert_eq!(painted.len(), 31 * 11);
    let (min_x, min_y) = painted[0];
    // (100 - 31) / 2 = 34.5 and (50 - 11) / 2 = 19.5, each within a pixel
    assert!((34..=35).contains(&min_x));
    assert!((19..=20).contains(&min_y));
}

#[test]
fn opaque_mark_is_not_blended_with_base() {
    let logo = RgbaImage::from_pixel(8, 8, Rgba([1, 2, 3, 255]));
    let params = WatermarkParams {
        spacing_x: SpacingCoefficient::new(0).unwrap(),
        spacing_y: SpacingCoefficient::new(0).unwrap(),
        ..WatermarkParams::default()
    }
    .with_pattern(PatternMode::Grid);
    let out = compose(&base(40, 40), MarkSource::Logo(&logo), &params).unwrap();

    // Abutting tiles cover the whole canvas
    assert!(out.image.pixels().all(|p| *p == Rgba([1, 2, 3, 255])));
}

#[test]
fn partial_opacity_blends_over_base() {
    let logo = RgbaImage::from_pixel(10, 10, Rgba([255, 255, 255, 255]));
    let params = WatermarkParams {
        opacity: Opacity::new(0).unwrap(),
        ..WatermarkParams::default()
    }
    .with_pattern(PatternMode::Single);
    let out = compose(&base(20, 20), MarkSource::Logo(&logo), &params).unwrap();
    assert_eq!(out.image, base(20, 20));

    let params = WatermarkParams {
        opacity: Opacity::new(128).unwrap(),
        ..params
    };
    let out = compose(&base(20, 20), MarkSource::Logo(&logo), &params).unwrap();
    let px = out.image.get_pixel(10, 10);
    assert!(px[0] > 90 && px[0] < 255);
    assert_eq!(px[3], 255);
}

#[test]
fn saving_without_extension_writes_rgb_jpeg() {
    let dir = tempfile::tempdir().unwrap();
    let img = RgbaImage::from_pixel(16, 16, Rgba([10, 200, 30, 128]));

    let written = save_image(&img, &dir.path().join("marked")).unwrap();
    assert_eq!(written, dir.path().join("marked.jpg"));
    let decoded = image::open(&written).unwrap();
    assert_eq!(decoded.color(), ColorType::Rgb8);
}

#[test]
fn saving_png_keeps_alpha() {
    let dir = tempfile::tempdir().unwrap();
    let img = RgbaImage::from_pixel(16, 16, Rgba([10, 200, 30, 128]));

    let written = save_image(&img, &dir.path().join("marked.png")).unwrap();
    assert_eq!(written, dir.path().join("marked.png"));
    let decoded = load_image(&written).unwrap();
    assert_eq!(decoded, img);
}

#[test]
fn workbench_flow_with_logo_file() {
    let dir = tempfile::tempdir().unwrap();
    let base_path = dir.path().join("base.png");
    let logo_path = dir.path().join("logo.png");
    base(64, 48).save(&base_path).unwrap();
    RgbaImage::from_pixel(8, 8, ink()).save(&logo_path).unwrap();

    let mut bench = Workbench::default();
    bench.open_base(&base_path).unwrap();
    let tool = bench.logo_tool().unwrap();
    tool.open_logo(&logo_path).unwrap();
    tool.select_pattern(PatternMode::Grid);
    tool.set_params(WatermarkParams {
        size: SizeCoefficient::new(20).unwrap(),
        ..*tool.params()
    });

    let composition = bench.recompose(ToolKind::Logo).unwrap().unwrap();
    // 16px logo, gap 32 -> round(64 / 32) = 2, round(48 / 32) = 2 (1.5)
    assert_eq!(composition.layout.gap_x, 32);
    assert_eq!(composition.layout.reps_x, 2);
    assert_eq!(composition.layout.reps_y, 2);

    let saved = bench
        .logo_tool()
        .unwrap()
        .save(&dir.path().join("out.png"))
        .unwrap();
    assert_eq!(load_image(&saved).unwrap().dimensions(), (64, 48));
}

#[test]
fn text_mark_scales_and_carries_fill_color() {
    let font = test_font();
    let mark = TextMark {
        text: "Hello",
        font: &font,
        color: Rgb([0, 0, 255]),
    };

    let small = prepare_text(&mark, SizeCoefficient::new(10).unwrap(), Opacity::new(200).unwrap());
    let large = prepare_text(&mark, SizeCoefficient::new(20).unwrap(), Opacity::new(200).unwrap());
    assert!(small.width() > 0 && small.height() > 0);
    assert!(large.width() > small.width());
    assert!(large.height() > small.height());
    assert!(small.pixels().all(|p| p[3] <= 200));
    assert!(small.pixels().any(|p| *p == Rgba([0, 0, 255, 200])));
}

#[test]
fn empty_text_leaves_base_pixel_identical() {
    let font = test_font();
    let mark = MarkSource::Text(TextMark {
        text: "",
        font: &font,
        color: Rgb([255, 255, 255]),
    });

    for mode in [PatternMode::Single, PatternMode::Grid, PatternMode::Staggered] {
        let params = WatermarkParams::default().with_pattern(mode);
        let out = compose(&base(200, 150), mark, &params).unwrap();
        assert_eq!(out.outcome, TileOutcome::Degenerate);
        assert_eq!(out.layout.reps_x, 0);
        assert_eq!(out.image, base(200, 150));
    }
}

#[test]
fn rotated_text_uses_rotated_footprint() {
    let font = test_font();
    let text = TextMark {
        text: "Watermark",
        font: &font,
        color: Rgb([255, 255, 255]),
    };
    let params = WatermarkParams {
        rotation: watermark_studio::Rotation::new(90).unwrap(),
        ..WatermarkParams::default()
    }
    .with_pattern(PatternMode::Grid);

    let prepared = prepare_text(&text, params.size, params.opacity);
    let rotated = rotate(&prepared, params.rotation);
    assert_eq!(rotated.width(), prepared.height());

    let out = compose(&base(800, 600), MarkSource::Text(text), &params).unwrap();
    assert_eq!(out.layout.gap_x, 2 * rotated.width());
    assert_eq!(out.layout.gap_y, 2 * rotated.height());
}

#[test]
fn text_tool_opens_with_defaults_and_handles_empty_text() {
    let dir = tempfile::tempdir().unwrap();
    let base_path = dir.path().join("base.png");
    base(400, 300).save(&base_path).unwrap();

    let mut catalog = FontCatalog::default();
    catalog.insert(FONT_NAME, font_path());
    let mut bench = Workbench::new(catalog);
    bench.open_base(&base_path).unwrap();

    let tool = bench.text_tool().unwrap();
    assert_eq!(tool.text(), watermark_studio::session::DEFAULT_TEXT);
    assert_eq!(tool.font_name(), Some(FONT_NAME));
    assert_eq!(tool.params().pattern, Some(PatternMode::Single));
    let drawn = tool.recompose().unwrap().unwrap();
    assert_eq!(drawn.outcome, TileOutcome::Drawn { instances: 1 });
    assert_ne!(drawn.image, base(400, 300));

    tool.set_text("");
    let blank = tool.recompose().unwrap().unwrap();
    assert_eq!(blank.outcome, TileOutcome::Degenerate);
    assert_eq!(blank.image, base(400, 300));
}

#[test]
fn font_catalog_finds_and_loads_bundled_font() {
    let catalog = FontCatalog::scan(&fixtures()).unwrap();
    assert_eq!(catalog.first(), Some(FONT_NAME));
    let font = catalog.load(FONT_NAME).unwrap();

    let mark = TextMark {
        text: "Hi",
        font: &font,
        color: Rgb([255, 255, 255]),
    };
    let prepared = prepare_text(&mark, SizeCoefficient::default(), Opacity::default());
    assert!(prepared.width() > 0 && prepared.height() > 0);
}
