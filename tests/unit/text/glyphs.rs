use super::*;
use crate::assets::catalog::Catalog;
use crate::session::context::WarningKind;

#[test]
fn block_glyphs_are_fixed_width_squares() {
    let g = BlockGlyphs;
    assert_eq!(g.advance('W', 16.0), 16.0);
    assert_eq!(g.advance(' ', 16.0), 16.0);
    assert_eq!(g.measure("abc", 10.0), 30.0);

    let a = g.rasterize('a', 16.0);
    assert_eq!((a.width, a.height), (12, 12));
    assert!(a.coverage.iter().all(|&c| c == 255));
    assert_eq!(g.rasterize(' ', 16.0).width, 0);
}

#[test]
fn glyph_origin_sits_on_baseline() {
    let a = BlockGlyphs.rasterize('a', 8.0);
    // 6px square whose bottom touches baseline 20.
    assert_eq!(a.origin(10.0, 20.0), (10, 14));
}

#[test]
fn missing_font_falls_back_with_warning() {
    let dir = tempfile::tempdir().unwrap();
    let lib = AssetLibrary::with_catalog(dir.path(), Catalog::default());
    let mut ctx = RenderContext::new();

    let glyphs = load_glyph_source(&lib, &mut ctx);
    assert_eq!(glyphs.advance('x', 12.0), 12.0);
    assert!(matches!(
        &ctx.warnings()[0].kind,
        WarningKind::MissingFont { path } if path == crate::assets::catalog::DEFAULT_FONT
    ));
}

#[test]
fn garbage_font_bytes_are_rejected() {
    let err = FontGlyphs::from_bytes(b"definitely not a font")
        .err()
        .expect("garbage parsed as a font");
    assert!(matches!(err, ReelError::Asset(_)), "{err}");
    assert!(err.to_string().contains("parse font"));
}

#[test]
fn draw_text_advances_and_paints() {
    let mut f = FrameRGBA::transparent(40, 10);
    let used = draw_text(
        &mut f,
        &BlockGlyphs,
        "a b",
        8.0,
        2.0,
        8.0,
        Rgba8Premul::opaque(255, 0, 0),
    );
    assert_eq!(used, 24.0);
    assert_eq!(f.pixel(2, 7), [255, 0, 0, 255]);
    // The space paints nothing.
    assert_eq!(f.pixel(12, 7), [0, 0, 0, 0]);
    assert_eq!(f.pixel(18, 7), [255, 0, 0, 255]);
}
