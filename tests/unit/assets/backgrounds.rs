use std::path::Path;

use super::*;
use crate::assets::catalog::Catalog;
use crate::session::context::WarningKind;

fn tiny() -> RenderConfig {
    RenderConfig {
        width: 8,
        height: 4,
        text_box_width: 6,
        text_box_height: 2,
        text_box_y: 2,
        label: "tiny".to_string(),
    }
}

fn write_png(root: &Path, rel: &str, w: u32, h: u32, px: [u8; 4]) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    image::RgbaImage::from_pixel(w, h, image::Rgba(px))
        .save(&path)
        .unwrap();
}

#[test]
fn layered_folder_wins_and_keeps_slot_depths() {
    let dir = tempfile::tempdir().unwrap();
    write_png(dir.path(), "backgrounds/park/background.png", 2, 2, [0, 0, 255, 255]);
    write_png(dir.path(), "backgrounds/park/foreground.png", 2, 2, [0, 255, 0, 0]);
    write_png(dir.path(), "backgrounds/park.png", 2, 2, [255, 0, 0, 255]);
    let lib = AssetLibrary::with_catalog(dir.path(), Catalog::default());
    let mut ctx = RenderContext::new();

    let bg = BackgroundSet::load(&lib, "park", &tiny(), &mut ctx);
    let layers = bg.layers();
    assert_eq!(layers.len(), 2);
    assert_eq!(layers[0].depth, 0.2);
    assert_eq!(layers[1].depth, 0.8);
    assert_eq!((layers[0].image.width, layers[0].image.height), (8, 4));
    assert!(ctx.warnings().is_empty());
}

#[test]
fn flat_image_is_scaled() {
    let dir = tempfile::tempdir().unwrap();
    write_png(dir.path(), "backgrounds/diner.png", 4, 2, [255, 0, 0, 255]);
    let lib = AssetLibrary::with_catalog(dir.path(), Catalog::default());
    let mut ctx = RenderContext::new();

    let bg = BackgroundSet::load(&lib, "diner", &tiny(), &mut ctx);
    assert!(matches!(bg, BackgroundSet::Flat(_)));

    let mut frame = FrameRGBA::transparent(8, 4);
    bg.paint(&mut frame, CameraPose::default());
    assert_eq!(frame.pixel(7, 3), [255, 0, 0, 255]);
}

#[test]
fn missing_location_warns_and_fills_solid() {
    let dir = tempfile::tempdir().unwrap();
    let lib = AssetLibrary::with_catalog(dir.path(), Catalog::default());
    let mut ctx = RenderContext::new();

    let bg = BackgroundSet::load(&lib, "moon_base", &tiny(), &mut ctx);
    assert!(bg.layers().is_empty());
    assert_eq!(
        ctx.warnings()[0].kind,
        WarningKind::MissingBackground {
            location: "moon_base".to_string()
        }
    );
    assert!(ctx.warnings()[0].message.contains("moon_base"));

    let mut frame = FrameRGBA::transparent(8, 4);
    bg.paint(&mut frame, CameraPose { x: 50.0, y: 0.0, zoom: 2.0 });
    assert_eq!(frame.pixel(0, 0), FALLBACK_COLOR.to_array());
}

#[test]
fn camera_pan_shifts_layer_by_depth() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("backgrounds/strip/background.png");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut img = image::RgbaImage::from_pixel(8, 4, image::Rgba([0, 0, 0, 255]));
    img.put_pixel(5, 0, image::Rgba([255, 255, 255, 255]));
    img.save(&path).unwrap();
    let lib = AssetLibrary::with_catalog(dir.path(), Catalog::default());
    let mut ctx = RenderContext::new();
    let bg = BackgroundSet::load(&lib, "strip", &tiny(), &mut ctx);

    // depth 0.2 * 10px pan = 2px shift left.
    let mut frame = FrameRGBA::transparent(8, 4);
    bg.paint(&mut frame, CameraPose { x: 10.0, y: 0.0, zoom: 1.0 });
    assert_eq!(frame.pixel(3, 0), [255, 255, 255, 255]);
    assert_eq!(frame.pixel(5, 0), [0, 0, 0, 255]);
    assert_eq!(frame.pixel(7, 0), [0, 0, 0, 255]);
}
