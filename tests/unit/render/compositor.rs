use std::path::Path;

use super::*;
use crate::assets::catalog::Catalog;
use crate::audio::schedule::AudioKind;
use crate::text::glyphs::BlockGlyphs;

fn tiny() -> RenderConfig {
    RenderConfig {
        width: 64,
        height: 36,
        text_box_width: 48,
        text_box_height: 8,
        text_box_y: 26,
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

fn library(dir: &Path) -> AssetLibrary {
    write_png(dir, "backgrounds/park.png", 16, 9, [0, 128, 0, 255]);
    write_png(dir, "characters/pens/idle.png", 4, 6, [0, 0, 255, 255]);
    write_png(dir, "characters/pens/talking.png", 4, 6, [255, 0, 0, 255]);
    AssetLibrary::with_catalog(dir, Catalog::default())
}

fn scene(json: serde_json::Value) -> Scene {
    serde_json::from_value(json).unwrap()
}

fn prepare(lib: &AssetLibrary, scene: &Scene, offset: u64) -> (SceneCompositor, RenderContext) {
    let cfg = tiny();
    let env = SceneEnv {
        library: lib,
        glyphs: &BlockGlyphs,
        config: &cfg,
        fps: Fps::default(),
        chars_per_second: 12.0,
    };
    let mut ctx = RenderContext::new();
    let mut sprites = SpriteCache::new();
    let comp = SceneCompositor::prepare(scene, offset, env, &mut sprites, &mut ctx);
    (comp, ctx)
}

#[test]
fn frame_count_ignores_dialogue_length() {
    let dir = tempfile::tempdir().unwrap();
    let lib = library(dir.path());
    let long = "word ".repeat(200);
    let s = scene(serde_json::json!({
        "background": "park",
        "duration_seconds": 2.5,
        "characters_present": ["pens"],
        "dialogue": [{ "character": "pens", "text": long }]
    }));
    let (comp, ctx) = prepare(&lib, &s, 0);
    assert_eq!(comp.frame_count(), 75);
    assert_eq!(comp.frames().len(), 75);
    assert_eq!(comp.frames().count(), 75);
    assert!(ctx.warnings().is_empty());
}

#[test]
fn speaker_uses_talking_sprite_and_box_only_while_active() {
    let dir = tempfile::tempdir().unwrap();
    let lib = library(dir.path());
    let s = scene(serde_json::json!({
        "background": "park",
        "duration_seconds": 3,
        "characters_present": ["pens"],
        "dialogue": [{ "character": "pens", "text": "hey", "duration_ms": 1000 }]
    }));
    let (comp, _) = prepare(&lib, &s, 0);

    // Fallback anchor is (32, 26): sprite covers x 30..34, y 20..26.
    let idle = comp.render_frame(10);
    assert_eq!(idle.pixel(31, 22), [0, 0, 255, 255]);
    assert_eq!(idle.pixel(8, 26), [0, 128, 0, 255]);

    let talking = comp.render_frame(40);
    assert_eq!(talking.pixel(31, 22), [255, 0, 0, 255]);
    // Text box border at its top-left corner.
    assert_eq!(talking.pixel(8, 26), [255, 255, 255, 255]);

    let after = comp.render_frame(60);
    assert_eq!(after.pixel(31, 22), [0, 0, 255, 255]);
    assert_eq!(after.pixel(8, 26), [0, 128, 0, 255]);
}

#[test]
fn camera_pan_moves_the_character_plane() {
    let dir = tempfile::tempdir().unwrap();
    let lib = library(dir.path());
    let s = scene(serde_json::json!({
        "background": "park",
        "duration_seconds": 1,
        "characters_present": ["pens"],
        "camera": { "start": { "x": 0 }, "end": { "x": 10 } }
    }));
    let (comp, _) = prepare(&lib, &s, 0);
    assert_eq!(comp.render_frame(0).pixel(30, 22), [0, 0, 255, 255]);
    let last = comp.render_frame(comp.frame_count() - 1);
    assert_eq!(last.pixel(20, 22), [0, 0, 255, 255]);
    assert_ne!(last.pixel(31, 22), [0, 0, 255, 255]);
}

#[test]
fn scene_audio_is_offset_into_episode_time() {
    let dir = tempfile::tempdir().unwrap();
    let lib = library(dir.path());
    let s = scene(serde_json::json!({
        "background": "park",
        "duration_seconds": 4,
        "characters_present": ["pens"],
        "dialogue": [{ "character": "pens", "text": "abc def", "duration_ms": 2000 }],
        "sfx_triggers": [{ "time_ms": 250, "sfx": "whoosh" }]
    }));
    let (comp, _) = prepare(&lib, &s, 300);
    let audio = comp.audio();

    assert_eq!(audio.sfx.len(), 1);
    assert_eq!(audio.sfx[0].at_ms, 10_250.0);
    assert_eq!(audio.ducking.len(), 1);
    assert_eq!(audio.ducking[0].start_ms, 11_000.0);
    assert_eq!(audio.ducking[0].end_ms, 13_000.0);
    // Non-space characters a b c d e f: blips on a and d.
    assert_eq!(audio.blips.len(), 2);
    assert_eq!(audio.blips[0].at_ms, 11_000.0);
    assert!(audio.blips.iter().all(|b| b.kind == AudioKind::Blip));
    assert_eq!(audio.blips[0].clip, "sfx/text_blip_mid.wav");
}

#[test]
fn missing_assets_fall_back_without_failing() {
    let dir = tempfile::tempdir().unwrap();
    let lib = AssetLibrary::with_catalog(dir.path(), Catalog::default());
    let s = scene(serde_json::json!({
        "background": "nowhere",
        "duration_seconds": 1,
        "characters_present": ["ghost"],
    }));
    let (comp, ctx) = prepare(&lib, &s, 0);
    assert_eq!(comp.frames().count(), 30);
    let kinds: Vec<String> = ctx.warnings().iter().map(|w| w.message.clone()).collect();
    assert!(kinds.iter().any(|m| m.contains("nowhere")));
    assert!(kinds.iter().any(|m| m.contains("ghost")));
}
