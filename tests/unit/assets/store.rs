use super::*;

fn write_png(root: &Path, rel: &str, w: u32, h: u32, px: [u8; 4]) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    image::RgbaImage::from_pixel(w, h, image::Rgba(px))
        .save(&path)
        .unwrap();
}

#[test]
fn normalize_rel_path_rules() {
    assert_eq!(normalize_rel_path("a/./b\\c.png").unwrap(), "a/b/c.png");
    assert_eq!(normalize_rel_path("music//x.wav").unwrap(), "music/x.wav");
    assert!(normalize_rel_path("").is_err());
    assert!(normalize_rel_path("/etc/passwd").is_err());
    assert!(normalize_rel_path("C:/x").is_err());
    assert!(normalize_rel_path("../x").is_err());
    assert!(normalize_rel_path("./.").is_err());
}

#[test]
fn open_without_catalog_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let lib = AssetLibrary::open(dir.path()).unwrap();
    assert_eq!(lib.catalog(), &Catalog::default());
    assert!(AssetLibrary::open(dir.path().join("missing")).is_err());
}

#[test]
fn open_reads_catalog_json() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("catalog.json"),
        r#"{ "font": "ui/fonts/other.ttf" }"#,
    )
    .unwrap();
    let lib = AssetLibrary::open(dir.path()).unwrap();
    assert_eq!(lib.catalog().font, "ui/fonts/other.ttf");
}

#[test]
fn load_image_treats_garbage_as_missing() {
    let dir = tempfile::tempdir().unwrap();
    write_png(dir.path(), "backgrounds/park.png", 4, 2, [10, 20, 30, 255]);
    std::fs::write(dir.path().join("broken.png"), b"not a png").unwrap();
    let lib = AssetLibrary::with_catalog(dir.path(), Catalog::default());

    let img = lib.load_image("backgrounds/park.png").unwrap();
    assert_eq!((img.width, img.height), (4, 2));
    assert!(lib.load_image("broken.png").is_none());
    assert!(lib.load_image("nope.png").is_none());
    assert!(lib.load_image("../escape.png").is_none());
}

#[test]
fn portraits_are_resized() {
    let dir = tempfile::tempdir().unwrap();
    write_png(dir.path(), "ui/portraits/pens_portrait.png", 16, 16, [255, 0, 0, 255]);
    let lib = AssetLibrary::with_catalog(dir.path(), Catalog::default());

    let p = lib.load_portrait("pens").unwrap();
    assert_eq!((p.width, p.height), (PORTRAIT_SIZE, PORTRAIT_SIZE));
    assert_eq!(p.pixel(47, 47), [255, 0, 0, 255]);
    assert!(lib.load_portrait("mabel").is_none());
}
