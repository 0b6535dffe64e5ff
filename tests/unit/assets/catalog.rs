use super::*;

#[test]
fn empty_json_uses_defaults() {
    let cat = Catalog::from_json("{}").unwrap();
    assert_eq!(cat, Catalog::default());
    assert_eq!(cat.font, DEFAULT_FONT);
    assert_eq!(cat.music.default, DEFAULT_MUSIC);
}

#[test]
fn character_lookups_fall_back() {
    let cat = Catalog::from_json(
        r##"{
            "characters": {
                "pens": { "display_name": "Pens", "name_color": "#FF8800", "blip_sound": "text_blip_high" },
                "odd": { "name_color": "orange" }
            }
        }"##,
    )
    .unwrap();

    assert_eq!(cat.display_name("pens"), "Pens");
    assert_eq!(cat.display_name("mabel"), "Mabel");
    assert_eq!(cat.name_color("pens"), Rgba8Premul::opaque(255, 136, 0));
    assert_eq!(cat.name_color("odd"), Rgba8Premul::opaque(255, 255, 255));
    assert_eq!(cat.blip_sound("pens"), "text_blip_high");
    assert_eq!(cat.blip_sound("mabel"), DEFAULT_BLIP);
}

#[test]
fn location_profile_parses_positions() {
    let cat = Catalog::from_json(
        r#"{
            "locations": {
                "diner": {
                    "reference": { "width": 1080, "height": 1920 },
                    "positions": { "stool_1": { "x": 300, "y": 1500 } },
                    "ground_zone": { "top": 1100, "bottom": 1600 }
                }
            }
        }"#,
    )
    .unwrap();
    let diner = cat.location("diner").unwrap();
    assert_eq!(diner.reference.width, 1080);
    assert_eq!(diner.positions["stool_1"], NamedPosition { x: 300.0, y: 1500.0 });
    assert_eq!(diner.ground_zone.unwrap().bottom, 1600.0);
    assert!(cat.location("park").is_none());
}

#[test]
fn hex_parsing() {
    assert_eq!(parse_hex_rgb("1a1a3a").unwrap(), Rgba8Premul::opaque(26, 26, 58));
    assert!(parse_hex_rgb("#12345").is_err());
    assert!(parse_hex_rgb("#GG0000").is_err());
}
