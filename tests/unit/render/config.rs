use super::*;

#[test]
fn presets_validate_and_center_the_box() {
    let wide = RenderConfig::widescreen();
    wide.validate().unwrap();
    assert_eq!(wide.text_box_x(), 360);

    let tall = RenderConfig::vertical();
    tall.validate().unwrap();
    assert_eq!(tall.canvas().height, 1920);

    assert_eq!(RenderConfig::preset("vertical").unwrap(), tall);
    assert!(RenderConfig::preset("square").is_err());
}

#[test]
fn validation_rejects_odd_sizes_and_overflowing_box() {
    let mut cfg = RenderConfig::widescreen();
    cfg.width = 1921;
    assert!(cfg.validate().is_err());

    let mut cfg = RenderConfig::widescreen();
    cfg.text_box_y = 1000;
    assert!(cfg.validate().is_err());

    let mut cfg = RenderConfig::widescreen();
    cfg.text_box_width = 4000;
    assert!(cfg.validate().is_err());
}

#[test]
fn custom_config_round_trips_through_json() {
    let json = r#"{"width":64,"height":36,"text_box_width":48,"text_box_height":10,"text_box_y":24,"label":"tiny"}"#;
    let cfg: RenderConfig = serde_json::from_str(json).unwrap();
    cfg.validate().unwrap();
    assert_eq!(cfg.text_box_x(), 8);
}
