use super::*;

fn fps30() -> Fps {
    Fps::new(30, 1).unwrap()
}

const SCRIPT: &str = r#"{
  "episode_id": "EP007",
  "title": "Stool Wars",
  "metadata": {"situation": "mystery"},
  "scenes": [
    {
      "background": "diner_interior",
      "duration_seconds": 8,
      "characters_present": ["pens", "chubs"],
      "character_positions": {"pens": "stool_1"},
      "character_animations": {"chubs": "eating"},
      "dialogue": [{"character": "pens", "text": "Is that my stool?"}],
      "sfx_triggers": [{"time_ms": 500, "sfx": "door_bell"}],
      "camera": {"start": {"x": 0}, "end": {"x": 60, "zoom": 1.1}}
    },
    {"background": "town_square", "duration_seconds": 2.5}
  ]
}"#;

#[test]
fn parses_nested_script_with_defaults() {
    let script = Script::from_json(SCRIPT).unwrap();
    script.validate(fps30()).unwrap();
    assert_eq!(script.episode_id, "EP007");
    assert_eq!(script.metadata.situation.as_deref(), Some("mystery"));
    assert_eq!(script.scenes[0].idle_state("chubs"), "eating");
    assert_eq!(script.scenes[0].idle_state("pens"), "idle");
    assert!(script.scenes[1].dialogue.is_empty());
    assert_eq!(script.scene_frames(fps30()), 240 + 75);
}

#[test]
fn rejects_zero_negative_and_vanishing_durations() {
    let mut script = Script::from_json(SCRIPT).unwrap();
    script.scenes[1].duration_seconds = 0.0;
    let err = script.validate(fps30()).unwrap_err().to_string();
    assert!(err.contains("scene 2"), "{err}");

    script.scenes[1].duration_seconds = -3.0;
    assert!(script.validate(fps30()).is_err());

    script.scenes[1].duration_seconds = 0.01;
    assert!(script.validate(fps30()).is_err());

    script.scenes[1].duration_seconds = f64::INFINITY;
    assert!(script.validate(fps30()).is_err());
}

#[test]
fn rejects_empty_script_and_duplicate_cast() {
    let mut script = Script::from_json(SCRIPT).unwrap();
    script.scenes[0].characters_present.push("pens".to_string());
    assert!(script.validate(fps30()).is_err());

    script.scenes.clear();
    assert!(script.validate(fps30()).is_err());
}

#[test]
fn rejects_bad_line_durations_and_camera() {
    let mut script = Script::from_json(SCRIPT).unwrap();
    script.scenes[0].dialogue[0].duration_ms = Some(0.0);
    assert!(script.validate(fps30()).is_err());

    let mut script = Script::from_json(SCRIPT).unwrap();
    if let Some(cam) = script.scenes[0].camera.as_mut() {
        cam.end.zoom = Some(-1.0);
    }
    assert!(script.validate(fps30()).is_err());

    let mut script = Script::from_json(SCRIPT).unwrap();
    script.scenes[0].sfx_triggers[0].time_ms = -5.0;
    assert!(script.validate(fps30()).is_err());
}
