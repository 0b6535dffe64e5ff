use super::*;
use crate::scene::model::{DialogueLine, Script};

fn script() -> Script {
    Script::from_json(
        r#"{
            "episode_id": "EP001",
            "title": "Pilot",
            "scenes": [
                {
                    "background": "diner",
                    "duration_seconds": 6,
                    "dialogue": [
                        { "character": "pens", "text": "one", "duration_ms": 1500 },
                        { "character": "mabel", "text": "two", "duration_ms": 2000 }
                    ],
                    "sfx_triggers": [
                        { "time_ms": 500, "sfx": "door_bell" },
                        { "time_ms": 100, "sfx": "" }
                    ]
                },
                {
                    "background": "park",
                    "duration_seconds": 5,
                    "dialogue": [
                        { "character": "pens", "text": "three", "duration_ms": 1000 },
                        { "character": "pens", "text": "four", "duration_ms": 1000 }
                    ],
                    "sfx_triggers": [{ "time_ms": 250, "sfx": "custom/boing.ogg" }]
                }
            ]
        }"#,
    )
    .unwrap()
}

fn timelines(script: &Script, fps: Fps) -> Vec<(u64, SceneTimeline)> {
    let mut offset = 0;
    script
        .scenes
        .iter()
        .map(|s| {
            let t = SceneTimeline::build(s, &vec![0; s.dialogue.len()], fps);
            let at = offset;
            offset += t.frame_count();
            (at, t)
        })
        .collect()
}

#[test]
fn ducking_windows_are_ordered_across_scenes() {
    let fps = Fps::default();
    let s = script();
    let mut windows = Vec::new();
    for (offset, t) in timelines(&s, fps) {
        windows.extend(scene_ducking_windows(&t, offset, fps));
    }

    assert_eq!(windows.len(), 4);
    for w in &windows {
        assert!(w.start_ms < w.end_ms);
    }
    for pair in windows.windows(2) {
        assert!(pair[0].end_ms <= pair[1].start_ms, "{pair:?}");
        assert!(pair[0].start_ms < pair[1].start_ms);
    }
    let first_scene_ms = s.scenes[0].duration_seconds * 1000.0;
    assert!(windows[2].start_ms >= first_scene_ms);
    assert_eq!(windows[0], DuckingWindow { start_ms: 1000.0, end_ms: 2500.0 });
    assert_eq!(windows[2], DuckingWindow { start_ms: 7000.0, end_ms: 8000.0 });
}

#[test]
fn sfx_events_are_offset_and_resolved() {
    let s = script();
    let first = scene_sfx_events(&s.scenes[0], 0.0);
    assert_eq!(
        first,
        vec![AudioEvent {
            at_ms: 500.0,
            clip: "sfx/door_bell.wav".to_string(),
            kind: AudioKind::Sfx
        }]
    );
    let second = scene_sfx_events(&s.scenes[1], 6000.0);
    assert_eq!(second[0].at_ms, 6250.0);
    assert_eq!(second[0].clip, "sfx/custom/boing.ogg");
}

#[test]
fn blips_stop_at_the_window_end() {
    let fps = Fps::default();
    let mut scene = script().scenes[0].clone();
    scene.dialogue = vec![DialogueLine {
        character: "pens".to_string(),
        text: "x".to_string(),
        duration_ms: Some(500.0),
    }];
    let t = SceneTimeline::build(&scene, &[0], fps);

    let events = scene_blip_events(&t, 300, fps, |line| {
        assert_eq!(line, 0);
        (vec![0, 5, 14, 15, 40], "text_blip_high".to_string())
    });
    let at: Vec<f64> = events.iter().map(|e| e.at_ms).collect();
    // Window is frames 30..45 of a scene starting at episode frame 300.
    let expected = [11_000.0, 11_000.0 + 5.0 * 1000.0 / 30.0, 11_000.0 + 14.0 * 1000.0 / 30.0];
    assert_eq!(at.len(), expected.len());
    for (a, e) in at.iter().zip(expected) {
        assert!((a - e).abs() < 1e-6, "{a} vs {e}");
    }
    assert!(events.iter().all(|e| e.clip == "sfx/text_blip_high.wav" && e.kind == AudioKind::Blip));
}

#[test]
fn schedule_collects_music_and_events() {
    let mut sched = AudioSchedule::new(Some("music/main_theme.wav".to_string()));
    assert_eq!(sched.music.as_ref().unwrap().kind, AudioKind::Music);
    sched.extend_events(scene_sfx_events(&script().scenes[0], 0.0));
    assert_eq!(sched.events_of(AudioKind::Sfx).count(), 1);
    assert_eq!(sched.events_of(AudioKind::Blip).count(), 0);
}
