use super::*;
use crate::audio::schedule::AudioEvent;
use crate::session::context::WarningKind;

fn constant(frames: usize, v: f32) -> AudioPcm {
    AudioPcm {
        sample_rate: MIX_SAMPLE_RATE,
        channels: 2,
        interleaved_f32: vec![v; frames * 2],
    }
}

fn flat_levels() -> MixLevels {
    MixLevels {
        music_db: 0.0,
        sfx_db: 0.0,
        blip_db: 0.0,
        ducking_db: -6.0,
        ducking: false,
    }
}

fn event(at_ms: f64, clip: &str, kind: AudioKind) -> AudioEvent {
    AudioEvent {
        at_ms,
        clip: clip.to_string(),
        kind,
    }
}

#[test]
fn frame_to_sample_uses_rational_fps() {
    let fps = Fps {
        num: 30_000,
        den: 1001,
    };
    assert_eq!(frame_to_sample(0, fps, 48_000), 0);
    assert_eq!(frame_to_sample(30_000, fps, 48_000), 48_048_000);
    assert_eq!(frame_to_sample(300, Fps::default(), 48_000), 480_000);
}

#[test]
fn output_length_is_exact_with_or_without_music() {
    let total = ms_to_sample(10_000.0, MIX_SAMPLE_RATE);
    let cases: [Option<usize>; 4] = [None, Some(1_000), Some(480_000), Some(2_000_000)];
    for music_len in cases {
        let mut clips = InMemoryClips::new();
        if let Some(n) = music_len {
            clips.insert("music/theme.wav", constant(n, 0.5));
        }
        let mut ctx = RenderContext::new();
        let sched = AudioSchedule::new(Some("music/theme.wav".to_string()));
        let mix = mix_schedule(&sched, total, MixLevels::default(), &mut clips, &mut ctx);
        assert_eq!(mix.frames(), 480_000, "music {music_len:?}");
        assert_eq!(mix.duration_ms(), 10_000.0);
        assert_eq!(ctx.warnings().len(), usize::from(music_len.is_none()));
    }
}

#[test]
fn missing_music_is_silence_and_a_warning() {
    let mut clips = InMemoryClips::new();
    let mut ctx = RenderContext::new();
    let sched = AudioSchedule::new(Some("music/gone.wav".to_string()));
    let mix = mix_schedule(&sched, 4_800, MixLevels::default(), &mut clips, &mut ctx);
    assert!(mix.samples.iter().all(|&s| s == 0.0));
    assert_eq!(
        ctx.warnings()[0].kind,
        WarningKind::MissingMusic {
            path: "music/gone.wav".to_string()
        }
    );
}

#[test]
fn short_music_loops() {
    let mut pcm = constant(4, 0.0);
    pcm.interleaved_f32 = vec![0.1, 0.1, 0.2, 0.2, 0.3, 0.3, 0.4, 0.4];
    let mut clips = InMemoryClips::new();
    clips.insert("m.wav", pcm);
    let mut ctx = RenderContext::new();
    let mix = mix_schedule(
        &AudioSchedule::new(Some("m.wav".to_string())),
        10,
        flat_levels(),
        &mut clips,
        &mut ctx,
    );
    let left: Vec<f32> = mix.samples.iter().step_by(2).copied().collect();
    assert_eq!(left, vec![0.1, 0.2, 0.3, 0.4, 0.1, 0.2, 0.3, 0.4, 0.1, 0.2]);
}

#[test]
fn ducking_lowers_music_only_inside_windows() {
    let mut clips = InMemoryClips::new();
    clips.insert("m.wav", constant(48_000, 0.5));
    let mut sched = AudioSchedule::new(Some("m.wav".to_string()));
    sched.extend_ducking([DuckingWindow {
        start_ms: 250.0,
        end_ms: 500.0,
    }]);
    let mut levels = flat_levels();
    levels.ducking = true;
    let mut ctx = RenderContext::new();
    let mix = mix_schedule(&sched, 48_000, levels, &mut clips, &mut ctx);

    let at = |ms: f64| mix.samples[ms_to_sample(ms, MIX_SAMPLE_RATE) as usize * 2];
    assert_eq!(at(100.0), 0.5);
    assert!((at(300.0) - 0.5 * db_to_gain(-6.0)).abs() < 1e-6);
    assert_eq!(at(600.0), 0.5);

    levels.ducking = false;
    let mix = mix_schedule(&sched, 48_000, levels, &mut clips, &mut ctx);
    assert_eq!(mix.samples[300 * 48 * 2], 0.5);
}

#[test]
fn events_overlay_with_gain_and_drop_past_the_end() {
    let mut clips = InMemoryClips::new();
    clips.insert("sfx/pop.wav", constant(100, 0.5));
    let mut sched = AudioSchedule::new(None);
    sched.extend_events([
        event(0.0, "sfx/pop.wav", AudioKind::Sfx),
        event(1.0, "sfx/pop.wav", AudioKind::Blip),
        event(10.0, "sfx/pop.wav", AudioKind::Sfx),
        event(50.0, "sfx/pop.wav", AudioKind::Sfx),
    ]);
    let mut levels = flat_levels();
    levels.blip_db = -6.0;
    let mut ctx = RenderContext::new();
    let mix = mix_schedule(&sched, 480, levels, &mut clips, &mut ctx);

    assert_eq!(mix.frames(), 480);
    assert_eq!(mix.samples[0], 0.5);
    assert!((mix.samples[48 * 2] - (0.5 + 0.5 * db_to_gain(-6.0))).abs() < 1e-6);
    // The 10 ms event starts exactly at the end and is dropped.
    assert!(mix.samples[479 * 2].abs() < 1e-6);
    assert!(ctx.warnings().is_empty());
}

#[test]
fn missing_effect_warns_once() {
    let mut clips = InMemoryClips::new();
    let mut sched = AudioSchedule::new(None);
    sched.extend_events([
        event(0.0, "sfx/boom.wav", AudioKind::Sfx),
        event(5.0, "sfx/boom.wav", AudioKind::Sfx),
    ]);
    let mut ctx = RenderContext::new();
    mix_schedule(&sched, 480, flat_levels(), &mut clips, &mut ctx);
    assert_eq!(ctx.warnings().len(), 1);
    assert!(ctx.warnings()[0].message.contains("sfx/boom.wav"));
}

#[test]
fn mono_and_foreign_rates_are_conformed() {
    let mono = AudioPcm {
        sample_rate: 24_000,
        channels: 1,
        interleaved_f32: vec![0.25; 240],
    };
    let stereo = conform(&mono);
    assert_eq!(stereo.len(), 480 * 2);
    assert!(stereo.iter().all(|&s| (s - 0.25).abs() < 1e-6));
}

#[test]
fn f32le_file_round_trips_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/mix.f32le");
    write_mix_to_f32le_file(&[0.5, -1.0], &path).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.len(), 8);
    assert_eq!(&bytes[..4], &0.5f32.to_le_bytes());
}
