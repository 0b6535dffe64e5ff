//! Episode-level audio timing: sound effects, text blips and music ducking windows.
//!
//! Every timestamp is in episode milliseconds, derived from frame positions so audio and video
//! agree on where each scene starts.

use crate::foundation::core::Fps;
use crate::render::timeline::SceneTimeline;
use crate::scene::model::Scene;

/// One blip per this many non-space characters.
pub const BLIP_INTERVAL: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioKind {
    Music,
    Sfx,
    Blip,
}

/// A clip placed on the episode timeline.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct AudioEvent {
    pub at_ms: f64,
    /// Library-relative clip path.
    pub clip: String,
    pub kind: AudioKind,
}

/// Interval during which music is ducked.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct DuckingWindow {
    pub start_ms: f64,
    pub end_ms: f64,
}

/// Library path of a sound effect id: `sfx/<id>.wav`, or `sfx/<id>` when it already names a file.
pub fn sfx_clip_path(id: &str) -> String {
    if id.contains('.') {
        format!("sfx/{id}")
    } else {
        format!("sfx/{id}.wav")
    }
}

/// Sound effects of one scene, offset to episode time.
pub fn scene_sfx_events(scene: &Scene, offset_ms: f64) -> Vec<AudioEvent> {
    scene
        .sfx_triggers
        .iter()
        .filter(|t| !t.sfx.trim().is_empty())
        .map(|t| AudioEvent {
            at_ms: offset_ms + t.time_ms,
            clip: sfx_clip_path(&t.sfx),
            kind: AudioKind::Sfx,
        })
        .collect()
}

/// One ducking window per on-screen dialogue line, offset to episode time.
///
/// Windows come from the clipped timeline, so they are ordered, disjoint and inside the scene.
pub fn scene_ducking_windows(
    timeline: &SceneTimeline,
    offset_frames: u64,
    fps: Fps,
) -> Vec<DuckingWindow> {
    timeline
        .windows()
        .iter()
        .map(|w| DuckingWindow {
            start_ms: fps.frames_to_ms(offset_frames + w.range.start.0),
            end_ms: fps.frames_to_ms(offset_frames + w.range.end.0),
        })
        .collect()
}

/// Blips for one scene.
///
/// `line_blips(line)` returns the blip frames of a dialogue line relative to its window start
/// and the blip clip id of its speaker. Blips falling outside the clipped window are dropped.
pub fn scene_blip_events<F>(
    timeline: &SceneTimeline,
    offset_frames: u64,
    fps: Fps,
    mut line_blips: F,
) -> Vec<AudioEvent>
where
    F: FnMut(usize) -> (Vec<u64>, String),
{
    let mut out = Vec::new();
    for w in timeline.windows() {
        let (frames, clip) = line_blips(w.line);
        let clip = sfx_clip_path(&clip);
        for f in frames {
            if f >= w.range.len_frames() {
                break;
            }
            out.push(AudioEvent {
                at_ms: fps.frames_to_ms(offset_frames + w.range.start.0 + f),
                clip: clip.clone(),
                kind: AudioKind::Blip,
            });
        }
    }
    out
}

/// Everything the mixer needs besides the clips themselves.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct AudioSchedule {
    /// Background track at `0 ms`, when one was selected.
    pub music: Option<AudioEvent>,
    pub events: Vec<AudioEvent>,
    pub ducking: Vec<DuckingWindow>,
}

impl AudioSchedule {
    pub fn new(music: Option<String>) -> Self {
        Self {
            music: music.map(|clip| AudioEvent {
                at_ms: 0.0,
                clip,
                kind: AudioKind::Music,
            }),
            events: Vec::new(),
            ducking: Vec::new(),
        }
    }

    pub fn extend_events(&mut self, events: impl IntoIterator<Item = AudioEvent>) {
        self.events.extend(events);
    }

    pub fn extend_ducking(&mut self, windows: impl IntoIterator<Item = DuckingWindow>) {
        self.ducking.extend(windows);
    }

    /// Events of one kind, in insertion order.
    pub fn events_of(&self, kind: AudioKind) -> impl Iterator<Item = &AudioEvent> + '_ {
        self.events.iter().filter(move |e| e.kind == kind)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/schedule.rs"]
mod tests;
