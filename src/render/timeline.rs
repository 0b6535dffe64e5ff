use crate::foundation::core::{FrameIndex, FrameRange, Fps};
use crate::scene::model::Scene;

/// Silence before the first line of every scene.
pub const DIALOGUE_LEAD_IN_SECS: f64 = 1.0;

/// When one dialogue line is on screen, in scene-relative frames.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DialogueWindow {
    /// Index into the scene's dialogue list.
    pub line: usize,
    pub character: String,
    /// Frames the line occupies, already clipped to the scene.
    pub range: FrameRange,
}

impl DialogueWindow {
    /// Text box frame to show at scene frame `frame`, held on the box's last frame once the box
    /// runs out.
    pub fn box_frame(&self, frame: u64, box_frames: u64) -> u64 {
        frame
            .saturating_sub(self.range.start.0)
            .min(box_frames.saturating_sub(1))
    }
}

/// Frame-level dialogue schedule for one scene.
///
/// Lines start after a one second lead-in and play back to back. Each line lasts its explicit
/// `duration_ms`, or its text box length when none is given. The scene length never changes:
/// windows are clipped at the last frame and lines starting after it are dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SceneTimeline {
    frame_count: u64,
    windows: Vec<DialogueWindow>,
}

impl SceneTimeline {
    /// Build the schedule. `box_frames[i]` is the text box length of dialogue line `i`.
    pub fn build(scene: &Scene, box_frames: &[u64], fps: Fps) -> Self {
        let frame_count = scene.frame_count(fps);
        let mut cursor = fps.secs_to_frames_round(DIALOGUE_LEAD_IN_SECS);
        let mut windows = Vec::new();

        for (line, dl) in scene.dialogue.iter().enumerate() {
            let natural = box_frames.get(line).copied().unwrap_or(0);
            let len = match dl.duration_ms {
                Some(ms) => fps.secs_to_frames_round(ms / 1000.0),
                None => natural,
            };
            let range = FrameRange {
                start: FrameIndex(cursor),
                end: FrameIndex(cursor.saturating_add(len)),
            };
            cursor = range.end.0;

            let clipped = range.clip_to(frame_count);
            if clipped.is_empty() {
                if range.start.0 >= frame_count {
                    tracing::debug!(line, "dialogue line starts after the scene ends, dropped");
                }
                continue;
            }
            windows.push(DialogueWindow {
                line,
                character: dl.character.clone(),
                range: clipped,
            });
        }

        Self {
            frame_count,
            windows,
        }
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn windows(&self) -> &[DialogueWindow] {
        &self.windows
    }

    /// The single line whose box is shown at `frame`: the earliest window containing it.
    pub fn active_at(&self, frame: u64) -> Option<&DialogueWindow> {
        self.windows
            .iter()
            .find(|w| w.range.contains(FrameIndex(frame)))
    }

    /// Whether `character` has any line on screen at `frame`.
    pub fn is_talking(&self, character: &str, frame: u64) -> bool {
        self.windows
            .iter()
            .any(|w| w.character == character && w.range.contains(FrameIndex(frame)))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/timeline.rs"]
mod tests;
