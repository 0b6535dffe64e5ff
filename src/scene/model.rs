use crate::foundation::core::Fps;
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::camera::{CameraSpec, PoseSpec};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A validated episode script handed to the renderer by upstream tooling.
///
/// Scripts are immutable inputs: pacing or variant adjustments build a new value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// Episode identifier, e.g. `EP001`.
    #[serde(default = "default_episode_id")]
    pub episode_id: String,
    /// Episode title shown on the end card.
    #[serde(default = "default_title")]
    pub title: String,
    /// Scenes in playback order.
    pub scenes: Vec<Scene>,
    /// Extra end-card line; the title is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_card_text: Option<String>,
    /// Mood/situation tags used for music selection.
    #[serde(default)]
    pub metadata: ScriptMetadata,
}

fn default_episode_id() -> String {
    "EP000".to_string()
}

fn default_title() -> String {
    "Untitled Episode".to_string()
}

/// Top-level tags used for music selection.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptMetadata {
    /// Situation tag (e.g. `mystery`, `everyday_life`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub situation: Option<String>,
    /// Mood tag (e.g. `tense`, `playful`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
}

/// One scene: a location, a fixed duration, the characters on stage and what they say.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Background location id.
    pub background: String,
    /// Scene length in seconds; must be `> 0`.
    pub duration_seconds: f64,
    /// Dialogue lines in order.
    #[serde(default)]
    pub dialogue: Vec<DialogueLine>,
    /// Characters on stage, drawn in this order.
    #[serde(default)]
    pub characters_present: Vec<String>,
    /// Character id -> named position in the location.
    #[serde(default)]
    pub character_positions: BTreeMap<String, String>,
    /// Character id -> animation state override (defaults to `idle`).
    #[serde(default)]
    pub character_animations: BTreeMap<String, String>,
    /// Sound effects triggered relative to the scene start.
    #[serde(default)]
    pub sfx_triggers: Vec<SfxTrigger>,
    /// Optional camera move.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera: Option<CameraSpec>,
    /// Free-form description, only used in logs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Scene {
    /// Exact number of frames this scene occupies: `round(duration_seconds * fps)`.
    pub fn frame_count(&self, fps: Fps) -> u64 {
        fps.secs_to_frames_round(self.duration_seconds)
    }

    /// Animation state for `character` when not speaking.
    pub fn idle_state(&self, character: &str) -> &str {
        self.character_animations
            .get(character)
            .map(String::as_str)
            .unwrap_or("idle")
    }
}

/// One spoken line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DialogueLine {
    /// Speaking character id.
    pub character: String,
    /// Line text.
    pub text: String,
    /// Explicit on-screen duration; derived from text length when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<f64>,
}

/// A sound effect cue.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SfxTrigger {
    /// Offset from the scene start in milliseconds.
    #[serde(default)]
    pub time_ms: f64,
    /// Sound effect id (file stem under `sfx/`) or relative path.
    pub sfx: String,
}

impl Script {
    /// Parse a script from JSON text.
    pub fn from_json(text: &str) -> ReelResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reject scripts that would produce inconsistent frame counts or bad timing.
    ///
    /// Runs before any frame is produced so a multi-scene render never fails halfway.
    pub fn validate(&self, fps: Fps) -> ReelResult<()> {
        if self.scenes.is_empty() {
            return Err(ReelError::validation("script must contain at least one scene"));
        }
        for (i, scene) in self.scenes.iter().enumerate() {
            validate_scene(scene, fps).map_err(|e| match e {
                ReelError::Validation(msg) => {
                    ReelError::validation(format!("scene {}: {msg}", i + 1))
                }
                other => other,
            })?;
        }
        Ok(())
    }

    /// Total frames over all scenes, excluding the end card.
    pub fn scene_frames(&self, fps: Fps) -> u64 {
        self.scenes.iter().map(|s| s.frame_count(fps)).sum()
    }
}

fn validate_scene(scene: &Scene, fps: Fps) -> ReelResult<()> {
    if scene.background.trim().is_empty() {
        return Err(ReelError::validation("background id must be non-empty"));
    }
    if !scene.duration_seconds.is_finite() || scene.duration_seconds <= 0.0 {
        return Err(ReelError::validation(format!(
            "duration_seconds must be finite and > 0 (got {})",
            scene.duration_seconds
        )));
    }
    if scene.frame_count(fps) == 0 {
        return Err(ReelError::validation(format!(
            "duration_seconds {} rounds to zero frames at {}/{} fps",
            scene.duration_seconds, fps.num, fps.den
        )));
    }

    let mut seen = BTreeSet::new();
    for c in &scene.characters_present {
        if c.trim().is_empty() {
            return Err(ReelError::validation("character ids must be non-empty"));
        }
        if !seen.insert(c.as_str()) {
            return Err(ReelError::validation(format!(
                "character '{c}' listed more than once in characters_present"
            )));
        }
    }

    for line in &scene.dialogue {
        if let Some(ms) = line.duration_ms
            && (!ms.is_finite() || ms <= 0.0)
        {
            return Err(ReelError::validation(format!(
                "dialogue duration_ms must be finite and > 0 (got {ms})"
            )));
        }
    }

    for sfx in &scene.sfx_triggers {
        if !sfx.time_ms.is_finite() || sfx.time_ms < 0.0 {
            return Err(ReelError::validation(format!(
                "sfx '{}' time_ms must be finite and >= 0",
                sfx.sfx
            )));
        }
    }

    if let Some(cam) = &scene.camera {
        validate_pose(&cam.start)?;
        validate_pose(&cam.end)?;
    }
    Ok(())
}

fn validate_pose(p: &PoseSpec) -> ReelResult<()> {
    for v in [p.x, p.y].into_iter().flatten() {
        if !v.is_finite() {
            return Err(ReelError::validation("camera x/y must be finite"));
        }
    }
    if let Some(z) = p.zoom
        && (!z.is_finite() || z < 0.0)
    {
        return Err(ReelError::validation(format!(
            "camera zoom must be finite and >= 0 (got {z})"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
