//! Camera poses, per-frame interpolation and parallax offsets.
//!
//! Layer depth values:
//!
//! - `0.0`: infinitely far, never moves
//! - `0.2`: background
//! - `0.5`: midground
//! - `0.8`: foreground
//! - `0.9`: effects
//! - `1.0`: character plane, moves with the camera

use crate::foundation::core::Vec2;
use crate::foundation::math::lerp;
use serde::{Deserialize, Serialize};

/// Standard parallax depth per background layer slot, back to front.
pub const LAYER_DEPTHS: [f64; 4] = [0.2, 0.5, 0.8, 0.9];

/// Depth of the character plane.
pub const CHARACTER_DEPTH: f64 = 1.0;

/// Camera position in world space plus zoom factor.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    /// Horizontal world-space offset in pixels.
    #[serde(default)]
    pub x: f64,
    /// Vertical world-space offset in pixels.
    #[serde(default)]
    pub y: f64,
    /// Scale factor, `>= 0`.
    #[serde(default = "default_zoom")]
    pub zoom: f64,
}

fn default_zoom() -> f64 {
    1.0
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

impl CameraPose {
    /// World-space offset as a vector.
    pub fn offset(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Partial pose as authored in a script; missing fields are filled in by [`Camera::from_spec`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseSpec {
    /// Horizontal offset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// Vertical offset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    /// Zoom factor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<f64>,
}

/// Optional start/end camera poses for a scene.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraSpec {
    /// Pose at the first frame of the scene.
    #[serde(default)]
    pub start: PoseSpec,
    /// Pose at the last frame of the scene. Missing fields inherit from `start`.
    #[serde(default)]
    pub end: PoseSpec,
}

/// Camera motion for one scene, resolved once at scene preparation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Camera {
    /// Origin, zoom 1, for the whole scene.
    Static,
    /// Linear move from `start` to `end`.
    Animated {
        /// Pose at `t = 0`.
        start: CameraPose,
        /// Pose at `t = 1`.
        end: CameraPose,
    },
}

impl Camera {
    /// Resolve an optional scene camera spec.
    pub fn from_spec(spec: Option<&CameraSpec>) -> Self {
        let Some(spec) = spec else {
            return Self::Static;
        };
        let start = CameraPose {
            x: spec.start.x.unwrap_or(0.0),
            y: spec.start.y.unwrap_or(0.0),
            zoom: spec.start.zoom.unwrap_or(1.0),
        };
        let end = CameraPose {
            x: spec.end.x.unwrap_or(start.x),
            y: spec.end.y.unwrap_or(start.y),
            zoom: spec.end.zoom.unwrap_or(start.zoom),
        };
        Self::Animated { start, end }
    }

    /// Pose at normalized progress `t`, clamped to `[0, 1]`.
    pub fn pose_at(&self, t: f64) -> CameraPose {
        match self {
            Self::Static => CameraPose::default(),
            Self::Animated { start, end } => interpolate(*start, *end, t),
        }
    }

    /// Pose for frame `frame` of a scene `total_frames` long.
    ///
    /// The last frame lands exactly on the end pose.
    pub fn pose_for_frame(&self, frame: u64, total_frames: u64) -> CameraPose {
        let t = frame as f64 / (total_frames.saturating_sub(1).max(1)) as f64;
        self.pose_at(t)
    }
}

/// Linear interpolation of `x`, `y` and `zoom` independently. `t` is clamped to `[0, 1]`.
pub fn interpolate(start: CameraPose, end: CameraPose, t: f64) -> CameraPose {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    CameraPose {
        x: lerp(start.x, end.x, t),
        y: lerp(start.y, end.y, t),
        zoom: lerp(start.zoom, end.zoom, t),
    }
}

/// Pixel offset of a layer at `depth` for the given camera pose.
pub fn parallax_offset(camera: CameraPose, depth: f64) -> Vec2 {
    Vec2::new(camera.x * depth, camera.y * depth)
}

/// Zoom applied to a layer at `depth`: layers further back scale less.
pub fn parallax_zoom(camera: CameraPose, depth: f64) -> f64 {
    1.0 + (camera.zoom - 1.0) * depth
}

/// Depth for background layer slot `index`; extra layers sit at the midground depth.
pub fn layer_depth(index: usize) -> f64 {
    LAYER_DEPTHS.get(index).copied().unwrap_or(0.5)
}

#[cfg(test)]
#[path = "../../tests/unit/render/camera.rs"]
mod tests;
