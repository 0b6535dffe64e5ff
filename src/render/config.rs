use crate::foundation::core::Canvas;
use crate::foundation::error::{ReelError, ReelResult};
use serde::{Deserialize, Serialize};

/// Resolution and layout parameters that together define one output video format.
///
/// This is a value, not a global: every stage of the pipeline (camera, compositor, dialogue
/// box, composer) is parameterized by the config it is handed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Dialogue box width in pixels.
    pub text_box_width: u32,
    /// Dialogue box height in pixels.
    pub text_box_height: u32,
    /// Top edge of the dialogue box in frame pixels.
    pub text_box_y: u32,
    /// Short name used in output file names.
    pub label: String,
}

impl RenderConfig {
    /// 16:9 landscape output.
    pub fn widescreen() -> Self {
        Self {
            width: 1920,
            height: 1080,
            text_box_width: 1200,
            text_box_height: 180,
            text_box_y: 880,
            label: "widescreen".to_string(),
        }
    }

    /// 9:16 portrait output for short-form platforms.
    pub fn vertical() -> Self {
        Self {
            width: 1080,
            height: 1920,
            text_box_width: 900,
            text_box_height: 180,
            text_box_y: 1680,
            label: "vertical".to_string(),
        }
    }

    /// Look up a built-in preset by label.
    pub fn preset(name: &str) -> ReelResult<Self> {
        match name {
            "widescreen" | "horizontal" => Ok(Self::widescreen()),
            "vertical" => Ok(Self::vertical()),
            other => Err(ReelError::validation(format!(
                "unknown render preset '{other}' (expected 'widescreen' or 'vertical')"
            ))),
        }
    }

    /// Frame dimensions.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Left edge of the horizontally centered dialogue box.
    pub fn text_box_x(&self) -> u32 {
        (self.width - self.text_box_width) / 2
    }

    /// Check that the config can be encoded and that the dialogue box fits in the frame.
    pub fn validate(&self) -> ReelResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ReelError::validation("frame width/height must be non-zero"));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            return Err(ReelError::validation(
                "frame width/height must be even (required for yuv420p output)",
            ));
        }
        if self.text_box_width == 0 || self.text_box_height == 0 {
            return Err(ReelError::validation(
                "text box width/height must be non-zero",
            ));
        }
        if self.text_box_width > self.width {
            return Err(ReelError::validation(format!(
                "text box width {} exceeds frame width {}",
                self.text_box_width, self.width
            )));
        }
        if self.text_box_y.saturating_add(self.text_box_height) > self.height {
            return Err(ReelError::validation(format!(
                "text box (y={}, height={}) does not fit in frame height {}",
                self.text_box_y, self.text_box_height, self.height
            )));
        }
        if self.label.trim().is_empty() {
            return Err(ReelError::validation("render config label must be non-empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/config.rs"]
mod tests;
