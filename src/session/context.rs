use std::fmt;

/// What kind of fallback a [`RenderWarning`] reports.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WarningKind {
    /// No layer folder and no flat image for a location.
    MissingBackground {
        /// Location id.
        location: String,
    },
    /// Neither the requested state nor `idle` exists for a character.
    MissingSprite {
        /// Character id.
        character: String,
        /// Requested animation state.
        state: String,
    },
    /// Background music file absent or undecodable.
    MissingMusic {
        /// Asset-relative path of the track.
        path: String,
    },
    /// Sound effect or text blip clip absent or undecodable.
    MissingSfx {
        /// Clip id or path.
        clip: String,
    },
    /// Dialogue font absent or unparseable.
    MissingFont {
        /// Asset-relative path of the font.
        path: String,
    },
}

/// A non-fatal fallback taken during one render.
///
/// Warnings are collected, never raised; callers inspect them to decide whether to re-render
/// once assets are fixed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct RenderWarning {
    /// Structured classification.
    pub kind: WarningKind,
    /// Human-readable description naming the missing asset.
    pub message: String,
}

impl RenderWarning {
    pub(crate) fn missing_background(location: &str) -> Self {
        Self {
            kind: WarningKind::MissingBackground {
                location: location.to_string(),
            },
            message: format!(
                "missing background: backgrounds/{location} (using solid color fallback)"
            ),
        }
    }

    pub(crate) fn missing_sprite(character: &str, state: &str) -> Self {
        Self {
            kind: WarningKind::MissingSprite {
                character: character.to_string(),
                state: state.to_string(),
            },
            message: format!(
                "missing sprite: characters/{character}/{state}.png and idle.png (using transparent placeholder)"
            ),
        }
    }

    pub(crate) fn missing_music(path: &str) -> Self {
        Self {
            kind: WarningKind::MissingMusic {
                path: path.to_string(),
            },
            message: format!("missing music: {path} (audio will have no background music)"),
        }
    }

    pub(crate) fn missing_sfx(clip: &str) -> Self {
        Self {
            kind: WarningKind::MissingSfx {
                clip: clip.to_string(),
            },
            message: format!("missing sound effect: {clip} (event skipped)"),
        }
    }

    pub(crate) fn missing_font(path: &str) -> Self {
        Self {
            kind: WarningKind::MissingFont {
                path: path.to_string(),
            },
            message: format!("missing font: {path} (using built-in block glyphs)"),
        }
    }
}

impl fmt::Display for RenderWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Per-render state threaded through every component that may fall back.
///
/// One context belongs to exactly one episode render; nothing is shared across renders.
#[derive(Debug, Default)]
pub struct RenderContext {
    warnings: Vec<RenderWarning>,
}

impl RenderContext {
    /// Fresh context with no warnings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning. Identical warnings are kept once, in first-seen order.
    pub fn warn(&mut self, warning: RenderWarning) {
        if self.warnings.contains(&warning) {
            return;
        }
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    /// Warnings recorded so far.
    pub fn warnings(&self) -> &[RenderWarning] {
        &self.warnings
    }

    /// Consume the context, returning its warnings.
    pub fn into_warnings(self) -> Vec<RenderWarning> {
        self.warnings
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/context.rs"]
mod tests;
