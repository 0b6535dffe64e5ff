use std::collections::BTreeMap;

use crate::foundation::core::{Canvas, Rgba8Premul};
use crate::foundation::error::{ReelError, ReelResult};

/// Default font path, relative to the asset root.
pub const DEFAULT_FONT: &str = "ui/fonts/PressStart2P-Regular.ttf";

/// Default background track, relative to the asset root.
pub const DEFAULT_MUSIC: &str = "music/main_theme.wav";

/// Suspenseful underscore used for mystery and scheme episodes.
pub const TENSE_MUSIC: &str = "music/tense_theme.wav";

/// Fast track used by the upbeat variant.
pub const UPBEAT_MUSIC: &str = "music/upbeat_theme.wav";

/// Blip clip used for characters without a profile.
pub const DEFAULT_BLIP: &str = "text_blip_mid";

/// Asset catalog: per-character and per-location metadata stored next to the assets.
///
/// Every field is optional in JSON; a missing catalog behaves like `Catalog::default()`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Catalog {
    /// Character profiles by id.
    pub characters: BTreeMap<String, CharacterProfile>,
    /// Location profiles by id.
    pub locations: BTreeMap<String, LocationProfile>,
    /// Dialogue font path.
    pub font: String,
    /// Music lookup table.
    pub music: MusicTable,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            characters: BTreeMap::new(),
            locations: BTreeMap::new(),
            font: DEFAULT_FONT.to_string(),
            music: MusicTable::default(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CharacterProfile {
    /// Name printed in the dialogue box.
    pub display_name: Option<String>,
    /// `#RRGGBB` color of the name.
    pub name_color: Option<String>,
    /// Blip clip id under `sfx/`.
    pub blip_sound: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NamedPosition {
    pub x: f64,
    pub y: f64,
}

/// Vertical band (reference pixels) where sprites may stand.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GroundZone {
    pub top: f64,
    pub bottom: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LocationProfile {
    /// Canvas the positions were authored against.
    pub reference: Canvas,
    /// Named anchor points (sprite bottom-center).
    pub positions: BTreeMap<String, NamedPosition>,
    /// Ground zone; defaults to the lower 45% of the reference canvas.
    pub ground_zone: Option<GroundZone>,
}

impl Default for LocationProfile {
    fn default() -> Self {
        Self {
            reference: Canvas {
                width: 1920,
                height: 1080,
            },
            positions: BTreeMap::new(),
            ground_zone: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MusicTable {
    /// Track used when no table entry matches.
    pub default: String,
    /// Track per script situation tag.
    pub situations: BTreeMap<String, String>,
    /// Track per script mood tag.
    pub moods: BTreeMap<String, String>,
}

impl Default for MusicTable {
    fn default() -> Self {
        Self {
            default: DEFAULT_MUSIC.to_string(),
            situations: ["mystery", "scheme"]
                .into_iter()
                .map(|s| (s.to_string(), TENSE_MUSIC.to_string()))
                .collect(),
            moods: BTreeMap::from([("tense".to_string(), TENSE_MUSIC.to_string())]),
        }
    }
}

impl Catalog {
    pub fn from_json(text: &str) -> ReelResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Display name, falling back to the capitalized id.
    pub fn display_name(&self, character: &str) -> String {
        self.characters
            .get(character)
            .and_then(|c| c.display_name.clone())
            .unwrap_or_else(|| capitalize(character))
    }

    /// Name color, white when absent or malformed.
    pub fn name_color(&self, character: &str) -> Rgba8Premul {
        self.characters
            .get(character)
            .and_then(|c| c.name_color.as_deref())
            .and_then(|hex| parse_hex_rgb(hex).ok())
            .unwrap_or(Rgba8Premul::opaque(255, 255, 255))
    }

    pub fn blip_sound(&self, character: &str) -> String {
        self.characters
            .get(character)
            .and_then(|c| c.blip_sound.clone())
            .unwrap_or_else(|| DEFAULT_BLIP.to_string())
    }

    pub fn location(&self, location: &str) -> Option<&LocationProfile> {
        self.locations.get(location)
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Parse `#RRGGBB` (leading `#` optional) into an opaque color.
pub fn parse_hex_rgb(hex: &str) -> ReelResult<Rgba8Premul> {
    let h = hex.trim().trim_start_matches('#');
    if h.len() != 6 || !h.is_ascii() {
        return Err(ReelError::validation(format!(
            "color '{hex}' must have the form #RRGGBB"
        )));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&h[i..i + 2], 16)
            .map_err(|_| ReelError::validation(format!("color '{hex}' is not valid hex")))
    };
    Ok(Rgba8Premul::opaque(channel(0)?, channel(2)?, channel(4)?))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/catalog.rs"]
mod tests;
