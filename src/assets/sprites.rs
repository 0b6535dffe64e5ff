use std::collections::BTreeMap;
use std::sync::Arc;

use crate::assets::decode::resize_nearest;
use crate::assets::store::AssetLibrary;
use crate::render::frame::FrameRGBA;
use crate::session::context::{RenderContext, RenderWarning};

/// Largest sprite footprint; used for placement and placeholders.
pub const SPRITE_MAX_WIDTH: u32 = 192;
pub const SPRITE_MAX_HEIGHT: u32 = 288;

/// State that falls back for every other state.
pub const IDLE_STATE: &str = "idle";
/// State shown while a character has an active dialogue line.
pub const TALKING_STATE: &str = "talking";

/// Load `characters/<id>/<state>.png`, falling back to `idle.png` and then to a transparent
/// placeholder plus a warning. Loaded sprites are fitted with [`fit_sprite`].
pub fn load_sprite(
    library: &AssetLibrary,
    character: &str,
    state: &str,
    ctx: &mut RenderContext,
) -> FrameRGBA {
    if let Some(img) = library.load_image(&format!("characters/{character}/{state}.png")) {
        return fit_sprite(img);
    }
    if state != IDLE_STATE
        && let Some(img) = library.load_image(&format!("characters/{character}/{IDLE_STATE}.png"))
    {
        tracing::debug!(character, state, "sprite state missing, using idle");
        return fit_sprite(img);
    }
    ctx.warn(RenderWarning::missing_sprite(character, state));
    FrameRGBA::transparent(SPRITE_MAX_WIDTH, SPRITE_MAX_HEIGHT)
}

/// Scale a sprite down (nearest neighbour, aspect kept) until it fits the max footprint.
///
/// Sprites that already fit are returned untouched; sprites are never scaled up.
pub fn fit_sprite(sprite: FrameRGBA) -> FrameRGBA {
    if sprite.width <= SPRITE_MAX_WIDTH && sprite.height <= SPRITE_MAX_HEIGHT {
        return sprite;
    }
    let scale = (f64::from(SPRITE_MAX_WIDTH) / f64::from(sprite.width))
        .min(f64::from(SPRITE_MAX_HEIGHT) / f64::from(sprite.height));
    let width = ((f64::from(sprite.width) * scale).round() as u32).clamp(1, SPRITE_MAX_WIDTH);
    let height = ((f64::from(sprite.height) * scale).round() as u32).clamp(1, SPRITE_MAX_HEIGHT);
    tracing::debug!(
        from = ?(sprite.width, sprite.height),
        to = ?(width, height),
        "scaled oversized sprite"
    );
    resize_nearest(&sprite, width, height)
}

/// Sprites loaded once per render, keyed by `(character, state)`.
#[derive(Debug, Default)]
pub struct SpriteCache {
    sprites: BTreeMap<(String, String), Arc<FrameRGBA>>,
}

impl SpriteCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load(
        &mut self,
        library: &AssetLibrary,
        character: &str,
        state: &str,
        ctx: &mut RenderContext,
    ) -> Arc<FrameRGBA> {
        let key = (character.to_string(), state.to_string());
        if let Some(sprite) = self.sprites.get(&key) {
            return Arc::clone(sprite);
        }
        let sprite = Arc::new(load_sprite(library, character, state, ctx));
        self.sprites.insert(key, Arc::clone(&sprite));
        sprite
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/sprites.rs"]
mod tests;
