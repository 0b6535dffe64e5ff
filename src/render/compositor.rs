use std::sync::Arc;

use crate::assets::backgrounds::BackgroundSet;
use crate::assets::sprites::{SpriteCache, TALKING_STATE};
use crate::assets::store::AssetLibrary;
use crate::audio::schedule::{
    AudioEvent, BLIP_INTERVAL, DuckingWindow, scene_blip_events, scene_ducking_windows,
    scene_sfx_events,
};
use crate::foundation::core::{Fps, Point};
use crate::layout::positions::PositionResolver;
use crate::render::camera::{CHARACTER_DEPTH, Camera, parallax_offset};
use crate::render::config::RenderConfig;
use crate::render::frame::FrameRGBA;
use crate::render::timeline::SceneTimeline;
use crate::scene::model::Scene;
use crate::session::context::RenderContext;
use crate::text::dialogue_box::{DialogueBox, Speaker};
use crate::text::glyphs::GlyphSource;

/// Shared inputs for preparing scenes of one render.
#[derive(Clone, Copy)]
pub struct SceneEnv<'a> {
    pub library: &'a AssetLibrary,
    pub glyphs: &'a dyn GlyphSource,
    pub config: &'a RenderConfig,
    pub fps: Fps,
    pub chars_per_second: f64,
}

#[derive(Debug)]
struct CastMember {
    id: String,
    anchor: Point,
    idle: Arc<FrameRGBA>,
    talking: Arc<FrameRGBA>,
}

/// Audio contributed by one scene, already in episode time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneAudio {
    pub sfx: Vec<AudioEvent>,
    pub blips: Vec<AudioEvent>,
    pub ducking: Vec<DuckingWindow>,
}

/// One scene with every asset and layout decision resolved, ready to produce frames.
///
/// Preparation is the only step that touches the asset library or records warnings; producing
/// a frame is a pure function of the frame index.
pub struct SceneCompositor {
    config: RenderConfig,
    background: BackgroundSet,
    camera: Camera,
    timeline: SceneTimeline,
    cast: Vec<CastMember>,
    boxes: Vec<DialogueBox>,
    audio: SceneAudio,
}

impl SceneCompositor {
    /// Resolve a scene starting `offset_frames` into the episode.
    #[tracing::instrument(skip_all, fields(background = %scene.background, offset_frames = offset_frames))]
    pub fn prepare(
        scene: &Scene,
        offset_frames: u64,
        env: SceneEnv<'_>,
        sprites: &mut SpriteCache,
        ctx: &mut RenderContext,
    ) -> Self {
        let catalog = env.library.catalog();
        let background = BackgroundSet::load(env.library, &scene.background, env.config, ctx);
        let camera = Camera::from_spec(scene.camera.as_ref());

        let boxes: Vec<DialogueBox> = scene
            .dialogue
            .iter()
            .map(|line| {
                let speaker = Speaker {
                    name: catalog.display_name(&line.character),
                    color: catalog.name_color(&line.character),
                    portrait: env.library.load_portrait(&line.character),
                };
                DialogueBox::new(
                    &speaker,
                    &line.text,
                    env.glyphs,
                    env.config,
                    env.fps,
                    env.chars_per_second,
                )
            })
            .collect();
        let box_frames: Vec<u64> = boxes.iter().map(DialogueBox::frame_count).collect();
        let timeline = SceneTimeline::build(scene, &box_frames, env.fps);

        let anchors = PositionResolver::new(catalog, &scene.background, env.config)
            .resolve_scene(&scene.characters_present, &scene.character_positions);
        let cast = scene
            .characters_present
            .iter()
            .filter_map(|id| {
                let anchor = *anchors.get(id)?;
                Some(CastMember {
                    id: id.clone(),
                    anchor,
                    idle: sprites.get_or_load(env.library, id, scene.idle_state(id), ctx),
                    talking: sprites.get_or_load(env.library, id, TALKING_STATE, ctx),
                })
            })
            .collect();

        let offset_ms = env.fps.frames_to_ms(offset_frames);
        let audio = SceneAudio {
            sfx: scene_sfx_events(scene, offset_ms),
            blips: scene_blip_events(&timeline, offset_frames, env.fps, |line| {
                let frames = boxes[line].layout().blip_frames(BLIP_INTERVAL);
                (frames, catalog.blip_sound(&scene.dialogue[line].character))
            }),
            ducking: scene_ducking_windows(&timeline, offset_frames, env.fps),
        };

        tracing::debug!(
            frames = timeline.frame_count(),
            lines = timeline.windows().len(),
            cast = scene.characters_present.len(),
            "scene prepared"
        );
        Self {
            config: env.config.clone(),
            background,
            camera,
            timeline,
            cast,
            boxes,
            audio,
        }
    }

    /// Exactly `round(duration_seconds * fps)`.
    pub fn frame_count(&self) -> u64 {
        self.timeline.frame_count()
    }

    pub fn timeline(&self) -> &SceneTimeline {
        &self.timeline
    }

    pub fn audio(&self) -> &SceneAudio {
        &self.audio
    }

    /// Composite scene frame `index`.
    pub fn render_frame(&self, index: u64) -> FrameRGBA {
        let (w, h) = (self.config.width, self.config.height);
        let pose = self.camera.pose_for_frame(index, self.frame_count());
        let mut frame = FrameRGBA::transparent(w, h);
        self.background.paint(&mut frame, pose);

        let shift = parallax_offset(pose, CHARACTER_DEPTH);
        for member in &self.cast {
            let sprite = if self.timeline.is_talking(&member.id, index) {
                &member.talking
            } else {
                &member.idle
            };
            // Anchors are already on stage; pans may push sprites past the edge, which clips.
            let x = (member.anchor.x - shift.x).round() as i64 - i64::from(sprite.width / 2);
            let y = (member.anchor.y - shift.y).round() as i64 - i64::from(sprite.height);
            frame.blit_over(sprite, x, y);
        }

        if let Some(window) = self.timeline.active_at(index) {
            let dialogue = &self.boxes[window.line];
            let text_box = dialogue.frame(window.box_frame(index, dialogue.frame_count()));
            frame.blit_over(
                &text_box,
                i64::from(self.config.text_box_x()),
                i64::from(self.config.text_box_y),
            );
        }
        frame
    }

    /// Frames in order, rendered one at a time as the iterator advances.
    pub fn frames(&self) -> SceneFrames<'_> {
        SceneFrames {
            scene: self,
            next: 0,
        }
    }
}

/// Lazy frame iterator over one scene.
pub struct SceneFrames<'a> {
    scene: &'a SceneCompositor,
    next: u64,
}

impl Iterator for SceneFrames<'_> {
    type Item = FrameRGBA;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.scene.frame_count() {
            return None;
        }
        let frame = self.scene.render_frame(self.next);
        self.next += 1;
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.scene.frame_count().saturating_sub(self.next) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for SceneFrames<'_> {}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
