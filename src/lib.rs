//! toonreel renders pixel-art cartoon episodes from validated scripts.
//!
//! The public API is composer-oriented:
//!
//! - Open an [`AssetLibrary`] and parse a [`Script`]
//! - Pick a [`RenderConfig`] preset (widescreen or vertical)
//! - Run an [`EpisodeComposer`] into an MP4, or stream its frames into any [`FrameSink`]
//!
//! Missing assets never fail a render; they come back as [`RenderWarning`]s.
#![forbid(unsafe_code)]

mod assets;
mod foundation;

pub(crate) mod audio;
/// Encoding sinks.
pub mod encode;
pub(crate) mod layout;
pub(crate) mod render;
pub(crate) mod scene;
pub(crate) mod session;
pub(crate) mod text;

pub use crate::foundation::core::{
    Canvas, Fps, FrameIndex, FrameRange, Point, Rect, Rgba8Premul, Vec2,
};
pub use crate::foundation::error::{ReelError, ReelResult};

pub use crate::assets::backgrounds::{BackgroundSet, ParallaxLayer};
pub use crate::assets::catalog::{
    Catalog, CharacterProfile, GroundZone, LocationProfile, MusicTable, NamedPosition,
};
pub use crate::assets::media::{AudioPcm, MIX_CHANNELS, MIX_SAMPLE_RATE};
pub use crate::assets::store::AssetLibrary;
pub use crate::audio::mix::{ClipSource, InMemoryClips, LibraryClips, MixLevels, MixedAudio};
pub use crate::audio::schedule::{AudioEvent, AudioKind, AudioSchedule, DuckingWindow};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::layout::positions::PositionResolver;
pub use crate::render::camera::{
    Camera, CameraPose, CameraSpec, PoseSpec, interpolate, parallax_offset,
};
pub use crate::render::compositor::{SceneAudio, SceneCompositor, SceneEnv};
pub use crate::render::config::RenderConfig;
pub use crate::render::end_card::EndCard;
pub use crate::render::frame::FrameRGBA;
pub use crate::render::timeline::{DialogueWindow, SceneTimeline};
pub use crate::scene::model::{DialogueLine, Scene, Script, ScriptMetadata, SfxTrigger};
pub use crate::session::context::{RenderContext, RenderWarning, WarningKind};
pub use crate::session::episode::{
    ComposeOpts, ComposedEpisode, EpisodeComposer, EpisodeOutput,
};
pub use crate::session::variants::{
    VariantOutput, VariantPlan, VariantPreset, adjust_pacing, plan_variants, render_variants,
    select_music,
};
pub use crate::text::dialogue_box::{DialogueBox, Speaker};
pub use crate::text::glyphs::{BlockGlyphs, FontGlyphs, GlyphSource};
pub use crate::text::layout::{DialogueLayout, RevealClock};
