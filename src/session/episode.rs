use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::assets::media::{MIX_CHANNELS, MIX_SAMPLE_RATE};
use crate::assets::sprites::SpriteCache;
use crate::assets::store::AssetLibrary;
use crate::audio::mix::{
    ClipSource, LibraryClips, MAX_DUCKING_DB, MixLevels, MixedAudio, frame_to_sample,
    mix_schedule, write_mix_to_f32le_file,
};
use crate::audio::schedule::AudioSchedule;
use crate::encode::ffmpeg::{AudioInput, FfmpegSink, FfmpegSinkOpts, mux_audio};
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::compositor::{SceneCompositor, SceneEnv};
use crate::render::config::RenderConfig;
use crate::render::end_card::EndCard;
use crate::render::frame::FrameRGBA;
use crate::scene::model::Script;
use crate::session::context::{RenderContext, RenderWarning};
use crate::session::variants::select_music;
use crate::text::glyphs::load_glyph_source;

/// Typewriter speed used when the caller does not pick one.
pub const DEFAULT_CHARS_PER_SECOND: f64 = 12.0;

/// End-card length in seconds.
pub const DEFAULT_END_CARD_SECS: f64 = 3.0;

/// Series name printed on the end card.
pub const DEFAULT_SERIES_NAME: &str = "TOONREEL";

/// Options for one episode render.
#[derive(Clone, Debug, PartialEq)]
pub struct ComposeOpts {
    pub fps: Fps,
    /// Typewriter reveal speed.
    pub chars_per_second: f64,
    pub levels: MixLevels,
    /// End-card length; `0` disables the end card.
    pub end_card_secs: f64,
    /// Library-relative music track replacing the catalog's selection.
    pub music: Option<String>,
    pub series_name: String,
}

impl Default for ComposeOpts {
    fn default() -> Self {
        Self {
            fps: Fps::default(),
            chars_per_second: DEFAULT_CHARS_PER_SECOND,
            levels: MixLevels::default(),
            end_card_secs: DEFAULT_END_CARD_SECS,
            music: None,
            series_name: DEFAULT_SERIES_NAME.to_string(),
        }
    }
}

impl ComposeOpts {
    pub fn validate(&self) -> ReelResult<()> {
        Fps::new(self.fps.num, self.fps.den)?;
        if !self.chars_per_second.is_finite() || self.chars_per_second <= 0.0 {
            return Err(ReelError::validation(format!(
                "chars_per_second must be finite and > 0 (got {})",
                self.chars_per_second
            )));
        }
        if !self.end_card_secs.is_finite() || self.end_card_secs < 0.0 {
            return Err(ReelError::validation(format!(
                "end_card_secs must be finite and >= 0 (got {})",
                self.end_card_secs
            )));
        }
        let l = self.levels;
        if [l.music_db, l.sfx_db, l.blip_db, l.ducking_db]
            .iter()
            .any(|db| !db.is_finite())
        {
            return Err(ReelError::validation("mix levels must be finite"));
        }
        if l.ducking && l.ducking_db >= MAX_DUCKING_DB {
            return Err(ReelError::validation(format!(
                "ducking_db must be below {MAX_DUCKING_DB} dB when ducking is enabled (got {})",
                l.ducking_db
            )));
        }
        Ok(())
    }
}

/// Result of streaming an episode into a sink.
#[derive(Clone, Debug)]
pub struct ComposedEpisode {
    /// Frames pushed, end card included.
    pub frames: u64,
    pub schedule: AudioSchedule,
    pub audio: MixedAudio,
    pub warnings: Vec<RenderWarning>,
}

/// A finished video file on disk.
#[derive(Clone, Debug, PartialEq)]
pub struct EpisodeOutput {
    pub path: PathBuf,
    pub frames: u64,
    pub audio_ms: f64,
    pub warnings: Vec<RenderWarning>,
}

/// Turns a [`Script`] into a video for one [`RenderConfig`].
///
/// Every call to [`compose`](Self::compose) or [`compose_into`](Self::compose_into) owns a fresh
/// [`RenderContext`], so one composer can be reused for any number of renders.
pub struct EpisodeComposer<'a> {
    library: &'a AssetLibrary,
    config: RenderConfig,
    opts: ComposeOpts,
}

impl<'a> EpisodeComposer<'a> {
    pub fn new(
        library: &'a AssetLibrary,
        config: RenderConfig,
        opts: ComposeOpts,
    ) -> ReelResult<Self> {
        config.validate()?;
        opts.validate()?;
        Ok(Self {
            library,
            config,
            opts,
        })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn opts(&self) -> &ComposeOpts {
        &self.opts
    }

    /// Total frames for `script`: every scene plus the end card.
    pub fn total_frames(&self, script: &Script) -> u64 {
        let fps = self.opts.fps;
        script.scene_frames(fps) + EndCard::frame_count(self.opts.end_card_secs, fps)
    }

    /// Track the mixer will use for `script`.
    pub fn music_for(&self, script: &Script) -> String {
        self.opts
            .music
            .clone()
            .unwrap_or_else(|| select_music(script, self.library.catalog()))
    }

    /// Stream every frame of `script` into `sink`, then mix the soundtrack.
    ///
    /// Scenes are prepared one at a time and their frames are pushed as they are composited, so
    /// only the current scene's resources and one frame are alive at once.
    #[tracing::instrument(skip_all, fields(episode = %script.episode_id, format = %self.config.label))]
    pub fn compose_into(
        &self,
        script: &Script,
        sink: &mut dyn FrameSink,
        clips: &mut dyn ClipSource,
    ) -> ReelResult<ComposedEpisode> {
        let fps = self.opts.fps;
        script.validate(fps)?;

        let mut ctx = RenderContext::new();
        let glyphs = load_glyph_source(self.library, &mut ctx);
        let env = SceneEnv {
            library: self.library,
            glyphs: glyphs.as_ref(),
            config: &self.config,
            fps,
            chars_per_second: self.opts.chars_per_second,
        };

        let end_frames = EndCard::frame_count(self.opts.end_card_secs, fps);
        let total_frames = script.scene_frames(fps) + end_frames;
        let mut schedule = AudioSchedule::new(Some(self.music_for(script)));

        sink.begin(SinkConfig {
            width: self.config.width,
            height: self.config.height,
            fps,
            total_frames,
        })?;

        let mut sprites = SpriteCache::new();
        let mut offset = 0u64;
        for (i, scene) in script.scenes.iter().enumerate() {
            tracing::info!(
                scene = i + 1,
                of = script.scenes.len(),
                background = %scene.background,
                "scene start"
            );
            let compositor = SceneCompositor::prepare(scene, offset, env, &mut sprites, &mut ctx);
            for (f, frame) in compositor.frames().enumerate() {
                sink.push_frame(FrameIndex(offset + f as u64), &frame)?;
            }
            let audio = compositor.audio();
            schedule.extend_events(audio.sfx.iter().cloned());
            schedule.extend_events(audio.blips.iter().cloned());
            schedule.extend_ducking(audio.ducking.iter().copied());
            offset += compositor.frame_count();
        }

        if end_frames > 0 {
            let template = self.library.load_end_card_template();
            let card = self
                .end_card(script)
                .render(template.as_ref(), glyphs.as_ref(), &self.config);
            for f in 0..end_frames {
                sink.push_frame(FrameIndex(offset + f), &card)?;
            }
        }
        sink.end()?;
        tracing::info!(frames = total_frames, "frames streamed");

        let total_samples = frame_to_sample(total_frames, fps, MIX_SAMPLE_RATE);
        let audio = mix_schedule(&schedule, total_samples, self.opts.levels, clips, &mut ctx);

        Ok(ComposedEpisode {
            frames: total_frames,
            schedule,
            audio,
            warnings: ctx.into_warnings(),
        })
    }

    /// Render `script` to an MP4 at `out`.
    ///
    /// Video and audio are encoded in two sequential `ffmpeg` runs inside a staging directory
    /// next to `out`; the file is moved into place only after both succeed.
    #[tracing::instrument(skip_all, fields(out = %out.display()))]
    pub fn compose(&self, script: &Script, out: &Path) -> ReelResult<EpisodeOutput> {
        let staging = staging_dir_beside(out)?;
        let video = staging.path().join("video.mp4");
        let pcm = staging.path().join("audio.f32le");
        let muxed = staging.path().join("episode.mp4");

        let composed = {
            let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(video.clone()));
            let mut clips = LibraryClips::new(self.library);
            self.compose_into(script, &mut sink, &mut clips)?
        };

        write_mix_to_f32le_file(&composed.audio.samples, &pcm)?;
        mux_audio(
            &video,
            &AudioInput {
                path: &pcm,
                sample_rate: MIX_SAMPLE_RATE,
                channels: MIX_CHANNELS,
            },
            &muxed,
        )?;
        std::fs::rename(&muxed, out)
            .with_context(|| format!("move finished episode to '{}'", out.display()))?;

        tracing::info!(
            frames = composed.frames,
            warnings = composed.warnings.len(),
            "episode written"
        );
        Ok(EpisodeOutput {
            path: out.to_path_buf(),
            frames: composed.frames,
            audio_ms: composed.audio.duration_ms(),
            warnings: composed.warnings,
        })
    }

    /// Composite a single frame of one scene without touching the encoder.
    pub fn render_scene_frame(
        &self,
        script: &Script,
        scene: usize,
        frame: u64,
    ) -> ReelResult<(FrameRGBA, Vec<RenderWarning>)> {
        let fps = self.opts.fps;
        script.validate(fps)?;
        let Some(target) = script.scenes.get(scene) else {
            return Err(ReelError::validation(format!(
                "scene index {scene} out of range (script has {} scenes)",
                script.scenes.len()
            )));
        };
        let offset: u64 = script.scenes[..scene].iter().map(|s| s.frame_count(fps)).sum();

        let mut ctx = RenderContext::new();
        let glyphs = load_glyph_source(self.library, &mut ctx);
        let env = SceneEnv {
            library: self.library,
            glyphs: glyphs.as_ref(),
            config: &self.config,
            fps,
            chars_per_second: self.opts.chars_per_second,
        };
        let compositor =
            SceneCompositor::prepare(target, offset, env, &mut SpriteCache::new(), &mut ctx);
        if frame >= compositor.frame_count() {
            return Err(ReelError::validation(format!(
                "frame {frame} out of range (scene has {} frames)",
                compositor.frame_count()
            )));
        }
        Ok((compositor.render_frame(frame), ctx.into_warnings()))
    }

    fn end_card(&self, script: &Script) -> EndCard {
        EndCard {
            episode_id: script.episode_id.clone(),
            title: script
                .end_card_text
                .clone()
                .unwrap_or_else(|| script.title.clone()),
            series: self.opts.series_name.clone(),
        }
    }
}

/// Scratch directory beside the final output, removed when dropped.
///
/// Living on the same filesystem as `out` keeps the final rename atomic.
fn staging_dir_beside(out: &Path) -> ReelResult<tempfile::TempDir> {
    let parent = match out.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent)
        .with_context(|| format!("create output directory '{}'", parent.display()))?;
    let stem = out
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("episode");
    let dir = tempfile::Builder::new()
        .prefix(&format!(".{stem}.staging-"))
        .tempdir_in(&parent)
        .with_context(|| format!("create staging directory in '{}'", parent.display()))?;
    Ok(dir)
}

#[cfg(test)]
#[path = "../../tests/unit/session/episode.rs"]
mod tests;
