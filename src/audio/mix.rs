use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::assets::media::{AudioPcm, MIX_CHANNELS, MIX_SAMPLE_RATE, decode_audio_f32_stereo};
use crate::assets::store::AssetLibrary;
use crate::audio::schedule::{AudioKind, AudioSchedule, DuckingWindow};
use crate::foundation::core::Fps;
use crate::foundation::error::ReelResult;
use crate::foundation::math::db_to_gain;
use crate::session::context::{RenderContext, RenderWarning};

/// Ducking must cut the music by more than this many dB.
pub const MAX_DUCKING_DB: f32 = -4.0;

/// Per-category gains in dB.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MixLevels {
    pub music_db: f32,
    pub sfx_db: f32,
    pub blip_db: f32,
    /// Extra music gain while dialogue is on screen.
    pub ducking_db: f32,
    pub ducking: bool,
}

impl Default for MixLevels {
    fn default() -> Self {
        Self {
            music_db: -20.0,
            sfx_db: -8.0,
            blip_db: -14.0,
            ducking_db: -6.0,
            ducking: true,
        }
    }
}

/// Where the mixer gets decoded clips from.
pub trait ClipSource {
    /// Decoded clip for a library-relative path, or `None` when it is missing or unreadable.
    fn clip(&mut self, path: &str) -> Option<Arc<AudioPcm>>;
}

/// Clips held in memory; used by tests and callers that decode up front.
#[derive(Clone, Debug, Default)]
pub struct InMemoryClips {
    clips: BTreeMap<String, Arc<AudioPcm>>,
}

impl InMemoryClips {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, pcm: AudioPcm) {
        self.clips.insert(path.into(), Arc::new(pcm));
    }
}

impl ClipSource for InMemoryClips {
    fn clip(&mut self, path: &str) -> Option<Arc<AudioPcm>> {
        self.clips.get(path).cloned()
    }
}

/// Clips decoded from the asset library with the system `ffmpeg`, cached per path.
pub struct LibraryClips<'a> {
    library: &'a AssetLibrary,
    cache: BTreeMap<String, Option<Arc<AudioPcm>>>,
}

impl<'a> LibraryClips<'a> {
    pub fn new(library: &'a AssetLibrary) -> Self {
        Self {
            library,
            cache: BTreeMap::new(),
        }
    }
}

impl ClipSource for LibraryClips<'_> {
    fn clip(&mut self, path: &str) -> Option<Arc<AudioPcm>> {
        if let Some(hit) = self.cache.get(path) {
            return hit.clone();
        }
        let decoded = if !self.library.exists(path) {
            tracing::debug!(clip = path, "clip not found");
            None
        } else {
            match self
                .library
                .resolve(path)
                .and_then(|p| decode_audio_f32_stereo(&p, MIX_SAMPLE_RATE))
            {
                Ok(pcm) => Some(Arc::new(pcm)),
                Err(e) => {
                    tracing::debug!(clip = path, error = %e, "clip failed to decode");
                    None
                }
            }
        };
        self.cache.insert(path.to_string(), decoded.clone());
        decoded
    }
}

/// Final episode soundtrack: stereo interleaved `f32` at [`MIX_SAMPLE_RATE`].
#[derive(Clone, Debug, PartialEq)]
pub struct MixedAudio {
    pub samples: Vec<f32>,
}

impl MixedAudio {
    pub fn frames(&self) -> usize {
        self.samples.len() / usize::from(MIX_CHANNELS)
    }

    pub fn duration_ms(&self) -> f64 {
        self.frames() as f64 * 1000.0 / f64::from(MIX_SAMPLE_RATE)
    }
}

/// Sample frame nearest to `ms` at `sample_rate`.
pub fn ms_to_sample(ms: f64, sample_rate: u32) -> u64 {
    (ms.max(0.0) * f64::from(sample_rate) / 1000.0).round() as u64
}

/// Convert a frame delta to the nearest sample index at `sample_rate`.
pub fn frame_to_sample(frame_delta: u64, fps: Fps, sample_rate: u32) -> u64 {
    let num = u128::from(frame_delta) * u128::from(sample_rate) * u128::from(fps.den);
    let den = u128::from(fps.num);
    ((num + (den / 2)) / den) as u64
}

/// Mix the whole soundtrack to exactly `total_samples` sample frames.
///
/// Music is looped and trimmed to length, a missing track becomes silence plus a warning.
/// Effects and blips are overlaid at their timestamps; anything starting at or after the end is
/// dropped and anything running past it is cut.
#[tracing::instrument(skip_all, fields(total_samples = total_samples, events = schedule.events.len()))]
pub fn mix_schedule(
    schedule: &AudioSchedule,
    total_samples: u64,
    levels: MixLevels,
    clips: &mut dyn ClipSource,
    ctx: &mut RenderContext,
) -> MixedAudio {
    let frames = total_samples as usize;
    let ch = usize::from(MIX_CHANNELS);
    let mut out = vec![0.0f32; frames * ch];

    if let Some(music) = &schedule.music {
        match clips.clip(&music.clip) {
            Some(pcm) if pcm.frames() > 0 => {
                let mut bed = looped_bed(&pcm, frames);
                let gain = db_to_gain(levels.music_db);
                for s in &mut bed {
                    *s *= gain;
                }
                if levels.ducking {
                    apply_ducking(&mut bed, &schedule.ducking, db_to_gain(levels.ducking_db));
                }
                out.copy_from_slice(&bed);
            }
            _ => ctx.warn(RenderWarning::missing_music(&music.clip)),
        }
    }

    for event in &schedule.events {
        let at = ms_to_sample(event.at_ms, MIX_SAMPLE_RATE);
        if at >= total_samples {
            continue;
        }
        let db = match event.kind {
            AudioKind::Sfx => levels.sfx_db,
            AudioKind::Blip => levels.blip_db,
            AudioKind::Music => levels.music_db,
        };
        match clips.clip(&event.clip) {
            Some(pcm) => overlay(&mut out, &pcm, at as usize, db_to_gain(db)),
            None => ctx.warn(RenderWarning::missing_sfx(&event.clip)),
        }
    }

    for s in &mut out {
        *s = s.clamp(-1.0, 1.0);
    }
    MixedAudio { samples: out }
}

/// Music resampled to the mix rate, repeated until `frames` long, then cut.
fn looped_bed(pcm: &AudioPcm, frames: usize) -> Vec<f32> {
    let ch = usize::from(MIX_CHANNELS);
    let mut bed = vec![0.0f32; frames * ch];
    let one = conform(pcm);
    let len = one.len() / ch;
    if len == 0 {
        return bed;
    }
    for f in 0..frames {
        let src = (f % len) * ch;
        bed[f * ch..f * ch + ch].copy_from_slice(&one[src..src + ch]);
    }
    bed
}

/// Scale music samples inside each ducking window.
fn apply_ducking(bed: &mut [f32], windows: &[DuckingWindow], gain: f32) {
    let ch = usize::from(MIX_CHANNELS);
    let frames = bed.len() / ch;
    for w in windows {
        let start = (ms_to_sample(w.start_ms, MIX_SAMPLE_RATE) as usize).min(frames);
        let end = (ms_to_sample(w.end_ms, MIX_SAMPLE_RATE) as usize).min(frames);
        for s in &mut bed[start * ch..end * ch] {
            *s *= gain;
        }
    }
}

/// Add `pcm * gain` into `out` starting at sample frame `at`, cut at the end of `out`.
fn overlay(out: &mut [f32], pcm: &AudioPcm, at: usize, gain: f32) {
    let ch = usize::from(MIX_CHANNELS);
    let clip = conform(pcm);
    let avail = (out.len() / ch).saturating_sub(at);
    let n = (clip.len() / ch).min(avail);
    let dst = &mut out[at * ch..(at + n) * ch];
    for (d, s) in dst.iter_mut().zip(&clip[..n * ch]) {
        *d += s * gain;
    }
}

/// Clip as stereo at the mix rate. Other rates use linear interpolation; mono is duplicated.
fn conform(pcm: &AudioPcm) -> std::borrow::Cow<'_, [f32]> {
    let src_ch = usize::from(pcm.channels.max(1));
    if pcm.sample_rate == MIX_SAMPLE_RATE && src_ch == usize::from(MIX_CHANNELS) {
        return std::borrow::Cow::Borrowed(&pcm.interleaved_f32);
    }
    let src = &pcm.interleaved_f32;
    let src_frames = src.len() / src_ch;
    if src_frames == 0 || pcm.sample_rate == 0 {
        return std::borrow::Cow::Owned(Vec::new());
    }
    let ratio = f64::from(pcm.sample_rate) / f64::from(MIX_SAMPLE_RATE);
    let dst_frames = (src_frames as f64 / ratio).floor() as usize;
    let mut out = Vec::with_capacity(dst_frames * 2);
    for f in 0..dst_frames {
        let pos = f as f64 * ratio;
        let f0 = (pos.floor() as usize).min(src_frames - 1);
        let f1 = (f0 + 1).min(src_frames - 1);
        let frac = (pos - f0 as f64) as f32;
        let at = |frame: usize, c: usize| src[frame * src_ch + c.min(src_ch - 1)];
        for c in 0..2 {
            let v0 = at(f0, c);
            let v1 = at(f1, c);
            out.push(v0 + (v1 - v0) * frac);
        }
    }
    std::borrow::Cow::Owned(out)
}

/// Write interleaved `f32` PCM samples to a raw little-endian `.f32le` file.
pub fn write_mix_to_f32le_file(samples_interleaved: &[f32], out_path: &Path) -> ReelResult<()> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent).with_context(|| {
            format!(
                "create audio mix output directory '{}'",
                parent.display()
            )
        })?;
    }

    let mut bytes = Vec::<u8>::with_capacity(samples_interleaved.len() * 4);
    for &sample in samples_interleaved {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    std::fs::write(out_path, bytes)
        .with_context(|| format!("write mixed audio file '{}'", out_path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/audio/mix.rs"]
mod tests;
