use std::path::Path;

use crate::foundation::error::{ReelError, ReelResult};

/// Internal audio mixing sample rate used across decode/mix/encode pipeline.
pub const MIX_SAMPLE_RATE: u32 = 48_000;

/// Channel count of the mix bus.
pub const MIX_CHANNELS: u16 = 2;

#[derive(Clone, Debug, PartialEq)]
/// Decoded interleaved floating-point PCM.
pub struct AudioPcm {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
    /// Interleaved `f32` PCM samples.
    pub interleaved_f32: Vec<f32>,
}

impl AudioPcm {
    /// Stereo silence lasting `frames` sample frames.
    pub fn silence(frames: usize) -> Self {
        Self {
            sample_rate: MIX_SAMPLE_RATE,
            channels: MIX_CHANNELS,
            interleaved_f32: vec![0.0; frames * usize::from(MIX_CHANNELS)],
        }
    }

    /// Number of sample frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.interleaved_f32.len() / usize::from(self.channels.max(1))
    }

    /// Duration in milliseconds.
    pub fn duration_ms(&self) -> f64 {
        (self.frames() as f64) * 1000.0 / f64::from(self.sample_rate.max(1))
    }
}

/// Decode audio from a media file to stereo interleaved `f32` PCM through the system `ffmpeg`.
pub fn decode_audio_f32_stereo(path: &Path, sample_rate: u32) -> ReelResult<AudioPcm> {
    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(path)
        .args([
            "-vn",
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "-ac",
            "2",
            "-ar",
            &sample_rate.to_string(),
            "pipe:1",
        ])
        .output()
        .map_err(|e| ReelError::asset(format!("failed to run ffmpeg for audio decode: {e}")))?;

    if !out.status.success() {
        return Err(ReelError::asset(format!(
            "ffmpeg audio decode failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    if !out.stdout.len().is_multiple_of(4) {
        return Err(ReelError::asset(
            "decoded audio byte length is not aligned to f32 samples",
        ));
    }
    let mut pcm = Vec::<f32>::with_capacity(out.stdout.len() / 4);
    for chunk in out.stdout.chunks_exact(4) {
        pcm.push(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }

    Ok(AudioPcm {
        sample_rate,
        channels: 2,
        interleaved_f32: pcm,
    })
}

// No unit tests for the decoder: it shells out to `ffmpeg` and is covered by the ffmpeg
// integration test, which skips itself when the tool is unavailable.
