use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use anyhow::Context;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::frame::FrameRGBA;

/// Frames allowed in flight between the compositor and the encoder's stdin.
pub const FRAME_QUEUE_DEPTH: usize = 2;

/// Options for [`FfmpegSink`] MP4 output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output MP4 file path.
    pub out_path: PathBuf,
    /// Background color used to flatten alpha (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
}

impl FfmpegSinkOpts {
    /// Create options for outputting an MP4 to `out_path`.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            bg_rgba: [0, 0, 0, 255],
        }
    }
}

type StderrDrain = JoinHandle<std::io::Result<Vec<u8>>>;

/// Sink that spawns the system `ffmpeg` and streams raw RGBA frames to its stdin.
///
/// Frames go through a bounded channel to a writer thread that owns the pipe, so `push_frame`
/// blocks once [`FRAME_QUEUE_DEPTH`] frames are waiting on the encoder.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    sender: Option<mpsc::SyncSender<Vec<u8>>>,
    writer: Option<JoinHandle<std::io::Result<()>>>,
    stderr_drain: Option<StderrDrain>,

    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    /// Create a new sink that streams into `ffmpeg`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            sender: None,
            writer: None,
            stderr_drain: None,
            cfg: None,
            last_idx: None,
        }
    }

    /// Close the pipe, wait for ffmpeg and turn a failed run into an error carrying its stderr.
    fn finish(&mut self) -> ReelResult<()> {
        drop(self.sender.take());
        let write_result = match self.writer.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| ReelError::encode("ffmpeg writer thread panicked"))?,
            None => Ok(()),
        };

        let mut child = self
            .child
            .take()
            .ok_or_else(|| ReelError::encode("ffmpeg sink not started"))?;
        let status = child
            .wait()
            .map_err(|e| ReelError::encode(format!("failed to wait for ffmpeg to finish: {e}")))?;
        let stderr_bytes = join_stderr(self.stderr_drain.take())?;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(ReelError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }
        write_result
            .map_err(|e| ReelError::encode(format!("failed to write frames to ffmpeg: {e}")))?;

        self.cfg = None;
        Ok(())
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(ReelError::validation("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(ReelError::validation(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(ReelError::validation(
                "ffmpeg sink width/height must be even (required for yuv420p mp4 output)",
            ));
        }

        ensure_parent_dir(&self.opts.out_path)?;
        if !is_ffmpeg_on_path() {
            return Err(ReelError::encode(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        // Input: raw RGBA8 frames, flattened to opaque before they are queued.
        cmd.args([
            "-y",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args(["-i", "pipe:0"]);
        cmd.args([
            "-an",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ]);
        cmd.arg(&self.opts.out_path);

        let mut child = cmd.spawn().map_err(|e| {
            ReelError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ReelError::encode("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ReelError::encode("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        let (sender, receiver) = mpsc::sync_channel::<Vec<u8>>(FRAME_QUEUE_DEPTH);
        let writer = thread::Builder::new()
            .name("toonreel-ffmpeg-writer".to_string())
            .spawn(move || -> std::io::Result<()> {
                for frame in receiver {
                    stdin.write_all(&frame)?;
                }
                stdin.flush()
            })
            .context("spawn ffmpeg writer thread")?;

        tracing::info!(
            out = %self.opts.out_path.display(),
            width = cfg.width,
            height = cfg.height,
            frames = cfg.total_frames,
            "ffmpeg encode started"
        );
        self.child = Some(child);
        self.sender = Some(sender);
        self.writer = Some(writer);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| ReelError::encode("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(ReelError::encode(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(ReelError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }

        let mut opaque = vec![0u8; frame.data.len()];
        flatten_premul_over_bg_to_opaque_rgba8(&mut opaque, &frame.data, self.opts.bg_rgba)?;

        let Some(sender) = self.sender.as_ref() else {
            return Err(ReelError::encode("ffmpeg sink is already finalized"));
        };
        if sender.send(opaque).is_err() {
            // The writer only hangs up when the pipe broke; surface ffmpeg's own diagnostics.
            self.finish()?;
            return Err(ReelError::encode("ffmpeg closed its input early"));
        }
        Ok(())
    }

    fn end(&mut self) -> ReelResult<()> {
        self.finish()?;
        tracing::info!(out = %self.opts.out_path.display(), "ffmpeg encode finished");
        Ok(())
    }
}

impl Drop for FfmpegSink {
    // A sink dropped before `end` belongs to a failed render; its output is never promoted.
    fn drop(&mut self) {
        drop(self.sender.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

fn join_stderr(handle: Option<StderrDrain>) -> ReelResult<Vec<u8>> {
    match handle {
        Some(handle) => handle
            .join()
            .map_err(|_| ReelError::encode("ffmpeg stderr drain thread panicked"))?
            .map_err(|e| ReelError::encode(format!("ffmpeg stderr read failed: {e}"))),
        None => Ok(Vec::new()),
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // For rawvideo input, `-r` before `-i` sets the input frame rate, as `num/den`.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

/// Raw PCM stream to mux next to an encoded video.
#[derive(Debug, Clone)]
pub struct AudioInput<'a> {
    /// Interleaved `f32le` samples.
    pub path: &'a Path,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Second encoder pass: copy the video stream of `video` and add `audio` as AAC into `out`.
#[tracing::instrument(skip_all, fields(out = %out.display()))]
pub fn mux_audio(video: &Path, audio: &AudioInput<'_>, out: &Path) -> ReelResult<()> {
    if audio.sample_rate == 0 || audio.channels == 0 {
        return Err(ReelError::validation(
            "audio sample_rate and channels must be non-zero",
        ));
    }
    ensure_parent_dir(out)?;

    let output = Command::new("ffmpeg")
        .args(["-y", "-loglevel", "error", "-i"])
        .arg(video)
        .args([
            "-f",
            "f32le",
            "-ar",
            &audio.sample_rate.to_string(),
            "-ac",
            &audio.channels.to_string(),
            "-i",
        ])
        .arg(audio.path)
        .args([
            "-map",
            "0:v:0",
            "-map",
            "1:a:0",
            "-c:v",
            "copy",
            "-c:a",
            "aac",
            "-b:a",
            "128k",
            "-movflags",
            "+faststart",
        ])
        .arg(out)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| ReelError::encode(format!("failed to run ffmpeg for audio mux: {e}")))?;

    if !output.status.success() {
        return Err(ReelError::encode(format!(
            "ffmpeg audio mux exited with status {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    tracing::info!("audio muxed");
    Ok(())
}

fn flatten_premul_over_bg_to_opaque_rgba8(
    dst: &mut [u8],
    src_premul: &[u8],
    bg_rgba: [u8; 4],
) -> ReelResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(ReelError::validation(
            "flatten_premul_over_bg_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let bg = [
        u16::from(bg_rgba[0]),
        u16::from(bg_rgba[1]),
        u16::from(bg_rgba[2]),
    ];
    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255u16 - a;
        for c in 0..3 {
            d[c] = (u16::from(s[c]) + mul_div255_u16(bg[c], inv)).min(255) as u8;
        }
        d[3] = 255;
    }
    Ok(())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> ReelResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
