//! Encoding sinks.
//!
//! Sinks consume composited frames in timeline order and are driven by
//! [`EpisodeComposer`](crate::EpisodeComposer).

/// `ffmpeg`-based sink and the audio mux pass.
pub mod ffmpeg;
/// Generic frame sink trait and the in-memory sink.
pub mod sink;
