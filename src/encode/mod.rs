//! Encoding sinks.
//!
//! Sinks consume rendered frames in timeline order; the video passes stream into them.

/// `ffmpeg`-based MP4 sink.
pub mod ffmpeg;
/// Frame sink trait and the in-memory sink.
pub mod sink;
