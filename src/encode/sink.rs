use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::VizResult;
use crate::render::backend::FrameRGBA;

/// Configuration provided to a [`FrameSink`] at the start of a video pass.
#[derive(Debug, Clone, PartialEq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
    /// Optional audio track muxed alongside the video.
    pub audio: Option<AudioInput>,
}

/// Audio file muxed into a video.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioInput {
    /// Audio file in any format `ffmpeg` reads.
    pub path: PathBuf,
    /// Seconds skipped at the start of the audio so it lines up with the first rendered frame.
    pub offset_secs: f64,
}

/// Sink contract for consuming rendered frames in timeline order.
///
/// Ordering contract: `push_frame` is called in strictly increasing `FrameIndex` order within the
/// rendered window.
pub trait FrameSink {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> VizResult<()>;
    /// Push one frame in strictly increasing timeline order.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> VizResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> VizResult<()>;
}

/// Opens one sink per video pass.
pub trait SinkFactory {
    /// Sink writing to `out_path`.
    fn open(&mut self, out_path: &Path) -> VizResult<Box<dyn FrameSink>>;
}

impl<F> SinkFactory for F
where
    F: FnMut(&Path) -> VizResult<Box<dyn FrameSink>>,
{
    fn open(&mut self, out_path: &Path) -> VizResult<Box<dyn FrameSink>> {
        self(out_path)
    }
}

/// In-memory sink for tests and debugging.
///
/// Clones share the captured state, so a caller can keep a handle while the pass owns the sink.
#[derive(Debug, Clone, Default)]
pub struct InMemorySink {
    inner: Arc<Mutex<Captured>>,
}

#[derive(Debug, Default)]
struct Captured {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    finished: bool,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    fn captured(&self) -> MutexGuard<'_, Captured> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.captured().cfg.clone()
    }

    /// Indices of the captured frames, in push order.
    pub fn frame_indices(&self) -> Vec<FrameIndex> {
        self.captured().frames.iter().map(|(i, _)| *i).collect()
    }

    /// Copy of the captured frames.
    pub fn frames(&self) -> Vec<(FrameIndex, FrameRGBA)> {
        self.captured().frames.clone()
    }

    /// Return `true` once `end` was called.
    pub fn is_finished(&self) -> bool {
        self.captured().finished
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> VizResult<()> {
        let mut c = self.captured();
        c.cfg = Some(cfg);
        c.frames.clear();
        c.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> VizResult<()> {
        self.captured().frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> VizResult<()> {
        self.captured().finished = true;
        Ok(())
    }
}
