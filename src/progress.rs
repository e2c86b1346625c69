//! Line-oriented progress reporting for the job layer.

use std::fmt;
use std::io::Write as _;
use std::path::Path;

use crate::foundation::core::FrameIndex;

/// A progress notification.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ProgressEvent<'a> {
    /// Frames each video pass will render; sent once before the first video pass.
    TotalFrames(u64),
    /// A video frame was encoded.
    FrameRendered {
        /// Pass label.
        camera: &'a str,
        /// Scene frame.
        frame: FrameIndex,
    },
    /// An output file was completed.
    OutputWritten(&'a Path),
}

impl fmt::Display for ProgressEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TotalFrames(n) => write!(f, "total_frames {n}"),
            Self::FrameRendered { camera, frame } => write!(f, "frame {camera} {}", frame.0),
            Self::OutputWritten(path) => write!(f, "written {}", path.display()),
        }
    }
}

/// Receiver of progress events.
pub trait ProgressSink {
    /// Handle one event.
    fn report(&mut self, event: ProgressEvent<'_>);
}

/// Discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn report(&mut self, _event: ProgressEvent<'_>) {}
}

/// Prints one line per event on stdout.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdoutProgress;

impl ProgressSink for StdoutProgress {
    fn report(&mut self, event: ProgressEvent<'_>) {
        let mut out = std::io::stdout().lock();
        // A closed stdout must not abort the render.
        let _ = writeln!(out, "{event}").and_then(|()| out.flush());
    }
}

/// Keeps the protocol lines in memory.
#[derive(Clone, Debug, Default)]
pub struct RecordingProgress {
    /// Lines in the order they were reported.
    pub lines: Vec<String>,
}

impl ProgressSink for RecordingProgress {
    fn report(&mut self, event: ProgressEvent<'_>) {
        self.lines.push(event.to_string());
    }
}
