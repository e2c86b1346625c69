//! Synchronized frame window for two clips of possibly different length.

use crate::foundation::core::{FrameIndex, FrameRange};

/// Frame window rendered for both actors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TimelineWindow {
    /// First rendered frame.
    pub start: FrameIndex,
    /// Number of rendered frames.
    pub length: u64,
}

impl TimelineWindow {
    /// Half-open scene frame range covered by the window.
    pub fn range(self) -> FrameRange {
        FrameRange::from_start_len(self.start, self.length)
    }

    /// Last rendered frame, or `None` for an empty window.
    pub fn last(self) -> Option<FrameIndex> {
        self.range().last()
    }

    /// Return `true` when no frame is rendered.
    pub fn is_empty(self) -> bool {
        self.length == 0
    }
}

/// Nominal total frame count of a clip pair.
///
/// Only the first clip counts. A different second length is logged and otherwise ignored:
/// the second actor holds its last pose or is cut off.
pub fn nominal_total(clip1_frames: u64, clip2_frames: u64) -> u64 {
    if clip1_frames != clip2_frames {
        let diff = i128::from(clip2_frames) - i128::from(clip1_frames);
        tracing::warn!(
            clip1_frames,
            clip2_frames,
            diff = diff as i64,
            "clips differ in length; using the first clip's frame count"
        );
    }
    clip1_frames
}

/// Reconcile the requested start and duration with the clips' native lengths.
///
/// The rendered length is `min(duration, clip1_frames)`. The start frame is not subtracted.
pub fn reconcile(clip1_frames: u64, clip2_frames: u64, start: u64, duration: u64) -> TimelineWindow {
    let total = nominal_total(clip1_frames, clip2_frames);
    let window = TimelineWindow {
        start: FrameIndex(start),
        length: duration.min(total),
    };
    tracing::info!(start, length = window.length, total, "timeline reconciled");
    window
}

#[cfg(test)]
#[path = "../tests/unit/timeline.rs"]
mod tests;
