use crate::foundation::error::{VizError, VizResult};

/// Absolute 0-based frame index on the scene timeline.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Half-open frame range `[start, end)` on the scene timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    /// Inclusive range start.
    pub start: FrameIndex,
    /// Exclusive range end.
    pub end: FrameIndex, // exclusive
}

impl FrameRange {
    /// Create a validated range with `start <= end`.
    pub fn new(start: FrameIndex, end: FrameIndex) -> VizResult<Self> {
        if start.0 > end.0 {
            return Err(VizError::configuration("FrameRange start must be <= end"));
        }
        Ok(Self { start, end })
    }

    /// Range of `len` frames beginning at `start`.
    pub fn from_start_len(start: FrameIndex, len: u64) -> Self {
        Self {
            start,
            end: FrameIndex(start.0.saturating_add(len)),
        }
    }

    /// Number of frames contained in the range.
    pub fn len_frames(self) -> u64 {
        self.end.0.saturating_sub(self.start.0)
    }

    /// Return `true` when the range has no frames.
    pub fn is_empty(self) -> bool {
        self.start.0 == self.end.0
    }

    /// Return `true` when `f` is inside `[start, end)`.
    pub fn contains(self, f: FrameIndex) -> bool {
        self.start.0 <= f.0 && f.0 < self.end.0
    }

    /// Last frame inside the range, or `None` for empty ranges.
    pub fn last(self) -> Option<FrameIndex> {
        if self.is_empty() {
            None
        } else {
            Some(FrameIndex(self.end.0 - 1))
        }
    }

    /// Iterate the frames of the range in increasing order.
    pub fn frames(self) -> impl Iterator<Item = FrameIndex> {
        (self.start.0..self.end.0).map(FrameIndex)
    }
}

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32, // must be > 0
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> VizResult<Self> {
        if den == 0 {
            return Err(VizError::configuration("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(VizError::configuration("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Nearest integer rate for a clip's per-frame duration in seconds.
    ///
    /// Clips record `Frame Time` rather than a rate; the scene runs on whole frames per second.
    pub fn from_frame_time(secs: f64) -> VizResult<Self> {
        if !secs.is_finite() || secs <= 0.0 {
            return Err(VizError::asset_load(format!(
                "frame time must be a positive number, got {secs}"
            )));
        }
        let num = (1.0 / secs).round().max(1.0) as u32;
        Self::new(num, 1)
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Convert frame count to seconds.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * self.frame_duration_secs()
    }
}

/// Output resolution in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Resolution {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Resolution {
    /// Create a resolution, rejecting zero-sized or out-of-range dimensions.
    pub fn new(width: u32, height: u32) -> VizResult<Self> {
        if width == 0 || height == 0 {
            return Err(VizError::configuration(format!(
                "resolution must be non-zero, {width}x{height} given"
            )));
        }
        if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
            return Err(VizError::configuration(format!(
                "resolution exceeds {}x{}, {width}x{height} given",
                u16::MAX,
                u16::MAX
            )));
        }
        Ok(Self { width, height })
    }

    /// Return `true` when both dimensions are even (required for yuv420p output).
    pub fn is_even(self) -> bool {
        self.width.is_multiple_of(2) && self.height.is_multiple_of(2)
    }

    /// Width divided by height.
    pub fn aspect(self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red channel premultiplied by alpha.
    pub r: u8,
    /// Green channel premultiplied by alpha.
    pub g: u8,
    /// Blue channel premultiplied by alpha.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Convert straight-alpha RGBA8 into premultiplied RGBA8.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    /// Convert straight-alpha unit floats (`0.0..=1.0`) into premultiplied RGBA8.
    pub fn from_unit_rgba(rgba: [f32; 4]) -> Self {
        fn to_u8(v: f32) -> u8 {
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        Self::from_straight_rgba(to_u8(rgba[0]), to_u8(rgba[1]), to_u8(rgba[2]), to_u8(rgba[3]))
    }

    /// Scale the color channels by `k` (clamped to `0.0..=1.0`), keeping alpha.
    pub fn shade(self, k: f32) -> Self {
        let k = k.clamp(0.0, 1.0);
        let s = |c: u8| -> u8 { (f32::from(c) * k).round() as u8 };
        Self {
            r: s(self.r),
            g: s(self.g),
            b: s(self.b),
            a: self.a,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
