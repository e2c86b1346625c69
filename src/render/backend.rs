use crate::foundation::core::{Fps, Resolution, Rgba8Premul};

/// A rendered frame in RGBA8 format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// RGBA8 value of the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        self.data.get(i..i + 4).and_then(|px| px.try_into().ok())
    }

    /// Straight-alpha copy of the pixel data, as image files expect.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        if !self.premultiplied {
            return out;
        }
        for px in out.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            if a == 0 || a == 255 {
                continue;
            }
            for c in &mut px[..3] {
                *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        out
    }
}

/// Global render parameters of a job, set once before the passes run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderSettings {
    /// Output resolution.
    pub resolution: Resolution,
    /// Output frame rate.
    pub fps: Fps,
    /// Background color.
    pub background: Rgba8Premul,
}

impl RenderSettings {
    /// Output frame rate of every video.
    pub const FPS: Fps = Fps { num: 30, den: 1 };

    /// Background behind the floor horizon.
    pub const BACKGROUND: Rgba8Premul = Rgba8Premul {
        r: 46,
        g: 48,
        b: 56,
        a: 255,
    };

    /// Settings for `resolution` at the fixed output rate and background.
    pub fn new(resolution: Resolution) -> Self {
        Self {
            resolution,
            fps: Self::FPS,
            background: Self::BACKGROUND,
        }
    }

    /// Background as an RGBA8 array.
    pub fn background_rgba(&self) -> [u8; 4] {
        let c = self.background;
        [c.r, c.g, c.b, c.a]
    }
}
