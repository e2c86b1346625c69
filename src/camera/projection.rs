use glam::{Quat, Vec2, Vec3};

use crate::foundation::core::Resolution;
use crate::scene::entities::Camera;

/// Nearest depth in front of the camera that is still drawn, in scene units.
pub const NEAR_CLIP: f32 = 0.05;

/// Pinhole projection for one camera at one output resolution.
///
/// The sensor width spans the larger image dimension. Screen coordinates have their origin at
/// the top-left pixel corner with +Y pointing down.
#[derive(Clone, Copy, Debug)]
pub struct Projector {
    position: Vec3,
    inv_orientation: Quat,
    focal_px: f32,
    center: Vec2,
}

impl Projector {
    /// Projection through `camera` into an image of `res`.
    pub fn new(camera: &Camera, res: Resolution) -> Self {
        let (w, h) = (res.width as f32, res.height as f32);
        let sensor = if camera.sensor_mm > 0.0 {
            camera.sensor_mm
        } else {
            Camera::SENSOR_MM
        };
        Self {
            position: camera.position,
            inv_orientation: camera.orientation().conjugate(),
            focal_px: camera.lens_mm / sensor * w.max(h),
            center: Vec2::new(0.5 * w, 0.5 * h),
        }
    }

    /// Focal length in pixels.
    pub fn focal_px(&self) -> f32 {
        self.focal_px
    }

    /// Point in camera space (camera looks down -Z).
    pub fn to_view(&self, p: Vec3) -> Vec3 {
        self.inv_orientation * (p - self.position)
    }

    /// Distance in front of the camera along its viewing axis.
    pub fn depth(&self, p: Vec3) -> f32 {
        -self.to_view(p).z
    }

    /// Screen position of a camera-space point in front of the near plane.
    pub fn view_to_screen(&self, v: Vec3) -> Vec2 {
        let d = (-v.z).max(NEAR_CLIP);
        self.center + Vec2::new(v.x, -v.y) * (self.focal_px / d)
    }

    /// Screen position and depth of `p`, or `None` when it lies behind the near plane.
    pub fn project(&self, p: Vec3) -> Option<(Vec2, f32)> {
        let v = self.to_view(p);
        let depth = -v.z;
        (depth >= NEAR_CLIP).then(|| (self.view_to_screen(v), depth))
    }

    /// On-screen size in pixels of a length `r` seen at `depth`.
    pub fn scale_at(&self, r: f32, depth: f32) -> f32 {
        r * self.focal_px / depth.max(NEAR_CLIP)
    }
}

/// Clip a camera-space polygon to the part in front of the near plane.
pub fn clip_to_near(poly: &[Vec3]) -> Vec<Vec3> {
    let inside = |v: Vec3| -v.z >= NEAR_CLIP;
    let mut out = Vec::with_capacity(poly.len() + 2);
    for (i, &cur) in poly.iter().enumerate() {
        let prev = poly[(i + poly.len() - 1) % poly.len()];
        match (inside(prev), inside(cur)) {
            (true, true) => out.push(cur),
            (true, false) => out.push(near_crossing(prev, cur)),
            (false, true) => {
                out.push(near_crossing(prev, cur));
                out.push(cur);
            }
            (false, false) => {}
        }
    }
    out
}

fn near_crossing(a: Vec3, b: Vec3) -> Vec3 {
    let t = (-NEAR_CLIP - a.z) / (b.z - a.z);
    a.lerp(b, t)
}

#[cfg(test)]
#[path = "../../tests/unit/camera/projection.rs"]
mod tests;
