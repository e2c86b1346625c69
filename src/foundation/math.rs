use glam::{Quat, Vec3};

pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

/// Rotation for Euler angles (radians) applied X first, then Y, then Z about fixed scene axes.
pub(crate) fn euler_xyz(rot: Vec3) -> Quat {
    Quat::from_rotation_z(rot.z) * Quat::from_rotation_y(rot.y) * Quat::from_rotation_x(rot.x)
}

/// Basis change from Y-up clip space to the Z-up scene: `(x, y, z) -> (x, -z, y)`.
pub(crate) fn y_up_to_z_up() -> Quat {
    Quat::from_rotation_x(std::f32::consts::FRAC_PI_2)
}

/// Re-express a clip-space rotation in scene axes.
pub(crate) fn convert_rotation(q: Quat) -> Quat {
    let c = y_up_to_z_up();
    (c * q * c.conjugate()).normalize()
}

/// Re-express a clip-space position in scene axes, scaled to scene units.
pub(crate) fn convert_position(p: Vec3, scale: f32) -> Vec3 {
    y_up_to_z_up() * p * scale
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
