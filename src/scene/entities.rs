use std::path::PathBuf;

use glam::{Quat, Vec3};

use crate::foundation::core::FrameIndex;
use crate::foundation::math::euler_xyz;
use crate::scene::ids::{MaterialId, MeshId, SkeletonId};

/// One of the two actor slots of a job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActorSlot {
    /// First actor (first input clip).
    Actor1,
    /// Second actor (second input clip).
    Actor2,
}

impl ActorSlot {
    /// Both slots in render order.
    pub const ALL: [ActorSlot; 2] = [ActorSlot::Actor1, ActorSlot::Actor2];

    /// Identity label (`actor1`/`actor2`).
    pub fn label(self) -> &'static str {
        match self {
            Self::Actor1 => "actor1",
            Self::Actor2 => "actor2",
        }
    }

    /// Scene object name of the avatar loaded into this slot.
    pub fn object_name(self) -> &'static str {
        match self {
            Self::Actor1 => "OBJ1",
            Self::Actor2 => "OBJ2",
        }
    }

    /// Zero-based slot index.
    pub fn index(self) -> usize {
        match self {
            Self::Actor1 => 0,
            Self::Actor2 => 1,
        }
    }
}

/// One avatar copy bound to one actor slot.
#[derive(Clone, Debug)]
pub struct AvatarInstance {
    /// Slot the avatar occupies.
    pub slot: ActorSlot,
    /// Scene name of the avatar armature.
    pub name: String,
    /// Avatar armature.
    pub skeleton: SkeletonId,
    /// Avatar body mesh.
    pub mesh: MeshId,
    /// Clip armature driving this avatar, set by retargeting.
    pub clip: Option<SkeletonId>,
}

/// Body mesh deformed by an armature, drawn as limb capsules around bone segments.
#[derive(Clone, Debug)]
pub struct SkinnedMesh {
    /// Deforming armature.
    pub skeleton: SkeletonId,
    /// Surface material.
    pub material: MaterialId,
    /// Limb radius per bone (aligned with the skeleton's bone order), in scene units.
    pub radii: Vec<f32>,
    /// Keep limb thickness constant through bends and round off joints.
    pub preserve_volume: bool,
    /// Excluded from rendering when `true`.
    pub hide_render: bool,
}

/// Flat-shaded surface material.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    /// Straight-alpha base color in `0.0..=1.0`.
    pub base_color: [f32; 4],
    /// Image texture the base color was sampled from, if any.
    pub texture: Option<PathBuf>,
}

/// Static square plane (the floor).
#[derive(Clone, Debug)]
pub struct Plane {
    /// Edge length before scaling.
    pub size: f32,
    /// Center location.
    pub location: Vec3,
    /// Per-axis scale.
    pub scale: Vec3,
    /// Surface material.
    pub material: Option<MaterialId>,
}

impl Plane {
    /// Corner points in world space, counter-clockwise seen from above.
    pub fn corners(&self) -> [Vec3; 4] {
        let hx = 0.5 * self.size * self.scale.x;
        let hy = 0.5 * self.size * self.scale.y;
        let c = self.location;
        [
            c + Vec3::new(-hx, -hy, 0.0),
            c + Vec3::new(hx, -hy, 0.0),
            c + Vec3::new(hx, hy, 0.0),
            c + Vec3::new(-hx, hy, 0.0),
        ]
    }
}

/// Perspective camera.
///
/// The camera looks down its local -Z axis with local +Y up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    /// World position.
    pub position: Vec3,
    /// Euler rotation in radians, applied X, then Y, then Z.
    pub rotation: Vec3,
    /// Focal length in millimetres.
    pub lens_mm: f32,
    /// Sensor width in millimetres.
    pub sensor_mm: f32,
    /// Gizmo scale; has no effect on rendering.
    pub scale: Vec3,
}

impl Camera {
    /// Default sensor width in millimetres.
    pub const SENSOR_MM: f32 = 36.0;

    /// Orientation quaternion.
    pub fn orientation(&self) -> Quat {
        euler_xyz(self.rotation)
    }

    /// Unit viewing direction in world space.
    pub fn view_dir(&self) -> Vec3 {
        self.orientation() * Vec3::NEG_Z
    }
}

/// Audio clip placed on the scene timeline.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioStrip {
    /// Audio file.
    pub path: PathBuf,
    /// Scene frame the audio starts on.
    pub frame_start: FrameIndex,
}
