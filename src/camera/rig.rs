use glam::Vec3;

use crate::foundation::core::FrameIndex;
use crate::foundation::error::VizResult;
use crate::retarget::{ROOT_BONE, VisualizationMode, evaluate_pose};
use crate::scene::entities::{ActorSlot, Camera};
use crate::scene::ids::CameraId;
use crate::scene::state::SceneState;

/// Name of the overview camera.
pub const MAIN_CAMERA: &str = "Main";

/// Focal length of every rig camera, in millimetres.
pub const LENS_MM: f32 = 25.0;

/// Camera gizmo scale.
pub const GIZMO_SCALE: Vec3 = Vec3::new(5.0, 25.0, 5.0);

/// Spine-root bone giving an actor camera its depth.
pub const SPINE_ROOT_BONE: &str = "b_root";

/// Height of an actor camera above the actor's root bone, in metres.
pub const ACTOR_CAMERA_HEIGHT: f32 = 1.5;

const ACTOR_CAMERA_PITCH_DEG: f32 = 75.0;

/// Camera position and Euler rotation (radians).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    /// World position.
    pub position: Vec3,
    /// Euler XYZ rotation in radians.
    pub rotation: Vec3,
}

impl CameraPose {
    /// Pose from a position and Euler angles in degrees.
    pub fn from_degrees(position: Vec3, rotation_deg: Vec3) -> Self {
        Self {
            position,
            rotation: Vec3::new(
                rotation_deg.x.to_radians(),
                rotation_deg.y.to_radians(),
                rotation_deg.z.to_radians(),
            ),
        }
    }

    fn camera(self) -> Camera {
        Camera {
            position: self.position,
            rotation: self.rotation,
            lens_mm: LENS_MM,
            sensor_mm: Camera::SENSOR_MM,
            scale: GIZMO_SCALE,
        }
    }
}

/// Overview camera pose framing both actors.
///
/// Upper-body mode moves closer and higher, since the legs stay out of the shot.
pub fn overview_pose(mode: VisualizationMode) -> CameraPose {
    let position = match mode {
        VisualizationMode::FullBody => Vec3::new(0.0, -3.0, 1.1),
        VisualizationMode::UpperBody => Vec3::new(0.0, -2.45, 1.3),
    };
    CameraPose::from_degrees(position, Vec3::new(90.0, 0.0, 0.0))
}

/// Yaw of an actor camera in degrees.
pub fn actor_camera_yaw_deg(slot: ActorSlot) -> f32 {
    match slot {
        ActorSlot::Actor1 => 90.0,
        ActorSlot::Actor2 => -90.0,
    }
}

/// Pose of the camera mounted on the actor in `slot`, from its retargeted pose on frame `f`.
///
/// x and height come from the root bone, depth from the spine root. Both are read from the
/// posed avatar at `f`, not from the clip armature's rest-pose bone heads, so a clip whose first
/// frame moves away from its rest pose mounts the camera where the actor actually stands.
pub fn actor_camera_pose(scene: &SceneState, slot: ActorSlot, f: FrameIndex) -> VizResult<CameraPose> {
    let avatar = scene.avatar(slot)?;
    let armature = scene.armature(avatar.skeleton);
    let pose = evaluate_pose(scene, avatar.skeleton, f)?;
    let root = pose.head_of(&armature.skeleton, &avatar.name, ROOT_BONE)?;
    let spine = pose.head_of(&armature.skeleton, &avatar.name, SPINE_ROOT_BONE)?;
    Ok(CameraPose::from_degrees(
        Vec3::new(root.x, spine.y, root.z + ACTOR_CAMERA_HEIGHT),
        Vec3::new(ACTOR_CAMERA_PITCH_DEG, 0.0, actor_camera_yaw_deg(slot)),
    ))
}

/// The three cameras of a job.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CameraRig {
    /// Overview camera.
    pub main: CameraId,
    /// Per-actor cameras, indexed by [`ActorSlot::index`].
    pub actors: [CameraId; 2],
}

impl CameraRig {
    /// Camera of the pass for `slot`, or the overview camera for `None`.
    pub fn camera_for(&self, slot: Option<ActorSlot>) -> CameraId {
        match slot {
            None => self.main,
            Some(s) => self.actors[s.index()],
        }
    }
}

/// Place the overview camera and one camera per actor.
///
/// Both avatars must already be retargeted; actor cameras are derived from their poses on
/// frame `f`. No camera is activated.
#[tracing::instrument(skip(scene))]
pub fn build_camera_rig(scene: &mut SceneState, overview: CameraPose, f: FrameIndex) -> VizResult<CameraRig> {
    let mut actor_poses = Vec::with_capacity(ActorSlot::ALL.len());
    for slot in ActorSlot::ALL {
        actor_poses.push((slot, actor_camera_pose(scene, slot, f)?));
    }

    let (main, _) = scene.add_camera(MAIN_CAMERA, overview.camera());
    let mut actors = [main; 2];
    for (slot, pose) in actor_poses {
        let wanted = format!("{}_cam", scene.avatar(slot)?.name);
        let (id, name) = scene.add_camera(&wanted, pose.camera());
        tracing::info!(camera = %name, position = ?pose.position, "actor camera placed");
        actors[slot.index()] = id;
    }
    Ok(CameraRig { main, actors })
}

#[cfg(test)]
#[path = "../../tests/unit/camera/rig.rs"]
mod tests;
