use std::path::Path;

use glam::Quat;

use crate::assets::bvh::MotionClip;
use crate::foundation::core::Fps;
use crate::foundation::error::VizResult;
use crate::scene::ids::SkeletonId;
use crate::scene::skeleton::Armature;
use crate::scene::state::SceneState;

/// A motion clip imported into a scene as an animated armature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadedClip {
    /// Clip armature.
    pub id: SkeletonId,
    /// Unique scene name of the clip armature; used as the clip's output label.
    pub name: String,
    /// Native number of frames.
    pub frame_count: u64,
    /// Native frame rate.
    pub fps: Fps,
}

/// Import a BVH file as an independent animated armature.
///
/// The clip keeps its authored frame timing; the scene adopts its frame rate and extends its
/// duration to cover it.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn load_clip(scene: &mut SceneState, path: &Path) -> VizResult<LoadedClip> {
    let clip = MotionClip::from_path(path)?;
    Ok(add_clip(scene, clip))
}

/// Add an already parsed clip to the scene.
pub fn add_clip(scene: &mut SceneState, clip: MotionClip) -> LoadedClip {
    let frame_count = clip.frame_count();
    let fps = clip.motion.fps;
    let bones = clip.skeleton.len();

    let mut armature = Armature::new(clip.skeleton);
    armature.motion = Some(clip.motion);
    let (id, name) = scene.add_armature(&clip.name, armature);
    scene.register_clip_timing(fps, frame_count);

    tracing::info!(clip = %name, bones, frames = frame_count, fps = fps.as_f64(), "clip loaded");
    LoadedClip {
        id,
        name,
        frame_count,
        fps,
    }
}

/// Turn a clip armature about the scene Z axis by `yaw` radians.
pub fn set_clip_yaw(scene: &mut SceneState, clip: &LoadedClip, yaw: f32) {
    scene.armature_mut(clip.id).placement.rotation = Quat::from_rotation_z(yaw);
}

#[cfg(test)]
#[path = "../../tests/unit/assets/clip.rs"]
mod tests;
