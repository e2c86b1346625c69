use glam::{Quat, Vec3};

use crate::foundation::core::FrameIndex;
use crate::foundation::error::{VizError, VizResult};
use crate::retarget::binding::ConstraintKind;
use crate::scene::ids::SkeletonId;
use crate::scene::skeleton::WorldPose;
use crate::scene::state::SceneState;

/// World pose of an armature on frame `f`, with its retarget constraints applied.
///
/// Unconstrained bones keep their rest orientation relative to the parent. A rotation constraint
/// replaces the bone's world rotation with the source bone's; a location constraint replaces its
/// head. Children are placed from the evaluated parent, so constraints propagate down the chain.
pub fn evaluate_pose(scene: &SceneState, id: SkeletonId, f: FrameIndex) -> VizResult<WorldPose> {
    let armature = scene.armature(id);
    let Some(binding) = armature.binding.as_ref() else {
        return Ok(armature.animated_pose(f));
    };

    let source = scene.armature(binding.source);
    let source_name = scene.skeleton_name(binding.source);
    let source_pose = source.animated_pose(f);

    let skeleton = &armature.skeleton;
    let n = skeleton.len();
    let mut heads: Vec<Vec3> = Vec::with_capacity(n);
    let mut rotations: Vec<Quat> = Vec::with_capacity(n);
    for bone in skeleton.bones() {
        let (mut head, mut rot) = match bone.parent {
            Some(p) => (heads[p] + rotations[p] * bone.offset, rotations[p]),
            None => (
                armature.placement.transform_point(bone.offset),
                armature.placement.rotation,
            ),
        };
        for c in binding.active().filter(|c| c.target_bone == bone.name) {
            let i = source.skeleton.bone_index(&c.source_bone).ok_or_else(|| {
                VizError::retarget(format!(
                    "bone '{}' not found on skeleton '{source_name}'",
                    c.source_bone
                ))
            })?;
            match c.kind {
                ConstraintKind::Location => head = source_pose.heads[i],
                ConstraintKind::Rotation => rot = source_pose.rotations[i],
            }
        }
        heads.push(head);
        rotations.push(rot);
    }
    Ok(WorldPose { heads, rotations })
}

#[cfg(test)]
#[path = "../../tests/unit/retarget/pose.rs"]
mod tests;
