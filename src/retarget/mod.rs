//! Constraint-based retargeting of clip motion onto avatar armatures.

/// Constraint records and mode-dependent construction.
pub mod binding;
/// Pose evaluation with constraints applied.
pub mod pose;

use crate::foundation::error::VizResult;
use crate::scene::entities::ActorSlot;
use crate::scene::state::SceneState;

pub use binding::{
    BoneConstraint, ConstraintKind, RetargetBinding, ROOT_BONE, UPPER_BODY_MUTED,
    VisualizationMode,
};
pub use pose::evaluate_pose;

/// Bind the avatar in `slot` to the clip armature named `clip_name`.
///
/// Any previous constraints on the avatar are discarded. The scene is in pose editing on the
/// avatar for the duration of the call and back to idle afterwards, whether binding succeeded or
/// not. Fails with a retarget error when the clip armature or a required bone is missing.
#[tracing::instrument(skip(scene, slot), fields(slot = slot.label()))]
pub fn retarget(
    scene: &mut SceneState,
    slot: ActorSlot,
    clip_name: &str,
    mode: VisualizationMode,
) -> VizResult<()> {
    let clip = scene.skeleton_id(clip_name)?;
    let avatar = scene.avatar(slot)?.skeleton;

    scene.set_mode(scene.mode().enter_editing(avatar)?);
    scene.armature_mut(avatar).binding = None;
    let built = RetargetBinding::build(
        &scene.armature(avatar).skeleton,
        &scene.armature(clip).skeleton,
        clip_name,
        clip,
        mode,
    );
    scene.set_mode(scene.mode().exit());
    let binding = built?;

    for c in &binding.constraints {
        tracing::debug!(
            target_bone = %c.target_bone,
            source_bone = %c.source_bone,
            kind = ?c.kind,
            muted = c.muted,
            "constraint"
        );
    }
    let active = binding.active().count();
    let total = binding.constraints.len();
    scene.armature_mut(avatar).binding = Some(binding);
    scene.avatar_mut(slot)?.clip = Some(clip);

    tracing::info!(clip = clip_name, %mode, total, active, "retarget bound");
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/retarget/mod.rs"]
mod tests;
