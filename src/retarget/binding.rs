use std::collections::HashMap;
use std::str::FromStr;

use crate::assets::bvh::strip_clip_namespace;
use crate::foundation::error::{VizError, VizResult};
use crate::scene::ids::SkeletonId;
use crate::scene::skeleton::Skeleton;

/// Avatar bone whose world location follows the clip in full-body mode.
pub const ROOT_BONE: &str = "body_world";

/// Rotation constraints muted in upper-body mode: the spine root and both legs.
pub const UPPER_BODY_MUTED: [&str; 5] = ["b_root", "b_r_upleg", "b_r_leg", "b_l_upleg", "b_l_leg"];

/// Which parts of the avatar follow the clip.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualizationMode {
    /// Every matching bone follows the clip and the avatar travels with it.
    #[default]
    FullBody,
    /// Lower-body posture and root location stay at rest.
    UpperBody,
}

impl VisualizationMode {
    /// Canonical string form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FullBody => "full_body",
            Self::UpperBody => "upper_body",
        }
    }
}

impl FromStr for VisualizationMode {
    type Err = VizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full_body" => Ok(Self::FullBody),
            "upper_body" => Ok(Self::UpperBody),
            other => Err(VizError::configuration(format!(
                "unsupported visualization mode '{other}' (expected full_body or upper_body)"
            ))),
        }
    }
}

impl std::fmt::Display for VisualizationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a constraint copies from its source bone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    /// World-space head location.
    Location,
    /// World-space rotation.
    Rotation,
}

/// One avatar bone following one clip bone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoneConstraint {
    /// Avatar bone being driven.
    pub target_bone: String,
    /// Clip bone being followed, as named in the clip.
    pub source_bone: String,
    /// Copied channel.
    pub kind: ConstraintKind,
    /// Muted constraints are kept but have no effect.
    pub muted: bool,
}

/// Constraints binding an avatar armature to a clip armature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetargetBinding {
    /// Clip armature the constraints read from.
    pub source: SkeletonId,
    /// Constraints in avatar bone order; a location constraint precedes the rotation one.
    pub constraints: Vec<BoneConstraint>,
}

impl RetargetBinding {
    /// Build the constraint set for `avatar` following `clip`.
    ///
    /// A clip bone matches an avatar bone when its name, stripped of any clip namespace, is
    /// equal to the avatar bone name.
    pub fn build(
        avatar: &Skeleton,
        clip: &Skeleton,
        clip_name: &str,
        source: SkeletonId,
        mode: VisualizationMode,
    ) -> VizResult<Self> {
        let by_plain_name: HashMap<&str, &str> = clip
            .bones()
            .iter()
            .map(|b| (strip_clip_namespace(&b.name), b.name.as_str()))
            .collect();

        let mut constraints = Vec::new();
        for bone in avatar.bones() {
            let matched = by_plain_name.get(bone.name.as_str()).copied();
            if bone.name == ROOT_BONE && mode == VisualizationMode::FullBody {
                let source_bone = matched.ok_or_else(|| {
                    VizError::retarget(format!(
                        "bone '{ROOT_BONE}' not found on skeleton '{clip_name}'"
                    ))
                })?;
                constraints.push(BoneConstraint {
                    target_bone: bone.name.clone(),
                    source_bone: source_bone.to_owned(),
                    kind: ConstraintKind::Location,
                    muted: false,
                });
            }
            if let Some(source_bone) = matched {
                constraints.push(BoneConstraint {
                    target_bone: bone.name.clone(),
                    source_bone: source_bone.to_owned(),
                    kind: ConstraintKind::Rotation,
                    muted: false,
                });
            }
        }

        let mut binding = Self {
            source,
            constraints,
        };
        if mode == VisualizationMode::UpperBody {
            for bone in UPPER_BODY_MUTED {
                binding.mute(bone, ConstraintKind::Rotation).map_err(|_| {
                    VizError::retarget(format!(
                        "no rotation constraint on bone '{bone}' to mute (bone missing on skeleton '{clip_name}')"
                    ))
                })?;
            }
        }
        Ok(binding)
    }

    /// The constraint of `kind` on avatar bone `bone`.
    pub fn find(&self, bone: &str, kind: ConstraintKind) -> Option<&BoneConstraint> {
        self.constraints
            .iter()
            .find(|c| c.kind == kind && c.target_bone == bone)
    }

    /// Constraints that are not muted.
    pub fn active(&self) -> impl Iterator<Item = &BoneConstraint> {
        self.constraints.iter().filter(|c| !c.muted)
    }

    /// Mute the constraint of `kind` on `bone`.
    pub fn mute(&mut self, bone: &str, kind: ConstraintKind) -> VizResult<()> {
        let c = self
            .constraints
            .iter_mut()
            .find(|c| c.kind == kind && c.target_bone == bone)
            .ok_or_else(|| {
                VizError::retarget(format!("no {kind:?} constraint on bone '{bone}'"))
            })?;
        c.muted = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/retarget/binding.rs"]
mod tests;
