use std::collections::HashMap;

use glam::{Quat, Vec3};

use crate::foundation::core::{FrameIndex, Fps};
use crate::foundation::error::{VizError, VizResult};
use crate::retarget::binding::RetargetBinding;

/// One joint of a skeletal hierarchy.
#[derive(Clone, Debug, PartialEq)]
pub struct Bone {
    /// Bone name, unique within its skeleton.
    pub name: String,
    /// Index of the parent bone; `None` for roots.
    pub parent: Option<usize>,
    /// Rest-pose head position relative to the parent head, in scene units.
    pub offset: Vec3,
}

/// Bone hierarchy in parent-before-child order.
#[derive(Clone, Debug, Default)]
pub struct Skeleton {
    bones: Vec<Bone>,
    index: HashMap<String, usize>,
}

impl Skeleton {
    /// Build a skeleton from bones listed parents-first.
    pub fn new(bones: Vec<Bone>) -> VizResult<Self> {
        let mut index = HashMap::with_capacity(bones.len());
        for (i, b) in bones.iter().enumerate() {
            if let Some(p) = b.parent
                && p >= i
            {
                return Err(VizError::asset_load(format!(
                    "bone '{}' is listed before its parent",
                    b.name
                )));
            }
            if index.insert(b.name.clone(), i).is_some() {
                return Err(VizError::asset_load(format!(
                    "duplicate bone name '{}'",
                    b.name
                )));
            }
        }
        Ok(Self { bones, index })
    }

    /// Bones in hierarchy order.
    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    /// Number of bones.
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    /// Return `true` when the skeleton has no bones.
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Index of the bone named `name`.
    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Return `true` when a bone named `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Remove a bone, re-parenting its children onto its parent.
    ///
    /// Children keep their rest position: their offsets absorb the removed bone's offset.
    /// Returns `false` when no bone has that name.
    pub fn remove_bone(&mut self, name: &str) -> bool {
        let Some(removed) = self.bone_index(name) else {
            return false;
        };
        let gone = self.bones.remove(removed);
        for b in &mut self.bones {
            match b.parent {
                Some(p) if p == removed => {
                    b.parent = gone.parent;
                    b.offset += gone.offset;
                }
                Some(p) if p > removed => b.parent = Some(p - 1),
                _ => {}
            }
        }
        self.index = self
            .bones
            .iter()
            .enumerate()
            .map(|(i, b)| (b.name.clone(), i))
            .collect();
        true
    }

    /// Rest-pose head positions in armature space.
    pub fn rest_heads(&self) -> Vec<Vec3> {
        let mut heads: Vec<Vec3> = Vec::with_capacity(self.bones.len());
        for b in &self.bones {
            let base = b.parent.map(|p| heads[p]).unwrap_or(Vec3::ZERO);
            heads.push(base + b.offset);
        }
        heads
    }
}

/// Local transform of one bone on one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BonePose {
    /// Translation replacing the rest offset, for bones with position channels.
    pub translation: Option<Vec3>,
    /// Rotation relative to the parent bone.
    pub rotation: Quat,
}

impl Default for BonePose {
    fn default() -> Self {
        Self {
            translation: None,
            rotation: Quat::IDENTITY,
        }
    }
}

/// Per-frame local bone transforms of an imported clip.
#[derive(Clone, Debug)]
pub struct Motion {
    /// `frames[f][bone]`, bone order matching the owning skeleton.
    pub frames: Vec<Vec<BonePose>>,
    /// Native frame rate of the clip.
    pub fps: Fps,
    /// Seconds per frame as authored; `fps` is this rounded to a whole rate.
    pub frame_time: f64,
}

impl Motion {
    /// Native number of frames.
    pub fn frame_count(&self) -> u64 {
        self.frames.len() as u64
    }

    /// Poses for scene frame `f`; frames past the end hold the last pose.
    pub fn sample(&self, f: FrameIndex) -> Option<&[BonePose]> {
        let last = self.frames.len().checked_sub(1)?;
        let i = usize::try_from(f.0).unwrap_or(usize::MAX).min(last);
        Some(&self.frames[i])
    }
}

/// Object-level transform of an armature in the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// Object location.
    pub location: Vec3,
    /// Object rotation.
    pub rotation: Quat,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            location: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Placement {
    /// Map an armature-space point to world space.
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.location + self.rotation * p
    }
}

/// World-space pose of every bone of one skeleton on one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorldPose {
    /// Head position per bone.
    pub heads: Vec<Vec3>,
    /// Accumulated rotation per bone.
    pub rotations: Vec<Quat>,
}

impl WorldPose {
    /// World-space head of `bone` in `skeleton`, or a retarget error naming both.
    pub fn head_of(&self, skeleton: &Skeleton, skeleton_name: &str, bone: &str) -> VizResult<Vec3> {
        skeleton
            .bone_index(bone)
            .and_then(|i| self.heads.get(i).copied())
            .ok_or_else(|| {
                VizError::retarget(format!(
                    "bone '{bone}' not found on skeleton '{skeleton_name}'"
                ))
            })
    }
}

/// Armature entity: a skeleton placed in the scene, with optional motion and constraints.
#[derive(Clone, Debug)]
pub struct Armature {
    /// Bone hierarchy and rest pose.
    pub skeleton: Skeleton,
    /// Object transform.
    pub placement: Placement,
    /// Keyframed motion, present on imported clips.
    pub motion: Option<Motion>,
    /// Constraints driving this armature from another one.
    pub binding: Option<RetargetBinding>,
}

impl Armature {
    /// Armature at the origin without motion or constraints.
    pub fn new(skeleton: Skeleton) -> Self {
        Self {
            skeleton,
            placement: Placement::default(),
            motion: None,
            binding: None,
        }
    }

    /// Rest pose in world space.
    pub fn rest_pose(&self) -> WorldPose {
        let heads = self
            .skeleton
            .rest_heads()
            .into_iter()
            .map(|h| self.placement.transform_point(h))
            .collect();
        WorldPose {
            heads,
            rotations: vec![self.placement.rotation; self.skeleton.len()],
        }
    }

    /// Forward kinematics of the keyframed motion on frame `f`.
    ///
    /// Armatures without motion return the rest pose.
    pub fn animated_pose(&self, f: FrameIndex) -> WorldPose {
        let Some(locals) = self.motion.as_ref().and_then(|m| m.sample(f)) else {
            return self.rest_pose();
        };
        let n = self.skeleton.len();
        let mut heads = Vec::with_capacity(n);
        let mut rotations = Vec::with_capacity(n);
        for (i, bone) in self.skeleton.bones().iter().enumerate() {
            let local = locals.get(i).copied().unwrap_or_default();
            let t = local.translation.unwrap_or(bone.offset);
            let (head, rot) = match bone.parent {
                Some(p) => (heads[p] + rotations[p] * t, rotations[p] * local.rotation),
                None => (
                    self.placement.transform_point(t),
                    self.placement.rotation * local.rotation,
                ),
            };
            heads.push(head);
            rotations.push(rot.normalize());
        }
        WorldPose { heads, rotations }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/skeleton.rs"]
mod tests;
