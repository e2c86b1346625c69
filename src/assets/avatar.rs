use std::path::{Path, PathBuf};

use anyhow::Context as _;
use glam::Vec3;

use crate::foundation::error::{VizError, VizResult};
use crate::scene::entities::{ActorSlot, AvatarInstance, Material, Plane, SkinnedMesh};
use crate::scene::ids::MaterialId;
use crate::scene::skeleton::{Armature, Bone, Skeleton};
use crate::scene::state::SceneState;

/// Bone the reference rig ships with that has no valid rest orientation; removed on load.
pub const MALFORMED_BONE: &str = "b_r_foot_End";

/// Name of the shared avatar material.
pub const BASE_MATERIAL: &str = "gray";

/// Name of the floor material.
pub const FLOOR_MATERIAL: &str = "FloorColor";

const DEFAULT_BASE_COLOR: [f32; 4] = [0.62, 0.62, 0.62, 1.0];
const FLOOR_COLOR: [f32; 4] = [0.15, 0.4, 0.25, 1.0];

/// One bone of an avatar rig description.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RigBone {
    /// Bone name; retargeting matches clip bones by this name.
    pub name: String,
    /// Parent bone name, `None` for the root.
    #[serde(default)]
    pub parent: Option<String>,
    /// Rest head offset from the parent head, in metres, Z-up.
    pub head: [f32; 3],
    /// Limb radius used for the bone's body segment, in metres. Zero draws nothing.
    #[serde(default)]
    pub radius: f32,
}

/// Avatar rig and body description.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RigAsset {
    /// Name of the body mesh.
    pub mesh: String,
    /// Bones, parents first.
    pub bones: Vec<RigBone>,
}

impl RigAsset {
    /// Read a rig description from JSON.
    pub fn from_path(path: &Path) -> VizResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read avatar rig '{}'", path.display()))
            .map_err(|e| VizError::asset_load(format!("{e:#}")))?;
        let rig: Self = serde_json::from_slice(&bytes).map_err(|e| {
            VizError::asset_load(format!("malformed avatar rig '{}': {e}", path.display()))
        })?;
        if rig.bones.is_empty() {
            return Err(VizError::asset_load(format!(
                "avatar rig '{}' has no bones",
                path.display()
            )));
        }
        Ok(rig)
    }

    /// Build the skeleton and the per-bone limb radii.
    pub fn build(&self) -> VizResult<(Skeleton, Vec<f32>)> {
        let mut bones = Vec::with_capacity(self.bones.len());
        let mut radii = Vec::with_capacity(self.bones.len());
        for b in &self.bones {
            let parent = match &b.parent {
                None => None,
                Some(p) => Some(
                    self.bones
                        .iter()
                        .position(|x| &x.name == p)
                        .ok_or_else(|| {
                            VizError::asset_load(format!(
                                "bone '{}' names unknown parent '{p}'",
                                b.name
                            ))
                        })?,
                ),
            };
            bones.push(Bone {
                name: b.name.clone(),
                parent,
                offset: Vec3::from_array(b.head),
            });
            radii.push(b.radius.max(0.0));
        }
        Ok((Skeleton::new(bones)?, radii))
    }

    /// The reference avatar: a T-posed humanoid facing -Y, feet on the ground plane.
    pub fn reference() -> Self {
        let b = |name: &str, parent: Option<&str>, head: [f32; 3], radius: f32| RigBone {
            name: name.to_owned(),
            parent: parent.map(str::to_owned),
            head,
            radius,
        };
        let mut bones = vec![
            b("body_world", None, [0.0, 0.0, 0.0], 0.0),
            b("b_root", Some("body_world"), [0.0, 0.0, 0.95], 0.12),
            b("b_spine0", Some("b_root"), [0.0, 0.0, 0.08], 0.13),
            b("b_spine1", Some("b_spine0"), [0.0, 0.0, 0.10], 0.13),
            b("b_spine2", Some("b_spine1"), [0.0, 0.0, 0.10], 0.14),
            b("b_spine3", Some("b_spine2"), [0.0, 0.0, 0.10], 0.14),
            b("b_neck0", Some("b_spine3"), [0.0, 0.0, 0.12], 0.05),
            b("b_head", Some("b_neck0"), [0.0, 0.0, 0.10], 0.10),
            b("b_head_null", Some("b_head"), [0.0, 0.0, 0.12], 0.0),
        ];
        for (side, sx) in [("l", 1.0f32), ("r", -1.0f32)] {
            let n = |bone: &str| format!("b_{side}_{bone}");
            bones.extend([
                b(&n("shoulder"), Some("b_spine3"), [0.03 * sx, 0.0, 0.08], 0.06),
                b(&n("arm"), Some(n("shoulder").as_str()), [0.15 * sx, 0.0, 0.0], 0.055),
                b(&n("forearm"), Some(n("arm").as_str()), [0.28 * sx, 0.0, 0.0], 0.045),
                b(&n("wrist"), Some(n("forearm").as_str()), [0.26 * sx, 0.0, 0.0], 0.045),
                b(&n("upleg"), Some("b_root"), [0.10 * sx, 0.0, -0.05], 0.075),
                b(&n("leg"), Some(n("upleg").as_str()), [0.0, 0.0, -0.43], 0.06),
                b(&n("foot"), Some(n("leg").as_str()), [0.0, 0.0, -0.42], 0.045),
                b(&n("toe"), Some(n("foot").as_str()), [0.0, -0.14, -0.05], 0.0),
            ]);
        }
        bones.push(b(MALFORMED_BONE, Some("b_r_toe"), [0.0, -0.03, 0.0], 0.0));
        Self {
            mesh: "LowP_01".to_owned(),
            bones,
        }
    }
}

/// Create the shared avatar material once per scene and return it.
///
/// With a texture, the base color is the texture's mean color.
pub fn ensure_base_material(scene: &mut SceneState, texture: Option<&Path>) -> VizResult<MaterialId> {
    if let Ok(id) = scene.material_id(BASE_MATERIAL) {
        return Ok(id);
    }
    let base_color = match texture {
        Some(path) => mean_texture_color(path)?,
        None => DEFAULT_BASE_COLOR,
    };
    let (id, _) = scene.add_material(
        BASE_MATERIAL,
        Material {
            base_color,
            texture: texture.map(PathBuf::from),
        },
    );
    Ok(id)
}

/// Add the floor plane and its material.
pub fn add_floor(scene: &mut SceneState) {
    let (material, _) = scene.add_material(
        FLOOR_MATERIAL,
        Material {
            base_color: FLOOR_COLOR,
            texture: None,
        },
    );
    scene.add_plane(
        "Floor",
        Plane {
            size: 20.0,
            location: Vec3::ZERO,
            scale: Vec3::splat(100.0),
            material: Some(material),
        },
    );
}

fn mean_texture_color(path: &Path) -> VizResult<[f32; 4]> {
    let img = image::open(path)
        .map_err(|e| VizError::asset_load(format!("texture '{}': {e}", path.display())))?
        .to_rgb8();
    let n = u64::from(img.width()) * u64::from(img.height());
    if n == 0 {
        return Err(VizError::asset_load(format!(
            "texture '{}' is empty",
            path.display()
        )));
    }
    let mut sum = [0u64; 3];
    for px in img.pixels() {
        for (s, &c) in sum.iter_mut().zip(px.0.iter()) {
            *s += u64::from(c);
        }
    }
    let mean = |s: u64| (s as f64 / n as f64 / 255.0) as f32;
    Ok([mean(sum[0]), mean(sum[1]), mean(sum[2]), 1.0])
}

/// Load one copy of the avatar into `slot`.
///
/// Strips [`MALFORMED_BONE`], binds the shared material and enables volume-preserving
/// deformation. The armature is named after the slot (`OBJ1`/`OBJ2`).
#[tracing::instrument(skip_all, fields(slot = slot.label()))]
pub fn load_avatar(
    scene: &mut SceneState,
    rig: &RigAsset,
    slot: ActorSlot,
    material: MaterialId,
) -> VizResult<AvatarInstance> {
    let (mut skeleton, mut radii) = rig.build()?;
    match skeleton.bone_index(MALFORMED_BONE) {
        Some(i) => {
            skeleton.remove_bone(MALFORMED_BONE);
            radii.remove(i);
        }
        None => tracing::debug!("rig has no '{MALFORMED_BONE}' bone to strip"),
    }

    let (skeleton_id, name) = scene.add_armature(slot.object_name(), Armature::new(skeleton));
    let (mesh, mesh_name) = scene.add_mesh(
        &rig.mesh,
        SkinnedMesh {
            skeleton: skeleton_id,
            material,
            radii,
            preserve_volume: true,
            hide_render: false,
        },
    );
    let avatar = AvatarInstance {
        slot,
        name,
        skeleton: skeleton_id,
        mesh,
        clip: None,
    };
    scene.register_avatar(avatar.clone())?;
    tracing::info!(armature = %avatar.name, mesh = %mesh_name, "avatar loaded");
    Ok(avatar)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/avatar.rs"]
mod tests;
