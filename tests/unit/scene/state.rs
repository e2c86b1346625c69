use glam::Vec3;

use super::*;
use crate::scene::skeleton::{Bone, Skeleton};

fn one_bone() -> Armature {
    Armature::new(
        Skeleton::new(vec![Bone {
            name: "root".into(),
            parent: None,
            offset: Vec3::ZERO,
        }])
        .unwrap(),
    )
}

#[test]
fn clear_discards_everything() {
    let mut scene = SceneState::new();
    let (id, _) = scene.add_armature("take", one_bone());
    scene.add_material(
        "gray",
        Material {
            base_color: [0.5, 0.5, 0.5, 1.0],
            texture: None,
        },
    );
    scene.register_clip_timing(Fps::new(60, 1).unwrap(), 120);
    assert!(!scene.is_empty());
    assert_eq!(scene.skeleton_id("take").unwrap(), id);

    scene.clear();
    assert!(scene.is_empty());
    assert_eq!(scene.fps(), SceneState::DEFAULT_FPS);
    assert_eq!(scene.frame_end(), 0);
    assert!(scene.skeleton_id("take").is_err());
}

#[test]
fn missing_skeleton_lookup_is_a_retarget_error() {
    let scene = SceneState::new();
    let err = scene.skeleton_id("clip_b").unwrap_err();
    assert!(matches!(err, VizError::Retarget(_)));
    assert!(err.to_string().contains("clip_b"));
}

#[test]
fn duration_bound_tracks_longest_clip() {
    let mut scene = SceneState::new();
    scene.register_clip_timing(Fps::new(30, 1).unwrap(), 300);
    scene.register_clip_timing(Fps::new(30, 1).unwrap(), 200);
    assert_eq!(scene.frame_end(), 300);
}

#[test]
fn slot_holds_one_avatar() {
    let mut scene = SceneState::new();
    let (sk, _) = scene.add_armature("OBJ1", one_bone());
    let (mat, _) = scene.add_material(
        "gray",
        Material {
            base_color: [1.0; 4],
            texture: None,
        },
    );
    let (mesh, _) = scene.add_mesh(
        "LowP_01",
        SkinnedMesh {
            skeleton: sk,
            material: mat,
            radii: vec![0.1],
            preserve_volume: true,
            hide_render: false,
        },
    );
    let avatar = AvatarInstance {
        slot: ActorSlot::Actor1,
        name: "OBJ1".into(),
        skeleton: sk,
        mesh,
        clip: None,
    };
    scene.register_avatar(avatar.clone()).unwrap();
    assert!(scene.register_avatar(avatar).is_err());
    assert!(scene.avatar(ActorSlot::Actor2).is_err());
    assert_eq!(scene.avatar(ActorSlot::Actor1).unwrap().mesh, mesh);
}
