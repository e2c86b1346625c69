use glam::Vec3;

use super::*;
use crate::assets::avatar::RigAsset;
use crate::scene::skeleton::Bone;

fn avatar() -> Skeleton {
    let (mut s, _) = RigAsset::reference().build().unwrap();
    s.remove_bone("b_r_foot_End");
    s
}

fn chain(names: &[&str]) -> Skeleton {
    let bones = names
        .iter()
        .enumerate()
        .map(|(i, n)| Bone {
            name: (*n).to_owned(),
            parent: i.checked_sub(1),
            offset: Vec3::Z,
        })
        .collect();
    Skeleton::new(bones).unwrap()
}

const CLIP: SkeletonId = SkeletonId(7);

#[test]
fn full_body_binds_location_on_root_and_rotation_on_shared_bones() {
    let avatar = avatar();
    let clip = chain(&["body_world", "b_root", "b_spine0", "b_l_upleg", "b_l_leg", "b_r_upleg", "b_r_leg", "extra"]);
    let b = RetargetBinding::build(&avatar, &clip, "take", CLIP, VisualizationMode::FullBody).unwrap();

    assert_eq!(b.source, CLIP);
    let locations: Vec<_> = b
        .constraints
        .iter()
        .filter(|c| c.kind == ConstraintKind::Location)
        .collect();
    assert_eq!(locations.len(), 1);
    assert_eq!(locations[0].target_bone, ROOT_BONE);

    let rotations = b
        .constraints
        .iter()
        .filter(|c| c.kind == ConstraintKind::Rotation)
        .count();
    // Shared bones only: "extra" is clip-only, the arms are avatar-only.
    assert_eq!(rotations, 7);
    assert!(b.find("b_l_arm", ConstraintKind::Rotation).is_none());
    assert!(b.constraints.iter().all(|c| !c.muted));
    assert_eq!(b.active().count(), b.constraints.len());
}

#[test]
fn upper_body_mutes_exactly_the_lower_body_rotations() {
    let avatar = avatar();
    let clip = chain(&["body_world", "b_root", "b_spine0", "b_l_upleg", "b_l_leg", "b_r_upleg", "b_r_leg"]);
    let b = RetargetBinding::build(&avatar, &clip, "take", CLIP, VisualizationMode::UpperBody).unwrap();

    assert!(b.find(ROOT_BONE, ConstraintKind::Location).is_none());
    for bone in UPPER_BODY_MUTED {
        assert!(b.find(bone, ConstraintKind::Rotation).unwrap().muted, "{bone}");
    }
    assert!(!b.find("body_world", ConstraintKind::Rotation).unwrap().muted);
    assert!(!b.find("b_spine0", ConstraintKind::Rotation).unwrap().muted);
    assert_eq!(b.active().count(), 2);
}

#[test]
fn namespaced_clip_bones_match_plain_avatar_names() {
    let avatar = avatar();
    let clip = chain(&["BVH:body_world", "BVH:b_root"]);
    let b = RetargetBinding::build(&avatar, &clip, "take", CLIP, VisualizationMode::FullBody).unwrap();
    let loc = b.find("body_world", ConstraintKind::Location).unwrap();
    assert_eq!(loc.source_bone, "BVH:body_world");
    assert_eq!(
        b.find("b_root", ConstraintKind::Rotation).unwrap().source_bone,
        "BVH:b_root"
    );
}

#[test]
fn missing_bones_are_retarget_errors() {
    let avatar = avatar();
    let no_root = chain(&["hips", "b_root"]);
    let err = RetargetBinding::build(&avatar, &no_root, "take", CLIP, VisualizationMode::FullBody)
        .unwrap_err();
    assert!(matches!(err, VizError::Retarget(_)));
    assert!(err.to_string().contains("take"));

    let no_legs = chain(&["body_world", "b_root", "b_l_upleg", "b_l_leg", "b_r_upleg"]);
    let err = RetargetBinding::build(&avatar, &no_legs, "take", CLIP, VisualizationMode::UpperBody)
        .unwrap_err();
    assert!(err.to_string().contains("b_r_leg"));
}

#[test]
fn mode_parses_only_supported_names() {
    assert_eq!("full_body".parse::<VisualizationMode>().unwrap(), VisualizationMode::FullBody);
    assert_eq!("upper_body".parse::<VisualizationMode>().unwrap(), VisualizationMode::UpperBody);
    let err = "lower_body".parse::<VisualizationMode>().unwrap_err();
    assert!(matches!(err, VizError::Configuration(_)));

    assert_eq!(
        serde_json::to_string(&VisualizationMode::UpperBody).unwrap(),
        "\"upper_body\""
    );
    assert!(serde_json::from_str::<VisualizationMode>("\"FullBody\"").is_err());
    assert_eq!(VisualizationMode::FullBody.to_string(), "full_body");
}
