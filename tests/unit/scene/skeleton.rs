use super::*;

fn chain() -> Skeleton {
    Skeleton::new(vec![
        Bone {
            name: "root".into(),
            parent: None,
            offset: Vec3::new(0.0, 0.0, 1.0),
        },
        Bone {
            name: "mid".into(),
            parent: Some(0),
            offset: Vec3::new(0.0, 0.0, 0.5),
        },
        Bone {
            name: "tip".into(),
            parent: Some(1),
            offset: Vec3::new(0.5, 0.0, 0.0),
        },
    ])
    .unwrap()
}

fn close(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < 1e-5
}

#[test]
fn rejects_child_before_parent_and_duplicates() {
    let bad_order = Skeleton::new(vec![Bone {
        name: "a".into(),
        parent: Some(0),
        offset: Vec3::ZERO,
    }]);
    assert!(bad_order.is_err());

    let dup = Skeleton::new(vec![
        Bone {
            name: "a".into(),
            parent: None,
            offset: Vec3::ZERO,
        },
        Bone {
            name: "a".into(),
            parent: Some(0),
            offset: Vec3::ZERO,
        },
    ]);
    assert!(dup.is_err());
}

#[test]
fn rest_heads_accumulate_offsets() {
    let s = chain();
    let heads = s.rest_heads();
    assert!(close(heads[2], Vec3::new(0.5, 0.0, 1.5)));
}

#[test]
fn removing_inner_bone_keeps_child_rest_position() {
    let mut s = chain();
    assert!(s.remove_bone("mid"));
    assert!(!s.remove_bone("mid"));
    assert_eq!(s.len(), 2);
    assert_eq!(s.bone_index("tip"), Some(1));
    assert_eq!(s.bones()[1].parent, Some(0));
    assert!(close(s.rest_heads()[1], Vec3::new(0.5, 0.0, 1.5)));
}

#[test]
fn animated_pose_applies_rotation_and_root_translation() {
    let mut arm = Armature::new(chain());
    let turn = Quat::from_rotation_z(std::f32::consts::FRAC_PI_2);
    arm.motion = Some(Motion {
        frames: vec![vec![
            BonePose {
                translation: Some(Vec3::new(2.0, 0.0, 1.0)),
                rotation: Quat::IDENTITY,
            },
            BonePose {
                translation: None,
                rotation: turn,
            },
            BonePose::default(),
        ]],
        fps: Fps::new(30, 1).unwrap(),
        frame_time: 1.0 / 30.0,
    });
    let pose = arm.animated_pose(FrameIndex(0));
    assert!(close(pose.heads[0], Vec3::new(2.0, 0.0, 1.0)));
    assert!(close(pose.heads[1], Vec3::new(2.0, 0.0, 1.5)));
    // tip offset (0.5, 0, 0) rotated 90 degrees about Z by its parent.
    assert!(close(pose.heads[2], Vec3::new(2.0, 0.5, 1.5)));

    // Past the end holds the last frame.
    assert_eq!(arm.animated_pose(FrameIndex(99)), pose);
}

#[test]
fn head_of_unknown_bone_names_skeleton() {
    let arm = Armature::new(chain());
    let pose = arm.rest_pose();
    let err = pose.head_of(&arm.skeleton, "clipA", "b_root").unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("b_root") && msg.contains("clipA"));
}
