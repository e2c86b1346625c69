use super::*;
use crate::foundation::core::FrameIndex;

const SMALL: &str = "HIERARCHY
ROOT body_world
{
  OFFSET 0.0 0.0 0.0
  CHANNELS 6 Xposition Yposition Zposition Zrotation Xrotation Yrotation
  JOINT b_root
  {
    OFFSET 0.0 100.0 0.0
    CHANNELS 3 Zrotation Xrotation Yrotation
    End Site
    {
      OFFSET 0.0 10.0 0.0
    }
  }
}
MOTION
Frames: 2
Frame Time: 0.033333
100.0 90.0 -50.0 0.0 0.0 0.0 0.0 0.0 0.0
100.0 90.0 -50.0 0.0 0.0 90.0
  0.0 0.0 0.0
";

fn close(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < 1e-4
}

#[test]
fn parses_hierarchy_without_end_sites() {
    let clip = MotionClip::parse("take", SMALL).unwrap();
    assert_eq!(clip.name, "take");
    assert_eq!(clip.skeleton.len(), 2);
    assert_eq!(clip.skeleton.bones()[1].parent, Some(0));
    assert_eq!(clip.frame_count(), 2);
    assert_eq!(clip.motion.fps, Fps { num: 30, den: 1 });
    assert_eq!(clip.motion.frame_time, 0.033333);
}

#[test]
fn keeps_authored_frame_time_next_to_rounded_rate() {
    let film = SMALL.replace("Frame Time: 0.033333", "Frame Time: 0.0416667");
    let clip = MotionClip::parse("take", &film).unwrap();
    assert_eq!(clip.motion.fps, Fps { num: 24, den: 1 });
    assert_eq!(clip.motion.frame_time, 0.0416667);
}

#[test]
fn rejects_frame_count_beyond_data() {
    for declared in ["Frames: 3", "Frames: 1000000000000000000", "Frames: 18446744073709551615"] {
        let text = SMALL.replace("Frames: 2", declared);
        let err = MotionClip::parse("x", &text).unwrap_err();
        assert!(matches!(err, VizError::AssetLoad(_)), "{declared}: {err}");
        assert!(err.to_string().contains("only 18 channel values follow"), "{declared}: {err}");
    }

    let no_channels = "HIERARCHY
ROOT body_world
{
  OFFSET 0.0 0.0 0.0
}
MOTION
Frames: 1000000000000000000
Frame Time: 0.033333
";
    let err = MotionClip::parse("x", no_channels).unwrap_err();
    assert!(err.to_string().contains("no channels"));
}

#[test]
fn converts_units_and_axes() {
    let clip = MotionClip::parse("take", SMALL).unwrap();
    // OFFSET (0, 100, 0) cm, Y-up -> (0, 0, 1) m, Z-up.
    assert!(close(clip.skeleton.bones()[1].offset, Vec3::new(0.0, 0.0, 1.0)));
    // Root position (100, 90, -50) -> (1.0, 0.5, 0.9).
    let root = clip.motion.frames[0][0].translation.unwrap();
    assert!(close(root, Vec3::new(1.0, 0.5, 0.9)));
    assert_eq!(clip.motion.frames[0][1].translation, None);
}

#[test]
fn rotation_channels_drive_forward_kinematics() {
    let clip = MotionClip::parse("take", SMALL).unwrap();
    let mut arm = crate::scene::skeleton::Armature::new(clip.skeleton.clone());
    arm.motion = Some(clip.motion.clone());
    let pose = arm.animated_pose(FrameIndex(1));
    // Yaw of 90 degrees about clip Y is yaw about scene Z; the child sits straight above, so its
    // head does not move, but its rotation carries the yaw.
    assert!(close(pose.heads[1], Vec3::new(1.0, 0.5, 1.9)));
    let forward = pose.rotations[0] * Vec3::X;
    assert!(close(forward, Vec3::Y));
}

#[test]
fn rejects_empty_and_malformed_clips() {
    let no_frames = SMALL.replace("Frames: 2", "Frames: 0");
    assert!(matches!(
        MotionClip::parse("x", &no_frames),
        Err(VizError::AssetLoad(_))
    ));

    let bad_number = SMALL.replace("90.0 -50.0", "ninety -50.0");
    let err = MotionClip::parse("x", &bad_number).unwrap_err();
    assert!(err.to_string().contains("malformed number"));

    let truncated = SMALL.replace("  0.0 0.0 0.0\n", "");
    assert!(MotionClip::parse("x", &truncated).is_err());

    assert!(MotionClip::parse("x", "").is_err());
    assert!(MotionClip::parse("x", "HIERARCHY\nMOTION\nFrames: 1\nFrame Time: 0.1\n").is_err());
}

#[test]
fn unknown_channel_is_reported_with_line() {
    let bad = SMALL.replace("Zrotation Xrotation Yrotation\n    End", "Wrotation Xrotation Yrotation\n    End");
    let err = MotionClip::parse("x", &bad).unwrap_err();
    assert!(err.to_string().contains("unknown channel 'Wrotation'"));
}

#[test]
fn clip_names_and_namespaces() {
    assert_eq!(clip_name(Path::new("/data/session15_take17.bvh")), "session15_take17");
    assert_eq!(clip_name(Path::new("take.BVH")), "take");
    assert_eq!(clip_name(Path::new("take.txt")), "take.txt");
    assert_eq!(clip_name(Path::new("/data/clip日本")), "clip日本");
    assert_eq!(clip_name(Path::new("/data/日本")), "日本");
    assert_eq!(clip_name(Path::new("モーション.bvh")), "モーション");
    assert_eq!(clip_name(Path::new("舞.BvH")), "舞");
    assert_eq!(strip_clip_namespace("BVH:b_root"), "b_root");
    assert_eq!(strip_clip_namespace("b_root"), "b_root");
}

#[test]
fn missing_file_is_asset_load_error() {
    let err = MotionClip::from_path(Path::new("target/definitely/missing.bvh")).unwrap_err();
    assert!(matches!(err, VizError::AssetLoad(_)));
}
