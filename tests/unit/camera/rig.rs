use super::*;
use crate::assets::avatar::{RigAsset, ensure_base_material, load_avatar};
use crate::foundation::error::VizError;
use crate::retarget::retarget;
use crate::scene::skeleton::{Armature, BonePose, Motion};

fn close(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < 1e-4
}

/// Two avatars, each retargeted to a static clip standing at `x`.
fn dyad(x1: f32, x2: f32) -> SceneState {
    let mut scene = SceneState::new();
    let material = ensure_base_material(&mut scene, None).unwrap();
    let rig = RigAsset::reference();
    for (slot, x) in [(ActorSlot::Actor1, x1), (ActorSlot::Actor2, x2)] {
        let avatar = load_avatar(&mut scene, &rig, slot, material).unwrap();
        let skeleton = scene.armature(avatar.skeleton).skeleton.clone();
        let mut frame = vec![BonePose::default(); skeleton.len()];
        frame[0].translation = Some(Vec3::new(x, 0.25, 0.0));
        let mut clip = Armature::new(skeleton);
        clip.motion = Some(Motion {
            frames: vec![frame],
            fps: SceneState::DEFAULT_FPS,
            frame_time: SceneState::DEFAULT_FPS.frame_duration_secs(),
        });
        let name = format!("take{}", slot.index() + 1);
        scene.add_armature(&name, clip);
        retarget(&mut scene, slot, &name, VisualizationMode::FullBody).unwrap();
    }
    scene
}

#[test]
fn overview_pose_depends_on_mode() {
    let full = overview_pose(VisualizationMode::FullBody);
    let upper = overview_pose(VisualizationMode::UpperBody);
    assert!(close(full.position, Vec3::new(0.0, -3.0, 1.1)));
    assert!(close(upper.position, Vec3::new(0.0, -2.45, 1.3)));
    assert!(close(full.rotation, Vec3::new(std::f32::consts::FRAC_PI_2, 0.0, 0.0)));
    assert_eq!(full.rotation, upper.rotation);
}

#[test]
fn actor_cameras_follow_retargeted_skeletons() {
    let scene = dyad(0.8, -0.8);
    let p1 = actor_camera_pose(&scene, ActorSlot::Actor1, FrameIndex(0)).unwrap();
    let p2 = actor_camera_pose(&scene, ActorSlot::Actor2, FrameIndex(0)).unwrap();

    assert!(close(p1.position, Vec3::new(0.8, 0.25, 1.5)));
    assert!(close(p2.position, Vec3::new(-0.8, 0.25, 1.5)));
    assert!((p1.rotation.x - 75f32.to_radians()).abs() < 1e-6);
    assert!((p1.rotation.z - 90f32.to_radians()).abs() < 1e-6);
    assert!((p2.rotation.z + 90f32.to_radians()).abs() < 1e-6);
}

#[test]
fn rig_adds_three_named_cameras() {
    let mut scene = dyad(0.8, -0.8);
    let rig = build_camera_rig(
        &mut scene,
        overview_pose(VisualizationMode::FullBody),
        FrameIndex(0),
    )
    .unwrap();

    assert_eq!(scene.camera_count(), 3);
    assert_eq!(scene.camera_name(rig.main), MAIN_CAMERA);
    assert_eq!(scene.camera_name(rig.actors[0]), "OBJ1_cam");
    assert_eq!(scene.camera_name(rig.actors[1]), "OBJ2_cam");
    assert_eq!(rig.camera_for(None), rig.main);
    assert_eq!(rig.camera_for(Some(ActorSlot::Actor2)), rig.actors[1]);

    let cam = scene.camera(rig.actors[0]);
    assert_eq!(cam.lens_mm, LENS_MM);
    assert_eq!(cam.scale, GIZMO_SCALE);
    // No camera is active after building.
    assert_eq!(scene.mode().active_camera(), None);
}

#[test]
fn actor1_camera_looks_toward_minus_x() {
    let scene = dyad(0.8, -0.8);
    let pose = actor_camera_pose(&scene, ActorSlot::Actor1, FrameIndex(0)).unwrap();
    let cam = Camera {
        position: pose.position,
        rotation: pose.rotation,
        lens_mm: LENS_MM,
        sensor_mm: Camera::SENSOR_MM,
        scale: GIZMO_SCALE,
    };
    let dir = cam.view_dir();
    assert!(dir.x < -0.9);
    assert!(dir.z < 0.0);
}

#[test]
fn rig_needs_both_avatars() {
    let mut scene = SceneState::new();
    let err = build_camera_rig(
        &mut scene,
        overview_pose(VisualizationMode::FullBody),
        FrameIndex(0),
    )
    .unwrap_err();
    assert!(matches!(err, VizError::Retarget(_)));
    assert_eq!(scene.camera_count(), 0);
}
