//! Camera placement and pinhole projection.

/// Pinhole projection of scene points to pixels.
pub mod projection;
/// Overview and per-actor camera placement.
pub mod rig;

pub use projection::Projector;
pub use rig::{CameraPose, CameraRig, build_camera_rig, overview_pose};
