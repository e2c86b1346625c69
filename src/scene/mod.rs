//! Per-job scene model: typed entity collections, armatures and the interaction mode.

pub(crate) mod collection;
/// Cameras, meshes, materials and avatar slots.
pub mod entities;
/// Typed entity handles.
pub mod ids;
/// Explicit pose-edit / render mode.
pub mod mode;
/// Bone hierarchies, keyframed motion and forward kinematics.
pub mod skeleton;
/// The scene container.
pub mod state;
