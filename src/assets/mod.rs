//! Asset loading: the reference avatar rig and BVH motion clips.

/// Avatar rig description, reference rig and per-slot avatar loading.
pub mod avatar;
/// BVH parsing and axis/unit conversion.
pub mod bvh;
/// Importing motion clips into a scene.
pub mod clip;
