//! Rendering: frame buffers, the CPU rasterizer and the camera pass orchestrator.

/// Frame buffer and global render settings.
pub mod backend;
/// Per-camera passes with actor visibility, stills and videos.
pub mod passes;
pub(crate) mod raster;

pub use backend::{FrameRGBA, RenderSettings};
pub use passes::{PassOutputs, RenderPass, apply_visibility, plan_passes, render_passes};
pub use raster::SceneRasterizer;
