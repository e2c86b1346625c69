//! dyadviz renders two motion-capture clips side by side on a shared reference avatar.
//!
//! A job loads two BVH clips, retargets each onto its own copy of the avatar, places an overview
//! camera and one camera per actor, then renders a still and/or a video per camera:
//!
//! - Describe the job with a [`JobSpec`]
//! - Run it with [`run_job`] (any [`SinkFactory`]) or [`run_job_with_ffmpeg`]
//! - Read the produced files from the returned [`OutputManifest`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Avatar rig and motion clip loading.
pub mod assets;
/// Camera placement and projection.
pub mod camera;
/// Video encoding sinks.
pub mod encode;
/// Job parameters and the end-to-end pipeline.
pub mod job;
pub mod manifest;
pub mod progress;
/// Frame rendering and camera passes.
pub mod render;
pub mod retarget;
pub mod scene;
pub mod timeline;

pub use crate::foundation::core::{FrameIndex, FrameRange, Fps, Resolution, Rgba8Premul};
pub use crate::foundation::error::{VizError, VizResult};

pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkFactory, FfmpegSinkOpts};
pub use crate::encode::sink::{AudioInput, FrameSink, InMemorySink, SinkConfig, SinkFactory};
pub use crate::job::{
    ExecutionContext, JobEnv, JobSpec, ResolutionLimits, RotationHint, run_job, run_job_with_ffmpeg,
};
pub use crate::manifest::{OutputFile, OutputKind, OutputManifest};
pub use crate::progress::{NullProgress, ProgressEvent, ProgressSink, StdoutProgress};
pub use crate::render::backend::{FrameRGBA, RenderSettings};
pub use crate::retarget::VisualizationMode;
pub use crate::scene::entities::ActorSlot;
pub use crate::scene::state::SceneState;

#[cfg(test)]
#[path = "../tests/unit/support.rs"]
pub(crate) mod test_support;
