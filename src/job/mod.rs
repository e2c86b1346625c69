//! Job parameters, execution context and the end-to-end pipeline.

/// Job parameters and their validation.
pub mod config;
/// Scene construction and rendering of one job.
pub mod pipeline;

pub use config::{ExecutionContext, JobSpec, ResolutionLimits, RotationHint};
pub use pipeline::{JobEnv, run_job, run_job_with_ffmpeg};
