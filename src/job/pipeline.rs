use std::time::Instant;

use crate::assets::avatar::{RigAsset, add_floor, ensure_base_material, load_avatar};
use crate::assets::clip::{LoadedClip, load_clip, set_clip_yaw};
use crate::camera::rig::{build_camera_rig, overview_pose};
use crate::encode::ffmpeg::FfmpegSinkFactory;
use crate::encode::sink::SinkFactory;
use crate::foundation::core::FrameIndex;
use crate::foundation::error::VizResult;
use crate::job::config::{ExecutionContext, JobSpec, ResolutionLimits};
use crate::manifest::OutputManifest;
use crate::progress::ProgressSink;
use crate::render::backend::RenderSettings;
use crate::render::passes::{PassOutputs, plan_passes, render_passes};
use crate::retarget::retarget;
use crate::scene::entities::{ActorSlot, AudioStrip};
use crate::scene::state::SceneState;
use crate::timeline::reconcile;

/// Where and under which bounds a job runs.
#[derive(Clone, Copy, Debug)]
pub struct JobEnv {
    /// Execution context.
    pub context: ExecutionContext,
    /// Resolution bound requested by the caller; the worker context always uses its own.
    pub max_resolution: Option<ResolutionLimits>,
}

impl JobEnv {
    /// Environment of the current process, without a caller bound.
    pub fn detect() -> Self {
        Self {
            context: ExecutionContext::detect(),
            max_resolution: None,
        }
    }

    /// Standalone environment without a resolution bound.
    pub fn standalone() -> Self {
        Self {
            context: ExecutionContext::Standalone,
            max_resolution: None,
        }
    }
}

/// Run one job end to end: build a fresh scene, retarget both clips, render every pass.
///
/// Configuration is checked before any scene work. Videos go through `sinks`; progress lines go
/// to `progress`.
#[tracing::instrument(skip_all, fields(mode = %spec.mode, context = ?env.context))]
pub fn run_job(
    spec: &JobSpec,
    env: &JobEnv,
    sinks: &mut dyn SinkFactory,
    progress: &mut dyn ProgressSink,
) -> VizResult<OutputManifest> {
    let started = Instant::now();
    let resolution = spec.validate(env.context.limits(env.max_resolution))?;
    let mux_audio = spec.audio.is_some() && env.context.muxes_audio();
    if spec.audio.is_some() && !mux_audio {
        tracing::info!("audio is muxed downstream in this context; ignoring it");
    }

    let mut scene = SceneState::new();
    let material = ensure_base_material(&mut scene, spec.texture.as_deref())?;
    add_floor(&mut scene);
    let rig = match &spec.avatar {
        Some(path) => RigAsset::from_path(path)?,
        None => RigAsset::reference(),
    };

    let inputs = [&spec.input1, &spec.input2];
    let mut clips: Vec<LoadedClip> = Vec::with_capacity(inputs.len());
    for (slot, input) in ActorSlot::ALL.into_iter().zip(inputs) {
        load_avatar(&mut scene, &rig, slot, material)?;
        let clip = load_clip(&mut scene, input)?;
        set_clip_yaw(&mut scene, &clip, spec.rotate.yaw_radians());
        clips.push(clip);
    }
    for (slot, clip) in ActorSlot::ALL.into_iter().zip(&clips) {
        retarget(&mut scene, slot, &clip.name, spec.mode)?;
    }

    let window = reconcile(clips[0].frame_count, clips[1].frame_count, spec.start, spec.duration);
    let cameras = build_camera_rig(&mut scene, overview_pose(spec.mode), window.start)?;
    if mux_audio && let Some(path) = &spec.audio {
        scene.set_audio(AudioStrip {
            path: path.clone(),
            frame_start: FrameIndex(0),
        });
    }

    let labels = [clips[0].name.clone(), clips[1].name.clone()];
    let passes = plan_passes(&cameras, &labels);
    let outputs = PassOutputs {
        output_dir: spec.resolved_output_dir(),
        image: spec.image,
        video: spec.video,
        mux_audio,
    };
    let files = render_passes(
        &mut scene,
        &passes,
        window,
        RenderSettings::new(resolution),
        &outputs,
        sinks,
        progress,
    )?;

    let manifest = OutputManifest {
        files,
        elapsed_secs: started.elapsed().as_secs_f64(),
    };
    tracing::info!(
        files = manifest.files.len(),
        elapsed_secs = manifest.elapsed_secs,
        "job finished"
    );
    Ok(manifest)
}

/// [`run_job`] with videos encoded by the system `ffmpeg`.
pub fn run_job_with_ffmpeg(
    spec: &JobSpec,
    env: &JobEnv,
    progress: &mut dyn ProgressSink,
) -> VizResult<OutputManifest> {
    let mut sinks = FfmpegSinkFactory::default();
    run_job(spec, env, &mut sinks, progress)
}

#[cfg(test)]
#[path = "../../tests/unit/job/pipeline.rs"]
mod tests;
