use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::camera::rig::{CameraRig, MAIN_CAMERA};
use crate::encode::ffmpeg::ensure_parent_dir;
use crate::encode::sink::{AudioInput, SinkConfig, SinkFactory};
use crate::foundation::error::{VizError, VizResult};
use crate::manifest::{OutputFile, OutputKind};
use crate::progress::{ProgressEvent, ProgressSink};
use crate::render::backend::{FrameRGBA, RenderSettings};
use crate::render::raster::SceneRasterizer;
use crate::scene::entities::ActorSlot;
use crate::scene::ids::CameraId;
use crate::scene::state::SceneState;
use crate::timeline::TimelineWindow;

/// One camera pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderPass {
    /// Output label: `Main` or the clip name of the actor.
    pub label: String,
    /// Camera rendered through.
    pub camera: CameraId,
    /// Actor whose mesh is hidden during the pass.
    pub hidden: Option<ActorSlot>,
}

/// The three passes in render order: overview, then each actor's camera.
///
/// An actor's camera hides that actor, so its own body does not block the view of the other.
pub fn plan_passes(rig: &CameraRig, labels: &[String; 2]) -> [RenderPass; 3] {
    let actor = |slot: ActorSlot| RenderPass {
        label: labels[slot.index()].clone(),
        camera: rig.camera_for(Some(slot)),
        hidden: Some(slot),
    };
    [
        RenderPass {
            label: MAIN_CAMERA.to_owned(),
            camera: rig.main,
            hidden: None,
        },
        actor(ActorSlot::Actor1),
        actor(ActorSlot::Actor2),
    ]
}

/// Hide the pass's actor from render and show every other actor.
pub fn apply_visibility(scene: &mut SceneState, pass: &RenderPass) {
    let meshes: Vec<_> = scene
        .avatars()
        .iter()
        .map(|a| (a.mesh, Some(a.slot) == pass.hidden))
        .collect();
    for (mesh, hidden) in meshes {
        scene.set_hide_render(mesh, hidden);
    }
}

/// What the passes produce.
#[derive(Clone, Debug)]
pub struct PassOutputs {
    /// Directory receiving every output file.
    pub output_dir: PathBuf,
    /// Render a still of the window's first frame per pass.
    pub image: bool,
    /// Encode the whole window per pass.
    pub video: bool,
    /// Mux the scene's audio strip into videos.
    pub mux_audio: bool,
}

/// Path of a pass's still image.
pub fn image_path(dir: &Path, label: &str) -> PathBuf {
    dir.join(format!("{label}.png"))
}

/// Path of a pass's video; `first` and `last` are the inclusive frame numbers.
pub fn video_path(dir: &Path, label: &str, first: u64, last: u64) -> PathBuf {
    dir.join(format!("{label}_{first:04}-{last:04}.mp4"))
}

/// Run the three passes and return the files produced, in order.
///
/// On failure the scene returns to idle and the error carries every file completed so far.
#[tracing::instrument(skip_all, fields(dir = %outputs.output_dir.display()))]
pub fn render_passes(
    scene: &mut SceneState,
    passes: &[RenderPass],
    window: TimelineWindow,
    settings: RenderSettings,
    outputs: &PassOutputs,
    sinks: &mut dyn SinkFactory,
    progress: &mut dyn ProgressSink,
) -> VizResult<Vec<OutputFile>> {
    if outputs.video && window.is_empty() {
        return Err(VizError::configuration("video requested but the frame window is empty"));
    }
    std::fs::create_dir_all(&outputs.output_dir).with_context(|| {
        format!(
            "failed to create output directory '{}'",
            outputs.output_dir.display()
        )
    })?;

    let mut raster = SceneRasterizer::new(settings)?;
    let audio = if outputs.mux_audio {
        audio_input(scene, window, settings)
    } else {
        None
    };
    if outputs.video {
        progress.report(ProgressEvent::TotalFrames(window.length));
    }

    let mut written: Vec<OutputFile> = Vec::new();
    for pass in passes {
        let result = run_pass(
            scene,
            pass,
            window,
            outputs,
            audio.as_ref(),
            &mut raster,
            sinks,
            progress,
            &mut written,
        );
        scene.set_mode(scene.mode().exit());
        if let Err(e) = result {
            tracing::error!(pass = %pass.label, error = %e, "render pass failed");
            return Err(e.with_written(written.into_iter().map(|f| f.path).collect()));
        }
    }
    Ok(written)
}

#[allow(clippy::too_many_arguments)]
fn run_pass(
    scene: &mut SceneState,
    pass: &RenderPass,
    window: TimelineWindow,
    outputs: &PassOutputs,
    audio: Option<&AudioInput>,
    raster: &mut SceneRasterizer,
    sinks: &mut dyn SinkFactory,
    progress: &mut dyn ProgressSink,
    written: &mut Vec<OutputFile>,
) -> VizResult<()> {
    scene.set_mode(scene.mode().enter_rendering(pass.camera)?);
    apply_visibility(scene, pass);
    tracing::info!(
        pass = %pass.label,
        camera = scene.camera_name(pass.camera),
        hidden = ?pass.hidden.map(ActorSlot::label),
        "render pass"
    );

    if outputs.image {
        let path = image_path(&outputs.output_dir, &pass.label);
        let frame = raster.render(scene, window.start)?;
        write_png(&path, &frame)?;
        progress.report(ProgressEvent::OutputWritten(&path));
        written.push(OutputFile {
            path,
            camera_label: pass.label.clone(),
            kind: OutputKind::Image,
        });
    }

    if outputs.video {
        let range = window.range();
        let last = range.last().map(|f| f.0).unwrap_or(window.start.0);
        let path = video_path(&outputs.output_dir, &pass.label, window.start.0, last);
        let settings = *raster.settings();
        let mut sink = sinks.open(&path)?;
        sink.begin(SinkConfig {
            width: settings.resolution.width,
            height: settings.resolution.height,
            fps: settings.fps,
            audio: audio.cloned(),
        })?;
        for f in range.frames() {
            let frame = raster.render(scene, f)?;
            sink.push_frame(f, &frame)?;
            progress.report(ProgressEvent::FrameRendered {
                camera: &pass.label,
                frame: f,
            });
        }
        sink.end()?;
        progress.report(ProgressEvent::OutputWritten(&path));
        written.push(OutputFile {
            path,
            camera_label: pass.label.clone(),
            kind: OutputKind::Video,
        });
    }
    Ok(())
}

/// Audio of the scene's strip, offset so that the strip's first frame plays with its scene frame.
fn audio_input(scene: &SceneState, window: TimelineWindow, settings: RenderSettings) -> Option<AudioInput> {
    let strip = scene.audio()?;
    let skipped = window.start.0.saturating_sub(strip.frame_start.0);
    Some(AudioInput {
        path: strip.path.clone(),
        offset_secs: settings.fps.frames_to_secs(skipped),
    })
}

/// Write a frame as PNG.
pub fn write_png(path: &Path, frame: &FrameRGBA) -> VizResult<()> {
    ensure_parent_dir(path)?;
    image::save_buffer_with_format(
        path,
        &frame.to_straight_rgba8(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .map_err(|e| VizError::render(format!("write png '{}': {e}", path.display())))
}

#[cfg(test)]
#[path = "../../tests/unit/render/passes.rs"]
mod tests;
