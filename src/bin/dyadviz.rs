use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use dyadviz::assets::bvh::MotionClip;
use dyadviz::{
    ExecutionContext, JobEnv, JobSpec, OutputManifest, ResolutionLimits, RotationHint,
    StdoutProgress, VisualizationMode, VizError,
};

#[derive(Parser, Debug)]
#[command(name = "dyadviz", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render stills and/or videos of two clips retargeted onto the avatar.
    Render(RenderArgs),
    /// Run a job described by a JSON file.
    Job(JobArgs),
    /// Print a clip's name, bone count and timing as JSON.
    Inspect(InspectArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// First motion clip (BVH).
    #[arg(short = '1', long)]
    input1: PathBuf,

    /// Second motion clip (BVH).
    #[arg(short = '2', long)]
    input2: PathBuf,

    /// Output directory (defaults to the first clip's directory).
    #[arg(short = 'o', long)]
    output_dir: Option<PathBuf>,

    /// First rendered frame.
    #[arg(short = 's', long, default_value_t = 0)]
    start: u64,

    /// Number of frames to render.
    #[arg(short = 'd', long, default_value_t = JobSpec::DEFAULT_DURATION)]
    duration: u64,

    /// Clip pre-rotation: default, cw, ccw or flip.
    #[arg(short = 'r', long, default_value = "default")]
    rotate: RotationHint,

    /// Audio muxed into the videos.
    #[arg(short = 'a', long)]
    audio: Option<PathBuf>,

    /// Render one PNG per camera.
    #[arg(short = 'p', long = "png")]
    image: bool,

    /// Render one MP4 per camera (requires `ffmpeg` on PATH).
    #[arg(short = 'v', long)]
    video: bool,

    /// Visualization mode: full_body or upper_body.
    #[arg(short = 'm', long)]
    mode: String,

    /// Output width.
    #[arg(long, default_value_t = JobSpec::DEFAULT_RES.0)]
    res_x: u32,

    /// Output height.
    #[arg(long, default_value_t = JobSpec::DEFAULT_RES.1)]
    res_y: u32,

    /// Avatar rig JSON replacing the built-in rig.
    #[arg(long)]
    avatar: Option<PathBuf>,

    /// Texture whose mean color tints the avatar.
    #[arg(long)]
    texture: Option<PathBuf>,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Parser, Debug)]
struct JobArgs {
    /// Job JSON.
    #[arg(long)]
    spec: PathBuf,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(clap::Args, Debug)]
struct CommonArgs {
    /// Largest accepted resolution, as WxH (always 480x270 in the worker context).
    #[arg(long)]
    max_res: Option<ResolutionLimits>,

    /// Also write the output manifest as JSON.
    #[arg(long)]
    manifest: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Motion clip (BVH).
    clip: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Job(args) => cmd_job(args),
        Command::Inspect(args) => cmd_inspect(&args.clip),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mode: VisualizationMode = args.mode.parse()?;
    let spec = JobSpec {
        input1: args.input1,
        input2: args.input2,
        output_dir: args.output_dir,
        start: args.start,
        duration: args.duration,
        rotate: args.rotate,
        audio: args.audio,
        image: args.image,
        video: args.video,
        mode,
        res_x: args.res_x,
        res_y: args.res_y,
        avatar: args.avatar,
        texture: args.texture,
    };
    run(&spec, &args.common)
}

fn cmd_job(args: JobArgs) -> anyhow::Result<()> {
    let spec = JobSpec::from_json_path(&args.spec)?;
    run(&spec, &args.common)
}

fn run(spec: &JobSpec, common: &CommonArgs) -> anyhow::Result<()> {
    let env = JobEnv {
        context: ExecutionContext::detect(),
        max_resolution: common.max_res,
    };
    let manifest = match dyadviz::run_job_with_ffmpeg(spec, &env, &mut StdoutProgress) {
        Ok(m) => m,
        Err(e) => {
            report_partial(&e);
            return Err(e.into());
        }
    };

    if let Some(path) = &common.manifest {
        manifest.write_json(path)?;
    }
    print_outputs(&manifest);
    Ok(())
}

fn print_outputs(manifest: &OutputManifest) {
    if let Some(first) = manifest.files.first() {
        println!("output_file {}", first.path.display());
    }
    eprintln!(
        "{} file(s) in {:.2}s",
        manifest.files.len(),
        manifest.elapsed_secs
    );
}

fn report_partial(e: &VizError) {
    for path in e.written_files() {
        eprintln!("kept {}", path.display());
    }
}

fn cmd_inspect(path: &Path) -> anyhow::Result<()> {
    let clip = MotionClip::from_path(path)?;
    let info = serde_json::json!({
        "name": clip.name,
        "bones": clip.skeleton.len(),
        "frames": clip.frame_count(),
        "frame_time": clip.motion.frame_time,
        "fps": clip.motion.fps.as_f64(),
    });
    let text = serde_json::to_string_pretty(&info).context("serialize clip info")?;
    println!("{text}");
    Ok(())
}
