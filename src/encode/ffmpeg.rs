use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::encode::sink::{FrameSink, SinkConfig, SinkFactory};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{VizError, VizResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::backend::FrameRGBA;

/// H.264 encoder settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoCodec {
    /// x264 speed preset.
    pub preset: String,
    /// Constant rate factor.
    pub crf: u8,
    /// Keyframe interval in frames.
    pub gop: u32,
}

impl Default for VideoCodec {
    fn default() -> Self {
        Self {
            preset: "ultrafast".to_owned(),
            crf: 20,
            gop: 30,
        }
    }
}

/// Options for [`FfmpegSink`] MP4 output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output MP4 file path.
    pub out_path: PathBuf,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
    /// Background color used to flatten alpha (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
    /// Encoder settings.
    pub codec: VideoCodec,
}

impl FfmpegSinkOpts {
    /// Create options for outputting an MP4 to `out_path`.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            bg_rgba: [0, 0, 0, 255],
            codec: VideoCodec::default(),
        }
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw frames to stdin.
///
/// Audio is optional and provided through `SinkConfig.audio`; it is encoded as MP3 and the
/// output ends with the shorter stream.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    /// Create a new sink that streams into `ffmpeg`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
        }
    }
}

/// Opens an [`FfmpegSink`] per video pass.
#[derive(Clone, Debug)]
pub struct FfmpegSinkFactory {
    /// Background color used to flatten alpha.
    pub bg_rgba: [u8; 4],
    /// Encoder settings.
    pub codec: VideoCodec,
}

impl Default for FfmpegSinkFactory {
    fn default() -> Self {
        let bg = crate::render::backend::RenderSettings::BACKGROUND;
        Self {
            bg_rgba: [bg.r, bg.g, bg.b, bg.a],
            codec: VideoCodec::default(),
        }
    }
}

impl SinkFactory for FfmpegSinkFactory {
    fn open(&mut self, out_path: &Path) -> VizResult<Box<dyn FrameSink>> {
        let mut opts = FfmpegSinkOpts::new(out_path);
        opts.bg_rgba = self.bg_rgba;
        opts.codec = self.codec.clone();
        Ok(Box::new(FfmpegSink::new(opts)))
    }
}

/// Build the `ffmpeg` invocation for `opts` and `cfg`.
pub(crate) fn ffmpeg_command(opts: &FfmpegSinkOpts, cfg: &SinkConfig) -> Command {
    let mut cmd = Command::new("ffmpeg");
    cmd.arg(if opts.overwrite { "-y" } else { "-n" });

    // Raw RGBA frames on stdin, already flattened to opaque.
    cmd.args([
        "-loglevel",
        "error",
        "-f",
        "rawvideo",
        "-pix_fmt",
        "rgba",
        "-s",
        &format!("{}x{}", cfg.width, cfg.height),
        "-r",
        &format!("{}/{}", cfg.fps.num, cfg.fps.den),
        "-i",
        "pipe:0",
    ]);
    if let Some(audio) = cfg.audio.as_ref() {
        cmd.args(["-ss", &format!("{:.3}", audio.offset_secs.max(0.0)), "-i"])
            .arg(&audio.path)
            .args(["-map", "0:v:0", "-map", "1:a:0"]);
    } else {
        cmd.arg("-an");
    }
    cmd.args([
        "-c:v",
        "libx264",
        "-preset",
        &opts.codec.preset,
        "-crf",
        &opts.codec.crf.to_string(),
        "-g",
        &opts.codec.gop.to_string(),
        "-pix_fmt",
        "yuv420p",
    ]);
    if cfg.audio.is_some() {
        cmd.args(["-c:a", "libmp3lame", "-shortest"]);
    }
    cmd.args(["-movflags", "+faststart"]).arg(&opts.out_path);
    cmd
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> VizResult<()> {
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(VizError::configuration("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(VizError::configuration(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(VizError::configuration(
                "ffmpeg sink width/height must be even (required for yuv420p mp4 output)",
            ));
        }

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(VizError::render(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }
        if let Some(audio) = cfg.audio.as_ref()
            && !audio.path.is_file()
        {
            return Err(VizError::asset_load(format!(
                "audio file '{}' not found",
                audio.path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(VizError::render(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        let mut cmd = ffmpeg_command(&self.opts, &cfg);
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        tracing::debug!(out = %self.opts.out_path.display(), audio = cfg.audio.is_some(), "spawning ffmpeg");

        let mut child = cmd.spawn().map_err(|e| {
            VizError::render(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| VizError::render("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| VizError::render("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        self.scratch = vec![0u8; (cfg.width as usize) * (cfg.height as usize) * 4];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> VizResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| VizError::render("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(VizError::render(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(VizError::render(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if frame.data.len() != self.scratch.len() {
            return Err(VizError::render(
                "frame.data size mismatch with width*height*4",
            ));
        }

        flatten_premul_over_bg_to_opaque_rgba8(&mut self.scratch, &frame.data, self.opts.bg_rgba)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(VizError::render("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(&self.scratch).map_err(|e| {
            VizError::render(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn end(&mut self) -> VizResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| VizError::render("ffmpeg sink not started"))?;

        let status = child.wait().map_err(|e| {
            VizError::render(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| VizError::render("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| VizError::render(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(VizError::render(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        self.cfg = None;
        Ok(())
    }
}

impl Drop for FfmpegSink {
    // A sink abandoned mid-stream (error or panic upstream) still closes ffmpeg's input and
    // reaps the process.
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take()
            && let Err(e) = child.wait()
        {
            tracing::warn!(error = %e, "failed to reap abandoned ffmpeg process");
        }
        if let Some(handle) = self.stderr_drain.take() {
            let _ = handle.join();
        }
    }
}

fn flatten_premul_over_bg_to_opaque_rgba8(
    dst: &mut [u8],
    src_premul: &[u8],
    bg_rgba: [u8; 4],
) -> VizResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(VizError::render(
            "flatten_premul_over_bg_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let [bg_r, bg_g, bg_b, _] = bg_rgba.map(u16::from);
    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }

        let inv = 255u16 - a;
        d[0] = (u16::from(s[0]) + mul_div255_u16(bg_r, inv)).min(255) as u8;
        d[1] = (u16::from(s[1]) + mul_div255_u16(bg_g, inv)).min(255) as u8;
        d[2] = (u16::from(s[2]) + mul_div255_u16(bg_b, inv)).min(255) as u8;
        d[3] = 255;
    }
    Ok(())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> VizResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
