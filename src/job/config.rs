use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context as _;

use crate::foundation::core::Resolution;
use crate::foundation::error::{VizError, VizResult};
use crate::retarget::VisualizationMode;

/// Cosmetic yaw applied to both clips before retargeting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationHint {
    /// No rotation.
    #[default]
    Default,
    /// Quarter turn clockwise seen from above.
    Cw,
    /// Quarter turn counter-clockwise seen from above.
    Ccw,
    /// Half turn.
    Flip,
}

impl RotationHint {
    /// Yaw about the scene's up axis, in radians.
    pub fn yaw_radians(self) -> f32 {
        match self {
            Self::Default => 0.0,
            Self::Cw => -std::f32::consts::FRAC_PI_2,
            Self::Ccw => std::f32::consts::FRAC_PI_2,
            Self::Flip => std::f32::consts::PI,
        }
    }
}

impl FromStr for RotationHint {
    type Err = VizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(Self::Default),
            "cw" => Ok(Self::Cw),
            "ccw" => Ok(Self::Ccw),
            "flip" => Ok(Self::Flip),
            other => Err(VizError::configuration(format!(
                "unsupported rotation '{other}' (expected default, cw, ccw or flip)"
            ))),
        }
    }
}

/// Upper bound on the output resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ResolutionLimits {
    /// Largest accepted width.
    pub max_width: u32,
    /// Largest accepted height.
    pub max_height: u32,
}

impl ResolutionLimits {
    /// Bound enforced on queued (worker) jobs.
    pub const QUEUED: Self = Self {
        max_width: 480,
        max_height: 270,
    };

    /// Reject `res` when either dimension exceeds the bound.
    pub fn check(self, res: Resolution) -> VizResult<()> {
        if res.width > self.max_width || res.height > self.max_height {
            return Err(VizError::configuration(format!(
                "resolution {res} exceeds the maximum of {}x{}",
                self.max_width, self.max_height
            )));
        }
        Ok(())
    }
}

impl FromStr for ResolutionLimits {
    type Err = VizError;

    /// Parse `WxH`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || VizError::configuration(format!("malformed resolution bound '{s}' (expected WxH)"));
        let (w, h) = s.split_once(['x', 'X']).ok_or_else(bad)?;
        Ok(Self {
            max_width: w.trim().parse().map_err(|_| bad())?,
            max_height: h.trim().parse().map_err(|_| bad())?,
        })
    }
}

/// Where a job runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionContext {
    /// Invoked directly by a user.
    Standalone,
    /// Invoked by the queue worker; resolution is bounded and audio is muxed downstream.
    Worker,
}

impl ExecutionContext {
    /// Environment variable whose presence selects [`ExecutionContext::Worker`].
    pub const WORKER_ENV: &'static str = "DYADVIZ_WORKER";

    /// Context of the current process.
    pub fn detect() -> Self {
        if std::env::var_os(Self::WORKER_ENV).is_some() {
            Self::Worker
        } else {
            Self::Standalone
        }
    }

    /// Resolution bound in this context; `requested` applies only when standalone.
    pub fn limits(self, requested: Option<ResolutionLimits>) -> Option<ResolutionLimits> {
        match self {
            Self::Worker => Some(ResolutionLimits::QUEUED),
            Self::Standalone => requested,
        }
    }

    /// Return `true` when audio is muxed by the render passes.
    pub fn muxes_audio(self) -> bool {
        self == Self::Standalone
    }
}

fn default_duration() -> u64 {
    JobSpec::DEFAULT_DURATION
}

fn default_res_x() -> u32 {
    JobSpec::DEFAULT_RES.0
}

fn default_res_y() -> u32 {
    JobSpec::DEFAULT_RES.1
}

/// Every parameter of one visualization job.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobSpec {
    /// First motion clip (BVH).
    pub input1: PathBuf,
    /// Second motion clip (BVH).
    pub input2: PathBuf,
    /// Output directory; defaults to the first clip's directory.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    /// First rendered frame.
    #[serde(default)]
    pub start: u64,
    /// Requested number of frames; clamped to the reconciled total.
    #[serde(default = "default_duration")]
    pub duration: u64,
    /// Cosmetic pre-rotation of both clips.
    #[serde(default)]
    pub rotate: RotationHint,
    /// Audio muxed into videos (standalone only).
    #[serde(default)]
    pub audio: Option<PathBuf>,
    /// Render one still per camera.
    #[serde(default)]
    pub image: bool,
    /// Render one video per camera.
    #[serde(default)]
    pub video: bool,
    /// Which bones follow the clips.
    pub mode: VisualizationMode,
    /// Output width in pixels.
    #[serde(default = "default_res_x")]
    pub res_x: u32,
    /// Output height in pixels.
    #[serde(default = "default_res_y")]
    pub res_y: u32,
    /// Avatar rig JSON replacing the built-in reference rig.
    #[serde(default)]
    pub avatar: Option<PathBuf>,
    /// Image whose mean color becomes the avatar color.
    #[serde(default)]
    pub texture: Option<PathBuf>,
}

impl JobSpec {
    /// Default requested duration in frames.
    pub const DEFAULT_DURATION: u64 = 3600;

    /// Default output resolution.
    pub const DEFAULT_RES: (u32, u32) = (1024, 768);

    /// Job with default settings for two clips; no output is requested yet.
    pub fn new(input1: impl Into<PathBuf>, input2: impl Into<PathBuf>, mode: VisualizationMode) -> Self {
        Self {
            input1: input1.into(),
            input2: input2.into(),
            output_dir: None,
            start: 0,
            duration: Self::DEFAULT_DURATION,
            rotate: RotationHint::Default,
            audio: None,
            image: false,
            video: false,
            mode,
            res_x: Self::DEFAULT_RES.0,
            res_y: Self::DEFAULT_RES.1,
            avatar: None,
            texture: None,
        }
    }

    /// Read a job from JSON. Unknown keys and unsupported values are configuration errors.
    pub fn from_json_path(path: &Path) -> VizResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read job spec '{}'", path.display()))?;
        serde_json::from_str(&text).map_err(|e| {
            VizError::configuration(format!("invalid job spec '{}': {e}", path.display()))
        })
    }

    /// Directory receiving the outputs.
    pub fn resolved_output_dir(&self) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.clone(),
            None => match self.input1.parent() {
                Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
                _ => PathBuf::from("."),
            },
        }
    }

    /// Check the job before any scene work and return its output resolution.
    pub fn validate(&self, limits: Option<ResolutionLimits>) -> VizResult<Resolution> {
        if !self.image && !self.video {
            return Err(VizError::configuration(
                "nothing to render: request image and/or video output",
            ));
        }
        let res = Resolution::new(self.res_x, self.res_y)?;
        if let Some(limits) = limits {
            limits.check(res)?;
        }
        if self.video {
            if !res.is_even() {
                return Err(VizError::configuration(format!(
                    "video resolution must be even, {res} given"
                )));
            }
            if self.duration == 0 {
                return Err(VizError::configuration("video duration must be at least one frame"));
            }
        }
        for (name, path) in [("input1", &self.input1), ("input2", &self.input2)] {
            if path.as_os_str().is_empty() {
                return Err(VizError::configuration(format!("missing required parameter {name}")));
            }
            if !path.is_file() {
                return Err(VizError::configuration(format!(
                    "{name} clip '{}' does not exist",
                    path.display()
                )));
            }
        }
        Ok(res)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/job/config.rs"]
mod tests;
