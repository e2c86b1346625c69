use crate::foundation::error::{VizError, VizResult};
use crate::scene::ids::{CameraId, SkeletonId};

/// Explicit interaction mode of a scene.
///
/// Pose editing and rendering are exclusive: a skeleton can only be edited while no camera is
/// rendering, and a render pass cannot start while a skeleton is being edited.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SceneMode {
    /// No edit or render in progress.
    #[default]
    Idle,
    /// Constraints of this skeleton are being edited.
    Editing(SkeletonId),
    /// A render pass is running through this camera.
    Rendering(CameraId),
}

impl SceneMode {
    /// Transition into pose editing of `skeleton`.
    pub fn enter_editing(self, skeleton: SkeletonId) -> VizResult<Self> {
        match self {
            Self::Idle => Ok(Self::Editing(skeleton)),
            other => Err(VizError::Other(anyhow::anyhow!(
                "cannot enter pose editing while scene is {other:?}"
            ))),
        }
    }

    /// Transition into rendering through `camera`. Switching cameras between passes is allowed.
    pub fn enter_rendering(self, camera: CameraId) -> VizResult<Self> {
        match self {
            Self::Idle | Self::Rendering(_) => Ok(Self::Rendering(camera)),
            other => Err(VizError::Other(anyhow::anyhow!(
                "cannot start rendering while scene is {other:?}"
            ))),
        }
    }

    /// Leave the current mode.
    pub fn exit(self) -> Self {
        Self::Idle
    }

    /// Camera selected for rendering, if a render pass is active.
    pub fn active_camera(self) -> Option<CameraId> {
        match self {
            Self::Rendering(c) => Some(c),
            _ => None,
        }
    }

    /// Skeleton under pose editing, if any.
    pub fn editing(self) -> Option<SkeletonId> {
        match self {
            Self::Editing(s) => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/mode.rs"]
mod tests;
