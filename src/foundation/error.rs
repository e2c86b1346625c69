use std::path::PathBuf;

/// Convenience result type used across dyadviz.
pub type VizResult<T> = Result<T, VizError>;

/// Top-level error taxonomy for a visualization job.
///
/// Every variant is fatal for the job; nothing is retried at this layer.
#[derive(thiserror::Error, Debug)]
pub enum VizError {
    /// Unsupported mode, missing parameter or out-of-bounds value, detected before any scene work.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Missing or malformed avatar, clip or texture asset.
    #[error("asset load error: {0}")]
    AssetLoad(String),

    /// A bone or skeleton expected by retargeting or camera placement was not found.
    #[error("retarget error: {0}")]
    Retarget(String),

    /// Render or encode failure before any output was written.
    #[error("render error: {0}")]
    Render(String),

    /// Render or encode failure after earlier passes already wrote files.
    ///
    /// The written files stay on disk and are carried here so the caller can still report them.
    #[error("render error: {message} ({} file(s) already written)", .written.len())]
    PartialRender {
        /// Failure description.
        message: String,
        /// Files completed by prior passes, in production order.
        written: Vec<PathBuf>,
    },

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VizError {
    /// Build a [`VizError::Configuration`] value.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build a [`VizError::AssetLoad`] value.
    pub fn asset_load(msg: impl Into<String>) -> Self {
        Self::AssetLoad(msg.into())
    }

    /// Build a [`VizError::Retarget`] value.
    pub fn retarget(msg: impl Into<String>) -> Self {
        Self::Retarget(msg.into())
    }

    /// Build a [`VizError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Attach files already written by earlier passes to a render failure.
    ///
    /// Non-render errors and failures with nothing written are returned unchanged.
    pub fn with_written(self, written: Vec<PathBuf>) -> Self {
        if written.is_empty() {
            return self;
        }
        match self {
            Self::Render(message) => Self::PartialRender { message, written },
            Self::Other(e) => Self::PartialRender {
                message: format!("{e:#}"),
                written,
            },
            Self::PartialRender {
                message,
                written: mut prior,
            } => {
                let mut all = written;
                all.append(&mut prior);
                Self::PartialRender {
                    message,
                    written: all,
                }
            }
            other => other,
        }
    }

    /// Files written before the failure, if any.
    pub fn written_files(&self) -> &[PathBuf] {
        match self {
            Self::PartialRender { written, .. } => written,
            _ => &[],
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
