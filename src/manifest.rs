//! Files produced by a job and how long it took.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::VizResult;

/// Kind of an output file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// Still PNG.
    Image,
    /// Encoded MP4.
    Video,
}

/// One produced file.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OutputFile {
    /// File path.
    pub path: PathBuf,
    /// Label of the camera pass that produced it (`Main` or a clip name).
    pub camera_label: String,
    /// Image or video.
    pub kind: OutputKind,
}

/// Terminal success value of a job.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OutputManifest {
    /// Produced files in production order.
    pub files: Vec<OutputFile>,
    /// Wall-clock duration of the whole job, in seconds.
    pub elapsed_secs: f64,
}

impl OutputManifest {
    /// Paths of every produced file.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(|f| f.path.as_path())
    }

    /// Files of one kind.
    pub fn of_kind(&self, kind: OutputKind) -> impl Iterator<Item = &OutputFile> {
        self.files.iter().filter(move |f| f.kind == kind)
    }

    /// File names (without directories) in production order.
    pub fn file_names(&self) -> Vec<String> {
        self.files
            .iter()
            .filter_map(|f| f.path.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect()
    }

    /// Write the manifest as pretty JSON.
    pub fn write_json(&self, path: &Path) -> VizResult<()> {
        crate::encode::ffmpeg::ensure_parent_dir(path)?;
        let json = serde_json::to_vec_pretty(self).context("serialize output manifest")?;
        std::fs::write(path, json)
            .with_context(|| format!("write output manifest '{}'", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/manifest.rs"]
mod tests;
