//! Fixtures shared by the integration tests.
#![allow(dead_code, unused_imports)]

use std::path::PathBuf;

pub use dyadviz::assets::avatar::RigAsset;

mod clips;

pub use clips::{dyad_bvh, write_dyad_clips};

/// Fresh scratch directory under `target/`.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("it").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
