use std::path::Path;

use anyhow::Context as _;
use glam::{Quat, Vec3};

use crate::foundation::core::Fps;
use crate::foundation::error::{VizError, VizResult};
use crate::foundation::math::{convert_position, convert_rotation};
use crate::scene::skeleton::{Bone, BonePose, Motion, Skeleton};

/// Scale applied to clip-space units on import (centimetres to metres).
pub const CLIP_GLOBAL_SCALE: f32 = 0.01;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Channel {
    Xpos,
    Ypos,
    Zpos,
    Xrot,
    Yrot,
    Zrot,
}

impl Channel {
    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "xposition" => Some(Self::Xpos),
            "yposition" => Some(Self::Ypos),
            "zposition" => Some(Self::Zpos),
            "xrotation" => Some(Self::Xrot),
            "yrotation" => Some(Self::Yrot),
            "zrotation" => Some(Self::Zrot),
            _ => None,
        }
    }

    fn is_position(self) -> bool {
        matches!(self, Self::Xpos | Self::Ypos | Self::Zpos)
    }
}

struct RawJoint {
    name: String,
    parent: Option<usize>,
    offset: Vec3,
    channels: Vec<Channel>,
}

struct Tokens<'a> {
    items: Vec<(&'a str, usize)>,
    pos: usize,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        let items = text
            .lines()
            .enumerate()
            .flat_map(|(i, line)| line.split_whitespace().map(move |t| (t, i + 1)))
            .collect();
        Self { items, pos: 0 }
    }

    fn line(&self) -> usize {
        self.items
            .get(self.pos)
            .or_else(|| self.items.last())
            .map(|&(_, l)| l)
            .unwrap_or(0)
    }

    fn remaining(&self) -> usize {
        self.items.len().saturating_sub(self.pos)
    }

    fn peek(&self) -> Option<&'a str> {
        self.items.get(self.pos).map(|&(t, _)| t)
    }

    fn next(&mut self) -> VizResult<&'a str> {
        let line = self.line();
        let t = self
            .items
            .get(self.pos)
            .map(|&(t, _)| t)
            .ok_or_else(|| VizError::asset_load(format!("unexpected end of file after line {line}")))?;
        self.pos += 1;
        Ok(t)
    }

    fn expect(&mut self, want: &str) -> VizResult<()> {
        let line = self.line();
        let got = self.next()?;
        if got.eq_ignore_ascii_case(want) {
            Ok(())
        } else {
            Err(VizError::asset_load(format!(
                "line {line}: expected '{want}', found '{got}'"
            )))
        }
    }

    fn number<T: std::str::FromStr>(&mut self) -> VizResult<T> {
        let line = self.line();
        let t = self.next()?;
        t.parse::<T>()
            .map_err(|_| VizError::asset_load(format!("line {line}: malformed number '{t}'")))
    }

    fn vec3(&mut self) -> VizResult<Vec3> {
        Ok(Vec3::new(self.number()?, self.number()?, self.number()?))
    }
}

/// Skeletal animation parsed from BVH text, converted to scene axes and units.
#[derive(Clone, Debug)]
pub struct MotionClip {
    /// Clip name (file stem).
    pub name: String,
    /// Joint hierarchy. End sites are not bones.
    pub skeleton: Skeleton,
    /// Per-frame local transforms.
    pub motion: Motion,
}

impl MotionClip {
    /// Parse a BVH file. The clip is named after the file stem.
    pub fn from_path(path: &Path) -> VizResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read motion clip '{}'", path.display()))
            .map_err(|e| VizError::asset_load(format!("{e:#}")))?;
        let name = clip_name(path);
        Self::parse(&name, &text)
            .map_err(|e| match e {
                VizError::AssetLoad(msg) => {
                    VizError::asset_load(format!("'{}': {msg}", path.display()))
                }
                other => other,
            })
    }

    /// Parse BVH text.
    ///
    /// Clip space is Y-up in centimetres; the result is Z-up in metres
    /// ([`CLIP_GLOBAL_SCALE`]). Frame timing is kept as authored.
    pub fn parse(name: &str, text: &str) -> VizResult<Self> {
        let mut tok = Tokens::new(text);
        tok.expect("HIERARCHY")?;

        let mut joints: Vec<RawJoint> = Vec::new();
        while let Some(t) = tok.peek() {
            if t.eq_ignore_ascii_case("MOTION") {
                break;
            }
            tok.expect("ROOT")?;
            parse_joint(&mut tok, None, &mut joints)?;
        }
        if joints.is_empty() {
            return Err(VizError::asset_load("clip hierarchy has no joints"));
        }

        tok.expect("MOTION")?;
        tok.expect("Frames:")?;
        let frame_count: usize = tok.number()?;
        tok.expect("Frame")?;
        tok.expect("Time:")?;
        let frame_time: f64 = tok.number()?;
        let fps = Fps::from_frame_time(frame_time)?;
        if frame_count == 0 {
            return Err(VizError::asset_load("clip has no frames"));
        }
        let per_frame: usize = joints.iter().map(|j| j.channels.len()).sum();
        if per_frame == 0 {
            return Err(VizError::asset_load("clip hierarchy declares no channels"));
        }
        let available = tok.remaining();
        if frame_count > available / per_frame {
            return Err(VizError::asset_load(format!(
                "header declares {frame_count} frames but only {available} channel values follow \
                 ({per_frame} per frame)"
            )));
        }

        let mut frames = Vec::with_capacity(frame_count);
        for f in 0..frame_count {
            let mut poses = Vec::with_capacity(joints.len());
            for j in &joints {
                poses.push(read_pose(&mut tok, j).map_err(|e| match e {
                    VizError::AssetLoad(msg) => {
                        VizError::asset_load(format!("frame {f}, joint '{}': {msg}", j.name))
                    }
                    other => other,
                })?);
            }
            frames.push(poses);
        }
        if tok.peek().is_some() {
            tracing::warn!(clip = name, line = tok.line(), "ignoring trailing data after last frame");
        }

        let bones = joints
            .into_iter()
            .map(|j| Bone {
                name: j.name,
                parent: j.parent,
                offset: convert_position(j.offset, CLIP_GLOBAL_SCALE),
            })
            .collect();

        Ok(Self {
            name: name.to_owned(),
            skeleton: Skeleton::new(bones)?,
            motion: Motion {
                frames,
                fps,
                frame_time,
            },
        })
    }

    /// Native number of frames.
    pub fn frame_count(&self) -> u64 {
        self.motion.frame_count()
    }
}

/// Clip name for a path: the file name with a trailing `.bvh` removed.
pub fn clip_name(path: &Path) -> String {
    let file = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let is_bvh = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("bvh"));
    match path.file_stem() {
        Some(stem) if is_bvh => stem.to_string_lossy().into_owned(),
        _ => file,
    }
}

/// Strip a clip namespace prefix (`BVH:hips` -> `hips`).
pub fn strip_clip_namespace(bone: &str) -> &str {
    bone.rsplit_once(':').map(|(_, b)| b).unwrap_or(bone)
}

fn parse_joint(tok: &mut Tokens<'_>, parent: Option<usize>, out: &mut Vec<RawJoint>) -> VizResult<()> {
    let name = tok.next()?.to_owned();
    tok.expect("{")?;
    tok.expect("OFFSET")?;
    let offset = tok.vec3()?;

    let mut channels = Vec::new();
    if tok.peek().is_some_and(|t| t.eq_ignore_ascii_case("CHANNELS")) {
        tok.next()?;
        let n: usize = tok.number()?;
        for _ in 0..n {
            let line = tok.line();
            let c = tok.next()?;
            channels.push(Channel::parse(c).ok_or_else(|| {
                VizError::asset_load(format!("line {line}: unknown channel '{c}'"))
            })?);
        }
    }

    let me = out.len();
    out.push(RawJoint {
        name,
        parent,
        offset,
        channels,
    });

    loop {
        let line = tok.line();
        let t = tok.next()?;
        if t == "}" {
            return Ok(());
        } else if t.eq_ignore_ascii_case("JOINT") {
            parse_joint(tok, Some(me), out)?;
        } else if t.eq_ignore_ascii_case("End") {
            tok.expect("Site")?;
            tok.expect("{")?;
            tok.expect("OFFSET")?;
            tok.vec3()?;
            tok.expect("}")?;
        } else {
            return Err(VizError::asset_load(format!(
                "line {line}: expected JOINT, End Site or '}}', found '{t}'"
            )));
        }
    }
}

fn read_pose(tok: &mut Tokens<'_>, joint: &RawJoint) -> VizResult<BonePose> {
    let mut translation = joint.offset;
    let mut has_translation = false;
    let mut rotation = Quat::IDENTITY;
    for &c in &joint.channels {
        let v: f32 = tok.number()?;
        if !v.is_finite() {
            return Err(VizError::asset_load(format!("non-finite channel value {v}")));
        }
        if c.is_position() {
            has_translation = true;
        }
        match c {
            Channel::Xpos => translation.x = v,
            Channel::Ypos => translation.y = v,
            Channel::Zpos => translation.z = v,
            Channel::Xrot => rotation *= Quat::from_rotation_x(v.to_radians()),
            Channel::Yrot => rotation *= Quat::from_rotation_y(v.to_radians()),
            Channel::Zrot => rotation *= Quat::from_rotation_z(v.to_radians()),
        }
    }
    Ok(BonePose {
        translation: has_translation.then(|| convert_position(translation, CLIP_GLOBAL_SCALE)),
        rotation: convert_rotation(rotation),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/bvh.rs"]
mod tests;
