//! Synthetic BVH clips over the reference rig.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use super::RigAsset;

/// Scene position (Z-up, metres) to clip position (Y-up, centimetres).
fn to_clip(p: [f32; 3]) -> [f32; 3] {
    [p[0] * 100.0, p[2] * 100.0, -p[1] * 100.0]
}

fn write_joint(out: &mut String, rig: &RigAsset, i: usize, depth: usize, order: &mut Vec<usize>) {
    let bone = &rig.bones[i];
    let pad = "  ".repeat(depth);
    let keyword = if depth == 0 { "ROOT" } else { "JOINT" };
    let [x, y, z] = to_clip(bone.head);
    order.push(i);
    writeln!(out, "{pad}{keyword} {}", bone.name).unwrap();
    writeln!(out, "{pad}{{").unwrap();
    writeln!(out, "{pad}  OFFSET {x:.4} {y:.4} {z:.4}").unwrap();
    if depth == 0 {
        writeln!(out, "{pad}  CHANNELS 6 Xposition Yposition Zposition Zrotation Xrotation Yrotation").unwrap();
    } else {
        writeln!(out, "{pad}  CHANNELS 3 Zrotation Xrotation Yrotation").unwrap();
    }
    let children: Vec<usize> = rig
        .bones
        .iter()
        .enumerate()
        .filter(|(_, c)| c.parent.as_deref() == Some(bone.name.as_str()))
        .map(|(j, _)| j)
        .collect();
    if children.is_empty() {
        writeln!(out, "{pad}  End Site").unwrap();
        writeln!(out, "{pad}  {{").unwrap();
        writeln!(out, "{pad}    OFFSET 0.0 0.0 0.0").unwrap();
        writeln!(out, "{pad}  }}").unwrap();
    }
    for c in children {
        write_joint(out, rig, c, depth + 1, order);
    }
    writeln!(out, "{pad}}}").unwrap();
}

/// BVH text of the reference rig standing at scene `(x, y)` for `frames` frames at 30 fps.
///
/// The left arm rises one degree per frame.
pub fn dyad_bvh(x: f32, y: f32, frames: usize) -> String {
    let rig = RigAsset::reference();
    let mut out = String::from("HIERARCHY\n");
    let mut order = Vec::new();
    write_joint(&mut out, &rig, 0, 0, &mut order);
    writeln!(out, "MOTION\nFrames: {frames}\nFrame Time: 0.033333").unwrap();

    let [rx, ry, rz] = to_clip([x, y, 0.0]);
    for f in 0..frames {
        let mut values: Vec<String> = Vec::new();
        for &i in &order {
            if i == 0 {
                values.extend([rx, ry, rz].map(|v| format!("{v:.4}")));
            }
            let z_rot = if rig.bones[i].name == "b_l_arm" { f as f32 } else { 0.0 };
            values.extend([format!("{z_rot:.4}"), "0.0".to_owned(), "0.0".to_owned()]);
        }
        writeln!(out, "{}", values.join(" ")).unwrap();
    }
    out
}

/// Write two facing clips named `names` into `dir`; the first actor stands at x = +0.8.
pub fn write_dyad_clips(dir: &Path, names: [&str; 2], frames: [usize; 2]) -> [PathBuf; 2] {
    std::fs::create_dir_all(dir).unwrap();
    let xs = [0.8f32, -0.8f32];
    std::array::from_fn(|i| {
        let path = dir.join(format!("{}.bvh", names[i]));
        std::fs::write(&path, dyad_bvh(xs[i], 0.25, frames[i])).unwrap();
        path
    })
}
