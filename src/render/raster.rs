use glam::{Vec2, Vec3};
use kurbo::Shape as _;

use crate::camera::projection::{NEAR_CLIP, Projector, clip_to_near};
use crate::foundation::core::{FrameIndex, Rgba8Premul};
use crate::foundation::error::{VizError, VizResult};
use crate::render::backend::{FrameRGBA, RenderSettings};
use crate::retarget::evaluate_pose;
use crate::scene::entities::{Plane, SkinnedMesh};
use crate::scene::state::SceneState;

const FLOOR_SHADE: f32 = 0.9;
const RIM_SHADE: f32 = 0.55;
const CORE_RADIUS: f32 = 0.7;
const PATH_TOLERANCE: f64 = 0.1;

/// One limb segment or joint ball of a posed mesh, in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Primitive {
    Capsule {
        a: Vec3,
        b: Vec3,
        radius: f32,
        round_ends: bool,
    },
    Ball {
        center: Vec3,
        radius: f32,
    },
}

/// Limb capsules and joint balls of `mesh` in the given bone heads.
///
/// Each bone with a parent yields a capsule from the parent head to its own head, sized by the
/// parent's radius. Leaf bones with a radius get a ball; volume-preserving meshes also get a ball
/// at every joint so bends stay round.
pub(crate) fn mesh_primitives(mesh: &SkinnedMesh, parents: &[Option<usize>], heads: &[Vec3]) -> Vec<Primitive> {
    let radius = |i: usize| mesh.radii.get(i).copied().unwrap_or(0.0);
    let mut has_child = vec![false; heads.len()];
    let mut out = Vec::new();
    for (i, parent) in parents.iter().enumerate() {
        let Some(p) = *parent else { continue };
        has_child[p] = true;
        let r = radius(p);
        if r > 0.0 {
            out.push(Primitive::Capsule {
                a: heads[p],
                b: heads[i],
                radius: r,
                round_ends: mesh.preserve_volume,
            });
        }
    }
    for (i, &center) in heads.iter().enumerate() {
        let r = radius(i);
        if r > 0.0 && (!has_child[i] || mesh.preserve_volume) {
            out.push(Primitive::Ball { center, radius: r });
        }
    }
    out
}

struct Draw {
    depth: f32,
    color: Rgba8Premul,
    prim: Primitive,
}

/// CPU rasterizer drawing a scene through its active camera.
///
/// Meshes are drawn as shaded limb capsules, sorted back to front over the floor planes.
pub struct SceneRasterizer {
    settings: RenderSettings,
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
}

impl SceneRasterizer {
    /// Rasterizer for `settings`.
    pub fn new(settings: RenderSettings) -> VizResult<Self> {
        let w: u16 = settings
            .resolution
            .width
            .try_into()
            .map_err(|_| VizError::render("render width exceeds u16"))?;
        let h: u16 = settings
            .resolution
            .height
            .try_into()
            .map_err(|_| VizError::render("render height exceeds u16"))?;
        Ok(Self {
            settings,
            ctx: vello_cpu::RenderContext::new(w, h),
            pixmap: vello_cpu::Pixmap::new(w, h),
        })
    }

    /// Settings this rasterizer renders with.
    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Render frame `f` through the scene's active camera.
    ///
    /// Meshes marked hidden from render are skipped.
    pub fn render(&mut self, scene: &SceneState, f: FrameIndex) -> VizResult<FrameRGBA> {
        let camera = scene
            .mode()
            .active_camera()
            .ok_or_else(|| VizError::render("no active camera; enter rendering first"))?;
        let proj = Projector::new(scene.camera(camera), self.settings.resolution);
        let (w, h) = (
            f64::from(self.settings.resolution.width),
            f64::from(self.settings.resolution.height),
        );

        self.ctx.reset();
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        set_color(&mut self.ctx, self.settings.background);
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));

        for (_, plane) in scene.planes() {
            let color = plane
                .material
                .map(|m| Rgba8Premul::from_unit_rgba(scene.material(m).base_color))
                .unwrap_or(self.settings.background);
            if let Some(path) = plane_path(&proj, plane) {
                set_color(&mut self.ctx, color.shade(FLOOR_SHADE));
                self.ctx.fill_path(&bezpath_to_cpu(&path));
            }
        }

        let mut draws = Vec::new();
        for (_, mesh) in scene.meshes().filter(|(_, m)| !m.hide_render) {
            let pose = evaluate_pose(scene, mesh.skeleton, f)?;
            let parents: Vec<Option<usize>> = scene
                .armature(mesh.skeleton)
                .skeleton
                .bones()
                .iter()
                .map(|b| b.parent)
                .collect();
            let color = Rgba8Premul::from_unit_rgba(scene.material(mesh.material).base_color);
            for prim in mesh_primitives(mesh, &parents, &pose.heads) {
                let depth = match prim {
                    Primitive::Capsule { a, b, .. } => 0.5 * (proj.depth(a) + proj.depth(b)),
                    Primitive::Ball { center, .. } => proj.depth(center),
                };
                draws.push(Draw { depth, color, prim });
            }
        }
        draws.sort_by(|a, b| b.depth.total_cmp(&a.depth));

        for d in &draws {
            match d.prim {
                Primitive::Capsule {
                    a,
                    b,
                    radius,
                    round_ends,
                } => self.draw_capsule(&proj, a, b, radius, round_ends, d.color),
                Primitive::Ball { center, radius } => self.draw_ball(&proj, center, radius, d.color),
            }
        }

        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut self.pixmap);
        Ok(FrameRGBA {
            width: self.settings.resolution.width,
            height: self.settings.resolution.height,
            data: self.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    fn draw_capsule(
        &mut self,
        proj: &Projector,
        a: Vec3,
        b: Vec3,
        radius: f32,
        round_ends: bool,
        color: Rgba8Premul,
    ) {
        let Some((va, vb)) = clip_segment(proj.to_view(a), proj.to_view(b)) else {
            return;
        };
        let (sa, sb) = (proj.view_to_screen(va), proj.view_to_screen(vb));
        let (ra, rb) = (proj.scale_at(radius, -va.z), proj.scale_at(radius, -vb.z));

        // Limbs pointing at the camera read darker at the core.
        let axis = (vb - va).normalize_or_zero();
        let core = 0.8 + 0.2 * (1.0 - axis.z.abs());

        set_color(&mut self.ctx, color.shade(RIM_SHADE));
        self.fill_capsule_2d(sa, sb, ra, rb, round_ends);
        let lift = Vec2::new(-0.12, -0.18);
        set_color(&mut self.ctx, color.shade(core));
        self.fill_capsule_2d(
            sa + lift * ra,
            sb + lift * rb,
            ra * CORE_RADIUS,
            rb * CORE_RADIUS,
            round_ends,
        );
    }

    fn draw_ball(&mut self, proj: &Projector, center: Vec3, radius: f32, color: Rgba8Premul) {
        let Some((s, depth)) = proj.project(center) else {
            return;
        };
        let r = proj.scale_at(radius, depth);
        set_color(&mut self.ctx, color.shade(RIM_SHADE));
        self.fill_circle(s, r);
        set_color(&mut self.ctx, color);
        self.fill_circle(s + Vec2::new(-0.12, -0.18) * r, r * CORE_RADIUS);
    }

    fn fill_circle(&mut self, c: Vec2, r: f32) {
        if r <= 0.0 {
            return;
        }
        let circle = kurbo::Circle::new((f64::from(c.x), f64::from(c.y)), f64::from(r));
        self.ctx
            .fill_path(&bezpath_to_cpu(&circle.to_path(PATH_TOLERANCE)));
    }

    fn fill_capsule_2d(&mut self, a: Vec2, b: Vec2, ra: f32, rb: f32, round_ends: bool) {
        let n = (b - a).perp().normalize_or_zero();
        if n != Vec2::ZERO {
            let pt = |v: Vec2| kurbo::Point::new(f64::from(v.x), f64::from(v.y));
            let mut quad = kurbo::BezPath::new();
            quad.move_to(pt(a + n * ra));
            quad.line_to(pt(b + n * rb));
            quad.line_to(pt(b - n * rb));
            quad.line_to(pt(a - n * ra));
            quad.close_path();
            self.ctx.fill_path(&bezpath_to_cpu(&quad));
        }
        if round_ends || n == Vec2::ZERO {
            self.fill_circle(a, ra);
            self.fill_circle(b, rb);
        }
    }
}

fn set_color(ctx: &mut vello_cpu::RenderContext, c: Rgba8Premul) {
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
}

/// Screen-space outline of the visible part of a plane.
fn plane_path(proj: &Projector, plane: &Plane) -> Option<kurbo::BezPath> {
    let view: Vec<Vec3> = plane.corners().iter().map(|&c| proj.to_view(c)).collect();
    let clipped = clip_to_near(&view);
    if clipped.len() < 3 {
        return None;
    }
    let mut path = kurbo::BezPath::new();
    for (i, v) in clipped.into_iter().enumerate() {
        let s = proj.view_to_screen(v);
        let p = kurbo::Point::new(f64::from(s.x), f64::from(s.y));
        if i == 0 {
            path.move_to(p);
        } else {
            path.line_to(p);
        }
    }
    path.close_path();
    Some(path)
}

/// Part of a camera-space segment in front of the near plane.
fn clip_segment(a: Vec3, b: Vec3) -> Option<(Vec3, Vec3)> {
    let front = |v: Vec3| -v.z >= NEAR_CLIP;
    match (front(a), front(b)) {
        (true, true) => Some((a, b)),
        (false, false) => None,
        (fa, _) => {
            let t = (-NEAR_CLIP - a.z) / (b.z - a.z);
            let cut = a.lerp(b, t);
            Some(if fa { (a, cut) } else { (cut, b) })
        }
    }
}

fn bezpath_to_cpu(path: &kurbo::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let p = |p: kurbo::Point| vello_cpu::kurbo::Point::new(p.x, p.y);
    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(a) => out.move_to(p(a)),
            PathEl::LineTo(a) => out.line_to(p(a)),
            PathEl::QuadTo(a, b) => out.quad_to(p(a), p(b)),
            PathEl::CurveTo(a, b, c) => out.curve_to(p(a), p(b), p(c)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
