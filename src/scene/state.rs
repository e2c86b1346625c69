use crate::foundation::core::Fps;
use crate::foundation::error::{VizError, VizResult};
use crate::scene::collection::Collection;
use crate::scene::entities::{
    ActorSlot, AudioStrip, AvatarInstance, Camera, Material, Plane, SkinnedMesh,
};
use crate::scene::ids::{CameraId, MaterialId, MeshId, PlaneId, SkeletonId};
use crate::scene::mode::SceneMode;
use crate::scene::skeleton::Armature;

/// Mutable 3D scene of one visualization job.
///
/// A scene is owned by exactly one job: it is built fresh when the job starts and dropped when it
/// ends. Entities are addressed by typed ids; name lookups go through typed accessors that fail
/// with a [`VizError`] naming what was missing.
#[derive(Debug)]
pub struct SceneState {
    pub(crate) skeletons: Collection<SkeletonId, Armature>,
    pub(crate) meshes: Collection<MeshId, SkinnedMesh>,
    pub(crate) cameras: Collection<CameraId, Camera>,
    pub(crate) materials: Collection<MaterialId, Material>,
    pub(crate) planes: Collection<PlaneId, Plane>,
    avatars: Vec<AvatarInstance>,
    mode: SceneMode,
    fps: Fps,
    frame_end: u64,
    audio: Option<AudioStrip>,
}

impl Default for SceneState {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneState {
    /// Scene frame rate before any clip registers its own.
    pub const DEFAULT_FPS: Fps = Fps { num: 30, den: 1 };

    /// Empty scene.
    pub fn new() -> Self {
        Self {
            skeletons: Collection::default(),
            meshes: Collection::default(),
            cameras: Collection::default(),
            materials: Collection::default(),
            planes: Collection::default(),
            avatars: Vec::new(),
            mode: SceneMode::Idle,
            fps: Self::DEFAULT_FPS,
            frame_end: 0,
            audio: None,
        }
    }

    /// Discard every entity and return to the initial state.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Return `true` when the scene holds no entities.
    pub fn is_empty(&self) -> bool {
        self.skeletons.len() == 0
            && self.meshes.len() == 0
            && self.cameras.len() == 0
            && self.materials.len() == 0
            && self.planes.len() == 0
            && self.avatars.is_empty()
            && self.audio.is_none()
    }

    // --- armatures ---

    /// Add an armature. Returns its id and the (possibly suffixed) unique name.
    pub fn add_armature(&mut self, name: &str, armature: Armature) -> (SkeletonId, String) {
        self.skeletons.insert(name, armature)
    }

    /// Look up an armature by name.
    pub fn skeleton_id(&self, name: &str) -> VizResult<SkeletonId> {
        self.skeletons
            .id(name)
            .ok_or_else(|| VizError::retarget(format!("skeleton '{name}' not found in scene")))
    }

    /// Borrow an armature.
    pub fn armature(&self, id: SkeletonId) -> &Armature {
        self.skeletons.get(id)
    }

    /// Mutably borrow an armature.
    pub fn armature_mut(&mut self, id: SkeletonId) -> &mut Armature {
        self.skeletons.get_mut(id)
    }

    /// Scene name of an armature.
    pub fn skeleton_name(&self, id: SkeletonId) -> &str {
        self.skeletons.name(id)
    }

    /// Number of armatures.
    pub fn skeleton_count(&self) -> usize {
        self.skeletons.len()
    }

    // --- meshes ---

    /// Add a skinned mesh.
    pub fn add_mesh(&mut self, name: &str, mesh: SkinnedMesh) -> (MeshId, String) {
        self.meshes.insert(name, mesh)
    }

    /// Borrow a mesh.
    pub fn mesh(&self, id: MeshId) -> &SkinnedMesh {
        self.meshes.get(id)
    }

    /// Scene name of a mesh.
    pub fn mesh_name(&self, id: MeshId) -> &str {
        self.meshes.name(id)
    }

    /// Include or exclude a mesh from rendering.
    pub fn set_hide_render(&mut self, id: MeshId, hidden: bool) {
        self.meshes.get_mut(id).hide_render = hidden;
    }

    /// Iterate meshes.
    pub fn meshes(&self) -> impl Iterator<Item = (MeshId, &SkinnedMesh)> {
        self.meshes.iter()
    }

    // --- materials ---

    /// Add a material.
    pub fn add_material(&mut self, name: &str, material: Material) -> (MaterialId, String) {
        self.materials.insert(name, material)
    }

    /// Borrow a material.
    pub fn material(&self, id: MaterialId) -> &Material {
        self.materials.get(id)
    }

    /// Look up a material by name.
    pub fn material_id(&self, name: &str) -> VizResult<MaterialId> {
        self.materials
            .id(name)
            .ok_or_else(|| VizError::asset_load(format!("material '{name}' not found in scene")))
    }

    // --- cameras ---

    /// Add a camera.
    pub fn add_camera(&mut self, name: &str, camera: Camera) -> (CameraId, String) {
        self.cameras.insert(name, camera)
    }

    /// Borrow a camera.
    pub fn camera(&self, id: CameraId) -> &Camera {
        self.cameras.get(id)
    }

    /// Scene name of a camera.
    pub fn camera_name(&self, id: CameraId) -> &str {
        self.cameras.name(id)
    }

    /// Number of cameras.
    pub fn camera_count(&self) -> usize {
        self.cameras.len()
    }

    // --- planes ---

    /// Add a static plane.
    pub fn add_plane(&mut self, name: &str, plane: Plane) -> (PlaneId, String) {
        self.planes.insert(name, plane)
    }

    /// Iterate planes.
    pub fn planes(&self) -> impl Iterator<Item = (PlaneId, &Plane)> {
        self.planes.iter()
    }

    // --- avatars ---

    /// Register the avatar occupying a slot. A slot holds at most one avatar.
    pub fn register_avatar(&mut self, avatar: AvatarInstance) -> VizResult<()> {
        if self.avatars.iter().any(|a| a.slot == avatar.slot) {
            return Err(VizError::asset_load(format!(
                "slot {} already holds an avatar",
                avatar.slot.label()
            )));
        }
        self.avatars.push(avatar);
        Ok(())
    }

    /// Avatar in `slot`.
    pub fn avatar(&self, slot: ActorSlot) -> VizResult<&AvatarInstance> {
        self.avatars
            .iter()
            .find(|a| a.slot == slot)
            .ok_or_else(|| VizError::retarget(format!("no avatar loaded for {}", slot.label())))
    }

    pub(crate) fn avatar_mut(&mut self, slot: ActorSlot) -> VizResult<&mut AvatarInstance> {
        self.avatars
            .iter_mut()
            .find(|a| a.slot == slot)
            .ok_or_else(|| VizError::retarget(format!("no avatar loaded for {}", slot.label())))
    }

    /// Registered avatars in load order.
    pub fn avatars(&self) -> &[AvatarInstance] {
        &self.avatars
    }

    // --- mode ---

    /// Current interaction mode.
    pub fn mode(&self) -> SceneMode {
        self.mode
    }

    pub(crate) fn set_mode(&mut self, mode: SceneMode) {
        self.mode = mode;
    }

    // --- timeline ---

    /// Scene frame rate.
    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Last frame covered by any imported clip.
    pub fn frame_end(&self) -> u64 {
        self.frame_end
    }

    /// Adopt an imported clip's rate and extend the scene duration to cover it.
    pub fn register_clip_timing(&mut self, fps: Fps, frame_count: u64) {
        self.fps = fps;
        self.frame_end = self.frame_end.max(frame_count);
    }

    /// Place an audio strip on the timeline.
    pub fn set_audio(&mut self, strip: AudioStrip) {
        self.audio = Some(strip);
    }

    /// Audio strip, if one was placed.
    pub fn audio(&self) -> Option<&AudioStrip> {
        self.audio.as_ref()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/state.rs"]
mod tests;
