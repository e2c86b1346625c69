/// Handle to an armature (avatar rig or imported clip) in a [`SceneState`](crate::SceneState).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SkeletonId(pub(crate) u32);

/// Handle to a skinned mesh in a [`SceneState`](crate::SceneState).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub(crate) u32);

/// Handle to a camera in a [`SceneState`](crate::SceneState).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CameraId(pub(crate) u32);

/// Handle to a material in a [`SceneState`](crate::SceneState).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub(crate) u32);

/// Handle to a static plane in a [`SceneState`](crate::SceneState).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaneId(pub(crate) u32);

pub(crate) trait EntityId: Copy {
    fn from_index(i: u32) -> Self;
    fn index(self) -> usize;
}

macro_rules! entity_id {
    ($($t:ty),*) => {$(
        impl EntityId for $t {
            fn from_index(i: u32) -> Self {
                Self(i)
            }
            fn index(self) -> usize {
                self.0 as usize
            }
        }
    )*};
}

entity_id!(SkeletonId, MeshId, CameraId, MaterialId, PlaneId);
