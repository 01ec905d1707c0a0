use crate::mesh::MeshVertex;
use glam::{Mat4, Vec4};
use std::collections::HashMap;

bitflags::bitflags! {
    /// Render-layer membership as assigned by the host. A camera only draws
    /// nodes whose layers intersect its cull mask.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct RenderLayers: u32 {
        const DEFAULT = 1 << 0;
        const UI = 1 << 1;
        const LOCAL = 1 << 2;
        const SCALED = 1 << 3;
    }
}

impl Default for RenderLayers {
    fn default() -> Self {
        RenderLayers::DEFAULT
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MaterialId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CameraId(pub u32);

/// Immediate-mode drawing surface supplied by the host renderer.
///
/// Pushed cameras mirror the primary view; only their cull mask differs.
pub trait DrawSurface {
    fn create_unlit_material(&mut self) -> MaterialId;
    fn set_material_color(&mut self, material: MaterialId, color: Vec4);
    fn destroy_material(&mut self, material: MaterialId);

    /// Global wireframe rasterization toggle.
    fn set_wireframe(&mut self, enabled: bool);

    fn draw_mesh(&mut self, vertices: &[MeshVertex], indices: &[u32], transform: Mat4, material: MaterialId);

    fn push_camera(&mut self, cull_mask: RenderLayers) -> CameraId;
    fn remove_camera(&mut self, camera: CameraId);
}

/// One draw call as observed by [`TraceSurface`].
#[derive(Clone, Debug)]
pub struct TracedDraw {
    pub positions: Vec<[f32; 3]>,
    pub index_count: usize,
    pub transform: Mat4,
    pub material: MaterialId,
    pub color: Vec4,
    pub wireframe: bool,
}

/// Headless [`DrawSurface`] that records every call instead of rasterizing.
/// Backs the integration tests and doubles as a capture tool for hosts
/// without a GPU surface.
#[derive(Default)]
pub struct TraceSurface {
    next_material: u32,
    next_camera: u32,
    wireframe: bool,
    materials: HashMap<MaterialId, Vec4>,
    cameras: HashMap<CameraId, RenderLayers>,
    pub draws: Vec<TracedDraw>,
    pub destroyed_materials: Vec<MaterialId>,
}

impl TraceSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wireframe_enabled(&self) -> bool {
        self.wireframe
    }

    pub fn live_material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn material_color(&self, material: MaterialId) -> Option<Vec4> {
        self.materials.get(&material).copied()
    }

    pub fn camera_count(&self) -> usize {
        self.cameras.len()
    }

    pub fn camera_mask(&self, camera: CameraId) -> Option<RenderLayers> {
        self.cameras.get(&camera).copied()
    }
}

impl DrawSurface for TraceSurface {
    fn create_unlit_material(&mut self) -> MaterialId {
        let id = MaterialId(self.next_material);
        self.next_material += 1;
        self.materials.insert(id, Vec4::ONE);
        id
    }

    fn set_material_color(&mut self, material: MaterialId, color: Vec4) {
        if let Some(slot) = self.materials.get_mut(&material) {
            *slot = color;
        }
    }

    fn destroy_material(&mut self, material: MaterialId) {
        if self.materials.remove(&material).is_some() {
            self.destroyed_materials.push(material);
        }
    }

    fn set_wireframe(&mut self, enabled: bool) {
        self.wireframe = enabled;
    }

    fn draw_mesh(&mut self, vertices: &[MeshVertex], indices: &[u32], transform: Mat4, material: MaterialId) {
        let color = self.materials.get(&material).copied().unwrap_or(Vec4::ONE);
        self.draws.push(TracedDraw {
            positions: vertices.iter().map(|v| v.position).collect(),
            index_count: indices.len(),
            transform,
            material,
            color,
            wireframe: self.wireframe,
        });
    }

    fn push_camera(&mut self, cull_mask: RenderLayers) -> CameraId {
        let id = CameraId(self.next_camera);
        self.next_camera += 1;
        self.cameras.insert(id, cull_mask);
        id
    }

    fn remove_camera(&mut self, camera: CameraId) {
        self.cameras.remove(&camera);
    }
}
