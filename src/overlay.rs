use crate::mesh::MeshVertex;
use crate::scene::SceneWorld;
use crate::selection::SelectionChain;
use crate::surface::{CameraId, DrawSurface, MaterialId, RenderLayers};
use bevy_ecs::prelude::Entity;
use glam::{Mat4, Vec3, Vec4};
use std::collections::HashMap;

/// Per-node wireframe highlight state. The material is created lazily by
/// the first render pass that touches the marker; until then the marker
/// only carries its color.
pub struct OverlayMarker {
    color: Vec4,
    material: Option<MaterialId>,
}

impl OverlayMarker {
    fn new(color: Vec4) -> Self {
        Self { color, material: None }
    }

    pub fn color(&self) -> Vec4 {
        self.color
    }

    pub fn is_ready(&self) -> bool {
        self.material.is_some()
    }
}

/// Wireframe highlight pass over the selection chain. Markers live in an
/// explicit side-table keyed by node identity; nothing is attached to the
/// host's nodes themselves.
pub struct WireOverlay {
    markers: HashMap<Entity, OverlayMarker>,
    retired: Vec<MaterialId>,
    scratch: Vec<MeshVertex>,
    active_color: Vec4,
    dimmed_color: Vec4,
}

impl WireOverlay {
    pub fn new(active_color: Vec4, dimmed_color: Vec4) -> Self {
        Self {
            markers: HashMap::new(),
            retired: Vec::new(),
            scratch: Vec::new(),
            active_color,
            dimmed_color,
        }
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn has_marker(&self, node: Entity) -> bool {
        self.markers.contains_key(&node)
    }

    pub fn marker(&self, node: Entity) -> Option<&OverlayMarker> {
        self.markers.get(&node)
    }

    pub fn retired_count(&self) -> usize {
        self.retired.len()
    }

    /// Selection is about to change: remove the marker of every node in
    /// the chain. A missing marker or a dead node is skipped silently.
    pub fn detach_chain(&mut self, chain: &SelectionChain) {
        for &node in chain.nodes() {
            self.detach(node);
        }
    }

    /// Removes a single marker if present. Its material, if one was ever
    /// created, is destroyed on the next render pass.
    pub fn detach(&mut self, node: Entity) {
        if let Some(marker) = self.markers.remove(&node) {
            if let Some(material) = marker.material {
                self.retired.push(material);
            }
        }
    }

    /// Selection has changed: insert a marker for every chain node with a
    /// mesh payload. The deepest entry gets the active color, ancestors
    /// the dimmed one. Nodes without geometry get no marker at all.
    pub fn attach_chain(&mut self, chain: &SelectionChain, scene: &SceneWorld) {
        let last = chain.len().saturating_sub(1);
        for (depth, &node) in chain.nodes().iter().enumerate() {
            if !scene.has_mesh_payload(node) {
                continue;
            }
            let color = if depth == last { self.active_color } else { self.dimmed_color };
            self.markers.insert(node, OverlayMarker::new(color));
        }
    }

    /// Detaches everything, wherever it came from. Used at shutdown.
    pub fn detach_all(&mut self) {
        let nodes: Vec<Entity> = self.markers.keys().copied().collect();
        for node in nodes {
            self.detach(node);
        }
    }

    /// Per-frame draw pass. Destroys retired materials first, then draws
    /// each marked node that still exists and still has geometry; anything
    /// else is a silent skip.
    pub fn render(&mut self, scene: &SceneWorld, surface: &mut dyn DrawSurface) {
        for material in self.retired.drain(..) {
            surface.destroy_material(material);
        }
        for (&node, marker) in self.markers.iter_mut() {
            let Some(world) = scene.world_matrix(node) else { continue };
            let material = *marker.material.get_or_insert_with(|| surface.create_unlit_material());
            surface.set_material_color(material, marker.color);

            if let Some(mesh) = scene.static_mesh(node) {
                draw_wireframe(surface, &mesh.vertices, &mesh.indices, world, material);
            } else if let Some(mesh) = scene.skinned_mesh(node) {
                if !scene.bake_skinned_pose(node, &mut self.scratch) {
                    continue;
                }
                // The bake already applied the world scale; the transform
                // below applies it again, so divide it out of the baked
                // positions. Near-zero components skip the divide.
                let scale = scene.lossy_scale(node).unwrap_or(Vec3::ONE);
                for vertex in self.scratch.iter_mut() {
                    let mut position = Vec3::from_array(vertex.position);
                    if scale.x.abs() > f32::EPSILON {
                        position.x /= scale.x;
                    }
                    if scale.y.abs() > f32::EPSILON {
                        position.y /= scale.y;
                    }
                    if scale.z.abs() > f32::EPSILON {
                        position.z /= scale.z;
                    }
                    vertex.position = position.to_array();
                }
                draw_wireframe(surface, &self.scratch, &mesh.indices, world, material);
            }
        }
    }

    /// Flushes retired materials without drawing. Used at shutdown, where
    /// no further render pass will run.
    pub fn flush_retired(&mut self, surface: &mut dyn DrawSurface) {
        for material in self.retired.drain(..) {
            surface.destroy_material(material);
        }
    }
}

/// Global wireframe mode is enabled and disabled around every draw by
/// construction; no call path can leave it on.
fn draw_wireframe(
    surface: &mut dyn DrawSurface,
    vertices: &[MeshVertex],
    indices: &[u32],
    transform: Mat4,
    material: MaterialId,
) {
    surface.set_wireframe(true);
    surface.draw_mesh(vertices, indices, transform, material);
    surface.set_wireframe(false);
}

/// Secondary render pass whose cull mask covers every layer, so overlay
/// geometry draws no matter which layer the host assigned to a node. The
/// surface mirrors the primary view for pushed cameras.
pub struct OverlayCamera {
    id: CameraId,
}

impl OverlayCamera {
    pub fn create(surface: &mut dyn DrawSurface) -> Self {
        Self { id: surface.push_camera(RenderLayers::all()) }
    }

    pub fn id(&self) -> CameraId {
        self.id
    }

    pub fn teardown(self, surface: &mut dyn DrawSurface) {
        surface.remove_camera(self.id);
    }
}
