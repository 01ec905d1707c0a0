use crate::inspect::Inspectable;
use crate::mesh::{MeshData, MeshVertex};
use crate::surface::RenderLayers;
use anyhow::{anyhow, Result};
use bevy_ecs::prelude::*;
use glam::{Mat4, Quat, Vec3};
use std::sync::Arc;

// Walking the parent chain is capped so a cycle introduced by host
// mutation between scans cannot hang the frame.
const MAX_PARENT_HOPS: usize = 1024;

// ---------- Components ----------
#[derive(Component, Clone)]
pub struct NodeName(pub String);

#[derive(Component, Clone, Copy)]
pub struct Parent(pub Entity);

#[derive(Component, Clone, Copy)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self { translation: Vec3::ZERO, rotation: Quat::IDENTITY, scale: Vec3::ONE }
    }
}

impl Transform {
    pub fn from_translation(translation: Vec3) -> Self {
        Self { translation, ..Self::default() }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

#[derive(Component, Clone)]
pub struct StaticMeshNode(pub Arc<MeshData>);

#[derive(Component, Clone)]
pub struct SkinnedMeshNode {
    pub mesh: Arc<MeshData>,
    pub pose: Vec<Mat4>,
}

#[derive(Component, Clone, Copy)]
pub struct NodeLayers(pub RenderLayers);

/// Opaque host attachments, each introspectable through the
/// [`Inspectable`] capability trait.
#[derive(Component, Default)]
pub struct Attachments(pub Vec<Box<dyn Inspectable>>);

// ---------- World container ----------

/// Facade over the host scene graph. The inspector observes nodes through
/// this type; it never owns them.
pub struct SceneWorld {
    pub world: World,
}

impl Default for SceneWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneWorld {
    pub fn new() -> Self {
        Self { world: World::new() }
    }

    pub fn spawn_node(&mut self, name: &str, parent: Option<Entity>, transform: Transform) -> Entity {
        let entity = self.world.spawn((NodeName(name.to_string()), transform)).id();
        if let Some(parent) = parent {
            self.world.entity_mut(entity).insert(Parent(parent));
        }
        entity
    }

    pub fn add_static_mesh(&mut self, entity: Entity, mesh: Arc<MeshData>) -> bool {
        match self.world.get_entity_mut(entity) {
            Ok(mut node) => {
                node.insert(StaticMeshNode(mesh));
                true
            }
            Err(_) => false,
        }
    }

    pub fn add_skinned_mesh(&mut self, entity: Entity, mesh: Arc<MeshData>, pose: Vec<Mat4>) -> bool {
        match self.world.get_entity_mut(entity) {
            Ok(mut node) => {
                node.insert(SkinnedMeshNode { mesh, pose });
                true
            }
            Err(_) => false,
        }
    }

    pub fn add_attachment(&mut self, entity: Entity, attachment: Box<dyn Inspectable>) -> bool {
        match self.world.get_entity_mut(entity) {
            Ok(mut node) => {
                if let Some(mut attachments) = node.get_mut::<Attachments>() {
                    attachments.0.push(attachment);
                } else {
                    node.insert(Attachments(vec![attachment]));
                }
                true
            }
            Err(_) => false,
        }
    }

    pub fn set_layers(&mut self, entity: Entity, layers: RenderLayers) -> bool {
        match self.world.get_entity_mut(entity) {
            Ok(mut node) => {
                node.insert(NodeLayers(layers));
                true
            }
            Err(_) => false,
        }
    }

    pub fn reparent(&mut self, entity: Entity, parent: Option<Entity>) -> Result<()> {
        if self.world.get_entity(entity).is_err() {
            return Err(anyhow!("Node {entity:?} does not exist"));
        }
        match parent {
            Some(parent) => {
                if parent == entity {
                    return Err(anyhow!("Node {entity:?} cannot be its own parent"));
                }
                if self.world.get_entity(parent).is_err() {
                    return Err(anyhow!("Parent {parent:?} does not exist"));
                }
                self.world.entity_mut(entity).insert(Parent(parent));
            }
            None => {
                self.world.entity_mut(entity).remove::<Parent>();
            }
        }
        Ok(())
    }

    /// Despawns a node and every descendant reachable through live `Parent`
    /// links. Children are derived by scanning, matching the no-child-list
    /// bookkeeping of the snapshot model.
    pub fn despawn_node(&mut self, entity: Entity) -> bool {
        let children: Vec<Entity> = self
            .world
            .iter_entities()
            .filter(|node| node.get::<Parent>().map(|p| p.0) == Some(entity))
            .map(|node| node.id())
            .collect();
        let mut removed = false;
        for child in children {
            removed |= self.despawn_node(child);
        }
        removed |= self.world.despawn(entity);
        removed
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.world.get_entity(entity).is_ok()
    }

    pub fn node_name(&self, entity: Entity) -> Option<&str> {
        self.world.get::<NodeName>(entity).map(|name| name.0.as_str())
    }

    pub fn node_parent(&self, entity: Entity) -> Option<Entity> {
        self.world.get::<Parent>(entity).map(|parent| parent.0)
    }

    pub fn node_transform(&self, entity: Entity) -> Option<Transform> {
        self.world.get::<Transform>(entity).copied()
    }

    pub fn set_transform(&mut self, entity: Entity, transform: Transform) -> bool {
        if let Some(mut slot) = self.world.get_mut::<Transform>(entity) {
            *slot = transform;
            true
        } else {
            false
        }
    }

    pub fn set_joint_pose(&mut self, entity: Entity, pose: Vec<Mat4>) -> bool {
        if let Some(mut skinned) = self.world.get_mut::<SkinnedMeshNode>(entity) {
            skinned.pose = pose;
            true
        } else {
            false
        }
    }

    pub fn node_layers(&self, entity: Entity) -> Option<RenderLayers> {
        self.world.get::<NodeLayers>(entity).map(|layers| layers.0)
    }

    pub fn attachments(&self, entity: Entity) -> Option<&Attachments> {
        self.world.get::<Attachments>(entity)
    }

    pub fn static_mesh(&self, entity: Entity) -> Option<Arc<MeshData>> {
        self.world.get::<StaticMeshNode>(entity).map(|mesh| mesh.0.clone())
    }

    pub fn skinned_mesh(&self, entity: Entity) -> Option<Arc<MeshData>> {
        self.world.get::<SkinnedMeshNode>(entity).map(|skinned| skinned.mesh.clone())
    }

    pub fn has_mesh_payload(&self, entity: Entity) -> bool {
        self.world.get::<StaticMeshNode>(entity).is_some()
            || self.world.get::<SkinnedMeshNode>(entity).is_some()
    }

    /// Bakes the node's current skinned pose into `out`. The bake applies
    /// the node's world-space scale, matching host bake semantics; the
    /// overlay divides it back out before drawing.
    pub fn bake_skinned_pose(&self, entity: Entity, out: &mut Vec<MeshVertex>) -> bool {
        let Some(skinned) = self.world.get::<SkinnedMeshNode>(entity) else {
            return false;
        };
        let scale = self.lossy_scale(entity).unwrap_or(Vec3::ONE);
        skinned.mesh.bake_pose(&skinned.pose, scale, out);
        true
    }

    pub fn world_matrix(&self, entity: Entity) -> Option<Mat4> {
        let mut matrix = self.node_transform(entity)?.matrix();
        let mut cursor = self.node_parent(entity);
        let mut hops = 0;
        while let Some(parent) = cursor {
            if hops >= MAX_PARENT_HOPS {
                break;
            }
            // A parent despawned between scans contributes nothing.
            if let Some(transform) = self.node_transform(parent) {
                matrix = transform.matrix() * matrix;
            }
            cursor = self.node_parent(parent);
            hops += 1;
        }
        Some(matrix)
    }

    pub fn lossy_scale(&self, entity: Entity) -> Option<Vec3> {
        let (scale, _, _) = self.world_matrix(entity)?.to_scale_rotation_translation();
        Some(scale)
    }

    pub fn collect_nodes(&self) -> Vec<Entity> {
        self.world
            .iter_entities()
            .filter(|node| node.contains::<NodeName>())
            .map(|node| node.id())
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.world.iter_entities().filter(|node| node.contains::<NodeName>()).count()
    }

    pub fn find_named(&self, name: &str) -> Option<Entity> {
        self.world
            .iter_entities()
            .find(|node| node.get::<NodeName>().map(|n| n.0.as_str()) == Some(name))
            .map(|node| node.id())
    }

    /// Small hierarchy with one static and one skinned mesh, used by tests
    /// and headless hosts. Returns the root.
    pub fn spawn_demo_scene(&mut self) -> Entity {
        let root = self.spawn_node("root", None, Transform::default());
        let chassis =
            self.spawn_node("chassis", Some(root), Transform::from_translation(Vec3::new(0.0, 1.0, 0.0)));
        let hull = self.spawn_node(
            "hull",
            Some(chassis),
            Transform { scale: Vec3::new(2.0, 1.0, 1.0), ..Transform::default() },
        );
        self.add_static_mesh(hull, Arc::new(MeshData::cube(1.0)));
        self.set_layers(hull, RenderLayers::DEFAULT);
        self.add_attachment(hull, Box::new(SpinDrive { rpm: 12.5, engaged: true }));

        let rig =
            self.spawn_node("rig", Some(root), Transform::from_translation(Vec3::new(-1.5, 0.0, 0.0)));
        self.add_skinned_mesh(rig, Arc::new(MeshData::skinned_quad(1.0)), vec![Mat4::IDENTITY]);
        root
    }
}

/// Demo attachment carried by `spawn_demo_scene`.
pub struct SpinDrive {
    pub rpm: f32,
    pub engaged: bool,
}

impl Inspectable for SpinDrive {
    fn type_name(&self) -> &'static str {
        "SpinDrive"
    }

    fn fields(&self) -> Vec<(String, String)> {
        vec![
            ("rpm".to_string(), format!("{:.2}", self.rpm)),
            ("engaged".to_string(), self.engaged.to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_matrix_composes_parent_chain() {
        let mut scene = SceneWorld::new();
        let root = scene.spawn_node("a", None, Transform::from_translation(Vec3::new(1.0, 0.0, 0.0)));
        let child =
            scene.spawn_node("b", Some(root), Transform::from_translation(Vec3::new(0.0, 2.0, 0.0)));
        let world = scene.world_matrix(child).expect("child matrix");
        let translation = world.to_scale_rotation_translation().2;
        assert!((translation - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn lossy_scale_multiplies_down_the_chain() {
        let mut scene = SceneWorld::new();
        let root = scene.spawn_node(
            "a",
            None,
            Transform { scale: Vec3::new(2.0, 1.0, 1.0), ..Transform::default() },
        );
        let child = scene.spawn_node(
            "b",
            Some(root),
            Transform { scale: Vec3::new(1.0, 3.0, 1.0), ..Transform::default() },
        );
        let scale = scene.lossy_scale(child).expect("scale");
        assert!((scale - Vec3::new(2.0, 3.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn despawn_node_removes_descendants() {
        let mut scene = SceneWorld::new();
        let root = scene.spawn_demo_scene();
        let hull = scene.find_named("hull").expect("hull");
        assert!(scene.despawn_node(root));
        assert!(!scene.contains(root));
        assert!(!scene.contains(hull));
        assert_eq!(scene.node_count(), 0);
    }

    #[test]
    fn reparent_rejects_self_and_missing() {
        let mut scene = SceneWorld::new();
        let a = scene.spawn_node("a", None, Transform::default());
        let b = scene.spawn_node("b", None, Transform::default());
        assert!(scene.reparent(a, Some(a)).is_err());
        assert!(scene.reparent(b, Some(a)).is_ok());
        assert_eq!(scene.node_parent(b), Some(a));
        scene.despawn_node(a);
        assert!(scene.reparent(b, Some(a)).is_err());
    }

    #[test]
    fn dead_parent_contributes_nothing_to_world_matrix() {
        let mut scene = SceneWorld::new();
        let root = scene.spawn_node("a", None, Transform::from_translation(Vec3::new(5.0, 0.0, 0.0)));
        let child =
            scene.spawn_node("b", Some(root), Transform::from_translation(Vec3::new(0.0, 1.0, 0.0)));
        assert!(scene.world.despawn(root));
        let world = scene.world_matrix(child).expect("child survives");
        let translation = world.to_cols_array();
        assert!((translation[12] - 0.0).abs() < 1e-5);
        assert!((translation[13] - 1.0).abs() < 1e-5);
    }
}
