use glam::{Mat4, Quat, Vec3, Vec4};
use scenescope::browser::apply_selection;
use scenescope::mesh::MeshData;
use scenescope::overlay::WireOverlay;
use scenescope::scene::{SceneWorld, Transform};
use scenescope::selection::SelectionChain;
use scenescope::surface::TraceSurface;
use std::sync::Arc;

const ACTIVE: Vec4 = Vec4::new(0.0, 1.0, 0.0, 1.0);
const DIMMED: Vec4 = Vec4::new(0.0, 0.5, 0.75, 1.0);

#[test]
fn static_mesh_draws_with_world_transform() {
    let mut scene = SceneWorld::new();
    let root = scene.spawn_node("root", None, Transform::from_translation(Vec3::new(3.0, 0.0, 0.0)));
    let hull = scene.spawn_node("hull", Some(root), Transform::from_translation(Vec3::new(0.0, 2.0, 0.0)));
    let mesh = Arc::new(MeshData::cube(1.0));
    scene.add_static_mesh(hull, mesh.clone());

    let mut chain = SelectionChain::new();
    let mut overlay = WireOverlay::new(ACTIVE, DIMMED);
    apply_selection(&scene, &mut chain, &mut overlay, 0, root);
    apply_selection(&scene, &mut chain, &mut overlay, 1, hull);

    let mut surface = TraceSurface::new();
    overlay.render(&scene, &mut surface);
    assert_eq!(surface.draws.len(), 1);
    let draw = &surface.draws[0];
    assert_eq!(draw.positions.len(), mesh.vertices.len());
    assert_eq!(draw.index_count, mesh.indices.len());
    let translation = draw.transform.to_scale_rotation_translation().2;
    assert!((translation - Vec3::new(3.0, 2.0, 0.0)).length() < 1e-5);
    assert_eq!(draw.color, ACTIVE);
}

#[test]
fn skinned_bake_compensation_round_trips_under_nonuniform_scale() {
    let mut scene = SceneWorld::new();
    let rig = scene.spawn_node(
        "rig",
        None,
        Transform { scale: Vec3::new(2.0, 4.0, 0.5), ..Transform::default() },
    );
    let mesh = Arc::new(MeshData::skinned_quad(1.0));
    scene.add_skinned_mesh(rig, mesh.clone(), vec![Mat4::IDENTITY]);

    let mut chain = SelectionChain::new();
    let mut overlay = WireOverlay::new(ACTIVE, DIMMED);
    apply_selection(&scene, &mut chain, &mut overlay, 0, rig);

    let mut surface = TraceSurface::new();
    overlay.render(&scene, &mut surface);
    assert_eq!(surface.draws.len(), 1);
    // The bake applies the world scale, the overlay divides it out, and
    // the draw transform reapplies it: the recorded vertex positions are
    // the unscaled rest positions.
    for (drawn, rest) in surface.draws[0].positions.iter().zip(mesh.vertices.iter()) {
        let drawn = Vec3::from_array(*drawn);
        let rest = Vec3::from_array(rest.position);
        assert!((drawn - rest).length() < 1e-5, "{drawn} vs {rest}");
    }
}

#[test]
fn posed_skin_keeps_deformation_but_not_scale() {
    let mut scene = SceneWorld::new();
    let rig = scene.spawn_node(
        "rig",
        None,
        Transform { scale: Vec3::new(2.0, 2.0, 2.0), ..Transform::default() },
    );
    let mesh = Arc::new(MeshData::skinned_quad(1.0));
    let pose = vec![Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0))];
    scene.add_skinned_mesh(rig, mesh.clone(), pose);

    let mut chain = SelectionChain::new();
    let mut overlay = WireOverlay::new(ACTIVE, DIMMED);
    apply_selection(&scene, &mut chain, &mut overlay, 0, rig);

    let mut surface = TraceSurface::new();
    overlay.render(&scene, &mut surface);
    for (drawn, rest) in surface.draws[0].positions.iter().zip(mesh.vertices.iter()) {
        let drawn = Vec3::from_array(*drawn);
        let expected = Vec3::from_array(rest.position) + Vec3::new(1.0, 0.0, 0.0);
        assert!((drawn - expected).length() < 1e-5, "{drawn} vs {expected}");
    }
}

#[test]
fn rotated_parent_still_renders_under_world_transform() {
    let mut scene = SceneWorld::new();
    let root = scene.spawn_node(
        "root",
        None,
        Transform {
            rotation: Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
            ..Transform::default()
        },
    );
    let hull = scene.spawn_node("hull", Some(root), Transform::from_translation(Vec3::new(1.0, 0.0, 0.0)));
    scene.add_static_mesh(hull, Arc::new(MeshData::cube(1.0)));

    let mut chain = SelectionChain::new();
    let mut overlay = WireOverlay::new(ACTIVE, DIMMED);
    apply_selection(&scene, &mut chain, &mut overlay, 0, root);
    apply_selection(&scene, &mut chain, &mut overlay, 1, hull);

    let mut surface = TraceSurface::new();
    overlay.render(&scene, &mut surface);
    let translation = surface.draws[0].transform.to_scale_rotation_translation().2;
    assert!((translation - Vec3::new(0.0, 1.0, 0.0)).length() < 1e-5);
}

#[test]
fn wireframe_flag_never_leaks_across_markers() {
    let mut scene = SceneWorld::new();
    let a = scene.spawn_node("a", None, Transform::default());
    let b = scene.spawn_node("b", Some(a), Transform::default());
    scene.add_static_mesh(a, Arc::new(MeshData::cube(1.0)));
    scene.add_static_mesh(b, Arc::new(MeshData::cube(2.0)));

    let mut chain = SelectionChain::new();
    let mut overlay = WireOverlay::new(ACTIVE, DIMMED);
    apply_selection(&scene, &mut chain, &mut overlay, 0, a);
    apply_selection(&scene, &mut chain, &mut overlay, 1, b);

    let mut surface = TraceSurface::new();
    overlay.render(&scene, &mut surface);
    assert_eq!(surface.draws.len(), 2);
    assert!(surface.draws.iter().all(|draw| draw.wireframe));
    assert!(!surface.wireframe_enabled());
}

#[test]
fn mesh_removed_between_frames_skips_without_leaking_wireframe() {
    let mut scene = SceneWorld::new();
    let node = scene.spawn_node("n", None, Transform::default());
    scene.add_static_mesh(node, Arc::new(MeshData::cube(1.0)));

    let mut chain = SelectionChain::new();
    let mut overlay = WireOverlay::new(ACTIVE, DIMMED);
    apply_selection(&scene, &mut chain, &mut overlay, 0, node);

    let mut surface = TraceSurface::new();
    overlay.render(&scene, &mut surface);
    assert_eq!(surface.draws.len(), 1);

    // The host strips the payload; the marker stays but draws nothing.
    scene.world.entity_mut(node).remove::<scenescope::scene::StaticMeshNode>();
    overlay.render(&scene, &mut surface);
    assert_eq!(surface.draws.len(), 1);
    assert!(!surface.wireframe_enabled());
}
