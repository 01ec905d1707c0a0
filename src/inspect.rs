use crate::scene::SceneWorld;
use bevy_ecs::prelude::Entity;
use egui::Ui;
use glam::EulerRot;

/// Capability trait for host attachments that want to show up in the
/// property panel. Concrete types implement it explicitly; there is no
/// runtime reflection anywhere.
pub trait Inspectable: Send + Sync + 'static {
    fn type_name(&self) -> &'static str;

    /// Flat list of `(field name, formatted value)` pairs.
    fn fields(&self) -> Vec<(String, String)>;
}

/// Read-only display of the deepest selected node: layer set, transform,
/// then every attachment's fields. Receives exactly one node per frame
/// and never mutates the selection.
#[derive(Default)]
pub struct PropertyPanel;

impl PropertyPanel {
    pub fn new() -> Self {
        Self
    }

    pub fn show(&mut self, ui: &mut Ui, scene: &SceneWorld, node: Entity) {
        if !scene.contains(node) {
            ui.label("Selection no longer exists");
            return;
        }

        if let Some(layers) = scene.node_layers(node) {
            ui.label(format!("Layers: {:?}", layers));
        }

        ui.heading("Transform");
        if let Some(local) = scene.node_transform(node) {
            if let Some(world) = scene.world_matrix(node) {
                let global = world.to_scale_rotation_translation().2;
                labeled_triplet(ui, "Global Position", global.x, global.y, global.z);
            }
            labeled_triplet(ui, "Local Position", local.translation.x, local.translation.y, local.translation.z);
            let (rx, ry, rz) = local.rotation.to_euler(EulerRot::XYZ);
            labeled_triplet(ui, "Rotation", rx.to_degrees(), ry.to_degrees(), rz.to_degrees());
            labeled_triplet(ui, "Scale", local.scale.x, local.scale.y, local.scale.z);
        }

        if let Some(attachments) = scene.attachments(node) {
            for attachment in &attachments.0 {
                ui.separator();
                ui.heading(attachment.type_name());
                let fields = attachment.fields();
                if fields.is_empty() {
                    ui.label("no fields");
                } else {
                    for (name, value) in fields {
                        ui.label(format!("{name}: {value}"));
                    }
                }
            }
        }
    }
}

fn labeled_triplet(ui: &mut Ui, label: &str, x: f32, y: f32, z: f32) {
    ui.label(label);
    ui.horizontal(|ui| {
        ui.monospace(format!("X: {x:.4}"));
        ui.monospace(format!("Y: {y:.4}"));
        ui.monospace(format!("Z: {z:.4}"));
    });
}
