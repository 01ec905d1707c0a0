use crate::index::SceneSnapshot;
use crate::overlay::WireOverlay;
use crate::scene::SceneWorld;
use crate::selection::SelectionChain;
use bevy_ecs::prelude::Entity;
use egui::{Color32, RichText, Ui};

pub(crate) const INDENT_PER_DEPTH: f32 = 10.0;

/// Applies one click on `node` at `depth`: markers for the old chain come
/// off, the chain is cut back to `depth` and extended by the clicked node,
/// then markers for the new chain go on. Attach/detach is synchronous, so
/// the same frame's render pass never draws a stale selection.
pub fn apply_selection(
    scene: &SceneWorld,
    chain: &mut SelectionChain,
    overlay: &mut WireOverlay,
    depth: usize,
    node: Entity,
) {
    overlay.detach_chain(chain);
    chain.select(depth, node);
    overlay.attach_chain(chain, scene);
}

/// Recursive, indent-by-depth tree view over the current snapshot.
/// Only the selected branch is expanded, which bounds traversal cost to
/// the selection depth instead of the whole subtree.
#[derive(Default)]
pub struct HierarchyBrowser;

impl HierarchyBrowser {
    pub fn new() -> Self {
        Self
    }

    pub fn show(
        &mut self,
        ui: &mut Ui,
        scene: &SceneWorld,
        snapshot: &SceneSnapshot,
        chain: &mut SelectionChain,
        overlay: &mut WireOverlay,
    ) {
        self.list_children(ui, scene, snapshot, chain, overlay, 0, None);
    }

    fn list_children(
        &mut self,
        ui: &mut Ui,
        scene: &SceneWorld,
        snapshot: &SceneSnapshot,
        chain: &mut SelectionChain,
        overlay: &mut WireOverlay,
        depth: usize,
        parent: Option<Entity>,
    ) {
        for &node in snapshot.nodes() {
            // A node despawned since the scan must not masquerade as a
            // root through its missing Parent component.
            if !scene.contains(node) {
                continue;
            }
            if scene.node_parent(node) != parent {
                continue;
            }
            let name = scene.node_name(node).unwrap_or("<unnamed>");
            // Computed before the click so a fresh selection expands on
            // the next frame, not mid-listing.
            let selected = chain.is_selected_at(depth, node);
            let clicked = ui
                .horizontal(|ui| {
                    ui.add_space(INDENT_PER_DEPTH * depth as f32);
                    let text = if selected {
                        RichText::new(name).color(Color32::LIGHT_GREEN)
                    } else {
                        RichText::new(name)
                    };
                    ui.selectable_label(selected, text).clicked()
                })
                .inner;
            if clicked {
                apply_selection(scene, chain, overlay, depth, node);
            }
            if selected {
                self.list_children(ui, scene, snapshot, chain, overlay, depth + 1, Some(node));
            }
        }
    }
}
