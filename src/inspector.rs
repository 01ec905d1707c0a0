use crate::browser::HierarchyBrowser;
use crate::config::InspectorConfig;
use crate::index::{SceneIndex, SceneSnapshot};
use crate::inspect::PropertyPanel;
use crate::overlay::{OverlayCamera, WireOverlay};
use crate::scene::SceneWorld;
use crate::selection::SelectionChain;
use crate::surface::DrawSurface;
use bevy_ecs::prelude::Entity;

/// Frame-driven scene-graph inspector. The host calls, in order and on
/// one thread: [`Inspector::update`] (rescan cadence), [`Inspector::ui`]
/// (tree + property windows, selection mutation), [`Inspector::render`]
/// (overlay draws). Update always completes before the same frame's UI
/// observes the snapshot, and click-driven marker changes land before the
/// render pass draws them.
pub struct Inspector {
    index: SceneIndex,
    chain: SelectionChain,
    overlay: WireOverlay,
    browser: HierarchyBrowser,
    panel: PropertyPanel,
    camera: Option<OverlayCamera>,
}

impl Inspector {
    pub fn new(config: InspectorConfig) -> Self {
        Self {
            index: SceneIndex::new(config.rescan_hz),
            chain: SelectionChain::new(),
            overlay: WireOverlay::new(config.active_color_vec(), config.dimmed_color_vec()),
            browser: HierarchyBrowser::new(),
            panel: PropertyPanel::new(),
            camera: None,
        }
    }

    /// Registers the overlay camera. Call once at scene start.
    pub fn attach_camera(&mut self, surface: &mut dyn DrawSurface) {
        if self.camera.is_none() {
            self.camera = Some(OverlayCamera::create(surface));
        }
    }

    /// Update phase: accumulate frame time, rescan on cadence. Returns
    /// whether a rescan happened this frame.
    pub fn update(&mut self, dt: f32, scene: &SceneWorld) -> bool {
        self.index.advance(dt, scene)
    }

    /// Render-phase UI: the hierarchy window, and the property window for
    /// the deepest selection if there is one.
    pub fn ui(&mut self, ctx: &egui::Context, scene: &SceneWorld) {
        let Self { index, chain, overlay, browser, panel, .. } = self;
        egui::Window::new("Hierarchy")
            .default_pos([50.0, 50.0])
            .default_size([320.0, 520.0])
            .vscroll(true)
            .show(ctx, |ui| {
                browser.show(ui, scene, index.snapshot(), chain, overlay);
            });

        if let Some(node) = chain.deepest() {
            let title = scene.node_name(node).unwrap_or("<gone>");
            egui::Window::new(format!("Inspector: {title}"))
                .default_pos([380.0, 50.0])
                .default_size([320.0, 520.0])
                .vscroll(true)
                .show(ctx, |ui| {
                    panel.show(ui, scene, node);
                });
        }
    }

    /// Overlay draw phase.
    pub fn render(&mut self, scene: &SceneWorld, surface: &mut dyn DrawSurface) {
        self.overlay.render(scene, surface);
    }

    /// The deepest node of the current chain, or `None` when nothing is
    /// selected. This is the one value handed to external collaborators.
    pub fn selected(&self) -> Option<Entity> {
        self.chain.deepest()
    }

    pub fn chain(&self) -> &SelectionChain {
        &self.chain
    }

    pub fn overlay(&self) -> &WireOverlay {
        &self.overlay
    }

    pub fn snapshot(&self) -> &SceneSnapshot {
        self.index.snapshot()
    }

    /// Captures a snapshot immediately, bypassing the cadence. Call once
    /// after construction so the first frame has something to browse.
    pub fn rescan_now(&mut self, scene: &SceneWorld) {
        self.index.rescan_now(scene);
    }

    /// Programmatic selection, same path the tree rows take on click.
    pub fn select(&mut self, scene: &SceneWorld, depth: usize, node: Entity) {
        crate::browser::apply_selection(scene, &mut self.chain, &mut self.overlay, depth, node);
    }

    /// Detaches every marker, clears the chain, destroys retired
    /// materials, removes the overlay camera. The inspector is reusable
    /// afterwards but starts from an empty selection.
    pub fn shutdown(&mut self, surface: &mut dyn DrawSurface) {
        self.overlay.detach_all();
        self.chain.clear();
        self.overlay.flush_retired(surface);
        if let Some(camera) = self.camera.take() {
            camera.teardown(surface);
        }
    }
}
