use crate::scene::SceneWorld;
use bevy_ecs::prelude::Entity;
use smallvec::SmallVec;

/// Ordered drill-down path from a root-level node through successively
/// chosen descendants. `chain[i]` is a direct child of `chain[i-1]` at the
/// time of selection; the link is enforced only at mutation time, so a
/// chain can go stale while the host mutates the graph between scans. A
/// stale chain is tolerated until the next click truncates it.
#[derive(Default)]
pub struct SelectionChain {
    nodes: SmallVec<[Entity; 8]>,
}

impl SelectionChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Entity] {
        &self.nodes
    }

    pub fn get(&self, depth: usize) -> Option<Entity> {
        self.nodes.get(depth).copied()
    }

    /// The drilled-into node, handed to the property panel each frame.
    pub fn deepest(&self) -> Option<Entity> {
        self.nodes.last().copied()
    }

    pub fn is_selected_at(&self, depth: usize, node: Entity) -> bool {
        self.get(depth) == Some(node)
    }

    /// Truncates any entries at or beyond `depth`, then appends `node`.
    /// Afterwards the chain has length `depth + 1` and `chain[depth]`
    /// equals `node`; entries before `depth` are untouched.
    pub fn select(&mut self, depth: usize, node: Entity) {
        self.nodes.truncate(depth);
        self.nodes.push(node);
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Whether every link still matches the live graph. Diagnostic only;
    /// the browser never calls this (stale chains are legal).
    pub fn is_parent_linked(&self, scene: &SceneWorld) -> bool {
        self.nodes.windows(2).all(|pair| scene.node_parent(pair[1]) == Some(pair[0]))
    }
}
