use crate::scene::SceneWorld;
use bevy_ecs::prelude::Entity;

/// Point-in-time capture of every live node. Replaced wholesale by the
/// next rescan, never patched; stale entries are tolerated and skipped at
/// use time.
#[derive(Clone, Debug, Default)]
pub struct SceneSnapshot {
    nodes: Vec<Entity>,
}

impl SceneSnapshot {
    pub fn capture(scene: &SceneWorld) -> Self {
        Self { nodes: scene.collect_nodes() }
    }

    /// Iteration order is whatever the scan produced. It is stable within
    /// a frame but carries no global ordering.
    pub fn nodes(&self) -> &[Entity] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.nodes.contains(&entity)
    }
}

/// Periodic scene-graph scanner. Full enumeration is O(nodes), so it runs
/// on a fixed cadence instead of every frame; the tree view only needs to
/// be fresh enough for interactive browsing.
pub struct SceneIndex {
    period: f32,
    accumulator: f32,
    snapshot: SceneSnapshot,
}

impl SceneIndex {
    pub fn new(rescan_hz: f32) -> Self {
        let period = 1.0 / rescan_hz.max(f32::EPSILON);
        Self { period, accumulator: 0.0, snapshot: SceneSnapshot::default() }
    }

    pub fn period(&self) -> f32 {
        self.period
    }

    pub fn accumulated(&self) -> f32 {
        self.accumulator
    }

    pub fn snapshot(&self) -> &SceneSnapshot {
        &self.snapshot
    }

    /// Accumulates frame time and rescans when at least one full period has
    /// elapsed. A slow frame drains every whole period it covers by
    /// repeated subtraction but still triggers only one rescan; missed
    /// scans are never made up. Returns whether a rescan happened.
    pub fn advance(&mut self, dt: f32, scene: &SceneWorld) -> bool {
        self.accumulator += dt;
        if self.accumulator < self.period {
            return false;
        }
        while self.accumulator >= self.period {
            self.accumulator -= self.period;
        }
        self.snapshot = SceneSnapshot::capture(scene);
        true
    }

    /// Unconditional capture, used at startup so the first frame already
    /// has a snapshot to browse.
    pub fn rescan_now(&mut self, scene: &SceneWorld) {
        self.snapshot = SceneSnapshot::capture(scene);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Transform;

    #[test]
    fn empty_graph_yields_empty_snapshot() {
        let scene = SceneWorld::new();
        let mut index = SceneIndex::new(10.0);
        assert!(index.advance(1.0, &scene));
        assert!(index.snapshot().is_empty());
    }

    #[test]
    fn sub_period_frames_fire_one_scan_per_period() {
        let mut scene = SceneWorld::new();
        scene.spawn_node("a", None, Transform::default());
        // 8 Hz keeps the period an exact binary fraction (0.125 s).
        let mut index = SceneIndex::new(8.0);
        let mut scans = 0;
        // 32 frames of 1/32 s = 1.0 s = 8 periods.
        for _ in 0..32 {
            if index.advance(0.03125, &scene) {
                scans += 1;
            }
        }
        assert_eq!(scans, 8);
        assert_eq!(index.accumulated(), 0.0);
    }

    #[test]
    fn slow_frame_drains_buckets_but_scans_once() {
        let mut scene = SceneWorld::new();
        scene.spawn_node("a", None, Transform::default());
        let mut index = SceneIndex::new(8.0);
        // One frame covering 3 periods plus 1/32 s of remainder.
        let fired = index.advance(3.0 * index.period() + 0.03125, &scene);
        assert!(fired);
        assert_eq!(index.accumulated(), 0.03125);
        // The very next short frame does not fire again.
        assert!(!index.advance(0.01, &scene));
    }

    #[test]
    fn leftover_time_carries_between_frames() {
        let scene = SceneWorld::new();
        let mut index = SceneIndex::new(8.0);
        assert!(!index.advance(0.1, &scene));
        assert!(index.advance(0.1, &scene));
        assert!((index.accumulated() - 0.075).abs() < 1e-5);
    }

    #[test]
    fn snapshot_is_replaced_wholesale() {
        let mut scene = SceneWorld::new();
        let a = scene.spawn_node("a", None, Transform::default());
        let mut index = SceneIndex::new(10.0);
        index.rescan_now(&scene);
        assert!(index.snapshot().contains(a));

        scene.despawn_node(a);
        let b = scene.spawn_node("b", None, Transform::default());
        // The stale snapshot still lists the dead node until the next scan.
        assert!(index.snapshot().contains(a));
        index.rescan_now(&scene);
        assert!(!index.snapshot().contains(a));
        assert!(index.snapshot().contains(b));
    }
}
