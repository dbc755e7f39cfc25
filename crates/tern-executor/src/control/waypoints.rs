//! Fixed-size per-robot memory of previously useful intermediate points. The
//! search tree is rebuilt from scratch every tick; the cache is what carries
//! temporal coherence across ticks.

use std::collections::HashMap;

use rand::Rng;
use tern_core::{PlayerId, Vector2, WAYPOINT_CACHE_SIZE};

/// Which planner variant owns a cache. Separate kinds keep e.g. interception
/// searches from polluting the bias set of plain navigation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlannerKind {
    Navigate,
    Intercept,
}

/// Key into the waypoint store: one cache per robot per planner kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WaypointKey {
    pub player: PlayerId,
    pub kind: PlannerKind,
}

/// A fixed-capacity cache of waypoints with random-replacement insertion. It
/// fills up to [`WAYPOINT_CACHE_SIZE`] entries and then stays at that size
/// forever; an insert overwrites a uniformly random slot.
#[derive(Clone, Debug)]
pub struct WaypointCache {
    points: [Vector2; WAYPOINT_CACHE_SIZE],
    len: usize,
}

impl Default for WaypointCache {
    fn default() -> Self {
        Self {
            points: [Vector2::zeros(); WAYPOINT_CACHE_SIZE],
            len: 0,
        }
    }
}

impl WaypointCache {
    pub fn capacity(&self) -> usize {
        self.points.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn insert(&mut self, point: Vector2, rng: &mut impl Rng) {
        if self.len < self.points.len() {
            self.points[self.len] = point;
            self.len += 1;
        } else {
            self.points[rng.gen_range(0..self.points.len())] = point;
        }
    }

    /// A uniformly random cached point, or `None` while the cache is empty.
    pub fn sample(&self, rng: &mut impl Rng) -> Option<Vector2> {
        if self.len == 0 {
            return None;
        }
        Some(self.points[rng.gen_range(0..self.len)])
    }
}

/// Owns the waypoint caches for all robots; lifetime tied to the robots'
/// lifetime in the world. Single-writer per key (the robot's planner), so no
/// locking discipline is needed.
#[derive(Default)]
pub struct WaypointStore {
    caches: HashMap<WaypointKey, WaypointCache>,
}

impl WaypointStore {
    pub fn cache_mut(&mut self, player: PlayerId, kind: PlannerKind) -> &mut WaypointCache {
        self.caches
            .entry(WaypointKey { player, kind })
            .or_default()
    }

    /// Drop caches for robots no longer present in the world.
    pub fn retain_players(&mut self, alive: impl Fn(PlayerId) -> bool) {
        self.caches.retain(|key, _| alive(key.player));
    }
}
