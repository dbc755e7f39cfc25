//! Per-robot planning front end: checks the direct segment first and falls
//! back to the RRT only when the straight line is blocked.

use std::collections::HashMap;

use rand::{rngs::StdRng, SeedableRng};
use tern_core::{
    debug_path, debug_value, AvoidanceFlags, DebugColor, ExecutorSettings, PlayerData, PlayerId,
    Vector2, WorldData,
};

use super::{
    rrt,
    violation::Violation,
    waypoints::{PlannerKind, WaypointStore},
};

/// The outcome of one planning call.
#[derive(Clone, Debug)]
pub struct PlannedPath {
    /// Path points in order, excluding the robot's current position. Empty
    /// when the robot cannot move at all this tick.
    pub points: Vec<Vector2>,
    /// Whether the direct segment to the goal was used (no search ran).
    pub direct: bool,
}

pub struct Navigator {
    id: PlayerId,
    kind: PlannerKind,
    rrt_invocations: u64,
    rng: StdRng,
}

impl Navigator {
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            kind: PlannerKind::Navigate,
            rrt_invocations: 0,
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic variant for tests.
    pub fn with_seed(id: PlayerId, seed: u64) -> Self {
        Self {
            id,
            kind: PlannerKind::Navigate,
            rrt_invocations: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    /// How many times the RRT has been invoked over this navigator's
    /// lifetime. Feasible direct segments never increment this.
    pub fn rrt_invocations(&self) -> u64 {
        self.rrt_invocations
    }

    /// Plans a collision-free path for the robot toward `goal`. Feasibility
    /// is always relative to the stationary baseline, so a robot inside a
    /// keep-out zone can plan its way out.
    pub fn plan(
        &mut self,
        player: &PlayerData,
        goal: Vector2,
        world: &WorldData,
        priorities: &HashMap<PlayerId, usize>,
        flags: AvoidanceFlags,
        settings: &ExecutorSettings,
        waypoints: &mut WaypointStore,
    ) -> PlannedPath {
        let baseline = Violation::baseline(
            player.position,
            world,
            self.id,
            priorities,
            flags,
            &settings.avoidance,
        );

        let direct = Violation::compute(
            player.position,
            goal,
            world,
            self.id,
            priorities,
            flags,
            &settings.avoidance,
        );
        if direct.no_more_violating_than(&baseline) {
            self.publish(player, &[goal]);
            return PlannedPath {
                points: vec![goal],
                direct: true,
            };
        }

        self.rrt_invocations += 1;
        let id = self.id;
        let cache = waypoints.cache_mut(id, self.kind);
        let points = rrt::find_path(
            player,
            goal,
            world,
            &settings.planner,
            cache,
            |from, to| {
                Violation::compute(from, to, world, id, priorities, flags, &settings.avoidance)
                    .no_more_violating_than(&baseline)
            },
            &mut self.rng,
        );
        // An empty path also comes back when the root already sits within
        // the target threshold of the goal; that robot is not boxed in.
        let at_goal = (player.position - goal).norm() <= settings.planner.target_threshold;
        if points.is_empty() && !at_goal {
            log::warn!("Player {} is boxed in, no feasible extension", self.id);
        }
        self.publish(player, &points);
        PlannedPath {
            points,
            direct: false,
        }
    }

    fn publish(&self, player: &PlayerData, points: &[Vector2]) {
        let mut display = Vec::with_capacity(points.len() + 1);
        display.push(player.position);
        display.extend_from_slice(points);
        debug_path(format!("p{}.planned_path", self.id), display, DebugColor::Green);
        debug_value(
            format!("p{}.rrt_invocations", self.id),
            self.rrt_invocations as f64,
        );
    }
}

#[cfg(test)]
mod tests {
    use tern_core::{Angle, AvoidanceSettings, FieldGeometry};

    use super::*;

    fn player(id: u32, x: f64, y: f64) -> PlayerData {
        PlayerData {
            id: PlayerId::new(id),
            position: Vector2::new(x, y),
            velocity: Vector2::zeros(),
            yaw: Angle::default(),
        }
    }

    fn empty_world() -> WorldData {
        WorldData {
            own_players: vec![player(0, 0.0, 0.0)],
            opp_players: vec![],
            ball: None,
            field_geom: FieldGeometry::default(),
            dt: 1.0 / 60.0,
        }
    }

    // Keep-out radius from an opponent comes out to exactly 300 mm.
    fn settings_with_300mm_keep_out() -> ExecutorSettings {
        let mut settings = ExecutorSettings::default();
        settings.avoidance = AvoidanceSettings {
            robot_radius: 100.0,
            opponent_margin: 100.0,
            ..AvoidanceSettings::default()
        };
        settings
    }

    #[test]
    fn test_unobstructed_goal_uses_direct_segment() {
        let world = empty_world();
        let settings = ExecutorSettings::default();
        let mut waypoints = WaypointStore::default();
        let mut navigator = Navigator::with_seed(PlayerId::new(0), 1);

        let goal = Vector2::new(3000.0, 1000.0);
        let path = navigator.plan(
            &world.own_players[0],
            goal,
            &world,
            &HashMap::new(),
            AvoidanceFlags::NONE,
            &settings,
            &mut waypoints,
        );
        assert!(path.direct);
        assert_eq!(path.points, vec![goal]);
        assert_eq!(navigator.rrt_invocations(), 0);
    }

    #[test]
    fn test_blocked_line_invokes_planner_and_deviates() {
        let mut world = empty_world();
        world.opp_players.push(player(10, 500.0, 0.0));
        let settings = settings_with_300mm_keep_out();
        let mut waypoints = WaypointStore::default();
        let mut navigator = Navigator::with_seed(PlayerId::new(0), 42);

        let goal = Vector2::new(2000.0, 0.0);
        let path = navigator.plan(
            &world.own_players[0],
            goal,
            &world,
            &HashMap::new(),
            AvoidanceFlags::NONE,
            &settings,
            &mut waypoints,
        );
        assert!(!path.direct);
        assert_eq!(navigator.rrt_invocations(), 1);
        assert!(!path.points.is_empty());
        // Every point keeps the full keep-out clearance from the enemy, and
        // the path makes it past the blocker.
        for p in &path.points {
            assert!((p - Vector2::new(500.0, 0.0)).norm() >= 300.0 - 1e-6);
        }
        assert!(path.points.iter().any(|p| p.y.abs() > 1.0));
        assert!(path.points.last().unwrap().x > 500.0);
    }

    #[test]
    fn test_goal_within_threshold_yields_empty_search_path() {
        // Creeping toward the ball inside its stop buffer is infeasible, so
        // the search runs, but its root is already within the target
        // threshold of the goal and the path comes back empty. The robot is
        // at its goal, not boxed in.
        let mut world = empty_world();
        world.ball = Some(tern_core::BallData {
            position: Vector2::new(0.0, 0.0),
            velocity: Vector2::zeros(),
        });
        world.own_players[0].position = Vector2::new(300.0, 0.0);
        let settings = ExecutorSettings::default();
        let mut waypoints = WaypointStore::default();
        let mut navigator = Navigator::with_seed(PlayerId::new(0), 7);

        let path = navigator.plan(
            &world.own_players[0],
            Vector2::new(250.0, 0.0),
            &world,
            &HashMap::new(),
            AvoidanceFlags::AVOID_BALL_STOP,
            &settings,
            &mut waypoints,
        );
        assert!(!path.direct);
        assert_eq!(navigator.rrt_invocations(), 1);
        assert!(path.points.is_empty());
    }

    #[test]
    fn test_escape_from_keep_out_planned_directly() {
        // Standing inside the ball-stop zone and moving straight away: the
        // direct segment is no more violating than staying put, so the
        // planner must not run.
        let mut world = empty_world();
        world.ball = Some(tern_core::BallData {
            position: Vector2::new(0.0, 0.0),
            velocity: Vector2::zeros(),
        });
        world.own_players[0].position = Vector2::new(300.0, 0.0);
        let settings = ExecutorSettings::default();
        let mut waypoints = WaypointStore::default();
        let mut navigator = Navigator::with_seed(PlayerId::new(0), 2);

        let path = navigator.plan(
            &world.own_players[0],
            Vector2::new(1500.0, 0.0),
            &world,
            &HashMap::new(),
            AvoidanceFlags::AVOID_BALL_STOP,
            &settings,
            &mut waypoints,
        );
        assert!(path.direct);
        assert_eq!(navigator.rrt_invocations(), 0);
    }
}
