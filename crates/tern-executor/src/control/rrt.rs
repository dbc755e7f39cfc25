//! Sampling-based kinodynamic path planner. The tree is an arena of nodes
//! addressed by index and is rebuilt on every call; only points promoted into
//! the waypoint cache survive across ticks.

use rand::{
    distributions::{Distribution, Uniform},
    Rng,
};
use tern_core::{PlannerSettings, PlayerData, Vector2, WorldData};

use super::waypoints::WaypointCache;

struct Node {
    point: Vector2,
    parent: Option<usize>,
}

/// Grows a tree of reachable points from the robot's current state toward
/// `goal` and returns the path to the node closest to it, in order, without
/// the start point. Returns an empty path when the robot cannot move at all
/// (the very first extension from the root is infeasible).
///
/// `is_valid` is the edge-feasibility oracle; edges it rejects are discarded
/// without adding a node. The iteration cap bounds worst-case latency; when
/// it is reached the best partial path is returned rather than failing the
/// tick.
pub fn find_path(
    player: &PlayerData,
    goal: Vector2,
    world: &WorldData,
    settings: &PlannerSettings,
    cache: &mut WaypointCache,
    is_valid: impl Fn(Vector2, Vector2) -> bool,
    rng: &mut impl Rng,
) -> Vec<Vector2> {
    let dt = settings.step_dt;
    let max_vel = settings.max_velocity;
    let max_accel = settings.max_acceleration;

    // Seed the root one step ahead under the current (speed-clamped)
    // velocity, so the first extension already respects momentum.
    let mut vel = player.velocity;
    let speed = vel.norm();
    if speed > max_vel {
        vel *= max_vel / speed;
    }
    let root_vel = vel;
    let mut nodes = vec![Node {
        point: player.position + root_vel * dt,
        parent: None,
    }];

    let half_l = world.field_geom.half_length();
    let half_w = world.field_geom.half_width();
    let x_dist = Uniform::new_inclusive(-half_l, half_l);
    let y_dist = Uniform::new_inclusive(-half_w, half_w);

    let mut best_idx = 0;
    let mut best_dist = (nodes[0].point - goal).norm();

    for _ in 0..settings.max_iterations {
        if best_dist <= settings.target_threshold {
            break;
        }

        let target = sample_target(goal, cache, settings, &x_dist, &y_dist, rng);

        // Nearest node under the projected-position metric: where the robot
        // would be one step later if it kept the velocity it arrived with.
        let mut nearest = 0;
        let mut nearest_dist = f64::INFINITY;
        for (idx, node) in nodes.iter().enumerate() {
            let projected = node.point + incoming_velocity(&nodes, idx, root_vel, dt) * dt;
            let d = (target - projected).norm();
            if d < nearest_dist {
                nearest_dist = d;
                nearest = idx;
            }
        }

        let v_in = incoming_velocity(&nodes, nearest, root_vel, dt);
        let from = nodes[nearest].point;
        let projected = from + v_in * dt;
        let remaining = (target - projected).norm();
        if remaining < f64::EPSILON {
            continue;
        }
        let dir = (target - projected) / remaining;

        // One kinodynamic step: the speed we may still carry toward the
        // target is limited by what we can brake away from it, and the
        // velocity change this step is limited by the acceleration budget.
        let speed = (2.0 * max_accel * remaining).sqrt().min(max_vel);
        let v_des = dir * speed;
        let dv = v_des - v_in;
        let dv_norm = dv.norm();
        let v_out = if dv_norm > max_accel * dt {
            v_in + dv * (max_accel * dt / dv_norm)
        } else {
            v_des
        };
        let new_point = from + v_out * dt;

        if !is_valid(from, new_point) {
            if nodes[nearest].parent.is_none() {
                // The robot cannot even leave its projected position.
                return Vec::new();
            }
            continue;
        }

        nodes.push(Node {
            point: new_point,
            parent: Some(nearest),
        });
        let d = (new_point - goal).norm();
        if d < best_dist {
            best_dist = d;
            best_idx = nodes.len() - 1;
        }
    }

    reconstruct(&nodes, best_idx, cache, rng)
}

fn sample_target(
    goal: Vector2,
    cache: &WaypointCache,
    settings: &PlannerSettings,
    x_dist: &Uniform<f64>,
    y_dist: &Uniform<f64>,
    rng: &mut impl Rng,
) -> Vector2 {
    let r: f64 = rng.gen();
    if r < settings.p_goal {
        goal
    } else if r < settings.p_goal + settings.p_waypoint {
        cache
            .sample(rng)
            .unwrap_or_else(|| Vector2::new(x_dist.sample(rng), y_dist.sample(rng)))
    } else {
        Vector2::new(x_dist.sample(rng), y_dist.sample(rng))
    }
}

/// The velocity a robot would arrive at `idx` with: the root keeps the
/// robot's own velocity, every other node the displacement from its parent
/// over one step.
fn incoming_velocity(nodes: &[Node], idx: usize, root_vel: Vector2, dt: f64) -> Vector2 {
    match nodes[idx].parent {
        Some(parent) => (nodes[idx].point - nodes[parent].point) / dt,
        None => root_vel,
    }
}

/// Walks parent links from `terminus` back to the root, reverses the order
/// and drops the root itself (the caller is already there). Interior points
/// are promoted into the waypoint cache so future searches are biased toward
/// regions that worked before.
fn reconstruct(
    nodes: &[Node],
    terminus: usize,
    cache: &mut WaypointCache,
    rng: &mut impl Rng,
) -> Vec<Vector2> {
    let mut path = Vec::new();
    let mut idx = terminus;
    loop {
        match nodes[idx].parent {
            Some(parent) => {
                path.push(nodes[idx].point);
                idx = parent;
            }
            None => break,
        }
    }
    path.reverse();
    if path.len() > 1 {
        for point in &path[..path.len() - 1] {
            cache.insert(*point, rng);
        }
    }
    path
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};
    use tern_core::{Angle, FieldGeometry, PlayerId};

    use super::*;

    fn player_at(pos: Vector2, vel: Vector2) -> PlayerData {
        PlayerData {
            id: PlayerId::new(0),
            position: pos,
            velocity: vel,
            yaw: Angle::default(),
        }
    }

    fn world() -> WorldData {
        WorldData {
            own_players: vec![],
            opp_players: vec![],
            ball: None,
            field_geom: FieldGeometry::default(),
            dt: 1.0 / 60.0,
        }
    }

    #[test]
    fn test_finds_path_in_open_field() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut cache = WaypointCache::default();
        let settings = PlannerSettings::default();
        let player = player_at(Vector2::zeros(), Vector2::zeros());
        let goal = Vector2::new(2000.0, 0.0);

        let path = find_path(&player, goal, &world(), &settings, &mut cache, |_, _| true, &mut rng);
        assert!(!path.is_empty());
        let last = path.last().unwrap();
        assert!((last - goal).norm() < (player.position - goal).norm());
    }

    #[test]
    fn test_path_never_starts_at_current_position() {
        let settings = PlannerSettings::default();
        let player = player_at(Vector2::new(500.0, -200.0), Vector2::new(300.0, 0.0));

        for seed in 0..10u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut cache = WaypointCache::default();
            let path = find_path(
                &player,
                Vector2::new(2500.0, 1000.0),
                &world(),
                &settings,
                &mut cache,
                |_, _| true,
                &mut rng,
            );
            assert!(!path.is_empty());
            for p in &path {
                assert_ne!(*p, player.position);
            }
        }
    }

    #[test]
    fn test_kinodynamic_bounds_hold_along_path() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut cache = WaypointCache::default();
        let settings = PlannerSettings::default();
        let player = player_at(Vector2::zeros(), Vector2::new(1000.0, 500.0));

        let path = find_path(
            &player,
            Vector2::new(3000.0, 1500.0),
            &world(),
            &settings,
            &mut cache,
            |_, _| true,
            &mut rng,
        );
        assert!(path.len() >= 2);

        let dt = settings.step_dt;
        let velocities: Vec<Vector2> = path.windows(2).map(|w| (w[1] - w[0]) / dt).collect();
        for v in &velocities {
            assert!(v.norm() <= settings.max_velocity + 1e-6);
        }
        for a in velocities.windows(2) {
            let accel = (a[1] - a[0]).norm() / dt;
            assert!(accel <= settings.max_acceleration + 1e-6);
        }
    }

    #[test]
    fn test_blocked_root_returns_no_path() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut cache = WaypointCache::default();
        let settings = PlannerSettings::default();
        let player = player_at(Vector2::zeros(), Vector2::zeros());

        let path = find_path(
            &player,
            Vector2::new(2000.0, 0.0),
            &world(),
            &settings,
            &mut cache,
            |_, _| false,
            &mut rng,
        );
        assert!(path.is_empty());
    }

    #[test]
    fn test_partial_path_on_exhaustion() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut cache = WaypointCache::default();
        let mut settings = PlannerSettings::default();
        settings.max_iterations = 300;
        let player = player_at(Vector2::zeros(), Vector2::zeros());

        // A wall at x = 1000 the planner cannot cross; the goal is beyond it.
        let path = find_path(
            &player,
            Vector2::new(3000.0, 0.0),
            &world(),
            &settings,
            &mut cache,
            |_, to| to.x < 1000.0,
            &mut rng,
        );
        assert!(!path.is_empty());
        for p in &path {
            assert!(p.x < 1000.0);
        }
    }

    #[test]
    fn test_successful_search_populates_cache() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut cache = WaypointCache::default();
        let settings = PlannerSettings::default();
        let player = player_at(Vector2::zeros(), Vector2::zeros());

        let path = find_path(
            &player,
            Vector2::new(2500.0, -800.0),
            &world(),
            &settings,
            &mut cache,
            |_, _| true,
            &mut rng,
        );
        assert!(path.len() > 1);
        assert!(!cache.is_empty());
    }
}
