//! Continuous obstacle/keep-out model. A candidate motion segment is scored
//! per constraint category by how far it trespasses into the category's
//! keep-out region; feasibility is always judged relative to the stationary
//! baseline, never against a hard zero, so a robot that is already inside a
//! keep-out zone can still drive out of it.

use std::collections::HashMap;

use tern_core::{math, AvoidanceFlags, AvoidanceSettings, PlayerId, Vector2, WorldData};

/// Absolute tolerance used when comparing violations, to absorb
/// floating-point noise.
pub const VIOLATION_EPSILON: f64 = 1e-9;

/// Per-category trespass magnitudes for one candidate segment, in mm. Every
/// category is non-negative; 0 means clear.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Violation {
    pub opponents: f64,
    pub teammates: f64,
    pub goal_posts: f64,
    pub boundary: f64,
    pub ball_stop: f64,
    pub ball_tiny: f64,
    pub friendly_defense: f64,
    pub enemy_defense: f64,
    pub own_half: f64,
    pub penalty_friendly: f64,
    pub penalty_enemy: f64,
    pub play_area: f64,
}

impl Violation {
    /// Scores the segment `seg_start..seg_end` for the given robot against
    /// every constraint category enabled by `flags`. Robots, goal posts and
    /// the outer boundary are always scored.
    ///
    /// `priorities` maps robots to their tactical priority rank (0 is most
    /// important); a robot yields a larger margin to teammates ranked above
    /// it.
    pub fn compute(
        seg_start: Vector2,
        seg_end: Vector2,
        world: &WorldData,
        player_id: PlayerId,
        priorities: &HashMap<PlayerId, usize>,
        flags: AvoidanceFlags,
        settings: &AvoidanceSettings,
    ) -> Violation {
        let mut v = Violation::default();
        let r = settings.robot_radius;
        let geom = &world.field_geom;
        let own_priority = priorities.get(&player_id).copied().unwrap_or(usize::MAX);

        for opp in world.opp_players.iter() {
            let keep_out = 2.0 * r + settings.opponent_margin;
            let dist = math::distance_to_segment(seg_start, seg_end, opp.position);
            v.opponents = v.opponents.max(keep_out - dist);
        }

        for mate in world.own_players.iter().filter(|p| p.id != player_id) {
            let mate_priority = priorities.get(&mate.id).copied().unwrap_or(usize::MAX);
            let margin = if mate_priority < own_priority {
                settings.teammate_yield_margin
            } else {
                settings.teammate_margin
            };
            let keep_out = 2.0 * r + margin;
            let dist = math::distance_to_segment(seg_start, seg_end, mate.position);
            v.teammates = v.teammates.max(keep_out - dist);
        }

        let posts = geom.own_goal_posts().into_iter().chain(geom.enemy_goal_posts());
        for (p1, p2) in posts {
            let keep_out = r + settings.goal_post_margin;
            let dist = math::segment_segment_distance(seg_start, seg_end, p1, p2);
            v.goal_posts = v.goal_posts.max(keep_out - dist);
        }

        // The outer boundary walls are an inverse keep-out: trespass is how
        // far past the wall (minus the robot radius) either endpoint reaches.
        let limit_x = geom.half_length() + geom.boundary_width - r;
        let limit_y = geom.half_width() + geom.boundary_width - r;
        for p in [seg_start, seg_end] {
            v.boundary = v.boundary.max(p.x.abs() - limit_x).max(p.y.abs() - limit_y);
        }

        if flags.contains(AvoidanceFlags::CLIP_PLAY_AREA) {
            let limit_x = geom.half_length() - r - settings.play_area_margin;
            let limit_y = geom.half_width() - r - settings.play_area_margin;
            for p in [seg_start, seg_end] {
                v.play_area = v.play_area.max(p.x.abs() - limit_x).max(p.y.abs() - limit_y);
            }
        }

        if let Some(ball) = world.ball.as_ref() {
            let ball_keep_out = |clearance: f64| clearance + r + settings.ball_radius;
            let dist = math::distance_to_segment(seg_start, seg_end, ball.position);
            if flags.contains(AvoidanceFlags::AVOID_BALL_STOP) {
                v.ball_stop = ball_keep_out(settings.ball_stop_distance) - dist;
            }
            if flags.contains(AvoidanceFlags::AVOID_BALL_TINY) {
                v.ball_tiny = ball_keep_out(settings.ball_tiny_distance) - dist;
            }
            if flags.contains(AvoidanceFlags::PENALTY_KICK_FRIENDLY) {
                let limit = ball.position.x - settings.penalty_distance;
                for p in [seg_start, seg_end] {
                    v.penalty_friendly = v.penalty_friendly.max(p.x + r - limit);
                }
            }
            if flags.contains(AvoidanceFlags::PENALTY_KICK_ENEMY) {
                let limit = ball.position.x + settings.penalty_distance;
                for p in [seg_start, seg_end] {
                    v.penalty_enemy = v.penalty_enemy.max(limit - (p.x - r));
                }
            }
        }

        if flags.contains(AvoidanceFlags::AVOID_FRIENDLY_DEFENSE) {
            let keep_out = r + settings.defense_area_margin;
            let dist = math::segment_rect_distance(seg_start, seg_end, &geom.own_defense_area());
            v.friendly_defense = keep_out - dist;
        }
        if flags.contains(AvoidanceFlags::AVOID_ENEMY_DEFENSE) {
            let keep_out = r + settings.defense_area_margin;
            let dist = math::segment_rect_distance(seg_start, seg_end, &geom.enemy_defense_area());
            v.enemy_defense = keep_out - dist;
        }

        if flags.contains(AvoidanceFlags::STAY_OWN_HALF) {
            for p in [seg_start, seg_end] {
                v.own_half = v.own_half.max(p.x + r);
            }
        }

        v.clamped()
    }

    /// The violation of staying in place: the zero-length segment at `pos`.
    /// Used as the feasibility baseline for every candidate move.
    pub fn baseline(
        pos: Vector2,
        world: &WorldData,
        player_id: PlayerId,
        priorities: &HashMap<PlayerId, usize>,
        flags: AvoidanceFlags,
        settings: &AvoidanceSettings,
    ) -> Violation {
        Self::compute(pos, pos, world, player_id, priorities, flags, settings)
    }

    /// Whether this violation is no worse than `baseline` in every single
    /// category, within [`VIOLATION_EPSILON`]. This is deliberately not a
    /// blended-cost comparison: a move is infeasible as soon as it makes any
    /// one constraint strictly worse.
    pub fn no_more_violating_than(&self, baseline: &Violation) -> bool {
        self.categories()
            .iter()
            .zip(baseline.categories().iter())
            .all(|(a, b)| *a <= *b + VIOLATION_EPSILON)
    }

    /// Sum over all categories, for diagnostics only. Never use this for
    /// feasibility decisions.
    pub fn total(&self) -> f64 {
        self.categories().iter().sum()
    }

    fn categories(&self) -> [f64; 12] {
        [
            self.opponents,
            self.teammates,
            self.goal_posts,
            self.boundary,
            self.ball_stop,
            self.ball_tiny,
            self.friendly_defense,
            self.enemy_defense,
            self.own_half,
            self.penalty_friendly,
            self.penalty_enemy,
            self.play_area,
        ]
    }

    fn clamped(mut self) -> Violation {
        self.opponents = self.opponents.max(0.0);
        self.teammates = self.teammates.max(0.0);
        self.goal_posts = self.goal_posts.max(0.0);
        self.boundary = self.boundary.max(0.0);
        self.ball_stop = self.ball_stop.max(0.0);
        self.ball_tiny = self.ball_tiny.max(0.0);
        self.friendly_defense = self.friendly_defense.max(0.0);
        self.enemy_defense = self.enemy_defense.max(0.0);
        self.own_half = self.own_half.max(0.0);
        self.penalty_friendly = self.penalty_friendly.max(0.0);
        self.penalty_enemy = self.penalty_enemy.max(0.0);
        self.play_area = self.play_area.max(0.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use tern_core::{Angle, BallData, FieldGeometry, PlayerData};

    use super::*;

    fn player(id: u32, x: f64, y: f64) -> PlayerData {
        PlayerData {
            id: PlayerId::new(id),
            position: Vector2::new(x, y),
            velocity: Vector2::zeros(),
            yaw: Angle::default(),
        }
    }

    fn world() -> WorldData {
        WorldData {
            own_players: vec![player(0, 0.0, 0.0)],
            opp_players: vec![],
            ball: None,
            field_geom: FieldGeometry::default(),
            dt: 1.0 / 60.0,
        }
    }

    fn compute(
        seg_start: Vector2,
        seg_end: Vector2,
        world: &WorldData,
        flags: AvoidanceFlags,
    ) -> Violation {
        Violation::compute(
            seg_start,
            seg_end,
            world,
            PlayerId::new(0),
            &HashMap::new(),
            flags,
            &AvoidanceSettings::default(),
        )
    }

    #[test]
    fn test_never_negative() {
        let mut world = world();
        world.opp_players.push(player(10, 4000.0, 2000.0));
        world.ball = Some(BallData {
            position: Vector2::new(1000.0, 1000.0),
            velocity: Vector2::zeros(),
        });
        let flags = AvoidanceFlags::AVOID_BALL_STOP
            | AvoidanceFlags::AVOID_FRIENDLY_DEFENSE
            | AvoidanceFlags::STAY_OWN_HALF;
        let v = compute(Vector2::new(-2000.0, 0.0), Vector2::new(-2100.0, 0.0), &world, flags);
        for c in v.categories() {
            assert!(c >= 0.0);
        }
    }

    #[test]
    fn test_baseline_reflexive() {
        let mut world = world();
        world.opp_players.push(player(10, 100.0, 0.0));
        let pos = Vector2::new(0.0, 0.0);
        let v = compute(pos, pos, &world, AvoidanceFlags::NONE);
        assert!(v.no_more_violating_than(&v));
        assert!(v.opponents > 0.0); // sanity: the baseline itself trespasses
    }

    #[test]
    fn test_opponent_trespass() {
        let mut world = world();
        world.opp_players.push(player(10, 500.0, 0.0));
        let v = compute(Vector2::new(0.0, 0.0), Vector2::new(1000.0, 0.0), &world, AvoidanceFlags::NONE);
        // Segment passes through the opponent: trespass equals the full
        // keep-out radius.
        assert_eq!(v.opponents, 2.0 * 90.0 + 40.0);

        let v = compute(Vector2::new(0.0, 2000.0), Vector2::new(1000.0, 2000.0), &world, AvoidanceFlags::NONE);
        assert_eq!(v.opponents, 0.0);
    }

    #[test]
    fn test_escaping_keep_out_is_feasible() {
        // Robot already inside the ball-stop buffer, moving directly away:
        // the candidate must be no more violating than standing still even
        // though the baseline trespass is positive.
        let mut world = world();
        world.ball = Some(BallData {
            position: Vector2::new(0.0, 0.0),
            velocity: Vector2::zeros(),
        });
        world.own_players[0].position = Vector2::new(300.0, 0.0);
        let flags = AvoidanceFlags::AVOID_BALL_STOP;

        let baseline = compute(Vector2::new(300.0, 0.0), Vector2::new(300.0, 0.0), &world, flags);
        assert!(baseline.ball_stop > 0.0);

        let away = compute(Vector2::new(300.0, 0.0), Vector2::new(700.0, 0.0), &world, flags);
        assert!(away.no_more_violating_than(&baseline));

        let closer = compute(Vector2::new(300.0, 0.0), Vector2::new(100.0, 0.0), &world, flags);
        assert!(!closer.no_more_violating_than(&baseline));
    }

    #[test]
    fn test_teammate_priority_margin() {
        let mut world = world();
        world.own_players.push(player(1, 400.0, 0.0));
        let settings = AvoidanceSettings::default();
        let seg = (Vector2::new(0.0, 0.0), Vector2::new(200.0, 0.0));

        // Player 0 yields to the higher-priority teammate...
        let mut priorities = HashMap::new();
        priorities.insert(PlayerId::new(0), 1);
        priorities.insert(PlayerId::new(1), 0);
        let yielded = Violation::compute(
            seg.0,
            seg.1,
            &world,
            PlayerId::new(0),
            &priorities,
            AvoidanceFlags::NONE,
            &settings,
        );
        // ...but keeps only the standard margin when the ranks are swapped.
        let mut priorities_rev = HashMap::new();
        priorities_rev.insert(PlayerId::new(0), 0);
        priorities_rev.insert(PlayerId::new(1), 1);
        let standard = Violation::compute(
            seg.0,
            seg.1,
            &world,
            PlayerId::new(0),
            &priorities_rev,
            AvoidanceFlags::NONE,
            &settings,
        );
        assert!(yielded.teammates > standard.teammates);
    }

    #[test]
    fn test_defense_area_flagged_only() {
        let world = world();
        let seg = (Vector2::new(-4200.0, 0.0), Vector2::new(-4300.0, 0.0));
        let v = compute(seg.0, seg.1, &world, AvoidanceFlags::NONE);
        assert_eq!(v.friendly_defense, 0.0);
        let v = compute(seg.0, seg.1, &world, AvoidanceFlags::AVOID_FRIENDLY_DEFENSE);
        assert!(v.friendly_defense > 0.0);
    }
}
