//! Built-in tactics. Strategy layers can supply their own; these cover the
//! common on-ball and off-ball behaviors and double as reference
//! implementations of the tactic state-machine idiom.

use tern_core::{
    math::{angle_sweep, block_cone},
    Angle, AvoidanceFlags, Vector2,
};

use super::{PlayerTarget, Tactic, TacticCtx, TacticProgress};
use crate::control::PrimitiveKind;

const OPPONENT_RADIUS: f64 = 90.0;
/// Ball speed above which a shot is considered released.
const KICKED_SPEED: f64 = 1500.0;
/// How close the striker must be before lining up a shot.
const APPROACH_DISTANCE: f64 = 150.0;

enum StrikerState {
    Fetching,
    Shooting,
}

/// Drives to the ball, then shoots through the widest free gap of the enemy
/// goal mouth. When every lane is covered it dribbles toward the goal instead
/// of firing into a blocker.
pub struct StrikerTactic {
    state: StrikerState,
}

impl StrikerTactic {
    pub fn new() -> Self {
        Self {
            state: StrikerState::Fetching,
        }
    }
}

impl Default for StrikerTactic {
    fn default() -> Self {
        Self::new()
    }
}

impl Tactic for StrikerTactic {
    fn update(&mut self, ctx: TacticCtx<'_>) -> TacticProgress {
        let ball = match &ctx.world.ball {
            Some(ball) => ball,
            None => return TacticProgress::Continue(PlayerTarget::move_to(ctx.player.position)),
        };

        if matches!(self.state, StrikerState::Shooting) && ball.velocity.norm() > KICKED_SPEED {
            return TacticProgress::Done;
        }

        let dist = (ctx.player.position - ball.position).norm();
        if dist > APPROACH_DISTANCE {
            self.state = StrikerState::Fetching;
            let yaw = Angle::between_points(ctx.player.position, ball.position);
            return TacticProgress::Continue(
                PlayerTarget::move_to(ball.position)
                    .with_yaw(yaw)
                    .with_flags(AvoidanceFlags::AVOID_FRIENDLY_DEFENSE | AvoidanceFlags::AVOID_ENEMY_DEFENSE),
            );
        }

        self.state = StrikerState::Shooting;
        let (mouth_a, mouth_b) = ctx.world.field_geom.enemy_goal_mouth();
        let obstacles: Vec<(Vector2, f64)> = ctx
            .world
            .opp_players
            .iter()
            .map(|p| (p.position, OPPONENT_RADIUS))
            .collect();
        let (lane, width) = angle_sweep(ball.position, mouth_a, mouth_b, &obstacles);
        if width > 0.0 {
            TacticProgress::Continue(
                PlayerTarget::move_to(ball.position)
                    .with_yaw(lane)
                    .with_kind(PrimitiveKind::Shoot),
            )
        } else {
            // No lane; carry the ball forward and re-evaluate next tick.
            let goal_center = (mouth_a + mouth_b) / 2.0;
            let dir = (goal_center - ball.position).normalize();
            TacticProgress::Continue(
                PlayerTarget::move_to(ball.position + dir * 300.0)
                    .with_yaw(Angle::between_points(ball.position, goal_center))
                    .with_kind(PrimitiveKind::Dribble),
            )
        }
    }
}

/// Stands on the bisector of the shot cone from the ball to the own goal
/// mouth, a fixed standoff from the ball, facing it.
pub struct BlockerTactic {
    standoff: f64,
}

impl BlockerTactic {
    pub fn new(standoff: f64) -> Self {
        Self { standoff }
    }
}

impl Tactic for BlockerTactic {
    fn update(&mut self, ctx: TacticCtx<'_>) -> TacticProgress {
        let geom = &ctx.world.field_geom;
        let goal_center = Vector2::new(-geom.half_length(), 0.0);
        let ball_pos = match &ctx.world.ball {
            Some(ball) => ball.position,
            None => return TacticProgress::Continue(PlayerTarget::move_to(ctx.player.position)),
        };

        let position = match block_cone(goal_center, geom.goal_width / 2.0, ball_pos) {
            Some((left, right)) => {
                let bisector = (left + right).normalize();
                ball_pos + bisector * self.standoff
            }
            // Ball on top of the goal; fall back to the mouth itself.
            None => Vector2::new(-geom.half_length() + 100.0, 0.0),
        };
        TacticProgress::Continue(
            PlayerTarget::move_to(position)
                .with_yaw(Angle::between_points(position, ball_pos)),
        )
    }
}

/// Parks the robot at a fixed point and completes once it has arrived.
pub struct HoldPositionTactic {
    position: Vector2,
    threshold: f64,
}

impl HoldPositionTactic {
    pub fn new(position: Vector2) -> Self {
        Self {
            position,
            threshold: 50.0,
        }
    }
}

impl Tactic for HoldPositionTactic {
    fn update(&mut self, ctx: TacticCtx<'_>) -> TacticProgress {
        if (ctx.player.position - self.position).norm() <= self.threshold {
            TacticProgress::Done
        } else {
            TacticProgress::Continue(PlayerTarget::move_to(self.position))
        }
    }
}
