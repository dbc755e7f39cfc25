use serde::{Deserialize, Serialize};

use crate::{Angle, FieldGeometry, PlayerId, Vector2};

/// The ball state from a single frame.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct BallData {
    /// Position of the ball in mm, in field coordinates
    pub position: Vector2,
    /// Velocity of the ball in mm/s
    pub velocity: Vector2,
}

/// The state of a single robot (ours or the enemy's) from a single frame.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PlayerData {
    /// The robot's unique id
    pub id: PlayerId,
    /// Position of the robot in mm, in field coordinates
    pub position: Vector2,
    /// Velocity of the robot in mm/s
    pub velocity: Vector2,
    /// Yaw of the robot, where 0 is the positive x direction
    pub yaw: Angle,
}

impl PlayerData {
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            position: Vector2::zeros(),
            velocity: Vector2::zeros(),
            yaw: Angle::default(),
        }
    }

    fn is_finite(&self) -> bool {
        self.position.x.is_finite()
            && self.position.y.is_finite()
            && self.velocity.x.is_finite()
            && self.velocity.y.is_finite()
            && self.yaw.radians().is_finite()
    }
}

/// The world state from a single frame. Constructed once per tick by the
/// upstream estimator and treated as immutable for the whole scheduling and
/// planning pass.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct WorldData {
    pub own_players: Vec<PlayerData>,
    pub opp_players: Vec<PlayerData>,
    pub ball: Option<BallData>,
    pub field_geom: FieldGeometry,
    /// Duration between the last two frames, in seconds
    pub dt: f64,
}

impl WorldData {
    /// Returns a copy of this snapshot with any non-finite state replaced by
    /// the entity's last known valid state from `last` (or zeros when there
    /// is none). NaN from upstream estimation must never reach the planning
    /// math, where it would silently poison every distance comparison.
    pub fn sanitized(&self, last: Option<&WorldData>) -> WorldData {
        let mut world = self.clone();
        for player in world
            .own_players
            .iter_mut()
            .chain(world.opp_players.iter_mut())
        {
            if !player.is_finite() {
                log::warn!("Non-finite state for player {}, substituting", player.id);
                let fallback = last
                    .map(|w| {
                        w.own_players
                            .iter()
                            .chain(w.opp_players.iter())
                            .find(|p| p.id == player.id)
                            .cloned()
                            .unwrap_or_else(|| PlayerData::new(player.id))
                    })
                    .unwrap_or_else(|| PlayerData::new(player.id));
                *player = fallback;
            }
        }
        if let Some(ball) = world.ball.as_mut() {
            let finite = ball.position.x.is_finite()
                && ball.position.y.is_finite()
                && ball.velocity.x.is_finite()
                && ball.velocity.y.is_finite();
            if !finite {
                log::warn!("Non-finite ball state, substituting");
                world.ball = last.and_then(|w| w.ball.clone());
            }
        }
        world
    }

    pub fn own_player(&self, id: PlayerId) -> Option<&PlayerData> {
        self.own_players.iter().find(|p| p.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world_with_player(position: Vector2) -> WorldData {
        WorldData {
            own_players: vec![PlayerData {
                id: PlayerId::new(1),
                position,
                velocity: Vector2::zeros(),
                yaw: Angle::default(),
            }],
            opp_players: vec![],
            ball: None,
            field_geom: FieldGeometry::default(),
            dt: 1.0 / 60.0,
        }
    }

    #[test]
    fn test_sanitized_substitutes_last_known() {
        let last = world_with_player(Vector2::new(100.0, 200.0));
        let current = world_with_player(Vector2::new(f64::NAN, 200.0));
        let fixed = current.sanitized(Some(&last));
        assert_eq!(fixed.own_players[0].position, Vector2::new(100.0, 200.0));
    }

    #[test]
    fn test_sanitized_without_history_zeroes() {
        let current = world_with_player(Vector2::new(f64::INFINITY, 0.0));
        let fixed = current.sanitized(None);
        assert_eq!(fixed.own_players[0].position, Vector2::zeros());
    }

    #[test]
    fn test_sanitized_keeps_valid_state() {
        let current = world_with_player(Vector2::new(5.0, -3.0));
        let fixed = current.sanitized(None);
        assert_eq!(fixed.own_players[0].position, Vector2::new(5.0, -3.0));
    }
}
