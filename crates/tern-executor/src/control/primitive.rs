//! Turns a planned path into the single low-level drive command sent to a
//! robot this tick.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use tern_core::{Angle, PlayerData, PlayerId, Vector2, WorldData};

/// Smallest fraction of the requested speed kept through the sharpest turns.
const MIN_TURN_SPEED_FRACTION: f64 = 0.2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrimitiveKind {
    Move,
    Dribble,
    Shoot,
    Pivot,
    Spin,
    Catch,
    Stop,
}

/// One drive command per robot per tick, in the transport's fixed layout:
/// kind, up to four numeric parameters and a modifier byte. For the motion
/// kinds the parameters are target x, target y, target yaw and target speed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DrivePrimitive {
    pub id: PlayerId,
    pub kind: PrimitiveKind,
    pub params: [f64; 4],
    pub extra: u8,
}

impl DrivePrimitive {
    /// Safe-stop command, used when scheduling aborts the tick.
    pub fn stop(id: PlayerId) -> Self {
        Self {
            id,
            kind: PrimitiveKind::Stop,
            params: [0.0; 4],
            extra: 0,
        }
    }
}

/// What a tactic asks of its robot this tick; the translator combines it with
/// the planned path to produce the actual command.
#[derive(Clone, Copy, Debug)]
pub struct PrimitiveRequest {
    pub kind: PrimitiveKind,
    pub yaw: Option<Angle>,
    pub speed: f64,
    pub extra: u8,
}

/// Builds the drive primitive for one robot from its planned path. The target
/// is the first path point; the speed through it drops with the turn the path
/// takes there so the robot does not overshoot intermediate waypoints. A
/// shoot request degrades to a plain move while more than one path point is
/// outstanding, so the kicker cannot fire before the robot is in position.
pub fn translate(
    player: &PlayerData,
    path: &[Vector2],
    request: &PrimitiveRequest,
    world: &WorldData,
) -> DrivePrimitive {
    if path.is_empty() || request.kind == PrimitiveKind::Stop {
        return DrivePrimitive::stop(player.id);
    }

    let target = path[0];
    let yaw = request.yaw.unwrap_or_else(|| match &world.ball {
        Some(ball) => Angle::between_points(player.position, ball.position),
        None => player.yaw,
    });
    let speed = request.speed * turn_speed_fraction(player.position, path);

    let kind = if request.kind == PrimitiveKind::Shoot && path.len() > 1 {
        PrimitiveKind::Move
    } else {
        request.kind
    };

    DrivePrimitive {
        id: player.id,
        kind,
        params: [target.x, target.y, yaw.radians(), speed],
        extra: request.extra,
    }
}

/// Fraction of the requested speed the robot should carry through the first
/// path point. A straight continuation keeps full speed; the fraction falls
/// linearly with the turn angle down to a floor, and the final point of a
/// path is always taken at full speed since nothing follows it.
fn turn_speed_fraction(position: Vector2, path: &[Vector2]) -> f64 {
    if path.len() < 2 {
        return 1.0;
    }
    let incoming = path[0] - position;
    let outgoing = path[1] - path[0];
    if incoming.norm() < f64::EPSILON || outgoing.norm() < f64::EPSILON {
        return 1.0;
    }
    let turn = (Angle::between_points(path[0], path[1])
        - Angle::between_points(position, path[0]))
    .abs();
    (1.0 - turn / PI).max(MIN_TURN_SPEED_FRACTION)
}
