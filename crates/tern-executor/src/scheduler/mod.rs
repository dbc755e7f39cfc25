//! Per-tick matching of prioritized role slots to available robots, plus the
//! tactic trait the slots carry. Assignment is rebuilt from scratch every
//! tick; any stickiness is the business of individual scoring functions.

mod tactics;

pub use tactics::{BlockerTactic, HoldPositionTactic, StrikerTactic};

use thiserror::Error;
use tern_core::{Angle, AvoidanceFlags, PlayerData, PlayerId, Vector2, WorldData};

use crate::control::PrimitiveKind;

/// What a tactic wants from its robot this tick. The executor turns this into
/// a planned path and a drive primitive.
#[derive(Clone, Copy, Debug)]
pub struct PlayerTarget {
    pub position: Vector2,
    pub yaw: Option<Angle>,
    pub flags: AvoidanceFlags,
    pub kind: PrimitiveKind,
    /// Requested speed at the target; `None` defers to the configured
    /// velocity limit.
    pub speed: Option<f64>,
    pub extra: u8,
}

impl PlayerTarget {
    pub fn move_to(position: Vector2) -> Self {
        Self {
            position,
            yaw: None,
            flags: tern_core::default_play_flags(),
            kind: PrimitiveKind::Move,
            speed: None,
            extra: 0,
        }
    }

    pub fn with_yaw(mut self, yaw: Angle) -> Self {
        self.yaw = Some(yaw);
        self
    }

    pub fn with_kind(mut self, kind: PrimitiveKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_flags(mut self, flags: AvoidanceFlags) -> Self {
        self.flags = flags;
        self
    }
}

pub struct TacticCtx<'a> {
    pub player: &'a PlayerData,
    pub world: &'a WorldData,
}

/// Outcome of resuming a tactic for one tick.
#[derive(Clone, Copy, Debug)]
pub enum TacticProgress {
    /// The tactic wants its robot driven toward the given target.
    Continue(PlayerTarget),
    /// The tactic has run to completion; the robot holds position until the
    /// strategy layer swaps the slot out.
    Done,
}

/// A resumable per-robot behavior. `update` is called exactly once per tick
/// for each assigned slot, in slot-priority order; tactics carry their own
/// state between resumptions.
pub trait Tactic: Send {
    fn update(&mut self, ctx: TacticCtx<'_>) -> TacticProgress;
}

pub type ScoreFn = Box<dyn Fn(&PlayerData, &WorldData) -> f64 + Send>;

/// One entry of the priority-ordered slot list the strategy layer supplies.
pub struct RoleSlot {
    pub name: String,
    /// Whether this slot's robot is the one permitted to touch the ball.
    pub active: bool,
    pub tactic: Box<dyn Tactic>,
    pub scorer: ScoreFn,
}

impl RoleSlot {
    pub fn new(
        name: impl Into<String>,
        active: bool,
        tactic: Box<dyn Tactic>,
        scorer: ScoreFn,
    ) -> Self {
        Self {
            name: name.into(),
            active,
            tactic,
            scorer,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("no slot is marked active")]
    NoActiveSlot,
    #[error("{0} slots are marked active, expected exactly one")]
    MultipleActiveSlots(usize),
}

/// Greedily assigns robots to slots in priority order: each slot takes the
/// highest-scoring robot not yet claimed, ties broken by robot-list order. A
/// slot with no robot left is unassigned. Fails without assigning anything
/// when the active-slot invariant does not hold.
pub fn assign(
    slots: &[RoleSlot],
    world: &WorldData,
) -> Result<Vec<Option<PlayerId>>, ScheduleError> {
    let active = slots.iter().filter(|s| s.active).count();
    match active {
        0 => return Err(ScheduleError::NoActiveSlot),
        1 => {}
        n => return Err(ScheduleError::MultipleActiveSlots(n)),
    }

    let mut taken = vec![false; world.own_players.len()];
    let mut assignment = Vec::with_capacity(slots.len());
    for slot in slots {
        let mut best: Option<(usize, f64)> = None;
        for (idx, player) in world.own_players.iter().enumerate() {
            if taken[idx] {
                continue;
            }
            let score = (slot.scorer)(player, world);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((idx, score));
            }
        }
        match best {
            Some((idx, score)) => {
                taken[idx] = true;
                log::debug!(
                    "Slot {} -> player {} (score {:.3})",
                    slot.name,
                    world.own_players[idx].id,
                    score
                );
                assignment.push(Some(world.own_players[idx].id));
            }
            None => assignment.push(None),
        }
    }
    Ok(assignment)
}

#[cfg(test)]
mod tests {
    use tern_core::FieldGeometry;

    use super::*;

    struct NullTactic;

    impl Tactic for NullTactic {
        fn update(&mut self, ctx: TacticCtx<'_>) -> TacticProgress {
            TacticProgress::Continue(PlayerTarget::move_to(ctx.player.position))
        }
    }

    fn player(id: u32, x: f64, y: f64) -> PlayerData {
        PlayerData {
            id: PlayerId::new(id),
            position: Vector2::new(x, y),
            velocity: Vector2::zeros(),
            yaw: Angle::default(),
        }
    }

    fn world(players: Vec<PlayerData>) -> WorldData {
        WorldData {
            own_players: players,
            opp_players: vec![],
            ball: None,
            field_geom: FieldGeometry::default(),
            dt: 1.0 / 60.0,
        }
    }

    fn slot(name: &str, active: bool, scorer: ScoreFn) -> RoleSlot {
        RoleSlot::new(name, active, Box::new(NullTactic), scorer)
    }

    #[test]
    fn test_each_slot_gets_its_argmax_in_priority_order() {
        let world = world(vec![
            player(0, 0.0, 0.0),
            player(1, 1000.0, 0.0),
            player(2, 2000.0, 0.0),
        ]);
        // Slot A prefers the robot farthest forward, slot B the one nearest
        // the origin.
        let slots = vec![
            slot("a", true, Box::new(|p, _| p.position.x)),
            slot("b", false, Box::new(|p, _| -p.position.x)),
            slot("c", false, Box::new(|p, _| p.position.x)),
        ];
        let assignment = assign(&slots, &world).unwrap();
        assert_eq!(
            assignment,
            vec![
                Some(PlayerId::new(2)),
                Some(PlayerId::new(0)),
                Some(PlayerId::new(1)),
            ]
        );
    }

    #[test]
    fn test_ties_break_by_robot_list_order() {
        let world = world(vec![player(5, 0.0, 0.0), player(3, 0.0, 0.0)]);
        let slots = vec![slot("a", true, Box::new(|_, _| 1.0))];
        let assignment = assign(&slots, &world).unwrap();
        assert_eq!(assignment, vec![Some(PlayerId::new(5))]);
    }

    #[test]
    fn test_surplus_slots_left_unassigned() {
        let world = world(vec![player(0, 0.0, 0.0)]);
        let slots = vec![
            slot("a", true, Box::new(|_, _| 1.0)),
            slot("b", false, Box::new(|_, _| 1.0)),
        ];
        let assignment = assign(&slots, &world).unwrap();
        assert_eq!(assignment, vec![Some(PlayerId::new(0)), None]);
    }

    #[test]
    fn test_zero_active_slots_is_an_error() {
        let world = world(vec![player(0, 0.0, 0.0)]);
        let slots = vec![slot("a", false, Box::new(|_, _| 1.0))];
        assert_eq!(assign(&slots, &world), Err(ScheduleError::NoActiveSlot));
    }

    #[test]
    fn test_two_active_slots_is_an_error() {
        let world = world(vec![player(0, 0.0, 0.0), player(1, 100.0, 0.0)]);
        let slots = vec![
            slot("a", true, Box::new(|_, _| 1.0)),
            slot("b", true, Box::new(|_, _| 1.0)),
        ];
        assert_eq!(
            assign(&slots, &world),
            Err(ScheduleError::MultipleActiveSlots(2))
        );
    }
}
