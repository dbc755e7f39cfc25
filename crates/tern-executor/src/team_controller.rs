//! Ties the tick together: sanitize the snapshot, assign slots, resume
//! tactics in slot order, plan each robot's path and emit one drive
//! primitive per robot.

use std::collections::HashMap;

use tern_core::{ExecutorSettings, PlayerId, WorldData};

use crate::{
    control::{translate, DrivePrimitive, Navigator, PrimitiveRequest, WaypointStore},
    scheduler::{self, RoleSlot, ScheduleError, TacticCtx, TacticProgress},
};

/// Everything one control tick produces for the command transport.
#[derive(Debug)]
pub struct TickOutput {
    pub primitives: Vec<DrivePrimitive>,
    /// Set when the active-slot invariant failed and the tick was aborted;
    /// all primitives are stops in that case.
    pub failure: Option<ScheduleError>,
}

pub struct TeamController {
    settings: ExecutorSettings,
    slots: Vec<RoleSlot>,
    navigators: HashMap<PlayerId, Navigator>,
    waypoints: WaypointStore,
    last_world: Option<WorldData>,
}

impl TeamController {
    pub fn new(settings: ExecutorSettings) -> Self {
        Self {
            settings,
            slots: Vec::new(),
            navigators: HashMap::new(),
            waypoints: WaypointStore::default(),
            last_world: None,
        }
    }

    /// Replaces the priority-ordered slot list. Tactic state in the new slots
    /// starts fresh; assignment is recomputed next tick anyway.
    pub fn set_slots(&mut self, slots: Vec<RoleSlot>) {
        self.slots = slots;
    }

    pub fn settings(&self) -> &ExecutorSettings {
        &self.settings
    }

    /// Runs one control tick against a fresh world snapshot.
    pub fn update(&mut self, world: WorldData) -> TickOutput {
        let world = world.sanitized(self.last_world.as_ref());

        let assignment = match scheduler::assign(&self.slots, &world) {
            Ok(assignment) => assignment,
            Err(err) => {
                log::error!("Scheduling aborted: {err}");
                let primitives = world
                    .own_players
                    .iter()
                    .map(|p| DrivePrimitive::stop(p.id))
                    .collect();
                self.last_world = Some(world);
                return TickOutput {
                    primitives,
                    failure: Some(err),
                };
            }
        };

        // Slot order doubles as tactical priority for teammate avoidance.
        let priorities: HashMap<PlayerId, usize> = assignment
            .iter()
            .enumerate()
            .filter_map(|(rank, id)| id.map(|id| (id, rank)))
            .collect();

        let mut primitives = Vec::with_capacity(world.own_players.len());
        for (slot, id) in self.slots.iter_mut().zip(assignment.iter()) {
            let id = match id {
                Some(id) => *id,
                None => continue,
            };
            let player = match world.own_player(id) {
                Some(player) => player.clone(),
                None => continue,
            };
            let target = match slot.tactic.update(TacticCtx {
                player: &player,
                world: &world,
            }) {
                TacticProgress::Continue(target) => target,
                TacticProgress::Done => {
                    primitives.push(DrivePrimitive::stop(id));
                    continue;
                }
            };

            let navigator = self
                .navigators
                .entry(id)
                .or_insert_with(|| Navigator::new(id));
            let path = navigator.plan(
                &player,
                target.position,
                &world,
                &priorities,
                target.flags,
                &self.settings,
                &mut self.waypoints,
            );
            let request = PrimitiveRequest {
                kind: target.kind,
                yaw: target.yaw,
                speed: target.speed.unwrap_or(self.settings.planner.max_velocity),
                extra: target.extra,
            };
            primitives.push(translate(&player, &path.points, &request, &world));
        }

        // Robots that did not win a slot must not keep executing their
        // previous command; every robot gets exactly one primitive per tick.
        for player in &world.own_players {
            if !priorities.contains_key(&player.id) {
                primitives.push(DrivePrimitive::stop(player.id));
            }
        }

        self.navigators
            .retain(|id, _| world.own_player(*id).is_some());
        self.waypoints
            .retain_players(|id| world.own_player(id).is_some());
        self.last_world = Some(world);

        TickOutput {
            primitives,
            failure: None,
        }
    }
}
