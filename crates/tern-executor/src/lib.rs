//! Motion planning and role scheduling for a team of field robots. Each
//! control tick turns a world snapshot and a prioritized slot list into one
//! collision-free drive primitive per robot.

pub mod control;
pub mod scheduler;
mod team_controller;

pub use team_controller::{TeamController, TickOutput};
