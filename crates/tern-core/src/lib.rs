mod angle;
mod debug;
mod flags;
mod geom;
mod player_id;
mod settings;
mod world;

pub mod math;

pub use angle::Angle;
pub use debug::*;
pub use flags::{default_play_flags, AvoidanceFlags};
pub use geom::{FieldGeometry, Rect};
pub use player_id::PlayerId;
pub use settings::{AvoidanceSettings, ExecutorSettings, PlannerSettings, WAYPOINT_CACHE_SIZE};
pub use world::{BallData, PlayerData, WorldData};

/// A 2D vector in field coordinates, in mm.
pub type Vector2 = nalgebra::Vector2<f64>;
