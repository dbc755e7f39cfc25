mod navigator;
mod primitive;
mod rrt;
mod violation;
mod waypoints;

pub use navigator::{Navigator, PlannedPath};
pub use primitive::{translate, DrivePrimitive, PrimitiveKind, PrimitiveRequest};
pub use rrt::find_path;
pub use violation::{Violation, VIOLATION_EPSILON};
pub use waypoints::{PlannerKind, WaypointCache, WaypointKey, WaypointStore};
