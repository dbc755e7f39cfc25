use std::{
    collections::HashMap,
    sync::{OnceLock, RwLock},
};

use serde::{Deserialize, Serialize};

use crate::Vector2;

static DEBUG_MAP: OnceLock<RwLock<DebugMap>> = OnceLock::new();

fn map() -> &'static RwLock<DebugMap> {
    DEBUG_MAP.get_or_init(|| RwLock::new(HashMap::new()))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebugColor {
    #[default]
    Red,
    Green,
    Orange,
    Purple,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum DebugShape {
    Cross {
        center: Vector2,
        color: DebugColor,
    },
    Circle {
        center: Vector2,
        radius: f64,
        color: DebugColor,
    },
    Line {
        start: Vector2,
        end: Vector2,
        color: DebugColor,
    },
    /// An ordered point list, e.g. a planned path.
    Polyline {
        points: Vec<Vector2>,
        color: DebugColor,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum DebugValue {
    Shape(DebugShape),
    Number(f64),
    String(String),
}

/// A map of debug messages for visualization tooling.
///
/// Keys should be `snake_case`, with `.` separating key parts. Keys of the
/// form `p{player_id}.{value}` are associated with a player.
pub type DebugMap = HashMap<String, DebugValue>;

/// Record a debug message.
pub fn debug_record(key: impl Into<String>, value: DebugValue) {
    if let Ok(mut map) = map().write() {
        map.insert(key.into(), value);
    }
}

/// Remove a debug message.
pub fn debug_remove(key: &str) {
    if let Ok(mut map) = map().write() {
        map.remove(key);
    }
}

/// Get a copy of the current debug map.
pub fn debug_map_copy() -> DebugMap {
    map().read().map(|m| m.clone()).unwrap_or_default()
}

/// Record a cross marker.
pub fn debug_cross(key: impl Into<String>, center: Vector2, color: DebugColor) {
    debug_record(key, DebugValue::Shape(DebugShape::Cross { center, color }));
}

/// Record a line segment.
pub fn debug_line(key: impl Into<String>, start: Vector2, end: Vector2, color: DebugColor) {
    debug_record(key, DebugValue::Shape(DebugShape::Line { start, end, color }));
}

/// Record an ordered point list, e.g. a planned path.
pub fn debug_path(key: impl Into<String>, points: Vec<Vector2>, color: DebugColor) {
    debug_record(key, DebugValue::Shape(DebugShape::Polyline { points, color }));
}

/// Record a numeric value.
pub fn debug_value(key: impl Into<String>, value: f64) {
    debug_record(key, DebugValue::Number(value));
}

/// Record a string value.
pub fn debug_string(key: impl Into<String>, value: impl Into<String>) {
    debug_record(key, DebugValue::String(value.into()));
}
