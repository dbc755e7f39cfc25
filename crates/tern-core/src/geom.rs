use serde::{Deserialize, Serialize};

use crate::Vector2;

/// An axis-aligned rectangle, used for the defense areas.
#[derive(Serialize, Deserialize, Clone, Copy, Debug)]
pub struct Rect {
    pub min: Vector2,
    pub max: Vector2,
}

impl Rect {
    pub fn new(min: Vector2, max: Vector2) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, p: Vector2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// How deep `p` is inside the rectangle; 0 when `p` is outside or on the
    /// edge.
    pub fn penetration(&self, p: Vector2) -> f64 {
        if !self.contains(p) {
            return 0.0;
        }
        (p.x - self.min.x)
            .min(self.max.x - p.x)
            .min(p.y - self.min.y)
            .min(self.max.y - p.y)
    }

    /// The four edges as (start, end) segments, counter-clockwise.
    pub fn edges(&self) -> [(Vector2, Vector2); 4] {
        let a = self.min;
        let b = Vector2::new(self.max.x, self.min.y);
        let c = self.max;
        let d = Vector2::new(self.min.x, self.max.y);
        [(a, b), (b, c), (c, d), (d, a)]
    }
}

/// The field geometry, in mm, in field coordinates: the origin is the center
/// mark, +x points toward the enemy goal.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct FieldGeometry {
    /// Field length (distance between goal lines) in mm
    pub field_length: f64,
    /// Field width (distance between touch lines) in mm
    pub field_width: f64,
    /// Goal width (distance between inner edges of the goal posts) in mm
    pub goal_width: f64,
    /// Goal depth (distance from the goal line to the inner goal back) in mm
    pub goal_depth: f64,
    /// Distance from the touch/goal lines to the boundary walls in mm
    pub boundary_width: f64,
    /// Depth of the defense area, measured from the goal line, in mm
    pub penalty_area_depth: f64,
    /// Width of the defense area in mm
    pub penalty_area_width: f64,
}

impl FieldGeometry {
    pub fn half_length(&self) -> f64 {
        self.field_length / 2.0
    }

    pub fn half_width(&self) -> f64 {
        self.field_width / 2.0
    }

    /// Whether `p` lies within the line-marked field, shrunk by `margin` on
    /// every side.
    pub fn contains(&self, p: Vector2, margin: f64) -> bool {
        p.x.abs() <= self.half_length() - margin && p.y.abs() <= self.half_width() - margin
    }

    /// The defense area in front of our goal (negative x).
    pub fn own_defense_area(&self) -> Rect {
        let hl = self.half_length();
        let hw = self.penalty_area_width / 2.0;
        Rect::new(
            Vector2::new(-hl, -hw),
            Vector2::new(-hl + self.penalty_area_depth, hw),
        )
    }

    /// The defense area in front of the enemy goal (positive x).
    pub fn enemy_defense_area(&self) -> Rect {
        let hl = self.half_length();
        let hw = self.penalty_area_width / 2.0;
        Rect::new(
            Vector2::new(hl - self.penalty_area_depth, -hw),
            Vector2::new(hl, hw),
        )
    }

    /// The two posts of our goal, each a segment running from the goal line
    /// into the goal.
    pub fn own_goal_posts(&self) -> [(Vector2, Vector2); 2] {
        self.goal_posts(-1.0)
    }

    /// The two posts of the enemy goal.
    pub fn enemy_goal_posts(&self) -> [(Vector2, Vector2); 2] {
        self.goal_posts(1.0)
    }

    fn goal_posts(&self, sign: f64) -> [(Vector2, Vector2); 2] {
        let x0 = sign * self.half_length();
        let x1 = sign * (self.half_length() + self.goal_depth);
        let hw = self.goal_width / 2.0;
        [
            (Vector2::new(x0, -hw), Vector2::new(x1, -hw)),
            (Vector2::new(x0, hw), Vector2::new(x1, hw)),
        ]
    }

    /// The mouth of the enemy goal (the segment between the post inner edges
    /// on the goal line).
    pub fn enemy_goal_mouth(&self) -> (Vector2, Vector2) {
        let hl = self.half_length();
        let hw = self.goal_width / 2.0;
        (Vector2::new(hl, -hw), Vector2::new(hl, hw))
    }
}

impl Default for FieldGeometry {
    // SSL division B dimensions.
    fn default() -> Self {
        Self {
            field_length: 9000.0,
            field_width: 6000.0,
            goal_width: 1000.0,
            goal_depth: 180.0,
            boundary_width: 300.0,
            penalty_area_depth: 1000.0,
            penalty_area_width: 2000.0,
        }
    }
}
