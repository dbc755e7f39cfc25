use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::Vector2;

/// An angle in radians, always wrapped to (-pi, pi]. Arithmetic on this type
/// re-wraps, so it is safe to add and subtract angles without worrying about
/// the branch cut.
#[derive(Debug, Clone, Copy, PartialOrd, Serialize, Deserialize)]
pub struct Angle(f64);

impl Angle {
    pub const PI: Angle = Angle(PI);

    /// Create a new angle from radians.
    pub fn from_radians(radians: f64) -> Self {
        Angle(wrap_angle(radians))
    }

    /// Create a new angle from degrees.
    pub fn from_degrees(degrees: f64) -> Self {
        Self::from_radians(degrees.to_radians())
    }

    /// The bearing from point `a` to point `b`.
    pub fn between_points(a: Vector2, b: Vector2) -> Self {
        Self::from_radians((b.y - a.y).atan2(b.x - a.x))
    }

    /// Get the angle in radians.
    pub fn radians(&self) -> f64 {
        self.0
    }

    /// Get the angle in degrees.
    pub fn degrees(&self) -> f64 {
        self.0.to_degrees()
    }

    /// Rotate a vector by this angle.
    pub fn rotate_vector(&self, v: &Vector2) -> Vector2 {
        nalgebra::Rotation2::new(self.0) * v
    }

    /// A unit vector pointing in the direction of the angle.
    pub fn to_vector(&self) -> Vector2 {
        Vector2::new(self.0.cos(), self.0.sin())
    }

    /// Get the absolute value of the angle, in radians.
    pub fn abs(&self) -> f64 {
        self.0.abs()
    }
}

impl std::ops::Add for Angle {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Angle::from_radians(self.0 + other.0)
    }
}

impl std::ops::Sub for Angle {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Angle::from_radians(self.0 - other.0)
    }
}

impl std::ops::Neg for Angle {
    type Output = Self;

    fn neg(self) -> Self {
        Angle::from_radians(-self.0)
    }
}

impl std::ops::Mul<f64> for Angle {
    type Output = Self;

    fn mul(self, scalar: f64) -> Self {
        Angle::from_radians(self.0 * scalar)
    }
}

impl Default for Angle {
    fn default() -> Self {
        Angle(0.0)
    }
}

impl PartialEq for Angle {
    fn eq(&self, other: &Self) -> bool {
        const TOLERANCE: f64 = 1e-5;
        let diff = (self.0 - other.0).abs();
        !(TOLERANCE..=(2.0 * PI - TOLERANCE)).contains(&diff)
    }
}

impl std::fmt::Display for Angle {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} rad", self.0)
    }
}

fn wrap_angle(angle: f64) -> f64 {
    let mut angle = angle % (2.0 * PI);
    if angle <= -PI {
        angle += 2.0 * PI;
    } else if angle > PI {
        angle -= 2.0 * PI;
    }
    angle
}
