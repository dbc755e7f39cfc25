use serde::{Deserialize, Serialize};

/// Bitset selecting which optional constraint categories apply to a robot in
/// the current tick. Robots, goal posts and the outer boundary are always
/// avoided and have no flag.
///
/// Supplied per robot by the strategy layer, consumed by the violation model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AvoidanceFlags(u32);

impl AvoidanceFlags {
    pub const NONE: AvoidanceFlags = AvoidanceFlags(0);
    /// Keep the rule-mandated distance from the ball (stop game states).
    pub const AVOID_BALL_STOP: AvoidanceFlags = AvoidanceFlags(1 << 0);
    /// Keep a small clearance from the ball (e.g. while lining up behind it).
    pub const AVOID_BALL_TINY: AvoidanceFlags = AvoidanceFlags(1 << 1);
    /// Stay out of our own defense area (everyone but the goalkeeper).
    pub const AVOID_FRIENDLY_DEFENSE: AvoidanceFlags = AvoidanceFlags(1 << 2);
    /// Stay out of the enemy defense area.
    pub const AVOID_ENEMY_DEFENSE: AvoidanceFlags = AvoidanceFlags(1 << 3);
    /// Stay on our half of the field (kickoff).
    pub const STAY_OWN_HALF: AvoidanceFlags = AvoidanceFlags(1 << 4);
    /// Stay behind the ball during our penalty kick.
    pub const PENALTY_KICK_FRIENDLY: AvoidanceFlags = AvoidanceFlags(1 << 5);
    /// Stay behind the ball during the enemy's penalty kick.
    pub const PENALTY_KICK_ENEMY: AvoidanceFlags = AvoidanceFlags(1 << 6);
    /// Stay within the line-marked play area.
    pub const CLIP_PLAY_AREA: AvoidanceFlags = AvoidanceFlags(1 << 7);

    pub fn contains(&self, other: AvoidanceFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for AvoidanceFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        AvoidanceFlags(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for AvoidanceFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl std::ops::BitAnd for AvoidanceFlags {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        AvoidanceFlags(self.0 & rhs.0)
    }
}

/// The flags most robots carry during normal play.
pub fn default_play_flags() -> AvoidanceFlags {
    AvoidanceFlags::AVOID_FRIENDLY_DEFENSE
        | AvoidanceFlags::AVOID_ENEMY_DEFENSE
        | AvoidanceFlags::CLIP_PLAY_AREA
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains() {
        let flags = AvoidanceFlags::AVOID_BALL_STOP | AvoidanceFlags::STAY_OWN_HALF;
        assert!(flags.contains(AvoidanceFlags::AVOID_BALL_STOP));
        assert!(flags.contains(AvoidanceFlags::STAY_OWN_HALF));
        assert!(!flags.contains(AvoidanceFlags::AVOID_BALL_TINY));
        assert!(flags.contains(AvoidanceFlags::NONE));
    }
}
