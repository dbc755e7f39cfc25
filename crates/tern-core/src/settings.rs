use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

/// Number of entries in each per-robot waypoint cache. The cache never grows
/// or shrinks past this.
pub const WAYPOINT_CACHE_SIZE: usize = 50;

/// Keep-out buffer distances for the violation model, in mm. Each category's
/// effective keep-out radius is the robot radius plus the buffer plus, where
/// relevant, the other object's radius.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AvoidanceSettings {
    /// Physical robot radius in mm. SSL robots are uniformly sized, so this
    /// one value covers our robots and the opponents'; the snapshot does not
    /// carry a per-robot radius.
    pub robot_radius: f64,
    /// Physical ball radius in mm.
    pub ball_radius: f64,
    /// Extra clearance kept from opponent robots.
    pub opponent_margin: f64,
    /// Extra clearance kept from teammates of equal or lower tactical
    /// priority.
    pub teammate_margin: f64,
    /// Extra clearance kept from teammates of higher tactical priority; the
    /// less important robot yields more room.
    pub teammate_yield_margin: f64,
    /// Extra clearance kept from goal posts.
    pub goal_post_margin: f64,
    /// Rule-mandated clearance from the ball in stop states.
    pub ball_stop_distance: f64,
    /// Small clearance from the ball for fine positioning.
    pub ball_tiny_distance: f64,
    /// Extra clearance kept from the defense areas.
    pub defense_area_margin: f64,
    /// Required distance behind the ball during penalty kicks.
    pub penalty_distance: f64,
    /// Margin kept from the line-marked play area boundary.
    pub play_area_margin: f64,
}

impl Default for AvoidanceSettings {
    fn default() -> Self {
        Self {
            robot_radius: 90.0,
            ball_radius: 21.5,
            opponent_margin: 40.0,
            teammate_margin: 40.0,
            teammate_yield_margin: 120.0,
            goal_post_margin: 20.0,
            ball_stop_distance: 500.0,
            ball_tiny_distance: 120.0,
            defense_area_margin: 20.0,
            penalty_distance: 400.0,
            play_area_margin: 0.0,
        }
    }
}

/// Tunable parameters for the kinodynamic RRT planner.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlannerSettings {
    /// Probability of sampling the true goal.
    pub p_goal: f64,
    /// Probability of sampling a point from the waypoint cache. The remainder
    /// of the probability mass goes to uniform field samples.
    pub p_waypoint: f64,
    /// Iteration cap for one planning call. This bounds worst-case latency
    /// instead of a wall-clock timeout.
    pub max_iterations: usize,
    /// Distance to the goal at which the search stops, in mm.
    pub target_threshold: f64,
    /// Maximum robot velocity in mm/s.
    pub max_velocity: f64,
    /// Maximum robot acceleration in mm/s².
    pub max_acceleration: f64,
    /// Fixed time slice of one kinodynamic step, in seconds.
    pub step_dt: f64,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            p_goal: 0.1,
            p_waypoint: 0.6,
            max_iterations: 1000,
            target_threshold: 100.0,
            max_velocity: 2000.0,
            max_acceleration: 700.0,
            step_dt: 0.1,
        }
    }
}

/// All tunable parameters of the engine.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ExecutorSettings {
    pub avoidance: AvoidanceSettings,
    pub planner: PlannerSettings,
}

impl ExecutorSettings {
    /// Load the settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Load the settings from a file, or store the default settings if the
    /// file does not exist or is invalid.
    ///
    /// # Panics
    ///
    /// Panics if the file exists but cannot be read or if creating the file
    /// fails.
    pub fn load_or_insert(path: impl AsRef<Path>) -> Self {
        match fs::read_to_string(path.as_ref()) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => settings,
                Err(err) => {
                    log::error!("Failed to parse executor settings: {}", err);
                    Self::default()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let settings = Self::default();
                fs::write(path, serde_json::to_string_pretty(&settings).unwrap())
                    .expect("Failed to write executor settings");
                settings
            }
            Err(err) => panic!("Failed to read executor settings: {}", err),
        }
    }
}
